use {
    async_trait::async_trait,
    herald_channels::{BlockActionsCallback, ViewSubmission},
    herald_common::Event,
    regex::Regex,
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

use crate::Result;

/// Something the bot has to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Cluster event and the names of the sources that produced it.
    Event { event: Event, sources: Vec<String> },
    /// A typed message in a channel the bot can read.
    Mention(Mention),
    Interaction(BlockActionsCallback),
    ViewSubmission(ViewSubmission),
}

impl Inbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Event { .. } => "event",
            Self::Mention(_) => "mention",
            Self::Interaction(_) => "interaction",
            Self::ViewSubmission(_) => "view_submission",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mention {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub thread_ts: Option<String>,
}

/// Producer of inbound items: a socket connection, an event watcher, a test
/// script.
#[async_trait]
pub trait InboundSource: Send {
    /// `None` once the source is exhausted.
    async fn next(&mut self) -> Option<Inbound>;
}

#[async_trait]
impl InboundSource for mpsc::Receiver<Inbound> {
    async fn next(&mut self) -> Option<Inbound> {
        self.recv().await
    }
}

/// Pump `source` into a bounded queue until it ends or `cancel` fires.
///
/// A full queue makes the listener wait, so a slow dispatcher slows intake
/// instead of growing memory.
pub fn spawn_listener(
    mut source: Box<dyn InboundSource>,
    capacity: usize,
    cancel: CancellationToken,
) -> (tokio::task::JoinHandle<()>, mpsc::Receiver<Inbound>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(async move {
        loop {
            let item = tokio::select! {
                () = cancel.cancelled() => {
                    info!("inbound listener cancelled");
                    break;
                }
                item = source.next() => item,
            };
            let Some(item) = item else {
                info!("inbound source exhausted");
                break;
            };
            debug!(kind = item.kind(), "inbound item queued");
            tokio::select! {
                () = cancel.cancelled() => break,
                sent = tx.send(item) => {
                    if sent.is_err() {
                        debug!("inbound queue closed, listener stopping");
                        break;
                    }
                }
            }
        }
    });
    (handle, rx)
}

/// Recognizes messages addressed to the bot (`<@BOTID> ...`).
#[derive(Debug, Clone)]
pub struct MentionMatcher {
    bot_name: String,
    pattern: Regex,
}

impl MentionMatcher {
    pub fn new(bot_id: &str) -> Result<Self> {
        let bot_name = format!("<@{bot_id}>");
        let pattern = Regex::new(&regex::escape(&bot_name))?;
        Ok(Self { bot_name, pattern })
    }

    /// The mention string, e.g. `<@U123>`.
    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Text with every mention removed, or `None` when the bot is not
    /// mentioned.
    pub fn find_and_trim(&self, text: &str) -> Option<String> {
        if !self.pattern.is_match(text) {
            return None;
        }
        Some(self.pattern.replace_all(text, "").trim().to_string())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, herald_common::EventType, rstest::rstest, std::time::Duration};

    #[rstest]
    #[case::leading("<@U1> ping", Some("ping"))]
    #[case::trailing_space("<@U1>   notifier   status ", Some("notifier   status"))]
    #[case::inline("hey <@U1> ping", Some("hey  ping"))]
    #[case::other_bot("<@U2> ping", None)]
    #[case::none("ping", None)]
    fn trims_bot_mention(#[case] text: &str, #[case] expected: Option<&str>) {
        let matcher = MentionMatcher::new("U1").unwrap();
        assert_eq!(matcher.find_and_trim(text).as_deref(), expected);
    }

    #[test]
    fn mention_pattern_is_literal() {
        let matcher = MentionMatcher::new("U.*").unwrap();
        assert_eq!(matcher.bot_name(), "<@U.*>");
        assert!(matcher.find_and_trim("<@U1> ping").is_none());
        assert_eq!(matcher.find_and_trim("<@U.*> ping").as_deref(), Some("ping"));
    }

    fn event_item(n: usize) -> Inbound {
        Inbound::Event {
            event: Event::new(EventType::Create, format!("pod-{n}"), "dev"),
            sources: vec!["k8s".into()],
        }
    }

    #[tokio::test]
    async fn listener_forwards_until_source_ends() {
        let (tx, source) = mpsc::channel(8);
        for n in 0..3 {
            tx.send(event_item(n)).await.unwrap();
        }
        drop(tx);

        let (handle, mut rx) = spawn_listener(Box::new(source), 2, CancellationToken::new());
        let mut kinds = Vec::new();
        while let Some(item) = rx.recv().await {
            kinds.push(item.kind());
        }
        handle.await.unwrap();
        assert_eq!(kinds, vec!["event"; 3]);
    }

    #[tokio::test]
    async fn listener_stops_on_cancel() {
        let (_tx, source) = mpsc::channel::<Inbound>(1);
        let cancel = CancellationToken::new();
        let (handle, mut rx) = spawn_listener(Box::new(source), 1, cancel.clone());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(rx.recv().await.is_none());
    }
}
