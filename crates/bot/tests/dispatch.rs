#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use {
    async_trait::async_trait,
    herald_bot::{Bot, Inbound, Mention},
    herald_channels::{
        AnalyticsReporter, BlockActionsCallback, DeliveryAdapter, DeliveryId, FileRef,
        InteractionPayload, ModalView, PostOptions, ViewSubmission,
    },
    herald_common::{Event, EventType, Message, Origin},
    herald_config::{BotBindings, ChannelBindings, Config},
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
};

#[derive(Debug, Clone)]
struct Posted {
    channel: String,
    text: String,
    thread_ts: Option<String>,
}

#[derive(Default)]
struct RecordingAdapter {
    posted: Mutex<Vec<Posted>>,
}

impl RecordingAdapter {
    fn posted_to(&self, channel: &str) -> Vec<Posted> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.channel == channel)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DeliveryAdapter for RecordingAdapter {
    async fn post(
        &self,
        channel: &str,
        message: &Message,
        options: &PostOptions,
    ) -> herald_channels::Result<DeliveryId> {
        self.posted.lock().unwrap().push(Posted {
            channel: channel.into(),
            text: message.render_plain(),
            thread_ts: options.thread_ts.clone(),
        });
        Ok("1.1".into())
    }

    async fn post_ephemeral(
        &self,
        _channel: &str,
        _user: &str,
        _message: &Message,
    ) -> herald_channels::Result<()> {
        Ok(())
    }

    async fn open_modal(
        &self,
        _trigger_id: &str,
        _view: &ModalView,
    ) -> herald_channels::Result<()> {
        Ok(())
    }

    async fn upload_file(
        &self,
        _channel: &str,
        _content: &str,
        _thread_ts: Option<&str>,
    ) -> herald_channels::Result<FileRef> {
        Ok(FileRef::default())
    }
}

#[derive(Default)]
struct RecordingReporter {
    seen: Mutex<Vec<(String, Origin)>>,
}

impl AnalyticsReporter for RecordingReporter {
    fn report_command(
        &self,
        _platform: &str,
        command: &str,
        origin: Origin,
    ) -> herald_channels::Result<()> {
        self.seen.lock().unwrap().push((command.into(), origin));
        Ok(())
    }
}

fn channel(name: &str, disabled: bool, sources: &[&str]) -> ChannelBindings {
    let mut bindings = ChannelBindings {
        name: name.into(),
        bindings: BotBindings {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            executors: vec![],
        },
        ..Default::default()
    };
    bindings.notification.disabled = disabled;
    bindings
}

fn config() -> Arc<Config> {
    let mut config = Config::default();
    config.settings.cluster_name = "prod".into();
    let group = config.communications.entry("default".into()).or_default();
    group.socket_slack.enabled = true;
    group
        .socket_slack
        .channels
        .insert("alpha".into(), channel("C-A", false, &["k8s-events"]));
    group
        .socket_slack
        .channels
        .insert("beta".into(), channel("C-B", true, &["k8s-audit"]));
    Arc::new(config)
}

struct Harness {
    bot: Arc<Bot>,
    adapter: Arc<RecordingAdapter>,
    reporter: Arc<RecordingReporter>,
}

fn harness() -> Harness {
    let adapter = Arc::new(RecordingAdapter::default());
    let reporter = Arc::new(RecordingReporter::default());
    let bot = Bot::from_config(
        "socket-slack",
        "UBOT",
        config(),
        Arc::clone(&adapter) as Arc<dyn DeliveryAdapter>,
        Arc::clone(&reporter) as Arc<dyn AnalyticsReporter>,
    )
    .unwrap();
    Harness {
        bot: Arc::new(bot),
        adapter,
        reporter,
    }
}

fn click(channel: &str, action_id: &str, value: &str) -> Inbound {
    Inbound::Interaction(BlockActionsCallback {
        channel_id: channel.into(),
        user_id: "U1".into(),
        message_ts: "200.2".into(),
        actions: vec![InteractionPayload::Button {
            action_id: action_id.into(),
            block_id: "b".into(),
            value: value.into(),
        }],
        ..Default::default()
    })
}

#[tokio::test]
async fn run_handles_every_inbound_kind() {
    let h = harness();
    let (tx, source) = mpsc::channel(16);

    tx.send(Inbound::Event {
        event: Event::new(EventType::Create, "v1/pods", "prod"),
        sources: vec!["k8s-events".into()],
    })
    .await
    .unwrap();
    tx.send(Inbound::Mention(Mention {
        channel: "C-B".into(),
        user: "U1".into(),
        text: "<@UBOT> notifier start".into(),
        thread_ts: None,
    }))
    .await
    .unwrap();
    tx.send(click("C-A", "cmd", "<@UBOT> ping")).await.unwrap();
    tx.send(click("C-A", "url:docs", "")).await.unwrap();
    tx.send(Inbound::Mention(Mention {
        channel: "C-A".into(),
        user: "U1".into(),
        text: "no mention here".into(),
        thread_ts: None,
    }))
    .await
    .unwrap();
    drop(tx);

    Arc::clone(&h.bot)
        .run(Box::new(source), CancellationToken::new())
        .await
        .unwrap();

    let to_a = h.adapter.posted_to("C-A");
    assert_eq!(to_a.len(), 2, "{to_a:?}");
    assert!(to_a.iter().any(|p| p.text.starts_with("v1/pods created")));
    let pong = to_a
        .iter()
        .find(|p| p.text == "pong from cluster 'prod'")
        .unwrap();
    assert_eq!(pong.thread_ts.as_deref(), Some("200.2"));

    let to_b = h.adapter.posted_to("C-B");
    assert_eq!(to_b.len(), 1);
    assert_eq!(
        to_b[0].text,
        "Brace yourselves, incoming notifications from cluster 'prod'."
    );
    assert!(h.bot.registry().channel("C-B").unwrap().notify);

    let seen = h.reporter.seen.lock().unwrap().clone();
    assert!(seen.contains(&("url:docs".to_string(), Origin::ButtonClick)));
    assert!(seen.contains(&("notifier start".to_string(), Origin::Typed)));
}

#[tokio::test]
async fn interactive_commands_must_address_the_bot() {
    let h = harness();
    let cancel = CancellationToken::new();

    h.bot.handle(click("C-A", "cmd", "ping"), &cancel).await.unwrap();
    assert!(h.adapter.posted_to("C-A").is_empty());

    h.bot
        .handle(click("C-A", "cmd", "<@UBOT> ping"), &cancel)
        .await
        .unwrap();
    let replies: Vec<String> = h
        .adapter
        .posted_to("C-A")
        .into_iter()
        .map(|p| p.text)
        .collect();
    assert_eq!(replies, vec!["pong from cluster 'prod'"]);

    let input = |block_id: &str| InteractionPayload::PlainTextInput {
        action_id: "input".into(),
        block_id: block_id.into(),
        value: "x".into(),
    };
    h.bot
        .handle(
            Inbound::ViewSubmission(ViewSubmission {
                private_metadata: "C-B".into(),
                user_id: "U1".into(),
                values: vec![input("ping "), input("<@UBOT> ping ")],
            }),
            &cancel,
        )
        .await
        .unwrap();
    let to_b = h.adapter.posted_to("C-B");
    assert_eq!(to_b.len(), 1);
    assert_eq!(to_b[0].text, "pong from cluster 'prod'");
}

#[tokio::test]
async fn disabled_channel_gets_no_events_but_broadcasts() {
    let h = harness();
    let cancel = CancellationToken::new();

    let event = Event::new(EventType::Delete, "v1/pods", "prod");
    h.bot
        .send_event(&event, &["k8s-audit".to_string()], &cancel)
        .await
        .unwrap();
    assert!(h.adapter.posted_to("C-B").is_empty());

    h.bot
        .send_to_all(&Message::plain("maintenance at 5pm"), &cancel)
        .await
        .unwrap();
    assert_eq!(h.adapter.posted_to("C-A").len(), 1);
    assert_eq!(h.adapter.posted_to("C-B").len(), 1);
}

#[tokio::test]
async fn generic_message_follows_source_bindings() {
    let h = harness();
    h.bot
        .send_generic(
            &Message::plain("rollout finished"),
            &["k8s-events".to_string()],
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let to_a = h.adapter.posted_to("C-A");
    assert_eq!(to_a.len(), 1);
    assert_eq!(to_a[0].text, "rollout finished");
    assert!(h.adapter.posted_to("C-B").is_empty());
}

#[tokio::test]
async fn explicit_channel_event_skips_routing() {
    let h = harness();
    let event = Event::new(EventType::Warning, "v1/nodes", "prod").with_channel("C-B");
    h.bot
        .send_event(&event, &[], &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(h.adapter.posted_to("C-B").len(), 1);
    assert!(h.adapter.posted_to("C-A").is_empty());
}

#[tokio::test]
async fn cancelled_run_returns() {
    let h = harness();
    let (_tx, source) = mpsc::channel::<Inbound>(1);
    let cancel = CancellationToken::new();
    cancel.cancel();
    Arc::clone(&h.bot).run(Box::new(source), cancel).await.unwrap();
}
