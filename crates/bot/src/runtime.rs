use std::sync::Arc;

use {
    herald_channels::{
        AnalyticsReporter, ChannelRegistry, Conversation, DeliveryAdapter, DeliveryOrchestrator,
        Executor, NotifierHandler, ReplyContext, Resolution, ResolvedInteraction,
        interaction::SkipReason, resolve_block_actions, resolve_view_submission,
    },
    herald_commands::DefaultExecutor,
    herald_common::{
        Event, GenericCommand, Message, Origin,
        message::{Button, Section},
    },
    herald_config::Config,
    herald_routing::Router,
    tokio::task::JoinSet,
    tokio_util::sync::CancellationToken,
    tracing::{Instrument, debug, info, info_span, warn},
    uuid::Uuid,
};

use crate::{
    Result,
    inbound::{Inbound, InboundSource, Mention, MentionMatcher, spawn_listener},
};

#[cfg(feature = "metrics")]
use herald_metrics::{
    counter, histogram, inbound as inbound_metrics, labels, notifications as notif_metrics,
};

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// One chat bot: owns its channel registry and answers everything that
/// arrives on its inbound source.
pub struct Bot {
    platform: String,
    registry: Arc<ChannelRegistry>,
    router: Router,
    orchestrator: DeliveryOrchestrator,
    executor: Arc<dyn Executor>,
    reporter: Arc<dyn AnalyticsReporter>,
    mention: MentionMatcher,
    queue_capacity: usize,
}

impl Bot {
    pub fn new(
        platform: impl Into<String>,
        bot_id: &str,
        registry: Arc<ChannelRegistry>,
        orchestrator: DeliveryOrchestrator,
        executor: Arc<dyn Executor>,
        reporter: Arc<dyn AnalyticsReporter>,
    ) -> Result<Self> {
        Ok(Self {
            platform: platform.into(),
            router: Router::new(Arc::clone(&registry)),
            registry,
            orchestrator,
            executor,
            reporter,
            mention: MentionMatcher::new(bot_id)?,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        })
    }

    /// Wire a bot from configuration with the built-in command executor.
    pub fn from_config(
        platform: impl Into<String>,
        bot_id: &str,
        config: Arc<Config>,
        adapter: Arc<dyn DeliveryAdapter>,
        reporter: Arc<dyn AnalyticsReporter>,
    ) -> Result<Self> {
        let platform = platform.into();
        let registry = Arc::new(ChannelRegistry::from_config(&config));
        let settings = &config.settings.delivery;
        let orchestrator = DeliveryOrchestrator::from_settings(adapter, settings);
        let executor = DefaultExecutor::new(
            platform.clone(),
            Arc::clone(&config),
            Arc::clone(&registry) as Arc<dyn NotifierHandler>,
            Arc::clone(&reporter),
        );
        Ok(
            Self::new(platform, bot_id, registry, orchestrator, Arc::new(executor), reporter)?
                .with_queue_capacity(settings.queue_capacity),
        )
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    pub fn bot_name(&self) -> &str {
        self.mention.bot_name()
    }

    /// Listen on `source` and handle every item until the source ends or
    /// `cancel` fires.
    ///
    /// Items are handled concurrently. Cancellation stops the listener and
    /// every in-flight fan-out; handlers still running are awaited.
    pub async fn run(
        self: Arc<Self>,
        source: Box<dyn InboundSource>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let (listener, mut queue) = spawn_listener(source, self.queue_capacity, cancel.clone());
        let mut handlers = JoinSet::new();
        info!(platform = %self.platform, bot = %self.bot_name(), "bot started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                item = queue.recv() => {
                    let Some(item) = item else { break };
                    let bot = Arc::clone(&self);
                    let cancel = cancel.child_token();
                    let span = info_span!(
                        "inbound",
                        kind = item.kind(),
                        request_id = %Uuid::new_v4()
                    );
                    handlers.spawn(async move { bot.handle(item, &cancel).await }.instrument(span));
                },
                Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                    log_handler_result(joined);
                },
            }
        }

        while let Some(joined) = handlers.join_next().await {
            log_handler_result(joined);
        }
        listener.await?;
        info!(platform = %self.platform, "bot stopped");
        Ok(())
    }

    /// Handle one inbound item.
    pub async fn handle(&self, item: Inbound, cancel: &CancellationToken) -> Result<()> {
        #[cfg(feature = "metrics")]
        counter!(inbound_metrics::RECEIVED_TOTAL, labels::KIND => item.kind()).increment(1);

        match item {
            Inbound::Event { event, sources } => self.send_event(&event, &sources, cancel).await,
            Inbound::Mention(mention) => self.handle_mention(mention).await,
            Inbound::Interaction(callback) => match resolve_block_actions(&callback) {
                Resolution::Command(resolved) => self.answer_mentioned(resolved).await,
                Resolution::Link { action_id } => {
                    self.report(&action_id, Origin::ButtonClick);
                    Ok(())
                },
                Resolution::Skipped(reason) => {
                    skipped(reason);
                    Ok(())
                },
            },
            Inbound::ViewSubmission(submission) => {
                for resolved in resolve_view_submission(&submission) {
                    self.answer_mentioned(resolved).await?;
                }
                Ok(())
            },
        }
    }

    /// Route `event` by `sources` and deliver it to every target.
    pub async fn send_event(
        &self,
        event: &Event,
        sources: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let targets = self.router.targets(event, sources);
        if targets.is_empty() {
            debug!(title = %event.title, "no channel to notify");
            return Ok(());
        }
        self.fan_out(&targets, &event_message(event), cancel).await
    }

    /// Deliver `message` to every channel bound to one of `sources`.
    pub async fn send_generic(
        &self,
        message: &Message,
        sources: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let targets = self.router.targets_for_sources(sources);
        self.fan_out(&targets, message, cancel).await
    }

    /// Deliver `message` to every registered channel, bindings and notify
    /// flags notwithstanding.
    pub async fn send_to_all(&self, message: &Message, cancel: &CancellationToken) -> Result<()> {
        self.fan_out(&self.registry.identifiers(), message, cancel).await
    }

    async fn fan_out(
        &self,
        targets: &[String],
        message: &Message,
        cancel: &CancellationToken,
    ) -> Result<()> {
        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();
        let result = self.orchestrator.deliver(targets, message, cancel).await;
        #[cfg(feature = "metrics")]
        histogram!(notif_metrics::FANOUT_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        Ok(result?)
    }

    async fn handle_mention(&self, mention: Mention) -> Result<()> {
        self.answer_mentioned(ResolvedInteraction {
            command: GenericCommand::typed(mention.text),
            reply: ReplyContext {
                channel: mention.channel,
                user: Some(mention.user).filter(|u| !u.is_empty()),
                thread_ts: mention.thread_ts,
                ..Default::default()
            },
        })
        .await
    }

    /// Typed text and interactive commands alike must address the bot; the
    /// mention is stripped before execution and anything without it is
    /// ignored.
    async fn answer_mentioned(&self, mut resolved: ResolvedInteraction) -> Result<()> {
        let Some(text) = self.mention.find_and_trim(&resolved.command.text) else {
            debug!(
                channel = %resolved.reply.channel,
                origin = %resolved.command.origin,
                "command without bot mention ignored"
            );
            return Ok(());
        };
        resolved.command.text = text;
        self.answer(resolved).await
    }

    /// Execute a resolved command and deliver the reply where it came from.
    async fn answer(&self, resolved: ResolvedInteraction) -> Result<()> {
        let ResolvedInteraction { command, reply } = resolved;
        #[cfg(feature = "metrics")]
        counter!(inbound_metrics::COMMANDS_TOTAL, labels::ORIGIN => command.origin.as_str())
            .increment(1);

        let conversation = self.conversation(&reply);
        let message = self.executor.execute(&command, &conversation).await;
        self.orchestrator.send(&reply, &message).await?;
        debug!(channel = %reply.channel, origin = %command.origin, "command answered");
        Ok(())
    }

    fn conversation(&self, reply: &ReplyContext) -> Conversation {
        let user = reply
            .user
            .as_deref()
            .map(|u| format!("<@{u}>"))
            .unwrap_or_default();
        match self.registry.channel(&reply.channel) {
            Some(channel) => Conversation {
                id: channel.identifier,
                alias: channel.alias,
                executor_bindings: channel.bindings.executors,
                is_authenticated: true,
                user,
            },
            None => Conversation {
                id: reply.channel.clone(),
                user,
                ..Default::default()
            },
        }
    }

    fn report(&self, command: &str, origin: Origin) {
        if let Err(e) = self.reporter.report_command(&self.platform, command, origin) {
            warn!(error = %e, "failed to report interaction");
        }
    }
}

fn skipped(reason: SkipReason) {
    #[cfg(feature = "metrics")]
    counter!(inbound_metrics::SKIPPED_TOTAL, labels::REASON => format!("{reason:?}")).increment(1);
    match reason {
        SkipReason::ActionCount(count) => {
            debug!(count, "interaction skipped, expected exactly one action")
        },
        SkipReason::ActiveModal => debug!("interaction inside open modal skipped"),
    }
}

fn log_handler_result(joined: std::result::Result<Result<()>, tokio::task::JoinError>) {
    match joined {
        Ok(Ok(())) => {},
        Ok(Err(e)) => warn!(error = %e, "inbound handler failed"),
        Err(e) => warn!(error = %e, "inbound handler panicked"),
    }
}

/// Notification message for a cluster event.
pub fn event_message(event: &Event) -> Message {
    let mut message = Message {
        header: event.title.clone(),
        description: event_summary(event),
        ..Default::default()
    };
    message.body.plaintext = event.messages.join("\n");

    if event.has_recommendations_or_warnings() {
        let context = event
            .recommendations
            .iter()
            .map(|r| format!("Recommendation: {r}"))
            .chain(event.warnings.iter().map(|w| format!("Warning: {w}")))
            .collect();
        message.sections.push(Section {
            context,
            ..Default::default()
        });
    }

    if !event.actions.is_empty() {
        message.sections.push(Section {
            header: "Run command".into(),
            buttons: event
                .actions
                .iter()
                .map(|a| Button::command(a.display_name.clone(), a.command.clone()))
                .collect(),
            ..Default::default()
        });
    }
    message
}

fn event_summary(event: &Event) -> String {
    let mut fields = vec![format!("Cluster: {}", event.cluster)];
    if !event.kind.is_empty() {
        fields.push(format!("Kind: {}", event.kind));
    }
    if !event.name.is_empty() {
        fields.push(format!("Name: {}", event.name));
    }
    if !event.namespace.is_empty() {
        fields.push(format!("Namespace: {}", event.namespace));
    }
    if !event.reason.is_empty() {
        fields.push(format!("Reason: {}", event.reason));
    }
    if !event.error.is_empty() {
        fields.push(format!("Error: {}", event.error));
    }
    fields.join("\n")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        herald_common::{EventAction, EventType},
    };

    #[test]
    fn event_message_carries_details_and_actions() {
        let mut event = Event::new(EventType::Error, "v1/pods", "prod");
        event.name = "nginx".into();
        event.namespace = "default".into();
        event.messages = vec!["Back-off restarting failed container".into()];
        event.recommendations = vec!["Set resource limits".into()];
        event.actions = vec![EventAction {
            command: "<@U1> kubectl logs nginx".into(),
            executor_bindings: vec!["kubectl".into()],
            display_name: "Show logs".into(),
        }];

        let message = event_message(&event);
        assert_eq!(message.header, "v1/pods error");
        assert_eq!(
            message.description,
            "Cluster: prod\nName: nginx\nNamespace: default"
        );
        assert_eq!(message.body.plaintext, "Back-off restarting failed container");
        assert_eq!(message.sections[0].context, vec!["Recommendation: Set resource limits"]);
        assert_eq!(message.sections[1].buttons[0].command, "<@U1> kubectl logs nginx");
        assert!(message.has_interactive_elements());
    }

    #[test]
    fn plain_event_has_no_sections() {
        let message = event_message(&Event::new(EventType::Create, "v1/pods", "dev"));
        assert_eq!(message.header, "v1/pods created");
        assert!(message.sections.is_empty());
    }
}
