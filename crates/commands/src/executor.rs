use std::sync::Arc;

use {
    async_trait::async_trait,
    herald_channels::{AnalyticsReporter, Conversation, Executor, NotifierHandler},
    herald_common::{GenericCommand, Message},
    herald_config::Config,
    tracing::{debug, warn},
};

use crate::notifier::{NOTIFIER_COMMAND, NotifierExecutor};

pub const PING_COMMAND: &str = "ping";
pub const UNSUPPORTED_REPLY: &str = "Command not supported";

/// Executor for the commands the bot answers itself.
pub struct DefaultExecutor {
    platform: String,
    cluster_name: String,
    notifier: NotifierExecutor,
    handler: Arc<dyn NotifierHandler>,
    reporter: Arc<dyn AnalyticsReporter>,
}

impl DefaultExecutor {
    pub fn new(
        platform: impl Into<String>,
        config: Arc<Config>,
        handler: Arc<dyn NotifierHandler>,
        reporter: Arc<dyn AnalyticsReporter>,
    ) -> Self {
        let cluster_name = config.settings.cluster_name.clone();
        Self {
            platform: platform.into(),
            notifier: NotifierExecutor::new(cluster_name.clone(), config),
            cluster_name,
            handler,
            reporter,
        }
    }

    fn report(&self, command: &GenericCommand, verb: &str) {
        if let Err(e) = self
            .reporter
            .report_command(&self.platform, verb, command.origin)
        {
            warn!(error = %e, command = verb, "failed to report command");
        }
    }
}

#[async_trait]
impl Executor for DefaultExecutor {
    async fn execute(&self, command: &GenericCommand, conversation: &Conversation) -> Message {
        let args: Vec<&str> = command.text.split_whitespace().collect();
        debug!(
            channel = %conversation.id,
            origin = %command.origin,
            args = args.len(),
            "executing command"
        );

        match args.first().copied() {
            Some(NOTIFIER_COMMAND) => {
                let verb = args[..args.len().min(2)].join(" ");
                self.report(command, &verb);
                let show_config = args.get(1).is_some_and(|v| v.eq_ignore_ascii_case("showconfig"));
                match self.notifier.execute(&args, conversation, self.handler.as_ref()) {
                    Ok(reply) if show_config => Message::code(reply),
                    Ok(reply) => Message::plain(reply),
                    Err(e) => {
                        debug!(error = %e, "notifier command rejected");
                        Message::plain(e.to_string())
                    },
                }
            },
            Some(PING_COMMAND) => {
                self.report(command, PING_COMMAND);
                Message::plain(format!("pong from cluster '{}'", self.cluster_name))
            },
            _ => Message::plain(UNSUPPORTED_REPLY),
        }
    }
}
