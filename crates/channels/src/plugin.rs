//! Seams to the collaborators around the routing core: the platform delivery
//! adapter, the command executor, and the analytics reporter.

use std::collections::BTreeMap;

use {
    async_trait::async_trait,
    herald_common::{GenericCommand, Message, Origin},
    serde::{Deserialize, Serialize},
};

use crate::Result;

/// Platform identifier of a posted message (a Slack `ts`, a Discord snowflake).
pub type DeliveryId = String;

/// One place an uploaded file was shared to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileShare {
    /// Timestamp of the message carrying the file. May be empty while the
    /// platform is still processing the share.
    pub ts: String,
}

/// An uploaded file and its public share history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: String,
    /// Shares keyed by channel ID. Each list is in share order.
    pub public_shares: BTreeMap<String, Vec<FileShare>>,
}

impl FileRef {
    /// Timestamp of the earliest public share.
    ///
    /// Only the first share of each channel counts, and shares with an empty
    /// timestamp are ignored.
    pub fn first_share_ts(&self) -> Option<&str> {
        self.public_shares
            .values()
            .filter_map(|shares| shares.first())
            .map(|share| share.ts.as_str())
            .filter(|ts| !ts.is_empty())
            .min_by_key(|ts| ts_sort_key(*ts))
    }
}

/// Slack-style `seconds.fraction` timestamps; anything unparsable sorts last.
///
/// Digit strings without trailing zeros order the same way as the decimal
/// fractions they spell, so `1.10` and `1.1` tie and `1.05` precedes `1.5`.
fn ts_sort_key(ts: &str) -> (bool, u64, &str) {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, ""));
    match secs.parse::<u64>() {
        Ok(secs) if frac.bytes().all(|b| b.is_ascii_digit()) => {
            (false, secs, frac.trim_end_matches('0'))
        },
        _ => (true, u64::MAX, ""),
    }
}

/// Per-post delivery options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostOptions {
    /// Reply inside this thread instead of posting top-level.
    pub thread_ts: Option<String>,
    /// Replace the message behind this response handle.
    pub replace_original: Option<String>,
}

/// Modal opened in response to an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    /// Channel the modal belongs to; submissions are answered there.
    pub private_metadata: String,
    pub message: Message,
}

/// Wire-level transport to one chat platform.
#[async_trait]
pub trait DeliveryAdapter: Send + Sync {
    /// Post a message, returning the platform ID of the new message.
    async fn post(
        &self,
        channel: &str,
        message: &Message,
        options: &PostOptions,
    ) -> Result<DeliveryId>;

    /// Post a message only `user` can see.
    async fn post_ephemeral(&self, channel: &str, user: &str, message: &Message) -> Result<()>;

    async fn open_modal(&self, trigger_id: &str, view: &ModalView) -> Result<()>;

    /// Upload `content` as a file attachment.
    async fn upload_file(
        &self,
        channel: &str,
        content: &str,
        thread_ts: Option<&str>,
    ) -> Result<FileRef>;
}

/// Runtime notification toggle, exposed to the command layer.
pub trait NotifierHandler: Send + Sync {
    /// `false` for channels the bot does not know.
    fn notifications_enabled(&self, channel: &str) -> bool;

    /// Fails with [`crate::Error::ChannelNotFound`] for unknown channels.
    fn set_notifications_enabled(&self, channel: &str, enabled: bool) -> Result<()>;
}

/// Where a command was issued from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    /// Channel identifier as known to the registry.
    pub id: String,
    pub alias: String,
    pub executor_bindings: Vec<String>,
    /// The channel is configured for this bot.
    pub is_authenticated: bool,
    /// Requesting user, in platform mention form.
    pub user: String,
}

/// Turns a generic command into a response message.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, command: &GenericCommand, conversation: &Conversation) -> Message;
}

/// Collects usage analytics. Reporting failures are logged, never fatal.
pub trait AnalyticsReporter: Send + Sync {
    fn report_command(&self, platform: &str, command: &str, origin: Origin) -> Result<()>;
}

/// Reporter that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl AnalyticsReporter for NoopReporter {
    fn report_command(&self, _platform: &str, _command: &str, _origin: Origin) -> Result<()> {
        Ok(())
    }
}
