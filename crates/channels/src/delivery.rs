use std::{borrow::Cow, sync::Arc};

use {
    futures::StreamExt,
    herald_common::{Message, MessageType},
    herald_config::schema::DeliverySettings,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use crate::{
    Error, Result,
    error::DeliveryErrors,
    plugin::{DeliveryAdapter, FileRef, ModalView, PostOptions},
};

#[cfg(feature = "metrics")]
use herald_metrics::{counter, labels, notifications as notif_metrics};

pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 3000;
pub const DEFAULT_WORKER_LIMIT: usize = 4;

/// Where and how to answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyContext {
    pub channel: String,
    /// Requesting user; ephemeral replies need one.
    pub user: Option<String>,
    pub thread_ts: Option<String>,
    /// Lets a popup open as a modal.
    pub trigger_id: Option<String>,
    /// Lets a reply replace the message it came from.
    pub response_url: Option<String>,
}

impl ReplyContext {
    /// Top-level post to `channel`, no interaction attached.
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Default::default()
        }
    }
}

/// Delivers messages through a platform adapter.
///
/// Fan-out runs at most `worker_limit` deliveries at once. A failing channel
/// never stops the others; failures are reported together at the end.
pub struct DeliveryOrchestrator {
    adapter: Arc<dyn DeliveryAdapter>,
    max_message_size: usize,
    worker_limit: usize,
}

impl DeliveryOrchestrator {
    pub fn new(adapter: Arc<dyn DeliveryAdapter>) -> Self {
        Self {
            adapter,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            worker_limit: DEFAULT_WORKER_LIMIT,
        }
    }

    pub fn from_settings(adapter: Arc<dyn DeliveryAdapter>, settings: &DeliverySettings) -> Self {
        Self::new(adapter)
            .with_max_message_size(settings.max_message_size)
            .with_worker_limit(settings.worker_limit)
    }

    #[must_use]
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Zero is treated as one.
    #[must_use]
    pub fn with_worker_limit(mut self, limit: usize) -> Self {
        self.worker_limit = limit.max(1);
        self
    }

    pub fn worker_limit(&self) -> usize {
        self.worker_limit
    }

    /// Deliver one message to one place.
    pub async fn send(&self, ctx: &ReplyContext, message: &Message) -> Result<()> {
        let rendered = message.render_plain();
        if rendered.is_empty() && !message.has_interactive_elements() {
            return Err(Error::EmptyMessage);
        }

        let mut message = Cow::Borrowed(message);
        let mut file: Option<FileRef> = None;
        if rendered.len() > self.max_message_size {
            debug!(
                channel = %ctx.channel,
                size = rendered.len(),
                limit = self.max_message_size,
                "message too long, uploading as file"
            );
            file = Some(
                self.adapter
                    .upload_file(&ctx.channel, &rendered, ctx.thread_ts.as_deref())
                    .await?,
            );
            message = Cow::Owned(message.file_fallback());
            if !message.has_interactive_elements() {
                return Ok(());
            }
        }

        if message.message_type == MessageType::Popup {
            if let Some(trigger_id) = ctx.trigger_id.as_deref() {
                let view = ModalView {
                    private_metadata: ctx.channel.clone(),
                    message: message.into_owned(),
                };
                return self.adapter.open_modal(trigger_id, &view).await;
            }
            debug!(channel = %ctx.channel, "no trigger for popup, posting inline");
        }

        if message.only_visible_for_you {
            if let Some(user) = ctx.user.as_deref() {
                return self
                    .adapter
                    .post_ephemeral(&ctx.channel, user, &message)
                    .await;
            }
            debug!(channel = %ctx.channel, "no requesting user, posting publicly");
        }

        let options = PostOptions {
            thread_ts: thread_target(ctx.thread_ts.as_deref(), file.as_ref()),
            replace_original: message
                .replace_original
                .then(|| ctx.response_url.clone())
                .flatten(),
        };
        let id = self.adapter.post(&ctx.channel, &message, &options).await?;
        debug!(channel = %ctx.channel, id = %id, "message posted");
        Ok(())
    }

    /// Deliver `message` to every target channel.
    ///
    /// Cancellation stops pending deliveries; deliveries already finished
    /// stay delivered and failures gathered so far are still returned.
    pub async fn deliver(
        &self,
        targets: &[String],
        message: &Message,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), DeliveryErrors> {
        let mut errors = DeliveryErrors::default();
        let mut pending = futures::stream::iter(targets.iter().cloned())
            .map(|channel: String| async move {
                let result = self.send(&ReplyContext::channel(channel.as_str()), message).await;
                (channel, result)
            })
            .buffer_unordered(self.worker_limit);

        let mut delivered = 0usize;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!(delivered, total = targets.len(), "delivery cancelled");
                    break;
                }
                next = pending.next() => match next {
                    Some((channel, Ok(()))) => {
                        delivered += 1;
                        #[cfg(feature = "metrics")]
                        counter!(notif_metrics::DELIVERED_TOTAL).increment(1);
                        debug!(channel = %channel, "delivered");
                    },
                    Some((channel, Err(e))) => {
                        #[cfg(feature = "metrics")]
                        counter!(notif_metrics::FAILED_TOTAL, labels::CHANNEL => channel.clone())
                            .increment(1);
                        warn!(channel = %channel, error = %e, "delivery failed");
                        errors.push(channel, e);
                    },
                    None => break,
                },
            }
        }

        if !errors.is_empty() {
            info!(
                delivered,
                failed = errors.len(),
                "fan-out finished with failures"
            );
        }
        errors.into_result()
    }
}

/// Thread to reply in: the requested one, else the thread the uploaded file
/// opened.
fn thread_target(requested: Option<&str>, file: Option<&FileRef>) -> Option<String> {
    requested
        .filter(|ts| !ts.is_empty())
        .or_else(|| file.and_then(FileRef::first_share_ts))
        .map(str::to_string)
}
