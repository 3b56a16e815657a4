use std::{error::Error as StdError, fmt};

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed channel errors shared across channel traits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The channel is not part of the registry; it is never created implicitly.
    #[error("notifications are not configured for channel {channel:?}")]
    ChannelNotFound { channel: String },

    /// Input payload or parameter is invalid.
    #[error("invalid channel input: {message}")]
    InvalidInput { message: String },

    /// The rendered response has no content to send.
    #[error("empty response")]
    EmptyMessage,

    /// Wrapped source error from a platform adapter.
    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn channel_not_found(channel: impl fmt::Display) -> Self {
        Self::ChannelNotFound {
            channel: channel.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn is_channel_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound { .. })
    }
}

/// One failed per-channel delivery.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub channel: String,
    pub error: Error,
}

/// Every per-channel failure of a fan-out. Returned only when at least one
/// target failed; successful targets are not listed.
#[derive(Debug, Default)]
pub struct DeliveryErrors {
    failures: Vec<DeliveryFailure>,
}

impl DeliveryErrors {
    pub fn push(&mut self, channel: impl Into<String>, error: Error) {
        self.failures.push(DeliveryFailure {
            channel: channel.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[DeliveryFailure] {
        &self.failures
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(mut self) -> std::result::Result<(), Self> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            self.failures.sort_by(|a, b| a.channel.cmp(&b.channel));
            Err(self)
        }
    }
}

impl fmt::Display for DeliveryErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) occurred:", self.failures.len())?;
        for failure in &self.failures {
            write!(
                f,
                "\n\t* while sending message to channel {:?}: {}",
                failure.channel, failure.error
            )?;
        }
        Ok(())
    }
}

impl StdError for DeliveryErrors {}
