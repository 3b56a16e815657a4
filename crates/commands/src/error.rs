use herald_common::FromMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Wrong number of arguments.
    #[error("invalid command")]
    InvalidCommand,

    #[error("unsupported command")]
    UnsupportedCommand,

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Channel(#[from] herald_channels::Error),
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

herald_common::impl_context!();
