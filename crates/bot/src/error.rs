use herald_channels::DeliveryErrors;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid bot mention pattern: {0}")]
    Mention(#[from] regex::Error),

    #[error(transparent)]
    Channel(#[from] herald_channels::Error),

    #[error(transparent)]
    Delivery(#[from] DeliveryErrors),

    #[error("inbound listener failed: {0}")]
    Listener(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
