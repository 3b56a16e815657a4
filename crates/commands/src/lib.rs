//! Built-in commands answered by the bot itself.
//!
//! `notifier start|stop|status|showconfig` toggles and reports channel
//! notifications; `ping` checks the bot is alive.

pub mod error;
pub mod executor;
pub mod notifier;

pub use {
    error::{Error, Result},
    executor::DefaultExecutor,
    notifier::NotifierExecutor,
};
