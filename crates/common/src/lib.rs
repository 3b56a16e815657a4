//! Shared types used across all herald crates.
//!
//! - [`event`]: cluster events as produced by the watcher.
//! - [`command`]: the generic `(text, origin)` command handed to executors.
//! - [`message`]: the platform-neutral interactive message model.

pub mod command;
pub mod error;
pub mod event;
pub mod message;

pub use {
    command::{GenericCommand, Origin},
    error::{Error, FromMessage, HeraldError, Result},
    event::{Event, EventAction, EventType, Level},
    message::{Message, MessageType},
};
