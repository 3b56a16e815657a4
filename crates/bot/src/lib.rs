//! Bot runtime.
//!
//! A listener task pumps an [`InboundSource`] into a bounded queue; the
//! [`Bot`] takes items off it and handles each one concurrently:
//!
//! - events are routed to channels and fanned out,
//! - mentions, button clicks and modal submissions are resolved into
//!   commands, executed, and answered where they came from.
//!
//! One [`tokio_util::sync::CancellationToken`] stops the listener and every
//! in-flight delivery.

pub mod error;
pub mod inbound;
pub mod runtime;

pub use {
    error::{Error, Result},
    inbound::{Inbound, InboundSource, Mention, MentionMatcher, spawn_listener},
    runtime::{Bot, event_message},
};
