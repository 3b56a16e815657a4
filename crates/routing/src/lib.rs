//! Decide which channels an event goes to.
//!
//! Precedence:
//! 1. Explicit channel on the event (bypasses every check)
//! 2. Channels with notifications on whose source bindings intersect the
//!    event's sources

pub mod resolve;

pub use resolve::{Router, channels_to_notify, notification_targets};
