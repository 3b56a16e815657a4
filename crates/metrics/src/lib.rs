//! Metrics collection and export for herald.
//!
//! Every metric goes through the `metrics` crate facade, so recording is a
//! no-op until a recorder is installed. With the `prometheus` feature,
//! [`init_metrics`] installs a Prometheus recorder and the returned handle
//! renders the text exposition format.
//!
//! ```rust,ignore
//! use herald_metrics::{counter, notifications};
//!
//! counter!(notifications::DELIVERED_TOTAL).increment(1);
//! ```

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

pub use metrics::{counter, gauge, histogram};
