//! Metric name and label definitions.
//!
//! Every metric herald records is named here so the set of exported series
//! is documented in one place.

/// Outgoing notification metrics
pub mod notifications {
    /// Channel targets computed by the router
    pub const ROUTED_TOTAL: &str = "herald_notifications_routed_total";
    /// Per-channel deliveries that succeeded
    pub const DELIVERED_TOTAL: &str = "herald_notifications_delivered_total";
    /// Per-channel deliveries that failed
    pub const FAILED_TOTAL: &str = "herald_notifications_failed_total";
    /// Wall time of one fan-out in seconds
    pub const FANOUT_DURATION_SECONDS: &str = "herald_notifications_fanout_duration_seconds";
}

/// Channel registry metrics
pub mod channels {
    /// Channels loaded from configuration
    pub const CONFIGURED: &str = "herald_channels_configured";
    /// Channels with notifications currently enabled
    pub const NOTIFYING: &str = "herald_channels_notifying";
}

/// Inbound traffic metrics
pub mod inbound {
    /// Items taken off the inbound queue
    pub const RECEIVED_TOTAL: &str = "herald_inbound_received_total";
    /// Interactions skipped before resolution
    pub const SKIPPED_TOTAL: &str = "herald_inbound_skipped_total";
    /// Commands handed to the executor
    pub const COMMANDS_TOTAL: &str = "herald_inbound_commands_total";
}

/// Common label keys
pub mod labels {
    pub const CHANNEL: &str = "channel";
    pub const KIND: &str = "kind";
    pub const ORIGIN: &str = "origin";
    pub const REASON: &str = "reason";
}

/// Histogram buckets
pub mod buckets {
    use once_cell::sync::Lazy;

    /// Fan-out duration buckets (in seconds)
    /// Covers 10ms to 2 minutes; platform rate limits stretch the tail.
    pub static FANOUT_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
        ]
    });
}
