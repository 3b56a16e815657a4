use std::sync::Arc;

use {
    herald_channels::{ChannelMap, ChannelRegistry},
    herald_common::Event,
    tracing::{debug, info},
};

#[cfg(feature = "metrics")]
use herald_metrics::{counter, notifications as notif_metrics};

/// Target channels for `event`, produced by `sources`.
///
/// An explicit channel on the event wins outright. Otherwise see
/// [`channels_to_notify`].
pub fn notification_targets(
    event: &Event,
    sources: &[String],
    channels: &ChannelMap,
) -> Vec<String> {
    if let Some(channel) = event.explicit_channel() {
        debug!(channel, "event routed to explicit channel");
        return vec![channel.to_string()];
    }
    channels_to_notify(sources, channels)
}

/// Channels with notifications on whose source bindings share at least one
/// name with `sources`, sorted by identifier.
pub fn channels_to_notify(sources: &[String], channels: &ChannelMap) -> Vec<String> {
    let mut out: Vec<String> = channels
        .values()
        .filter(|cfg| {
            if !cfg.notify {
                info!(
                    channel = %cfg.identifier,
                    "skipping notification, notifications are disabled for channel"
                );
                return false;
            }
            cfg.bindings.sources.iter().any(|s| sources.contains(s))
        })
        .map(|cfg| cfg.identifier.clone())
        .collect();
    out.sort();
    out
}

/// Routes against the live registry.
#[derive(Clone)]
pub struct Router {
    registry: Arc<ChannelRegistry>,
}

impl Router {
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    pub fn targets(&self, event: &Event, sources: &[String]) -> Vec<String> {
        let targets = notification_targets(event, sources, &self.registry.get());
        #[cfg(feature = "metrics")]
        counter!(notif_metrics::ROUTED_TOTAL).increment(targets.len() as u64);
        debug!(
            event_type = %event.event_type,
            count = targets.len(),
            "event routed"
        );
        targets
    }

    /// Targets for a message that is not an event.
    pub fn targets_for_sources(&self, sources: &[String]) -> Vec<String> {
        channels_to_notify(sources, &self.registry.get())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        herald_channels::ChannelConfig,
        herald_common::EventType,
        herald_config::BotBindings,
        rstest::rstest,
    };

    fn channel(id: &str, notify: bool, sources: &[&str]) -> ChannelConfig {
        ChannelConfig {
            identifier: id.into(),
            alias: id.to_lowercase(),
            notify,
            bindings: BotBindings {
                sources: sources.iter().map(|s| s.to_string()).collect(),
                executors: vec![],
            },
        }
    }

    fn registry() -> Arc<ChannelRegistry> {
        Arc::new(ChannelRegistry::new([
            channel("A", true, &["k8s-events"]),
            channel("B", false, &["k8s-events"]),
            channel("C", true, &["k8s-err", "k8s-events"]),
            channel("D", true, &["k8s-create"]),
        ]))
    }

    fn sources(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn event() -> Event {
        Event::new(EventType::Create, "v1/pods", "dev")
    }

    #[rstest]
    #[case::single_source(&["k8s-events"], &["A", "C"])]
    #[case::any_overlap(&["k8s-create", "k8s-err"], &["C", "D"])]
    #[case::no_overlap(&["other"], &[])]
    #[case::no_sources(&[], &[])]
    fn routes_by_source_intersection(#[case] from: &[&str], #[case] expected: &[&str]) {
        let router = Router::new(registry());
        assert_eq!(router.targets(&event(), &sources(from)), sources(expected));
    }

    #[test]
    fn disabled_channel_never_receives() {
        let registry = Arc::new(ChannelRegistry::new([
            channel("A", true, &["k8s-events"]),
            channel("B", false, &["k8s-events"]),
        ]));
        let router = Router::new(registry);
        assert_eq!(router.targets(&event(), &sources(&["k8s-events"])), vec!["A"]);
    }

    #[test]
    fn explicit_channel_overrides_everything() {
        let router = Router::new(registry());
        let ev = event().with_channel("X");
        assert_eq!(router.targets(&ev, &sources(&["k8s-events"])), vec!["X"]);
        assert_eq!(router.targets(&ev, &[]), vec!["X"]);

        let ev = event().with_channel("B");
        assert_eq!(router.targets(&ev, &[]), vec!["B"]);
    }

    #[test]
    fn toggle_is_seen_by_next_route() {
        let router = Router::new(registry());
        router.registry().set_notify("B", true).unwrap();
        assert_eq!(
            router.targets(&event(), &sources(&["k8s-events"])),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn generic_messages_ignore_event_override() {
        let router = Router::new(registry());
        assert_eq!(router.targets_for_sources(&sources(&["k8s-create"])), vec!["D"]);
    }
}
