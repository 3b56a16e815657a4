use std::{
    collections::HashMap,
    sync::{Mutex, RwLock},
};

use {
    herald_config::{BotBindings, ChannelBindings, Config},
    tracing::{debug, info},
};

use crate::{Error, Result, plugin::NotifierHandler};

#[cfg(feature = "metrics")]
use herald_metrics::{channels as ch_metrics, gauge};

/// Runtime state of one configured channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Platform identifier, the registry key.
    pub identifier: String,
    /// Name the channel has in the config file.
    pub alias: String,
    pub notify: bool,
    pub bindings: BotBindings,
}

impl ChannelConfig {
    pub fn from_bindings(alias: &str, bindings: &ChannelBindings) -> Self {
        Self {
            identifier: bindings.name.clone(),
            alias: alias.to_string(),
            notify: !bindings.notification.disabled,
            bindings: bindings.bindings.clone(),
        }
    }
}

/// Channel identifier to channel state.
pub type ChannelMap = HashMap<String, ChannelConfig>;

/// Channels one bot serves, with their live notification flags.
///
/// Reads hand out snapshots. Toggles are serialized among themselves so that
/// two concurrent read-modify-write cycles never drop each other's update.
pub struct ChannelRegistry {
    channels: RwLock<ChannelMap>,
    toggle: Mutex<()>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ChannelRegistry {
    pub fn new(channels: impl IntoIterator<Item = ChannelConfig>) -> Self {
        let channels: ChannelMap = channels
            .into_iter()
            .map(|c| (c.identifier.clone(), c))
            .collect();
        #[cfg(feature = "metrics")]
        gauge!(ch_metrics::CONFIGURED).set(channels.len() as f64);
        Self {
            channels: RwLock::new(channels),
            toggle: Mutex::new(()),
        }
    }

    /// Channels of every enabled chat integration, across all communication
    /// groups. A later group wins when two declare the same identifier.
    pub fn from_config(config: &Config) -> Self {
        let mut channels = Vec::new();
        for group in config.communications.values() {
            let enabled = [
                (group.slack.enabled, &group.slack.channels),
                (group.socket_slack.enabled, &group.socket_slack.channels),
                (group.discord.enabled, &group.discord.channels),
            ];
            for (_, bound) in enabled.into_iter().filter(|(on, _)| *on) {
                channels.extend(
                    bound
                        .iter()
                        .map(|(alias, b)| ChannelConfig::from_bindings(alias, b)),
                );
            }
        }
        debug!(count = channels.len(), "channel registry built from config");
        Self::new(channels)
    }

    /// Point-in-time copy of every channel.
    pub fn get(&self) -> ChannelMap {
        self.channels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn channel(&self, identifier: &str) -> Option<ChannelConfig> {
        self.channels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(identifier)
            .cloned()
    }

    /// Sorted channel identifiers.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .channels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.channels.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flip the notification flag of a known channel. Unknown channels are
    /// rejected and never added.
    pub fn set_notify(&self, identifier: &str, enabled: bool) -> Result<()> {
        let _guard = self.toggle.lock().unwrap_or_else(|e| e.into_inner());

        let mut channels = self.get();
        let Some(channel) = channels.get_mut(identifier) else {
            return Err(Error::channel_not_found(identifier));
        };
        channel.notify = enabled;
        *self.channels.write().unwrap_or_else(|e| e.into_inner()) = channels;

        info!(channel = identifier, enabled, "channel notifications toggled");
        #[cfg(feature = "metrics")]
        gauge!(ch_metrics::NOTIFYING).set(self.notifying_count() as f64);
        Ok(())
    }

    #[cfg(feature = "metrics")]
    fn notifying_count(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|c| c.notify)
            .count()
    }
}

impl NotifierHandler for ChannelRegistry {
    fn notifications_enabled(&self, channel: &str) -> bool {
        self.channel(channel).is_some_and(|c| c.notify)
    }

    fn set_notifications_enabled(&self, channel: &str, enabled: bool) -> Result<()> {
        self.set_notify(channel, enabled)
    }
}
