//! Cluster events.
//!
//! An [`Event`] is built by the watcher from a Kubernetes object and is never
//! mutated afterwards. Routing only looks at [`Event::channel`]; everything
//! else is carried through to the renderer.

use std::{fmt, str::FromStr};

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use crate::Error;

/// Kind of change observed on a watched resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Create,
    Update,
    Delete,
    Error,
    Warning,
    Info,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Fixed severity table for event types.
    pub fn level(&self) -> Level {
        match self {
            Self::Create | Self::Info => Level::Info,
            Self::Update => Level::Warn,
            Self::Delete => Level::Critical,
            Self::Error | Self::Warning => Level::Error,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(Error::unknown_variant("event type", s)),
        }
    }
}

/// Notification severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Debug => "debug",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Automated action bound to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventAction {
    /// Command to run, including the bot name prefix.
    pub command: String,
    pub executor_bindings: Vec<String>,
    pub display_name: String,
}

/// Information extracted from a watched Kubernetes object.
///
/// Deserialized events get their level from the type table and, when none
/// is given, the same title [`Event::new`] would build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEvent")]
pub struct Event {
    pub kind: String,
    pub api_version: String,
    pub title: String,
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub level: Level,
    pub reason: String,
    pub error: String,
    pub cluster: String,
    /// Explicit target channel. When set, routing is bypassed entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub count: i32,
    pub action: String,
    pub resource: String,
    pub messages: Vec<String>,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
    pub actions: Vec<EventAction>,
}

/// Wire form of [`Event`]. A `level` on the wire is ignored.
#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(rename = "type")]
    event_type: EventType,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    error: String,
    #[serde(default)]
    cluster: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    count: i32,
    #[serde(default)]
    action: String,
    #[serde(default)]
    resource: String,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    actions: Vec<EventAction>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        let title = if raw.title.is_empty() {
            default_title(raw.event_type, &raw.resource)
        } else {
            raw.title
        };
        Self {
            kind: raw.kind,
            api_version: raw.api_version,
            title,
            name: raw.name,
            namespace: raw.namespace,
            event_type: raw.event_type,
            level: raw.event_type.level(),
            reason: raw.reason,
            error: raw.error,
            cluster: raw.cluster,
            channel: raw.channel,
            timestamp: raw.timestamp,
            count: raw.count,
            action: raw.action,
            resource: raw.resource,
            messages: raw.messages,
            recommendations: raw.recommendations,
            warnings: raw.warnings,
            actions: raw.actions,
        }
    }
}

fn default_title(event_type: EventType, resource: &str) -> String {
    match event_type {
        EventType::Error | EventType::Info => format!("{resource} {event_type}"),
        // create/update/delete read as past tense
        _ => format!("{resource} {event_type}d"),
    }
}

impl Event {
    /// Build an event for `resource` in `cluster`, deriving level and title.
    pub fn new(
        event_type: EventType,
        resource: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        let resource = resource.into();
        Self {
            kind: String::new(),
            api_version: String::new(),
            title: default_title(event_type, &resource),
            name: String::new(),
            namespace: String::new(),
            event_type,
            level: event_type.level(),
            reason: String::new(),
            error: String::new(),
            cluster: cluster.into(),
            channel: None,
            timestamp: Utc::now(),
            count: 0,
            action: String::new(),
            resource,
            messages: Vec::new(),
            recommendations: Vec::new(),
            warnings: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Route this event to a single channel, ignoring bindings.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// The explicit routing override, if non-empty.
    pub fn explicit_channel(&self) -> Option<&str> {
        self.channel.as_deref().filter(|c| !c.is_empty())
    }

    pub fn has_recommendations_or_warnings(&self) -> bool {
        !self.recommendations.is_empty() || !self.warnings.is_empty()
    }
}
