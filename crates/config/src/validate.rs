//! Binding and credential validation.
//!
//! Every check runs to completion; diagnostics are collected and split into
//! criticals (startup must abort) and warnings (usable but contradictory).
//! A diagnostic's [`Tag`] alone decides which side it lands on.

use std::{collections::BTreeMap, fmt};

use secrecy::ExposeSecret;

use crate::{
    error::ValidationError,
    schema::{BotBindings, ChannelBindings, Config, Namespaces},
};

/// Required prefix of Slack bot tokens.
pub const BOT_TOKEN_PREFIX: &str = "xoxb-";
/// Required prefix of Slack app-level tokens.
pub const APP_TOKEN_PREFIX: &str = "xapp-";

/// Kind of violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A binding references an undefined source or executor.
    InvalidBinding,
    /// A namespace include list mixes `.*` with explicit entries.
    ContradictoryNamespaceSelector,
    /// An enabled integration has no token.
    MissingCredential,
    /// A token does not carry the expected prefix.
    MalformedToken,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidBinding => "invalid_binding",
            Self::ContradictoryNamespaceSelector => "ns-include-regex",
            Self::MissingCredential => "required",
            Self::MalformedToken => "invalid_slack_token",
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::ContradictoryNamespaceSelector)
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub tag: Tag,
    /// Dotted path, e.g. `communications.default.slack.token`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key: '{}' {}", self.path, self.message)
    }
}

/// Outcome of [`validate`]. The two lists never share a diagnostic.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub criticals: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_criticals(&self) -> bool {
        !self.criticals.is_empty()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.criticals.is_empty() && self.warnings.is_empty()
    }

    /// Fail when any critical was reported, keeping warnings otherwise.
    pub fn into_result(self) -> Result<Vec<Diagnostic>, ValidationError> {
        if self.criticals.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ValidationError::Critical {
                diagnostics: self.criticals,
            })
        }
    }

    fn report(&mut self, tag: Tag, path: impl Into<String>, message: impl Into<String>) {
        let d = Diagnostic {
            tag,
            path: path.into(),
            message: message.into(),
        };
        if tag.is_warning() {
            self.warnings.push(d);
        } else {
            self.criticals.push(d);
        }
    }
}

/// Validate bindings, namespace selectors and tokens of `config`.
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::default();

    for (name, source) in &config.sources {
        let base = format!("sources.{name}.kubernetes");
        check_namespaces(&mut result, &format!("{base}.namespaces"), &source.kubernetes.namespaces);
        for (i, resource) in source.kubernetes.resources.iter().enumerate() {
            check_namespaces(
                &mut result,
                &format!("{base}.resources[{i}].namespaces"),
                &resource.namespaces,
            );
        }
    }

    for (name, executor) in &config.executors {
        check_namespaces(
            &mut result,
            &format!("executors.{name}.kubectl.namespaces"),
            &executor.kubectl.namespaces,
        );
    }

    for (name, action) in &config.actions {
        let path = format!("actions.{name}.bindings");
        check_sources(&mut result, config, &path, &action.bindings.sources);
        check_executors(&mut result, config, &path, &action.bindings.executors);
    }

    for (group, comm) in &config.communications {
        let base = format!("communications.{group}");

        check_channels(&mut result, config, &format!("{base}.slack"), &comm.slack.channels);
        check_channels(
            &mut result,
            config,
            &format!("{base}.socket_slack"),
            &comm.socket_slack.channels,
        );
        check_channels(&mut result, config, &format!("{base}.discord"), &comm.discord.channels);
        check_sources(
            &mut result,
            config,
            &format!("{base}.webhook.bindings"),
            &comm.webhook.bindings.sources,
        );

        if comm.slack.enabled {
            check_token(
                &mut result,
                &format!("{base}.slack.token"),
                comm.slack.token.expose_secret(),
                Some(BOT_TOKEN_PREFIX),
            );
        }
        if comm.socket_slack.enabled {
            check_token(
                &mut result,
                &format!("{base}.socket_slack.app_token"),
                comm.socket_slack.app_token.expose_secret(),
                Some(APP_TOKEN_PREFIX),
            );
            check_token(
                &mut result,
                &format!("{base}.socket_slack.bot_token"),
                comm.socket_slack.bot_token.expose_secret(),
                Some(BOT_TOKEN_PREFIX),
            );
        }
        if comm.discord.enabled {
            check_token(
                &mut result,
                &format!("{base}.discord.token"),
                comm.discord.token.expose_secret(),
                None,
            );
        }
    }

    result
}

fn check_channels(
    result: &mut ValidationResult,
    config: &Config,
    base: &str,
    channels: &BTreeMap<String, ChannelBindings>,
) {
    for (alias, channel) in channels {
        let path = format!("{base}.channels.{alias}.bindings");
        let BotBindings { sources, executors } = &channel.bindings;
        check_sources(result, config, &path, sources);
        check_executors(result, config, &path, executors);
    }
}

fn check_sources(result: &mut ValidationResult, config: &Config, path: &str, bindings: &[String]) {
    for name in bindings.iter().filter(|n| !config.sources.contains_key(n.as_str())) {
        result.report(
            Tag::InvalidBinding,
            format!("{path}.sources"),
            format!("'{name}' binding not defined in Config.Sources"),
        );
    }
}

fn check_executors(
    result: &mut ValidationResult,
    config: &Config,
    path: &str,
    bindings: &[String],
) {
    for name in bindings.iter().filter(|n| !config.executors.contains_key(n.as_str())) {
        result.report(
            Tag::InvalidBinding,
            format!("{path}.executors"),
            format!("'{name}' binding not defined in Config.Executors"),
        );
    }
}

fn check_namespaces(result: &mut ValidationResult, path: &str, ns: &Namespaces) {
    // a lone ".*" is the normal way to select everything
    if ns.include.len() < 2 {
        return;
    }
    if ns.includes_all() {
        result.report(
            Tag::ContradictoryNamespaceSelector,
            format!("{path}.include"),
            "Include matches both all and exact namespaces",
        );
    }
}

fn check_token(result: &mut ValidationResult, path: &str, token: &str, prefix: Option<&str>) {
    let field = path.rsplit('.').next().unwrap_or(path);
    if token.is_empty() {
        result.report(Tag::MissingCredential, path, format!("{field} is a required field"));
        return;
    }
    if let Some(prefix) = prefix
        && !token.starts_with(prefix)
    {
        result.report(
            Tag::MalformedToken,
            path,
            format!("{field} must have the {prefix} prefix"),
        );
    }
}
