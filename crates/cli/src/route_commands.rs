//! Dry-run tooling: where would an event go, what command does a click send.

use std::{path::Path, sync::Arc};

use {
    anyhow::{Context, Result},
    herald_bot::event_message,
    herald_channels::{ChannelRegistry, InteractionPayload, interaction::BlockAction, resolve},
    herald_common::Event,
    herald_config::load_validated,
    herald_routing::Router,
    tracing::debug,
};

/// Print the channels `event_path` would be delivered to.
pub fn route(
    config_path: &Path,
    event_path: &Path,
    sources: &[String],
    render: bool,
) -> Result<()> {
    let (event, targets) = targets_for(config_path, event_path, sources)?;
    if targets.is_empty() {
        eprintln!("No channel would receive this event.");
    }
    for target in &targets {
        println!("{target}");
    }

    if render {
        println!("\n{}", event_message(&event).render_plain());
    }
    Ok(())
}

fn targets_for(
    config_path: &Path,
    event_path: &Path,
    sources: &[String],
) -> Result<(Event, Vec<String>)> {
    let config = load_validated(config_path)?;
    let registry = Arc::new(ChannelRegistry::from_config(&config));
    let event = read_event(event_path)?;
    debug!(channels = registry.len(), sources = sources.len(), "routing event");

    let targets = Router::new(registry).targets(&event, sources);
    Ok((event, targets))
}

/// Print the command a recorded interaction payload resolves to.
pub fn resolve_payload(payload_path: &Path) -> Result<()> {
    let payload = read_payload(payload_path)?;
    if payload.is_link() {
        println!("link button {:?}, no command", payload.action_id());
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&resolve(&payload))?);
    Ok(())
}

fn read_event(path: &Path) -> Result<Event> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid event JSON in {}", path.display()))
}

fn read_payload(path: &Path) -> Result<InteractionPayload> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    let action: BlockAction = serde_json::from_str(&raw)
        .with_context(|| format!("invalid payload JSON in {}", path.display()))?;
    Ok(action.into())
}
