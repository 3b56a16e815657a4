use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    schema::Config,
    validate::{self, ValidationResult},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["herald.toml", "herald.yaml", "herald.yml", "herald.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load and validate, failing on critical diagnostics.
///
/// Warnings are logged and do not block startup.
pub fn load_validated(path: &Path) -> anyhow::Result<Config> {
    let config = load_config(path)?;
    let result = validate::validate(&config);
    log_warnings(&result);
    result.into_result()?;
    debug!(path = %path.display(), "configuration validated");
    Ok(config)
}

pub(crate) fn log_warnings(result: &ValidationResult) {
    for w in &result.warnings {
        warn!(tag = w.tag.as_str(), "{}", w.message);
    }
}

/// Find the first config file in standard locations.
///
/// Search order:
/// 1. `./herald.{toml,yaml,yml,json}`
/// 2. `<user config dir>/herald/herald.{toml,yaml,yml,json}`
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "herald").map(|d| d.config_dir().to_path_buf())
}

/// Resolve an explicit path or fall back to discovery.
pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    find_config_file().ok_or_else(|| {
        anyhow::anyhow!(
            "no config file found (looked for {} in ./ and the user config dir)",
            CONFIG_FILENAMES.join(", ")
        )
    })
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<Config> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
