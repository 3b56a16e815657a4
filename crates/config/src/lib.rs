//! Configuration loading and validation.
//!
//! Config files: `herald.toml`, `herald.yaml` or `herald.json`, searched in
//! `./` then the user config directory. `${ENV_VAR}` and
//! `${ENV_VAR:-default}` placeholders are substituted before parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::ValidationError,
    loader::{config_dir, find_config_file, load_config, load_validated, resolve_config_path},
    schema::{ALL_NAMESPACE_INDICATOR, BotBindings, ChannelBindings, Config, Namespaces},
    validate::{Diagnostic, Tag, ValidationResult, validate},
};
