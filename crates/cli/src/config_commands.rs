use std::path::Path;

use {
    anyhow::Result,
    clap::Subcommand,
    herald_config::{Diagnostic, ValidationResult, load_config, resolve_config_path, validate},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check,
    /// Print the resolved configuration with secrets redacted.
    Show,
}

pub fn handle_config(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(explicit)?;
    match action {
        ConfigAction::Check => check(&path),
        ConfigAction::Show => {
            let config = load_config(&path)?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(path: &Path) -> Result<()> {
    eprintln!("Checking {}\n", path.display());
    let config = load_config(path)?;
    let result = validate(&config);

    let report = render_report(&result);
    if !report.is_empty() {
        eprintln!("{report}\n");
    }

    let (errors, warnings) = (result.criticals.len(), result.warnings.len());
    if result.is_clean() {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if result.has_criticals() {
        std::process::exit(1);
    }
    Ok(())
}

fn render_report(result: &ValidationResult) -> String {
    let line = |color: &str, label: &str, d: &Diagnostic| {
        format!("  {BOLD}{color}{label}{RESET} [{}] {d}", d.tag.as_str())
    };
    result
        .criticals
        .iter()
        .map(|d| line(RED, "error", d))
        .chain(result.warnings.iter().map(|d| line(YELLOW, "warning", d)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, herald_config::Config};

    #[test]
    fn report_lists_criticals_before_warnings() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "sources": {
                "k8s": { "kubernetes": { "namespaces": { "include": [".*", "default"] } } }
            },
            "communications": {
                "default": {
                    "slack": {
                        "channels": {
                            "ops": { "name": "ops", "bindings": { "sources": ["missing"] } }
                        }
                    }
                }
            }
        }))
        .unwrap();

        let report = render_report(&validate(&config));
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("error") && lines[0].contains("[invalid_binding]"));
        assert!(lines[1].contains("warning") && lines[1].contains("[ns-include-regex]"));
    }

    #[test]
    fn clean_config_has_empty_report() {
        assert!(render_report(&validate(&Config::default())).is_empty());
    }
}
