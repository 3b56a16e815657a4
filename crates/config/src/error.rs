use crate::validate::Diagnostic;

/// Configuration rejected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// At least one critical diagnostic; all of them are listed.
    #[error(
        "found {} critical configuration error(s):\n{}",
        diagnostics.len(),
        render(diagnostics)
    )]
    Critical { diagnostics: Vec<Diagnostic> },
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  * {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}
