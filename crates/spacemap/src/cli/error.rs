//! Helpful error types for CLI commands
//!
//! Errors carry what went wrong, optional context, and suggestions.

use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    // === Common error constructors ===

    pub fn manifest_not_found(path: &Path) -> Self {
        Self::new(format!("Manifest not found: {}", path.display()))
            .with_context("migrate needs a JSON manifest of class declarations")
            .with_suggestions([
                format!("TRY: Check the path: ls -la {}", path.display()),
                "TRY: Start from {\"classes\": []} and add entity/repository entries".to_string(),
            ])
    }

    pub fn invalid_manifest(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid manifest {}: {}", path.display(), details))
            .with_context("Each class needs a kind (entity or repository) and a name")
            .with_suggestions([
                "TRY: Validate the JSON syntax".to_string(),
                "TRY: Give every public property exactly one entry in \"types\"".to_string(),
            ])
    }

    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Config file not found: {}", path.display()))
            .with_context("--config was given explicitly")
            .with_suggestions(["TRY: Drop --config to use $SPACEMAP_HOME/config.toml".to_string()])
    }

    pub fn space_not_found(space: &str, state: &Path) -> Self {
        Self::new(format!("Space not found: {}", space))
            .with_context(format!("State file: {}", state.display()))
            .with_suggestions([format!(
                "TRY: List spaces: spacemap show --state {}",
                state.display()
            )])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print an error as `{"error": ..., "suggestions": [...]}` on stdout.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({
            "error": helpful.message,
            "context": helpful.context,
            "suggestions": helpful.suggestions,
        }),
        None => serde_json::json!({ "error": format!("{:#}", err) }),
    };
    println!("{}", payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong").with_context("While migrating");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While migrating"));
    }

    #[test]
    fn test_manifest_not_found() {
        let err = HelpfulError::manifest_not_found(&PathBuf::from("/nonexistent/classes.json"));

        let display = format!("{}", err);
        assert!(display.contains("/nonexistent/classes.json"));
        assert!(display.contains("TRY:"));
    }
}
