//! Errors raised while loading and validating `assetflow.toml`.

use std::fmt;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use super::FieldPath;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file is not valid TOML")]
    Toml(#[from] toml::de::Error),

    /// Not `#[from]`: the diagnostics already render every problem, a
    /// `source()` chain would print them again.
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One invalid setting.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} {}: {}", "✗".red(), self.field, self.message)?;
        match &self.hint {
            Some(hint) => write!(f, "\n    {} {hint}", "hint:".yellow()),
            None => Ok(()),
        }
    }
}

/// Every invalid setting found by one validation pass, so the user can fix
/// them all before the next run.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    found: Vec<Diagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.found.push(Diagnostic {
            field,
            message: message.into(),
            hint: None,
        });
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.found.push(Diagnostic {
            field,
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.found
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.found.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = match self.found.len() {
            1 => "invalid config:".to_string(),
            n => format!("invalid config ({n} problems):"),
        };
        write!(f, "{}", heading.red().bold())?;
        for diagnostic in &self.found {
            write!(f, "\n{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_file() {
        let err = ConfigError::Io(
            PathBuf::from("assetflow.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        assert_eq!(err.to_string(), "cannot read config file `assetflow.toml`");
    }

    #[test]
    fn test_diagnostics_render_every_problem() {
        let mut diag = ConfigDiagnostics::new();
        diag.error(FieldPath::new("serve.port"), "port clash");
        diag.error_with_hint(
            FieldPath::new("compat.presets"),
            "unknown preset `stage-0`",
            "use `@babel/preset-env`",
        );
        assert_eq!(diag.errors()[1].hint.as_deref(), Some("use `@babel/preset-env`"));

        let shown = ConfigError::Diagnostics(diag.into_result().unwrap_err()).to_string();
        assert!(shown.contains("2 problems"));
        assert!(shown.contains("serve.port"));
        assert!(shown.contains("stage-0"));
        assert!(shown.contains("hint:"));
    }

    #[test]
    fn test_no_diagnostics_is_ok() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());
    }
}
