//! Error types for the barbershop

use std::fmt;

use thiserror::Error;

use crate::barbershop::BarberKey;
use crate::locale::Locale;

/// Result type for barbershop operations
pub type Result<T> = std::result::Result<T, BarberError>;

/// Barbershop errors
#[derive(Error, Debug)]
pub enum BarberError {
    /// One or more templates failed compilation or validation during `build()`
    #[error("{0}")]
    Build(ErrorReport),

    /// No barber exists for the requested source/target pair
    #[error("{0}")]
    BarberNotFound(ErrorReport),

    #[error("No DocumentTemplate for {key} matches locale {requested} (tried {})", join_locales(.tried))]
    LocaleNotResolved {
        key: BarberKey,
        requested: Locale,
        tried: Vec<Locale>,
    },

    #[error("Failed to render field [{field}]: {message}")]
    Render { field: String, message: String },

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Invalid manifest {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BarberError {
    /// The numbered report behind a build or lookup failure
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            BarberError::Build(report) | BarberError::BarberNotFound(report) => Some(report),
            _ => None,
        }
    }
}

/// Error raised by a [`TemplateEngine`](crate::engine::TemplateEngine)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A numbered list of error messages.
///
/// Renders as a leading `Errors` line followed by `N) <message>` per entry,
/// each terminated by a newline. Messages may span several lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    messages: Vec<String>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ErrorReport {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Errors")?;
        for (index, message) in self.messages.iter().enumerate() {
            writeln!(f, "{}) {}", index + 1, message)?;
        }
        Ok(())
    }
}

fn join_locales(locales: &[Locale]) -> String {
    locales
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format() {
        let report: ErrorReport = ["first", "second\nwith detail"].into_iter().collect();
        assert_eq!(
            report.to_string(),
            "Errors\n1) first\n2) second\nwith detail\n"
        );
    }

    #[test]
    fn test_build_error_displays_report() {
        let report: ErrorReport = ["broken"].into_iter().collect();
        let err = BarberError::Build(report);
        assert_eq!(err.to_string(), "Errors\n1) broken\n");
        assert_eq!(err.report().map(ErrorReport::len), Some(1));
    }
}
