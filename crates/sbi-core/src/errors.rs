//! Structured error types shared across SBI crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SbiError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (dimensions, counts, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the SBI toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SbiError {
    /// Prior construction and evaluation errors.
    #[error("prior error: {0}")]
    Prior(ErrorInfo),
    /// Simulator invocation failures, propagated without retry.
    #[error("simulator error: {0}")]
    Simulator(ErrorInfo),
    /// Shape and dimensionality mismatches, including non-finite data.
    #[error("shape error: {0}")]
    Shape(ErrorInfo),
    /// Density estimator training errors.
    #[error("train error: {0}")]
    Train(ErrorInfo),
    /// Posterior construction and query errors.
    #[error("posterior error: {0}")]
    Posterior(ErrorInfo),
    /// Serialization and artifact I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Randomness and seeding errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SbiError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SbiError::Prior(info)
            | SbiError::Simulator(info)
            | SbiError::Shape(info)
            | SbiError::Train(info)
            | SbiError::Posterior(info)
            | SbiError::Serde(info)
            | SbiError::Rng(info) => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_hint() {
        let err = SbiError::Shape(
            ErrorInfo::new("theta-x-rows", "row counts disagree")
                .with_context("thetas", "10")
                .with_context("xs", "9")
                .with_hint("append aligned batches"),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("theta-x-rows"));
        assert!(rendered.contains("thetas=10"));
        assert!(rendered.contains("append aligned batches"));
    }

    #[test]
    fn serde_roundtrip_preserves_family() {
        let err = SbiError::Train(ErrorInfo::new("empty-records", "no simulations appended"));
        let json = serde_json::to_string(&err).unwrap();
        let back: SbiError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
