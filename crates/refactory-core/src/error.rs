//! Error types for rule-set resolution, configuration loading and pass
//! application.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error codes.
///
/// Serialized `snake_case` strings are part of the CLI's JSON error output
/// and must not change across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// No factory is registered under the identifier.
    UnknownRule,
    /// Configuration was supplied to a rule without a configuration capability.
    NotConfigurable,
    /// The rule rejected the supplied configuration parameters.
    InvalidConfiguration,
    /// The instantiated component does not satisfy the rule contract.
    ContractViolation,
    /// A rule-set declaration could not be read, parsed or flattened.
    DeclarationError,
    /// A project configuration file is unreadable or malformed.
    ConfigError,
    /// A rule or pass failed while transforming a program.
    PassFailed,
}

/// Failure to read, parse or flatten a rule-set declaration.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("Failed to read rule set {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed rule set {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rule set {path} includes itself")]
    IncludeCycle { path: PathBuf },
}

/// Failure to turn a rule-set declaration into validated rule instances.
///
/// `UnknownRule`, `NotConfigurable` and `InvalidConfiguration` form the
/// resolution-error family; `ContractViolation` is reported separately
/// because the component *was* built but cannot be trusted with a tree.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Cannot resolve {identifier}: unknown rule identifier")]
    UnknownRule { identifier: String },

    #[error("Cannot resolve {identifier}: rule does not accept configuration")]
    NotConfigurable { identifier: String },

    #[error("Cannot resolve {identifier}: {reason}")]
    InvalidConfiguration { identifier: String, reason: String },

    #[error("{identifier} does not satisfy the rule contract")]
    ContractViolation { identifier: String },

    #[error(transparent)]
    Declaration(#[from] DeclarationError),
}

impl ResolveError {
    /// Returns the stable error code for this error variant.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ResolveError::UnknownRule { .. } => ErrorCode::UnknownRule,
            ResolveError::NotConfigurable { .. } => ErrorCode::NotConfigurable,
            ResolveError::InvalidConfiguration { .. } => ErrorCode::InvalidConfiguration,
            ResolveError::ContractViolation { .. } => ErrorCode::ContractViolation,
            ResolveError::Declaration(_) => ErrorCode::DeclarationError,
        }
    }

    /// The offending rule identifier, if the failure concerns one reference.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ResolveError::UnknownRule { identifier }
            | ResolveError::NotConfigurable { identifier }
            | ResolveError::InvalidConfiguration { identifier, .. }
            | ResolveError::ContractViolation { identifier } => Some(identifier),
            ResolveError::Declaration(_) => None,
        }
    }

    /// `true` for the resolution-error family (the reference itself could not
    /// be turned into a configured instance).
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            ResolveError::UnknownRule { .. }
                | ResolveError::NotConfigurable { .. }
                | ResolveError::InvalidConfiguration { .. }
        )
    }

    /// Structured JSON form: `{"code": "...", "message": "...", "identifier": "..." | null}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
            "identifier": self.identifier(),
        })
    }
}

/// Failure to load a project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid skip pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl ConfigError {
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::ConfigError
    }
}

/// A rule rejected its configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigureError(pub String);

impl ConfigureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A rule or post pass failed to transform a program.
///
/// The pipeline runner never recovers from these; they reach the caller
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rule {rule} failed: {message}")]
pub struct PassError {
    pub rule: String,
    pub message: String,
}

impl PassError {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::PassFailed
    }
}

// ===========================================================================
// Tests
// ===========================================================================
