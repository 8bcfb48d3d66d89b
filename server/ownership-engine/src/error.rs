//! Structured error types for the ownership engine.

use thiserror::Error;

use crate::types::OwnerKind;

/// A policy definition that could not be compiled into a schema.
///
/// Fatal to one compile call only; schemas compiled earlier stay usable.
#[derive(Debug, Error)]
pub enum SchemaError {
  #[error("line {line}: {reason}")]
  Parse { line: usize, reason: String },

  #[error("unknown matcher type: {0}")]
  UnknownMatcher(String),

  #[error("unknown owner type: {0}")]
  UnknownOwnerKind(String),

  #[error("invalid pattern {pattern:?}: {reason}")]
  InvalidPattern { pattern: String, reason: String },

  #[error("unsupported schema version: {0}")]
  UnsupportedVersion(u64),

  #[error("schema json: {0}")]
  Json(#[from] serde_json::Error),
}

impl SchemaError {
  pub fn parse(line: usize, reason: impl Into<String>) -> Self {
    Self::Parse {
      line,
      reason: reason.into(),
    }
  }

  pub fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
    Self::InvalidPattern {
      pattern: pattern.to_string(),
      reason: reason.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("schema: {0}")]
  Schema(#[from] SchemaError),

  /// The identity directory answered a lookup with the wrong kind of
  /// identity. Aborts the whole resolution.
  #[error("invalid actor kind for {identifier:?}: expected {expected}, directory returned {found}")]
  InvalidActorKind {
    identifier: String,
    expected: OwnerKind,
    found: OwnerKind,
  },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}
