//! Ownership records and compiled-schema caching.
//!
//! A schema is compiled once per distinct raw definition. Change detection
//! uses a blake3 digest of the raw text, so re-saving identical text keeps the
//! existing compiled schema.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::SchemaError;
use crate::grammar;
use crate::schema::Schema;

/// Stable hex digest of a raw ownership definition.
pub fn digest(raw: &str) -> String {
  blake3::hash(raw.as_bytes()).to_hex().to_string()
}

/// A project's ownership record as the engine sees it.
///
/// The default value is the record of a project that never configured
/// ownership: no schema, fallthrough on.
#[derive(Debug, Clone)]
pub struct OwnershipPolicy {
  pub raw: Option<String>,
  pub schema: Option<Arc<Schema>>,
  /// Digest of `raw` the current `schema` was compiled from.
  pub schema_digest: Option<String>,
  /// Caller-interpreted: what to do when no rule matches.
  pub fallthrough: bool,
  pub is_active: bool,
  pub date_created: Option<DateTime<Utc>>,
  pub last_updated: Option<DateTime<Utc>>,
}

impl Default for OwnershipPolicy {
  fn default() -> Self {
    Self {
      raw: None,
      schema: None,
      schema_digest: None,
      fallthrough: true,
      is_active: true,
      date_created: None,
      last_updated: None,
    }
  }
}

impl OwnershipPolicy {
  /// Create a record from raw ownership text, compiling it.
  pub fn from_raw(raw: &str, now: DateTime<Utc>) -> Result<Self, SchemaError> {
    let schema = grammar::compile(raw)?;
    Ok(Self {
      raw: Some(raw.to_string()),
      schema: Some(Arc::new(schema)),
      schema_digest: Some(digest(raw)),
      date_created: Some(now),
      last_updated: Some(now),
      ..Self::default()
    })
  }

  /// Create a record from a stored schema blob only (no raw text kept).
  pub fn from_schema_blob(blob: &serde_json::Value) -> Result<Self, SchemaError> {
    Ok(Self {
      schema: Some(Arc::new(Schema::load(blob)?)),
      ..Self::default()
    })
  }

  pub fn with_fallthrough(mut self, fallthrough: bool) -> Self {
    self.fallthrough = fallthrough;
    self
  }

  pub fn schema(&self) -> Option<&Schema> {
    self.schema.as_deref()
  }

  /// Replace the raw definition. Recompiles only when the content changed and
  /// returns whether it did. On a compile error the record is left untouched.
  pub fn update_raw(&mut self, raw: &str, now: DateTime<Utc>) -> Result<bool, SchemaError> {
    let new_digest = digest(raw);
    if self.schema.is_some() && self.schema_digest.as_deref() == Some(new_digest.as_str()) {
      return Ok(false);
    }

    let schema = grammar::compile(raw)?;
    debug!(rules = schema.len(), digest = %new_digest, "ownership schema recompiled");
    self.raw = Some(raw.to_string());
    self.schema = Some(Arc::new(schema));
    self.schema_digest = Some(new_digest);
    if self.date_created.is_none() {
      self.date_created = Some(now);
    }
    self.last_updated = Some(now);
    Ok(true)
  }
}

/// Compiled schemas keyed by raw-text digest.
#[derive(Debug)]
pub struct SchemaCache {
  capacity: usize,
  entries: HashMap<String, Arc<Schema>>,
}

impl SchemaCache {
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity: capacity.max(1),
      entries: HashMap::new(),
    }
  }

  /// Return the compiled schema for `raw`, compiling on first sight.
  /// Compile errors are not cached.
  pub fn get_or_compile(&mut self, raw: &str) -> Result<Arc<Schema>, SchemaError> {
    let key = digest(raw);
    if let Some(schema) = self.entries.get(&key) {
      return Ok(Arc::clone(schema));
    }

    let schema = Arc::new(grammar::compile(raw)?);
    if self.entries.len() >= self.capacity {
      debug!(capacity = self.capacity, "schema cache full; flushing");
      self.entries.clear();
    }
    self.entries.insert(key, Arc::clone(&schema));
    Ok(schema)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, minute, 0).unwrap()
  }

  #[test]
  fn default_record_has_no_schema_and_falls_through() {
    let policy = OwnershipPolicy::default();
    assert!(policy.schema().is_none());
    assert!(policy.fallthrough);
    assert!(policy.is_active);
    assert!(policy.date_created.is_none());
  }

  #[test]
  fn update_raw_recompiles_only_on_change() {
    let mut policy = OwnershipPolicy::from_raw("*.py #backend", at(0)).unwrap();
    let first = Arc::clone(policy.schema.as_ref().unwrap());

    assert!(!policy.update_raw("*.py #backend", at(5)).unwrap());
    assert!(Arc::ptr_eq(&first, policy.schema.as_ref().unwrap()));
    assert_eq!(policy.last_updated, Some(at(0)));

    assert!(policy.update_raw("*.py #backend\n*.js #frontend", at(9)).unwrap());
    assert_eq!(policy.schema().unwrap().len(), 2);
    assert_eq!(policy.date_created, Some(at(0)));
    assert_eq!(policy.last_updated, Some(at(9)));
  }

  #[test]
  fn failed_update_keeps_previous_schema() {
    let mut policy = OwnershipPolicy::from_raw("*.py #backend", at(0)).unwrap();
    assert!(policy.update_raw("*.py", at(1)).is_err());
    assert_eq!(policy.raw.as_deref(), Some("*.py #backend"));
    assert_eq!(policy.schema().unwrap().len(), 1);
  }

  #[test]
  fn cache_compiles_each_definition_once() {
    let mut cache = SchemaCache::new(8);
    let a = cache.get_or_compile("*.py #backend").unwrap();
    let b = cache.get_or_compile("*.py #backend").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
    assert!(cache.get_or_compile("*.py").is_err());
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn cache_flushes_when_full() {
    let mut cache = SchemaCache::new(2);
    cache.get_or_compile("a #x").unwrap();
    cache.get_or_compile("b #x").unwrap();
    cache.get_or_compile("c #x").unwrap();
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn digest_is_stable_hex() {
    assert_eq!(digest("x"), digest("x"));
    assert_ne!(digest("x"), digest("y"));
    assert_eq!(digest("x").len(), 64);
  }
}
