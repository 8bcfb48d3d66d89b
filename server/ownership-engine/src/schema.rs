//! Compiled ownership schema: an ordered list of rules.
//!
//! Rule order is authoring order and is never rearranged; the first rule
//! whose matcher fires decides the owners.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::SchemaError;
use crate::matcher::Matcher;
use crate::types::{EventAttributes, OwnerKind, OwnerReference};

/// Only stored schema version understood by `Schema::load`.
pub const SCHEMA_VERSION: u64 = 1;

/// One ownership rule: a matcher plus the owners it assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
  pub matcher: Matcher,
  /// Declared order; duplicates are kept.
  pub owners: Vec<OwnerReference>,
}

impl Rule {
  pub fn new(matcher: Matcher, owners: Vec<OwnerReference>) -> Self {
    Self { matcher, owners }
  }

  pub fn test(&self, event: &EventAttributes) -> bool {
    self.matcher.test(event)
  }

  pub fn test_with(&self, event: &EventAttributes, config: &Config) -> bool {
    self.matcher.test_with(event, config)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
  rules: Vec<Rule>,
}

impl Schema {
  pub fn new(rules: Vec<Rule>) -> Self {
    Self { rules }
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Load the stored JSON form (`{"$version": 1, "rules": [...]}`).
  pub fn load(blob: &serde_json::Value) -> Result<Self, SchemaError> {
    let stored = StoredSchema::deserialize(blob)?;
    if stored.version != SCHEMA_VERSION {
      return Err(SchemaError::UnsupportedVersion(stored.version));
    }

    let rules = stored
      .rules
      .into_iter()
      .map(|rule| {
        let matcher = Matcher::new(&rule.matcher.kind, &rule.matcher.pattern)?;
        let owners = rule
          .owners
          .into_iter()
          .map(|o| {
            let kind = OwnerKind::parse(&o.kind).ok_or(SchemaError::UnknownOwnerKind(o.kind))?;
            Ok(OwnerReference {
              kind,
              identifier: o.identifier,
            })
          })
          .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(Rule::new(matcher, owners))
      })
      .collect::<Result<Vec<_>, SchemaError>>()?;

    Ok(Self { rules })
  }

  /// Dump to the stored JSON form accepted by [`Schema::load`].
  pub fn dump(&self) -> serde_json::Value {
    let stored = StoredSchema {
      version: SCHEMA_VERSION,
      rules: self
        .rules
        .iter()
        .map(|rule| StoredRule {
          matcher: StoredMatcher {
            kind: rule.matcher.kind(),
            pattern: rule.matcher.pattern().to_string(),
          },
          owners: rule
            .owners
            .iter()
            .map(|o| StoredOwner {
              kind: o.kind.as_str().to_string(),
              identifier: o.identifier.clone(),
            })
            .collect(),
        })
        .collect(),
    };
    serde_json::json!(stored)
  }
}

// ---------------------------------------------------------------------------
// Stored form (kinds kept as strings so unknown ones surface as SchemaError)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct StoredSchema {
  #[serde(rename = "$version")]
  version: u64,
  #[serde(default)]
  rules: Vec<StoredRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRule {
  matcher: StoredMatcher,
  #[serde(default)]
  owners: Vec<StoredOwner>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredMatcher {
  #[serde(rename = "type")]
  kind: String,
  pattern: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredOwner {
  #[serde(rename = "type")]
  kind: String,
  identifier: String,
}
