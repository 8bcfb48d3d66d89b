//! Core engine: walks a schema, picks the first matching rule, resolves owners.

use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::directory::IdentityDirectory;
use crate::error::EngineError;
use crate::normalize;
use crate::policy::{OwnershipPolicy, SchemaCache};
use crate::resolve;
use crate::schema::Schema;
use crate::types::*;

/// Result of evaluating an ownership record: the engine's answer plus the
/// record's fallthrough flag, which only the caller interprets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub result: OwnershipResult,
  pub fallthrough: bool,
}

/// The ownership engine. Resolution is read-only; only the schema cache used
/// by [`Engine::process`] holds state across calls.
pub struct Engine<D> {
  config: Config,
  directory: D,
  cache: SchemaCache,
}

impl<D: IdentityDirectory> Engine<D> {
  pub fn new(config: Config, directory: D) -> Self {
    let cache = SchemaCache::new(config.schema_cache_capacity);
    Self {
      config,
      directory,
      cache,
    }
  }

  pub fn with_defaults(directory: D) -> Self {
    Self::new(Config::default(), directory)
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn directory(&self) -> &D {
    &self.directory
  }

  /// Resolve the owners of one event.
  ///
  /// No schema, an empty schema, or no matching rule gives `NoRuleMatched`.
  /// Otherwise the first matching rule's owners are resolved in declared
  /// order; owners that do not resolve are dropped, so a matched rule may
  /// yield `Owners(vec![])`.
  pub fn resolve_owners(
    &self,
    schema: Option<&Schema>,
    event: &EventAttributes,
    scope: &ResolutionScope,
  ) -> Result<OwnershipResult, EngineError> {
    let schema = match schema {
      Some(s) => s,
      None => return Ok(OwnershipResult::NoRuleMatched),
    };

    let (index, rule) = match schema
      .rules()
      .iter()
      .enumerate()
      .find(|(_, rule)| rule.test_with(event, &self.config))
    {
      Some(found) => found,
      None => return Ok(OwnershipResult::NoRuleMatched),
    };
    debug!(rule = index, matcher = %rule.matcher, project = %scope.project_id, "ownership rule matched");

    let mut owners = Vec::with_capacity(rule.owners.len());
    for owner in &rule.owners {
      if let Some(actor) = resolve::make_actor(&self.directory, owner, scope)?.into_actor() {
        owners.push(actor);
      }
    }

    Ok(OwnershipResult::Owners(owners))
  }

  /// Resolve against an ownership record.
  pub fn get_owners(
    &self,
    policy: &OwnershipPolicy,
    event: &EventAttributes,
    scope: &ResolutionScope,
  ) -> Result<Resolution, EngineError> {
    let result = self.resolve_owners(policy.schema(), event, scope)?;
    Ok(Resolution {
      result,
      fallthrough: policy.fallthrough,
    })
  }

  /// Process a single inbound request line.
  ///
  /// Raw ownership text wins over a stored schema blob and goes through the
  /// schema cache.
  pub fn process(&mut self, request: &OwnershipRequest) -> Result<OwnersOutput, EngineError> {
    if request.project_id.is_empty() {
      return Err(EngineError::validation("project_id", "must not be empty"));
    }

    let schema: Option<Arc<Schema>> = match (&request.ownership.raw, &request.ownership.schema) {
      (Some(raw), _) => Some(self.cache.get_or_compile(raw)?),
      (None, Some(blob)) => Some(Arc::new(Schema::load(blob)?)),
      (None, None) => None,
    };

    let event = normalize::attributes(&request.event);
    let mut scope = ResolutionScope::project(request.project_id.as_str());
    scope.organization_id = request.organization_id.clone();

    let result = self.resolve_owners(schema.as_deref(), &event, &scope)?;
    Ok(OwnersOutput {
      rule_matched: result.is_matched(),
      owners: result.into_owners(),
      fallthrough: request.ownership.fallthrough,
    })
  }
}
