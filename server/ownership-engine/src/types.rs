//! Core types for the ownership engine (JSON contracts + internal models).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — Sentry-style event data)
// ---------------------------------------------------------------------------

/// Event payload as stored by the event store. Unknown fields are silently
/// ignored; only the interfaces rules test against are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
  #[serde(default)]
  pub event_id: Option<String>,
  #[serde(default, alias = "sentry.interfaces.Stacktrace")]
  pub stacktrace: Option<InboundStacktrace>,
  #[serde(default, alias = "sentry.interfaces.Exception")]
  pub exception: Option<InboundException>,
  #[serde(default, alias = "sentry.interfaces.Http")]
  pub request: Option<InboundRequest>,
  #[serde(default)]
  pub tags: InboundTags,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundStacktrace {
  #[serde(default)]
  pub frames: Vec<InboundFrame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundFrame {
  #[serde(default)]
  pub filename: Option<String>,
  #[serde(default)]
  pub abs_path: Option<String>,
  #[serde(default)]
  pub module: Option<String>,
  #[serde(default)]
  pub function: Option<String>,
  #[serde(default)]
  pub lineno: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundException {
  #[serde(default)]
  pub values: Vec<InboundExceptionValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundExceptionValue {
  #[serde(default, rename = "type")]
  pub exception_type: Option<String>,
  #[serde(default)]
  pub value: Option<String>,
  #[serde(default)]
  pub stacktrace: Option<InboundStacktrace>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundRequest {
  #[serde(default)]
  pub url: Option<String>,
}

/// Tags arrive either as `[["key", "value"], ...]` or as a flat object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundTags {
  Pairs(Vec<(String, String)>),
  Map(BTreeMap<String, String>),
}

impl Default for InboundTags {
  fn default() -> Self {
    Self::Pairs(Vec::new())
  }
}

/// The ownership record fields a request carries alongside the event.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundOwnership {
  /// Raw ownership text; compiled (and cached) when present.
  #[serde(default)]
  pub raw: Option<String>,
  /// Stored schema blob, used when `raw` is absent.
  #[serde(default)]
  pub schema: Option<serde_json::Value>,
  #[serde(default = "default_true")]
  pub fallthrough: bool,
  #[serde(default = "default_true")]
  pub is_active: bool,
}

impl Default for InboundOwnership {
  fn default() -> Self {
    Self {
      raw: None,
      schema: None,
      fallthrough: true,
      is_active: true,
    }
  }
}

fn default_true() -> bool {
  true
}

/// One inbound request line for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnershipRequest {
  pub project_id: String,
  #[serde(default)]
  pub organization_id: Option<String>,
  #[serde(default)]
  pub ownership: InboundOwnership,
  pub event: InboundEvent,
}

// ---------------------------------------------------------------------------
// Event attribute view (what matchers read)
// ---------------------------------------------------------------------------

/// Read-only view of the event fields matchers test against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttributes {
  /// Frame `filename` and `abs_path` values, top-level stacktrace first.
  pub paths: Vec<String>,
  pub modules: Vec<String>,
  pub url: Option<String>,
  pub tags: Vec<(String, String)>,
}

impl EventAttributes {
  pub fn with_path(mut self, path: impl Into<String>) -> Self {
    self.paths.push(path.into());
    self
  }

  pub fn with_module(mut self, module: impl Into<String>) -> Self {
    self.modules.push(module.into());
    self
  }

  pub fn with_url(mut self, url: impl Into<String>) -> Self {
    self.url = Some(url.into());
    self
  }

  pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.tags.push((key.into(), value.into()));
    self
  }
}

// ---------------------------------------------------------------------------
// Owners and actors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
  User,
  Team,
}

impl OwnerKind {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "user" => Some(Self::User),
      "team" => Some(Self::Team),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Team => "team",
    }
  }
}

impl fmt::Display for OwnerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// An owner as authored in policy text: an email for users, a slug for teams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerReference {
  #[serde(rename = "type")]
  pub kind: OwnerKind,
  pub identifier: String,
}

impl OwnerReference {
  pub fn user(email: impl Into<String>) -> Self {
    Self {
      kind: OwnerKind::User,
      identifier: email.into(),
    }
  }

  pub fn team(slug: impl Into<String>) -> Self {
    Self {
      kind: OwnerKind::Team,
      identifier: slug.into(),
    }
  }
}

/// Renders the way the owner is written in ownership text.
impl fmt::Display for OwnerReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      OwnerKind::User => f.write_str(&self.identifier),
      OwnerKind::Team => write!(f, "#{}", self.identifier),
    }
  }
}

/// Opaque identity key handed out by the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl fmt::Display for ActorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A resolved user or team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Actor {
  #[serde(rename = "type")]
  pub kind: OwnerKind,
  pub id: ActorId,
}

/// Result of resolving one owner reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
  Actor(Actor),
  UnknownActor(OwnerReference),
}

impl ResolutionOutcome {
  pub fn into_actor(self) -> Option<Actor> {
    match self {
      Self::Actor(actor) => Some(actor),
      Self::UnknownActor(_) => None,
    }
  }
}

/// Where an owner reference is resolved: teams are scoped to the project,
/// users are meant to be scoped to the organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionScope {
  pub project_id: String,
  pub organization_id: Option<String>,
}

impl ResolutionScope {
  pub fn project(project_id: impl Into<String>) -> Self {
    Self {
      project_id: project_id.into(),
      organization_id: None,
    }
  }

  pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
    self.organization_id = Some(organization_id.into());
    self
  }
}

/// Outcome of evaluating one event against one schema.
///
/// `Owners(vec![])` means a rule fired but none of its owners resolved,
/// which callers must not confuse with `NoRuleMatched`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipResult {
  Owners(Vec<Actor>),
  NoRuleMatched,
}

impl OwnershipResult {
  pub fn is_matched(&self) -> bool {
    matches!(self, Self::Owners(_))
  }

  pub fn owners(&self) -> &[Actor] {
    match self {
      Self::Owners(owners) => owners,
      Self::NoRuleMatched => &[],
    }
  }

  pub fn into_owners(self) -> Vec<Actor> {
    match self {
      Self::Owners(owners) => owners,
      Self::NoRuleMatched => Vec::new(),
    }
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what the CLI emits)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OwnersOutput {
  pub owners: Vec<Actor>,
  pub rule_matched: bool,
  /// Copied from the ownership record; applying it is the caller's job.
  pub fallthrough: bool,
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
