//! Snapshot and response types for the ownership API.

use chrono::{DateTime, Utc};
use ownership_engine::directory::{TeamRecord, UserRecord};
use ownership_engine::{ActorId, InboundEvent, OwnerKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything the service serves, loaded once at startup.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
  #[serde(default)]
  pub projects: Vec<ProjectRecord>,
  #[serde(default)]
  pub events: Vec<EventRecord>,
  #[serde(default)]
  pub ownership: Vec<OwnershipRecord>,
  #[serde(default)]
  pub users: Vec<UserRecord>,
  /// `projects` on each team lists project ids.
  #[serde(default)]
  pub teams: Vec<TeamRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
  pub id: String,
  pub slug: String,
  #[serde(default)]
  pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
  /// Project slug.
  pub project: String,
  pub event_id: Uuid,
  pub data: InboundEvent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnershipRecord {
  /// Project slug.
  pub project: String,
  #[serde(default)]
  pub raw: Option<String>,
  #[serde(default)]
  pub schema: Option<serde_json::Value>,
  #[serde(default = "default_true")]
  pub fallthrough: bool,
  #[serde(default = "default_true")]
  pub is_active: bool,
  #[serde(default)]
  pub date_created: Option<DateTime<Utc>>,
  #[serde(default)]
  pub last_updated: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorOutput {
  #[serde(rename = "type")]
  pub kind: OwnerKind,
  pub id: ActorId,
  pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnersResponse {
  pub owners: Vec<ActorOutput>,
}
