//! Shared application state built from a snapshot.

use ownership_engine::{
  Engine, IdentityDirectory, InMemoryDirectory, InboundEvent, OwnershipPolicy, SchemaError,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{OwnershipRecord, ProjectRecord, Snapshot};

#[derive(Debug, Error)]
pub enum StateError {
  #[error("snapshot io: {0}")]
  Io(#[from] std::io::Error),

  #[error("snapshot json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("{kind} references unknown project {project:?}")]
  UnknownProject { kind: &'static str, project: String },

  #[error("ownership for {project:?}: {source}")]
  Schema {
    project: String,
    #[source]
    source: SchemaError,
  },
}

/// Identity lookups shared across request handlers.
pub type SharedDirectory = Arc<dyn IdentityDirectory + Send + Sync>;

pub struct AppState {
  /// Keyed by project slug.
  projects: HashMap<String, ProjectRecord>,
  /// Keyed by (project id, event id).
  events: HashMap<(String, Uuid), InboundEvent>,
  /// Keyed by project id.
  ownership: HashMap<String, OwnershipPolicy>,
  engine: Engine<SharedDirectory>,
}

impl AppState {
  pub fn load(path: impl AsRef<Path>) -> Result<Arc<Self>, StateError> {
    let contents = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&contents)?;
    Ok(Arc::new(Self::from_snapshot(snapshot)?))
  }

  /// Index the snapshot and compile every ownership record up front.
  /// Users and teams come from the snapshot.
  pub fn from_snapshot(mut snapshot: Snapshot) -> Result<Self, StateError> {
    let mut directory = InMemoryDirectory::new();
    for user in std::mem::take(&mut snapshot.users) {
      directory.push_user(user);
    }
    for team in std::mem::take(&mut snapshot.teams) {
      directory.push_team(team);
    }
    Self::with_directory(snapshot, Arc::new(directory))
  }

  /// Like [`AppState::from_snapshot`], but identities are looked up in
  /// `directory` and the snapshot's users and teams are ignored.
  pub fn with_directory(snapshot: Snapshot, directory: SharedDirectory) -> Result<Self, StateError> {
    let projects: HashMap<String, ProjectRecord> = snapshot
      .projects
      .into_iter()
      .map(|p| (p.slug.clone(), p))
      .collect();

    let project_id = |kind: &'static str, slug: &str| {
      projects
        .get(slug)
        .map(|p| p.id.clone())
        .ok_or_else(|| StateError::UnknownProject {
          kind,
          project: slug.to_string(),
        })
    };

    let mut events = HashMap::new();
    for record in snapshot.events {
      let id = project_id("event", &record.project)?;
      events.insert((id, record.event_id), record.data);
    }

    let mut ownership = HashMap::new();
    for record in snapshot.ownership {
      let id = project_id("ownership", &record.project)?;
      let project = record.project.clone();
      let policy = compile_record(record).map_err(|source| StateError::Schema { project, source })?;
      ownership.insert(id, policy);
    }

    tracing::info!(
      projects = projects.len(),
      events = events.len(),
      ownership = ownership.len(),
      "snapshot loaded"
    );

    Ok(Self {
      projects,
      events,
      ownership,
      engine: Engine::with_defaults(directory),
    })
  }

  pub fn project(&self, slug: &str) -> Option<&ProjectRecord> {
    self.projects.get(slug)
  }

  pub fn event(&self, project_id: &str, event_id: Uuid) -> Option<&InboundEvent> {
    self.events.get(&(project_id.to_string(), event_id))
  }

  pub fn ownership(&self, project_id: &str) -> Option<&OwnershipPolicy> {
    self.ownership.get(project_id)
  }

  pub fn engine(&self) -> &Engine<SharedDirectory> {
    &self.engine
  }
}

/// Raw text wins over a stored blob; a record with neither has no schema.
fn compile_record(record: OwnershipRecord) -> Result<OwnershipPolicy, SchemaError> {
  let mut policy = match (&record.raw, &record.schema) {
    (Some(raw), _) => {
      let now = record.last_updated.unwrap_or_else(chrono::Utc::now);
      OwnershipPolicy::from_raw(raw, now)?
    }
    (None, Some(blob)) => OwnershipPolicy::from_schema_blob(blob)?,
    (None, None) => OwnershipPolicy::default(),
  };
  policy.fallthrough = record.fallthrough;
  policy.is_active = record.is_active;
  policy.date_created = record.date_created.or(policy.date_created);
  policy.last_updated = record.last_updated.or(policy.last_updated);
  Ok(policy)
}
