//! HTTP handlers for the ownership API.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  Json,
};
use ownership_engine::normalize;
use ownership_engine::{IdentityDirectory, OwnershipPolicy, ResolutionScope};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::state::AppState;
use crate::types::{ActorOutput, OwnersResponse};

pub async fn health() -> &'static str {
  "ok"
}

/// Suggested owners for one event.
///
/// A project without an ownership record behaves like one that never
/// configured ownership and answers `{"owners": []}`.
pub async fn event_owners(
  State(state): State<Arc<AppState>>,
  Path((project_slug, event_id)): Path<(String, String)>,
) -> (StatusCode, Json<Value>) {
  let project = match state.project(&project_slug) {
    Some(p) => p,
    None => return not_found("Project not found"),
  };

  let event = match Uuid::parse_str(&event_id)
    .ok()
    .and_then(|id| state.event(&project.id, id))
  {
    Some(e) => e,
    None => return not_found("Event not found"),
  };

  let unconfigured = OwnershipPolicy::default();
  let policy = state.ownership(&project.id).unwrap_or(&unconfigured);
  let scope = ResolutionScope {
    project_id: project.id.clone(),
    organization_id: project.organization_id.clone(),
  };

  let engine = state.engine();
  let resolution = match engine.get_owners(policy, &normalize::attributes(event), &scope) {
    Ok(r) => r,
    Err(e) => {
      tracing::error!(project = %project.slug, %event_id, "owner resolution failed: {}", e);
      return (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": e.to_string() })),
      );
    }
  };

  let owners = resolution
    .result
    .owners()
    .iter()
    .map(|actor| ActorOutput {
      kind: actor.kind,
      id: actor.id.clone(),
      name: engine
        .directory()
        .display_name(actor)
        .unwrap_or_else(|| actor.id.to_string()),
    })
    .collect();

  (StatusCode::OK, Json(json!(OwnersResponse { owners })))
}

fn not_found(detail: &str) -> (StatusCode, Json<Value>) {
  (StatusCode::NOT_FOUND, Json(json!({ "detail": detail })))
}
