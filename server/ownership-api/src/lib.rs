//! Ownership API
//!
//! HTTP service answering "who owns this event?" from a snapshot of projects,
//! events, ownership records and identities.
//! Bind to 127.0.0.1 by default (internal only).

mod handlers;
mod state;
mod types;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::{event_owners, health};
pub use state::{AppState, SharedDirectory, StateError};
pub use types::{ActorOutput, OwnersResponse, Snapshot};

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/projects/:project/events/:event_id/owners/", get(event_owners))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
