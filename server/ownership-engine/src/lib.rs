//! Ownership Resolution Engine — first-match-wins owner assignment for events.
//!
//! Compiles a project's ownership rules into a [`Schema`], tests an event's
//! stack frames, request URL and tags against the rules in authored order,
//! and resolves the first matching rule's owners through an injected
//! [`IdentityDirectory`].
//!
//! No DB, no network; pure computation over the supplied directory.

pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod matcher;
pub mod normalize;
pub mod policy;
pub mod resolve;
pub mod schema;
pub mod types;

pub use config::Config;
pub use directory::{Identity, IdentityDirectory, InMemoryDirectory};
pub use engine::{Engine, Resolution};
pub use error::{EngineError, SchemaError};
pub use grammar::compile;
pub use matcher::Matcher;
pub use policy::{OwnershipPolicy, SchemaCache};
pub use schema::{Rule, Schema};
pub use types::{
  Actor, ActorId, EventAttributes, InboundEvent, OwnerKind, OwnerReference, OwnershipRequest,
  OwnershipResult, ResolutionOutcome, ResolutionScope,
};
