//! Owner resolution: turn an authored owner reference into a concrete actor.

use tracing::{trace, warn};

use crate::directory::{Identity, IdentityDirectory};
use crate::error::EngineError;
use crate::types::{OwnerKind, OwnerReference, ResolutionOutcome, ResolutionScope};

/// Resolve one owner reference within `scope`.
///
/// Users are looked up by email (the directory matches case-insensitively)
/// and only active identities count; teams are looked up by slug among the
/// project's teams. Both kinds report a miss as `UnknownActor`. When several
/// candidates qualify the first in directory order wins.
pub fn make_actor<D: IdentityDirectory + ?Sized>(
  directory: &D,
  owner: &OwnerReference,
  scope: &ResolutionScope,
) -> Result<ResolutionOutcome, EngineError> {
  let candidates = match owner.kind {
    OwnerKind::User => directory.users_by_email(&owner.identifier, scope.organization_id.as_deref()),
    OwnerKind::Team => directory.teams_by_slug(&scope.project_id, &owner.identifier),
  };

  let identity = match candidates.into_iter().find(|c| c.is_active) {
    Some(identity) => identity,
    None => {
      trace!(owner = %owner, project = %scope.project_id, "owner did not resolve");
      return Ok(ResolutionOutcome::UnknownActor(owner.clone()));
    }
  };

  check_kind(owner, &identity)?;
  Ok(ResolutionOutcome::Actor(identity.actor()))
}

fn check_kind(owner: &OwnerReference, identity: &Identity) -> Result<(), EngineError> {
  if identity.kind == owner.kind {
    return Ok(());
  }
  warn!(
    owner = %owner,
    expected = %owner.kind,
    found = %identity.kind,
    "identity directory returned the wrong kind of identity"
  );
  Err(EngineError::InvalidActorKind {
    identifier: owner.identifier.clone(),
    expected: owner.kind,
    found: identity.kind,
  })
}
