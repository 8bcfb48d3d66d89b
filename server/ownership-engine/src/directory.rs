//! Identity lookup capability used by the owner resolver.
//!
//! The engine never reaches into a user or team store directly; callers inject
//! an [`IdentityDirectory`]. [`InMemoryDirectory`] backs the CLI, the HTTP
//! service snapshot and the tests.

use serde::Deserialize;
use std::sync::Arc;

use crate::types::{Actor, ActorId, OwnerKind};

/// One candidate identity returned by a directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub id: ActorId,
  pub kind: OwnerKind,
  pub name: String,
  pub is_active: bool,
}

impl Identity {
  pub fn actor(&self) -> Actor {
    Actor {
      kind: self.kind,
      id: self.id.clone(),
    }
  }
}

pub trait IdentityDirectory {
  /// Users whose email equals `email`, ignoring case, in lookup order.
  ///
  /// `organization_id` is the scope the user should belong to. Directories
  /// may ignore it until membership scoping exists.
  fn users_by_email(&self, email: &str, organization_id: Option<&str>) -> Vec<Identity>;

  /// Teams with exactly this slug that are associated with `project_id`.
  fn teams_by_slug(&self, project_id: &str, slug: &str) -> Vec<Identity>;

  /// Display name for a resolved actor, when the directory has one.
  fn display_name(&self, _actor: &Actor) -> Option<String> {
    None
  }
}

impl<D: IdentityDirectory + ?Sized> IdentityDirectory for &D {
  fn users_by_email(&self, email: &str, organization_id: Option<&str>) -> Vec<Identity> {
    (**self).users_by_email(email, organization_id)
  }

  fn teams_by_slug(&self, project_id: &str, slug: &str) -> Vec<Identity> {
    (**self).teams_by_slug(project_id, slug)
  }

  fn display_name(&self, actor: &Actor) -> Option<String> {
    (**self).display_name(actor)
  }
}

impl<D: IdentityDirectory + ?Sized> IdentityDirectory for Arc<D> {
  fn users_by_email(&self, email: &str, organization_id: Option<&str>) -> Vec<Identity> {
    (**self).users_by_email(email, organization_id)
  }

  fn teams_by_slug(&self, project_id: &str, slug: &str) -> Vec<Identity> {
    (**self).teams_by_slug(project_id, slug)
  }

  fn display_name(&self, actor: &Actor) -> Option<String> {
    (**self).display_name(actor)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
  pub id: String,
  pub email: String,
  #[serde(default)]
  pub name: String,
  #[serde(default = "default_active")]
  pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecord {
  pub id: String,
  pub slug: String,
  #[serde(default)]
  pub name: String,
  /// Projects the team is attached to.
  #[serde(default)]
  pub projects: Vec<String>,
}

fn default_active() -> bool {
  true
}

/// Directory over plain records, answering in insertion order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InMemoryDirectory {
  #[serde(default)]
  users: Vec<UserRecord>,
  #[serde(default)]
  teams: Vec<TeamRecord>,
}

impl InMemoryDirectory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse `{"users": [...], "teams": [...]}`.
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn with_user(mut self, id: &str, email: &str, is_active: bool) -> Self {
    self.users.push(UserRecord {
      id: id.to_string(),
      email: email.to_string(),
      name: email.to_string(),
      is_active,
    });
    self
  }

  pub fn with_team(mut self, id: &str, slug: &str, projects: &[&str]) -> Self {
    self.teams.push(TeamRecord {
      id: id.to_string(),
      slug: slug.to_string(),
      name: slug.to_string(),
      projects: projects.iter().map(|p| p.to_string()).collect(),
    });
    self
  }

  pub fn push_user(&mut self, user: UserRecord) {
    self.users.push(user);
  }

  pub fn push_team(&mut self, team: TeamRecord) {
    self.teams.push(team);
  }

  /// Display name for a resolved actor, if the directory still knows it.
  pub fn name_of(&self, actor: &Actor) -> Option<&str> {
    match actor.kind {
      OwnerKind::User => self
        .users
        .iter()
        .find(|u| u.id == actor.id.0)
        .map(|u| u.name.as_str()),
      OwnerKind::Team => self
        .teams
        .iter()
        .find(|t| t.id == actor.id.0)
        .map(|t| t.name.as_str()),
    }
  }
}

impl IdentityDirectory for InMemoryDirectory {
  fn users_by_email(&self, email: &str, _organization_id: Option<&str>) -> Vec<Identity> {
    let wanted = email.to_lowercase();
    self
      .users
      .iter()
      .filter(|u| u.email.to_lowercase() == wanted)
      .map(|u| Identity {
        id: ActorId(u.id.clone()),
        kind: OwnerKind::User,
        name: u.name.clone(),
        is_active: u.is_active,
      })
      .collect()
  }

  fn teams_by_slug(&self, project_id: &str, slug: &str) -> Vec<Identity> {
    self
      .teams
      .iter()
      .filter(|t| t.slug == slug && t.projects.iter().any(|p| p == project_id))
      .map(|t| Identity {
        id: ActorId(t.id.clone()),
        kind: OwnerKind::Team,
        name: t.name.clone(),
        is_active: true,
      })
      .collect()
  }

  fn display_name(&self, actor: &Actor) -> Option<String> {
    self.name_of(actor).map(str::to_string)
  }
}
