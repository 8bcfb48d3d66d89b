//! Integration tests for the ownership engine.

use ownership_engine::normalize::attributes;
use ownership_engine::{
  compile, ActorId, Engine, InMemoryDirectory, InboundEvent, OwnerKind, OwnershipPolicy,
  OwnershipRequest, OwnershipResult, ResolutionScope, Schema,
};

fn fixture_directory() -> InMemoryDirectory {
  InMemoryDirectory::from_json(
    r#"{
      "users": [
        {"id": "1", "email": "alice@example.com", "name": "Alice"},
        {"id": "2", "email": "bob@example.com", "name": "Bob", "is_active": false},
        {"id": "3", "email": "Carol@Example.com", "name": "Carol"}
      ],
      "teams": [
        {"id": "10", "slug": "backend", "name": "Backend", "projects": ["42"]},
        {"id": "11", "slug": "frontend", "name": "Frontend", "projects": ["42"]},
        {"id": "20", "slug": "payments", "name": "Payments", "projects": ["77"]}
      ]
    }"#,
  )
  .unwrap()
}

fn fixture_event() -> InboundEvent {
  let json = r#"{
    "event_id": "9b1deb4d3b7d4bad9bdd2b0d7b3dcb6d",
    "exception": {"values": [{
      "type": "ZeroDivisionError",
      "value": "division by zero",
      "stacktrace": {"frames": [
        {"filename": "django/core/handlers/base.py", "module": "django.core.handlers.base", "lineno": 185},
        {"filename": "app/billing/views.py", "abs_path": "/srv/app/billing/views.py", "module": "app.billing.views", "lineno": 12}
      ]}
    }]},
    "request": {"url": "https://shop.example.com/checkout/confirm"},
    "tags": [["environment", "prod"], ["level", "error"]],
    "some_unknown_field": {"ignored": true}
  }"#;
  serde_json::from_str(json).unwrap()
}

const POLICY: &str = "
# Billing code belongs to payments and Alice.
path:app/billing/* #payments alice@example.com
url:https://shop.example.com/checkout/* #frontend
*.py #backend
tags.environment:prod carol@example.com
";

fn ids(result: &OwnershipResult) -> Vec<(OwnerKind, &str)> {
  result.owners().iter().map(|a| (a.kind, a.id.0.as_str())).collect()
}

#[test]
fn first_matching_rule_resolves_in_project_scope() {
  let engine = Engine::with_defaults(fixture_directory());
  let schema = compile(POLICY).unwrap();
  let event = attributes(&fixture_event());

  // `#payments` belongs to project 77 only, so only Alice survives in 42.
  let result = engine
    .resolve_owners(Some(&schema), &event, &ResolutionScope::project("42"))
    .unwrap();
  assert_eq!(ids(&result), vec![(OwnerKind::User, "1")]);

  let result = engine
    .resolve_owners(Some(&schema), &event, &ResolutionScope::project("77"))
    .unwrap();
  assert_eq!(ids(&result), vec![(OwnerKind::Team, "20"), (OwnerKind::User, "1")]);
}

#[test]
fn later_rules_apply_when_earlier_ones_miss() {
  let engine = Engine::with_defaults(fixture_directory());
  let schema = compile(POLICY).unwrap();
  let event = attributes(
    &serde_json::from_str::<InboundEvent>(
      r#"{"stacktrace": {"frames": [{"filename": "app/users/models.py"}]}}"#,
    )
    .unwrap(),
  );
  let result = engine
    .resolve_owners(Some(&schema), &event, &ResolutionScope::project("42"))
    .unwrap();
  assert_eq!(ids(&result), vec![(OwnerKind::Team, "10")]);
}

#[test]
fn tag_rule_uses_case_insensitive_email() {
  let engine = Engine::with_defaults(fixture_directory());
  let schema = compile("tags.environment:prod CAROL@example.COM").unwrap();
  let result = engine
    .resolve_owners(Some(&schema), &attributes(&fixture_event()), &ResolutionScope::project("42"))
    .unwrap();
  assert_eq!(ids(&result), vec![(OwnerKind::User, "3")]);
}

#[test]
fn inactive_user_resolves_to_empty_owner_list() {
  let engine = Engine::with_defaults(fixture_directory());
  let schema = compile("*.py bob@example.com").unwrap();
  let result = engine
    .resolve_owners(Some(&schema), &attributes(&fixture_event()), &ResolutionScope::project("42"))
    .unwrap();
  assert_eq!(result, OwnershipResult::Owners(vec![]));
}

#[test]
fn unconfigured_policy_means_no_rule_matched() {
  let engine = Engine::with_defaults(fixture_directory());
  let resolution = engine
    .get_owners(
      &OwnershipPolicy::default(),
      &attributes(&fixture_event()),
      &ResolutionScope::project("42"),
    )
    .unwrap();
  assert_eq!(resolution.result, OwnershipResult::NoRuleMatched);
  assert!(resolution.fallthrough);
}

#[test]
fn stored_blob_and_raw_text_agree() {
  let raw = compile(POLICY).unwrap();
  let stored = Schema::load(&raw.dump()).unwrap();
  let engine = Engine::with_defaults(fixture_directory());
  let event = attributes(&fixture_event());
  let scope = ResolutionScope::project("77");
  assert_eq!(
    engine.resolve_owners(Some(&raw), &event, &scope).unwrap(),
    engine.resolve_owners(Some(&stored), &event, &scope).unwrap()
  );
}

#[test]
fn process_lines_end_to_end() {
  let mut engine = Engine::with_defaults(fixture_directory());
  let line = serde_json::json!({
    "project_id": "42",
    "organization_id": "acme",
    "ownership": {"raw": POLICY, "fallthrough": false},
    "event": {
      "stacktrace": {"frames": [{"filename": "static/app.js"}]},
      "request": {"url": "https://shop.example.com/checkout/confirm"}
    }
  });
  let request: OwnershipRequest = serde_json::from_value(line).unwrap();

  let out = engine.process(&request).unwrap();
  assert!(out.rule_matched);
  assert!(!out.fallthrough);
  assert_eq!(out.owners.len(), 1);
  assert_eq!(out.owners[0].id, ActorId("11".into()));

  let json = serde_json::to_value(&out).unwrap();
  assert_eq!(json["owners"][0]["type"], "team");
  assert_eq!(json["owners"][0]["id"], "11");

  // Same line again comes from the schema cache and gives the same answer.
  let again = engine.process(&request).unwrap();
  assert_eq!(serde_json::to_value(&again).unwrap(), json);
}

#[test]
fn unmatched_request_reports_no_match() {
  let mut engine = Engine::with_defaults(fixture_directory());
  let request: OwnershipRequest = serde_json::from_str(
    r#"{"project_id": "42", "ownership": {"raw": "*.rb #backend"}, "event": {}}"#,
  )
  .unwrap();
  let out = engine.process(&request).unwrap();
  assert!(!out.rule_matched);
  assert!(out.owners.is_empty());
  assert!(out.fallthrough);
}

#[test]
fn path_rules_match_frame_paths_as_written() {
  let engine = Engine::with_defaults(fixture_directory());
  let scope = ResolutionScope::project("42");
  let event: InboundEvent = serde_json::from_str(
    r#"{"stacktrace": {"frames": [
      {"filename": "./src/main.py"},
      {"filename": "C:\\app\\Program.cs"}
    ]}}"#,
  )
  .unwrap();
  let attrs = attributes(&event);

  for raw in [r"C:\app\* #backend", "./src/* #backend", "src/* #backend", "C:/app/*.cs #backend"] {
    let schema = compile(raw).unwrap();
    let result = engine.resolve_owners(Some(&schema), &attrs, &scope).unwrap();
    assert_eq!(ids(&result), vec![(OwnerKind::Team, "10")], "{}", raw);
  }
}

#[test]
fn double_star_within_a_name_compiles_and_matches() {
  let engine = Engine::with_defaults(fixture_directory());
  let schema = compile("app/**.rb #backend\napp/billing/**.py #payments").unwrap();
  let result = engine
    .resolve_owners(Some(&schema), &attributes(&fixture_event()), &ResolutionScope::project("77"))
    .unwrap();
  assert_eq!(ids(&result), vec![(OwnerKind::Team, "20")]);
}
