//! Ownership text compiler.
//!
//! One rule per line: a matcher token followed by one or more owners.
//!
//! ```text
//! # comment
//! path:src/payments/* #payments alice@example.com
//! url:https://*.example.com/checkout* #web
//! tags.environment:prod ops@example.com
//! *.py #backend
//! ```
//!
//! `#slug` is a team, anything else is a user email. A matcher token without
//! a recognized `type:` prefix is a path pattern.

use crate::error::SchemaError;
use crate::matcher::Matcher;
use crate::schema::{Rule, Schema};
use crate::types::OwnerReference;

/// Compile raw ownership text into a schema.
pub fn compile(raw: &str) -> Result<Schema, SchemaError> {
  let mut rules = Vec::new();

  for (idx, line) in raw.lines().enumerate() {
    let line_no = idx + 1;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    let mut tokens = line.split_whitespace();
    let matcher = match tokens.next() {
      Some(token) => parse_matcher(token).map_err(|e| SchemaError::parse(line_no, e.to_string()))?,
      None => continue,
    };

    let owners = tokens
      .map(|token| parse_owner(token).ok_or_else(|| SchemaError::parse(line_no, "empty team name")))
      .collect::<Result<Vec<_>, SchemaError>>()?;
    if owners.is_empty() {
      return Err(SchemaError::parse(line_no, "rule has no owners"));
    }

    rules.push(Rule::new(matcher, owners));
  }

  Ok(Schema::new(rules))
}

fn parse_matcher(token: &str) -> Result<Matcher, SchemaError> {
  match token.split_once(':') {
    Some((kind, pattern)) if Matcher::is_known_kind(kind) || kind == "tags." => {
      Matcher::new(kind, pattern)
    }
    _ => Matcher::new("path", token),
  }
}

fn parse_owner(token: &str) -> Option<OwnerReference> {
  match token.strip_prefix('#') {
    Some("") => None,
    Some(slug) => Some(OwnerReference::team(slug)),
    None => Some(OwnerReference::user(token)),
  }
}
