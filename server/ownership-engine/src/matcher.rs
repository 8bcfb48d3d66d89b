//! Rule matchers: decide whether one rule applies to one event.
//!
//! Every matcher is total. An event without the attribute a matcher reads
//! (no frames, no request URL, no such tag) simply does not match.

use glob::Pattern;
use std::fmt;

use crate::config::Config;
use crate::error::SchemaError;
use crate::types::EventAttributes;

const TAG_PREFIX: &str = "tags.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
  /// Glob against frame `filename` / `abs_path`.
  Path(Pattern),
  /// Glob against the request URL.
  Url(Pattern),
  /// Glob against frame `module`.
  Module(Pattern),
  /// Exact key and value equality against one event tag.
  Tag { key: String, value: String },
}

impl Matcher {
  /// Build a matcher from its stored type name (`path`, `url`, `module`,
  /// `tags.<key>`) and pattern.
  pub fn new(kind: &str, pattern: &str) -> Result<Self, SchemaError> {
    if pattern.is_empty() {
      return Err(SchemaError::invalid_pattern(pattern, "must not be empty"));
    }
    match kind {
      "path" => Ok(Self::Path(compile_glob(pattern)?)),
      "url" => Ok(Self::Url(compile_glob(pattern)?)),
      "module" => Ok(Self::Module(compile_glob(pattern)?)),
      _ => match kind.strip_prefix(TAG_PREFIX) {
        Some("") => Err(SchemaError::invalid_pattern(kind, "tag key must not be empty")),
        Some(key) => Ok(Self::Tag {
          key: key.to_string(),
          value: pattern.to_string(),
        }),
        None => Err(SchemaError::UnknownMatcher(kind.to_string())),
      },
    }
  }

  /// True when `kind` names a matcher type `new` accepts.
  pub fn is_known_kind(kind: &str) -> bool {
    matches!(kind, "path" | "url" | "module")
      || kind.strip_prefix(TAG_PREFIX).is_some_and(|key| !key.is_empty())
  }

  /// Stored type name, the inverse of [`Matcher::new`].
  pub fn kind(&self) -> String {
    match self {
      Self::Path(_) => "path".to_string(),
      Self::Url(_) => "url".to_string(),
      Self::Module(_) => "module".to_string(),
      Self::Tag { key, .. } => format!("{}{}", TAG_PREFIX, key),
    }
  }

  pub fn pattern(&self) -> &str {
    match self {
      Self::Path(p) | Self::Url(p) | Self::Module(p) => p.as_str(),
      Self::Tag { value, .. } => value,
    }
  }

  /// Test with default glob options.
  pub fn test(&self, event: &EventAttributes) -> bool {
    self.test_with(event, &Config::default())
  }

  pub fn test_with(&self, event: &EventAttributes, config: &Config) -> bool {
    let options = config.match_options();
    match self {
      Self::Path(p) => event.paths.iter().any(|path| p.matches_with(path, options)),
      Self::Module(p) => event.modules.iter().any(|m| p.matches_with(m, options)),
      Self::Url(p) => event
        .url
        .as_deref()
        .is_some_and(|url| p.matches_with(url, options)),
      Self::Tag { key, value } => event.tags.iter().any(|(k, v)| k == key && v == value),
    }
  }
}

impl fmt::Display for Matcher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.kind(), self.pattern())
  }
}

fn compile_glob(pattern: &str) -> Result<Pattern, SchemaError> {
  Pattern::new(&collapse_stars(pattern)).map_err(|e| SchemaError::invalid_pattern(pattern, e.msg))
}

/// A run of stars is recursive `**` only when it forms a whole path
/// component. Anywhere else it is a plain `*`, the way fnmatch reads it.
/// Stars inside a `[...]` class are left alone.
fn collapse_stars(pattern: &str) -> String {
  let chars: Vec<char> = pattern.chars().collect();
  let mut out = String::with_capacity(pattern.len());
  let mut in_class = false;
  let mut i = 0;
  while i < chars.len() {
    let c = chars[i];
    if in_class || c != '*' {
      match c {
        '[' if !in_class => in_class = true,
        ']' if in_class => in_class = false,
        _ => {}
      }
      out.push(c);
      i += 1;
      continue;
    }

    let start = i;
    while i < chars.len() && chars[i] == '*' {
      i += 1;
    }
    let whole_component =
      (start == 0 || chars[start - 1] == '/') && (i == chars.len() || chars[i] == '/');
    out.push_str(if i - start > 1 && whole_component { "**" } else { "*" });
  }
  out
}
