//! Build the matcher-facing attribute view from inbound event data.

use crate::types::*;

/// Collect the attributes matchers test against. Never fails: anything the
/// event lacks is simply absent from the view.
pub fn attributes(raw: &InboundEvent) -> EventAttributes {
  let mut attrs = EventAttributes::default();

  let exception_stacks = raw
    .exception
    .iter()
    .flat_map(|e| e.values.iter())
    .filter_map(|v| v.stacktrace.as_ref());

  for stacktrace in raw.stacktrace.iter().chain(exception_stacks) {
    for frame in &stacktrace.frames {
      for path in [&frame.filename, &frame.abs_path].into_iter().flatten() {
        if path.is_empty() {
          continue;
        }
        let normalized = normalize_path(path);
        if normalized != *path {
          attrs.paths.push(path.clone());
        }
        attrs.paths.push(normalized);
      }
      if let Some(module) = frame.module.as_deref().filter(|m| !m.is_empty()) {
        attrs.modules.push(module.to_string());
      }
    }
  }

  attrs.url = raw
    .request
    .as_ref()
    .and_then(|r| r.url.as_deref())
    .map(str::trim)
    .filter(|u| !u.is_empty())
    .map(str::to_string);

  attrs.tags = match &raw.tags {
    InboundTags::Pairs(pairs) => pairs.clone(),
    InboundTags::Map(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
  };

  attrs
}

/// Normalized form of a frame path, tested alongside the raw value:
/// - backslash -> forward slash
/// - strip leading ./
///
/// Case is preserved; case folding is a matcher option.
fn normalize_path(p: &str) -> String {
  let s = p.replace('\\', "/");
  match s.strip_prefix("./") {
    Some(rest) => rest.to_string(),
    None => s,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn event(json: &str) -> InboundEvent {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn normalize_path_basics() {
    assert_eq!(normalize_path("src\\auth\\jwt.go"), "src/auth/jwt.go");
    assert_eq!(normalize_path("./src/utils/index.ts"), "src/utils/index.ts");
    assert_eq!(normalize_path("SRC/App.tsx"), "SRC/App.tsx");
    assert_eq!(
      normalize_path("http://example.com/static/app.js"),
      "http://example.com/static/app.js"
    );
  }

  #[test]
  fn collects_frames_from_stacktrace_and_exceptions() {
    let raw = event(
      r#"{
        "stacktrace": {"frames": [{"filename": "./top.py", "module": "top"}]},
        "exception": {"values": [
          {"type": "ValueError", "stacktrace": {"frames": [
            {"filename": "app/views.py", "abs_path": "/srv/app/views.py", "module": "app.views"}
          ]}},
          {"type": "KeyError"}
        ]}
      }"#,
    );
    let attrs = attributes(&raw);
    assert_eq!(
      attrs.paths,
      vec!["./top.py", "top.py", "app/views.py", "/srv/app/views.py"]
    );
    assert_eq!(attrs.modules, vec!["top", "app.views"]);
  }

  #[test]
  fn windows_paths_keep_their_raw_form() {
    let raw = event(r#"{"stacktrace": {"frames": [{"filename": "C:\\app\\Program.cs"}]}}"#);
    let attrs = attributes(&raw);
    assert_eq!(attrs.paths, vec!["C:\\app\\Program.cs", "C:/app/Program.cs"]);
  }

  #[test]
  fn legacy_interface_keys_are_accepted() {
    let raw = event(
      r#"{
        "sentry.interfaces.Exception": {"values": [
          {"stacktrace": {"frames": [{"filename": "lib/core.rb"}]}}
        ]},
        "sentry.interfaces.Http": {"url": "https://example.com/a"}
      }"#,
    );
    let attrs = attributes(&raw);
    assert_eq!(attrs.paths, vec!["lib/core.rb"]);
    assert_eq!(attrs.url.as_deref(), Some("https://example.com/a"));
  }

  #[test]
  fn tags_accept_pairs_and_maps() {
    let pairs = attributes(&event(r#"{"tags": [["level", "error"], ["environment", "prod"]]}"#));
    assert_eq!(
      pairs.tags,
      vec![("level".into(), "error".into()), ("environment".into(), "prod".into())]
    );
    let map = attributes(&event(r#"{"tags": {"environment": "prod"}}"#));
    assert_eq!(map.tags, vec![("environment".into(), "prod".into())]);
  }

  #[test]
  fn empty_event_has_no_attributes() {
    let attrs = attributes(&event("{}"));
    assert_eq!(attrs, EventAttributes::default());
    let attrs = attributes(&event(r#"{"request": {"url": "  "}}"#));
    assert!(attrs.url.is_none());
  }
}
