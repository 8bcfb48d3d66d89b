//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an OwnershipRequest. Output lines are either:
//! - An OwnersOutput (owners of the event, whether a rule fired, fallthrough)
//! - An ErrorOutput (when the line or its ownership definition is invalid)
//!
//! Environment:
//! - OWNERSHIP_DIRECTORY: path to a `{"users": [...], "teams": [...]}` file
//! - OWNERSHIP_CASE_INSENSITIVE: `1`/`true` to fold case in glob matchers
//! - RUST_LOG: log filter (logs go to stderr)

use ownership_engine::types::ErrorOutput;
use ownership_engine::{Config, Engine, EngineError, InMemoryDirectory, OwnershipRequest};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  fmt().with_env_filter(env_filter).with_writer(io::stderr).init();

  let directory = match load_directory() {
    Ok(d) => d,
    Err(e) => {
      tracing::error!("ownership-engine: {}", e);
      std::process::exit(1);
    }
  };

  let config = Config {
    glob_case_sensitive: !env_flag("OWNERSHIP_CASE_INSENSITIVE"),
    ..Config::default()
  };

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let mut engine = Engine::new(config, directory);

  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        tracing::error!("ownership-engine: read error: {}", e);
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let request: OwnershipRequest = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        let err = ErrorOutput::new(format!("json parse: {}", e));
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
        continue;
      }
    };

    match engine.process(&request) {
      Ok(owners) => {
        let _ = serde_json::to_writer(&mut out, &owners);
        let _ = writeln!(out);
      }
      Err(e) => {
        let err = match &e {
          EngineError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          EngineError::Schema(_) => ErrorOutput::new(e.to_string()).with_field("ownership"),
          _ => ErrorOutput::new(e.to_string()),
        };
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
      }
    }
  }

  let _ = out.flush();
}

fn load_directory() -> Result<InMemoryDirectory, String> {
  let path = match std::env::var("OWNERSHIP_DIRECTORY") {
    Ok(p) => p,
    Err(_) => {
      tracing::warn!("OWNERSHIP_DIRECTORY not set; every owner will be unknown");
      return Ok(InMemoryDirectory::new());
    }
  };
  let contents =
    std::fs::read_to_string(&path).map_err(|e| format!("cannot read {}: {}", path, e))?;
  InMemoryDirectory::from_json(&contents).map_err(|e| format!("invalid directory {}: {}", path, e))
}

fn env_flag(name: &str) -> bool {
  matches!(
    std::env::var(name).as_deref(),
    Ok("1") | Ok("true") | Ok("yes")
  )
}
