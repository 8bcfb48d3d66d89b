//! Engine configuration with sane defaults.

use glob::MatchOptions;

/// Tunables for matcher evaluation and schema compilation.
#[derive(Debug, Clone)]
pub struct Config {
  /// Glob patterns compare characters case-sensitively.
  pub glob_case_sensitive: bool,
  /// `*` and `?` stop at `/` when set. Off by default so `*.py` matches
  /// `src/app/views.py`.
  pub glob_literal_separator: bool,
  /// Distinct raw definitions kept compiled before the cache is flushed.
  pub schema_cache_capacity: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      glob_case_sensitive: true,
      glob_literal_separator: false,
      schema_cache_capacity: 128,
    }
  }
}

impl Config {
  pub fn match_options(&self) -> MatchOptions {
    MatchOptions {
      case_sensitive: self.glob_case_sensitive,
      require_literal_separator: self.glob_literal_separator,
      require_literal_leading_dot: false,
    }
  }
}
