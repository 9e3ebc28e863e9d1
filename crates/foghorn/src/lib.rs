//! ## Features
//!
//! - Standard logging levels (verbose, debug, info, warn, error, success)
//! - Multi-line message support with per-line prefixes
//! - Banner output for operator-facing milestones (`blast`, `all_clear`)
//! - In-memory journal ring buffer for daemon log queries ("journal" feature)
//! - All output to stderr so stdout stays clean for piped tool output
//!
//! ## Usage
//!
//! Level functions: `verbose()`, `debug()`, `info()`, `warn()`, `error()`, `success()`
//!
//! Banners: `blast()`, `all_clear()`
//!
//! Each level function has a matching `#[macro_export]` macro.

use colored::*;
use serde::{Deserialize, Serialize};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Verbose,
  Debug,
  Info,
  Warn,
  Error,
  Success,
}

impl LogLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      LogLevel::Verbose => "verbose",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
      LogLevel::Success => "success",
    }
  }

  /// Parse a level name; `None` for anything unrecognized.
  pub fn parse(name: &str) -> Option<Self> {
    match name.to_lowercase().as_str() {
      "verbose" => Some(LogLevel::Verbose),
      "debug" => Some(LogLevel::Debug),
      "info" => Some(LogLevel::Info),
      "warn" | "warning" => Some(LogLevel::Warn),
      "error" => Some(LogLevel::Error),
      "success" => Some(LogLevel::Success),
      _ => None,
    }
  }

  fn color(&self) -> Color {
    match self {
      LogLevel::Verbose => Color::Cyan,
      LogLevel::Debug => Color::Magenta,
      LogLevel::Info => Color::Blue,
      LogLevel::Warn => Color::Yellow,
      LogLevel::Error => Color::Red,
      LogLevel::Success => Color::Green,
    }
  }
}

impl std::fmt::Display for LogLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Write a message to stderr verbatim, one line at a time.
pub fn raw(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

fn format_prefix(level: LogLevel) -> String {
  let tag = format!("{:>7}", level.as_str());
  format!("{} {}", tag.color(level.color()).bold(), "|".dimmed())
}

/// Core leveled output: every line of the message gets the level prefix.
pub fn emit(level: LogLevel, message: &str) {
  let prefix = format_prefix(level);
  for line in message.lines() {
    raw(&format!("{prefix} {line}"));
  }
}

pub fn verbose(message: &str) {
  emit(LogLevel::Verbose, message);
}

pub fn debug(message: &str) {
  emit(LogLevel::Debug, message);
}

/// Info level logging - general information
pub fn info(message: &str) {
  emit(LogLevel::Info, message);
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  emit(LogLevel::Warn, message);
}

/// Error level logging - something went wrong
pub fn error(message: &str) {
  emit(LogLevel::Error, message);
}

/// Success level logging - something completed
pub fn success(message: &str) {
  emit(LogLevel::Success, message);
}

/// Create a banner line of the specified length and character
pub fn banner_line(length: usize, ch: char) -> String {
  ch.to_string().repeat(length)
}

/// Display a message framed by banner lines
pub fn framed<F>(log_fn: F, message: &str, width: usize, border: char)
where
  F: Fn(&str),
{
  let banner = banner_line(width, border);

  log_fn(&banner);
  log_fn(message);
  log_fn(&banner);
}

/// Attention banner for operator-facing milestones
pub fn blast(message: &str) {
  framed(|msg| raw(&msg.cyan().bold().to_string()), message, 52, '=');
}

/// Completion banner
pub fn all_clear(message: &str) {
  framed(|msg| raw(&msg.green().bold().to_string()), message, 44, '~');
}

#[macro_export]
macro_rules! verbose {
  ($msg:expr) => {
    $crate::verbose($msg);
  };
}

#[macro_export]
macro_rules! debug {
  ($msg:expr) => {
    $crate::debug($msg);
  };
}

#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg);
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::warn($msg);
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::error($msg);
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg);
  };
}

#[macro_export]
macro_rules! blast {
  ($msg:expr) => {
    $crate::blast($msg);
  };
}

#[macro_export]
macro_rules! all_clear {
  ($msg:expr) => {
    $crate::all_clear($msg);
  };
}

/// In-memory journal for daemon log queries - available with the "journal" feature
#[cfg(feature = "journal")]
pub mod journal {
  use super::*;
  use chrono::{DateTime, Utc};
  use std::collections::VecDeque;
  use std::sync::RwLock;

  /// A structured journal entry
  #[derive(Debug, Serialize, Deserialize, Clone)]
  #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
  pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub component: String,
  }

  /// Capacity-bounded journal storage. Interior mutability so a shared
  /// `Arc<Journal>` can record from any handler.
  pub struct Journal {
    entries: RwLock<VecDeque<JournalEntry>>,
    capacity: usize,
  }

  impl Journal {
    /// Create a journal that retains at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
      Self {
        entries: RwLock::new(VecDeque::with_capacity(capacity)),
        capacity,
      }
    }

    /// Record an entry, evicting the oldest when at capacity
    pub fn record(&self, level: LogLevel, message: &str, component: &str) {
      let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

      if entries.len() >= self.capacity {
        entries.pop_front();
      }

      entries.push_back(JournalEntry {
        timestamp: Utc::now(),
        level,
        message: message.to_string(),
        component: component.to_string(),
      });
    }

    pub fn info(&self, message: &str, component: &str) {
      self.record(LogLevel::Info, message, component);
    }

    pub fn warn(&self, message: &str, component: &str) {
      self.record(LogLevel::Warn, message, component);
    }

    pub fn error(&self, message: &str, component: &str) {
      self.record(LogLevel::Error, message, component);
    }

    pub fn success(&self, message: &str, component: &str) {
      self.record(LogLevel::Success, message, component);
    }

    /// Retrieve entries, newest first, optionally filtered by level and
    /// truncated to `limit`
    pub fn query(&self, limit: Option<usize>, level_filter: Option<LogLevel>) -> Vec<JournalEntry> {
      let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());

      let mut matched: Vec<JournalEntry> = entries
        .iter()
        .filter(|entry| level_filter.map_or(true, |level| entry.level == level))
        .cloned()
        .collect();

      matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

      if let Some(limit) = limit {
        matched.truncate(limit);
      }

      matched
    }

    /// Current number of stored entries
    pub fn len(&self) -> usize {
      self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
      self.len() == 0
    }

    /// Maximum number of entries this journal retains
    pub fn capacity(&self) -> usize {
      self.capacity
    }
  }
}
