//! Search result types.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// Highest score a match can have.
pub const MAX_SCORE: u8 = 100;

/// What a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    /// Match against file names.
    #[default]
    Files,

    /// Match against file contents, line by line.
    Content,
}

impl SearchKind {
    /// Returns a human-readable description of the kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Files => "file name",
            Self::Content => "file content",
        }
    }
}

/// A single search match.
///
/// Ordering is ranking order: higher score first, then path ascending, then
/// line ascending. A sorted `Vec<MatchResult>` is therefore best-first.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// Matched file, relative to the search root.
    pub path: PathBuf,

    /// 1-based line number, or 0 for file name matches.
    pub line: usize,

    /// The matched line, truncated around the match. Empty for file matches.
    pub content: String,

    /// The exact matched text. Empty for file matches.
    #[serde(rename = "match")]
    pub matched: String,

    /// Match quality from 0 to 100.
    pub score: u8,
}

impl MatchResult {
    /// Creates a file name match.
    pub fn file(path: PathBuf, score: u8) -> Self {
        Self {
            path,
            line: 0,
            content: String::new(),
            matched: String::new(),
            score,
        }
    }

    /// Creates a content match.
    pub fn content(
        path: PathBuf,
        line: usize,
        content: String,
        matched: String,
        score: u8,
    ) -> Self {
        Self {
            path,
            line,
            content,
            matched,
            score,
        }
    }

    /// Returns true if this is a file name match.
    pub fn is_file_match(&self) -> bool {
        self.line == 0
    }

    /// Returns the display string for this match.
    pub fn display(&self) -> String {
        if self.is_file_match() {
            self.path.display().to_string()
        } else {
            format!("{}:{}", self.path.display(), self.line)
        }
    }
}

impl PartialEq for MatchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MatchResult {}

impl PartialOrd for MatchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MatchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.line.cmp(&other.line))
    }
}

/// How a search invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// The walk finished, or the ranked results could no longer change.
    Completed,

    /// The deadline passed or the token was cancelled. Results are partial.
    Cancelled,
}

/// Statistics about a search operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    /// Files yielded by the walker.
    pub files_visited: usize,

    /// Files the workers finished matching.
    pub files_searched: usize,

    /// Files with at least one match.
    pub files_matched: usize,

    /// Wall time of the invocation.
    pub elapsed: Duration,
}

/// Ranked results plus completion status of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Results, best first.
    pub results: Vec<MatchResult>,

    /// Whether the search ran to completion.
    pub status: SearchStatus,

    /// Counters gathered while searching.
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// Returns true if the search was cut short.
    pub fn is_cancelled(&self) -> bool {
        self.status == SearchStatus::Cancelled
    }

    /// Matched paths in ranking order.
    pub fn paths(&self) -> Vec<&Path> {
        self.results.iter().map(|r| r.path.as_path()).collect()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
