//! Per-invocation search options.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{SearchError, SearchResult};

/// Default cap on the number of returned results.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default maximum snippet length in characters.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 200;

/// Default minimum fuzzy score a candidate needs to be reported.
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 60;

/// Files above this size are skipped by content search.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Deadline applied by the convenience entry points and the CLI.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exclusion globs used by the interactive search dialog.
pub const DEFAULT_EXCLUDE: &[&str] = &[
    "*.bin",
    "*.exe",
    "*.so",
    "*.dylib",
    "*.dll",
    ".git/*",
    "vendor/*",
    "node_modules/*",
];

/// Options for a single search invocation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// The query to match. Must not be empty.
    pub query: String,

    /// Root directory to search in.
    pub root: PathBuf,

    /// Whether matching respects letter case.
    pub case_sensitive: bool,

    /// Maximum number of results to return.
    pub max_results: usize,

    /// Maximum snippet length in characters for content matches.
    pub max_line_length: usize,

    /// Use fuzzy subsequence matching instead of literal substring matching.
    pub use_fuzzy: bool,

    /// Minimum fuzzy score (0-100). Ignored in literal mode.
    pub fuzzy_threshold: u8,

    /// Glob patterns removing matching paths from consideration.
    pub exclude: Vec<String>,

    /// File search also scores the root-relative path, keeping the better score.
    pub match_full_path: bool,

    /// Whether to honour `.gitignore` files.
    pub respect_gitignore: bool,

    /// Files larger than this (in bytes) are skipped by content search.
    pub max_file_size: u64,

    /// Number of worker threads. `None` means one per CPU.
    pub parallelism: Option<NonZeroUsize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            root: PathBuf::from("."),
            case_sensitive: false,
            max_results: DEFAULT_MAX_RESULTS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            use_fuzzy: true,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            exclude: DEFAULT_EXCLUDE.iter().map(|p| p.to_string()).collect(),
            match_full_path: false,
            respect_gitignore: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            parallelism: None,
        }
    }
}

impl SearchOptions {
    /// Creates options for `query` under `root`, everything else defaulted.
    pub fn new(query: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            root: root.into(),
            ..Default::default()
        }
    }

    /// Creates a builder for constructing options.
    pub fn builder(query: impl Into<String>, root: impl Into<PathBuf>) -> SearchOptionsBuilder {
        SearchOptionsBuilder::new(query, root)
    }

    /// Checks every field that can be checked without touching the file system.
    ///
    /// Root existence and glob syntax are checked when the walker is built.
    pub fn validate(&self) -> SearchResult<()> {
        if self.query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if self.max_results == 0 {
            return Err(SearchError::invalid_option(
                "max_results",
                "must be greater than zero",
            ));
        }
        if self.max_line_length == 0 {
            return Err(SearchError::invalid_option(
                "max_line_length",
                "must be greater than zero",
            ));
        }
        if self.fuzzy_threshold > 100 {
            return Err(SearchError::invalid_option(
                "fuzzy_threshold",
                format!("{} is outside 0..=100", self.fuzzy_threshold),
            ));
        }
        Ok(())
    }

    /// Number of worker threads to start for this invocation.
    pub fn worker_count(&self) -> usize {
        self.parallelism
            .map(NonZeroUsize::get)
            .unwrap_or_else(num_cpus::get)
            .max(1)
    }
}

/// Builder for creating `SearchOptions` instances.
#[derive(Debug)]
pub struct SearchOptionsBuilder {
    options: SearchOptions,
}

impl SearchOptionsBuilder {
    /// Creates a new builder for `query` under `root`.
    pub fn new(query: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            options: SearchOptions::new(query, root),
        }
    }

    /// Sets case-sensitive matching.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.options.case_sensitive = case_sensitive;
        self
    }

    /// Sets the result cap.
    pub fn max_results(mut self, max: usize) -> Self {
        self.options.max_results = max;
        self
    }

    /// Sets the maximum snippet length.
    pub fn max_line_length(mut self, max: usize) -> Self {
        self.options.max_line_length = max;
        self
    }

    /// Switches between fuzzy and literal matching.
    pub fn fuzzy(mut self, use_fuzzy: bool) -> Self {
        self.options.use_fuzzy = use_fuzzy;
        self
    }

    /// Sets the fuzzy score threshold.
    pub fn fuzzy_threshold(mut self, threshold: u8) -> Self {
        self.options.fuzzy_threshold = threshold;
        self
    }

    /// Replaces the exclusion globs.
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Also score the relative path in file search.
    pub fn match_full_path(mut self, enable: bool) -> Self {
        self.options.match_full_path = enable;
        self
    }

    /// Sets whether to respect `.gitignore` files.
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.options.respect_gitignore = respect;
        self
    }

    /// Sets the maximum file size for content search.
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.options.max_file_size = size;
        self
    }

    /// Sets the number of worker threads.
    pub fn parallelism(mut self, workers: usize) -> Self {
        self.options.parallelism = NonZeroUsize::new(workers);
        self
    }

    /// Builds the options.
    pub fn build(self) -> SearchOptions {
        self.options
    }
}
