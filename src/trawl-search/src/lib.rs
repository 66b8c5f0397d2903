#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::uninlined_format_args
)]
//! Trawl Search - fuzzy file name and content search over a directory tree.
//!
//! Every invocation walks the tree once, matches candidates on a pool of
//! worker threads, and returns a bounded, ranked list of results. Nothing is
//! indexed or cached between invocations.
//!
//! # Features
//!
//! - Fuzzy subsequence matching (nucleo-matcher) scored 0-100, or literal
//!   substring matching
//! - File name search and line-by-line content search
//! - Hidden entries, common build/dependency directories, and exclusion
//!   globs are skipped during traversal
//! - Binary files are skipped for content search
//! - Deadline and cancellation via [`SearchToken`], with partial results
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use trawl_search::{SearchOptions, SearchToken, search};
//!
//! fn main() -> anyhow::Result<()> {
//!     let options = SearchOptions::builder("fn main", "/path/to/project")
//!         .fuzzy(false)
//!         .max_results(10)
//!         .build();
//!     let token = SearchToken::with_timeout(Duration::from_secs(10));
//!
//!     let outcome = search(&options, &token)?;
//!     for result in &outcome.results {
//!         println!("{}:{}: {}", result.path.display(), result.line, result.content);
//!     }
//!     Ok(())
//! }
//! ```

mod binary;
mod config;
mod error;
mod matcher;
mod ranker;
mod result;
mod search;
mod token;
mod walker;

pub use binary::{BINARY_SAMPLE_SIZE, is_binary};
pub use config::{
    DEFAULT_EXCLUDE, DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_LINE_LENGTH,
    DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT, SearchOptions, SearchOptionsBuilder,
};
pub use error::{ErrorKind, SearchError, SearchResult};
pub use matcher::{FuzzyMatcher, LiteralMatcher, MatchScratch, QueryMatcher, Scored, snippet};
pub use ranker::TopK;
pub use result::{MAX_SCORE, MatchResult, SearchKind, SearchOutcome, SearchStats, SearchStatus};
pub use search::{
    SearchCoordinator, search, search_async, search_files, search_files_async, search_files_in,
};
pub use token::SearchToken;
pub use walker::{Candidate, DEFAULT_SKIPPED_DIRS, ExclusionRules, PathWalker};
