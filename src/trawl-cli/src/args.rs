//! CLI argument structures and parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use trawl_search::{
    DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT,
    SearchKind, SearchOptions, SearchToken,
};

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including per-file details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Trawl - fuzzy file name and content search
#[derive(Debug, Parser)]
#[command(name = "trawl")]
#[command(version, about = "Fuzzy file name and content search", long_about = None)]
pub struct Cli {
    /// Enable verbose output (same as --log-level debug)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Set log verbosity level (error, warn, info, debug, trace)
    #[arg(long = "log-level", value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level to log at, after `--verbose` and `TRAWL_LOG_LEVEL` are applied.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if let Ok(env_level) = std::env::var("TRAWL_LOG_LEVEL") {
            LogLevel::from_str_loose(&env_level).unwrap_or(self.log_level)
        } else {
            self.log_level
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search file names under a directory
    Files(SearchArgs),

    /// Search file contents line by line
    Grep(SearchArgs),
}

impl Commands {
    /// What the subcommand matches against.
    pub fn kind(&self) -> SearchKind {
        match self {
            Commands::Files(_) => SearchKind::Files,
            Commands::Grep(_) => SearchKind::Content,
        }
    }

    /// Shared search arguments.
    pub fn args(&self) -> &SearchArgs {
        match self {
            Commands::Files(args) | Commands::Grep(args) => args,
        }
    }
}

/// Arguments shared by every search subcommand.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Text to search for
    pub query: String,

    /// Directory to search in
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Match letter case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Match the query as a plain substring instead of fuzzily
    #[arg(long)]
    pub literal: bool,

    /// Minimum fuzzy score (0-100)
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_FUZZY_THRESHOLD,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub threshold: u8,

    /// Maximum number of results
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Maximum characters shown per matching line
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,

    /// Glob to exclude (repeatable; replaces the default exclusions)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Also match file names against their relative path
    #[arg(long)]
    pub full_path: bool,

    /// Honour .gitignore files
    #[arg(long)]
    pub gitignore: bool,

    /// Give up after this many seconds (0 disables the deadline)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Number of worker threads (defaults to the CPU count)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Print one JSON object per result
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// Converts the arguments into search options.
    pub fn to_options(&self) -> SearchOptions {
        let mut builder = SearchOptions::builder(self.query.clone(), self.root.clone())
            .case_sensitive(self.case_sensitive)
            .fuzzy(!self.literal)
            .fuzzy_threshold(self.threshold)
            .max_results(self.max_results)
            .max_line_length(self.max_line_length)
            .match_full_path(self.full_path)
            .respect_gitignore(self.gitignore);

        if !self.exclude.is_empty() {
            builder = builder.exclude(self.exclude.iter().cloned());
        }
        if let Some(threads) = self.threads {
            builder = builder.parallelism(threads);
        }

        builder.build()
    }

    /// Creates the cancellation token for one invocation.
    pub fn token(&self) -> SearchToken {
        if self.timeout == 0 {
            SearchToken::new()
        } else {
            SearchToken::with_timeout(Duration::from_secs(self.timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trawl_search::DEFAULT_EXCLUDE;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("trawl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Warn);
        assert_eq!(parse(&["files", "x"]).log_level, LogLevel::Warn);
    }

    #[test]
    fn test_log_level_from_str_loose() {
        assert_eq!(LogLevel::from_str_loose("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose("TrAcE"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str_loose("loud"), None);
    }

    #[test]
    fn test_verbose_means_debug() {
        let cli = parse(&["-v", "grep", "x"]);
        assert_eq!(cli.effective_log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_defaults_match_library() {
        let cli = parse(&["grep", "needle"]);
        assert_eq!(cli.command.kind(), SearchKind::Content);

        let options = cli.command.args().to_options();
        assert_eq!(options.query, "needle");
        assert_eq!(options.root, PathBuf::from("."));
        assert!(options.use_fuzzy);
        assert!(!options.case_sensitive);
        assert_eq!(options.fuzzy_threshold, DEFAULT_FUZZY_THRESHOLD);
        assert_eq!(options.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(options.exclude.len(), DEFAULT_EXCLUDE.len());
        assert!(options.parallelism.is_none());
        assert!(cli.command.args().token().deadline().is_some());
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = parse(&[
            "files",
            "main",
            "/tmp",
            "--literal",
            "--case-sensitive",
            "--max-results",
            "5",
            "--exclude",
            "*.log",
            "--exclude",
            "tmp/*",
            "--full-path",
            "--threads",
            "3",
            "--timeout",
            "0",
        ]);
        assert_eq!(cli.command.kind(), SearchKind::Files);

        let args = cli.command.args();
        let options = args.to_options();
        assert_eq!(options.root, PathBuf::from("/tmp"));
        assert!(!options.use_fuzzy);
        assert!(options.case_sensitive);
        assert_eq!(options.max_results, 5);
        assert_eq!(options.exclude, vec!["*.log".to_string(), "tmp/*".to_string()]);
        assert!(options.match_full_path);
        assert_eq!(options.worker_count(), 3);
        assert!(args.token().deadline().is_none());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let result = Cli::try_parse_from(["trawl", "files", "x", "--threshold", "101"]);
        assert!(result.is_err());
    }
}
