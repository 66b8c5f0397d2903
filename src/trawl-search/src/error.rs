//! Error types for search operations.

use std::path::PathBuf;

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Broad classification of a [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied an unusable query, root, or option.
    InvalidInput,
    /// A single entry could not be read. Recovered inside the engine.
    IoRead,
    /// An unexpected fault inside the engine.
    Internal,
}

/// Errors that can occur during search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The specified root directory does not exist.
    #[error("Root directory does not exist: {0}")]
    RootNotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Search query is empty.
    #[error("Search query cannot be empty")]
    EmptyQuery,

    /// An option is out of its allowed range.
    #[error("Invalid option '{name}': {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// Failed to parse an exclusion glob pattern.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    /// Failed to read file contents.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected fault, such as a worker panic or a failed task join.
    #[error("Internal search error: {0}")]
    Internal(String),
}

impl SearchError {
    /// Creates a new `RootNotFound` error.
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    /// Creates a new `NotADirectory` error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Creates a new `InvalidOption` error.
    pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidGlobPattern` error.
    pub fn invalid_glob(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGlobPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `ReadFile` error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a new `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RootNotFound(_)
            | Self::NotADirectory(_)
            | Self::EmptyQuery
            | Self::InvalidOption { .. }
            | Self::InvalidGlobPattern { .. } => ErrorKind::InvalidInput,
            Self::ReadFile { .. } => ErrorKind::IoRead,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the caller can fix this error by changing its input.
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::root_not_found("/nonexistent");
        assert!(err.to_string().contains("/nonexistent"));

        let err = SearchError::EmptyQuery;
        assert!(err.to_string().contains("empty"));

        let err = SearchError::invalid_option("max_results", "must be greater than zero");
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(SearchError::EmptyQuery.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            SearchError::invalid_glob("[", "unclosed").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(SearchError::internal("boom").kind(), ErrorKind::Internal);

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SearchError::read_file("/locked", io_err);
        assert_eq!(err.kind(), ErrorKind::IoRead);
        assert!(!err.is_invalid_input());
    }
}
