//! Lazy directory traversal yielding search candidates.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, Walk, WalkBuilder};

use crate::config::SearchOptions;
use crate::error::{SearchError, SearchResult};
use crate::token::SearchToken;

/// Directory names that are never descended into.
pub const DEFAULT_SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "build",
    "dist",
    "vendor",
    "__pycache__",
    "venv",
    ".git",
    ".hg",
    ".svn",
    ".cache",
    ".venv",
    ".idea",
    ".vscode",
];

/// A file discovered by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path as reached from the root, usable for opening the file.
    pub path: PathBuf,

    /// Path relative to the search root.
    pub relative: PathBuf,

    /// Base name of the file.
    pub file_name: String,
}

impl Candidate {
    /// Relative path with `/` separators.
    pub fn relative_str(&self) -> String {
        slash_path(&self.relative)
    }
}

/// Compiled exclusion globs.
///
/// Patterns are case-sensitive and `*` may cross `/`. A path is excluded
/// when a pattern matches it or any suffix of it that starts at a
/// component boundary; directories are also tested with a trailing `/`.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    set: GlobSet,
}

impl ExclusionRules {
    /// Compiles `patterns`, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> SearchResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(false)
                .build()
                .map_err(|e| SearchError::invalid_glob(pattern, e.kind().to_string()))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| SearchError::invalid_glob(patterns_joined(patterns), e.to_string()))?;
        Ok(Self { set })
    }

    /// Rules that exclude nothing.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    /// Returns true if the root-relative `relative` path is excluded.
    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        if self.set.is_empty() {
            return false;
        }

        let full = slash_path(relative);
        if full.is_empty() {
            return false;
        }

        let mut offsets = vec![0];
        offsets.extend(full.match_indices('/').map(|(i, _)| i + 1));

        offsets.into_iter().any(|start| {
            let suffix = &full[start..];
            self.set.is_match(suffix) || (is_dir && self.set.is_match(format!("{suffix}/")))
        })
    }
}

fn patterns_joined<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| DEFAULT_SKIPPED_DIRS.contains(&name))
}

/// Depth-first, name-sorted iterator over the regular files under a root.
///
/// Hidden entries, the [`DEFAULT_SKIPPED_DIRS`], and excluded paths are
/// pruned during traversal. The walker checks its token before yielding each
/// candidate and ends early once it is cancelled.
pub struct PathWalker {
    root: PathBuf,
    walk: Walk,
    token: SearchToken,
    visited: usize,
    cancelled: bool,
    finished: bool,
}

impl std::fmt::Debug for PathWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathWalker")
            .field("root", &self.root)
            .field("visited", &self.visited)
            .field("cancelled", &self.cancelled)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl PathWalker {
    /// Creates a walker for `options.root` with `options.exclude` applied.
    pub fn new(options: &SearchOptions, token: SearchToken) -> SearchResult<Self> {
        let rules = ExclusionRules::new(&options.exclude)?;
        Self::with_rules(&options.root, rules, options.respect_gitignore, token)
    }

    /// Creates a walker with precompiled exclusion rules.
    pub fn with_rules(
        root: &Path,
        rules: ExclusionRules,
        respect_gitignore: bool,
        token: SearchToken,
    ) -> SearchResult<Self> {
        validate_root(root)?;

        let rules = Arc::new(rules);
        let filter_root = root.to_path_buf();

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .require_git(false)
            .parents(respect_gitignore)
            .git_ignore(respect_gitignore)
            .git_global(respect_gitignore)
            .git_exclude(respect_gitignore)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if is_hidden(entry) || is_skipped_dir(entry) {
                    tracing::trace!(path = %entry.path().display(), "pruned");
                    return false;
                }
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                let relative = entry.path().strip_prefix(&filter_root).unwrap_or(entry.path());
                !rules.is_excluded(relative, is_dir)
            });

        Ok(Self {
            root: root.to_path_buf(),
            walk: builder.build(),
            token,
            visited: 0,
            cancelled: false,
            finished: false,
        })
    }

    /// Number of candidates yielded so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Returns true if the walk ended because the token was cancelled.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    fn candidate(&self, entry: DirEntry) -> Option<Candidate> {
        let relative = entry.path().strip_prefix(&self.root).ok()?.to_path_buf();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        Some(Candidate {
            path: entry.into_path(),
            relative,
            file_name,
        })
    }
}

impl Iterator for PathWalker {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.finished {
            return None;
        }

        loop {
            if self.token.is_cancelled() {
                tracing::debug!(visited = self.visited, "walk cancelled");
                self.cancelled = true;
                self.finished = true;
                return None;
            }

            let entry = match self.walk.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    tracing::debug!("Error walking directory: {}", e);
                    continue;
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if let Some(candidate) = self.candidate(entry) {
                self.visited += 1;
                tracing::trace!(path = %candidate.relative.display(), "candidate");
                return Some(candidate);
            }
        }
    }
}

/// Fails unless `root` exists and is a directory.
pub(crate) fn validate_root(root: &Path) -> SearchResult<()> {
    if !root.exists() {
        return Err(SearchError::root_not_found(root));
    }
    if !root.is_dir() {
        return Err(SearchError::not_a_directory(root));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Instant;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn tree(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        dir
    }

    fn walk(dir: &TempDir, exclude: &[&str]) -> Vec<String> {
        let rules = ExclusionRules::new(exclude).unwrap();
        PathWalker::with_rules(dir.path(), rules, false, SearchToken::new())
            .unwrap()
            .map(|c| c.relative_str())
            .collect()
    }

    #[test]
    fn test_depth_first_sorted() {
        let dir = tree(&["b.txt", "a/z.txt", "a/b/c.txt", "c/d.txt", "A.txt"]);
        assert_eq!(
            walk(&dir, &[]),
            vec!["A.txt", "a/b/c.txt", "a/z.txt", "b.txt", "c/d.txt"]
        );
    }

    #[test]
    fn test_skips_hidden_entries() {
        let dir = tree(&[".env", ".hidden/secret.txt", "visible.txt", "src/.local"]);
        assert_eq!(walk(&dir, &[]), vec!["visible.txt"]);
    }

    #[test]
    fn test_skips_fixed_directories() {
        let dir = tree(&[
            "node_modules/pkg/index.js",
            "target/debug/app",
            "src/__pycache__/mod.pyc",
            "src/build/out.o",
            "src/lib.rs",
            "build.rs",
        ]);
        assert_eq!(walk(&dir, &[]), vec!["build.rs", "src/lib.rs"]);
    }

    #[test]
    fn test_exclusion_globs() {
        let dir = tree(&["data.bin", "deep/blob.bin", "keep.txt", "gen/out.txt"]);
        assert_eq!(walk(&dir, &["*.bin", "gen/*"]), vec!["keep.txt"]);
    }

    #[test]
    fn test_exclusion_is_case_sensitive() {
        let dir = tree(&["DATA.BIN", "data.bin"]);
        assert_eq!(walk(&dir, &["*.bin"]), vec!["DATA.BIN"]);
    }

    #[test]
    fn test_exclusion_matches_nested_directory() {
        let rules = ExclusionRules::new(&["logs/*"]).unwrap();
        assert!(rules.is_excluded(Path::new("app/logs"), true));
        assert!(rules.is_excluded(Path::new("app/logs/today.txt"), false));
        assert!(!rules.is_excluded(Path::new("app/logs"), false));
        assert!(!rules.is_excluded(Path::new("app/catalogs/x.txt"), false));
    }

    #[test]
    fn test_invalid_glob() {
        let err = ExclusionRules::new(&["[abc"]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidGlobPattern { .. }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_invalid_root() {
        let dir = tree(&["file.txt"]);
        let missing = dir.path().join("missing");
        let err = PathWalker::with_rules(&missing, ExclusionRules::empty(), false, SearchToken::new())
            .unwrap_err();
        assert!(matches!(err, SearchError::RootNotFound(_)));

        let file = dir.path().join("file.txt");
        let err = PathWalker::with_rules(&file, ExclusionRules::empty(), false, SearchToken::new())
            .unwrap_err();
        assert!(matches!(err, SearchError::NotADirectory(_)));
    }

    #[test]
    fn test_walk_is_lazy_and_cancellable() {
        let dir = tree(&["a.txt", "b.txt", "c.txt"]);
        let token = SearchToken::new();
        let mut walker =
            PathWalker::with_rules(dir.path(), ExclusionRules::empty(), false, token.clone())
                .unwrap();

        assert_eq!(walker.next().unwrap().file_name, "a.txt");
        assert_eq!(walker.visited(), 1);

        token.cancel();
        assert!(walker.next().is_none());
        assert!(walker.was_cancelled());
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_expired_deadline_yields_nothing() {
        let dir = tree(&["a.txt"]);
        let token = SearchToken::with_deadline(Instant::now());
        let mut walker =
            PathWalker::with_rules(dir.path(), ExclusionRules::empty(), false, token).unwrap();
        assert!(walker.next().is_none());
        assert!(walker.was_cancelled());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_does_not_stop_walk() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree(&["a_locked/inner.txt", "b_open.txt"]);
        let locked = dir.path().join("a_locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let readable = fs::read_dir(&locked).is_ok();
        let found = walk(&dir, &[]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if readable {
            // privileged users can list the directory regardless of its mode
            assert_eq!(found, vec!["a_locked/inner.txt", "b_open.txt"]);
        } else {
            assert_eq!(found, vec!["b_open.txt"]);
        }
    }

    #[test]
    fn test_gitignore_opt_in() {
        let dir = tree(&["ignored.log", "kept.txt"]);
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();

        let without: Vec<String> =
            PathWalker::with_rules(dir.path(), ExclusionRules::empty(), false, SearchToken::new())
                .unwrap()
                .map(|c| c.relative_str())
                .collect();
        assert_eq!(without, vec!["ignored.log", "kept.txt"]);

        let with: Vec<String> =
            PathWalker::with_rules(dir.path(), ExclusionRules::empty(), true, SearchToken::new())
                .unwrap()
                .map(|c| c.relative_str())
                .collect();
        assert_eq!(with, vec!["kept.txt"]);
    }
}
