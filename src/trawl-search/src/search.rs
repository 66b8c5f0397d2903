//! Search coordination: one walker feeding a scoped worker pool.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use flume::Receiver;
use parking_lot::Mutex;

use crate::binary;
use crate::config::{DEFAULT_TIMEOUT, SearchOptions};
use crate::error::{SearchError, SearchResult};
use crate::matcher::{MatchScratch, QueryMatcher, snippet};
use crate::ranker::TopK;
use crate::result::{MatchResult, SearchKind, SearchOutcome, SearchStats, SearchStatus};
use crate::token::SearchToken;
use crate::walker::{Candidate, ExclusionRules, PathWalker, validate_root};

/// Runs one search invocation.
///
/// All inputs are validated by [`SearchCoordinator::new`], so a coordinator
/// that was built successfully only fails at run time on internal faults.
///
/// # Example
///
/// ```no_run
/// use trawl_search::{SearchCoordinator, SearchKind, SearchOptions, SearchToken};
///
/// fn main() -> anyhow::Result<()> {
///     let options = SearchOptions::new("main", "/path/to/project");
///     let outcome = SearchCoordinator::new(options, SearchKind::Files)?
///         .run(&SearchToken::new())?;
///     for result in &outcome.results {
///         println!("{} {}", result.score, result.path.display());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SearchCoordinator {
    options: SearchOptions,
    kind: SearchKind,
    matcher: QueryMatcher,
    rules: ExclusionRules,
}

#[derive(Debug, Default)]
struct WorkerReport {
    files_searched: usize,
    files_matched: usize,
    interrupted: bool,
}

impl SearchCoordinator {
    /// Validates `options` and prepares a search of the given kind.
    pub fn new(options: SearchOptions, kind: SearchKind) -> SearchResult<Self> {
        options.validate()?;
        validate_root(&options.root)?;
        let rules = ExclusionRules::new(&options.exclude)?;
        let matcher = QueryMatcher::from_options(&options)?;

        Ok(Self {
            options,
            kind,
            matcher,
            rules,
        })
    }

    /// Walks the root, matches every candidate, and returns the ranked results.
    ///
    /// Cancellation is not an error: the outcome carries the results ranked
    /// so far with [`SearchStatus::Cancelled`].
    pub fn run(self, token: &SearchToken) -> SearchResult<SearchOutcome> {
        let started = Instant::now();
        let span = tracing::debug_span!(
            "search",
            kind = ?self.kind,
            query = %self.options.query,
            root = %self.options.root.display(),
        );
        let _enter = span.enter();

        let workers = self.options.worker_count();
        let ranker = Mutex::new(TopK::new(self.options.max_results));
        let mut walker = PathWalker::with_rules(
            &self.options.root,
            self.rules.clone(),
            self.options.respect_gitignore,
            token.clone(),
        )?;

        let (saturated, reports) = thread::scope(|scope| -> SearchResult<_> {
            let (tx, rx) = flume::bounded::<Candidate>(workers * 4);

            let mut handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let rx = rx.clone();
                let ranker = &ranker;
                let this = &self;
                let handle = thread::Builder::new()
                    .name(format!("trawl-worker-{id}"))
                    .spawn_scoped(scope, move || this.work(rx, ranker, token))
                    .map_err(|e| SearchError::internal(format!("failed to spawn worker: {e}")))?;
                handles.push(handle);
            }
            drop(rx);

            let mut saturated = false;
            for candidate in walker.by_ref() {
                if ranker.lock().is_saturated() {
                    saturated = true;
                    break;
                }
                if tx.send(candidate).is_err() {
                    break;
                }
            }
            drop(tx);

            let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
            let reports = joined
                .into_iter()
                .map(|r| r.map_err(|_| SearchError::internal("search worker panicked")))
                .collect::<SearchResult<Vec<_>>>()?;
            Ok((saturated, reports))
        })?;

        let interrupted = reports.iter().any(|r| r.interrupted);
        let status = if walker.was_cancelled() || interrupted {
            SearchStatus::Cancelled
        } else {
            SearchStatus::Completed
        };

        let stats = SearchStats {
            files_visited: walker.visited(),
            files_searched: reports.iter().map(|r| r.files_searched).sum(),
            files_matched: reports.iter().map(|r| r.files_matched).sum(),
            elapsed: started.elapsed(),
        };
        let results = ranker.into_inner().into_sorted_vec();

        tracing::debug!(
            results = results.len(),
            visited = stats.files_visited,
            matched = stats.files_matched,
            saturated,
            ?status,
            "search finished in {:?}",
            stats.elapsed
        );

        Ok(SearchOutcome {
            results,
            status,
            stats,
        })
    }

    fn work(
        &self,
        rx: Receiver<Candidate>,
        ranker: &Mutex<TopK>,
        token: &SearchToken,
    ) -> WorkerReport {
        let mut scratch = MatchScratch::new();
        let mut report = WorkerReport::default();

        for candidate in rx.iter() {
            if token.is_cancelled() {
                report.interrupted = true;
                break;
            }

            let matched = match self.kind {
                SearchKind::Files => match self.match_file(&candidate, &mut scratch) {
                    Some(result) => {
                        ranker.lock().push(result);
                        true
                    }
                    None => false,
                },
                SearchKind::Content => self.match_content(&candidate, &mut scratch, ranker),
            };

            report.files_searched += 1;
            if matched {
                report.files_matched += 1;
            }
        }

        report
    }

    fn match_file(&self, candidate: &Candidate, scratch: &mut MatchScratch) -> Option<MatchResult> {
        let mut best = self
            .matcher
            .score(&candidate.file_name, scratch)
            .map(|s| s.score);

        if self.options.match_full_path {
            if let Some(scored) = self.matcher.score(&candidate.relative_str(), scratch) {
                best = Some(best.map_or(scored.score, |b| b.max(scored.score)));
            }
        }

        best.map(|score| MatchResult::file(candidate.relative.clone(), score))
    }

    fn match_content(
        &self,
        candidate: &Candidate,
        scratch: &mut MatchScratch,
        ranker: &Mutex<TopK>,
    ) -> bool {
        match self.scan_file(candidate, scratch) {
            Ok(local) if local.is_empty() => false,
            Ok(local) => {
                ranker.lock().extend(local.into_sorted_vec());
                true
            }
            Err(e) => {
                tracing::debug!("Skipping {}: {}", candidate.relative.display(), e);
                false
            }
        }
    }

    /// Matches every line of one file, keeping at most `max_results` of them.
    fn scan_file(&self, candidate: &Candidate, scratch: &mut MatchScratch) -> SearchResult<TopK> {
        let path = &candidate.path;
        let mut local = TopK::new(self.options.max_results);

        let file = File::open(path).map_err(|e| SearchError::read_file(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| SearchError::read_file(path, e))?
            .len();
        if size > self.options.max_file_size {
            tracing::debug!("Skipping {}: {} bytes is over the size limit", path.display(), size);
            return Ok(local);
        }

        let mut reader = BufReader::new(file);
        let sample = binary::read_sample(&mut reader).map_err(|e| SearchError::read_file(path, e))?;
        if binary::is_binary(&sample) {
            tracing::trace!(path = %candidate.relative.display(), "binary file skipped");
            return Ok(local);
        }
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| SearchError::read_file(path, e))?;

        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| SearchError::read_file(path, e))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf);

            if let Some(scored) = self.matcher.score(&line, scratch) {
                let matched = line.get(scored.span.clone()).unwrap_or_default().to_string();
                let content = snippet(&line, scored.span, self.options.max_line_length);
                local.push(MatchResult::content(
                    candidate.relative.clone(),
                    line_no,
                    content,
                    matched,
                    scored.score,
                ));
            }
        }

        Ok(local)
    }
}

/// Searches file contents line by line.
pub fn search(options: &SearchOptions, token: &SearchToken) -> SearchResult<SearchOutcome> {
    SearchCoordinator::new(options.clone(), SearchKind::Content)?.run(token)
}

/// Searches file names.
pub fn search_files(options: &SearchOptions, token: &SearchToken) -> SearchResult<SearchOutcome> {
    SearchCoordinator::new(options.clone(), SearchKind::Files)?.run(token)
}

/// Searches file names under `root` with default options and the default
/// deadline, returning matched paths best first.
pub fn search_files_in(query: &str, root: impl AsRef<Path>) -> SearchResult<Vec<PathBuf>> {
    let options = SearchOptions::new(query, root.as_ref());
    let token = SearchToken::with_timeout(DEFAULT_TIMEOUT);
    let outcome = search_files(&options, &token)?;
    Ok(outcome.results.into_iter().map(|r| r.path).collect())
}

/// Runs [`search`] on the tokio blocking pool.
pub async fn search_async(
    options: SearchOptions,
    token: SearchToken,
) -> SearchResult<SearchOutcome> {
    tokio::task::spawn_blocking(move || search(&options, &token))
        .await
        .map_err(|e| SearchError::internal(format!("search task failed: {e}")))?
}

/// Runs [`search_files`] on the tokio blocking pool.
pub async fn search_files_async(
    options: SearchOptions,
    token: SearchToken,
) -> SearchResult<SearchOutcome> {
    tokio::task::spawn_blocking(move || search_files(&options, &token))
        .await
        .map_err(|e| SearchError::internal(format!("search task failed: {e}")))?
}
