//! Query matching and scoring using nucleo-matcher and regex.
//!
//! Literal queries are compiled into an escaped regex so hits come back as
//! byte spans. Fuzzy queries let nucleo find the match positions; the 0-100
//! score is computed here from those positions so that thresholds mean the
//! same thing for file names and for lines of content.
//!
//! Fuzzy scoring starts at 100 and applies:
//! - `-6` for every gap between matched characters, plus `-2` for each
//!   skipped character after the first in that gap
//! - `-30 * unmatched / len` for characters of the candidate left unmatched
//! - `+4` for every run of matched characters that starts on a boundary
//!   (start of text, after a separator, a camelCase hump, or a letter/digit
//!   transition)
//!
//! A match covering the whole candidate scores 100; every other match is
//! clamped into `1..=99`.

use std::ops::Range;

use nucleo_matcher::{
    Config, Matcher, Utf32Str,
    pattern::{Atom, AtomKind, CaseMatching, Normalization},
};
use regex::{Regex, RegexBuilder};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::SearchOptions;
use crate::error::{SearchError, SearchResult};
use crate::result::MAX_SCORE;

const GAP_START_PENALTY: i64 = 6;
const GAP_EXTENSION_PENALTY: i64 = 2;
const UNMATCHED_PENALTY: i64 = 30;
const BOUNDARY_BONUS: i64 = 4;

/// A successful match of the query against one candidate string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    /// Match quality from 0 to 100.
    pub score: u8,

    /// Byte range in the candidate from the first to the last matched character.
    pub span: Range<usize>,
}

/// Reusable per-thread matching state.
#[derive(Debug)]
pub struct MatchScratch {
    engine: Matcher,
    chars: Vec<char>,
    indices: Vec<u32>,
}

impl Default for MatchScratch {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchScratch {
    /// Creates fresh scratch state.
    pub fn new() -> Self {
        Self {
            engine: Matcher::new(Config::DEFAULT),
            chars: Vec::new(),
            indices: Vec::new(),
        }
    }
}

/// Exact substring matching. Every hit scores 100.
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    regex: Regex,
}

impl LiteralMatcher {
    /// Creates a literal matcher for `query`.
    ///
    /// Case-insensitive matching uses Unicode simple case folding.
    pub fn new(query: &str, case_sensitive: bool) -> SearchResult<Self> {
        let regex = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| SearchError::invalid_option("query", e.to_string()))?;
        Ok(Self { regex })
    }

    /// Scores `candidate`; `None` when the query does not occur in it.
    pub fn score(&self, candidate: &str) -> Option<Scored> {
        let hit = self.regex.find(candidate)?;
        Some(Scored {
            score: MAX_SCORE,
            span: hit.range(),
        })
    }
}

/// Ordered subsequence matching scored on a 0-100 scale.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    atom: Atom,
    threshold: u8,
}

impl FuzzyMatcher {
    /// Creates a fuzzy matcher for `query` that drops scores below `threshold`.
    pub fn new(query: &str, case_sensitive: bool, threshold: u8) -> Self {
        Self {
            atom: Atom::new(
                query,
                case_matching(case_sensitive),
                Normalization::Smart,
                AtomKind::Fuzzy,
                false,
            ),
            threshold,
        }
    }

    /// Scores `candidate`; `None` when the query is not a subsequence of it
    /// or the score falls below the threshold.
    pub fn score(&self, candidate: &str, scratch: &mut MatchScratch) -> Option<Scored> {
        match_positions(&self.atom, candidate, scratch)?;
        let units = text_units(candidate);
        let score = fuzzy_score(&units, &scratch.indices);
        if score < self.threshold {
            return None;
        }
        let span = matched_span(candidate, &scratch.indices)?;
        Some(Scored { score, span })
    }
}

/// Matching strategy selected per invocation.
#[derive(Debug, Clone)]
pub enum QueryMatcher {
    /// Substring search.
    Literal(LiteralMatcher),
    /// Subsequence search with scoring.
    Fuzzy(FuzzyMatcher),
}

impl QueryMatcher {
    /// Builds the strategy requested by `options`.
    pub fn from_options(options: &SearchOptions) -> SearchResult<Self> {
        if options.use_fuzzy {
            Ok(Self::Fuzzy(FuzzyMatcher::new(
                &options.query,
                options.case_sensitive,
                options.fuzzy_threshold,
            )))
        } else {
            LiteralMatcher::new(&options.query, options.case_sensitive).map(Self::Literal)
        }
    }

    /// Scores one candidate string against the query.
    pub fn score(&self, candidate: &str, scratch: &mut MatchScratch) -> Option<Scored> {
        if candidate.is_empty() {
            return None;
        }
        match self {
            Self::Literal(m) => m.score(candidate),
            Self::Fuzzy(m) => m.score(candidate, scratch),
        }
    }
}

fn case_matching(case_sensitive: bool) -> CaseMatching {
    if case_sensitive {
        CaseMatching::Respect
    } else {
        CaseMatching::Ignore
    }
}

/// Runs `atom` over `candidate`, leaving sorted match positions in `scratch.indices`.
fn match_positions(atom: &Atom, candidate: &str, scratch: &mut MatchScratch) -> Option<()> {
    let MatchScratch {
        engine,
        chars,
        indices,
    } = scratch;
    indices.clear();

    let haystack = Utf32Str::new(candidate, chars);
    atom.indices(haystack, engine, indices)?;

    indices.sort_unstable();
    indices.dedup();
    if indices.is_empty() {
        return None;
    }
    Some(())
}

/// Splits `text` into the units nucleo indexes: bytes for ASCII, graphemes otherwise.
fn text_units(text: &str) -> Vec<char> {
    if text.is_ascii() {
        text.bytes().map(char::from).collect()
    } else {
        text.graphemes(true)
            .map(|g| g.chars().next().unwrap_or(' '))
            .collect()
    }
}

/// Converts unit positions into the byte range they span in `text`.
fn matched_span(text: &str, indices: &[u32]) -> Option<Range<usize>> {
    let first = *indices.first()? as usize;
    let last = *indices.last()? as usize;

    if text.is_ascii() {
        let end = (last + 1).min(text.len());
        return Some(first.min(end)..end);
    }

    let mut start = None;
    for (i, (offset, grapheme)) in text.grapheme_indices(true).enumerate() {
        if i == first {
            start = Some(offset);
        }
        if i == last {
            return Some(start.unwrap_or(offset)..offset + grapheme.len());
        }
    }
    None
}

/// Scores matched positions `indices` within `units` on a 0-100 scale.
pub fn fuzzy_score(units: &[char], indices: &[u32]) -> u8 {
    let len = units.len();
    let matched = indices.len();
    if len == 0 || matched == 0 {
        return 0;
    }
    if matched >= len {
        return MAX_SCORE;
    }

    let mut score: i64 = i64::from(MAX_SCORE);
    let mut prev: Option<usize> = None;

    for &idx in indices {
        let idx = idx as usize;
        match prev {
            Some(p) if idx == p + 1 => {}
            Some(p) => {
                let gap = idx.saturating_sub(p + 1) as i64;
                score -= GAP_START_PENALTY + GAP_EXTENSION_PENALTY * (gap - 1).max(0);
                if is_boundary(units, idx) {
                    score += BOUNDARY_BONUS;
                }
            }
            None => {
                if is_boundary(units, idx) {
                    score += BOUNDARY_BONUS;
                }
            }
        }
        prev = Some(idx);
    }

    let unmatched = (len - matched) as i64;
    score -= UNMATCHED_PENALTY * unmatched / len as i64;

    score.clamp(1, i64::from(MAX_SCORE) - 1) as u8
}

/// Returns true if position `idx` starts a word or path segment.
fn is_boundary(units: &[char], idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    let (Some(&prev), Some(&cur)) = (units.get(idx - 1), units.get(idx)) else {
        return false;
    };

    !prev.is_alphanumeric()
        || (prev.is_lowercase() && cur.is_uppercase())
        || (prev.is_alphabetic() && cur.is_numeric())
        || (prev.is_numeric() && cur.is_alphabetic())
}

/// Cuts `line` to at most `max_chars` characters, keeping `span` in view.
///
/// The window is centred on the span. When the span alone is longer than
/// the window, the window starts at the span so the beginning of the match
/// stays visible.
pub fn snippet(line: &str, span: Range<usize>, max_chars: usize) -> String {
    let total = line.chars().count();
    if total <= max_chars {
        return line.to_string();
    }

    let start = span.start.min(line.len());
    let end = span.end.clamp(start, line.len());
    let span_start = line.get(..start).map_or(0, |s| s.chars().count());
    let span_len = line.get(start..end).map_or(0, |s| s.chars().count());

    let window_start = if span_len >= max_chars {
        span_start
    } else {
        let slack = max_chars - span_len;
        span_start
            .saturating_sub(slack / 2)
            .min(total - max_chars)
    };

    line.chars().skip(window_start).take(max_chars).collect()
}
