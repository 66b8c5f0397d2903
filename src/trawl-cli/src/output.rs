//! Result printing.

use std::io::Write;

use anyhow::Result;
use trawl_search::{MatchResult, SearchKind, SearchOutcome, SearchStatus};

/// Exit code for a search that ran to completion.
pub const EXIT_OK: u8 = 0;

/// Exit code for invalid input or an internal failure.
pub const EXIT_ERROR: u8 = 1;

/// Exit code for a search cut short by its deadline.
pub const EXIT_CANCELLED: u8 = 2;

/// Maps a search status to the process exit code.
pub fn exit_code(status: SearchStatus) -> u8 {
    match status {
        SearchStatus::Completed => EXIT_OK,
        SearchStatus::Cancelled => EXIT_CANCELLED,
    }
}

/// Formats one result as a plain text line.
pub fn format_result(result: &MatchResult, kind: SearchKind) -> String {
    match kind {
        SearchKind::Content => format!(
            "{}:{}: {}",
            result.path.display(),
            result.line,
            result.content
        ),
        SearchKind::Files => format!("{} {}", result.score, result.path.display()),
    }
}

/// Writes every result of `outcome` to `out`, one per line.
pub fn write_results<W: Write>(
    mut out: W,
    outcome: &SearchOutcome,
    kind: SearchKind,
    json: bool,
) -> Result<()> {
    for result in &outcome.results {
        if json {
            serde_json::to_writer(&mut out, result)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", format_result(result, kind))?;
        }
    }
    out.flush()?;
    Ok(())
}
