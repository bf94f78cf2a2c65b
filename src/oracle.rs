//! Scoring oracle abstraction
//!
//! An oracle takes a reference/query pair and reports the best bitscore it
//! finds. The outcome distinguishes a real match, the absence of any match,
//! and an invocation that ran past its time limit and must be retried.

use anyhow::{bail, Context, Result};
use ordered_float::OrderedFloat;

use crate::sensitivity::ScorerConfig;
use crate::sequence_gen::TrialPair;

/// Result of one oracle invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OracleOutcome {
    /// Best bitscore among reported matches
    Matched(f64),
    /// The oracle ran and reported nothing
    Missed,
    /// The oracle did not finish in time; the trial is void
    TimedOut,
}

/// Something that can score a query against a reference
pub trait ScoringOracle {
    fn score(&mut self, pair: &TrialPair, config: &ScorerConfig) -> Result<OracleOutcome>;
}

/// Parse tabular output holding one bitscore per line, best first
///
/// Returns `Missed` for empty output. The first score must be at least as
/// large as every other one; anything else means the ordering the caller
/// relies on no longer holds and is reported as an error.
pub fn parse_bitscores(output: &str) -> Result<OracleOutcome> {
    let scores = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>()
                .with_context(|| format!("Invalid bitscore in oracle output: '{line}'"))
        })
        .collect::<Result<Vec<f64>>>()?;

    let Some(&best) = scores.first() else {
        return Ok(OracleOutcome::Missed);
    };

    if let Some(max) = scores.iter().copied().map(OrderedFloat).max() {
        if OrderedFloat(best) < max {
            bail!(
                "First bitscore {} is not the best of {} reported (max {})",
                best,
                scores.len(),
                max
            );
        }
    }

    if best < 0.0 || !best.is_finite() {
        bail!("Bitscore {best} is not a finite non-negative value");
    }

    Ok(OracleOutcome::Matched(best))
}
