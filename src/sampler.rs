//! Mismatch sweep for one scorer configuration
//!
//! For every mismatch level `0, step, 2*step, ...` below the sequence length
//! the sampler collects a fixed number of successful trials. Trials whose
//! oracle call timed out are thrown away and regenerated from scratch, so
//! they never count toward a level.
//!
//! Misses have no score. They are plotted below zero, each further miss at
//! the same level one `ZERO_SCALE` step lower than the last, so that stacked
//! misses stay visible instead of overlapping.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use rand::Rng;
use std::time::{Duration, Instant};

use crate::oracle::{OracleOutcome, ScoringOracle};
use crate::sensitivity::ScorerConfig;
use crate::sequence_gen::generate_trial;

/// Vertical spacing between stacked misses on the plot
pub const ZERO_SCALE: f64 = 2.0;

/// Parameters shared by every sweep of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepParams {
    /// Residues per sequence
    pub length: usize,
    /// Mismatches added at each level
    pub error_increment: usize,
    /// Successful trials per level
    pub iterations: usize,
}

impl SweepParams {
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            bail!("Sequence length must be at least 1");
        }
        if self.error_increment == 0 {
            bail!("Error increment must be at least 1");
        }
        if self.iterations == 0 {
            bail!("Iterations must be at least 1");
        }
        Ok(())
    }

    /// Mismatch counts visited by a sweep, in order
    pub fn levels(&self) -> impl Iterator<Item = usize> {
        (0..self.length).step_by(self.error_increment.max(1))
    }
}

/// One successful trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialOutcome {
    pub mismatches: usize,
    /// Bitscore for a match, or the stacked negative position of a miss
    pub plotted: f64,
    pub matched: bool,
}

/// Running match/miss counts at one mismatch level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub matches: usize,
    pub misses: usize,
}

/// Everything collected by one sweep
#[derive(Debug, Clone)]
pub struct SampleSet {
    pub params: SweepParams,
    pub outcomes: Vec<TrialOutcome>,
    /// Per-level counts, in sweep order
    pub counts: IndexMap<usize, LevelCounts>,
    /// Trials discarded because the oracle timed out
    pub timeouts: usize,
    pub elapsed: Duration,
}

impl SampleSet {
    /// Fraction of trials at `level` that found a match
    pub fn match_rate(&self, level: usize) -> f64 {
        let matches = self.counts.get(&level).map_or(0, |c| c.matches);
        matches as f64 / self.params.iterations as f64
    }

    /// (level, match rate) for every level of the sweep
    pub fn match_rates(&self) -> Vec<(usize, f64)> {
        self.counts
            .keys()
            .map(|&level| (level, self.match_rate(level)))
            .collect()
    }

    pub fn total_matches(&self) -> usize {
        self.counts.values().map(|c| c.matches).sum()
    }

    pub fn total_misses(&self) -> usize {
        self.counts.values().map(|c| c.misses).sum()
    }
}

/// Runs sweeps against an oracle with a given random source
pub struct Sampler<O, R> {
    oracle: O,
    rng: R,
}

impl<O: ScoringOracle, R: Rng> Sampler<O, R> {
    pub fn new(oracle: O, rng: R) -> Self {
        Sampler { oracle, rng }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Sweep all mismatch levels for one scorer configuration
    pub fn sweep(&mut self, params: &SweepParams, config: &ScorerConfig) -> Result<SampleSet> {
        params.validate()?;

        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(params.levels().count() * params.iterations);
        let mut counts: IndexMap<usize, LevelCounts> = IndexMap::new();
        let mut timeouts = 0;

        for level in params.levels() {
            log::debug!("[{}] Making {} errors", config.label(), level);
            let level_counts = counts.entry(level).or_default();

            let mut iteration = 0;
            while iteration < params.iterations {
                log::debug!("  Iteration {}/{}", iteration + 1, params.iterations);

                let pair = generate_trial(&mut self.rng, params.length, level)?;
                let outcome = self.oracle.score(&pair, config)?;

                log::debug!("SBJCT: {}", String::from_utf8_lossy(&pair.reference));
                log::debug!("QUERY: {}", String::from_utf8_lossy(&pair.query));
                log::debug!("SCORE: {:?}", outcome);
                log::debug!("ERROR: {}", level);

                let trial = match outcome {
                    OracleOutcome::TimedOut => {
                        log::warn!(
                            "[{}] Oracle timeout at {} mismatches, repeating trial",
                            config.label(),
                            level
                        );
                        timeouts += 1;
                        continue;
                    }
                    OracleOutcome::Matched(score) if score > 0.0 => {
                        level_counts.matches += 1;
                        TrialOutcome {
                            mismatches: level,
                            plotted: score,
                            matched: true,
                        }
                    }
                    OracleOutcome::Matched(_) | OracleOutcome::Missed => {
                        level_counts.misses += 1;
                        TrialOutcome {
                            mismatches: level,
                            plotted: -(level_counts.misses as f64) * ZERO_SCALE,
                            matched: false,
                        }
                    }
                };

                outcomes.push(trial);
                iteration += 1;
            }
        }

        Ok(SampleSet {
            params: *params,
            outcomes,
            counts,
            timeouts,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitivity::Sensitivity;
    use crate::sequence_gen::TrialPair;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Matches while the query has fewer than `cutoff` mismatches
    struct CutoffOracle {
        cutoff: usize,
        calls: usize,
    }

    impl ScoringOracle for CutoffOracle {
        fn score(&mut self, pair: &TrialPair, _config: &ScorerConfig) -> Result<OracleOutcome> {
            self.calls += 1;
            if pair.mismatches < self.cutoff {
                Ok(OracleOutcome::Matched(100.0 - pair.mismatches as f64))
            } else {
                Ok(OracleOutcome::Missed)
            }
        }
    }

    fn config() -> ScorerConfig {
        ScorerConfig::new(Sensitivity::Default, Vec::new())
    }

    #[test]
    fn test_levels() {
        let params = SweepParams {
            length: 10,
            error_increment: 3,
            iterations: 1,
        };
        assert_eq!(params.levels().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let bad = SweepParams {
            length: 10,
            error_increment: 0,
            iterations: 1,
        };
        assert!(bad.validate().is_err());
        let oracle = CutoffOracle { cutoff: 1, calls: 0 };
        let mut sampler = Sampler::new(oracle, StdRng::seed_from_u64(0));
        assert!(sampler.sweep(&bad, &config()).is_err());
    }

    #[test]
    fn test_misses_stack_downwards() {
        let params = SweepParams {
            length: 4,
            error_increment: 2,
            iterations: 5,
        };
        let oracle = CutoffOracle { cutoff: 1, calls: 0 };
        let mut sampler = Sampler::new(oracle, StdRng::seed_from_u64(11));
        let samples = sampler.sweep(&params, &config()).unwrap();

        let level_two: Vec<f64> = samples
            .outcomes
            .iter()
            .filter(|o| o.mismatches == 2)
            .map(|o| o.plotted)
            .collect();
        assert_eq!(level_two, vec![-2.0, -4.0, -6.0, -8.0, -10.0]);

        assert!(samples
            .outcomes
            .iter()
            .filter(|o| o.mismatches == 0)
            .all(|o| o.matched && o.plotted == 100.0));
        assert_eq!(samples.match_rates(), vec![(0, 1.0), (2, 0.0)]);
        assert_eq!(sampler.oracle().calls, 10);
    }

    #[test]
    fn test_zero_score_counts_as_miss() {
        struct ZeroOracle;
        impl ScoringOracle for ZeroOracle {
            fn score(&mut self, _: &TrialPair, _: &ScorerConfig) -> Result<OracleOutcome> {
                Ok(OracleOutcome::Matched(0.0))
            }
        }
        let params = SweepParams {
            length: 1,
            error_increment: 1,
            iterations: 2,
        };
        let mut sampler = Sampler::new(ZeroOracle, StdRng::seed_from_u64(1));
        let samples = sampler.sweep(&params, &config()).unwrap();
        assert_eq!(samples.total_misses(), 2);
        assert_eq!(samples.total_matches(), 0);
        assert_eq!(samples.counts[&0], LevelCounts { matches: 0, misses: 2 });
    }
}
