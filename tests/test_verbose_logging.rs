/// Per-trial detail must be visible at the level `--verbose` enables
///
/// Lives in its own test binary because it installs a process-wide logger.
use anyhow::Result;
use log::{Level, LevelFilter, Log, Metadata, Record};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scoresweep::oracle::{OracleOutcome, ScoringOracle};
use scoresweep::sampler::{Sampler, SweepParams};
use scoresweep::sensitivity::{ScorerConfig, Sensitivity};
use scoresweep::sequence_gen::TrialPair;
use std::sync::Mutex;

/// Keeps every record at or above Debug
struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

struct HalfOracle {
    calls: usize,
}

impl ScoringOracle for HalfOracle {
    fn score(&mut self, _pair: &TrialPair, _config: &ScorerConfig) -> Result<OracleOutcome> {
        self.calls += 1;
        if self.calls % 2 == 0 {
            Ok(OracleOutcome::Missed)
        } else {
            Ok(OracleOutcome::Matched(12.0))
        }
    }
}

#[test]
fn test_trial_detail_logged_at_debug() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Debug);

    let params = SweepParams {
        length: 8,
        error_increment: 4,
        iterations: 2,
    };
    let config = ScorerConfig::new(Sensitivity::Sensitive, Vec::new());
    let mut sampler = Sampler::new(HalfOracle { calls: 0 }, StdRng::seed_from_u64(3));
    sampler.sweep(&params, &config).unwrap();

    let records = LOGGER.records.lock().unwrap();
    for prefix in ["SBJCT: ", "QUERY: ", "SCORE: ", "ERROR: ", "  Iteration "] {
        let count = records
            .iter()
            .filter(|(level, msg)| *level == Level::Debug && msg.starts_with(prefix))
            .count();
        // 2 levels x 2 iterations
        assert_eq!(count, 4, "{prefix:?} lines at debug");
    }
    assert!(records
        .iter()
        .any(|(_, msg)| msg == "[sensitive] Making 4 errors"));
}
