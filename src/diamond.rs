//! DIAMOND integration
//!
//! Each trial writes the reference protein and the query DNA into a scratch
//! directory, builds a DIAMOND database from the reference and runs
//! `diamond blastx` asking only for the bitscore column. The scratch files
//! are shared by all trials, which is only sound because trials run one at a
//! time.

use anyhow::{anyhow, bail, Context, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use crate::oracle::{parse_bitscores, OracleOutcome, ScoringOracle};
use crate::sensitivity::ScorerConfig;
use crate::sequence_gen::TrialPair;

/// Default wall-clock limit for one `diamond blastx` call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Scores trial pairs by running the DIAMOND executable
pub struct DiamondOracle {
    binary: PathBuf,
    timeout: Duration,
    scratch: TempDir,
}

impl DiamondOracle {
    /// Create an oracle with its own process-scoped scratch directory
    pub fn new(binary: PathBuf, timeout: Duration) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("scoresweep_")
            .tempdir()
            .context("Failed to create scratch directory")?;
        log::debug!("DIAMOND scratch directory: {}", scratch.path().display());

        Ok(DiamondOracle {
            binary,
            timeout,
            scratch,
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Version string reported by `diamond --version` (last word of the output)
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .with_context(|| format!("Failed to run {} --version", self.binary.display()))?;
        let output = check_status(output, "diamond --version")?;
        String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .last()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("diamond --version printed nothing"))
    }

    fn subject_path(&self) -> PathBuf {
        self.scratch.path().join("subject.fasta")
    }

    fn query_path(&self) -> PathBuf {
        self.scratch.path().join("query.fasta")
    }

    fn db_path(&self) -> PathBuf {
        self.scratch.path().join("db")
    }

    /// Build a DIAMOND database from the reference protein
    fn make_db(&self, reference: &[u8]) -> Result<()> {
        let subject = self.subject_path();
        write_fasta(&subject, "subject", reference)?;

        let output = Command::new(&self.binary)
            .arg("makedb")
            .arg("--in")
            .arg(&subject)
            .arg("--db")
            .arg(self.db_path())
            .arg("--quiet")
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {} makedb", self.binary.display()))?;
        check_status(output, "diamond makedb")?;
        Ok(())
    }

    /// Run blastx for the query against the database, None on timeout
    fn blastx(&self, query_dna: &[u8], config: &ScorerConfig) -> Result<Option<String>> {
        let query = self.query_path();
        write_fasta(&query, "query", query_dna)?;

        let mut command = Command::new(&self.binary);
        command
            .arg("blastx")
            .args(config.blastx_args())
            .arg("--query")
            .arg(&query)
            .arg("--db")
            .arg(self.db_path())
            .args(["--outfmt", "6", "bitscore"]);

        run_with_timeout(command, self.timeout, "diamond blastx")
    }
}

impl ScoringOracle for DiamondOracle {
    fn score(&mut self, pair: &TrialPair, config: &ScorerConfig) -> Result<OracleOutcome> {
        self.make_db(&pair.reference)?;
        match self.blastx(&pair.query_dna, config)? {
            Some(stdout) => parse_bitscores(&stdout),
            None => Ok(OracleOutcome::TimedOut),
        }
    }
}

/// Write a single-record FASTA file
pub fn write_fasta(path: &Path, id: &str, sequence: &[u8]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writeln!(file, ">{id}")?;
    file.write_all(sequence)?;
    writeln!(file)?;
    file.flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn check_status(output: Output, what: &str) -> Result<Output> {
    if !output.status.success() {
        bail!(
            "{} failed (exit={:?}): {}",
            what,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output)
}

fn drain<R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Drain `reader` on its own thread, delivering the bytes over a channel
fn spawn_drain<R: Read + Send + 'static>(reader: R) -> Receiver<std::io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone once the caller gave up on this pipe
        let _ = tx.send(drain(reader));
    });
    rx
}

/// Wait for a drained pipe until `deadline`; None if it is still open then
fn collect(
    rx: &Receiver<std::io::Result<Vec<u8>>>,
    deadline: Instant,
    what: &str,
    pipe: &str,
) -> Result<Option<Vec<u8>>> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(bytes) => bytes
            .map(Some)
            .with_context(|| format!("Failed to read {what} {pipe}")),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => bail!("{what} {pipe} reader panicked"),
    }
}

/// Run `command`, killing it if it has not exited within `timeout`
///
/// Returns the captured stdout, or None if the limit was hit. The limit also
/// covers reading the output: a background process that inherited the pipes
/// and keeps them open past the deadline counts as a timeout. A non-zero
/// exit status is an error.
pub fn run_with_timeout(mut command: Command, timeout: Duration, what: &str) -> Result<Option<String>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {what}"))?;

    // Readers run on their own threads so a chatty child cannot block on a
    // full pipe while we poll for exit.
    let stdout = child.stdout.take().context("Child stdout not captured")?;
    let stderr = child.stderr.take().context("Child stderr not captured")?;
    let stdout_rx = spawn_drain(stdout);
    let stderr_rx = spawn_drain(stderr);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("Failed to wait for {what}"))?
        {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            // Readers are left to finish on their own: a grandchild may
            // still hold the pipes open.
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    };

    let Some(stdout) = collect(&stdout_rx, deadline, what, "stdout")? else {
        log::debug!("{what} exited but its stdout is still open, treating as timeout");
        return Ok(None);
    };
    let Some(stderr) = collect(&stderr_rx, deadline, what, "stderr")? else {
        log::debug!("{what} exited but its stderr is still open, treating as timeout");
        return Ok(None);
    };

    if !status.success() {
        bail!(
            "{} failed (exit={:?}): {}",
            what,
            status.code(),
            String::from_utf8_lossy(&stderr).trim()
        );
    }

    Ok(Some(String::from_utf8_lossy(&stdout).into_owned()))
}
