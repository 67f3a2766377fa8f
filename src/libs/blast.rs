use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::debug;

use crate::libs::error::RbhError;

/// Requested tabular fields, in the order the parser expects them.
pub const OUTFMT: &str = "10 qseqid sseqid pident evalue qcovhsp bitscore";

/// How the external aligner is invoked.
///
/// `program` is resolved on PATH (or given as an absolute path), which also
/// lets tests substitute a stub engine.
#[derive(Debug, Clone)]
pub struct BlastConfig {
    pub program: String,
    pub evalue: f64,
    pub num_threads: usize,
    pub timeout: Option<Duration>,
}

impl Default for BlastConfig {
    fn default() -> Self {
        Self {
            program: "blastp".to_string(),
            evalue: 1e-25,
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timeout: None,
        }
    }
}

fn capture_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_string(&mut text).ok();
        }
        text
    })
}

/// Runs the aligner on `query_file` against `database_file` and returns its
/// raw tabular stdout. No parsing or filtering happens here.
///
/// The child is polled so a configured timeout, or a raised `cancel` flag,
/// terminates it instead of blocking forever. A non-zero exit, a missing
/// binary, or an unreadable input all surface as [`RbhError::ExternalTool`].
pub fn run_blastp(
    query_file: &str,
    database_file: &str,
    cfg: &BlastConfig,
    cancel: &AtomicBool,
) -> Result<String, RbhError> {
    let program = which::which(&cfg.program).map_err(|_| RbhError::ExternalTool {
        tool: cfg.program.clone(),
        reason: "not found in PATH".to_string(),
    })?;

    debug!(
        "{} -db {} -query {} -evalue {:e} -num_threads {}",
        cfg.program, database_file, query_file, cfg.evalue, cfg.num_threads
    );

    let mut child = Command::new(&program)
        .arg("-db")
        .arg(database_file)
        .arg("-query")
        .arg(query_file)
        .arg("-evalue")
        .arg(format!("{:e}", cfg.evalue))
        .arg("-num_threads")
        .arg(cfg.num_threads.to_string())
        .arg("-outfmt")
        .arg(OUTFMT)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RbhError::ExternalTool {
            tool: cfg.program.clone(),
            reason: format!("failed to spawn: {}", e),
        })?;

    // Drain both pipes off-thread so a chatty child can't deadlock the poll
    // loop below.
    let stdout_handle = capture_pipe(child.stdout.take());
    let stderr_handle = capture_pipe(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }

        if cancel.load(Ordering::Relaxed) {
            child.kill().ok();
            child.wait().ok();
            return Err(RbhError::ExternalTool {
                tool: cfg.program.clone(),
                reason: "cancelled".to_string(),
            });
        }

        if let Some(timeout) = cfg.timeout {
            if started.elapsed() > timeout {
                child.kill().ok();
                child.wait().ok();
                return Err(RbhError::Timeout {
                    tool: cfg.program.clone(),
                    seconds: timeout.as_secs(),
                });
            }
        }

        std::thread::sleep(Duration::from_millis(20));
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    if !status.success() {
        return Err(RbhError::ExternalTool {
            tool: cfg.program.clone(),
            reason: format!("{}: {}", status, stderr.trim()),
        });
    }

    Ok(stdout)
}
