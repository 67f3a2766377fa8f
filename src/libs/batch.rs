use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;

use crate::libs::best::select_best;
use crate::libs::blast::{run_blastp, BlastConfig};
use crate::libs::error::RbhError;
use crate::libs::filter::{filter_hits, Thresholds};
use crate::libs::hsp::{parse_hits, Hsp};
use crate::libs::proteome::load_proteome;
use crate::libs::rbh::{match_pairs, OrthologPair};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub thresholds: Thresholds,
    pub blast: BlastConfig,
    pub jobs: usize,
}

/// Per-file outcome: the sorted ortholog pairs, or the error that stopped
/// this file's pipeline.
pub type FileOutcome = Result<Vec<OrthologPair>, RbhError>;

fn check_readable(path: &str) -> Result<(), RbhError> {
    std::fs::File::open(path).map_err(|_| RbhError::MissingInput {
        path: path.to_string(),
    })?;
    Ok(())
}

/// One aligner invocation reduced to its per-query best hits.
fn best_of_direction(
    query_file: &str,
    database_file: &str,
    opts: &BatchOptions,
    cancel: &AtomicBool,
) -> Result<BTreeMap<String, Hsp>, RbhError> {
    let raw = run_blastp(query_file, database_file, &opts.blast, cancel)?;
    let hits = parse_hits(&raw)?;
    let kept = filter_hits(&hits, &opts.thresholds);
    Ok(select_best(&kept))
}

/// Runs the full pipeline for a single query file.
///
/// Forward searches the query file against the subject database; reverse
/// searches the subject proteome's own sequences against the query database.
/// The two directions have no data dependency and run concurrently; the
/// reciprocal match joins on both.
pub fn run_file(
    query_file: &str,
    subject_db: &str,
    query_db: &str,
    opts: &BatchOptions,
    cancel: &AtomicBool,
) -> FileOutcome {
    check_readable(query_file)?;
    check_readable(query_db)?;

    // The database path doubles as the subject proteome FASTA path; the
    // prepared index files sit alongside it.
    let subject_index = load_proteome(subject_db)?;

    let (forward, reverse) = rayon::join(
        || best_of_direction(query_file, subject_db, opts, cancel),
        || best_of_direction(subject_db, query_db, opts, cancel),
    );
    let forward = forward?;
    let reverse = reverse?;

    for hsp in forward.values() {
        if !subject_index.contains_key(&hsp.subject_id) {
            warn!(
                "{}: hit subject `{}` not present in {}",
                query_file, hsp.subject_id, subject_db
            );
        }
    }

    if cancel.load(Ordering::Relaxed) {
        return Err(RbhError::ExternalTool {
            tool: opts.blast.program.clone(),
            reason: "cancelled".to_string(),
        });
    }

    Ok(match_pairs(&forward, &reverse))
}

/// Fans the per-file pipelines out over a bounded worker pool and collects
/// an outcome for every requested file, in input order. One file's failure
/// never cancels its siblings.
pub fn run_batch(
    query_files: &[String],
    subject_db: &str,
    query_db: &str,
    opts: &BatchOptions,
    cancel: Arc<AtomicBool>,
) -> Vec<(String, FileOutcome)> {
    let jobs = if opts.jobs == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        opts.jobs
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .expect("failed to build thread pool");

    pool.install(|| {
        query_files
            .par_iter()
            .map(|query_file| {
                let outcome = run_file(query_file, subject_db, query_db, opts, &cancel);
                match &outcome {
                    Ok(pairs) => info!("{}: {} ortholog pairs", query_file, pairs.len()),
                    Err(e) => warn!("{}: {}", query_file, e),
                }
                (query_file.clone(), outcome)
            })
            .collect()
    })
}
