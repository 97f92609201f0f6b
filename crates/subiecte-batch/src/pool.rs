//! Worker pool for version units.
//!
//! A fixed number of worker tasks drain a shared job queue. Extraction and
//! regex parsing are CPU-bound, so each unit runs inside `spawn_blocking`;
//! the async side only moves jobs and results around. Results return to the
//! orchestrator over per-job oneshot channels.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use subiecte_core::{ParsedExam, ProgressEvent, UnitStatus, load_json, write_json};
use subiecte_parsing::extract_subjects;

use crate::UnitError;
use crate::orchestrator::FieldContext;
use crate::unit::VersionUnit;

/// A version unit submitted to the pool.
pub struct UnitJob {
    pub unit: VersionUnit,
    pub result_tx: oneshot::Sender<UnitOutcome>,
    /// Progress callback, invoked once per unit with its terminal status.
    pub progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
}

/// Terminal outcome of one unit. `result` is `None` exactly when the unit
/// failed; the aggregate serializes that as `null`.
#[derive(Debug)]
pub struct UnitOutcome {
    pub year: String,
    pub version: String,
    pub status: UnitStatus,
    pub result: Option<ParsedExam>,
}

/// A pool of worker tasks that process version units.
///
/// Submit jobs via [`submit()`](ParsePool::submit), receive results via the
/// oneshot receiver paired with each job.
pub struct ParsePool {
    job_tx: async_channel::Sender<UnitJob>,
    pool_handle: JoinHandle<()>,
}

impl ParsePool {
    pub fn new(ctx: Arc<FieldContext>, cancel: CancellationToken, num_workers: usize) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<UnitJob>();

        let pool_handle = tokio::spawn(async move {
            let mut handles = Vec::with_capacity(num_workers.max(1));
            for _ in 0..num_workers.max(1) {
                handles.push(tokio::spawn(worker_loop(
                    job_rx.clone(),
                    ctx.clone(),
                    cancel.clone(),
                )));
            }
            drop(job_rx);

            // Workers exit when job_tx closes
            for h in handles {
                let _ = h.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    pub async fn submit(&self, job: UnitJob) {
        let _ = self.job_tx.send(job).await;
    }

    /// Close the queue and wait for every worker to finish.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

async fn worker_loop(
    job_rx: async_channel::Receiver<UnitJob>,
    ctx: Arc<FieldContext>,
    cancel: CancellationToken,
) {
    while let Ok(job) = job_rx.recv().await {
        let UnitJob {
            unit,
            result_tx,
            progress,
        } = job;

        // Skip remaining jobs after cancellation; dropping result_tx tells
        // the orchestrator this unit was never reached.
        if cancel.is_cancelled() {
            tracing::debug!(year = %unit.year, version = %unit.version, "skipping: cancelled");
            continue;
        }

        let year = unit.year.clone();
        let version = unit.version.clone();
        let worker_ctx = ctx.clone();

        let processed =
            tokio::task::spawn_blocking(move || process_version(&worker_ctx, &unit)).await;

        let (status, result) = match processed {
            Ok(Ok((status, exam))) => (status, Some(exam)),
            Ok(Err(err)) => {
                tracing::error!(
                    field = %ctx.field,
                    year = %year,
                    version = %version,
                    error = %err,
                    "unit failed"
                );
                (UnitStatus::Failed, None)
            }
            Err(join_err) => {
                tracing::error!(
                    field = %ctx.field,
                    year = %year,
                    version = %version,
                    error = %join_err,
                    "unit worker panicked"
                );
                (UnitStatus::Failed, None)
            }
        };

        progress(ProgressEvent::Unit {
            field: ctx.field.clone(),
            year: year.clone(),
            version: version.clone(),
            status,
        });

        let _ = result_tx.send(UnitOutcome {
            year,
            version,
            status,
            result,
        });
    }
}

/// Process one unit to completion: cache check, extraction, segmentation,
/// grammar parse, cache write.
fn process_version(
    ctx: &FieldContext,
    unit: &VersionUnit,
) -> Result<(UnitStatus, ParsedExam), UnitError> {
    let cache = unit.cache_path();
    if cache.exists() {
        let exam: ParsedExam = load_json(&cache)?;
        return Ok((UnitStatus::Loaded, exam));
    }

    let subiect_path = unit.subiect_path();
    let barem_path = unit.barem_path();
    if !subiect_path.exists() || !barem_path.exists() {
        return Err(UnitError::MissingInput(unit.path.clone()));
    }

    let era = ctx.extractor.era();
    let model = extract_subjects(&ctx.extractor.extract(&subiect_path)?, era)?;
    let rubric = extract_subjects(&ctx.extractor.extract(&barem_path)?, era)?;

    let exam = ctx.grammar.parse(&model, &rubric)?;
    write_json(&cache, &exam)?;
    Ok((UnitStatus::Processed, exam))
}
