use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use subiecte_core::{ParsedExam, PdfBackend, ProgressEvent, UnitStatus, write_json};
use subiecte_parsing::{CorpusEra, FieldGrammar, field_grammar};

use crate::extract::Extractor;
use crate::pool::{ParsePool, UnitJob};
use crate::{FieldError, unit};

/// Tuning for a field run.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub num_workers: usize,
    pub era: CorpusEra,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            num_workers: 4,
            era: CorpusEra::Modern,
        }
    }
}

/// Everything a worker needs to process a unit of this field.
pub struct FieldContext {
    pub field: String,
    pub grammar: &'static FieldGrammar,
    pub extractor: Extractor,
}

/// Outcome counts for one completed field run.
#[derive(Debug)]
pub struct FieldSummary {
    pub field: String,
    pub loaded: usize,
    pub processed: usize,
    pub failed: usize,
    /// Consolidated output path; not written when the run was cancelled.
    pub output: PathBuf,
}

/// The consolidated shape: year -> version -> parsed exam (or `null` for a
/// failed unit). `BTreeMap` gives the sorted, deterministic key order the
/// output format requires.
type Aggregate = BTreeMap<String, BTreeMap<String, Option<ParsedExam>>>;

/// Run one field directory end to end.
///
/// The grammar lookup happens before any unit is touched: an unknown field
/// name is a configuration error for the whole run. Each discovered unit
/// then goes through the pool; unit failures are absorbed as `null` entries.
/// The consolidated `result.json` lands in the field directory unless the
/// run was cancelled midway, in which case only per-unit caches written so
/// far survive.
pub async fn process_field(
    field_path: &Path,
    primary: Arc<dyn PdfBackend>,
    ocr: Option<Arc<dyn PdfBackend>>,
    options: &BatchOptions,
    progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
    cancel: CancellationToken,
) -> Result<FieldSummary, FieldError> {
    let field = field_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let grammar = field_grammar(&field)?;

    let tree = unit::discover(field_path)?;
    tracing::info!(field, units = tree.units.len(), "starting field run");

    let mut aggregate: Aggregate = BTreeMap::new();
    for year in &tree.years {
        aggregate.insert(year.clone(), BTreeMap::new());
    }

    let ctx = Arc::new(FieldContext {
        field: field.clone(),
        grammar,
        extractor: Extractor::new(primary, ocr, options.era),
    });
    let pool = ParsePool::new(ctx, cancel.clone(), options.num_workers);

    let mut pending = Vec::with_capacity(tree.units.len());
    for unit in tree.units {
        let (result_tx, result_rx) = oneshot::channel();
        pool.submit(UnitJob {
            unit,
            result_tx,
            progress: progress.clone(),
        })
        .await;
        pending.push(result_rx);
    }
    pool.shutdown().await;

    let mut summary = FieldSummary {
        field: field.clone(),
        loaded: 0,
        processed: 0,
        failed: 0,
        output: field_path.join("result.json"),
    };
    for rx in pending {
        // A dropped sender means the unit was skipped after cancellation
        let Ok(outcome) = rx.await else { continue };
        match outcome.status {
            UnitStatus::Loaded => summary.loaded += 1,
            UnitStatus::Processed => summary.processed += 1,
            UnitStatus::Failed => summary.failed += 1,
        }
        aggregate
            .entry(outcome.year)
            .or_default()
            .insert(outcome.version, outcome.result);
    }

    if cancel.is_cancelled() {
        tracing::warn!(field, "cancelled, consolidated output not written");
        return Ok(summary);
    }

    write_json(&summary.output, &aggregate)?;
    tracing::info!(
        field,
        loaded = summary.loaded,
        processed = summary.processed,
        failed = summary.failed,
        "field run complete"
    );
    Ok(summary)
}
