//! Corpus batch pipeline.
//!
//! A field directory (`data/logica`, `data/istorie`, ...) holds year
//! directories, each holding version unit directories with a `subiect.pdf`
//! and a `barem.pdf`. A worker pool extracts and parses every unit, caches
//! each result next to its PDFs, and the orchestrator aggregates the field
//! into one consolidated `result.json`. A unit failure never takes down its
//! siblings; the failed unit appears as `null` in the aggregate.

use std::path::PathBuf;

use thiserror::Error;

pub mod extract;
pub mod orchestrator;
pub mod pool;
pub mod unit;

pub use extract::Extractor;
pub use orchestrator::{BatchOptions, FieldContext, FieldSummary, process_field};
pub use pool::{ParsePool, UnitJob, UnitOutcome};
pub use unit::{FieldTree, VersionUnit};

/// Failure of a single version unit. Absorbed per unit: logged, reported as
/// `UnitStatus::Failed`, and mapped to `null` in the consolidated output.
#[derive(Error, Debug)]
pub enum UnitError {
    #[error("missing subiect.pdf or barem.pdf in {0}")]
    MissingInput(PathBuf),
    #[error(transparent)]
    Backend(#[from] subiecte_core::BackendError),
    #[error(transparent)]
    Parse(#[from] subiecte_parsing::ParsingError),
    #[error(transparent)]
    Persist(#[from] subiecte_core::PersistError),
}

/// Failure affecting a whole field run. These abort the run instead of
/// being absorbed per unit.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error(transparent)]
    Grammar(#[from] subiecte_parsing::GrammarError),
    #[error("reading corpus layout: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persist(#[from] subiecte_core::PersistError),
}
