use thiserror::Error;

pub mod anchors;
pub mod compose;
pub mod grammar;
pub mod normalize;
pub mod section;

pub use anchors::{CorpusEra, anchors_present, extract_subjects};
pub use compose::{parse_sourced_tasks, parse_subtask, parse_task};
pub use grammar::{FieldGrammar, RubricRule, SubjectGrammar, TaskRule, field_grammar, known_fields};
pub use normalize::{fix_mojibake, flatten_text};
pub use section::{NumberingStyle, parse_numbered};
// Re-export domain types from core (canonical definitions live there)
pub use subiecte_core::{ParsedExam, SectionNode, SubjectResult};

#[derive(Error, Debug)]
pub enum ParsingError {
    /// A subject anchor (or the following anchor bounding its window) did
    /// not match. The index is the 1-based subject position.
    #[error("subject {index} anchor not found")]
    SubjectNotFound { index: usize },
    /// A grammar rule produced an empty node; a pattern mismatch must
    /// surface as a failure rather than an empty mapping.
    #[error("subject {subject}: parser produced an empty result")]
    EmptyResult { subject: usize },
    /// Source-document subjects did not contain the task lead-in that
    /// bounds the source passage.
    #[error("source passage boundary not found")]
    SourceNotFound,
    #[error("grammar expects {expected} subjects, got {got}")]
    SubjectCount { expected: usize, got: usize },
}

/// Unknown field name in the grammar registry. This is a configuration
/// mistake affecting every unit of the field, so it propagates uncaught
/// instead of being absorbed per unit.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("no grammar registered for field '{0}'")]
    UnknownField(String),
}
