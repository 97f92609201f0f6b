use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod io;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use io::{PersistError, load_json, write_json};

/// One node of a parsed exam tree: either flattened text or an ordered
/// mapping from section key (`exercitiul_3`, `subpunctul_a`, `enunt`, ...)
/// to nested nodes. The parser is depth-agnostic; current grammars produce
/// at most task -> subtask nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionNode {
    Leaf(String),
    Branch(IndexMap<String, SectionNode>),
}

impl SectionNode {
    /// An empty node signals a grammar/pattern mismatch, never a valid parse.
    pub fn is_empty(&self) -> bool {
        match self {
            SectionNode::Leaf(text) => text.trim().is_empty(),
            SectionNode::Branch(map) => map.is_empty(),
        }
    }

    /// Rewrite every leaf with `f`, walking branches recursively.
    /// Used for the final whitespace normalization pass over a parsed exam.
    pub fn map_leaves(self, f: &impl Fn(&str) -> String) -> SectionNode {
        match self {
            SectionNode::Leaf(text) => SectionNode::Leaf(f(&text)),
            SectionNode::Branch(map) => SectionNode::Branch(
                map.into_iter().map(|(k, v)| (k, v.map_leaves(f))).collect(),
            ),
        }
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            SectionNode::Leaf(text) => Some(text),
            SectionNode::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&IndexMap<String, SectionNode>> {
        match self {
            SectionNode::Leaf(_) => None,
            SectionNode::Branch(map) => Some(map),
        }
    }
}

/// Parsed subject paper and grading rubric for one subject position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub subiect: SectionNode,
    pub barem: SectionNode,
}

/// Full parse of one exam version, keyed `subiectul_1`..`subiectul_N`
/// in document order.
pub type ParsedExam = IndexMap<String, SubjectResult>;

/// Terminal state of one version unit within a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// Cached `result.json` existed and was reused verbatim.
    Loaded,
    /// Parsed from the PDFs and persisted.
    Processed,
    /// Any per-unit error; the unit maps to `null` in the aggregate.
    Failed,
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitStatus::Loaded => write!(f, "Loaded"),
            UnitStatus::Processed => write!(f, "Processed"),
            UnitStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Progress events emitted while a field batch runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Unit {
        field: String,
        year: String,
        version: String,
        status: UnitStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_serializes_as_bare_string() {
        let node = SectionNode::Leaf("Primul text.".into());
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, "\"Primul text.\"");
    }

    #[test]
    fn branch_round_trips_preserving_order() {
        let mut map = IndexMap::new();
        map.insert("enunt".to_string(), SectionNode::Leaf("Intro".into()));
        map.insert(
            "exercitiul_2".to_string(),
            SectionNode::Leaf("Al doilea".into()),
        );
        map.insert(
            "exercitiul_1".to_string(),
            SectionNode::Leaf("Primul".into()),
        );
        let node = SectionNode::Branch(map);

        let json = serde_json::to_string(&node).unwrap();
        let back: SectionNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);

        // Document order, not sorted order
        let keys: Vec<_> = back.as_branch().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["enunt", "exercitiul_2", "exercitiul_1"]);
    }

    #[test]
    fn nested_branch_deserializes_from_plain_json() {
        let json = r#"{"exercitiul_a": {"enunt": "Cap", "subpunctul_1": "Unu"}}"#;
        let node: SectionNode = serde_json::from_str(json).unwrap();
        let outer = node.as_branch().unwrap();
        let inner = outer["exercitiul_a"].as_branch().unwrap();
        assert_eq!(inner["subpunctul_1"].as_leaf(), Some("Unu"));
    }

    #[test]
    fn map_leaves_reaches_every_depth() {
        let json = r#"{"enunt": "  a  ", "exercitiul_1": {"subpunctul_a": " b "}}"#;
        let node: SectionNode = serde_json::from_str(json).unwrap();
        let trimmed = node.map_leaves(&|s| s.trim().to_string());
        let outer = trimmed.as_branch().unwrap();
        assert_eq!(outer["enunt"].as_leaf(), Some("a"));
        let inner = outer["exercitiul_1"].as_branch().unwrap();
        assert_eq!(inner["subpunctul_a"].as_leaf(), Some("b"));
    }

    #[test]
    fn empty_nodes_are_detected() {
        assert!(SectionNode::Leaf("   ".into()).is_empty());
        assert!(SectionNode::Branch(IndexMap::new()).is_empty());
        assert!(!SectionNode::Leaf("text".into()).is_empty());
    }
}
