use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write `value` as pretty-printed UTF-8 JSON. Non-ASCII characters
/// (Romanian diacritics) are written literally, not escaped.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Load a JSON file written by [`write_json`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_diacritics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        let value = crate::SectionNode::Leaf("Citiți cu atenție: înțelegere, vreodată, șah".into());

        write_json(&path, &value).unwrap();
        let back: crate::SectionNode = load_json(&path).unwrap();
        assert_eq!(back, value);

        // Diacritics must be literal bytes in the file, not \u escapes
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Citiți"));
        assert!(!raw.contains("\\u"));
    }

    #[test]
    fn write_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("a.json");
        let path_b = dir.path().join("b.json");
        let json = r#"{"subiectul_1": {"subiect": "a", "barem": "b"}}"#;
        let value: crate::ParsedExam = serde_json::from_str(json).unwrap();

        write_json(&path_a, &value).unwrap();
        let reloaded: crate::ParsedExam = load_json(&path_a).unwrap();
        write_json(&path_b, &reloaded).unwrap();

        assert_eq!(
            std::fs::read(&path_a).unwrap(),
            std::fs::read(&path_b).unwrap()
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_json::<crate::SectionNode>(Path::new("/nonexistent/result.json"))
            .expect_err("should fail");
        assert!(matches!(err, PersistError::Io(_)));
    }
}
