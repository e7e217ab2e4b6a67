use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::retrieval::Document;
use crate::storage::StorageError;

/// Loads every top-level `*.json` file in `dir` as retrieval documents.
///
/// An array contributes one document per element; any other value is one
/// document. Empty or unparseable files are skipped with a warning. A missing
/// directory is an error.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, StorageError> {
    let io_err = |source| StorageError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Error processing {source}: {e}");
                continue;
            }
        };
        if raw.trim().is_empty() {
            warn!("Skipping empty file: {source}");
            continue;
        }
        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping {source} due to invalid JSON: {e}");
                continue;
            }
        };

        let before = documents.len();
        match value {
            Value::Array(entries) => {
                documents.extend(entries.iter().map(|entry| Document::from_json(entry, &source)))
            }
            other => documents.push(Document::from_json(&other, &source)),
        }
        info!("Loaded {} document(s) from {source}", documents.len() - before);
    }

    if documents.is_empty() {
        warn!("No valid JSON documents were loaded from {}", dir.display());
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_arrays_split_into_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("jobs.json"), r#"[{"title": "A"}, {"title": "B"}]"#).unwrap();
        fs::write(dir.path().join("about.json"), r#"{"name": "Asha"}"#).unwrap();

        let docs = load_documents(dir.path()).unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].source, "about.json");
        assert_eq!(docs[0].content, "{\n  \"name\": \"Asha\"\n}");
        assert_eq!(docs[1].source, "jobs.json");
        assert!(docs[2].content.contains("\"B\""));
    }

    #[test]
    fn test_bad_and_foreign_files_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.json"), "  \n").unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), r#"{"a": 1}"#).unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        assert!(load_documents(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(load_documents(&missing), Err(StorageError::Io { .. })));
    }
}
