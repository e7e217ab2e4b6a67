//! Flat JSON-document storage for sessions and feedback.
//!
//! Every mutation rewrites the whole document. Writes go to a temp file in the
//! same directory and are renamed over the target, so a crash mid-write leaves
//! the previous document intact. Within one process each store serialises its
//! own mutations; nothing coordinates across processes.
//!
//! Documents are small (a few hundred sessions at most), so they are rewritten
//! whole. Async callers go through `load` / `persist`, which run the file I/O
//! on tokio's blocking pool.

use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub mod feedback_store;
pub mod handlers;
pub mod session_store;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single JSON document on disk, read and written as a whole.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFile<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _doc: PhantomData,
        }
    }
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Opens (or seeds) the document at `path`, creating the parent directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let file = Self {
            path: path.into(),
            _doc: PhantomData,
        };
        std::fs::create_dir_all(file.dir()).map_err(|source| file.io_err(source))?;
        if !file.path.exists() {
            file.write(&T::default())?;
        }
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<T, StorageError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| self.io_err(source))?;
        if raw.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrites the whole document atomically.
    pub fn write(&self, value: &T) -> Result<(), StorageError> {
        let tmp = NamedTempFile::new_in(self.dir()).map_err(|source| self.io_err(source))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
                StorageError::Json {
                    path: self.path.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(|source| self.io_err(source))?;
        }
        tmp.persist(&self.path)
            .map_err(|e| self.io_err(e.error))?;
        Ok(())
    }

    /// `read` on the blocking pool.
    pub async fn load(&self) -> Result<T, StorageError>
    where
        T: Send + 'static,
    {
        let file = self.clone();
        tokio::task::spawn_blocking(move || file.read())
            .await
            .map_err(|e| self.io_err(std::io::Error::other(e)))?
    }

    /// `write` on the blocking pool. Hands `value` back once it is on disk.
    pub async fn persist(&self, value: T) -> Result<T, StorageError>
    where
        T: Send + 'static,
    {
        let file = self.clone();
        tokio::task::spawn_blocking(move || file.write(&value).map(|()| value))
            .await
            .map_err(|e| self.io_err(std::io::Error::other(e)))?
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_open_seeds_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let file: JsonFile<Vec<String>> = JsonFile::open(dir.path().join("nested/items.json")).unwrap();
        assert!(file.path().exists());
        assert!(file.read().unwrap().is_empty());
    }

    #[test]
    fn test_write_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let file: JsonFile<BTreeMap<String, u32>> = JsonFile::open(dir.path().join("doc.json")).unwrap();

        let mut doc = BTreeMap::new();
        doc.insert("a".to_string(), 1);
        doc.insert("b".to_string(), 2);
        file.write(&doc).unwrap();

        doc.remove("a");
        file.write(&doc).unwrap();

        let back = file.read().unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get("b"), Some(&2));
    }

    #[test]
    fn test_open_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"["kept"]"#).unwrap();

        let file: JsonFile<Vec<String>> = JsonFile::open(&path).unwrap();
        assert_eq!(file.read().unwrap(), vec!["kept".to_string()]);
    }

    #[test]
    fn test_read_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{not json").unwrap();

        let file: JsonFile<Vec<String>> = JsonFile::open(&path).unwrap();
        assert!(matches!(file.read(), Err(StorageError::Json { .. })));
    }

    #[test]
    fn test_blank_file_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "   \n").unwrap();

        let file: JsonFile<Vec<String>> = JsonFile::open(&path).unwrap();
        assert!(file.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file: JsonFile<Vec<String>> = JsonFile::open(dir.path().join("doc.json")).unwrap();

        let written = file.persist(vec!["a".to_string()]).await.unwrap();
        assert_eq!(written, vec!["a".to_string()]);
        assert_eq!(file.load().await.unwrap(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let file: JsonFile<Vec<String>> = JsonFile::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(
            file.persist(vec!["lost".to_string()]).await,
            Err(StorageError::Io { .. })
        ));
    }
}
