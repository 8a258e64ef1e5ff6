//! Load/save seam for raw notes. Documents are replaced wholesale on save.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use soapnote_core::CodecError;

pub trait DocumentStore {
    fn load(&self, id: &str) -> Result<String, CodecError>;
    fn save(&mut self, id: &str, raw: &str) -> Result<(), CodecError>;
}

/// In-memory store, one entry per document id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.documents.insert(id.into(), raw.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.documents.get(id).map(String::as_str)
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, id: &str) -> Result<String, CodecError> {
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| CodecError::NotFound(id.to_string()))
    }

    fn save(&mut self, id: &str, raw: &str) -> Result<(), CodecError> {
        self.documents.insert(id.to_string(), raw.to_string());
        Ok(())
    }
}

/// One `<id>.txt` file per note inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, CodecError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.starts_with('.');
        if !valid {
            return Err(CodecError::Store(format!("invalid document id {id:?}")));
        }
        Ok(self.root.join(format!("{id}.txt")))
    }
}

impl DocumentStore for DirectoryStore {
    fn load(&self, id: &str) -> Result<String, CodecError> {
        let path = self.path_for(id)?;
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => CodecError::NotFound(id.to_string()),
            _ => CodecError::Store(format!("{}: {err}", path.display())),
        })
    }

    fn save(&mut self, id: &str, raw: &str) -> Result<(), CodecError> {
        let path = self.path_for(id)?;
        fs::create_dir_all(&self.root)
            .and_then(|_| fs::write(&path, raw))
            .map_err(|err| CodecError::Store(format!("{}: {err}", path.display())))
    }
}
