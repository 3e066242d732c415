//! JSON-file document store used by the driver.

use chrono::Local;
use luddite_core::{
    sort_newest_first, ChangeCallback, ChangeNotifier, Document, DocumentId, DocumentStore,
    StoreError, Subscription,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Keeps every document in one pretty-printed JSON array on disk.
pub struct JsonStore {
    path: PathBuf,
    documents: Mutex<Vec<Document>>,
    notifier: ChangeNotifier,
}

impl JsonStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let documents: Vec<Document> = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| StoreError::Persist {
                message: format!("{}: {}", path.display(), e),
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No store at {:?}, starting empty", path);
                Vec::new()
            }
            Err(e) => {
                return Err(StoreError::Unavailable(format!("{}: {}", path.display(), e)));
            }
        };
        Ok(Self {
            path,
            documents: Mutex::new(documents),
            notifier: ChangeNotifier::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn documents(&self) -> MutexGuard<'_, Vec<Document>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `change` and writes the result; memory is only updated once the write lands.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut Vec<Document>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let value = {
            let mut documents = self.documents();
            let mut next = documents.clone();
            let value = change(&mut next)?;
            self.write(&next)?;
            *documents = next;
            value
        };
        self.notifier.notify();
        Ok(value)
    }

    fn write(&self, documents: &[Document]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(documents).map_err(|e| StoreError::Persist {
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(|e| StoreError::Persist {
            message: format!("{}: {}", self.path.display(), e),
        })
    }
}

impl DocumentStore for JsonStore {
    fn create_document(&self, title: &str) -> Result<Document, StoreError> {
        let document = Document::new(title, Local::now());
        self.update(|documents| {
            documents.push(document.clone());
            Ok(())
        })?;
        Ok(document)
    }

    fn fetch_snapshot(&self) -> Result<Vec<Document>, StoreError> {
        let mut snapshot = self.documents().clone();
        sort_newest_first(&mut snapshot);
        Ok(snapshot)
    }

    fn commit(&self, document: &Document) -> Result<(), StoreError> {
        self.update(|documents| {
            match documents.iter_mut().find(|d| d.id() == document.id()) {
                Some(existing) => *existing = document.clone(),
                None => documents.push(document.clone()),
            }
            Ok(())
        })
    }

    fn delete_document(&self, id: DocumentId) -> Result<(), StoreError> {
        self.update(|documents| {
            let before = documents.len();
            documents.retain(|d| d.id() != id);
            if documents.len() == before {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
    }

    fn on_change(&self, callback: ChangeCallback) -> Subscription {
        self.notifier.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("docs.json")).unwrap();
        assert!(store.fetch_snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        let id = {
            let store = JsonStore::open(&path).unwrap();
            let mut doc = store.create_document("Kept").unwrap();
            doc.set_content("<p>body</p>");
            store.commit(&doc).unwrap();
            doc.id()
        };

        let reopened = JsonStore::open(&path).unwrap();
        let snapshot = reopened.fetch_snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), id);
        assert_eq!(snapshot[0].content(), "<p>body</p>");
    }

    #[test]
    fn test_delete_and_notify() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("docs.json")).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let _sub = store.on_change(Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let doc = store.create_document("gone").unwrap();
        store.delete_document(doc.id()).unwrap();
        assert!(matches!(store.delete_document(doc.id()), Err(StoreError::NotFound(_))));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_corrupt_file_is_persist_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonStore::open(&path), Err(StoreError::Persist { .. })));
    }

    #[test]
    fn test_failed_write_keeps_memory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("missing-dir").join("docs.json")).unwrap();
        assert!(store.create_document("x").is_err());
        assert!(store.fetch_snapshot().unwrap().is_empty());
    }
}
