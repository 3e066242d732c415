//! Document store boundary and an in-memory implementation.
//!
//! The store is the only durable source of truth. The core reaches it through
//! [`DocumentStore`]; change notifications carry no payload beyond
//! "something changed, fetch again".

use crate::document::{Document, DocumentId};
use crate::error::StoreError;
use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Called whenever the store's contents change.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Persistence and sync collaborator.
pub trait DocumentStore: Send + Sync {
    /// Creates and stores a new document titled `title`.
    fn create_document(&self, title: &str) -> Result<Document, StoreError>;

    /// Returns all documents, newest creation date first.
    fn fetch_snapshot(&self) -> Result<Vec<Document>, StoreError>;

    /// Inserts or replaces a document.
    fn commit(&self, document: &Document) -> Result<(), StoreError>;

    /// Deletes a document.
    fn delete_document(&self, id: DocumentId) -> Result<(), StoreError>;

    /// Registers a change callback; dropping the subscription unregisters it.
    fn on_change(&self, callback: ChangeCallback) -> Subscription;
}

type Listeners = Mutex<Vec<(u64, ChangeCallback)>>;

/// Keeps a change callback registered while alive.
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).retain(|(id, _)| *id != self.id);
        }
    }
}

/// Registry of change callbacks a store implementation can embed.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.listeners).push((id, callback));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Invokes every callback. Callbacks run outside the registry lock.
    pub fn notify(&self) {
        let callbacks: Vec<ChangeCallback> = lock(&self.listeners)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sorts newest creation date first; undated documents go last.
pub fn sort_newest_first(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.date_created().cmp(&a.date_created()));
}

/// Operations the in-memory store can be told to fail.
#[derive(Debug, Default, Clone, Copy)]
struct Failures {
    fetch: bool,
    commit: bool,
    delete: bool,
}

/// In-memory store with change notifications and failure injection.
///
/// Also stands in for a remote peer: [`MemoryStore::apply_remote`] and
/// [`MemoryStore::remove_remote`] change contents the way a sync would.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<Document>>,
    failures: Mutex<Failures>,
    notifier: ChangeNotifier,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `documents`.
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let store = Self::new();
        *lock(&store.documents) = documents;
        store
    }

    /// Makes `fetch_snapshot` fail until reset.
    pub fn fail_fetch(&self, fail: bool) {
        lock(&self.failures).fetch = fail;
    }

    /// Makes `commit` (and `create_document`) fail until reset.
    pub fn fail_commit(&self, fail: bool) {
        lock(&self.failures).commit = fail;
    }

    /// Makes `delete_document` fail until reset.
    pub fn fail_delete(&self, fail: bool) {
        lock(&self.failures).delete = fail;
    }

    /// Upserts a document as if a remote peer had synced it.
    pub fn apply_remote(&self, document: Document) {
        self.upsert(document);
        self.notifier.notify();
    }

    /// Removes a document as if a remote peer had deleted it.
    pub fn remove_remote(&self, id: DocumentId) {
        lock(&self.documents).retain(|d| d.id() != id);
        self.notifier.notify();
    }

    /// Returns the stored copy of a document.
    pub fn get(&self, id: DocumentId) -> Option<Document> {
        lock(&self.documents).iter().find(|d| d.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.documents).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.documents).is_empty()
    }

    fn upsert(&self, document: Document) {
        let mut documents = lock(&self.documents);
        match documents.iter_mut().find(|d| d.id() == document.id()) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn create_document(&self, title: &str) -> Result<Document, StoreError> {
        if lock(&self.failures).commit {
            return Err(StoreError::Unavailable("commit rejected".to_string()));
        }
        let document = Document::new(title, Local::now());
        self.upsert(document.clone());
        self.notifier.notify();
        Ok(document)
    }

    fn fetch_snapshot(&self) -> Result<Vec<Document>, StoreError> {
        if lock(&self.failures).fetch {
            return Err(StoreError::Unavailable("fetch rejected".to_string()));
        }
        let mut snapshot = lock(&self.documents).clone();
        sort_newest_first(&mut snapshot);
        Ok(snapshot)
    }

    fn commit(&self, document: &Document) -> Result<(), StoreError> {
        if lock(&self.failures).commit {
            return Err(StoreError::Unavailable("commit rejected".to_string()));
        }
        self.upsert(document.clone());
        self.notifier.notify();
        Ok(())
    }

    fn delete_document(&self, id: DocumentId) -> Result<(), StoreError> {
        if lock(&self.failures).delete {
            return Err(StoreError::Unavailable("delete rejected".to_string()));
        }
        {
            let mut documents = lock(&self.documents);
            let before = documents.len();
            documents.retain(|d| d.id() != id);
            if documents.len() == before {
                return Err(StoreError::NotFound(id));
            }
        }
        self.notifier.notify();
        Ok(())
    }

    fn on_change(&self, callback: ChangeCallback) -> Subscription {
        self.notifier.subscribe(callback)
    }
}
