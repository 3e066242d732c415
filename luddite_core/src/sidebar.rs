//! Sidebar selection controller.
//!
//! Owns the outline and the selected document id, and keeps the session
//! pointed at the freshest copy of the selected document after every rebuild.

use crate::document::{Document, DocumentId};
use crate::error::{LudditeError, Result};
use crate::outline::{OutlineIndex, OutlineRow};
use crate::session::Session;
use crate::store::DocumentStore;

#[derive(Debug, Default)]
pub struct Sidebar {
    index: OutlineIndex,
    /// Tracked by id; rows move on every rebuild.
    selected: Option<DocumentId>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> &OutlineIndex {
        &self.index
    }

    pub fn rows(&self) -> Vec<OutlineRow<'_>> {
        self.index.rows()
    }

    pub fn selected(&self) -> Option<DocumentId> {
        self.selected
    }

    /// The selected document as currently indexed.
    pub fn selected_document(&self) -> Option<&Document> {
        self.index.document(self.selected?)
    }

    /// Row the selection currently sits on.
    pub fn selected_row(&self) -> Option<usize> {
        self.index.row_of(self.selected?)
    }

    /// (heading, position within heading) of the selection.
    pub fn selected_position(&self) -> Option<(usize, usize)> {
        self.index.position_of(self.selected?)
    }

    /// Re-fetches the store, rebuilds the outline and re-selects by id.
    ///
    /// On a fetch failure the outline and the session are left untouched.
    pub fn refresh(&mut self, store: &dyn DocumentStore, session: &mut Session) -> Result<()> {
        let snapshot = store.fetch_snapshot().map_err(|e| {
            log::error!("Failed to fetch documents: {}", e);
            e
        })?;
        self.index.rebuild(snapshot);

        let fresh = self.selected_document().cloned();
        match fresh {
            Some(doc) => session.select(Some(&doc)),
            None => {
                if let Some(id) = self.selected.take() {
                    log::info!("Selected document {} is gone, clearing selection", id);
                }
                if session.document().is_some() {
                    session.discard_changes();
                }
                session.select(None)
            }
        }
    }

    /// Selects a document by id, or clears the selection.
    pub fn select(&mut self, id: Option<DocumentId>, session: &mut Session) -> Result<()> {
        let document = match id {
            Some(id) => Some(
                self.index
                    .document(id)
                    .cloned()
                    .ok_or(LudditeError::NotFound(id))?,
            ),
            None => None,
        };
        session.select(document.as_ref())?;
        self.selected = id;
        Ok(())
    }

    /// Selects the document on a flattened row.
    ///
    /// Header rows and rows past the end are ignored; returns whether the
    /// selection changed.
    pub fn select_row(&mut self, row: usize, session: &mut Session) -> Result<bool> {
        let Some(id) = self.index.document_at_row(row).map(Document::id) else {
            return Ok(false);
        };
        self.select(Some(id), session)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::preview::Renderer;
    use crate::session::Mode;
    use crate::store::MemoryStore;
    use chrono::{Local, TimeZone};
    use std::path::Path;
    use std::sync::Arc;

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn render(&mut self, _html: &str, _base_dir: &Path) {}
    }

    fn dated(title: &str, y: i32, m: u32, d: u32) -> Document {
        Document::new(title, Local.with_ymd_and_hms(y, m, d, 9, 0, 0).single().unwrap())
    }

    fn setup(docs: Vec<Document>) -> (Arc<MemoryStore>, Session, Sidebar) {
        let store = Arc::new(MemoryStore::with_documents(docs));
        let mut session = Session::new(store.clone(), Box::new(NullRenderer), &Config::default());
        let mut sidebar = Sidebar::new();
        sidebar.refresh(store.as_ref(), &mut session).unwrap();
        (store, session, sidebar)
    }

    #[test]
    fn test_select_row_skips_headers() {
        let a = dated("a", 2024, 4, 1);
        let (_, mut session, mut sidebar) = setup(vec![a.clone()]);
        assert!(!sidebar.select_row(0, &mut session).unwrap());
        assert!(!sidebar.select_row(9, &mut session).unwrap());
        assert!(sidebar.select_row(1, &mut session).unwrap());
        assert_eq!(sidebar.selected(), Some(a.id()));
        assert_eq!(session.mode(), Mode::Previewing);
    }

    #[test]
    fn test_select_unknown_id() {
        let (_, mut session, mut sidebar) = setup(vec![]);
        let missing = DocumentId::new();
        assert!(matches!(
            sidebar.select(Some(missing), &mut session),
            Err(LudditeError::NotFound(id)) if id == missing
        ));
        assert_eq!(sidebar.selected(), None);
    }

    #[test]
    fn test_selection_follows_id_across_rebuild() {
        let march = dated("march", 2024, 3, 10);
        let (store, mut session, mut sidebar) = setup(vec![march.clone()]);
        sidebar.select(Some(march.id()), &mut session).unwrap();
        assert_eq!(sidebar.selected_row(), Some(1));

        store.apply_remote(dated("april", 2024, 4, 2));
        sidebar.refresh(store.as_ref(), &mut session).unwrap();
        assert_eq!(sidebar.selected_row(), Some(3));
        assert_eq!(sidebar.selected_position(), Some((1, 0)));
        assert_eq!(session.document().unwrap().id(), march.id());
    }

    #[test]
    fn test_refresh_pushes_fresh_copy() {
        let a = dated("a", 2024, 3, 10);
        let (store, mut session, mut sidebar) = setup(vec![a.clone()]);
        sidebar.select(Some(a.id()), &mut session).unwrap();

        let mut synced = a.clone();
        synced.set_content("<p>synced</p>");
        store.apply_remote(synced);
        sidebar.refresh(store.as_ref(), &mut session).unwrap();
        assert_eq!(session.document().unwrap().content(), "<p>synced</p>");
        assert_eq!(session.mode(), Mode::Previewing);
    }

    #[test]
    fn test_deleted_selection_clears_session() {
        let a = dated("a", 2024, 3, 10);
        let (store, mut session, mut sidebar) = setup(vec![a.clone()]);
        sidebar.select(Some(a.id()), &mut session).unwrap();
        session.toggle().unwrap();
        session.insert_at(0, "unsaved");

        store.remove_remote(a.id());
        sidebar.refresh(store.as_ref(), &mut session).unwrap();
        assert_eq!(session.mode(), Mode::Empty);
        assert_eq!(sidebar.selected(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_fetch_failure_leaves_everything() {
        let a = dated("a", 2024, 3, 10);
        let (store, mut session, mut sidebar) = setup(vec![a.clone()]);
        sidebar.select(Some(a.id()), &mut session).unwrap();

        store.fail_fetch(true);
        store.remove_remote(a.id());
        assert!(sidebar.refresh(store.as_ref(), &mut session).is_err());
        assert_eq!(sidebar.index().document_count(), 1);
        assert_eq!(session.mode(), Mode::Previewing);
    }
}
