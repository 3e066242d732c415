//! Editing session controller.
//!
//! Decides which presentation is active for the selected document and keeps
//! the edit surface, the preview and the in-memory document in step. The
//! store is only called when leaving the editing presentation or on an
//! explicit [`Session::end_editing`].

use crate::config::Config;
use crate::document::{Document, Timestamp};
use crate::editor::{Editor, Metadata};
use crate::error::Result;
use crate::preview::{wrap_html, Renderer};
use crate::stats::TextStats;
use crate::store::DocumentStore;
use crate::syntax::{Appearance, StyleMap};
use crate::worker::{Job, JobOutput, JobResult, Worker};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The active presentation, carrying the selected document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Editing(Document),
    Previewing(Document),
}

impl SessionState {
    pub fn document(&self) -> Option<&Document> {
        match self {
            SessionState::Empty => None,
            SessionState::Editing(doc) | SessionState::Previewing(doc) => Some(doc),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            SessionState::Empty => Mode::Empty,
            SessionState::Editing(_) => Mode::Editing,
            SessionState::Previewing(_) => Mode::Previewing,
        }
    }
}

/// The presentation without its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Empty,
    Editing,
    Previewing,
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Select(Option<&'a Document>),
    Toggle,
}

/// What a [`Event`] does to a [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do.
    Stay,
    ToEmpty,
    /// Show the preview of the incoming (or current) document.
    ToPreview,
    ToEditing,
    /// Same document while previewing: re-render if its content changed.
    RefreshPreview,
    /// Same document while editing: push metadata, reload changed text.
    RefreshEditing,
}

/// The transition function. Total over every state and event.
pub fn plan(state: &SessionState, event: Event<'_>) -> Transition {
    use SessionState::*;

    match (state, event) {
        (_, Event::Select(None)) => Transition::ToEmpty,
        (Empty, Event::Select(Some(_))) => Transition::ToPreview,
        (Editing(current) | Previewing(current), Event::Select(Some(doc)))
            if !current.same_document(doc) =>
        {
            Transition::ToPreview
        }
        (Previewing(_), Event::Select(Some(_))) => Transition::RefreshPreview,
        (Editing(_), Event::Select(Some(_))) => Transition::RefreshEditing,
        (Empty, Event::Toggle) => Transition::Stay,
        (Editing(_), Event::Toggle) => Transition::ToPreview,
        (Previewing(_), Event::Toggle) => Transition::ToEditing,
    }
}

/// Owns the presentation state and everything it drives.
pub struct Session {
    state: SessionState,
    editor: Editor,
    store: Arc<dyn DocumentStore>,
    renderer: Box<dyn Renderer>,
    worker: Option<Worker>,
    resource_dir: PathBuf,
    offload_threshold: usize,
    /// HTML last handed to the renderer.
    shown_html: Option<String>,
    /// Document as last loaded from or committed to the store.
    baseline: Option<Document>,
    /// Unsaved local changes exist.
    dirty: bool,
}

impl Session {
    pub fn new(store: Arc<dyn DocumentStore>, renderer: Box<dyn Renderer>, config: &Config) -> Self {
        Self {
            state: SessionState::Empty,
            editor: Editor::new(config.appearance, config.viewport_lines),
            store,
            renderer,
            worker: None,
            resource_dir: config.resource_dir.clone(),
            offload_threshold: config.offload_threshold,
            shown_html: None,
            baseline: None,
            dirty: false,
        }
    }

    /// Offloads large highlighting and stats passes to `worker`.
    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn document(&self) -> Option<&Document> {
        self.state.document()
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Styling of the edit surface.
    pub fn styles(&self) -> &StyleMap {
        self.editor.styles()
    }

    /// Status bar text, `...` until counts are available.
    pub fn stats_label(&self) -> String {
        self.editor.stats().label()
    }

    /// Caret position label, `L: n C: m`.
    pub fn cursor_label(&self) -> String {
        self.editor.cursor_position().to_string()
    }

    /// HTML last handed to the renderer.
    pub fn shown_html(&self) -> Option<&str> {
        self.shown_html.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.editor.set_appearance(appearance);
    }

    // ==================== Transitions ====================

    /// Selects a document, or nothing.
    ///
    /// Fails only when leaving the editing presentation needs a commit and the
    /// store rejects it; the session is then left as it was.
    pub fn select(&mut self, document: Option<&Document>) -> Result<()> {
        let transition = plan(&self.state, Event::Select(document));
        log::debug!("select {:?}: {:?} -> {:?}", document.map(Document::id), self.mode(), transition);

        match (transition, document) {
            (Transition::ToEmpty, _) => {
                self.leave_editing()?;
                self.editor.clear();
                self.shown_html = None;
                self.baseline = None;
                self.state = SessionState::Empty;
            }
            (Transition::ToPreview, Some(doc)) => {
                self.leave_editing()?;
                self.show_preview(doc.clone());
            }
            (Transition::RefreshPreview, Some(doc)) => self.show_preview(doc.clone()),
            (Transition::RefreshEditing, Some(doc)) => self.refresh_editing(doc.clone()),
            _ => {}
        }
        Ok(())
    }

    /// Swaps between editing and previewing. Does nothing when empty.
    pub fn toggle(&mut self) -> Result<()> {
        let transition = plan(&self.state, Event::Toggle);
        log::debug!("toggle: {:?} -> {:?}", self.mode(), transition);

        match transition {
            Transition::ToPreview => {
                self.leave_editing()?;
                if let Some(doc) = self.state.document().cloned() {
                    self.show_preview(doc);
                }
            }
            Transition::ToEditing => {
                if let Some(doc) = self.state.document().cloned() {
                    self.enter_editing(doc);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// The edit surface lost focus: commit pending changes.
    pub fn end_editing(&mut self) -> Result<()> {
        self.commit()
    }

    /// Commits the edited document if it has unsaved changes.
    ///
    /// Publishing defaults are applied on the first commit. On failure the
    /// in-memory document and the dirty flag are kept.
    pub fn commit(&mut self) -> Result<()> {
        let SessionState::Editing(doc) = &self.state else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let mut pending = doc.clone();
        pending.apply_publish_defaults();
        if let Err(e) = self.store.commit(&pending) {
            log::error!("Failed to commit document {}: {}", pending.id(), e);
            return Err(e.into());
        }
        log::info!("Committed document {}", pending.id());

        self.baseline = Some(pending.clone());
        self.editor.set_metadata(Metadata::from_document(&pending));
        self.state = SessionState::Editing(pending);
        self.dirty = false;
        Ok(())
    }

    /// Forgets unsaved changes so the next transition does not commit them.
    pub fn discard_changes(&mut self) {
        if self.dirty {
            log::warn!("Discarding unsaved changes to {:?}", self.document().map(Document::id));
        }
        self.dirty = false;
    }

    fn leave_editing(&mut self) -> Result<()> {
        if self.mode() == Mode::Editing {
            self.commit()?;
        }
        Ok(())
    }

    fn show_preview(&mut self, doc: Document) {
        let html = wrap_html(doc.raw_content());
        if self.shown_html.as_deref() != Some(html.as_str()) {
            self.renderer.render(&html, &self.resource_dir);
            self.shown_html = Some(html);
        }
        self.state = SessionState::Previewing(doc);
    }

    fn enter_editing(&mut self, doc: Document) {
        let content = doc.content();
        let same_text = self.editor.document() == Some(doc.id()) && self.editor.shows(content);
        if !same_text {
            self.editor.load(doc.id(), content);
        }
        self.highlight(0..self.editor.len_bytes());
        self.schedule_stats(content);

        self.baseline = Some(doc.clone());
        self.dirty = false;
        self.editor.set_metadata(Metadata::from_document(&doc));
        self.state = SessionState::Editing(doc);
    }

    /// Same document while editing.
    ///
    /// The buffer is reloaded only when the store holds content that differs
    /// from what this session last saw and from the live text; otherwise the
    /// live (possibly unsaved) text is kept. Metadata fields edited locally
    /// since the last load or commit win over the store's; the rest follow it.
    fn refresh_editing(&mut self, stored: Document) {
        let mut merged = stored.clone();
        let external = stored.content();
        let changed_remotely = self.baseline.as_ref().map(Document::content) != Some(external);

        let mut unsaved = false;
        if changed_remotely && !self.editor.shows(external) {
            log::info!("Document {} changed externally, reloading", stored.id());
            self.editor.replace_text(external);
            self.highlight(0..self.editor.len_bytes());
            self.schedule_stats(external);
        } else {
            unsaved = self.dirty && !self.editor.shows(external);
            merged.replace_content(self.editor.text());
        }

        if let (Some(base), SessionState::Editing(local)) = (&self.baseline, &self.state) {
            if self.dirty && merged.keep_local_metadata(local, base) {
                log::debug!("Keeping unsaved metadata of {}", merged.id());
                unsaved = true;
            }
        }

        self.dirty = unsaved;
        self.baseline = Some(stored);
        self.editor.set_metadata(Metadata::from_document(&merged));
        self.state = SessionState::Editing(merged);
    }

    // ==================== Local edits ====================

    /// Types `text` at the caret, replacing the selection.
    pub fn insert_text(&mut self, text: &str) -> bool {
        self.mode() == Mode::Editing && self.editor.insert_text(text) && self.after_edit()
    }

    /// Inserts `text` at a character index.
    pub fn insert_at(&mut self, char_idx: usize, text: &str) -> bool {
        self.mode() == Mode::Editing && self.editor.insert_at(char_idx, text) && self.after_edit()
    }

    /// Removes characters `[start, end)`.
    pub fn remove(&mut self, start: usize, end: usize) -> bool {
        self.mode() == Mode::Editing && self.editor.remove(start, end) && self.after_edit()
    }

    /// Backspace at the caret.
    pub fn delete_backward(&mut self) -> bool {
        self.mode() == Mode::Editing && self.editor.delete_backward() && self.after_edit()
    }

    /// Replaces the whole text.
    pub fn replace_all(&mut self, text: &str) -> bool {
        if self.mode() != Mode::Editing || self.editor.shows(text) {
            return false;
        }
        self.editor.replace_text(text);
        self.highlight(0..self.editor.len_bytes());
        self.after_edit()
    }

    pub fn set_cursor(&mut self, char_idx: usize, extend_selection: bool) {
        self.editor.set_cursor(char_idx, extend_selection);
    }

    /// Resizes the visible window; `None` treats the whole buffer as visible.
    pub fn set_viewport(&mut self, first_line: usize, lines: Option<usize>) {
        self.editor.set_visible_lines(lines);
        self.scroll_to(first_line);
    }

    /// Scrolls the edit surface and highlights what came into view.
    pub fn scroll_to(&mut self, line: usize) {
        self.editor.set_scroll_offset(line);
        if self.mode() == Mode::Editing {
            let range = self.editor.visible_byte_range();
            self.highlight(range);
        }
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        self.update_document(|doc| doc.set_title(title))
    }

    pub fn set_draft(&mut self, is_draft: bool) -> bool {
        self.update_document(|doc| doc.set_draft(is_draft))
    }

    pub fn set_date_published(&mut self, published: Timestamp) -> bool {
        self.update_document(|doc| doc.set_date_published(published))
    }

    fn update_document(&mut self, update: impl FnOnce(&mut Document)) -> bool {
        let SessionState::Editing(doc) = &mut self.state else {
            return false;
        };
        update(doc);
        self.editor.set_metadata(Metadata::from_document(doc));
        self.dirty = true;
        true
    }

    fn after_edit(&mut self) -> bool {
        let visible = self.editor.visible_byte_range();
        self.highlight(visible);

        let text = self.editor.text();
        self.schedule_stats(&text);
        if let SessionState::Editing(doc) = &mut self.state {
            doc.set_content(text);
            self.editor.set_metadata(Metadata::from_document(doc));
        }
        self.dirty = true;
        true
    }

    // ==================== Styling & stats ====================

    fn highlight(&mut self, range: Range<usize>) {
        if range.len() > self.offload_threshold {
            if let (Some(worker), Some(document)) = (self.worker.as_mut(), self.editor.document()) {
                let job = Job::Highlight {
                    document,
                    text: self.editor.text(),
                    range: range.clone(),
                };
                if worker.submit(job) {
                    return;
                }
            }
        }
        self.editor.highlight_range(range);
    }

    /// `text` is the live buffer content.
    fn schedule_stats(&mut self, text: &str) {
        let len = text.len();
        if !self.editor.stats_mut().should_recompute(len) {
            return;
        }
        if len > self.offload_threshold {
            if let (Some(worker), Some(document)) = (self.worker.as_mut(), self.editor.document()) {
                let job = Job::Stats {
                    document,
                    text: text.to_string(),
                };
                if worker.submit(job) {
                    return;
                }
            }
        }
        self.editor.stats_mut().update(TextStats::compute(text));
    }

    /// Applies finished background results. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(result) = self.worker.as_mut().and_then(Worker::try_recv) {
            if self.apply_result(result) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits up to `timeout` for each outstanding background job.
    /// Returns how many results were applied.
    pub fn wait_for_worker(&mut self, timeout: Duration) -> usize {
        let mut applied = 0;
        loop {
            let Some(worker) = self.worker.as_mut() else {
                break;
            };
            if worker.in_flight() == 0 {
                break;
            }
            let Some(result) = worker.recv_timeout(timeout) else {
                break;
            };
            if self.apply_result(result) {
                applied += 1;
            }
        }
        applied
    }

    fn apply_result(&mut self, result: JobResult) -> bool {
        let fresh = self
            .editor
            .document()
            .is_some_and(|id| result.is_fresh(id, self.editor.len_bytes()));
        if !fresh {
            log::debug!(
                "Dropping stale background result for {} ({} bytes)",
                result.document,
                result.dispatched_len
            );
            return false;
        }
        match result.output {
            JobOutput::Highlight(spans) => self.editor.apply_spans(&spans),
            JobOutput::Stats(stats) => self.editor.stats_mut().update(stats),
        }
        true
    }
}
