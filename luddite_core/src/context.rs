//! Application context: the store handle and everything driven by it.
//!
//! Constructed once at startup and torn down after the shutdown commit. Store
//! change notifications only enqueue a marker; [`AppContext::process_changes`]
//! drains the queue on the control thread, so a rebuild never runs inside
//! another one and always precedes the session refresh for the same change.

use crate::alerts::{Alert, AlertKind, Alerts};
use crate::config::Config;
use crate::document::{window_title, Document, DocumentId};
use crate::error::{LudditeError, Result};
use crate::preview::Renderer;
use crate::session::Session;
use crate::sidebar::Sidebar;
use crate::store::{DocumentStore, Subscription};
use crate::worker::Worker;
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// Answer to a quit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateReply {
    /// Nothing is pending, quit.
    Now,
    /// The final commit failed; ask before losing changes.
    Ask {
        question: String,
        info: String,
        quit_button: String,
        cancel_button: String,
    },
}

impl TerminateReply {
    fn commit_failed() -> Self {
        Self::Ask {
            question: "Could not save changes while quitting. Quit anyway?".to_string(),
            info: "Quitting now will lose any changes you have made since the last successful save"
                .to_string(),
            quit_button: "Quit anyway".to_string(),
            cancel_button: "Cancel".to_string(),
        }
    }
}

pub struct AppContext {
    store: Arc<dyn DocumentStore>,
    config: Config,
    session: Session,
    sidebar: Sidebar,
    alerts: Alerts,
    changes: Receiver<()>,
    _subscription: Subscription,
}

impl AppContext {
    /// Wires the store to a new session and loads the initial outline.
    pub fn new(store: Arc<dyn DocumentStore>, renderer: Box<dyn Renderer>, config: Config) -> Result<Self> {
        let (tx, changes) = crossbeam_channel::unbounded();
        let subscription = store.on_change(Arc::new(move || {
            // The receiver only goes away with the context.
            let _ = tx.send(());
        }));

        let mut session = Session::new(Arc::clone(&store), renderer, &config);
        match Worker::spawn() {
            Ok(worker) => session = session.with_worker(worker),
            Err(e) => log::warn!("Background worker unavailable, working inline: {}", e),
        }

        let mut context = Self {
            store,
            config,
            session,
            sidebar: Sidebar::new(),
            alerts: Alerts::new(),
            changes,
            _subscription: subscription,
        };
        let result = context.sidebar.refresh(context.store.as_ref(), &mut context.session);
        context.report(result)?;
        Ok(context)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Direct access for edit events (typing, caret, metadata fields).
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn alerts(&self) -> &Alerts {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut Alerts {
        &mut self.alerts
    }

    pub fn window_title(&self) -> String {
        window_title(self.session.document())
    }

    /// Handles queued store change notifications.
    ///
    /// Notifications raised while refreshing are picked up by the next round.
    /// Returns the number of refresh rounds run.
    pub fn process_changes(&mut self) -> Result<usize> {
        let mut rounds = 0;
        loop {
            let pending = self.changes.try_iter().count();
            if pending == 0 {
                break;
            }
            log::debug!("Refreshing outline for {} store change(s)", pending);
            let result = self.sidebar.refresh(self.store.as_ref(), &mut self.session);
            self.report(result)?;
            rounds += 1;
        }
        self.session.pump();
        Ok(rounds)
    }

    /// Creates a document; it shows up in the outline with the next refresh.
    pub fn create_document(&mut self, title: &str) -> Result<Document> {
        if title.trim().is_empty() {
            let err = LudditeError::missing_title();
            if let LudditeError::Validation { message, suggestion } = &err {
                self.alerts
                    .push(Alert::new(message.clone(), AlertKind::Error).with_informative(suggestion.clone()));
            }
            return Err(err);
        }
        let result = self.store.create_document(title).map_err(LudditeError::from);
        let document = self.report(result)?;
        log::info!("Created document {} ({:?})", document.id(), document.title());
        self.process_changes()?;
        Ok(document)
    }

    pub fn delete_document(&mut self, id: DocumentId) -> Result<()> {
        let result = self.store.delete_document(id).map_err(LudditeError::from);
        self.report(result)?;
        log::info!("Deleted document {}", id);
        self.process_changes()?;
        Ok(())
    }

    pub fn select(&mut self, id: Option<DocumentId>) -> Result<()> {
        let result = self.sidebar.select(id, &mut self.session);
        self.report(result)
    }

    /// Selects the document on a sidebar row; header rows are ignored.
    pub fn select_row(&mut self, row: usize) -> Result<bool> {
        let result = self.sidebar.select_row(row, &mut self.session);
        self.report(result)
    }

    pub fn toggle(&mut self) -> Result<()> {
        let result = self.session.toggle();
        self.report(result)
    }

    /// The edit surface lost focus.
    pub fn end_editing(&mut self) -> Result<()> {
        let result = self.session.end_editing();
        self.report(result)
    }

    /// Commits pending edits before the process exits.
    pub fn shutdown(&mut self) -> TerminateReply {
        match self.session.commit() {
            Ok(()) => {
                log::info!("Shutting down");
                TerminateReply::Now
            }
            Err(e) => {
                log::error!("Could not commit while quitting: {}", e);
                TerminateReply::commit_failed()
            }
        }
    }

    /// Queues an alert for store failures before passing the result on.
    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_store_failure() {
                self.alerts.error(e.to_string());
            }
        }
        result
    }
}
