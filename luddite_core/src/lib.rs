//! Luddite Core - note and blog post editor logic.
//!
//! This crate contains the document model, the outline, the editing session
//! and the markup highlighter without any dependencies on windowing or
//! rendering systems. Persistence and preview rendering are reached through
//! the [`DocumentStore`] and [`Renderer`] traits.

pub mod alerts;
pub mod buffer;
pub mod config;
pub mod context;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod outline;
pub mod preview;
pub mod session;
pub mod sidebar;
pub mod stats;
pub mod store;
pub mod syntax;
pub mod worker;

pub use alerts::{Alert, AlertKind, Alerts};
pub use buffer::TextBuffer;
pub use config::Config;
pub use context::{AppContext, TerminateReply};
pub use cursor::{Cursor, Position, Selection};
pub use document::{default_content, window_title, Document, DocumentId, Timestamp};
pub use editor::{Editor, Metadata};
pub use error::{LudditeError, Result, StoreError};
pub use outline::{Header, OutlineIndex, OutlineRow};
pub use preview::{navigation_policy, wrap_html, Navigation, Renderer, NOTHING_TO_SHOW};
pub use session::{plan, Event, Mode, Session, SessionState, Transition};
pub use sidebar::Sidebar;
pub use stats::{StatsTracker, TextStats};
pub use store::{
    sort_newest_first, ChangeCallback, ChangeNotifier, DocumentStore, MemoryStore, Subscription,
};
pub use syntax::{scan, Appearance, MarkupHighlighter, SpanClass, StyleMap, StyledSpan, Theme};
pub use worker::{Job, JobOutput, JobResult, Worker};
