//! Run SQL against an embedded SQLite database and track which rows each
//! statement touched, with a confirm step in front of DELETE and DROP.

pub mod chapters;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod pending;
pub mod render;
pub mod repl;
pub mod router;
pub mod session;
pub mod store;

pub use engine::{Database, SqliteDatabase};
pub use error::PlaygroundError;
pub use model::{Cell, ExecutionResult, HighlightKind, ResultSet, Row, RowId, RowImpact, RowImpactMap};
pub use pending::{GuardOutcome, PendingAction};
pub use router::execute;
pub use session::Session;
pub use store::{MemoryStateStore, SledStateStore, StateStore};
