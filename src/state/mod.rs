// State management module
// Owns the complaint collection and its SQLite and backup-file mirrors

pub mod db;
pub mod gateway;
pub mod models;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use db::{ComplaintDb, DbError};
pub use gateway::{ComplaintBackend, LoadSource, PersistenceError, PersistenceGateway};
pub use models::{Complaint, ComplaintStatus, IssueCategory};
pub use snapshot::{SnapshotError, SnapshotFile};
pub use store::{ComplaintStore, RestoreOutcome};
