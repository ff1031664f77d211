//! Reversible, mount-aware fake trash.
//!
//! - [`mount`]: which filesystem a path belongs to
//! - [`journal`]: the per-mount `trashdata.json` record
//! - [`store`]: move, restore, purge and list operations
//! - [`batch`]: aggregated outcome of multi-file operations

pub mod batch;
pub mod journal;
pub mod mount;
pub mod store;

pub use batch::{BatchKind, BatchResult};
pub use journal::{Journal, JournalError, TrashEntry, DELETION_DATE_FORMAT, JOURNAL_FILE_NAME};
pub use mount::{FixedMountResolver, MountResolver, SystemMountResolver};
pub use store::{TrashError, TrashStore, APP_NAME};
