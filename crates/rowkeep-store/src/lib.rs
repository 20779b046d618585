// ABOUTME: Persistence layer for rowkeep, owning all file I/O for delimited tables.
// ABOUTME: Provides the table store, atomic whole-file rewrite, and advisory write locking.

pub mod atomic;
pub mod lock;
pub mod options;
pub mod table;

pub use atomic::replace_file;
pub use lock::TableLock;
pub use options::{HeaderPolicy, StoreOptions};
pub use table::{EnsureOutcome, StoreError, TableStore};
