//! In-process record store for TurboCommerce.
//!
//! Provides the storage primitives the commerce services are built on:
//!
//! - [`Table`]: a concurrent arena of records keyed by id, with atomic
//!   per-row read-modify-write.
//! - [`KeyedLocks`]: one mutex per key (e.g. per customer), so work for
//!   different keys never contends.
//! - [`Transaction`]: a unit of work that records compensating actions and
//!   runs them in reverse if it is dropped without being committed.
//!
//! # Example
//!
//! ```rust
//! use turbo_db::{Table, Transaction};
//! use std::sync::Arc;
//!
//! let stock: Arc<Table<String, i64>> = Arc::new(Table::new("stock"));
//! stock.insert("SKU-1".to_string(), 10);
//!
//! let mut tx = Transaction::begin("reserve");
//! stock
//!     .update(&"SKU-1".to_string(), |qty| {
//!         *qty -= 3;
//!         Ok::<_, ()>(())
//!     })
//!     .unwrap();
//! let undo = Arc::clone(&stock);
//! tx.on_rollback("restock SKU-1", move || {
//!     let _ = undo.update(&"SKU-1".to_string(), |qty| {
//!         *qty += 3;
//!         Ok::<_, ()>(())
//!     });
//! });
//! drop(tx); // never committed: the decrement is compensated
//!
//! assert_eq!(stock.get(&"SKU-1".to_string()), Some(10));
//! ```

mod error;
mod locks;
mod table;
mod transaction;

pub use error::DbError;
pub use locks::{KeyGuard, KeyedLocks};
pub use table::Table;
pub use transaction::Transaction;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{DbError, KeyGuard, KeyedLocks, Table, Transaction};
}
