//! Concurrent record tables.

use crate::DbError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An arena of records keyed by id.
///
/// Reads hand out clones so no lock is held across caller code. Writers
/// that need read-modify-write semantics go through [`Table::update`],
/// which runs the closure under the table's write lock.
pub struct Table<K, V> {
    name: &'static str,
    rows: RwLock<HashMap<K, V>>,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    /// Create an empty table.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Table name, used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fetch a copy of a record.
    pub fn get(&self, key: &K) -> Option<V> {
        self.rows.read().get(key).cloned()
    }

    /// Insert or replace a record, returning the previous one.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.rows.write().insert(key, value)
    }

    /// Insert a record whose key must not exist yet.
    pub fn insert_new(&self, key: K, value: V) -> Result<(), DbError> {
        let mut rows = self.rows.write();
        if rows.contains_key(&key) {
            return Err(DbError::Duplicate {
                table: self.name,
                key: key.to_string(),
            });
        }
        rows.insert(key, value);
        Ok(())
    }

    /// Remove a record, returning it if it existed.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.rows.write().remove(key)
    }

    /// Atomically read-modify-write a single record.
    ///
    /// Returns `Ok(None)` if the key is missing. If the closure fails, its
    /// error is returned and whatever it did to the record is discarded.
    pub fn update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Result<Option<R>, E> {
        let mut rows = self.rows.write();
        let Some(row) = rows.get_mut(key) else {
            return Ok(None);
        };
        let mut draft = row.clone();
        let out = f(&mut draft)?;
        *row = draft;
        Ok(Some(out))
    }

    /// All records matching a predicate.
    pub fn filter(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.rows
            .read()
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect()
    }

    /// Copy of every row, for snapshots.
    pub fn rows(&self) -> Vec<(K, V)> {
        self.rows
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl<K, V> fmt::Debug for Table<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("rows", &self.rows.read().len())
            .finish()
    }
}
