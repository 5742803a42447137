//! Units of work with compensating rollback.

use tracing::{debug, warn};

type Compensation = Box<dyn FnOnce() + Send>;

/// A unit of work spanning several independent writes.
///
/// Each write that succeeds registers how to undo itself. Calling
/// [`Transaction::commit`] forgets the undo log; dropping the transaction
/// any other way (early `?` return, panic, explicit
/// [`Transaction::rollback`]) runs the compensations newest-first.
///
/// Compensations must be inverse operations (e.g. "add 3 back to stock"),
/// not restored snapshots, so they stay correct when other writers touched
/// the same rows in the meantime.
pub struct Transaction {
    label: String,
    undo: Vec<(String, Compensation)>,
    finished: bool,
}

impl Transaction {
    /// Start a new unit of work.
    pub fn begin(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            undo: Vec::new(),
            finished: false,
        }
    }

    /// Register the compensation for a write that just succeeded.
    pub fn on_rollback(&mut self, step: impl Into<String>, f: impl FnOnce() + Send + 'static) {
        self.undo.push((step.into(), Box::new(f)));
    }

    /// Number of compensations that would run on rollback.
    pub fn pending(&self) -> usize {
        self.undo.len()
    }

    /// Make every registered write permanent.
    pub fn commit(mut self) {
        debug!(tx = %self.label, steps = self.undo.len(), "transaction committed");
        self.undo.clear();
        self.finished = true;
    }

    /// Undo every registered write now.
    pub fn rollback(mut self) {
        self.run_compensations();
    }

    fn run_compensations(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.undo.is_empty() {
            return;
        }
        warn!(tx = %self.label, steps = self.undo.len(), "rolling back transaction");
        while let Some((step, undo)) = self.undo.pop() {
            debug!(tx = %self.label, %step, "compensating");
            undo();
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.run_compensations();
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("label", &self.label)
            .field("pending", &self.undo.len())
            .finish()
    }
}
