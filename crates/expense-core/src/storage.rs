use std::sync::Mutex;

use expense_domain::LedgerRow;

use crate::CoreError;

/// Append-only tabular ledger. Implementations own the rows; callers read a
/// full snapshot per request and never cache it.
pub trait LedgerStore: Send + Sync {
    fn read_all(&self) -> Result<Vec<LedgerRow>, CoreError>;

    /// Appends every row or none of them.
    fn append_all(&self, rows: Vec<LedgerRow>) -> Result<(), CoreError>;

    fn append(&self, row: LedgerRow) -> Result<(), CoreError> {
        self.append_all(vec![row])
    }
}

/// Process-local store, used by tests and as a scratch ledger.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    rows: Mutex<Vec<LedgerRow>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn read_all(&self) -> Result<Vec<LedgerRow>, CoreError> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .map_err(|_| CoreError::Persistence("ledger lock poisoned".into()))
    }

    fn append_all(&self, rows: Vec<LedgerRow>) -> Result<(), CoreError> {
        let mut guard = self
            .rows
            .lock()
            .map_err(|_| CoreError::Persistence("ledger lock poisoned".into()))?;
        guard.extend(rows);
        Ok(())
    }
}
