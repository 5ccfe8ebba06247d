//! Shared transaction state for document-backed repositories.

use std::sync::{Mutex, MutexGuard};

use crate::ports::{TransactionMode, UnitOfWorkError, UnitOfWorkResult, WriteOp};

/// Open-transaction marker plus, in staged mode, its buffered writes.
///
/// One slot is shared by the unit of work and every repository it hands out.
/// Forked units of work get a fresh slot.
#[derive(Debug, Default)]
pub struct TransactionSlot {
    mode: TransactionMode,
    state: Mutex<Option<Vec<WriteOp>>>,
}

impl TransactionSlot {
    /// Creates a closed slot operating in `mode`.
    #[must_use]
    pub fn new(mode: TransactionMode) -> Self {
        Self {
            mode,
            state: Mutex::new(None),
        }
    }

    /// Returns the configured transaction mode.
    #[must_use]
    pub const fn mode(&self) -> TransactionMode {
        self.mode
    }

    fn lock(&self) -> UnitOfWorkResult<MutexGuard<'_, Option<Vec<WriteOp>>>> {
        self.state
            .lock()
            .map_err(|err| UnitOfWorkError::StatePoisoned(err.to_string()))
    }

    /// Opens the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::TransactionInProgress`] when already open.
    pub fn begin(&self) -> UnitOfWorkResult<()> {
        let mut state = self.lock()?;
        if state.is_some() {
            return Err(UnitOfWorkError::TransactionInProgress);
        }
        *state = Some(Vec::new());
        Ok(())
    }

    /// Returns `true` while a transaction is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().is_ok_and(|state| state.is_some())
    }

    /// Buffers `write` when a staged transaction is open.
    ///
    /// Returns the write back when it must go straight to the store instead.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::StatePoisoned`] when the state lock is
    /// poisoned.
    pub fn stage(&self, write: WriteOp) -> UnitOfWorkResult<Option<WriteOp>> {
        if self.mode == TransactionMode::Immediate {
            return Ok(Some(write));
        }
        let mut state = self.lock()?;
        match state.as_mut() {
            Some(buffer) => {
                buffer.push(write);
                Ok(None)
            }
            None => Ok(Some(write)),
        }
    }

    /// Closes the transaction and returns its buffered writes.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::NoTransaction`] when none is open.
    pub fn take(&self) -> UnitOfWorkResult<Vec<WriteOp>> {
        self.lock()?.take().ok_or(UnitOfWorkError::NoTransaction)
    }

    /// Closes the transaction, dropping its buffered writes, and reports how
    /// many were dropped. Returns `None` when no transaction was open.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::StatePoisoned`] when the state lock is
    /// poisoned.
    pub fn discard(&self) -> UnitOfWorkResult<Option<usize>> {
        Ok(self.lock()?.take().map(|buffer| buffer.len()))
    }
}
