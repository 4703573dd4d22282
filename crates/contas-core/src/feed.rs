//! Snapshot handling for fetched transaction lists.
//!
//! Every fetch result is a full, independent snapshot that replaces the
//! displayed list wholesale. Fetches triggered by change signals race only
//! with user-triggered fetches of the same kind, so it is enough to drop a
//! completion that an even newer fetch has already superseded; two
//! snapshots are never blended.

use std::sync::Mutex;

use crate::{
    backend::{FinanceBackend, TransactionRecord},
    error::CoreError,
    filter::TransactionFilter,
};

/// Ticket identifying one fetch attempt. Monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Default)]
struct FeedState {
    issued: u64,
    installed: u64,
    snapshot: Vec<TransactionRecord>,
}

/// Holds the most recent complete snapshot.
#[derive(Debug, Default)]
pub struct TransactionFeed {
    state: Mutex<FeedState>,
}

impl TransactionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a ticket for a fetch that is about to start.
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut state = self.state.lock().unwrap();
        state.issued += 1;
        FetchTicket(state.issued)
    }

    /// Installs a completed fetch. Returns `false` when a newer snapshot is
    /// already displayed, in which case `rows` are discarded.
    pub fn install(&self, ticket: FetchTicket, rows: Vec<TransactionRecord>) -> bool {
        let mut state = self.state.lock().unwrap();
        if ticket.0 <= state.installed {
            return false;
        }
        state.installed = ticket.0;
        state.snapshot = rows;
        true
    }

    /// Fetches a fresh snapshot through the backend and installs it unless
    /// it has been superseded meanwhile. Returns whether it was installed.
    pub fn refresh(
        &self,
        backend: &dyn FinanceBackend,
        filter: &TransactionFilter,
    ) -> Result<bool, CoreError> {
        let ticket = self.begin_fetch();
        let rows = backend.list_transactions(filter)?;
        Ok(self.install(ticket, rows))
    }

    /// The currently displayed snapshot.
    pub fn snapshot(&self) -> Vec<TransactionRecord> {
        self.state.lock().unwrap().snapshot.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
