//! Abstraction over the managed backend consumed by the services.
//!
//! The real service is remote; everything the core needs from it is behind
//! [`FinanceBackend`] so tests and tools can swap in local implementations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use contas_domain::{Category, Transaction, TransactionKind};

use crate::{error::CoreError, filter::TransactionFilter};

/// A fetched transaction row joined with its category's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub transaction: Transaction,
    pub category_name: Option<String>,
}

impl TransactionRecord {
    pub fn new(transaction: Transaction, category_name: Option<String>) -> Self {
        Self {
            transaction,
            category_name,
        }
    }
}

/// Field set for a transaction row about to be written.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub receipt_path: Option<String>,
}

/// Tables the backend exposes change signals for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Transactions,
    Categories,
}

/// Callback receiving an opaque "something changed" signal for a table.
/// No ordering or payload is guaranteed; the receiver decides whether and
/// when to re-fetch.
pub type ChangeListener = Box<dyn Fn(Table) + Send + Sync>;

/// Handle identifying one registered change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The backend surface: relational reads and writes with an optional
/// category-name join, object storage for receipts, per-table change
/// signals, and the current identity.
pub trait FinanceBackend: Send + Sync {
    /// Returns up to `filter.limit` matching rows, most recent first.
    fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRecord>, CoreError>;

    fn list_categories(&self) -> Result<Vec<Category>, CoreError>;

    fn insert_transaction(&self, fields: NewTransaction) -> Result<Uuid, CoreError>;

    fn insert_category(&self, name: &str) -> Result<Uuid, CoreError>;

    /// Removes a category. Referencing transactions stay in place and
    /// become uncategorized through the backend relationship.
    fn delete_category(&self, id: Uuid) -> Result<(), CoreError>;

    /// Stores receipt bytes under a per-user path and returns that path.
    fn upload_receipt(
        &self,
        user_id: Uuid,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, CoreError>;

    fn subscribe(&self, table: Table, listener: ChangeListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);

    fn current_user(&self) -> Option<Uuid>;
}
