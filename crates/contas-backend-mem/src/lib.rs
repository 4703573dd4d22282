//! In-memory implementation of the backend surface.
//!
//! Stands in for the managed service during tests and local tooling:
//! relational rows with the category-name join, object storage for
//! receipts, per-table change signals, and a switchable identity. The
//! category/transaction relationship behaves like `ON DELETE SET NULL`,
//! so deleting a category leaves its transactions uncategorized.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use uuid::Uuid;

use contas_core::{
    backend::{
        ChangeListener, FinanceBackend, NewTransaction, SubscriptionId, Table, TransactionRecord,
    },
    clock::{Clock, SystemClock},
    error::CoreError,
    filter::TransactionFilter,
};
use contas_domain::{Category, Identifiable, Transaction};

type SharedListener = Arc<dyn Fn(Table) + Send + Sync>;

/// A stored receipt object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct Tables {
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    objects: HashMap<String, StoredObject>,
}

/// The in-memory backend. Cloneable handles are not needed; share it by
/// reference or wrap it in an `Arc` like any other [`FinanceBackend`].
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    listeners: Mutex<HashMap<u64, (Table, SharedListener)>>,
    next_subscription: AtomicU64,
    current_user: Mutex<Option<Uuid>>,
    fail_uploads: AtomicBool,
    clock: Box<dyn Clock>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Uses the supplied clock for object-storage keys, keeping receipt
    /// paths deterministic in tests.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            listeners: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
            current_user: Mutex::new(None),
            fail_uploads: AtomicBool::new(false),
            clock,
        }
    }

    /// Switches the resolved identity, as the auth collaborator would.
    pub fn sign_in(&self, user_id: Uuid) {
        *self.current_user.lock().unwrap() = Some(user_id);
    }

    pub fn sign_out(&self) {
        *self.current_user.lock().unwrap() = None;
    }

    /// Makes every subsequent upload fail, for exercising the best-effort
    /// receipt policy.
    pub fn set_upload_failure(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Looks up a stored receipt by the path `upload_receipt` returned.
    pub fn stored_receipt(&self, path: &str) -> Option<StoredObject> {
        self.tables.lock().unwrap().objects.get(path).cloned()
    }

    fn notify(&self, table: Table) {
        let targets: Vec<SharedListener> = {
            let listeners = self.listeners.lock().unwrap();
            listeners
                .values()
                .filter(|(watched, _)| *watched == table)
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        // Invoked outside the locks so a listener may re-fetch immediately.
        for listener in targets {
            listener(table);
        }
    }

    fn join_name(categories: &[Category], category_id: Option<Uuid>) -> Option<String> {
        category_id.and_then(|id| {
            categories
                .iter()
                .find(|category| category.id() == id)
                .map(|category| category.name.clone())
        })
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FinanceBackend for MemoryBackend {
    fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRecord>, CoreError> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<TransactionRecord> = tables
            .transactions
            .iter()
            .map(|txn| {
                TransactionRecord::new(
                    txn.clone(),
                    Self::join_name(&tables.categories, txn.category_id),
                )
            })
            .filter(|record| filter.matches(record))
            .collect();
        records.sort_by(|a, b| b.transaction.created_at.cmp(&a.transaction.created_at));
        records.truncate(filter.limit);
        Ok(records)
    }

    fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        let mut categories = self.tables.lock().unwrap().categories.clone();
        categories.sort_by_key(|category| category.name.to_lowercase());
        Ok(categories)
    }

    fn insert_transaction(&self, fields: NewTransaction) -> Result<Uuid, CoreError> {
        let mut txn = Transaction::new(fields.kind, fields.amount, fields.created_at);
        txn.category_id = fields.category_id;
        txn.description = fields.description;
        txn.receipt_path = fields.receipt_path;
        let id = txn.id;
        self.tables.lock().unwrap().transactions.push(txn);
        self.notify(Table::Transactions);
        Ok(id)
    }

    fn insert_category(&self, name: &str) -> Result<Uuid, CoreError> {
        let category = Category::new(name);
        let id = category.id;
        self.tables.lock().unwrap().categories.push(category);
        self.notify(Table::Categories);
        Ok(id)
    }

    fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
        let mut unlinked = false;
        let removed;
        {
            let mut tables = self.tables.lock().unwrap();
            let before = tables.categories.len();
            tables.categories.retain(|category| category.id != id);
            removed = tables.categories.len() < before;
            if removed {
                for txn in tables
                    .transactions
                    .iter_mut()
                    .filter(|txn| txn.category_id == Some(id))
                {
                    txn.category_id = None;
                    unlinked = true;
                }
            }
        }
        if removed {
            self.notify(Table::Categories);
        }
        if unlinked {
            // The relationship rewrote rows, so their change feed fires too.
            self.notify(Table::Transactions);
        }
        Ok(())
    }

    fn upload_receipt(
        &self,
        user_id: Uuid,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, CoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(CoreError::Upload("object store unavailable".into()));
        }
        let extension = content_type.strip_prefix("image/").unwrap_or("jpg");
        let path = format!("{}/{}.{}", user_id, self.clock.epoch_millis(), extension);
        self.tables.lock().unwrap().objects.insert(
            path.clone(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(path)
    }

    fn subscribe(&self, table: Table, listener: ChangeListener) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .unwrap()
            .insert(id, (table, Arc::from(listener)));
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().unwrap().remove(&id.0);
    }

    fn current_user(&self) -> Option<Uuid> {
        *self.current_user.lock().unwrap()
    }
}
