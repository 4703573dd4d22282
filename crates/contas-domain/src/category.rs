//! Domain types for transaction categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// A flat, user-defined label for grouping transactions. Name uniqueness is
/// not enforced. Transactions hold a weak reference: deleting a category
/// leaves them in place, uncategorized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}
