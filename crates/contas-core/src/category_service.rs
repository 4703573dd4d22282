//! Business logic helpers for category management.

use uuid::Uuid;

use contas_domain::{Category, NamedEntity};

use crate::{backend::FinanceBackend, error::CoreError};

/// Provides validated operations over the flat category list.
pub struct CategoryService;

impl CategoryService {
    /// Returns all categories ordered alphabetically by name,
    /// case-insensitively.
    pub fn list(backend: &dyn FinanceBackend) -> Result<Vec<Category>, CoreError> {
        let mut categories = backend.list_categories()?;
        categories.sort_by_key(|category| category.name().to_lowercase());
        Ok(categories)
    }

    /// Creates a category from raw form input. The name is trimmed; an
    /// empty result is rejected. Duplicate names are allowed.
    pub fn create(backend: &dyn FinanceBackend, name: &str) -> Result<Uuid, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidName("category name is required".into()));
        }
        backend.insert_category(trimmed)
    }

    /// Deletes a category. Transactions that referenced it stay in place
    /// and present as uncategorized. Destructive; callers gate this behind
    /// an explicit confirmation.
    pub fn delete(backend: &dyn FinanceBackend, id: Uuid) -> Result<(), CoreError> {
        backend.delete_category(id)
    }
}
