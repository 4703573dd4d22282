//! Shared traits for entities handled across the crate boundary.

use uuid::Uuid;

/// Exposes a stable identifier for persisted entities.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}
