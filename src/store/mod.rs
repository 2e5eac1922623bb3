//! Record storage for the roster collections.
//!
//! Every collection sits behind the `Repository` trait so the domain
//! modules never touch a concrete container. The only implementation
//! today is `MemoryRepository`, which keeps records in a map keyed by id.

pub mod memory;
pub mod seed;

pub use memory::MemoryRepository;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal lock error")]
    LockPoisoned,

    #[error("Export failed: {0}")]
    Export(String),
}

impl StoreError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

/// A storable entity with a numeric id assigned by the repository.
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity name used in errors and log fields.
    const ENTITY: &'static str;

    fn id(&self) -> u32;
    fn set_id(&mut self, id: u32);
}

/// Base repository operations for any record type.
///
/// `insert` assigns `max(existing) + 1` as the new id and stores the
/// record under the same lock, so concurrent inserts never share an id.
pub trait Repository<T: Record>: Send + Sync {
    /// All records ordered by id.
    fn list(&self) -> Result<Vec<T>, StoreError>;

    fn get(&self, id: u32) -> Result<Option<T>, StoreError>;

    /// Store a new record. Any id on the input is overwritten.
    fn insert(&self, record: T) -> Result<T, StoreError>;

    /// Mutate a record in place. The closure may reject the change, in
    /// which case the stored record is left untouched.
    fn modify(
        &self,
        id: u32,
        apply: &mut dyn FnMut(&mut T) -> Result<(), StoreError>,
    ) -> Result<T, StoreError>;

    fn delete(&self, id: u32) -> Result<T, StoreError>;

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }

    /// Linear scan. Collections are small enough that no index is kept.
    fn filter(&self, predicate: &dyn Fn(&T) -> bool) -> Result<Vec<T>, StoreError> {
        Ok(self.list()?.into_iter().filter(|r| predicate(r)).collect())
    }
}

/// Trimmed, non-empty string or `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the "missing required fields" validation error, or `Ok` when
/// nothing is missing.
pub(crate) fn require_fields(missing: Vec<&str>) -> Result<(), StoreError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}
