//! Entity traits defining the core abstraction for all stored records

use crate::core::field::FieldValue;
use serde::Serialize;
use uuid::Uuid;

/// Base trait for all records kept in a store.
///
/// Every record has a UUID v4 `id`; `createdAt` is exposed through
/// [`Data::field_value`] as the default sort key.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "bootcamps", "courses")
    fn resource_name() -> &'static str;

    /// Name used in client-facing messages ("Bootcamp not found ...")
    fn display_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;
}

/// A value that must be unique across one index of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    /// Index name, reported back in duplicate-key errors
    pub index: &'static str,
    /// Normalized key value
    pub value: String,
}

impl UniqueKey {
    pub fn new(index: &'static str, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
        }
    }
}

/// Trait for concrete domain records that can be queried and serialized.
///
/// `field_value` is the only way the query layer reads a record: filters,
/// sort keys and comparisons all go through it, so a field that is not
/// exposed here cannot be queried.
pub trait Data: Entity + Serialize {
    /// Get the value of a field by its wire name (dotted paths for nested fields)
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Unique indexes this record participates in
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}
