//! Store trait for typed record collections

use crate::core::Data;
use crate::core::error::ApiResult;
use crate::core::query::{FilterClause, StoreQuery};
use async_trait::async_trait;
use uuid::Uuid;

/// Outcome of a conditional insert
#[derive(Debug, Clone, PartialEq)]
pub enum Insert<T> {
    /// The record was stored
    Created(T),
    /// A record matching the conflict filters already exists
    Conflict(T),
}

/// Service trait for managing one collection of records
///
/// Implementations enforce the unique indexes reported by
/// [`Data::unique_keys`] atomically: of two racing writes with the same key,
/// exactly one succeeds and the other gets a duplicate-key validation error.
#[async_trait]
pub trait DataService<T: Data>: Send + Sync {
    /// Create a new record
    async fn create(&self, entity: T) -> ApiResult<T>;

    /// Create a record unless one already matches all `conflict` filters.
    ///
    /// An empty `conflict` list places no condition on the insert.
    /// The check and the insert happen under one write lock.
    async fn create_unless(&self, entity: T, conflict: Vec<FilterClause>) -> ApiResult<Insert<T>>;

    /// Get a record by ID
    async fn get(&self, id: &Uuid) -> ApiResult<Option<T>>;

    /// Filter, sort and window the collection
    async fn find(&self, query: &StoreQuery) -> ApiResult<Vec<T>>;

    /// First record matching the filters, in insertion order
    async fn find_one(&self, filters: &[FilterClause]) -> ApiResult<Option<T>>;

    /// Count records matching the filters (all records for an empty slice)
    async fn count(&self, filters: &[FilterClause]) -> ApiResult<usize>;

    /// Replace an existing record; not-found if absent
    async fn update(&self, id: &Uuid, entity: T) -> ApiResult<T>;

    /// Delete a record, returning it if it existed
    async fn delete(&self, id: &Uuid) -> ApiResult<Option<T>>;

    /// Delete every record matching the filters, returning how many went
    async fn delete_where(&self, filters: &[FilterClause]) -> ApiResult<usize>;

    /// All records, in insertion order
    async fn list(&self) -> ApiResult<Vec<T>> {
        self.find(&StoreQuery::default()).await
    }
}
