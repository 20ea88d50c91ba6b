//! Core module containing the query layer, store trait and shared types

pub mod auth;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod field;
pub mod pagination;
pub mod query;
pub mod results;
pub mod service;

pub use auth::{Principal, Role};
pub use entity::{Data, Entity, UniqueKey};
pub use error::{ApiError, ApiResult, ValidationError};
pub use field::{FieldKind, FieldValue};
pub use pagination::{Pagination, TotalScope};
pub use query::{FilterClause, ListQuery, QuerySchema, SortKey, StoreQuery};
pub use results::{AdvancedResults, ListSettings, Populate, advanced_results};
pub use service::{DataService, Insert};
