//! # DevCamper
//!
//! REST backend for a bootcamp directory: bootcamps, their courses and
//! reviews, and the users who publish and review them.
//!
//! ## Features
//!
//! - **Advanced results**: every list endpoint accepts typed filters
//!   (`averageCost[lte]=10000`, `careers[in]=Business,UI/UX`), `select`,
//!   `sort`, `page` and `limit`, checked against a per-resource allow-list
//! - **Token auth**: HS256 bearer tokens (optionally a `token` cookie) with
//!   `user`, `publisher` and `admin` roles plus ownership checks
//! - **Store-enforced uniqueness**: emails, bootcamp names, one review per
//!   user per bootcamp, one bootcamp per publisher
//! - **Replaceable collaborators**: mailer, geocoder and blob writer are
//!   traits with production and in-memory implementations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use devcamper::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load()?;
//!     ServerBuilder::new().with_config(config).serve().await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod entities;
pub mod outbound;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AdvancedResults, ApiError, ApiResult, Data, DataService, Entity, FieldKind, FieldValue,
        FilterClause, ListQuery, ListSettings, Pagination, Populate, Principal, QuerySchema, Role,
        SortKey, StoreQuery, TotalScope, ValidationError, advanced_results,
    };

    // === Resources ===
    pub use crate::entities::{Bootcamp, Course, Review, User};

    // === Auth ===
    pub use crate::auth::{CurrentUser, TokenIssuer};

    // === Collaborators ===
    pub use crate::outbound::{BlobWriter, GeoLocation, Geocoder, MailMessage, Mailer};

    // === Storage ===
    pub use crate::storage::InMemoryDataService;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, EntityDescriptor, EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
