//! Advanced results: filtered, projected, sorted, populated and paginated lists
//!
//! [`advanced_results`] is what every list endpoint runs. It translates the
//! query string, counts the total according to the configured
//! [`TotalScope`], fetches one page, serializes it, applies the projection and
//! finally lets each [`Populate`] step embed related records.

use crate::core::entity::Data;
use crate::core::error::{ApiError, ApiResult};
use crate::core::pagination::{Pagination, TotalScope};
use crate::core::query::{ListQuery, PageLimits, QuerySchema};
use crate::core::service::DataService;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Response envelope of a paginated list
#[derive(Debug, Clone, Serialize)]
pub struct AdvancedResults {
    pub success: bool,
    /// Number of records in `data` (this page only)
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

/// Page-size bounds and total scope, taken from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSettings {
    pub limits: PageLimits,
    pub total_scope: TotalScope,
}

/// Embeds related records into serialized results
///
/// Population is configured per endpoint, never derived from the request.
#[async_trait]
pub trait Populate: Send + Sync {
    /// The top-level key this step writes
    fn path(&self) -> &'static str;

    /// Rewrite `records` in place
    async fn populate(&self, records: &mut [Value]) -> ApiResult<()>;
}

/// Run a list request against a collection
pub async fn advanced_results<T: Data>(
    service: &dyn DataService<T>,
    params: &IndexMap<String, String>,
    schema: &QuerySchema,
    settings: &ListSettings,
    populate: &[&dyn Populate],
) -> ApiResult<AdvancedResults> {
    let query = ListQuery::translate(params, schema, &settings.limits)?;

    let total = match settings.total_scope {
        TotalScope::Filtered => service.count(&query.filters).await?,
        TotalScope::Collection => service.count(&[]).await?,
    };

    let records = service.find(&query.page_query()).await?;

    let mut data = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::internal(format!("serialize {}: {}", schema.resource(), e)))?;

    if let Some(projection) = &query.projection {
        data = data.into_iter().map(|v| projection.apply(v)).collect();
    }

    for step in populate {
        let wanted = query
            .projection
            .as_ref()
            .is_none_or(|p| p.includes(step.path()));
        if wanted {
            step.populate(&mut data).await?;
        }
    }

    Ok(AdvancedResults {
        success: true,
        count: data.len(),
        pagination: Pagination::compute(&query.page, total),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;
    use crate::core::field::{FieldKind, FieldValue};
    use crate::storage::InMemoryDataService;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[derive(Clone, Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Camp {
        id: Uuid,
        name: String,
        housing: bool,
        created_at: DateTime<Utc>,
    }

    impl Entity for Camp {
        fn resource_name() -> &'static str {
            "camps"
        }
        fn display_name() -> &'static str {
            "Camp"
        }
        fn id(&self) -> Uuid {
            self.id
        }
    }

    impl Data for Camp {
        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.clone().into()),
                "housing" => Some(self.housing.into()),
                "createdAt" => Some(self.created_at.into()),
                _ => None,
            }
        }
    }

    fn schema() -> QuerySchema {
        QuerySchema::new("camps")
            .field("name", FieldKind::Text)
            .field("housing", FieldKind::Boolean)
            .selectable("tags")
    }

    /// Writes `tags` into every record and counts its runs
    #[derive(Default)]
    struct Tags {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl Populate for Tags {
        fn path(&self) -> &'static str {
            "tags"
        }

        async fn populate(&self, records: &mut [Value]) -> ApiResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            for record in records.iter_mut() {
                record["tags"] = json!(["t"]);
            }
            Ok(())
        }
    }

    async fn seeded() -> InMemoryDataService<Camp> {
        let service = InMemoryDataService::<Camp>::new();
        for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            service
                .create(Camp {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    housing: i % 2 == 0,
                    created_at: Utc::now() - Duration::minutes(i as i64),
                })
                .await
                .unwrap();
        }
        service
    }

    fn params(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn test_default_sort_is_newest_first() {
        let service = seeded().await;
        let results = advanced_results(&service, &params(&[]), &schema(), &ListSettings::default(), &[])
            .await
            .unwrap();
        assert!(results.success);
        assert_eq!(results.count, 5);
        let names: Vec<&str> = results.data.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(results.pagination, Pagination::default());
    }

    #[tokio::test]
    async fn test_page_window_and_links() {
        let service = seeded().await;
        let results = advanced_results(
            &service,
            &params(&[("sort", "name"), ("page", "2"), ("limit", "2")]),
            &schema(),
            &ListSettings::default(),
            &[],
        )
        .await
        .unwrap();
        let names: Vec<&str> = results.data.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["c", "d"]);
        let json = serde_json::to_value(&results.pagination).unwrap();
        assert_eq!(json, json!({ "next": { "page": 3, "limit": 2 }, "prev": { "page": 1, "limit": 2 } }));
    }

    #[tokio::test]
    async fn test_total_scope_decides_next_link() {
        let service = seeded().await;
        let query = params(&[("housing", "true"), ("limit", "3")]);

        let filtered = advanced_results(&service, &query, &schema(), &ListSettings::default(), &[])
            .await
            .unwrap();
        assert_eq!(filtered.count, 3);
        assert!(filtered.pagination.next.is_none());

        let settings = ListSettings {
            total_scope: TotalScope::Collection,
            ..ListSettings::default()
        };
        let collection = advanced_results(&service, &query, &schema(), &settings, &[])
            .await
            .unwrap();
        assert_eq!(collection.count, 3);
        assert!(collection.pagination.next.is_some());
    }

    #[tokio::test]
    async fn test_projection_and_population() {
        let service = seeded().await;
        let tags = Tags::default();

        let results = advanced_results(
            &service,
            &params(&[("select", "name")]),
            &schema(),
            &ListSettings::default(),
            &[&tags],
        )
        .await
        .unwrap();
        let keys: Vec<&String> = results.data[0].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(results.data[0].get("id").is_some());
        assert!(results.data[0].get("tags").is_none());
        assert_eq!(tags.runs.load(Ordering::SeqCst), 0);

        let results = advanced_results(&service, &params(&[]), &schema(), &ListSettings::default(), &[&tags])
            .await
            .unwrap();
        assert_eq!(results.data[0]["tags"], json!(["t"]));
        assert_eq!(tags.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let service = seeded().await;
        let err = advanced_results(
            &service,
            &params(&[("password", "x")]),
            &schema(),
            &ListSettings::default(),
            &[],
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
