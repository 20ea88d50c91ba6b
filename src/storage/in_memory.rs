//! In-memory implementation of DataService

use crate::core::error::{ApiError, ApiResult, ValidationError};
use crate::core::query::{FilterClause, SortKey, StoreQuery};
use crate::core::service::{DataService, Insert};
use crate::core::{Data, Entity};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory collection of one record type
///
/// Records keep insertion order. Uniqueness checks and writes happen under
/// the same write lock, so concurrent writers cannot both claim a key.
#[derive(Clone)]
pub struct InMemoryDataService<T> {
    records: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T> InMemoryDataService<T> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
        }
    }
}

impl<T> Default for InMemoryDataService<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(resource: &str, e: impl std::fmt::Display) -> ApiError {
    ApiError::internal(format!("failed to acquire {} lock: {}", resource, e))
}

/// Reject `candidate` if any other record already holds one of its unique keys
fn check_unique<T: Data>(records: &IndexMap<Uuid, T>, candidate: &T) -> ApiResult<()> {
    let keys = candidate.unique_keys();
    if keys.is_empty() {
        return Ok(());
    }
    for existing in records.values().filter(|r| r.id() != candidate.id()) {
        for taken in existing.unique_keys() {
            if let Some(clash) = keys.iter().find(|k| **k == taken) {
                return Err(ValidationError::DuplicateKey {
                    field: clash.index.to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn matches_all<T: Data>(filters: &[FilterClause], record: &T) -> bool {
    filters.iter().all(|clause| clause.matches(record))
}

#[async_trait]
impl<T: Data> DataService<T> for InMemoryDataService<T> {
    async fn create(&self, entity: T) -> ApiResult<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        check_unique(&records, &entity)?;
        records.insert(entity.id(), entity.clone());

        Ok(entity)
    }

    async fn create_unless(&self, entity: T, conflict: Vec<FilterClause>) -> ApiResult<Insert<T>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        if !conflict.is_empty() {
            if let Some(existing) = records.values().find(|r| matches_all(&conflict, *r)) {
                return Ok(Insert::Conflict(existing.clone()));
            }
        }

        check_unique(&records, &entity)?;
        records.insert(entity.id(), entity.clone());

        Ok(Insert::Created(entity))
    }

    async fn get(&self, id: &Uuid) -> ApiResult<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        Ok(records.get(id).cloned())
    }

    async fn find(&self, query: &StoreQuery) -> ApiResult<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        let mut matched: Vec<&T> = records
            .values()
            .filter(|r| query.matches(*r))
            .collect();
        sort_records(&mut matched, &query.sort);

        let window = matched.into_iter().skip(query.skip);
        let page: Vec<T> = match query.limit {
            Some(limit) => window.take(limit).cloned().collect(),
            None => window.cloned().collect(),
        };

        Ok(page)
    }

    async fn find_one(&self, filters: &[FilterClause]) -> ApiResult<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        Ok(records.values().find(|r| matches_all(filters, *r)).cloned())
    }

    async fn count(&self, filters: &[FilterClause]) -> ApiResult<usize> {
        let records = self
            .records
            .read()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        Ok(records.values().filter(|r| matches_all(filters, *r)).count())
    }

    async fn update(&self, id: &Uuid, entity: T) -> ApiResult<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        if !records.contains_key(id) {
            return Err(ApiError::not_found(T::display_name(), id));
        }
        check_unique(&records, &entity)?;
        records.insert(*id, entity.clone());

        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> ApiResult<Option<T>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        Ok(records.shift_remove(id))
    }

    async fn delete_where(&self, filters: &[FilterClause]) -> ApiResult<usize> {
        let mut records = self
            .records
            .write()
            .map_err(|e| lock_error(T::resource_name(), e))?;

        let before = records.len();
        records.retain(|_, r| !matches_all(filters, r));

        Ok(before - records.len())
    }
}

/// Stable sort, so equal keys keep insertion order
fn sort_records<T: Data>(records: &mut [&T], keys: &[SortKey]) {
    if !keys.is_empty() {
        records.sort_by(|a, b| SortKey::compare_records(keys, *a, *b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::UniqueKey;
    use crate::core::field::FieldValue;
    use chrono::{DateTime, Duration, Utc};
    use serde::Serialize;

    #[derive(Clone, Debug, Serialize, PartialEq)]
    struct Note {
        id: Uuid,
        owner: Uuid,
        title: String,
        stars: i64,
        created_at: DateTime<Utc>,
    }

    impl Entity for Note {
        fn resource_name() -> &'static str {
            "notes"
        }
        fn display_name() -> &'static str {
            "Note"
        }
        fn id(&self) -> Uuid {
            self.id
        }
    }

    impl Data for Note {
        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "owner" => Some(self.owner.into()),
                "title" => Some(self.title.clone().into()),
                "stars" => Some(self.stars.into()),
                "createdAt" => Some(self.created_at.into()),
                _ => None,
            }
        }

        fn unique_keys(&self) -> Vec<UniqueKey> {
            vec![UniqueKey::new("title", self.title.clone())]
        }
    }

    fn note(owner: Uuid, title: &str, stars: i64, age_minutes: i64) -> Note {
        Note {
            id: Uuid::new_v4(),
            owner,
            title: title.to_string(),
            stars,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = InMemoryDataService::<Note>::new();
        let created = service.create(note(Uuid::new_v4(), "a", 1, 0)).await.unwrap();
        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_unique_key_is_enforced() {
        let service = InMemoryDataService::<Note>::new();
        service.create(note(Uuid::new_v4(), "same", 1, 0)).await.unwrap();
        let err = service
            .create(note(Uuid::new_v4(), "same", 2, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::DuplicateKey { ref field }) if field == "title"
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_own_key_but_rejects_others() {
        let service = InMemoryDataService::<Note>::new();
        let a = service.create(note(Uuid::new_v4(), "a", 1, 0)).await.unwrap();
        service.create(note(Uuid::new_v4(), "b", 1, 0)).await.unwrap();

        let mut same = a.clone();
        same.stars = 5;
        assert_eq!(service.update(&a.id, same).await.unwrap().stars, 5);

        let mut clash = a.clone();
        clash.title = "b".into();
        assert!(service.update(&a.id, clash).await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = InMemoryDataService::<Note>::new();
        let n = note(Uuid::new_v4(), "ghost", 1, 0);
        let err = service.update(&n.id, n.clone()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_filters_sorts_and_windows() {
        let service = InMemoryDataService::<Note>::new();
        let owner = Uuid::new_v4();
        for (i, stars) in [3, 1, 2, 5].iter().enumerate() {
            service
                .create(note(owner, &format!("n{}", i), *stars, i as i64))
                .await
                .unwrap();
        }
        service.create(note(Uuid::new_v4(), "other", 4, 0)).await.unwrap();

        let query = StoreQuery {
            filters: vec![FilterClause::eq("owner", owner)],
            sort: vec![SortKey::desc("stars")],
            skip: 1,
            limit: Some(2),
        };
        let page = service.find(&query).await.unwrap();
        let stars: Vec<i64> = page.iter().map(|n| n.stars).collect();
        assert_eq!(stars, vec![3, 2]);

        assert_eq!(service.count(&query.filters).await.unwrap(), 4);
        assert_eq!(service.count(&[]).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let service = InMemoryDataService::<Note>::new();
        for title in ["x", "y", "z"] {
            service.create(note(Uuid::new_v4(), title, 0, 0)).await.unwrap();
        }
        let titles: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_create_unless_reports_conflict() {
        let service = InMemoryDataService::<Note>::new();
        let owner = Uuid::new_v4();
        let first = note(owner, "first", 0, 0);
        let conflict = vec![FilterClause::eq("owner", owner)];

        let inserted = service
            .create_unless(first.clone(), conflict.clone())
            .await
            .unwrap();
        assert_eq!(inserted, Insert::Created(first.clone()));

        let second = service
            .create_unless(note(owner, "second", 0, 0), conflict)
            .await
            .unwrap();
        assert_eq!(second, Insert::Conflict(first));
        assert_eq!(service.count(&[]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_unless_without_conditions_always_inserts() {
        let service = InMemoryDataService::<Note>::new();
        service.create(note(Uuid::new_v4(), "existing", 0, 0)).await.unwrap();

        let fresh = note(Uuid::new_v4(), "fresh", 0, 0);
        let inserted = service.create_unless(fresh.clone(), Vec::new()).await.unwrap();
        assert_eq!(inserted, Insert::Created(fresh));
        assert_eq!(service.count(&[]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_and_delete_where() {
        let service = InMemoryDataService::<Note>::new();
        let owner = Uuid::new_v4();
        let a = service.create(note(owner, "a", 0, 0)).await.unwrap();
        service.create(note(owner, "b", 0, 0)).await.unwrap();
        service.create(note(Uuid::new_v4(), "c", 0, 0)).await.unwrap();

        assert_eq!(service.delete(&a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(service.delete(&a.id).await.unwrap(), None);

        let removed = service
            .delete_where(&[FilterClause::eq("owner", owner)])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(service.count(&[]).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_creates_admit_one() {
        let service = InMemoryDataService::<Note>::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.create(note(Uuid::new_v4(), "race", 0, 0)).await
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(service.count(&[]).await.unwrap(), 1);
    }
}
