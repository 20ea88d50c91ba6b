//! Relation population for list and detail responses

use crate::core::{ApiError, ApiResult, DataService, FieldValue, FilterClause, Populate, StoreQuery};
use crate::entities::{Bootcamp, Course};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Ids found under `key` in each record
fn referenced_ids(records: &[Value], key: &str) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = records
        .iter()
        .filter_map(|r| r.get(key)?.as_str()?.parse().ok())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

fn serialize_error(what: &str, e: serde_json::Error) -> ApiError {
    ApiError::internal(format!("serialize {}: {}", what, e))
}

/// Embeds each bootcamp's courses under `courses`
pub struct CoursesOf {
    courses: Arc<dyn DataService<Course>>,
}

impl CoursesOf {
    pub fn new(courses: Arc<dyn DataService<Course>>) -> Self {
        Self { courses }
    }
}

#[async_trait]
impl Populate for CoursesOf {
    fn path(&self) -> &'static str {
        "courses"
    }

    async fn populate(&self, records: &mut [Value]) -> ApiResult<()> {
        let ids = referenced_ids(records, "id");
        if ids.is_empty() {
            return Ok(());
        }

        let filter = FilterClause::any_of("bootcamp", ids.into_iter().map(FieldValue::from).collect());
        let courses = self.courses.find(&StoreQuery::filtered(vec![filter])).await?;

        let mut by_bootcamp: HashMap<Uuid, Vec<Value>> = HashMap::new();
        for course in courses {
            let value = serde_json::to_value(&course).map_err(|e| serialize_error("course", e))?;
            by_bootcamp.entry(course.bootcamp).or_default().push(value);
        }

        for record in records.iter_mut() {
            let id = record.get("id").and_then(Value::as_str).and_then(|s| s.parse::<Uuid>().ok());
            if let (Some(id), Some(object)) = (id, record.as_object_mut()) {
                let courses = by_bootcamp.remove(&id).unwrap_or_default();
                object.insert("courses".to_string(), Value::Array(courses));
            }
        }
        Ok(())
    }
}

/// Replaces the `bootcamp` reference with `{id, name, description}`
pub struct BootcampSummary {
    bootcamps: Arc<dyn DataService<Bootcamp>>,
}

impl BootcampSummary {
    pub fn new(bootcamps: Arc<dyn DataService<Bootcamp>>) -> Self {
        Self { bootcamps }
    }
}

#[async_trait]
impl Populate for BootcampSummary {
    fn path(&self) -> &'static str {
        "bootcamp"
    }

    async fn populate(&self, records: &mut [Value]) -> ApiResult<()> {
        let ids = referenced_ids(records, "bootcamp");
        if ids.is_empty() {
            return Ok(());
        }

        let filter = FilterClause::any_of("id", ids.into_iter().map(FieldValue::from).collect());
        let summaries: HashMap<Uuid, Value> = self
            .bootcamps
            .find(&StoreQuery::filtered(vec![filter]))
            .await?
            .into_iter()
            .map(|b| {
                let summary = json!({ "id": b.id, "name": b.name, "description": b.description });
                (b.id, summary)
            })
            .collect();

        for record in records.iter_mut() {
            let Some(object) = record.as_object_mut() else {
                continue;
            };
            let summary = object
                .get("bootcamp")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<Uuid>().ok())
                .and_then(|id| summaries.get(&id).cloned())
                .unwrap_or(Value::Null);
            object.insert("bootcamp".to_string(), summary);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::bootcamp::model::{CreateBootcamp, Location};
    use crate::entities::course::model::MinimumSkill;
    use crate::outbound::GeoLocation;
    use crate::storage::InMemoryDataService;
    use chrono::Utc;

    fn bootcamp(name: &str) -> Bootcamp {
        let body: CreateBootcamp = serde_json::from_value(json!({
            "name": name, "description": "d", "address": "a", "careers": ["Other"]
        }))
        .unwrap();
        let location: Location = GeoLocation::point(1.0, 2.0).into();
        body.into_bootcamp(Uuid::new_v4(), location)
    }

    fn course(bootcamp: Uuid, title: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "d".to_string(),
            weeks: 8,
            tuition: 1000.0,
            minimum_skill: MinimumSkill::Beginner,
            scholarship_available: false,
            bootcamp,
            user: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_courses_are_embedded_per_bootcamp() {
        let courses = Arc::new(InMemoryDataService::<Course>::new());
        let (a, b) = (bootcamp("A"), bootcamp("B"));
        courses.create(course(a.id, "one")).await.unwrap();
        courses.create(course(a.id, "two")).await.unwrap();

        let mut records = vec![serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap()];
        CoursesOf::new(courses).populate(&mut records).await.unwrap();

        assert_eq!(records[0]["courses"].as_array().unwrap().len(), 2);
        assert_eq!(records[0]["courses"][0]["title"], "one");
        assert_eq!(records[1]["courses"], json!([]));
    }

    #[tokio::test]
    async fn test_bootcamp_reference_becomes_summary() {
        let bootcamps = Arc::new(InMemoryDataService::<Bootcamp>::new());
        let a = bootcamps.create(bootcamp("Devworks")).await.unwrap();

        let mut records = vec![
            serde_json::to_value(course(a.id, "one")).unwrap(),
            serde_json::to_value(course(Uuid::new_v4(), "orphan")).unwrap(),
        ];
        BootcampSummary::new(bootcamps).populate(&mut records).await.unwrap();

        assert_eq!(
            records[0]["bootcamp"],
            json!({ "id": a.id, "name": "Devworks", "description": "d" })
        );
        assert_eq!(records[1]["bootcamp"], Value::Null);
    }
}
