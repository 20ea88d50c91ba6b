//! Shared test application: in-memory stores with recording collaborators
//! behind a real router.

#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use devcamper::config::AppConfig;
use devcamper::core::Role;
use devcamper::entities::User;
use devcamper::outbound::{FixedGeocoder, GeoLocation, MemoryBlobWriter, RecordingMailer};
use devcamper::server::{AppState, ServerBuilder};
use serde_json::{Value, json};
use std::sync::Arc;

pub const PASSWORD: &str = "123456";

pub fn api(path: &str) -> String {
    format!("/api/v1{}", path)
}

fn place(lat: f64, lon: f64, city: &str, state: &str, zipcode: &str) -> GeoLocation {
    let mut location = GeoLocation::point(lat, lon);
    location.formatted_address = format!("{}, {} {}, US", city, state, zipcode);
    location.city = Some(city.to_string());
    location.state = Some(state.to_string());
    location.zipcode = Some(zipcode.to_string());
    location.country = Some("US".to_string());
    location
}

/// Addresses the tests use; anything else is a no-match
pub fn geocoder() -> FixedGeocoder {
    let boston_university = place(42.3505, -71.1054, "Boston", "MA", "02215");
    let new_york = place(40.7506, -73.9971, "New York", "NY", "10001");
    let kingston = place(41.4816, -71.5265, "Kingston", "RI", "02881");
    FixedGeocoder::strict()
        .with("233 Bay State Rd Boston MA 02215", boston_university.clone())
        .with("02215", boston_university)
        .with("10001", new_york.clone())
        .with("220 Pawtucket St Lowell MA 10001", new_york)
        .with("45 Upper College Rd Kingston RI 02881", kingston)
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub blobs: Arc<MemoryBlobWriter>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, true)
    }

    /// Photos are written under `config.uploads.path` instead of memory
    pub fn with_disk_uploads(config: AppConfig) -> Self {
        Self::build(config, false)
    }

    fn build(mut config: AppConfig, memory_blobs: bool) -> Self {
        config.auth.jwt_secret = "test-secret".to_string();
        config.security.rate_limit.enabled = false;
        let mailer = Arc::new(RecordingMailer::new());
        let blobs = Arc::new(MemoryBlobWriter::new());

        let mut builder = ServerBuilder::new()
            .with_config(config)
            .with_mailer(mailer.clone())
            .with_geocoder(Arc::new(geocoder()));
        if memory_blobs {
            builder = builder.with_blob_writer(blobs.clone());
        }
        let (router, state) = builder.build_with_state().unwrap();

        Self {
            server: TestServer::new(router),
            state,
            mailer,
            blobs,
        }
    }

    /// Register through the API and return the issued token
    pub async fn register(&self, name: &str, email: &str, role: &str) -> String {
        let response = self
            .server
            .post(&api("/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": PASSWORD, "role": role }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["token"].as_str().unwrap().to_string()
    }

    pub async fn publisher(&self, email: &str) -> String {
        self.register("Publisher", email, "publisher").await
    }

    pub async fn user(&self, email: &str) -> String {
        self.register("Reviewer", email, "user").await
    }

    /// Admins can't self-register, so they are seeded in the store
    pub async fn admin(&self) -> String {
        let admin = User::new("Admin", "admin@devcamper.io", PASSWORD, Role::Admin).unwrap();
        let admin = self.state.users.create(admin).await.unwrap();
        self.state.tokens.issue(admin.id).unwrap()
    }

    pub async fn create_bootcamp(&self, token: &str, body: Value) -> Value {
        let response = self
            .server
            .post(&api("/bootcamps"))
            .authorization_bearer(token)
            .json(&body)
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    pub async fn add_course(&self, token: &str, bootcamp_id: &str, title: &str, tuition: f64) -> Value {
        let response = self
            .server
            .post(&api(&format!("/bootcamps/{}/courses", bootcamp_id)))
            .authorization_bearer(token)
            .json(&course_body(title, tuition))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    pub async fn add_review(&self, token: &str, bootcamp_id: &str, rating: u8) -> Value {
        let response = self
            .server
            .post(&api(&format!("/bootcamps/{}/reviews", bootcamp_id)))
            .authorization_bearer(token)
            .json(&json!({ "title": "Review", "text": "Worth it", "rating": rating }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    pub async fn get_bootcamp(&self, id: &str) -> Value {
        let response = self.server.get(&api(&format!("/bootcamps/{}", id))).await;
        response.assert_status_ok();
        response.json::<Value>()["data"].clone()
    }
}

pub fn bootcamp_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Full stack web development bootcamp",
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": "233 Bay State Rd Boston MA 02215",
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true
    })
}

pub fn course_body(title: &str, tuition: f64) -> Value {
    json!({
        "title": title,
        "description": "Learn the stack",
        "weeks": 8,
        "tuition": tuition,
        "minimumSkill": "beginner",
        "scholarshipAvailable": false
    })
}
