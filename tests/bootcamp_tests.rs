//! Bootcamp CRUD, ownership, radius search and photo upload

mod harness;

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum_test::multipart::{MultipartForm, Part};
use devcamper::config::AppConfig;
use harness::{TestApp, api, bootcamp_body};
use serde_json::{Value, json};

#[tokio::test]
async fn test_publisher_creates_bootcamp() {
    let app = TestApp::new();
    let token = app.publisher("pub@example.com").await;

    let bootcamp = app.create_bootcamp(&token, bootcamp_body("Devworks Bootcamp")).await;
    assert_eq!(bootcamp["slug"], "devworks-bootcamp");
    assert_eq!(bootcamp["photo"], "no-photo.jpg");
    assert_eq!(bootcamp["location"]["type"], "Point");
    assert_eq!(bootcamp["location"]["coordinates"], json!([-71.1054, 42.3505]));
    assert_eq!(bootcamp["location"]["zipcode"], "02215");
    assert_eq!(bootcamp["careers"], json!(["Web Development", "UI/UX", "Business"]));
    assert!(bootcamp.get("address").is_none());
    assert!(bootcamp["averageCost"].is_null());

    let fetched = app.get_bootcamp(bootcamp["id"].as_str().unwrap()).await;
    assert_eq!(fetched["name"], "Devworks Bootcamp");
}

#[tokio::test]
async fn test_plain_user_cannot_create() {
    let app = TestApp::new();
    let token = app.user("user@example.com").await;

    let response = app
        .server
        .post(&api("/bootcamps"))
        .authorization_bearer(&token)
        .json(&bootcamp_body("Devworks"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        response.json::<Value>()["error"],
        "User role \"user\" is not authorized to access this route"
    );
}

#[tokio::test]
async fn test_one_bootcamp_per_publisher() {
    let app = TestApp::new();
    let token = app.publisher("pub@example.com").await;
    app.create_bootcamp(&token, bootcamp_body("First")).await;

    let response = app
        .server
        .post(&api("/bootcamps"))
        .authorization_bearer(&token)
        .json(&bootcamp_body("Second"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "ALREADY_PUBLISHED");
    assert!(body["error"].as_str().unwrap().ends_with("has already published a bootcamp"));

    let admin = app.admin().await;
    app.create_bootcamp(&admin, bootcamp_body("Admin One")).await;
    app.create_bootcamp(&admin, bootcamp_body("Admin Two")).await;
}

#[tokio::test]
async fn test_bootcamp_names_are_unique() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.create_bootcamp(&admin, bootcamp_body("Devworks")).await;

    let response = app
        .server
        .post(&api("/bootcamps"))
        .authorization_bearer(&admin)
        .json(&bootcamp_body("devworks"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "DUPLICATE_KEY");
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new();
    let token = app.publisher("pub@example.com").await;

    let mut body = bootcamp_body(&"x".repeat(51));
    body["careers"] = json!(["Juggling"]);
    let response = app
        .server
        .post(&api("/bootcamps"))
        .authorization_bearer(&token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_JSON");

    let body = bootcamp_body(&"x".repeat(51));
    let response = app
        .server
        .post(&api("/bootcamps"))
        .authorization_bearer(&token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_requires_ownership() {
    let app = TestApp::new();
    let owner = app.publisher("owner@example.com").await;
    let other = app.publisher("other@example.com").await;
    let bootcamp = app.create_bootcamp(&owner, bootcamp_body("Devworks")).await;
    let path = api(&format!("/bootcamps/{}", bootcamp["id"].as_str().unwrap()));

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&other)
        .json(&json!({ "housing": false }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&owner)
        .json(&json!({ "name": "Codemasters", "address": "45 Upper College Rd Kingston RI 02881" }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Value>()["data"].clone();
    assert_eq!(updated["slug"], "codemasters");
    assert_eq!(updated["location"]["state"], "RI");
    assert_eq!(updated["housing"], true);

    let admin = app.admin().await;
    let response = app
        .server
        .put(&path)
        .authorization_bearer(&admin)
        .json(&json!({ "housing": false }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_delete_cascades_to_courses_and_reviews() {
    let app = TestApp::new();
    let owner = app.publisher("owner@example.com").await;
    let reviewer = app.user("user@example.com").await;
    let bootcamp = app.create_bootcamp(&owner, bootcamp_body("Devworks")).await;
    let id = bootcamp["id"].as_str().unwrap();

    let course = app.add_course(&owner, id, "Front End", 8000.0).await;
    let review = app.add_review(&reviewer, id, 8).await;

    let response = app
        .server
        .delete(&api(&format!("/bootcamps/{}", id)))
        .authorization_bearer(&owner)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "success": true, "data": {} }));

    app.server
        .get(&api(&format!("/bootcamps/{}", id)))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&api(&format!("/courses/{}", course["id"].as_str().unwrap())))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&api(&format!("/reviews/{}", review["id"].as_str().unwrap())))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_radius_search() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.create_bootcamp(&admin, bootcamp_body("Boston Camp")).await;
    let mut kingston = bootcamp_body("Kingston Camp");
    kingston["address"] = json!("45 Upper College Rd Kingston RI 02881");
    app.create_bootcamp(&admin, kingston).await;

    let near = app.server.get(&api("/bootcamps/radius/02215/10")).await;
    near.assert_status_ok();
    let body: Value = near.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Boston Camp");

    let wide = app.server.get(&api("/bootcamps/radius/02215/100")).await;
    assert_eq!(wide.json::<Value>()["count"], 2);

    let far = app.server.get(&api("/bootcamps/radius/10001/50")).await;
    assert_eq!(far.json::<Value>()["count"], 0);

    app.server
        .get(&api("/bootcamps/radius/02215/-5"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

fn image_form(bytes: Vec<u8>, file_name: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(bytes).file_name(file_name).mime_type(mime))
}

#[tokio::test]
async fn test_photo_upload() {
    let app = TestApp::new();
    let owner = app.publisher("owner@example.com").await;
    let bootcamp = app.create_bootcamp(&owner, bootcamp_body("Devworks")).await;
    let id = bootcamp["id"].as_str().unwrap();
    let path = api(&format!("/bootcamps/{}/photo", id));

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&owner)
        .multipart(image_form(vec![1, 2, 3], "camp.JPG", "image/jpeg"))
        .await;
    response.assert_status_ok();
    let expected = format!("photo_{}.jpg", id);
    assert_eq!(response.json::<Value>()["data"], expected.as_str());
    assert_eq!(app.blobs.get(&expected), Some(vec![1, 2, 3]));
    assert_eq!(app.get_bootcamp(id).await["photo"], expected.as_str());
}

#[tokio::test]
async fn test_uploaded_photo_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.uploads.path = dir.path().to_path_buf();
    let app = TestApp::with_disk_uploads(config);

    let owner = app.publisher("owner@example.com").await;
    let bootcamp = app.create_bootcamp(&owner, bootcamp_body("Devworks")).await;
    let id = bootcamp["id"].as_str().unwrap();

    let response = app
        .server
        .put(&api(&format!("/bootcamps/{}/photo", id)))
        .authorization_bearer(&owner)
        .multipart(image_form(vec![7, 8, 9], "camp.png", "image/png"))
        .await;
    response.assert_status_ok();
    let name = format!("photo_{}.png", id);
    assert!(dir.path().join(&name).exists());

    let response = app.server.get(&format!("/uploads/{}", name)).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().to_vec(), vec![7, 8, 9]);
    assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "image/png");

    app.server
        .get("/uploads/photo_missing.png")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_upload_rejections() {
    let app = TestApp::new();
    let owner = app.publisher("owner@example.com").await;
    let other = app.publisher("other@example.com").await;
    let bootcamp = app.create_bootcamp(&owner, bootcamp_body("Devworks")).await;
    let path = api(&format!("/bootcamps/{}/photo", bootcamp["id"].as_str().unwrap()));

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&other)
        .multipart(image_form(vec![1], "a.png", "image/png"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app.server.put(&path).authorization_bearer(&owner).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Please upload a file");

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&owner)
        .multipart(image_form(b"hello".to_vec(), "notes.txt", "text/plain"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Please upload an image");

    let too_big = vec![0u8; 1_000_001];
    let response = app
        .server
        .put(&path)
        .authorization_bearer(&owner)
        .multipart(image_form(too_big, "big.png", "image/png"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Please upload an image less than 1000000");

    app.blobs.set_failing(true);
    let response = app
        .server
        .put(&path)
        .authorization_bearer(&owner)
        .multipart(image_form(vec![1], "a.png", "image/png"))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "Problem with file upload");
}
