//! Courses and reviews: ownership, nested routes and bootcamp aggregates

mod harness;

use axum::http::StatusCode;
use harness::{TestApp, api, bootcamp_body, course_body};
use serde_json::{Value, json};

struct Fixture {
    app: TestApp,
    owner: String,
    bootcamp_id: String,
}

async fn fixture() -> Fixture {
    let app = TestApp::new();
    let owner = app.publisher("owner@example.com").await;
    let bootcamp = app.create_bootcamp(&owner, bootcamp_body("Devworks")).await;
    let bootcamp_id = bootcamp["id"].as_str().unwrap().to_string();
    Fixture {
        app,
        owner,
        bootcamp_id,
    }
}

#[tokio::test]
async fn test_average_cost_follows_course_writes() {
    let f = fixture().await;
    let first = f.app.add_course(&f.owner, &f.bootcamp_id, "Front End", 8000.0).await;
    f.app.add_course(&f.owner, &f.bootcamp_id, "Back End", 10001.0).await;

    // (8000 + 10001) / 2 = 9000.5, rounded up to the next ten
    assert_eq!(f.app.get_bootcamp(&f.bootcamp_id).await["averageCost"], 9010.0);

    let response = f
        .app
        .server
        .put(&api(&format!("/courses/{}", first["id"].as_str().unwrap())))
        .authorization_bearer(&f.owner)
        .json(&json!({ "tuition": 2000.0 }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["tuition"], 2000.0);
    assert_eq!(f.app.get_bootcamp(&f.bootcamp_id).await["averageCost"], 6010.0);

    f.app
        .server
        .delete(&api(&format!("/courses/{}", first["id"].as_str().unwrap())))
        .authorization_bearer(&f.owner)
        .await
        .assert_status_ok();
    assert_eq!(f.app.get_bootcamp(&f.bootcamp_id).await["averageCost"], 10010.0);
}

#[tokio::test]
async fn test_course_ownership() {
    let f = fixture().await;
    let other = f.app.publisher("other@example.com").await;
    let reviewer = f.app.user("user@example.com").await;
    let path = api(&format!("/bootcamps/{}/courses", f.bootcamp_id));

    f.app
        .server
        .post(&path)
        .authorization_bearer(&other)
        .json(&course_body("Sneaky", 1.0))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    f.app
        .server
        .post(&path)
        .authorization_bearer(&reviewer)
        .json(&course_body("Sneaky", 1.0))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let course = f.app.add_course(&f.owner, &f.bootcamp_id, "Front End", 8000.0).await;
    let course_path = api(&format!("/courses/{}", course["id"].as_str().unwrap()));
    f.app
        .server
        .put(&course_path)
        .authorization_bearer(&other)
        .json(&json!({ "weeks": 2 }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    f.app
        .server
        .delete(&course_path)
        .authorization_bearer(&other)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let admin = f.app.admin().await;
    f.app
        .server
        .put(&course_path)
        .authorization_bearer(&admin)
        .json(&json!({ "weeks": 2 }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_course_on_missing_bootcamp() {
    let f = fixture().await;
    let missing = uuid::Uuid::new_v4();
    let response = f
        .app
        .server
        .post(&api(&format!("/bootcamps/{}/courses", missing)))
        .authorization_bearer(&f.owner)
        .json(&course_body("Lost", 1.0))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"],
        format!("Bootcamp not found with id of {}", missing)
    );
}

#[tokio::test]
async fn test_course_validation() {
    let f = fixture().await;
    let response = f
        .app
        .server
        .post(&api(&format!("/bootcamps/{}/courses", f.bootcamp_id)))
        .authorization_bearer(&f.owner)
        .json(&json!({ "title": "Only a title" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_nested_and_single_course_reads() {
    let f = fixture().await;
    let course = f.app.add_course(&f.owner, &f.bootcamp_id, "Front End", 8000.0).await;

    let body: Value = f
        .app
        .server
        .get(&api(&format!("/bootcamps/{}/courses", f.bootcamp_id)))
        .await
        .json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["bootcamp"], f.bootcamp_id.as_str());
    assert!(body.get("pagination").is_none());

    let body: Value = f
        .app
        .server
        .get(&api(&format!("/courses/{}", course["id"].as_str().unwrap())))
        .await
        .json();
    assert_eq!(
        body["data"]["bootcamp"],
        json!({
            "id": f.bootcamp_id,
            "name": "Devworks",
            "description": "Full stack web development bootcamp"
        })
    );
}

#[tokio::test]
async fn test_average_rating_follows_review_writes() {
    let f = fixture().await;
    let alice = f.app.user("alice@example.com").await;
    let bob = f.app.user("bob@example.com").await;

    let review = f.app.add_review(&alice, &f.bootcamp_id, 8).await;
    f.app.add_review(&bob, &f.bootcamp_id, 5).await;
    assert_eq!(f.app.get_bootcamp(&f.bootcamp_id).await["averageRating"], 6.5);

    let review_path = api(&format!("/reviews/{}", review["id"].as_str().unwrap()));
    f.app
        .server
        .put(&review_path)
        .authorization_bearer(&alice)
        .json(&json!({ "rating": 10 }))
        .await
        .assert_status_ok();
    assert_eq!(f.app.get_bootcamp(&f.bootcamp_id).await["averageRating"], 7.5);

    f.app
        .server
        .delete(&review_path)
        .authorization_bearer(&bob)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    f.app
        .server
        .delete(&review_path)
        .authorization_bearer(&alice)
        .await
        .assert_status_ok();
    assert_eq!(f.app.get_bootcamp(&f.bootcamp_id).await["averageRating"], 5.0);
}

#[tokio::test]
async fn test_one_review_per_user_and_bootcamp() {
    let f = fixture().await;
    let alice = f.app.user("alice@example.com").await;
    f.app.add_review(&alice, &f.bootcamp_id, 8).await;

    let response = f
        .app
        .server
        .post(&api(&format!("/bootcamps/{}/reviews", f.bootcamp_id)))
        .authorization_bearer(&alice)
        .json(&json!({ "title": "Again", "text": "Still good", "rating": 9 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "DUPLICATE_KEY");
}

#[tokio::test]
async fn test_publishers_cannot_review() {
    let f = fixture().await;
    let response = f
        .app
        .server
        .post(&api(&format!("/bootcamps/{}/reviews", f.bootcamp_id)))
        .authorization_bearer(&f.owner)
        .json(&json!({ "title": "Mine", "text": "Best", "rating": 10 }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_review_rating_bounds() {
    let f = fixture().await;
    let alice = f.app.user("alice@example.com").await;
    for rating in [0, 11] {
        let response = f
            .app
            .server
            .post(&api(&format!("/bootcamps/{}/reviews", f.bootcamp_id)))
            .authorization_bearer(&alice)
            .json(&json!({ "title": "T", "text": "x", "rating": rating }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_review_lists() {
    let f = fixture().await;
    let alice = f.app.user("alice@example.com").await;
    let review = f.app.add_review(&alice, &f.bootcamp_id, 8).await;

    let body: Value = f.app.server.get(&api("/reviews")).await.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["bootcamp"]["name"], "Devworks");

    let body: Value = f
        .app
        .server
        .get(&api(&format!("/bootcamps/{}/reviews", f.bootcamp_id)))
        .await
        .json();
    assert_eq!(body["data"][0]["id"], review["id"]);

    let body: Value = f
        .app
        .server
        .get(&api(&format!("/reviews/{}", review["id"].as_str().unwrap())))
        .await
        .json();
    assert_eq!(body["data"]["rating"], 8);
    assert_eq!(body["data"]["bootcamp"]["id"], f.bootcamp_id.as_str());
}
