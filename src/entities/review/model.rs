//! Reviews left on a bootcamp

use crate::core::{Data, Entity, FieldKind, FieldValue, QuerySchema, UniqueKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: u8,
    pub bootcamp: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn query_schema() -> QuerySchema {
        QuerySchema::new("reviews")
            .field("title", FieldKind::Text)
            .field("rating", FieldKind::Integer)
            .field("bootcamp", FieldKind::Uuid)
            .field("user", FieldKind::Uuid)
            .selectable("text")
    }
}

impl Entity for Review {
    fn resource_name() -> &'static str {
        "reviews"
    }

    fn display_name() -> &'static str {
        "Review"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Data for Review {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.clone().into()),
            "text" => Some(self.text.clone().into()),
            "rating" => Some(FieldValue::Integer(i64::from(self.rating))),
            "bootcamp" => Some(self.bootcamp.into()),
            "user" => Some(self.user.into()),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }

    /// One review per user per bootcamp
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "bootcamp and user",
            format!("{}:{}", self.bootcamp, self.user),
        )]
    }
}

/// Body of `POST /bootcamps/{id}/reviews`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReview {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Please add a title for the review of at most 100 characters"
    ))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: String,

    #[validate(
        required(message = "Please add a rating between 1 and 10"),
        range(min = 1, max = 10, message = "Please add a rating between 1 and 10")
    )]
    pub rating: Option<u8>,
}

impl CreateReview {
    pub fn into_review(self, bootcamp: Uuid, user: Uuid) -> Option<Review> {
        Some(Review {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            text: self.text,
            rating: self.rating?,
            bootcamp,
            user,
            created_at: Utc::now(),
        })
    }
}

/// Body of `PUT /reviews/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateReview {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Please add a title for the review of at most 100 characters"
    ))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: Option<String>,

    #[validate(range(min = 1, max = 10, message = "Please add a rating between 1 and 10"))]
    pub rating: Option<u8>,
}

impl UpdateReview {
    pub fn apply(self, review: &mut Review) {
        if let Some(title) = self.title {
            review.title = title.trim().to_string();
        }
        if let Some(text) = self.text {
            review.text = text;
        }
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
    }
}
