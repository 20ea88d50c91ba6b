//! Courses offered by a bootcamp

use crate::core::{Data, Entity, FieldKind, FieldValue, QuerySchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

impl MinimumSkill {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinimumSkill::Beginner => "beginner",
            MinimumSkill::Intermediate => "intermediate",
            MinimumSkill::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: u32,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    pub scholarship_available: bool,
    pub bootcamp: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn query_schema() -> QuerySchema {
        QuerySchema::new("courses")
            .field("title", FieldKind::Text)
            .field("weeks", FieldKind::Integer)
            .field("tuition", FieldKind::Float)
            .field("minimumSkill", FieldKind::Text)
            .field("scholarshipAvailable", FieldKind::Boolean)
            .field("bootcamp", FieldKind::Uuid)
            .field("user", FieldKind::Uuid)
            .selectable("description")
    }
}

impl Entity for Course {
    fn resource_name() -> &'static str {
        "courses"
    }

    fn display_name() -> &'static str {
        "Course"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Data for Course {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.clone().into()),
            "description" => Some(self.description.clone().into()),
            "weeks" => Some(FieldValue::Integer(i64::from(self.weeks))),
            "tuition" => Some(self.tuition.into()),
            "minimumSkill" => Some(self.minimum_skill.as_str().into()),
            "scholarshipAvailable" => Some(self.scholarship_available.into()),
            "bootcamp" => Some(self.bootcamp.into()),
            "user" => Some(self.user.into()),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

/// Body of `POST /bootcamps/{id}/courses`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please add a course title"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: String,

    #[validate(
        required(message = "Please add number of weeks"),
        range(min = 1, message = "Number of weeks must be at least 1")
    )]
    pub weeks: Option<u32>,

    #[validate(
        required(message = "Please add a tuition cost"),
        range(min = 0.0, message = "Tuition can not be negative")
    )]
    pub tuition: Option<f64>,

    #[validate(required(message = "Please add a minimum skill"))]
    pub minimum_skill: Option<MinimumSkill>,

    #[serde(default)]
    pub scholarship_available: bool,
}

impl CreateCourse {
    /// Build the record; `None` when a required field slipped past validation
    pub fn into_course(self, bootcamp: Uuid, user: Uuid) -> Option<Course> {
        Some(Course {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description,
            weeks: self.weeks?,
            tuition: self.tuition?,
            minimum_skill: self.minimum_skill?,
            scholarship_available: self.scholarship_available,
            bootcamp,
            user,
            created_at: Utc::now(),
        })
    }
}

/// Body of `PUT /courses/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    #[validate(length(min = 1, message = "Please add a course title"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Number of weeks must be at least 1"))]
    pub weeks: Option<u32>,

    #[validate(range(min = 0.0, message = "Tuition can not be negative"))]
    pub tuition: Option<f64>,

    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
}

impl UpdateCourse {
    pub fn apply(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(weeks) = self.weeks {
            course.weeks = weeks;
        }
        if let Some(tuition) = self.tuition {
            course.tuition = tuition;
        }
        if let Some(minimum_skill) = self.minimum_skill {
            course.minimum_skill = minimum_skill;
        }
        if let Some(scholarship_available) = self.scholarship_available {
            course.scholarship_available = scholarship_available;
        }
    }
}
