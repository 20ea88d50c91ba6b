//! Bootcamp records and request bodies

use crate::core::{Data, Entity, FieldKind, FieldValue, QuerySchema, UniqueKey};
use crate::outbound::GeoLocation;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

/// Photo every bootcamp starts with
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

static NON_SLUG_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9]+").unwrap_or_else(|_| unreachable!("static pattern"))
});

/// Lowercase, ASCII-alphanumeric runs joined by `-`
pub fn slugify(name: &str) -> String {
    NON_SLUG_CHARS
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Career tracks a bootcamp can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    pub fn as_str(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }
}

/// GeoJSON point plus the address parts the geocoder returned
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub formatted_address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl Location {
    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }
}

impl From<GeoLocation> for Location {
    fn from(geo: GeoLocation) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [geo.longitude, geo.latitude],
            formatted_address: geo.formatted_address,
            street: geo.street,
            city: geo.city,
            state: geo.state,
            zipcode: geo.zipcode,
            country: geo.country,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<Location>,
    pub careers: Vec<Career>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Bootcamp {
    pub fn query_schema() -> QuerySchema {
        QuerySchema::new("bootcamps")
            .field("name", FieldKind::Text)
            .field("slug", FieldKind::Text)
            .field("website", FieldKind::Text)
            .field("phone", FieldKind::Text)
            .field("email", FieldKind::Text)
            .field("careers", FieldKind::TextList)
            .field("averageRating", FieldKind::Float)
            .field("averageCost", FieldKind::Float)
            .field("housing", FieldKind::Boolean)
            .field("jobAssistance", FieldKind::Boolean)
            .field("jobGuarantee", FieldKind::Boolean)
            .field("acceptGi", FieldKind::Boolean)
            .field("user", FieldKind::Uuid)
            .field("location.city", FieldKind::Text)
            .field("location.state", FieldKind::Text)
            .field("location.zipcode", FieldKind::Text)
            .field("location.country", FieldKind::Text)
            .selectable("description")
            .selectable("photo")
    }
}

impl Entity for Bootcamp {
    fn resource_name() -> &'static str {
        "bootcamps"
    }

    fn display_name() -> &'static str {
        "Bootcamp"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Data for Bootcamp {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let location = self.location.as_ref();
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "slug" => Some(self.slug.clone().into()),
            "website" => Some(self.website.clone().into()),
            "phone" => Some(self.phone.clone().into()),
            "email" => Some(self.email.clone().into()),
            "careers" => Some(FieldValue::List(
                self.careers.iter().map(|c| c.as_str().into()).collect(),
            )),
            "averageRating" => Some(self.average_rating.into()),
            "averageCost" => Some(self.average_cost.into()),
            "photo" => Some(self.photo.clone().into()),
            "housing" => Some(self.housing.into()),
            "jobAssistance" => Some(self.job_assistance.into()),
            "jobGuarantee" => Some(self.job_guarantee.into()),
            "acceptGi" => Some(self.accept_gi.into()),
            "user" => Some(self.user.into()),
            "location.city" => Some(location.and_then(|l| l.city.clone()).into()),
            "location.state" => Some(location.and_then(|l| l.state.clone()).into()),
            "location.zipcode" => Some(location.and_then(|l| l.zipcode.clone()).into()),
            "location.country" => Some(location.and_then(|l| l.country.clone()).into()),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", self.name.trim().to_lowercase())]
    }
}

/// Body of `POST /bootcamps`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcamp {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Please add a name of at most 50 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 500,
        message = "Please add a description of at most 500 characters"
    ))]
    pub description: String,

    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,

    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,

    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please add at least one career"))]
    pub careers: Vec<Career>,

    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

impl CreateBootcamp {
    /// Build the record; `location` comes from geocoding `address`
    pub fn into_bootcamp(self, owner: Uuid, location: Location) -> Bootcamp {
        let name = self.name.trim().to_string();
        Bootcamp {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            description: self.description,
            website: self.website,
            phone: self.phone,
            email: self.email,
            location: Some(location),
            careers: self.careers,
            average_rating: None,
            average_cost: None,
            photo: DEFAULT_PHOTO.to_string(),
            housing: self.housing,
            job_assistance: self.job_assistance,
            job_guarantee: self.job_guarantee,
            accept_gi: self.accept_gi,
            user: owner,
            created_at: Utc::now(),
        }
    }
}

/// Body of `PUT /bootcamps/{id}`; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBootcamp {
    #[validate(length(min = 1, max = 50, message = "Please add a name of at most 50 characters"))]
    pub name: Option<String>,

    #[validate(length(
        min = 1,
        max = 500,
        message = "Please add a description of at most 500 characters"
    ))]
    pub description: Option<String>,

    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,

    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,

    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: Option<String>,

    #[validate(length(min = 1, message = "Please add at least one career"))]
    pub careers: Option<Vec<Career>>,

    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl UpdateBootcamp {
    /// Apply every present field except `address`, which needs geocoding
    pub fn apply(self, bootcamp: &mut Bootcamp) {
        if let Some(name) = self.name {
            bootcamp.name = name.trim().to_string();
            bootcamp.slug = slugify(&bootcamp.name);
        }
        if let Some(description) = self.description {
            bootcamp.description = description;
        }
        if let Some(website) = self.website {
            bootcamp.website = Some(website);
        }
        if let Some(phone) = self.phone {
            bootcamp.phone = Some(phone);
        }
        if let Some(email) = self.email {
            bootcamp.email = Some(email);
        }
        if let Some(careers) = self.careers {
            bootcamp.careers = careers;
        }
        if let Some(housing) = self.housing {
            bootcamp.housing = housing;
        }
        if let Some(job_assistance) = self.job_assistance {
            bootcamp.job_assistance = job_assistance;
        }
        if let Some(job_guarantee) = self.job_guarantee {
            bootcamp.job_guarantee = job_guarantee;
        }
        if let Some(accept_gi) = self.accept_gi {
            bootcamp.accept_gi = accept_gi;
        }
    }
}
