//! Shared application state handed to every handler

use crate::auth::token::TokenIssuer;
use crate::config::AppConfig;
use crate::core::DataService;
use crate::core::results::ListSettings;
use crate::entities::{Bootcamp, Course, Review, User};
use crate::outbound::{BlobWriter, Geocoder, Mailer};
use std::sync::Arc;

/// Stores, collaborators and settings, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub bootcamps: Arc<dyn DataService<Bootcamp>>,
    pub courses: Arc<dyn DataService<Course>>,
    pub reviews: Arc<dyn DataService<Review>>,
    pub users: Arc<dyn DataService<User>>,
    pub tokens: TokenIssuer,
    pub mailer: Arc<dyn Mailer>,
    pub geocoder: Arc<dyn Geocoder>,
    pub blobs: Arc<dyn BlobWriter>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn list_settings(&self) -> ListSettings {
        self.config.pagination.list_settings()
    }
}
