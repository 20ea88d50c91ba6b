//! Entity descriptor for Bootcamp

use super::handlers::{
    bootcamps_in_radius, create_bootcamp, delete_bootcamp, get_bootcamp, list_bootcamps,
    update_bootcamp, upload_photo,
};
use crate::server::entity_registry::EntityDescriptor;
use crate::server::state::AppState;
use axum::Router;
use axum::routing::{get, put};

pub struct BootcampDescriptor;

impl EntityDescriptor for BootcampDescriptor {
    fn entity_type(&self) -> &str {
        "bootcamp"
    }

    fn plural(&self) -> &str {
        "bootcamps"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/bootcamps", get(list_bootcamps).post(create_bootcamp))
            .route(
                "/bootcamps/{id}",
                get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
            )
            .route("/bootcamps/{id}/photo", put(upload_photo))
            .route("/bootcamps/radius/{zipcode}/{distance}", get(bootcamps_in_radius))
            .with_state(state)
    }
}
