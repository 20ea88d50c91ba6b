//! Entity descriptor for Review

use super::handlers::{
    add_review, bootcamp_reviews, delete_review, get_review, list_reviews, update_review,
};
use crate::server::entity_registry::EntityDescriptor;
use crate::server::state::AppState;
use axum::Router;
use axum::routing::get;

pub struct ReviewDescriptor;

impl EntityDescriptor for ReviewDescriptor {
    fn entity_type(&self) -> &str {
        "review"
    }

    fn plural(&self) -> &str {
        "reviews"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/reviews", get(list_reviews))
            .route(
                "/reviews/{id}",
                get(get_review).put(update_review).delete(delete_review),
            )
            .route("/bootcamps/{id}/reviews", get(bootcamp_reviews).post(add_review))
            .with_state(state)
    }
}
