//! Entity descriptor for Course

use super::handlers::{
    add_course, bootcamp_courses, delete_course, get_course, list_courses, update_course,
};
use crate::server::entity_registry::EntityDescriptor;
use crate::server::state::AppState;
use axum::Router;
use axum::routing::get;

pub struct CourseDescriptor;

impl EntityDescriptor for CourseDescriptor {
    fn entity_type(&self) -> &str {
        "course"
    }

    fn plural(&self) -> &str {
        "courses"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/courses", get(list_courses))
            .route(
                "/courses/{id}",
                get(get_course).put(update_course).delete(delete_course),
            )
            .route("/bootcamps/{id}/courses", get(bootcamp_courses).post(add_course))
            .with_state(state)
    }
}
