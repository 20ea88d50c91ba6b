//! Entity descriptor for User

use super::handlers::{create_user, delete_user, get_user, list_users, update_user};
use crate::server::entity_registry::EntityDescriptor;
use crate::server::state::AppState;
use axum::Router;
use axum::routing::get;

pub struct UserDescriptor;

impl EntityDescriptor for UserDescriptor {
    fn entity_type(&self) -> &str {
        "user"
    }

    fn plural(&self) -> &str {
        "users"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/users", get(list_users).post(create_user))
            .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
            .with_state(state)
    }
}
