//! REST API exposure
//!
//! Assembles the HTTP surface: health checks at the root, every registered
//! resource plus the `/auth` routes under the configured API prefix, the
//! upload directory as static files, then any custom routes.

use crate::auth::handlers as auth;
use crate::server::entity_registry::EntityRegistry;
use crate::server::state::AppState;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::services::ServeDir;

pub struct RestExposure;

impl RestExposure {
    /// Build the REST router for `state`
    pub fn build_router(
        registry: &EntityRegistry,
        state: AppState,
        custom_routes: Vec<Router>,
    ) -> Router {
        let api = registry
            .build_routes(&state)
            .merge(auth::routes(state.clone()));

        let prefix = state.config.server.api_prefix.trim_end_matches('/');
        let mut app = if prefix.is_empty() {
            Self::health_routes().merge(api)
        } else {
            Self::health_routes().nest(prefix, api)
        };

        if let Some(route) = &state.config.uploads.public_route {
            let route = route.trim_end_matches('/');
            if !route.is_empty() {
                app = app.nest_service(route, ServeDir::new(&state.config.uploads.path));
            }
        }

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "devcamper"
        }))
    }
}
