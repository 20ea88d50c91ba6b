//! Entity registry: collects per-resource descriptors and merges their routes

use crate::server::state::AppState;
use axum::Router;
use indexmap::IndexMap;

/// Describes how to build the routes of one resource
///
/// Each resource (bootcamps, courses, reviews, users) implements this trait.
/// Routes are relative to the API prefix.
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "bootcamp")
    fn entity_type(&self) -> &str;

    /// The plural form, also the first path segment (e.g., "bootcamps")
    fn plural(&self) -> &str;

    /// Build the routes for this resource, bound to `state`
    fn build_routes(&self, state: AppState) -> Router;
}

/// Registry for all resources served by the application
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second one for the same type replaces the first
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge every registered resource's routes into one router
    pub fn build_routes(&self, state: &AppState) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                tracing::debug!(
                    entity = descriptor.entity_type(),
                    path = %format!("/{}", descriptor.plural()),
                    "mounting resource routes"
                );
                router.merge(descriptor.build_routes(state.clone()))
            })
    }

    /// Registered entity types, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}
