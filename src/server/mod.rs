//! Server assembly: shared state, resource registry, REST exposure and the
//! builder that ties them together

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod security;
pub mod state;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use state::AppState;
