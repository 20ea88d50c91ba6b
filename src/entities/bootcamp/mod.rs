//! Bootcamp entity module

pub mod aggregates;
pub mod descriptor;
pub mod geo;
pub mod handlers;
pub mod model;

pub use descriptor::BootcampDescriptor;
pub use model::Bootcamp;
