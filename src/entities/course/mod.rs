//! Course entity module

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::CourseDescriptor;
pub use model::Course;
