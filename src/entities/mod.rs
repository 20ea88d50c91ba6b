//! DevCamper resources
//!
//! Each resource lives in its own module with the same layout:
//! - `model`: the stored record, its query schema and request bodies
//! - `handlers`: axum handlers
//! - `descriptor`: the [`EntityDescriptor`](crate::server::EntityDescriptor)
//!   that wires the handlers into routes

pub mod bootcamp;
pub mod course;
pub mod populate;
pub mod review;
pub mod user;

pub use bootcamp::{Bootcamp, BootcampDescriptor};
pub use course::{Course, CourseDescriptor};
pub use review::{Review, ReviewDescriptor};
pub use user::{User, UserDescriptor};
