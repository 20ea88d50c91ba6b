//! API exposure: turns the registered resources into a transport router

pub mod rest;

pub use rest::RestExposure;
