//! Core types and constants for the geolocation tracker

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
