//! addrsample - client for a US address sampling API
//!
//! Searches administrative boundary shapes, draws random address samples
//! within them and exports the results as CSV.

pub mod api;
pub mod config;
pub mod export;
pub mod format;
pub mod models;
pub mod naming;

pub use api::{ApiClient, ApiError};
pub use models::{Address, Bounds, Shape, ShapeKind, ShapePointer};
