//! HTTP client for the address API.

mod client;
mod endpoint;
mod error;

pub use client::ApiClient;
pub use endpoint::UrlBuilder;
pub use error::{ApiError, Result};
