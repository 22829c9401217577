//! REST API transport for the Haulbook backend.
//!
//! This module provides the `ApiClient` for issuing authenticated JSON
//! requests and the `ApiError` taxonomy that failed calls are classified
//! into. Authentication uses a JWT bearer token read from the shared
//! `TokenStore` before every request.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
