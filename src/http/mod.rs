//! HTTP client module
//!
//! Fetches the CSV source with a single GET request.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
