//! Task lookup server run by the discovery agent.
//!
//! Clients configured with an agent URL ask `GET /tasks/{service}` here
//! instead of querying the inventory themselves.

mod error;
pub use error::ApiError;

mod handler;
pub use handler::TaskLookup;

mod adapter;
pub use adapter::InventoryLookup;

mod cache;
pub use cache::{CachedLookup, DEFAULT_CACHE_TTL};

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

#[cfg(feature = "http")]
pub use axum;
