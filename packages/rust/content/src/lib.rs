//! Content API access for sitecache.
//!
//! This crate provides:
//! - [`ContentClient`] — GraphQL-over-HTTP transport to the content API
//! - [`queries`] — the site's query templates and parameter rendering
//! - [`ContentService`] — typed fetches and cache-ready [`ContentRequest`]s
//!
//! [`ContentRequest`]: sitecache_cache::ContentRequest

pub mod client;
pub mod queries;
pub mod service;

pub use client::ContentClient;
pub use queries::Query;
pub use service::ContentService;
