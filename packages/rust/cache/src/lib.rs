//! In-memory content cache and batch fetch coordination.
//!
//! This crate provides:
//! - [`CacheKey`] — 128-bit content hash of a query identity
//! - [`ContentCache`] — shared, clearable store of fetched payloads
//! - [`ContentRequest`] / [`ContentBatch`] — typed units of fetch work
//! - [`BatchFetchCoordinator`] — fetches only what is missing, concurrently

pub mod batch;
pub mod key;
pub mod request;
pub mod store;

pub use batch::{BatchFetchCoordinator, BatchReport};
pub use key::CacheKey;
pub use request::{ContentBatch, ContentRequest, QueryFn, QueryFuture};
pub use store::ContentCache;
