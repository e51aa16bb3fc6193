//! Core site logic for sitecache.
//!
//! This crate ties the cache, the content service, and category
//! configuration together: category resolution, search index and route
//! assembly, application state, and end-to-end build workflows.

pub mod category;
pub mod pipeline;
pub mod routes;
pub mod search_index;
pub mod state;

pub use category::{CategoryResolver, LookupField};
pub use routes::build_routes;
pub use search_index::{SearchIndexAssembler, SearchIndexItem};
pub use state::SiteState;
