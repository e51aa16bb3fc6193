//! Shared types, error model, and configuration for sitecache.
//!
//! This crate is the foundation depended on by all other sitecache crates.
//! It provides:
//! - [`SiteError`] — the unified error type
//! - Domain types ([`ContentType`], [`ContentRecord`], [`ContentExport`],
//!   [`CategoryEnumEntry`])
//! - Configuration ([`AppConfig`], [`ApiConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, SiteError};
pub use types::{
    CategoryEnumEntry, CategoryEnums, ContentExport, ContentRecord, ContentType, SectionRef,
};
