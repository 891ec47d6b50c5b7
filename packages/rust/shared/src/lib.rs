//! Shared types, error model, and configuration for the enhancer.
//!
//! This crate is the foundation depended on by all other enhancer crates.
//! It provides:
//! - [`EnhancerError`]: the unified error type
//! - Domain types ([`Article`], [`NewArticle`], [`ReferenceSource`], [`Reference`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BROWSER_USER_AGENT, ContentApiConfig, ContentApiSettings, PipelineConfig,
    PipelineSettings, ScrapeConfig, ScrapeFailurePolicy, ScraperSettings, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{EnhancerError, Result};
pub use types::{Article, NewArticle, Reference, ReferenceSource};
