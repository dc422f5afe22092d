//! Shared types, error model, and configuration for docenrich.
//!
//! This crate is the foundation depended on by the other docenrich crates.
//! It provides:
//! - [`EnrichError`], the unified error type
//! - The metadata model ([`DocumentMetadata`], [`MetadataFacts`], [`EnrichedDocument`])
//! - Configuration ([`AppConfig`], [`ScoringConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EnrichmentConfig, IngestConfig, ScoringConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{EnrichError, Result};
pub use types::{
    DocType, DocumentMetadata, EnrichedDocument, MetadataFacts, PropertyBag, ReadingLevel,
};
