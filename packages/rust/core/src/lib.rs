//! Enrichment core for docenrich.
//!
//! This crate normalizes document metadata, scores credibility, resolves
//! domain abbreviations to canonical entities, and packages enriched
//! documents with topic-scoped extraction instructions for a downstream
//! knowledge-graph builder.

pub mod canonical;
pub mod credibility;
pub mod enrichment;
pub mod instructions;
pub mod normalize;

pub use canonical::{embed_canonical_terms, extract_canonical_entities};
pub use credibility::{CredibilityScorer, ScoreBreakdown, ScoringInput};
pub use enrichment::{
    BatchProgress, ContentRef, Enricher, GraphBuildRequest, IngestRequest, PreparedBatch,
    SilentProgress, SourceDocument,
};
pub use instructions::{extraction_instructions, instructions_by_topic};
pub use normalize::{normalize_author, normalize_metadata, normalize_token};
