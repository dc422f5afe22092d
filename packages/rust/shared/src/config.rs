//! Application configuration for docenrich.
//!
//! User config lives at `~/.docenrich/docenrich.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docenrich.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docenrich";

// ---------------------------------------------------------------------------
// Config structs (matching docenrich.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credibility scoring constants.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Per-document enrichment behaviour.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Pass-through parameters for the ingestion and graph-build hand-off.
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.enrichment.validate()?;
        self.ingest.validate()
    }
}

/// `[scoring]` section.
///
/// The cutoffs and venue list carry no derived meaning; they are tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Base score per document type (`paper`, `book`, ...).
    #[serde(default = "default_type_scores")]
    pub type_scores: BTreeMap<String, f64>,

    /// Base score for document types missing from `type_scores`.
    #[serde(default = "default_unknown_type_score")]
    pub unknown_type_score: f64,

    #[serde(default = "default_peer_review_bonus")]
    pub peer_review_bonus: f64,

    #[serde(default = "default_venue_bonus")]
    pub venue_bonus: f64,

    /// Lower-case markers matched by substring against the venue.
    #[serde(default = "default_prestige_venues")]
    pub prestige_venues: Vec<String>,

    /// Publications younger than this many years get `recency_bonus`.
    #[serde(default = "default_recent_within_years")]
    pub recent_within_years: f64,

    #[serde(default = "default_recency_bonus")]
    pub recency_bonus: f64,

    /// Publications older than this many years lose `stale_penalty`.
    #[serde(default = "default_stale_after_years")]
    pub stale_after_years: f64,

    #[serde(default = "default_stale_penalty")]
    pub stale_penalty: f64,

    /// Author count at which `multi_author_bonus` applies.
    #[serde(default = "default_multi_author_threshold")]
    pub multi_author_threshold: usize,

    #[serde(default = "default_multi_author_bonus")]
    pub multi_author_bonus: f64,

    /// Upper cap applied to the running total.
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            type_scores: default_type_scores(),
            unknown_type_score: default_unknown_type_score(),
            peer_review_bonus: default_peer_review_bonus(),
            venue_bonus: default_venue_bonus(),
            prestige_venues: default_prestige_venues(),
            recent_within_years: default_recent_within_years(),
            recency_bonus: default_recency_bonus(),
            stale_after_years: default_stale_after_years(),
            stale_penalty: default_stale_penalty(),
            multi_author_threshold: default_multi_author_threshold(),
            multi_author_bonus: default_multi_author_bonus(),
            max_score: default_max_score(),
        }
    }
}

impl ScoringConfig {
    /// Reject constants that could push a score outside `[0, max_score]`.
    pub fn validate(&self) -> Result<()> {
        let constants = [
            ("unknown_type_score", self.unknown_type_score),
            ("peer_review_bonus", self.peer_review_bonus),
            ("venue_bonus", self.venue_bonus),
            ("recency_bonus", self.recency_bonus),
            ("stale_penalty", self.stale_penalty),
            ("multi_author_bonus", self.multi_author_bonus),
            ("recent_within_years", self.recent_within_years),
            ("stale_after_years", self.stale_after_years),
        ];
        let type_scores = self
            .type_scores
            .iter()
            .map(|(kind, score)| (kind.as_str(), *score));
        for (name, value) in constants.into_iter().chain(type_scores) {
            if !value.is_finite() || value < 0.0 {
                return Err(EnrichError::config(format!(
                    "scoring constant {name} must be a non-negative number, got {value}"
                )));
            }
        }

        // Recency bonus and stale penalty never apply together, so the lowest
        // reachable score is the smallest base minus the penalty.
        let lowest_base = self
            .type_scores
            .values()
            .copied()
            .fold(self.unknown_type_score, f64::min);
        if lowest_base - self.stale_penalty < 0.0 {
            return Err(EnrichError::config(format!(
                "stale_penalty ({}) exceeds the lowest base score ({lowest_base})",
                self.stale_penalty
            )));
        }

        if self.stale_after_years < self.recent_within_years {
            return Err(EnrichError::config(format!(
                "stale_after_years ({}) is below recent_within_years ({})",
                self.stale_after_years, self.recent_within_years
            )));
        }
        if !(0.0..=1.0).contains(&self.max_score) {
            return Err(EnrichError::config(format!(
                "max_score {} is outside [0, 1]",
                self.max_score
            )));
        }
        Ok(())
    }
}

fn default_type_scores() -> BTreeMap<String, f64> {
    [
        ("paper", 0.40),
        ("book", 0.35),
        ("technical_doc", 0.30),
        ("article", 0.25),
        ("interview", 0.20),
        ("blog_post", 0.15),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
fn default_unknown_type_score() -> f64 {
    0.10
}
fn default_peer_review_bonus() -> f64 {
    0.30
}
fn default_venue_bonus() -> f64 {
    0.20
}
fn default_prestige_venues() -> Vec<String> {
    [
        "nature",
        "science",
        "cell",
        "nejm",
        "lancet",
        "neurips",
        "icml",
        "iclr",
        "cvpr",
        "acl",
        "physical review",
        "quantum",
        "ieee",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_recent_within_years() -> f64 {
    2.0
}
fn default_recency_bonus() -> f64 {
    0.10
}
fn default_stale_after_years() -> f64 {
    10.0
}
fn default_stale_penalty() -> f64 {
    0.05
}
fn default_multi_author_threshold() -> usize {
    3
}
fn default_multi_author_bonus() -> f64 {
    0.05
}
fn default_max_score() -> f64 {
    1.0
}

/// `[enrichment]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Look up canonical entities in each document's raw text.
    #[serde(default = "default_true")]
    pub extract_entities: bool,

    /// Rewrite literal-text content so the first mention of each
    /// abbreviation carries its expansion.
    #[serde(default)]
    pub expand_abbreviations: bool,

    /// Document type used when none was supplied.
    #[serde(default = "default_doc_type")]
    pub default_doc_type: String,

    /// Reading speed for read-time estimates.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            extract_entities: true,
            expand_abbreviations: false,
            default_doc_type: default_doc_type(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

impl EnrichmentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.words_per_minute == 0 {
            return Err(EnrichError::config("words_per_minute must be positive"));
        }
        if self.default_doc_type.trim().is_empty() {
            return Err(EnrichError::config("default_doc_type must not be empty"));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
fn default_doc_type() -> String {
    "article".into()
}
fn default_words_per_minute() -> u32 {
    200
}

/// `[ingest]` section. Values are forwarded untouched to the knowledge-base side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Ask the ingestion side to skip already-processed content.
    #[serde(default = "default_true")]
    pub incremental_loading: bool,

    /// Chunk size for graph construction.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunks processed per graph-construction batch.
    #[serde(default = "default_chunks_per_batch")]
    pub chunks_per_batch: usize,

    /// Labels appended to every batch's node set after the topic and quarter.
    #[serde(default)]
    pub extra_node_labels: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            incremental_loading: true,
            chunk_size: default_chunk_size(),
            chunks_per_batch: default_chunks_per_batch(),
            extra_node_labels: Vec::new(),
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunks_per_batch == 0 {
            return Err(EnrichError::config(
                "chunk_size and chunks_per_batch must be positive",
            ));
        }
        Ok(())
    }
}

fn default_chunk_size() -> usize {
    1024
}
fn default_chunks_per_batch() -> usize {
    50
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docenrich/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| EnrichError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docenrich/docenrich.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EnrichError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        EnrichError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EnrichError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EnrichError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EnrichError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
