//! Enrichment orchestrator.
//!
//! Turns raw documents plus whatever facts are known about them into
//! [`EnrichedDocument`]s, and packages a topic's documents together with the
//! pass-through parameters the knowledge-base side expects.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use docenrich_shared::{
    AppConfig, DocumentMetadata, EnrichedDocument, EnrichmentConfig, IngestConfig, MetadataFacts,
    PropertyBag, Result,
};

use crate::canonical::{embed_canonical_terms, extract_canonical_entities};
use crate::credibility::CredibilityScorer;
use crate::instructions::extraction_instructions;
use crate::normalize::normalize_metadata;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Where a document's content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    /// A file the ingestion side will read itself.
    Path(PathBuf),
    /// The document text, passed inline.
    Text(String),
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Text(t) => write!(f, "<text, {} bytes>", t.len()),
        }
    }
}

/// One document awaiting enrichment.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub content: ContentRef,
    /// Already-read text of a path document, used for entity lookup and
    /// read-time estimates. Ignored for [`ContentRef::Text`].
    pub raw_text: Option<String>,
    pub facts: MetadataFacts,
}

impl SourceDocument {
    pub fn from_path(path: impl Into<PathBuf>, facts: MetadataFacts) -> Self {
        Self {
            content: ContentRef::Path(path.into()),
            raw_text: None,
            facts,
        }
    }

    pub fn from_text(text: impl Into<String>, facts: MetadataFacts) -> Self {
        Self {
            content: ContentRef::Text(text.into()),
            raw_text: None,
            facts,
        }
    }

    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = Some(text.into());
        self
    }

    /// Text available for analysis, if any.
    fn text(&self) -> Option<&str> {
        match &self.content {
            ContentRef::Text(t) => Some(t),
            ContentRef::Path(_) => self.raw_text.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Hand-off payloads
// ---------------------------------------------------------------------------

/// Arguments for the knowledge base's ingestion call.
#[derive(Debug, Clone, Serialize)]
pub struct IngestRequest {
    pub dataset_name: String,
    /// One flat property bag per document.
    pub documents: Vec<PropertyBag>,
    /// Grouping labels: topic, publication quarter, then configured extras.
    pub node_set: Vec<String>,
    pub incremental_loading: bool,
}

/// Arguments for the knowledge base's graph-construction call.
#[derive(Debug, Clone, Serialize)]
pub struct GraphBuildRequest {
    pub datasets: Vec<String>,
    pub custom_prompt: String,
    pub chunk_size: usize,
    pub chunks_per_batch: usize,
    pub incremental_loading: bool,
}

/// Everything produced for one topic batch.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedBatch {
    pub topic: String,
    #[serde(skip)]
    pub documents: Vec<EnrichedDocument>,
    pub ingest: IngestRequest,
    pub graph_build: GraphBuildRequest,
}

// ---------------------------------------------------------------------------
// Progress trait
// ---------------------------------------------------------------------------

/// Progress callback for batch enrichment.
pub trait BatchProgress: Send + Sync {
    /// Called after each document is enriched.
    fn document_done(&self, current: usize, total: usize, label: &str);
}

/// No-op batch progress.
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn document_done(&self, _current: usize, _total: usize, _label: &str) {}
}

// ---------------------------------------------------------------------------
// Enricher
// ---------------------------------------------------------------------------

/// Stateless enrichment service. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct Enricher {
    scorer: CredibilityScorer,
    options: EnrichmentConfig,
    ingest: IngestConfig,
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Enricher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            scorer: CredibilityScorer::new(config.scoring.clone()),
            options: config.enrichment.clone(),
            ingest: config.ingest.clone(),
        }
    }

    pub fn options(&self) -> &EnrichmentConfig {
        &self.options
    }

    /// Enrich one document, scoring against the current time.
    pub fn enrich_document(&self, source: SourceDocument) -> Result<EnrichedDocument> {
        self.enrich_document_at(source, None, Utc::now())
    }

    /// Enrich one document as of `reference_now`.
    ///
    /// `default_topic` fills `primary_topic` when the facts lack one.
    #[instrument(skip_all, fields(content = %source.content))]
    pub fn enrich_document_at(
        &self,
        source: SourceDocument,
        default_topic: Option<&str>,
        reference_now: DateTime<Utc>,
    ) -> Result<EnrichedDocument> {
        let facts = self.infer_facts(&source, default_topic);
        let mut metadata = DocumentMetadata::from_facts(facts)?;
        normalize_metadata(&mut metadata);

        let score = self.scorer.score_metadata(&metadata, reference_now);
        metadata.set_credibility_score(score)?;

        let canonical = match source.text() {
            Some(text) if self.options.extract_entities => {
                Some(extract_canonical_entities(text, &metadata.primary_topic))
                    .filter(|found| !found.is_empty())
            }
            _ => None,
        };

        let content = match source.content {
            ContentRef::Path(path) => path.display().to_string(),
            ContentRef::Text(text) => match &canonical {
                Some(map) if self.options.expand_abbreviations => {
                    embed_canonical_terms(&text, map)
                }
                _ => text,
            },
        };

        debug!(
            title = %metadata.title,
            doc_type = %metadata.doc_type,
            score,
            entities = canonical.as_ref().map_or(0, |c| c.len()),
            "document enriched"
        );

        EnrichedDocument::new(content, metadata, canonical)
    }

    /// Enrich every document of a topic and build the hand-off payloads.
    ///
    /// All documents share one reference time. The first invalid document
    /// aborts the batch.
    pub fn prepare_batch(
        &self,
        topic: &str,
        dataset_name: &str,
        sources: Vec<SourceDocument>,
        progress: &dyn BatchProgress,
    ) -> Result<PreparedBatch> {
        self.prepare_batch_at(topic, dataset_name, sources, progress, Utc::now())
    }

    #[instrument(skip_all, fields(topic = %topic, dataset = dataset_name, docs = sources.len()))]
    pub fn prepare_batch_at(
        &self,
        topic: &str,
        dataset_name: &str,
        sources: Vec<SourceDocument>,
        progress: &dyn BatchProgress,
        reference_now: DateTime<Utc>,
    ) -> Result<PreparedBatch> {
        let total = sources.len();
        let mut documents = Vec::with_capacity(total);

        for (idx, source) in sources.into_iter().enumerate() {
            let label = source.content.to_string();
            let doc = self
                .enrich_document_at(source, Some(topic), reference_now)
                .inspect_err(|e| warn!(document = %label, error = %e, "enrichment failed"))?;
            documents.push(doc);
            progress.document_done(idx + 1, total, &label);
        }

        let bags = documents
            .iter()
            .map(EnrichedDocument::to_property_bag)
            .collect::<Result<Vec<_>>>()?;

        let mut node_set = vec![topic.to_string(), quarter_label(reference_now)];
        node_set.extend(self.ingest.extra_node_labels.iter().cloned());

        let batch = PreparedBatch {
            topic: topic.to_string(),
            ingest: IngestRequest {
                dataset_name: dataset_name.to_string(),
                documents: bags,
                node_set,
                incremental_loading: self.ingest.incremental_loading,
            },
            graph_build: GraphBuildRequest {
                datasets: vec![dataset_name.to_string()],
                custom_prompt: extraction_instructions(topic),
                chunk_size: self.ingest.chunk_size,
                chunks_per_batch: self.ingest.chunks_per_batch,
                incremental_loading: self.ingest.incremental_loading,
            },
            documents,
        };

        info!(
            topic,
            dataset = dataset_name,
            documents = batch.documents.len(),
            "batch prepared"
        );
        Ok(batch)
    }

    /// Fill gaps in the supplied facts from what the source itself tells us.
    fn infer_facts(&self, source: &SourceDocument, default_topic: Option<&str>) -> MetadataFacts {
        let mut facts = source.facts.clone();

        if is_blank(facts.title.as_deref()) {
            if let ContentRef::Path(path) = &source.content {
                facts.title = title_from_path(path);
                debug!(title = ?facts.title, "title inferred from file name");
            }
        }
        if is_blank(facts.primary_topic.as_deref()) {
            facts.primary_topic = default_topic.map(String::from);
        }
        if is_blank(facts.doc_type.as_deref()) {
            facts.doc_type = Some(self.options.default_doc_type.clone());
        }
        if facts.estimated_read_time_minutes.is_none() {
            facts.estimated_read_time_minutes = source
                .text()
                .and_then(|t| estimate_read_time(t, self.options.words_per_minute));
        }
        facts
    }
}

/// Missing and whitespace-only facts are treated alike.
fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// `attention_is_all_you_need.pdf` → `Attention Is All You Need`.
pub fn title_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?.replace('_', " ");
    let title = title_case(stem.trim());
    (!title.is_empty()).then_some(title)
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// Whole minutes needed to read `text`, rounded up. `None` for empty text.
pub fn estimate_read_time(text: &str, words_per_minute: u32) -> Option<u32> {
    let words = text.split_whitespace().count();
    if words == 0 || words_per_minute == 0 {
        return None;
    }
    let minutes = words.div_ceil(words_per_minute as usize);
    Some(u32::try_from(minutes).unwrap_or(u32::MAX))
}

/// Calendar quarter label such as `2025-Q1`.
pub fn quarter_label(at: DateTime<Utc>) -> String {
    format!("{}-Q{}", at.year(), at.month0() / 3 + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
