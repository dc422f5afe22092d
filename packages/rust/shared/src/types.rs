//! Metadata model for enriched documents.
//!
//! [`MetadataFacts`] is the loose property bag supplied by callers (humans,
//! extraction models, file-name heuristics). [`DocumentMetadata::from_facts`]
//! turns it into a validated record, and [`EnrichedDocument`] wraps that
//! record with its content reference for hand-off to the ingestion side.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EnrichError, Result};

/// Language assumed when none is supplied.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Flat attribute map handed to the ingestion collaborator.
pub type PropertyBag = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// DocType
// ---------------------------------------------------------------------------

/// Kind of source document. Unrecognized kinds keep their literal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocType {
    Paper,
    Book,
    Article,
    TechnicalDoc,
    BlogPost,
    Interview,
    Other(String),
}

impl DocType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paper => "paper",
            Self::Book => "book",
            Self::Article => "article",
            Self::TechnicalDoc => "technical_doc",
            Self::BlogPost => "blog_post",
            Self::Interview => "interview",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this is one of the enumerated kinds.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for DocType {
    fn from(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "paper" => Self::Paper,
            "book" => Self::Book,
            "article" => Self::Article,
            "technical_doc" => Self::TechnicalDoc,
            "blog_post" => Self::BlogPost,
            "interview" => Self::Interview,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

impl From<String> for DocType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<DocType> for String {
    fn from(doc_type: DocType) -> Self {
        match doc_type {
            DocType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReadingLevel
// ---------------------------------------------------------------------------

/// Intended audience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ReadingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl FromStr for ReadingLevel {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(EnrichError::validation(
                "reading_level",
                format!("unknown level '{other}' (expected beginner, intermediate, advanced or expert)"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// MetadataFacts
// ---------------------------------------------------------------------------

/// Unvalidated metadata facts, as supplied or inferred for one document.
///
/// Every attribute is optional here; [`DocumentMetadata::from_facts`] decides
/// which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataFacts {
    pub title: Option<String>,
    pub authors: Vec<String>,
    #[serde(deserialize_with = "deserialize_publication_date")]
    pub publication_date: Option<DateTime<Utc>>,
    pub source_url: Option<String>,
    pub primary_topic: Option<String>,
    pub subtopics: Vec<String>,
    pub keywords: Vec<String>,
    pub doc_type: Option<String>,
    pub credibility_score: Option<f64>,
    pub publication_venue: Option<String>,
    pub peer_reviewed: bool,
    pub language: Option<String>,
    pub reading_level: Option<String>,
    pub estimated_read_time_minutes: Option<u32>,
    pub external_ids: BTreeMap<String, String>,
    pub cited_works: Vec<String>,
    pub custom_tags: Vec<String>,
    pub content_warnings: Vec<String>,
}

impl MetadataFacts {
    /// Parse facts from a JSON object.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| EnrichError::validation("metadata", e.to_string()))
    }
}

/// Parse a publication date given as RFC 3339 or as a bare `YYYY-MM-DD`.
pub fn parse_publication_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::default()).and_utc())
        .map_err(|e| {
            EnrichError::validation(
                "publication_date",
                format!("'{raw}' is neither RFC 3339 nor YYYY-MM-DD: {e}"),
            )
        })
}

fn deserialize_publication_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.as_deref()
        .map(parse_publication_date)
        .transpose()
        .map_err(serde::de::Error::custom)
}

// ---------------------------------------------------------------------------
// DocumentMetadata
// ---------------------------------------------------------------------------

/// Validated descriptive record attached to one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MetadataFacts")]
pub struct DocumentMetadata {
    pub title: String,
    /// "First Last" ordered once normalized.
    pub authors: Vec<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub source_url: Option<String>,
    /// Drives grouping and instruction selection.
    pub primary_topic: String,
    pub subtopics: Vec<String>,
    pub keywords: Vec<String>,
    pub doc_type: DocType,
    /// Quality score in `[0, 1]`.
    pub credibility_score: Option<f64>,
    pub publication_venue: Option<String>,
    pub peer_reviewed: bool,
    /// ISO language code.
    pub language: String,
    pub reading_level: Option<ReadingLevel>,
    pub estimated_read_time_minutes: Option<u32>,
    /// Identifier scheme (doi, arxiv, isbn, ...) to identifier.
    pub external_ids: BTreeMap<String, String>,
    pub cited_works: Vec<String>,
    pub custom_tags: Vec<String>,
    pub content_warnings: Vec<String>,
}

impl DocumentMetadata {
    /// Build a validated record from a property bag of facts.
    ///
    /// Fails when `title`, `primary_topic` or `doc_type` is missing or blank,
    /// when `credibility_score` falls outside `[0, 1]`, or when
    /// `reading_level` is not a known level.
    pub fn from_facts(facts: MetadataFacts) -> Result<Self> {
        let title = required_text("title", facts.title)?;
        let primary_topic = required_text("primary_topic", facts.primary_topic)?;
        let doc_type = DocType::from(required_text("doc_type", facts.doc_type)?);
        let reading_level = facts
            .reading_level
            .as_deref()
            .map(str::parse::<ReadingLevel>)
            .transpose()?;
        let language = facts
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let metadata = Self {
            title,
            authors: facts.authors,
            publication_date: facts.publication_date,
            source_url: facts.source_url,
            primary_topic,
            subtopics: facts.subtopics,
            keywords: facts.keywords,
            doc_type,
            credibility_score: facts.credibility_score,
            publication_venue: facts.publication_venue,
            peer_reviewed: facts.peer_reviewed,
            language,
            reading_level,
            estimated_read_time_minutes: facts.estimated_read_time_minutes,
            external_ids: facts.external_ids,
            cited_works: facts.cited_works,
            custom_tags: facts.custom_tags,
            content_warnings: facts.content_warnings,
        };
        metadata.validate()?;
        Ok(metadata)
    }

    /// Parse and validate a JSON property bag.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Self::from_facts(MetadataFacts::from_value(value)?)
    }

    /// Re-check the required-field and range rules.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(EnrichError::validation("title", "must not be empty"));
        }
        if self.primary_topic.trim().is_empty() {
            return Err(EnrichError::validation("primary_topic", "must not be empty"));
        }
        if self.doc_type.as_str().trim().is_empty() {
            return Err(EnrichError::validation("doc_type", "must not be empty"));
        }
        if let Some(score) = self.credibility_score {
            check_score(score)?;
        }
        Ok(())
    }

    /// Store a credibility score, rejecting values outside `[0, 1]`.
    pub fn set_credibility_score(&mut self, score: f64) -> Result<()> {
        check_score(score)?;
        self.credibility_score = Some(score);
        Ok(())
    }

    /// Serialize every attribute into a flat map. Absent optionals are `null`.
    pub fn to_property_bag(&self) -> Result<PropertyBag> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(EnrichError::Serialization(format!(
                "metadata serialized to a non-object: {other}"
            ))),
            Err(e) => Err(EnrichError::Serialization(e.to_string())),
        }
    }
}

impl TryFrom<MetadataFacts> for DocumentMetadata {
    type Error = EnrichError;

    fn try_from(facts: MetadataFacts) -> Result<Self> {
        Self::from_facts(facts)
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(EnrichError::validation(field, "is required and must not be empty")),
    }
}

fn check_score(score: f64) -> Result<()> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(EnrichError::validation(
            "credibility_score",
            format!("{score} is outside [0, 1]"),
        ))
    }
}

// ---------------------------------------------------------------------------
// EnrichedDocument
// ---------------------------------------------------------------------------

/// One document's content reference plus its metadata, ready for ingestion.
///
/// Immutable once built. Serializes as its flat property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedDocument {
    /// File path or literal text.
    content: String,
    metadata: DocumentMetadata,
    /// Abbreviation to canonical term, for this document only.
    canonical_entities: Option<BTreeMap<String, String>>,
}

impl EnrichedDocument {
    pub fn new(
        content: impl Into<String>,
        metadata: DocumentMetadata,
        canonical_entities: Option<BTreeMap<String, String>>,
    ) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(EnrichError::validation("content", "must not be empty"));
        }
        metadata.validate()?;
        Ok(Self {
            content,
            metadata,
            canonical_entities,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn canonical_entities(&self) -> Option<&BTreeMap<String, String>> {
        self.canonical_entities.as_ref()
    }

    /// Flatten into the attribute map the ingestion side expects.
    ///
    /// `content` and `canonical_entities` sit next to every metadata
    /// attribute; there is no nested `metadata` object.
    pub fn to_property_bag(&self) -> Result<PropertyBag> {
        let mut bag = PropertyBag::new();
        bag.insert(
            "content".into(),
            serde_json::Value::String(self.content.clone()),
        );
        let entities = serde_json::to_value(&self.canonical_entities)
            .map_err(|e| EnrichError::Serialization(e.to_string()))?;
        bag.insert("canonical_entities".into(), entities);
        bag.extend(self.metadata.to_property_bag()?);
        Ok(bag)
    }
}

impl Serialize for EnrichedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_property_bag()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn facts() -> MetadataFacts {
        MetadataFacts {
            title: Some("Attention Is All You Need".into()),
            authors: vec!["Ashish Vaswani".into(), "Noam Shazeer".into()],
            primary_topic: Some("ai".into()),
            doc_type: Some("paper".into()),
            ..Default::default()
        }
    }

    #[test]
    fn from_facts_applies_defaults() {
        let meta = DocumentMetadata::from_facts(facts()).expect("valid facts");
        assert_eq!(meta.title, "Attention Is All You Need");
        assert_eq!(meta.doc_type, DocType::Paper);
        assert_eq!(meta.language, "en");
        assert!(!meta.peer_reviewed);
        assert!(meta.credibility_score.is_none());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        for field in ["title", "primary_topic", "doc_type"] {
            let mut f = facts();
            match field {
                "title" => f.title = None,
                "primary_topic" => f.primary_topic = Some("   ".into()),
                _ => f.doc_type = Some(String::new()),
            }
            let err = DocumentMetadata::from_facts(f).unwrap_err();
            match err {
                EnrichError::Validation { field: got, .. } => assert_eq!(got, field),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn credibility_score_range_is_enforced() {
        for bad in [-0.01, 1.01, f64::NAN] {
            let mut f = facts();
            f.credibility_score = Some(bad);
            assert!(DocumentMetadata::from_facts(f).unwrap_err().is_validation());
        }
        for ok in [0.0, 0.5, 1.0] {
            let mut f = facts();
            f.credibility_score = Some(ok);
            assert!(DocumentMetadata::from_facts(f).is_ok());
        }
    }

    #[test]
    fn set_credibility_score_validates() {
        let mut meta = DocumentMetadata::from_facts(facts()).unwrap();
        assert!(meta.set_credibility_score(1.5).is_err());
        assert!(meta.credibility_score.is_none());
        meta.set_credibility_score(0.75).unwrap();
        assert_eq!(meta.credibility_score, Some(0.75));
    }

    #[test]
    fn unknown_doc_type_is_other() {
        let mut f = facts();
        f.doc_type = Some("podcast".into());
        let meta = DocumentMetadata::from_facts(f).unwrap();
        assert_eq!(meta.doc_type, DocType::Other("podcast".into()));
        assert!(!meta.doc_type.is_known());
        assert_eq!(meta.doc_type.to_string(), "podcast");
    }

    #[test]
    fn doc_type_matching_ignores_case() {
        assert_eq!(DocType::from("Blog_Post"), DocType::BlogPost);
        assert_eq!(DocType::from(" technical_doc "), DocType::TechnicalDoc);
        assert_eq!(String::from(DocType::Interview), "interview");
    }

    #[test]
    fn reading_level_parses_or_fails() {
        let mut f = facts();
        f.reading_level = Some("Advanced".into());
        let meta = DocumentMetadata::from_facts(f).unwrap();
        assert_eq!(meta.reading_level, Some(ReadingLevel::Advanced));

        let mut f = facts();
        f.reading_level = Some("wizard".into());
        assert!(DocumentMetadata::from_facts(f).unwrap_err().is_validation());
    }

    #[test]
    fn publication_date_formats() {
        let date_only = parse_publication_date("2024-01-01").unwrap();
        assert_eq!(date_only, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let rfc = parse_publication_date("2023-06-15T12:30:00+02:00").unwrap();
        assert_eq!(rfc.year(), 2023);
        assert_eq!(rfc, Utc.with_ymd_and_hms(2023, 6, 15, 10, 30, 0).unwrap());

        assert!(parse_publication_date("last tuesday").is_err());
    }

    #[test]
    fn from_value_parses_property_bag() {
        let value = serde_json::json!({
            "title": "CRISPR Basics",
            "primary_topic": "biology",
            "doc_type": "article",
            "publication_date": "2022-03-01",
            "external_ids": {"doi": "10.1000/xyz"},
            "peer_reviewed": true,
        });
        let meta = DocumentMetadata::from_value(value).unwrap();
        assert!(meta.peer_reviewed);
        assert_eq!(meta.external_ids.get("doi").map(String::as_str), Some("10.1000/xyz"));
        assert!(meta.publication_date.is_some());
    }

    #[test]
    fn from_value_rejects_malformed_bag() {
        let value = serde_json::json!({"title": "x", "authors": "not a list"});
        assert!(DocumentMetadata::from_value(value).unwrap_err().is_validation());
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let json = r#"{"title":"t","primary_topic":"ai","doc_type":"book","credibility_score":2.0}"#;
        assert!(serde_json::from_str::<DocumentMetadata>(json).is_err());

        let json = r#"{"title":"t","primary_topic":"ai","doc_type":"book"}"#;
        let meta: DocumentMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.doc_type, DocType::Book);
    }

    #[test]
    fn metadata_serialization_reparses_equal() {
        let mut f = facts();
        f.publication_date = Some(Utc.with_ymd_and_hms(2020, 5, 4, 0, 0, 0).unwrap());
        f.reading_level = Some("expert".into());
        let meta = DocumentMetadata::from_facts(f).unwrap();
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: DocumentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn enriched_document_flattens_metadata() {
        let meta = DocumentMetadata::from_facts(facts()).unwrap();
        let mut entities = BTreeMap::new();
        entities.insert("GPT".to_string(), "Generative Pre-trained Transformer".to_string());
        let doc = EnrichedDocument::new("data/ai/paper.pdf", meta, Some(entities)).unwrap();

        let bag = doc.to_property_bag().unwrap();
        assert!(!bag.contains_key("metadata"));
        assert_eq!(bag["content"], "data/ai/paper.pdf");
        assert_eq!(bag["title"], "Attention Is All You Need");
        assert_eq!(bag["doc_type"], "paper");
        assert_eq!(bag["canonical_entities"]["GPT"], "Generative Pre-trained Transformer");
        assert!(bag["publication_date"].is_null());
        assert!(bag["credibility_score"].is_null());
        assert!(bag.contains_key("content_warnings"));
    }

    #[test]
    fn enriched_document_serializes_flat() {
        let meta = DocumentMetadata::from_facts(facts()).unwrap();
        let doc = EnrichedDocument::new("x", meta, None).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        let object = value.as_object().expect("flat object");
        assert!(!object.contains_key("metadata"));
        assert_eq!(object["title"], "Attention Is All You Need");
        assert_eq!(object, &doc.to_property_bag().unwrap());
    }

    #[test]
    fn enriched_document_without_entities_has_null_entry() {
        let meta = DocumentMetadata::from_facts(facts()).unwrap();
        let doc = EnrichedDocument::new("some literal text", meta, None).unwrap();
        let bag = doc.to_property_bag().unwrap();
        assert!(bag["canonical_entities"].is_null());
    }

    #[test]
    fn enriched_document_requires_content() {
        let meta = DocumentMetadata::from_facts(facts()).unwrap();
        assert!(EnrichedDocument::new("  ", meta, None).unwrap_err().is_validation());
    }

    #[test]
    fn enriched_document_revalidates_metadata() {
        let mut meta = DocumentMetadata::from_facts(facts()).unwrap();
        meta.credibility_score = Some(3.0);
        assert!(EnrichedDocument::new("x", meta, None).is_err());
    }
}
