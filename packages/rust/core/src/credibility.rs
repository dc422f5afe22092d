//! Deterministic credibility scoring.
//!
//! The score is additive: a base value for the document type plus bonuses for
//! peer review, a prestige venue, recency and multiple authors, capped at the
//! configured maximum. The lower bound is not clamped.

use chrono::{DateTime, Utc};
use tracing::debug;

use docenrich_shared::{DocType, DocumentMetadata, ScoringConfig};

const DAYS_PER_YEAR: f64 = 365.0;

/// The attributes the score depends on.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub doc_type: &'a DocType,
    pub peer_reviewed: bool,
    pub publication_venue: Option<&'a str>,
    pub publication_date: Option<DateTime<Utc>>,
    pub authors: &'a [String],
}

impl<'a> From<&'a DocumentMetadata> for ScoringInput<'a> {
    fn from(meta: &'a DocumentMetadata) -> Self {
        Self {
            doc_type: &meta.doc_type,
            peer_reviewed: meta.peer_reviewed,
            publication_venue: meta.publication_venue.as_deref(),
            publication_date: meta.publication_date,
            authors: &meta.authors,
        }
    }
}

/// Per-factor contributions, mostly useful for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub peer_review: f64,
    pub venue: f64,
    pub recency: f64,
    pub multi_author: f64,
    /// Sum of the factors after the upper cap.
    pub total: f64,
}

/// Scores documents against a fixed [`ScoringConfig`].
#[derive(Debug, Clone)]
pub struct CredibilityScorer {
    config: ScoringConfig,
    /// Lower-cased copy of `config.prestige_venues`.
    venue_markers: Vec<String>,
}

impl Default for CredibilityScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl CredibilityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        let venue_markers = config
            .prestige_venues
            .iter()
            .map(|v| v.to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        Self {
            config,
            venue_markers,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one document as of `reference_now`.
    ///
    /// Identical inputs always produce the identical score; the clock is never
    /// read here.
    pub fn score(&self, input: &ScoringInput<'_>, reference_now: DateTime<Utc>) -> f64 {
        self.breakdown(input, reference_now).total
    }

    /// Score a validated metadata record.
    pub fn score_metadata(&self, meta: &DocumentMetadata, reference_now: DateTime<Utc>) -> f64 {
        self.score(&ScoringInput::from(meta), reference_now)
    }

    pub fn breakdown(&self, input: &ScoringInput<'_>, reference_now: DateTime<Utc>) -> ScoreBreakdown {
        let cfg = &self.config;

        let base = cfg
            .type_scores
            .get(&input.doc_type.as_str().to_lowercase())
            .copied()
            .unwrap_or(cfg.unknown_type_score);

        let peer_review = if input.peer_reviewed {
            cfg.peer_review_bonus
        } else {
            0.0
        };

        let venue = match input.publication_venue {
            Some(v) if self.is_prestige_venue(v) => cfg.venue_bonus,
            _ => 0.0,
        };

        let recency = input
            .publication_date
            .map_or(0.0, |date| self.recency_adjustment(date, reference_now));

        let multi_author = if input.authors.len() >= cfg.multi_author_threshold {
            cfg.multi_author_bonus
        } else {
            0.0
        };

        let total = (base + peer_review + venue + recency + multi_author).min(cfg.max_score);

        let breakdown = ScoreBreakdown {
            base,
            peer_review,
            venue,
            recency,
            multi_author,
            total,
        };
        debug!(doc_type = %input.doc_type, ?breakdown, "scored document");
        breakdown
    }

    /// Case-insensitive substring match against the prestige list.
    pub fn is_prestige_venue(&self, venue: &str) -> bool {
        let venue = venue.to_lowercase();
        self.venue_markers.iter().any(|m| venue.contains(m.as_str()))
    }

    fn recency_adjustment(&self, published: DateTime<Utc>, reference_now: DateTime<Utc>) -> f64 {
        // Future-dated publications get neither bonus nor penalty.
        if published > reference_now {
            return 0.0;
        }
        let age_years = (reference_now - published).num_days() as f64 / DAYS_PER_YEAR;
        if age_years < self.config.recent_within_years {
            self.config.recency_bonus
        } else if age_years > self.config.stale_after_years {
            -self.config.stale_penalty
        } else {
            0.0
        }
    }
}

/// Score with the default constants.
pub fn score(
    doc_type: &DocType,
    peer_reviewed: bool,
    publication_venue: Option<&str>,
    publication_date: Option<DateTime<Utc>>,
    authors: &[String],
    reference_now: DateTime<Utc>,
) -> f64 {
    let input = ScoringInput {
        doc_type,
        peer_reviewed,
        publication_venue,
        publication_date,
        authors,
    };
    CredibilityScorer::default().score(&input, reference_now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use docenrich_shared::MetadataFacts;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn authors(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Author {i}")).collect()
    }

    #[test]
    fn everything_maxes_out_at_one() {
        let s = score(
            &DocType::Paper,
            true,
            Some("NeurIPS 2024"),
            Some(now() - Duration::days(365)),
            &authors(3),
            now(),
        );
        assert_eq!(s, 1.0);
    }

    #[test]
    fn bare_blog_post_is_base_only() {
        let s = score(&DocType::BlogPost, false, None, None, &authors(1), now());
        assert_eq!(s, 0.15);
    }

    #[test]
    fn base_scores_by_type() {
        let cases = [
            (DocType::Paper, 0.40),
            (DocType::Book, 0.35),
            (DocType::TechnicalDoc, 0.30),
            (DocType::Article, 0.25),
            (DocType::Interview, 0.20),
            (DocType::BlogPost, 0.15),
            (DocType::Other("podcast".into()), 0.10),
        ];
        for (doc_type, expected) in cases {
            let s = score(&doc_type, false, None, None, &[], now());
            assert!((s - expected).abs() < EPS, "{doc_type}: {s} != {expected}");
        }
    }

    #[test]
    fn venue_match_is_case_insensitive_substring() {
        let scorer = CredibilityScorer::default();
        assert!(scorer.is_prestige_venue("Physical Review Letters"));
        assert!(scorer.is_prestige_venue("Proc. IEEE Symposium"));
        assert!(scorer.is_prestige_venue("NATURE MACHINE INTELLIGENCE"));
        assert!(!scorer.is_prestige_venue("Example Conference 2024"));

        let s = score(&DocType::Article, false, Some("The Lancet"), None, &[], now());
        assert!((s - 0.45).abs() < EPS);
    }

    #[test]
    fn recency_bonus_and_penalty() {
        let recent = score(
            &DocType::Book,
            false,
            None,
            Some(now() - Duration::days(300)),
            &[],
            now(),
        );
        assert!((recent - 0.45).abs() < EPS);

        let middle = score(
            &DocType::Book,
            false,
            None,
            Some(now() - Duration::days(5 * 365)),
            &[],
            now(),
        );
        assert!((middle - 0.35).abs() < EPS);

        let old = score(
            &DocType::Book,
            false,
            None,
            Some(now() - Duration::days(11 * 365)),
            &[],
            now(),
        );
        assert!((old - 0.30).abs() < EPS);
    }

    #[test]
    fn recency_cutoffs_are_exclusive() {
        let scorer = CredibilityScorer::default();
        let doc_type = DocType::Paper;
        let at = |days: i64| ScoringInput {
            doc_type: &doc_type,
            peer_reviewed: false,
            publication_venue: None,
            publication_date: Some(now() - Duration::days(days)),
            authors: &[],
        };
        assert_eq!(scorer.breakdown(&at(2 * 365), now()).recency, 0.0);
        assert_eq!(scorer.breakdown(&at(2 * 365 - 1), now()).recency, 0.10);
        assert_eq!(scorer.breakdown(&at(10 * 365), now()).recency, 0.0);
        assert_eq!(scorer.breakdown(&at(10 * 365 + 1), now()).recency, -0.05);
    }

    #[test]
    fn future_dates_get_no_adjustment() {
        let s = score(
            &DocType::Article,
            false,
            None,
            Some(now() + Duration::days(30)),
            &[],
            now(),
        );
        assert!((s - 0.25).abs() < EPS);
    }

    #[test]
    fn multi_author_threshold() {
        let two = score(&DocType::Interview, false, None, None, &authors(2), now());
        let three = score(&DocType::Interview, false, None, None, &authors(3), now());
        assert!((two - 0.20).abs() < EPS);
        assert!((three - 0.25).abs() < EPS);
    }

    #[test]
    fn custom_config_changes_constants() {
        let config = ScoringConfig {
            prestige_venues: vec!["ArXiv".into()],
            venue_bonus: 0.5,
            ..Default::default()
        };
        let scorer = CredibilityScorer::new(config);
        let meta = DocumentMetadata::from_facts(MetadataFacts {
            title: Some("Preprint".into()),
            primary_topic: Some("ai".into()),
            doc_type: Some("paper".into()),
            publication_venue: Some("arXiv preprint".into()),
            ..Default::default()
        })
        .unwrap();
        assert!((scorer.score_metadata(&meta, now()) - 0.90).abs() < EPS);
    }

    #[test]
    fn scoring_is_repeatable() {
        let date = Some(now() - Duration::days(800));
        let a = score(&DocType::Paper, true, Some("ICML"), date, &authors(4), now());
        let b = score(&DocType::Paper, true, Some("ICML"), date, &authors(4), now());
        assert_eq!(a, b);
    }

    fn doc_type_strategy() -> impl Strategy<Value = DocType> {
        prop_oneof![
            Just(DocType::Paper),
            Just(DocType::Book),
            Just(DocType::Article),
            Just(DocType::TechnicalDoc),
            Just(DocType::BlogPost),
            Just(DocType::Interview),
            "[a-z]{1,10}".prop_map(DocType::from),
        ]
    }

    proptest! {
        #[test]
        fn default_scores_stay_in_unit_interval(
            doc_type in doc_type_strategy(),
            peer_reviewed in any::<bool>(),
            venue in proptest::option::of("[A-Za-z ]{0,24}"),
            age_days in proptest::option::of(-3650i64..20_000),
            n_authors in 0usize..8,
        ) {
            let date = age_days.map(|d| now() - Duration::days(d));
            let s = score(&doc_type, peer_reviewed, venue.as_deref(), date, &authors(n_authors), now());
            prop_assert!((0.0..=1.0).contains(&s), "score {} out of range", s);
        }
    }
}
