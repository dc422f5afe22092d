//! Canonical entity resolution for domain abbreviations.
//!
//! A static, topic-keyed term table maps abbreviations (`GPT`, `QKD`, `PCR`)
//! to their full canonical names. Resolution finds which abbreviations a text
//! mentions; embedding rewrites the first mention of each so that downstream
//! extraction sees the full name.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

/// Abbreviation → canonical term, per domain. Domain keys are lower-case.
const CANONICAL_TERMS: &[(&str, &[(&str, &str)])] = &[
    (
        "ai",
        &[
            ("GPT", "Generative Pre-trained Transformer"),
            ("BERT", "Bidirectional Encoder Representations from Transformers"),
            ("LLM", "Large Language Model"),
            ("NLP", "Natural Language Processing"),
            ("CV", "Computer Vision"),
            ("RL", "Reinforcement Learning"),
            ("GAN", "Generative Adversarial Network"),
            ("CNN", "Convolutional Neural Network"),
            ("RNN", "Recurrent Neural Network"),
            ("LSTM", "Long Short-Term Memory"),
            ("API", "Application Programming Interface"),
        ],
    ),
    (
        "quantum_computing",
        &[
            ("QC", "Quantum Computing"),
            ("QKD", "Quantum Key Distribution"),
            ("VQE", "Variational Quantum Eigensolver"),
            ("QAOA", "Quantum Approximate Optimization Algorithm"),
            ("QPU", "Quantum Processing Unit"),
        ],
    ),
    (
        "biology",
        &[
            ("DNA", "Deoxyribonucleic Acid"),
            ("RNA", "Ribonucleic Acid"),
            ("mRNA", "messenger Ribonucleic Acid"),
            ("CRISPR", "Clustered Regularly Interspaced Short Palindromic Repeats"),
            ("PCR", "Polymerase Chain Reaction"),
        ],
    ),
];

/// One table entry with its compiled whole-word matcher.
struct TermPattern {
    abbreviation: &'static str,
    canonical: &'static str,
    pattern: Regex,
}

/// Compiled once per process; read-only afterwards.
static TERM_TABLE: LazyLock<BTreeMap<&'static str, Vec<TermPattern>>> = LazyLock::new(|| {
    CANONICAL_TERMS
        .iter()
        .map(|&(domain, terms)| {
            let patterns = terms
                .iter()
                .filter_map(|&(abbreviation, canonical)| match whole_word(abbreviation) {
                    Ok(pattern) => Some(TermPattern {
                        abbreviation,
                        canonical,
                        pattern,
                    }),
                    Err(e) => {
                        warn!(abbreviation, error = %e, "skipping uncompilable term");
                        None
                    }
                })
                .collect();
            (domain, patterns)
        })
        .collect()
});

/// Case-insensitive, whole-word matcher for a literal abbreviation.
fn whole_word(abbreviation: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(abbreviation)))
        .case_insensitive(true)
        .build()
}

/// Domains present in the term table.
pub fn known_domains() -> Vec<&'static str> {
    TERM_TABLE.keys().copied().collect()
}

/// Full table for one domain (case-insensitive). Unknown domains are empty.
pub fn terms_for_domain(domain: &str) -> BTreeMap<&'static str, &'static str> {
    TERM_TABLE
        .get(domain.to_lowercase().as_str())
        .map(|terms| {
            terms
                .iter()
                .map(|t| (t.abbreviation, t.canonical))
                .collect()
        })
        .unwrap_or_default()
}

/// Abbreviations from `domain` that `text` mentions, with their canonical terms.
///
/// Matching is whole-word and case-insensitive. An unknown domain yields an
/// empty map, never an error.
pub fn extract_canonical_entities(text: &str, domain: &str) -> BTreeMap<String, String> {
    let Some(terms) = TERM_TABLE.get(domain.to_lowercase().as_str()) else {
        debug!(domain, "no canonical terms for domain");
        return BTreeMap::new();
    };

    terms
        .iter()
        .filter(|t| t.pattern.is_match(text))
        .map(|t| (t.abbreviation.to_string(), t.canonical.to_string()))
        .collect()
}

/// Expand the first mention of each abbreviation as `"ABBR (Canonical Term)"`.
///
/// Later mentions stay as they are. All matches are located in the original
/// text before anything is rewritten, so an expansion is never expanded
/// again. When two first mentions overlap, the earlier one wins.
pub fn embed_canonical_terms(text: &str, canonical_map: &BTreeMap<String, String>) -> String {
    let mut spans: Vec<(usize, usize, String)> = canonical_map
        .iter()
        .filter_map(|(abbreviation, canonical)| {
            let pattern = match whole_word(abbreviation) {
                Ok(p) => p,
                Err(e) => {
                    warn!(%abbreviation, error = %e, "skipping uncompilable abbreviation");
                    return None;
                }
            };
            pattern
                .find(text)
                .map(|m| (m.start(), m.end(), format!("{abbreviation} ({canonical})")))
        })
        .collect();
    spans.sort_by_key(|(start, end, _)| (*start, *end));

    let mut out = String::with_capacity(text.len() + spans.len() * 32);
    let mut cursor = 0;
    for (start, end, replacement) in spans {
        if start < cursor {
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push_str(&replacement);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}
