//! Topic-scoped extraction instructions for the knowledge-graph builder.
//!
//! The result is opaque to this crate: it is assembled from fixed blocks and
//! handed over unexamined.

use std::collections::BTreeMap;

use docenrich_shared::EnrichedDocument;

const PREAMBLE: &str = "
You are extracting entities for a technical knowledge base.

**Use canonical entity names (REQUIRED):**
";

/// Canonical-naming blocks, keyed by lower-case topic.
const NAMING_BLOCKS: &[(&str, &str)] = &[
    (
        "ai",
        r#"
- "Generative Pre-trained Transformer" NOT "GPT"
- "Large Language Model" NOT "LLM"
- "Natural Language Processing" NOT "NLP"
- "Transformer Architecture" NOT "transformers"
- "Convolutional Neural Network" NOT "CNN"
- "Reinforcement Learning" NOT "RL"
"#,
    ),
    (
        "quantum_computing",
        r#"
- "Quantum Computing" NOT "QC"
- "Quantum Key Distribution" NOT "QKD"
- "Variational Quantum Eigensolver" NOT "VQE"
- "Quantum Processing Unit" NOT "QPU"
"#,
    ),
    (
        "biology",
        r#"
- "Deoxyribonucleic Acid" NOT "DNA"
- "Ribonucleic Acid" NOT "RNA"
- "Clustered Regularly Interspaced Short Palindromic Repeats" NOT "CRISPR"
- "Polymerase Chain Reaction" NOT "PCR"
"#,
    ),
];

const ENTITY_TYPES: &str = "
**Extract these entity types:**
- **Concept**: Technical concepts, theories, algorithms
- **Person**: Researchers, authors, experts (use full names)
- **Organization**: Research labs, companies, universities
- **Technology**: Tools, frameworks, systems
- **Method**: Techniques, methodologies, approaches
- **Paper**: Academic papers (extract title + year if available)
";

const RELATIONSHIP_TYPES: &str = "
**Relationship types:**
- is_subfield_of: Subtopic → main topic
- builds_on: New concept → foundational concept
- developed_by: Technology → creator
- published_in: Paper → venue
- applied_to: Method → application domain
- related_to: General conceptual connections
";

const CONSISTENCY_RULES: &str = "
**Consistency requirements:**
- Always use full canonical names on first mention
- Link abbreviations to canonical forms
- Maintain consistent entity IDs across chunks
- Use snake_case for relationship names (e.g., is_subfield_of)
";

/// Naming block for a topic, or `""` when the topic has none.
pub fn naming_block(topic: &str) -> &'static str {
    let topic = topic.trim().to_lowercase();
    NAMING_BLOCKS
        .iter()
        .find(|&&(key, _)| key == topic)
        .map_or("", |&(_, block)| block)
}

/// Build the instruction string for one topic.
///
/// Blocks are concatenated in a fixed order: preamble, naming block, entity
/// types, relationship types, consistency rules.
pub fn extraction_instructions(topic: &str) -> String {
    [
        PREAMBLE,
        naming_block(topic),
        ENTITY_TYPES,
        RELATIONSHIP_TYPES,
        CONSISTENCY_RULES,
    ]
    .concat()
}

/// One instruction string per distinct primary topic among `documents`.
pub fn instructions_by_topic(documents: &[EnrichedDocument]) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for doc in documents {
        let topic = &doc.metadata().primary_topic;
        if !out.contains_key(topic) {
            out.insert(topic.clone(), extraction_instructions(topic));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use docenrich_shared::{DocumentMetadata, MetadataFacts};

    fn doc(topic: &str) -> EnrichedDocument {
        let meta = DocumentMetadata::from_facts(MetadataFacts {
            title: Some("t".into()),
            primary_topic: Some(topic.into()),
            doc_type: Some("article".into()),
            ..Default::default()
        })
        .unwrap();
        EnrichedDocument::new("text", meta, None).unwrap()
    }

    #[test]
    fn blocks_appear_in_order() {
        let s = extraction_instructions("ai");
        let positions: Vec<usize> = [
            "You are extracting entities",
            "\"Large Language Model\" NOT \"LLM\"",
            "**Extract these entity types:**",
            "**Relationship types:**",
            "**Consistency requirements:**",
        ]
        .iter()
        .map(|needle| s.find(needle).expect("block present"))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn topic_selection_ignores_case() {
        assert!(extraction_instructions("AI").contains("NOT \"GPT\""));
        assert!(extraction_instructions("Biology").contains("NOT \"CRISPR\""));
        assert!(extraction_instructions("quantum_computing").contains("NOT \"QKD\""));
    }

    #[test]
    fn unknown_topic_has_empty_naming_block() {
        assert_eq!(naming_block("astronomy"), "");
        let s = extraction_instructions("astronomy");
        assert_eq!(
            s,
            [PREAMBLE, ENTITY_TYPES, RELATIONSHIP_TYPES, CONSISTENCY_RULES].concat()
        );
    }

    #[test]
    fn one_instruction_per_topic() {
        let docs = vec![doc("ai"), doc("biology"), doc("ai")];
        let by_topic = instructions_by_topic(&docs);
        assert_eq!(by_topic.len(), 2);
        assert!(by_topic["biology"].contains("Ribonucleic Acid"));
    }
}
