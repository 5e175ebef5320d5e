//! Per-pair TF-IDF cosine similarity
//!
//! The vector space is built from exactly the two documents being compared,
//! with no vocabulary shared across calls. A lexical score is therefore only
//! comparable to other scores computed against the same job description.

use crate::processing::text_processor::TextProcessor;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct LexicalScorer {
    processor: TextProcessor,
}

impl LexicalScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// TF-IDF cosine similarity of two documents, in `[0, 1]`
    pub fn similarity(&self, doc_a: &str, doc_b: &str) -> f64 {
        let counts_a = self.term_counts(doc_a);
        let counts_b = self.term_counts(doc_b);

        if counts_a.is_empty() || counts_b.is_empty() {
            return 0.0;
        }

        let shared: HashSet<&str> = counts_a
            .keys()
            .filter(|t| counts_b.contains_key(*t))
            .map(String::as_str)
            .collect();

        let vec_a = weighted_unit_vector(&counts_a, &shared);
        let vec_b = weighted_unit_vector(&counts_b, &shared);

        let dot: f64 = vec_a
            .iter()
            .filter_map(|(term, wa)| vec_b.get(term).map(|wb| wa * wb))
            .sum();

        dot.clamp(0.0, 1.0)
    }

    fn term_counts(&self, text: &str) -> HashMap<String, f64> {
        let mut counts = HashMap::new();
        for term in self.processor.analyze_terms(text) {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }
        counts
    }
}

/// Smoothed idf over a two-document corpus: `ln((1 + n) / (1 + df)) + 1`
fn idf(document_frequency: usize) -> f64 {
    const N_DOCS: f64 = 2.0;
    ((1.0 + N_DOCS) / (1.0 + document_frequency as f64)).ln() + 1.0
}

fn weighted_unit_vector<'a>(
    counts: &'a HashMap<String, f64>,
    shared: &HashSet<&str>,
) -> HashMap<&'a str, f64> {
    let mut weights: HashMap<&str, f64> = counts
        .iter()
        .map(|(term, count)| {
            let df = if shared.contains(term.as_str()) { 2 } else { 1 };
            (term.as_str(), count * idf(df))
        })
        .collect();

    let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for w in weights.values_mut() {
            *w /= norm;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents() {
        let scorer = LexicalScorer::new();
        let text = "python developer with docker and aws experience";
        let sim = scorer.similarity(text, text);
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_documents() {
        let scorer = LexicalScorer::new();
        let sim = scorer.similarity("python docker kubernetes", "pastry chef baking bread");
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_partial_overlap_is_between_bounds() {
        let scorer = LexicalScorer::new();
        let sim = scorer.similarity(
            "looking for python developer with docker and aws experience",
            "experienced python engineer built apis with fastapi deployed on aws",
        );
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_only_stop_words_scores_zero() {
        let scorer = LexicalScorer::new();
        assert_eq!(scorer.similarity("the and of", "python developer"), 0.0);
        assert_eq!(scorer.similarity("", ""), 0.0);
    }

    #[test]
    fn test_is_symmetric() {
        let scorer = LexicalScorer::new();
        let a = "rust systems engineer with tokio";
        let b = "tokio async rust services and rust tooling";
        assert!((scorer.similarity(a, b) - scorer.similarity(b, a)).abs() < 1e-12);
    }
}
