//! Salient job-description terms and the resume's keyword gaps

use crate::config::KeywordOrdering;
use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Vocabulary size cap for single-document term weighting
pub const MAX_VOCABULARY: usize = 2000;

pub const DEFAULT_TOP_K: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGapReport {
    pub top_job_keywords: Vec<String>,
    /// Subsequence of `top_job_keywords` whose first token the resume lacks
    pub missing_keywords: Vec<String>,
}

pub struct KeywordExtractor {
    top_k: usize,
    ordering: KeywordOrdering,
    processor: TextProcessor,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K, KeywordOrdering::Vocabulary)
    }
}

impl KeywordExtractor {
    pub fn new(top_k: usize, ordering: KeywordOrdering) -> Self {
        Self {
            top_k,
            ordering,
            processor: TextProcessor::new(),
        }
    }

    /// Up to `top_k` unigram and bigram terms of the job description.
    ///
    /// With [`KeywordOrdering::Vocabulary`] the terms come back in alphabetical
    /// vocabulary order, not by weight, so "top" means "first in the vocabulary".
    pub fn top_keywords(&self, job_description: &str) -> Vec<String> {
        let counts = self.ngram_counts(&self.processor.normalize(job_description));

        // Keep the most frequent terms, ties alphabetical
        let mut by_frequency: Vec<(String, usize)> = counts.into_iter().collect();
        by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        by_frequency.truncate(MAX_VOCABULARY);

        match self.ordering {
            KeywordOrdering::Vocabulary => {
                let mut vocabulary: Vec<String> = by_frequency.into_iter().map(|(t, _)| t).collect();
                vocabulary.sort();
                vocabulary.truncate(self.top_k);
                vocabulary
            }
            KeywordOrdering::Weight => {
                let total = by_frequency
                    .iter()
                    .map(|(_, c)| (*c as f64).powi(2))
                    .sum::<f64>()
                    .sqrt();
                let mut weighted: Vec<(String, f64)> = by_frequency
                    .into_iter()
                    .map(|(t, c)| (t, c as f64 / total))
                    .collect();
                weighted.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| a.0.cmp(&b.0))
                });
                weighted.into_iter().take(self.top_k).map(|(t, _)| t).collect()
            }
        }
    }

    pub fn find_missing(&self, job_description: &str, resume_text: &str) -> KeywordGapReport {
        let top_job_keywords = self.top_keywords(job_description);
        let resume_tokens: HashSet<String> = self.processor.token_set(resume_text);

        let missing_keywords = top_job_keywords
            .iter()
            .filter(|kw| {
                kw.split(' ')
                    .next()
                    .map(|first| !resume_tokens.contains(first))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        KeywordGapReport {
            top_job_keywords,
            missing_keywords,
        }
    }

    /// Size of the intersection of both normalized token sets, capped at `cap`
    pub fn match_count(&self, job_description: &str, resume_text: &str, cap: usize) -> usize {
        let job_tokens = self.processor.token_set(job_description);
        let resume_tokens = self.processor.token_set(resume_text);
        job_tokens.intersection(&resume_tokens).count().min(cap)
    }

    /// Unigram and bigram counts; bigrams are formed after stop-word removal
    fn ngram_counts(&self, text: &str) -> BTreeMap<String, usize> {
        let terms = self.processor.analyze_terms(text);
        let mut counts = BTreeMap::new();

        for term in &terms {
            *counts.entry(term.clone()).or_insert(0) += 1;
        }
        for pair in terms.windows(2) {
            *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "Looking for a Python developer with Docker and AWS experience.";

    #[test]
    fn test_vocabulary_order_is_alphabetical() {
        let keywords = KeywordExtractor::default().top_keywords(JD);
        let mut sorted = keywords.clone();
        sorted.sort();
        assert_eq!(keywords, sorted);
        assert!(keywords.contains(&"python developer".to_string()));
        assert!(keywords.contains(&"docker".to_string()));
        assert!(!keywords.contains(&"with".to_string()));
    }

    #[test]
    fn test_top_k_truncates() {
        let keywords = KeywordExtractor::new(3, KeywordOrdering::Vocabulary).top_keywords(JD);
        assert_eq!(keywords, vec!["aws", "aws experience", "developer"]);
    }

    #[test]
    fn test_weight_order_prefers_frequent_terms() {
        let jd = "Rust rust rust. Kubernetes kubernetes. Terraform.";
        let keywords = KeywordExtractor::new(2, KeywordOrdering::Weight).top_keywords(jd);
        assert_eq!(keywords, vec!["rust", "kubernetes"]);
    }

    #[test]
    fn test_missing_keywords_checks_first_token() {
        let report = KeywordExtractor::default()
            .find_missing(JD, "Python engineer who ships with docker daily");

        assert!(!report.missing_keywords.contains(&"python developer".to_string()));
        assert!(!report.missing_keywords.contains(&"docker".to_string()));
        assert!(report.missing_keywords.contains(&"aws".to_string()));
        assert!(report
            .missing_keywords
            .iter()
            .all(|kw| report.top_job_keywords.contains(kw)));
    }

    #[test]
    fn test_keyword_match_count_is_capped() {
        let extractor = KeywordExtractor::default();
        assert_eq!(extractor.match_count("a b c d", "c d e", 30), 2);
        let many: String = (0..40).map(|i| format!("w{} ", i)).collect();
        assert_eq!(extractor.match_count(&many, &many, 30), 30);
    }

    #[test]
    fn test_empty_job_description_has_no_keywords() {
        let report = KeywordExtractor::default().find_missing("", "anything");
        assert!(report.top_job_keywords.is_empty());
        assert!(report.missing_keywords.is_empty());
    }
}
