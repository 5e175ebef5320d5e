//! The five-feature vector consumed by the fit classifier
//!
//! Order, names and the keyword cap are shared with the offline training
//! pipeline. Changing any of them invalidates trained artifacts.

use crate::processing::skill_matcher::SkillReport;
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 5;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["tfidf_sim", "sbert_sim", "overlap", "missing_count", "keyword_matches"];

/// Cap on the shared-token count
pub const KEYWORD_MATCH_CAP: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub lexical: f64,
    pub semantic: f64,
    pub overlap_fraction: f64,
    pub missing_skill_count: usize,
    pub keyword_match_count: usize,
}

impl FeatureVector {
    pub fn build(
        lexical: f64,
        semantic: f64,
        skills: &SkillReport,
        keyword_match_count: usize,
    ) -> Self {
        Self {
            lexical,
            semantic,
            overlap_fraction: skills.overlap_fraction(),
            missing_skill_count: skills.missing.len(),
            keyword_match_count: keyword_match_count.min(KEYWORD_MATCH_CAP),
        }
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.lexical,
            self.semantic,
            self.overlap_fraction,
            self.missing_skill_count as f64,
            self.keyword_match_count as f64,
        ]
    }
}
