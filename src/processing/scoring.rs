//! Weighted fusion of the similarity signals into user-facing scores

use crate::processing::features::FeatureVector;
use crate::processing::skill_matcher::round_to;
use serde::{Deserialize, Serialize};

pub const LEXICAL_WEIGHT: f64 = 0.35;
pub const SEMANTIC_WEIGHT: f64 = 0.45;
pub const OVERLAP_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScores {
    pub lexical: f64,
    pub semantic: f64,
    pub hybrid: f64,
}

/// Per-component share of the match score, plus the classifier probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explainability {
    pub tfidf_contribution: f64,
    pub sbert_contribution: f64,
    pub skill_overlap_contribution: f64,
    pub missing_skills_count: usize,
    pub keyword_matches: usize,
    pub classifier_fit_probability: f64,
}

pub fn hybrid_similarity(lexical: f64, semantic: f64, overlap_fraction: f64) -> SimilarityScores {
    SimilarityScores {
        lexical,
        semantic,
        hybrid: lexical * LEXICAL_WEIGHT + semantic * SEMANTIC_WEIGHT + overlap_fraction * OVERLAP_WEIGHT,
    }
}

/// Hybrid similarity as an integer in `[0, 100]`
pub fn match_score(similarity: &SimilarityScores) -> u8 {
    (similarity.hybrid * 100.0).clamp(0.0, 100.0).round() as u8
}

pub fn fit_score(probability: f64) -> u8 {
    (probability * 100.0).clamp(0.0, 100.0).round() as u8
}

pub fn explain(features: &FeatureVector, probability: f64) -> Explainability {
    Explainability {
        tfidf_contribution: round_to(features.lexical * LEXICAL_WEIGHT * 100.0, 2),
        sbert_contribution: round_to(features.semantic * SEMANTIC_WEIGHT * 100.0, 2),
        skill_overlap_contribution: round_to(features.overlap_fraction * OVERLAP_WEIGHT * 100.0, 2),
        missing_skills_count: features.missing_skill_count,
        keyword_matches: features.keyword_match_count,
        classifier_fit_probability: round_to(probability, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        assert!((LEXICAL_WEIGHT + SEMANTIC_WEIGHT + OVERLAP_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_match_score_bounds() {
        assert_eq!(match_score(&hybrid_similarity(1.0, 1.0, 1.0)), 100);
        assert_eq!(match_score(&hybrid_similarity(0.0, 0.0, 0.0)), 0);
        // 0.35 * 0.5 + 0.45 * 0.5 + 0.2 * 0.25 = 0.45
        assert_eq!(match_score(&hybrid_similarity(0.5, 0.5, 0.25)), 45);
    }

    #[test]
    fn test_fit_score_rounds() {
        assert_eq!(fit_score(0.504), 50);
        assert_eq!(fit_score(0.505), 51);
        assert_eq!(fit_score(1.0), 100);
    }

    #[test]
    fn test_explain_contributions() {
        let features = FeatureVector {
            lexical: 0.5,
            semantic: 0.8,
            overlap_fraction: 0.25,
            missing_skill_count: 3,
            keyword_match_count: 7,
        };
        let explained = explain(&features, 0.123456);
        assert_eq!(explained.tfidf_contribution, 17.5);
        assert_eq!(explained.sbert_contribution, 36.0);
        assert_eq!(explained.skill_overlap_contribution, 5.0);
        assert_eq!(explained.classifier_fit_probability, 0.1235);
    }
}
