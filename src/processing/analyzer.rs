//! Score engine: one complete analysis per (job description, resume) pair

use crate::config::Config;
use crate::error::{MatcherError, Result};
use crate::processing::classifier::{FitAssessment, FitClassifier};
use crate::processing::embeddings::{CacheStats, SemanticScorer};
use crate::processing::features::{FeatureVector, KEYWORD_MATCH_CAP};
use crate::processing::keywords::{KeywordExtractor, KeywordGapReport};
use crate::processing::lexical::LexicalScorer;
use crate::processing::recommendations::{
    self, RecommendationInputs, SectionSuggestions,
};
use crate::processing::scoring::{self, Explainability, SimilarityScores};
use crate::processing::skill_matcher::{SkillMatcher, SkillReport};
use crate::processing::text_processor::TextProcessor;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Immutable result of analyzing one resume against one job description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_score: u8,
    pub fit_score: u8,
    pub similarity: SimilarityScores,
    pub skills: SkillReport,
    pub features: FeatureVector,
    pub fit: FitAssessment,
    pub keywords: KeywordGapReport,
    pub explainability: Explainability,
    pub recommendations: Vec<String>,
    pub section_suggestions: SectionSuggestions,
    pub bullet_rewrite_templates: Vec<String>,
}

/// Coordinates the scorers. Holds no per-request state; the only mutable
/// state is the semantic scorer's embedding cache.
pub struct ScoreEngine {
    skills: SkillMatcher,
    lexical: LexicalScorer,
    semantic: SemanticScorer,
    classifier: FitClassifier,
    keywords: KeywordExtractor,
    processor: TextProcessor,
}

#[derive(Debug, Clone)]
pub struct ScoreEngineStats {
    pub embedding_cache: CacheStats,
    pub skill_catalog_size: usize,
}

impl ScoreEngine {
    pub fn new(
        skills: SkillMatcher,
        semantic: SemanticScorer,
        classifier: FitClassifier,
        keywords: KeywordExtractor,
    ) -> Self {
        Self {
            skills,
            lexical: LexicalScorer::new(),
            semantic,
            classifier,
            keywords,
            processor: TextProcessor::new(),
        }
    }

    /// Build every component from configuration; fails when the classifier
    /// artifact or embedding model cannot be loaded
    pub fn from_config(config: &Config) -> Result<Self> {
        let classifier = FitClassifier::load(&config.models.classifier_path)?;
        let skills = SkillMatcher::new(&config.skills.catalog)?;
        let semantic = SemanticScorer::from_config(config)?;
        let keywords = KeywordExtractor::new(
            config.processing.keyword_top_k,
            config.processing.keyword_ordering,
        );

        Ok(Self::new(skills, semantic, classifier, keywords))
    }

    /// Analyze one resume. Deterministic in its inputs and the loaded classifier.
    pub fn analyze(&self, job_description: &str, resume_text: &str) -> Result<AnalysisResult> {
        let start_time = Instant::now();

        let job_clean = self.processor.normalize(job_description);
        let resume_clean = self.processor.normalize(resume_text);
        if job_clean.is_empty() {
            return Err(MatcherError::InvalidInput(
                "Job description is empty after normalization".to_string(),
            ));
        }
        if resume_clean.is_empty() {
            return Err(MatcherError::InvalidInput(
                "Resume text is empty after normalization".to_string(),
            ));
        }

        let lexical = self.lexical.similarity(&job_clean, &resume_clean);
        let semantic = self.semantic.similarity(&job_clean, &resume_clean)?;

        let skills = self.skills.analyze(job_description, resume_text);
        let overlap_fraction = skills.overlap_fraction();

        let similarity = scoring::hybrid_similarity(lexical, semantic, overlap_fraction);
        let match_score = scoring::match_score(&similarity);

        let keyword_matches = self.keywords.match_count(job_description, resume_text, KEYWORD_MATCH_CAP);
        let features = FeatureVector::build(lexical, semantic, &skills, keyword_matches);
        let fit = self.classifier.assess(&features);
        let fit_score = scoring::fit_score(fit.probability);

        let keywords = self.keywords.find_missing(job_description, resume_text);

        let recommendations = recommendations::generate(&RecommendationInputs {
            missing_skills: &skills.missing,
            missing_keywords: &keywords.missing_keywords,
            semantic,
            overlap_fraction,
            fit_score,
        });
        let section_suggestions =
            recommendations::section_suggestions(&skills.missing, &keywords.missing_keywords);
        let bullet_rewrite_templates = recommendations::bullet_rewrite_templates(&keywords.missing_keywords);
        let explainability = scoring::explain(&features, fit.probability);

        debug!(
            "Analysis done in {:.2?}: match={} fit={} lexical={:.4} semantic={:.4}",
            start_time.elapsed(),
            match_score,
            fit_score,
            lexical,
            semantic
        );

        Ok(AnalysisResult {
            match_score,
            fit_score,
            similarity,
            skills,
            features,
            fit,
            keywords,
            explainability,
            recommendations,
            section_suggestions,
            bullet_rewrite_templates,
        })
    }

    /// Embedding cache occupancy and catalog size, for diagnostics
    pub fn stats(&self) -> ScoreEngineStats {
        ScoreEngineStats {
            embedding_cache: self.semantic.cache_stats(),
            skill_catalog_size: self.skills.skill_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbedderKind, DEFAULT_SKILLS};
    use crate::processing::classifier::{Attribution, ClassifierArtifact};
    use crate::processing::embeddings::HashingEmbedder;
    use crate::processing::features::FEATURE_NAMES;

    fn engine() -> ScoreEngine {
        let artifact = ClassifierArtifact {
            format_version: 1,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients: vec![2.0, 3.0, 2.5, -0.3, 0.05],
            intercept: -3.0,
            baseline: None,
        };
        ScoreEngine::new(
            SkillMatcher::new(DEFAULT_SKILLS).unwrap(),
            SemanticScorer::new(Box::new(HashingEmbedder::new(1024)), 64),
            FitClassifier::from_artifact(artifact).unwrap(),
            KeywordExtractor::default(),
        )
    }

    const JD: &str = "Looking for a Python developer with Docker and AWS experience.";
    const RESUME: &str = "Experienced Python engineer, built APIs with FastAPI, deployed on AWS.";

    #[test]
    fn test_missing_skill_is_reported() {
        let result = engine().analyze(JD, RESUME).unwrap();

        assert!(result.skills.missing.contains(&"docker".to_string()));
        assert!(result.skills.overlap_percent < 100.0);
        assert!(result.recommendations[0].starts_with("Missing critical skills: docker"));
        assert!(matches!(result.fit.attribution, Attribution::Available(_)));
    }

    #[test]
    fn test_scores_are_in_range() {
        let result = engine().analyze(JD, RESUME).unwrap();

        assert!((0.0..=1.0).contains(&result.similarity.lexical));
        assert!((0.0..=1.0).contains(&result.similarity.semantic));
        assert!((0.0..=1.0).contains(&result.similarity.hybrid));
        assert!(result.match_score <= 100);
        assert!(result.fit_score <= 100);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let engine = engine();
        let first = engine.analyze(JD, RESUME).unwrap();
        let second = engine.analyze(JD, RESUME).unwrap();
        assert_eq!(first, second);

        // A fresh engine with a cold cache gives the same answer
        assert_eq!(first, self::engine().analyze(JD, RESUME).unwrap());
    }

    #[test]
    fn test_empty_inputs_are_validation_errors() {
        let engine = engine();
        assert!(engine.analyze("", RESUME).unwrap_err().is_validation());
        assert!(engine.analyze(JD, "  !!! ").unwrap_err().is_validation());
    }

    #[test]
    fn test_stats_track_cached_embeddings() {
        let engine = engine();
        assert_eq!(engine.stats().embedding_cache.entries, 0);

        engine.analyze(JD, RESUME).unwrap();
        engine.analyze(JD, RESUME).unwrap();

        let stats = engine.stats();
        // One entry per distinct normalized text
        assert_eq!(stats.embedding_cache.entries, 2);
        assert_eq!(stats.embedding_cache.capacity, 64);
        assert_eq!(stats.embedding_cache.model_name, "hashing");
        assert_eq!(stats.skill_catalog_size, DEFAULT_SKILLS.len());
    }

    #[test]
    fn test_from_config_requires_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.models.embedder = EmbedderKind::Hashing;
        config.models.classifier_path = dir.path().join("missing.json");

        assert!(matches!(
            ScoreEngine::from_config(&config),
            Err(MatcherError::ModelLoading(_))
        ));
    }
}
