//! Pretrained linear fit classifier with per-feature attribution

use crate::error::{MatcherError, Result};
use crate::processing::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use log::{info, warn};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// On-disk classifier artifact produced by the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Reference point for attribution, zeros when absent
    #[serde(default)]
    pub baseline: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Attribution {
    /// Contributions sorted by descending absolute value
    Available(Vec<FeatureContribution>),
    Unavailable(String),
}

impl Attribution {
    pub fn contributions(&self) -> &[FeatureContribution] {
        match self {
            Attribution::Available(contributions) => contributions,
            Attribution::Unavailable(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitAssessment {
    pub probability: f64,
    pub attribution: Attribution,
}

pub struct FitClassifier {
    coefficients: Array1<f64>,
    intercept: f64,
    baseline: Array1<f64>,
}

impl FitClassifier {
    /// Load and validate the artifact. Any failure here must stop the engine from serving.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MatcherError::ModelLoading(format!(
                "Classifier artifact not found at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MatcherError::ModelLoading(format!("Failed to read classifier artifact {}: {}", path.display(), e))
        })?;
        let artifact: ClassifierArtifact = serde_json::from_str(&content).map_err(|e| {
            MatcherError::ModelLoading(format!("Corrupt classifier artifact {}: {}", path.display(), e))
        })?;

        let classifier = Self::from_artifact(artifact)?;
        info!("Loaded fit classifier from {}", path.display());
        Ok(classifier)
    }

    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(MatcherError::ModelLoading(format!(
                "Unsupported classifier format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        if artifact.feature_names != FEATURE_NAMES {
            return Err(MatcherError::ModelLoading(format!(
                "Classifier feature schema {:?} does not match {:?}",
                artifact.feature_names, FEATURE_NAMES
            )));
        }

        let baseline = artifact.baseline.unwrap_or_else(|| vec![0.0; FEATURE_COUNT]);
        if artifact.coefficients.len() != FEATURE_COUNT || baseline.len() != FEATURE_COUNT {
            return Err(MatcherError::ModelLoading(format!(
                "Classifier expects {} coefficients and baseline values",
                FEATURE_COUNT
            )));
        }

        let all_finite = artifact
            .coefficients
            .iter()
            .chain(baseline.iter())
            .chain(std::iter::once(&artifact.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(MatcherError::ModelLoading(
                "Classifier artifact contains non-finite parameters".to_string(),
            ));
        }

        Ok(Self {
            coefficients: Array1::from(artifact.coefficients),
            intercept: artifact.intercept,
            baseline: Array1::from(baseline),
        })
    }

    /// Probability of a good fit, in `[0, 1]`
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let x = Array1::from(features.to_array().to_vec());
        let logit = self.intercept + self.coefficients.dot(&x);
        sigmoid(logit)
    }

    /// `coefficient_i * (feature_i - baseline_i)`, strongest first
    pub fn attribute(&self, features: &FeatureVector) -> Attribution {
        let x = Array1::from(features.to_array().to_vec());
        let contributions = &self.coefficients * &(&x - &self.baseline);

        if contributions.iter().any(|c| !c.is_finite()) {
            return Attribution::Unavailable("non-finite feature contribution".to_string());
        }

        let mut ranked: Vec<FeatureContribution> = FEATURE_NAMES
            .iter()
            .zip(contributions.iter())
            .map(|(name, value)| FeatureContribution {
                feature: name.to_string(),
                contribution: *value,
            })
            .collect();
        ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

        Attribution::Available(ranked)
    }

    /// Probability plus attribution; attribution failure degrades, never aborts
    pub fn assess(&self, features: &FeatureVector) -> FitAssessment {
        let probability = self.predict(features);
        let attribution = self.attribute(features);
        if let Attribution::Unavailable(reason) = &attribution {
            warn!("Attribution unavailable, reporting probability only: {}", reason);
        }
        FitAssessment { probability, attribution }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z.is_nan() {
        return 0.0;
    }
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifact() -> ClassifierArtifact {
        ClassifierArtifact {
            format_version: 1,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients: vec![2.0, 3.0, 2.5, -0.3, 0.05],
            intercept: -3.0,
            baseline: None,
        }
    }

    fn features() -> FeatureVector {
        FeatureVector {
            lexical: 0.4,
            semantic: 0.6,
            overlap_fraction: 0.5,
            missing_skill_count: 2,
            keyword_match_count: 10,
        }
    }

    #[test]
    fn test_predict_is_sigmoid_of_linear_model() {
        let classifier = FitClassifier::from_artifact(artifact()).unwrap();
        // -3 + 0.8 + 1.8 + 1.25 - 0.6 + 0.5 = 0.75
        let expected = 1.0 / (1.0 + (-0.75f64).exp());
        assert!((classifier.predict(&features()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_attribution_sorted_by_magnitude() {
        let classifier = FitClassifier::from_artifact(artifact()).unwrap();
        let attribution = classifier.attribute(&features());

        let names: Vec<&str> = attribution.contributions().iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, vec!["sbert_sim", "overlap", "tfidf_sim", "missing_count", "keyword_matches"]);
        assert!((attribution.contributions()[3].contribution + 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_attribution_uses_baseline() {
        let mut with_baseline = artifact();
        with_baseline.baseline = Some(vec![0.4, 0.6, 0.5, 2.0, 10.0]);
        let classifier = FitClassifier::from_artifact(with_baseline).unwrap();

        let attribution = classifier.attribute(&features());
        assert!(attribution.contributions().iter().all(|c| c.contribution == 0.0));
    }

    #[test]
    fn test_non_finite_features_degrade_attribution() {
        let classifier = FitClassifier::from_artifact(artifact()).unwrap();
        let mut bad = features();
        bad.lexical = f64::INFINITY;

        let assessment = classifier.assess(&bad);
        assert!(matches!(assessment.attribution, Attribution::Unavailable(_)));
        assert!((0.0..=1.0).contains(&assessment.probability));
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let mut reordered = artifact();
        reordered.feature_names.swap(0, 1);
        assert!(matches!(FitClassifier::from_artifact(reordered), Err(MatcherError::ModelLoading(_))));

        let mut wrong_version = artifact();
        wrong_version.format_version = 2;
        assert!(FitClassifier::from_artifact(wrong_version).is_err());

        let mut short = artifact();
        short.coefficients.pop();
        assert!(FitClassifier::from_artifact(short).is_err());
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = FitClassifier::load(&dir.path().join("fit_model.json"));
        assert!(matches!(result, Err(MatcherError::ModelLoading(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&artifact()).unwrap()).unwrap();
        assert!(FitClassifier::load(file.path()).is_ok());

        let mut corrupt = tempfile::NamedTempFile::new().unwrap();
        write!(corrupt, "{{ not json").unwrap();
        assert!(matches!(FitClassifier::load(corrupt.path()), Err(MatcherError::ModelLoading(_))));
    }
}
