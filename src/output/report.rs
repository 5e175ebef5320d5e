//! Wire-format responses for single analysis and batch ranking

use crate::processing::analyzer::AnalysisResult;
use crate::processing::classifier::FeatureContribution;
use crate::processing::ranker::{RankFailure, RankedEntry, Ranking};
use crate::processing::recommendations::{SectionSuggestions, KEYWORD_NOTE};
use crate::processing::scoring::{Explainability, SimilarityScores};
use crate::processing::skill_matcher::{round_to, SkillReport};
use serde::{Deserialize, Serialize};

/// Characters of the job description echoed back in a ranking response
pub const JOB_DESCRIPTION_PREVIEW: usize = 400;

/// Missing keywords listed under keyword optimization
const KEYWORD_OPTIMIZATION_MISSING: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub tfidf: f64,
    pub sbert: f64,
    pub hybrid: f64,
}

impl From<&SimilarityScores> for SimilarityReport {
    fn from(scores: &SimilarityScores) -> Self {
        Self {
            tfidf: round_to(scores.lexical, 4),
            sbert: round_to(scores.semantic, 4),
            hybrid: round_to(scores.hybrid, 4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordOptimization {
    pub top_job_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub match_score: u8,
    pub fit_prediction_score: u8,
    pub similarity: SimilarityReport,
    pub skills: SkillReport,
    pub explainability: Explainability,
    /// Empty when attribution was unavailable
    pub shap_explainability: Vec<FeatureContribution>,
    pub keyword_optimization: KeywordOptimization,
    pub section_suggestions: SectionSuggestions,
    pub bullet_rewrite_templates: Vec<String>,
    pub recommendations: Vec<String>,
}

impl From<&AnalysisResult> for AnalysisResponse {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            match_score: result.match_score,
            fit_prediction_score: result.fit_score,
            similarity: SimilarityReport::from(&result.similarity),
            skills: result.skills.clone(),
            explainability: result.explainability.clone(),
            shap_explainability: result.fit.attribution.contributions().to_vec(),
            keyword_optimization: KeywordOptimization {
                top_job_keywords: result.keywords.top_job_keywords.clone(),
                missing_keywords: result
                    .keywords
                    .missing_keywords
                    .iter()
                    .take(KEYWORD_OPTIMIZATION_MISSING)
                    .cloned()
                    .collect(),
                note: KEYWORD_NOTE.to_string(),
            },
            section_suggestions: result.section_suggestions.clone(),
            bullet_rewrite_templates: result.bullet_rewrite_templates.clone(),
            recommendations: result.recommendations.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResume {
    pub resume_name: String,
    pub match_score: u8,
    pub fit_prediction_score: u8,
    pub missing_skills: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub similarity: SimilarityReport,
}

impl From<&RankedEntry> for RankedResume {
    fn from(entry: &RankedEntry) -> Self {
        Self {
            resume_name: entry.resume_name.clone(),
            match_score: entry.match_score,
            fit_prediction_score: entry.fit_score,
            missing_skills: entry.missing_skills.clone(),
            missing_keywords: entry.missing_keywords.clone(),
            similarity: SimilarityReport::from(&entry.similarity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedResume {
    pub resume_name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResponse {
    pub job_description: String,
    pub total_resumes: usize,
    pub top_k: usize,
    pub ranked_resumes: Vec<RankedResume>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_resumes: Vec<FailedResume>,
}

impl RankResponse {
    pub fn new(job_description: &str, ranking: &Ranking) -> Self {
        Self {
            job_description: preview(job_description, JOB_DESCRIPTION_PREVIEW),
            total_resumes: ranking.total_resumes,
            top_k: ranking.top_k,
            ranked_resumes: ranking.top.iter().map(RankedResume::from).collect(),
            failed_resumes: ranking.failures.iter().map(FailedResume::from).collect(),
        }
    }
}

impl From<&RankFailure> for FailedResume {
    fn from(failure: &RankFailure) -> Self {
        Self {
            resume_name: failure.resume_name.clone(),
            error: failure.error.clone(),
        }
    }
}

/// First `max_chars` characters, with "..." appended when truncated
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}
