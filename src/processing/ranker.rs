//! Batch ranking of many resumes against one job description

use crate::config::Config;
use crate::error::{MatcherError, Result};
use crate::processing::analyzer::{AnalysisResult, ScoreEngine};
use crate::processing::scoring::SimilarityScores;
use crate::processing::text_processor::TextProcessor;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound on resumes per ranking request and on `top_k`
pub const MAX_BATCH_RESUMES: usize = 50;

pub const DEFAULT_TOP_K: usize = 10;

/// How many missing keywords a ranked entry carries
const RANKED_MISSING_KEYWORDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeInput {
    pub name: String,
    pub text: String,
    /// Set when the resume file could not be read; the resume is then
    /// reported as a failure instead of being analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl ResumeInput {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            extraction_error: None,
        }
    }

    /// A batch member whose text extraction failed
    pub fn unreadable(name: impl Into<String>, error: impl Display) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            extraction_error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub resume_name: String,
    /// Position in the submitted batch
    pub input_index: usize,
    pub match_score: u8,
    pub fit_score: u8,
    pub missing_skills: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub similarity: SimilarityScores,
    pub analysis: AnalysisResult,
}

impl RankedEntry {
    fn new(resume: &ResumeInput, input_index: usize, analysis: AnalysisResult) -> Self {
        Self {
            resume_name: resume.name.clone(),
            input_index,
            match_score: analysis.match_score,
            fit_score: analysis.fit_score,
            missing_skills: analysis.skills.missing.clone(),
            missing_keywords: analysis
                .keywords
                .missing_keywords
                .iter()
                .take(RANKED_MISSING_KEYWORDS)
                .cloned()
                .collect(),
            similarity: analysis.similarity,
            analysis,
        }
    }
}

/// A resume that could not be analyzed; it is left out of the ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankFailure {
    pub resume_name: String,
    pub input_index: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// First `top_k` entries of `all`
    pub top: Vec<RankedEntry>,
    pub all: Vec<RankedEntry>,
    /// Number of resumes submitted, including failures
    pub total_resumes: usize,
    pub top_k: usize,
    pub failures: Vec<RankFailure>,
}

pub struct RankEngine {
    engine: Arc<ScoreEngine>,
    max_batch: usize,
    timeout: Duration,
    processor: TextProcessor,
}

impl RankEngine {
    pub fn new(engine: Arc<ScoreEngine>) -> Self {
        Self {
            engine,
            max_batch: MAX_BATCH_RESUMES,
            timeout: Duration::from_secs(30),
            processor: TextProcessor::new(),
        }
    }

    pub fn from_config(engine: Arc<ScoreEngine>, config: &Config) -> Self {
        Self {
            engine,
            max_batch: config.processing.max_batch_resumes.min(MAX_BATCH_RESUMES),
            timeout: Duration::from_secs(config.processing.analysis_timeout_secs),
            processor: TextProcessor::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn engine(&self) -> &Arc<ScoreEngine> {
        &self.engine
    }

    /// Analyze every resume sequentially and order the results
    pub fn rank(&self, job_description: &str, resumes: &[ResumeInput], top_k: usize) -> Result<Ranking> {
        self.validate(job_description, resumes, top_k)?;

        let outcomes = resumes
            .iter()
            .map(|resume| match &resume.extraction_error {
                Some(error) => Err(error.clone()),
                None => self
                    .engine
                    .analyze(job_description, &resume.text)
                    .map_err(|e| e.to_string()),
            })
            .collect();

        Ok(assemble(resumes, outcomes, top_k))
    }

    /// Same contract as [`RankEngine::rank`], with each analysis on tokio's
    /// blocking pool. Every analysis shares one deadline, `timeout` from the
    /// start of the call; resumes unfinished by then become `Timeout` failures.
    pub async fn rank_parallel(
        &self,
        job_description: &str,
        resumes: &[ResumeInput],
        top_k: usize,
    ) -> Result<Ranking> {
        self.validate(job_description, resumes, top_k)?;

        let deadline = Instant::now() + self.timeout;
        let handles: Vec<_> = resumes
            .iter()
            .map(|resume| match &resume.extraction_error {
                Some(error) => Err(error.clone()),
                None => {
                    let engine = Arc::clone(&self.engine);
                    let job = job_description.to_string();
                    let text = resume.text.clone();
                    Ok(tokio::task::spawn_blocking(move || engine.analyze(&job, &text)))
                }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let handle = match handle {
                Ok(handle) => handle,
                Err(extraction_error) => {
                    outcomes.push(Err(extraction_error));
                    continue;
                }
            };
            // A timed-out analysis is detached and its result discarded
            let outcome = match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(result)) => result.map_err(|e| e.to_string()),
                Ok(Err(join_error)) => Err(MatcherError::AnalysisFailed(format!(
                    "Analysis task failed: {}",
                    join_error
                ))
                .to_string()),
                Err(_) => Err(MatcherError::Timeout(self.timeout).to_string()),
            };
            outcomes.push(outcome);
        }

        Ok(assemble(resumes, outcomes, top_k))
    }

    fn validate(&self, job_description: &str, resumes: &[ResumeInput], top_k: usize) -> Result<()> {
        if self.processor.normalize(job_description).is_empty() {
            return Err(MatcherError::InvalidInput("Job description is empty".to_string()));
        }
        if resumes.is_empty() {
            return Err(MatcherError::InvalidInput("No resumes to rank".to_string()));
        }
        if resumes.len() > self.max_batch {
            return Err(MatcherError::InvalidInput(format!(
                "Too many resumes: {} (maximum {})",
                resumes.len(),
                self.max_batch
            )));
        }
        if top_k == 0 || top_k > MAX_BATCH_RESUMES {
            return Err(MatcherError::InvalidInput(format!(
                "top_k must be within 1..={}, got {}",
                MAX_BATCH_RESUMES, top_k
            )));
        }
        Ok(())
    }
}

/// Pair each resume with its analysis outcome; failures carry the error message
fn assemble(
    resumes: &[ResumeInput],
    outcomes: Vec<std::result::Result<AnalysisResult, String>>,
    top_k: usize,
) -> Ranking {
    let mut all = Vec::with_capacity(resumes.len());
    let mut failures = Vec::new();

    for (index, (resume, outcome)) in resumes.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(analysis) => all.push(RankedEntry::new(resume, index, analysis)),
            Err(e) => {
                warn!("Skipping resume '{}' from ranking: {}", resume.name, e);
                failures.push(RankFailure {
                    resume_name: resume.name.clone(),
                    input_index: index,
                    error: e,
                });
            }
        }
    }

    sort_entries(&mut all);
    let top = all.iter().take(top_k).cloned().collect();
    debug!("Ranked {} resumes, {} failed", all.len(), failures.len());

    Ranking {
        top,
        all,
        total_resumes: resumes.len(),
        top_k,
        failures,
    }
}

/// Descending by (fit, match); ties by resume name then submission order
pub fn sort_entries(entries: &mut [RankedEntry]) {
    entries.sort_by(compare_entries);
}

fn compare_entries(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.fit_score
        .cmp(&a.fit_score)
        .then_with(|| b.match_score.cmp(&a.match_score))
        .then_with(|| a.resume_name.cmp(&b.resume_name))
        .then_with(|| a.input_index.cmp(&b.input_index))
}
