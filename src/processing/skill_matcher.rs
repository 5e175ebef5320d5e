//! Catalog skill detection and skill-gap analysis

use crate::error::{MatcherError, Result};
use crate::processing::text_processor::TextProcessor;
use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Detects catalog skills by substring match over normalized text.
///
/// Matching is not token-boundary aware, so a short skill can match inside a
/// longer word ("go" inside "ongoing"). Callers depend on this looser behavior.
pub struct SkillMatcher {
    matcher: AhoCorasick,
    /// Catalog name for each automaton pattern, by pattern id
    names: Vec<String>,
    catalog_size: usize,
    processor: TextProcessor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillReport {
    pub job_skills_found: Vec<String>,
    pub resume_skills_found: Vec<String>,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// Percentage of job skills found in the resume, 0 when the job lists none
    pub overlap_percent: f64,
}

impl SkillReport {
    /// Share of job skills matched, in `[0, 1]`
    pub fn overlap_fraction(&self) -> f64 {
        if self.job_skills_found.is_empty() {
            0.0
        } else {
            self.matched.len() as f64 / self.job_skills_found.len() as f64
        }
    }
}

impl SkillMatcher {
    pub fn new<S: AsRef<str>>(catalog: &[S]) -> Result<Self> {
        let processor = TextProcessor::new();
        let mut patterns = Vec::new();
        let mut names = Vec::new();

        for skill in catalog {
            let normalized = processor.normalize(skill.as_ref());
            // An empty pattern would match every document
            if normalized.is_empty() {
                continue;
            }
            patterns.push(normalized);
            names.push(skill.as_ref().to_string());
        }

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| MatcherError::Configuration(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self {
            matcher,
            names,
            catalog_size: catalog.len(),
            processor,
        })
    }

    /// Catalog skills whose normalized form occurs in the normalized text, sorted
    pub fn extract(&self, text: &str) -> Vec<String> {
        let normalized = self.processor.normalize(text);
        let found: BTreeSet<&str> = self
            .matcher
            .find_overlapping_iter(&normalized)
            .map(|m| self.names[m.pattern().as_usize()].as_str())
            .collect();

        found.into_iter().map(str::to_string).collect()
    }

    /// Split job skills into matched and missing against the resume skills
    pub fn gap(job_skills: &[String], resume_skills: &[String]) -> SkillReport {
        let resume_set: HashSet<String> = resume_skills.iter().map(|s| s.to_lowercase()).collect();

        let (mut matched, mut missing): (Vec<String>, Vec<String>) = job_skills
            .iter()
            .cloned()
            .partition(|s| resume_set.contains(&s.to_lowercase()));
        matched.sort();
        missing.sort();

        let overlap_percent = if job_skills.is_empty() {
            0.0
        } else {
            round_to(matched.len() as f64 / job_skills.len() as f64 * 100.0, 2)
        };

        SkillReport {
            job_skills_found: job_skills.to_vec(),
            resume_skills_found: resume_skills.to_vec(),
            matched,
            missing,
            overlap_percent,
        }
    }

    /// Extract both sides and compute the gap in one step
    pub fn analyze(&self, job_text: &str, resume_text: &str) -> SkillReport {
        let job_skills = self.extract(job_text);
        let resume_skills = self.extract(resume_text);
        Self::gap(&job_skills, &resume_skills)
    }

    pub fn skill_count(&self) -> usize {
        self.catalog_size
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SKILLS;

    fn matcher() -> SkillMatcher {
        SkillMatcher::new(DEFAULT_SKILLS).unwrap()
    }

    #[test]
    fn test_extract_detects_catalog_skills() {
        let skills = matcher().extract("Looking for a Python developer with Docker and AWS experience.");
        assert_eq!(skills, vec!["aws", "docker", "python"]);
    }

    #[test]
    fn test_extract_normalizes_catalog_entries() {
        let skills = matcher().extract("Strong CI/CD pipelines, Node.js services and Machine   Learning");
        assert!(skills.contains(&"ci/cd".to_string()));
        assert!(skills.contains(&"node.js".to_string()));
        assert!(skills.contains(&"machine learning".to_string()));
    }

    #[test]
    fn test_extract_matches_inside_words() {
        // "javascript" also contains "java"
        let skills = matcher().extract("Frontend work in JavaScript");
        assert!(skills.contains(&"java".to_string()));
        assert!(skills.contains(&"javascript".to_string()));
    }

    #[test]
    fn test_empty_catalog_entries_are_ignored() {
        let matcher = SkillMatcher::new(&["", "!!", "rust"]).unwrap();
        assert_eq!(matcher.extract("anything at all"), Vec::<String>::new());
        assert_eq!(matcher.extract("Rust services"), vec!["rust"]);
    }

    #[test]
    fn test_gap_partitions_job_skills() {
        let job = vec!["aws".to_string(), "docker".to_string(), "python".to_string()];
        let resume = vec!["AWS".to_string(), "fastapi".to_string(), "python".to_string()];
        let report = SkillMatcher::gap(&job, &resume);

        assert_eq!(report.matched, vec!["aws", "python"]);
        assert_eq!(report.missing, vec!["docker"]);
        assert_eq!(report.overlap_percent, 66.67);

        let union: HashSet<_> = report.matched.iter().chain(report.missing.iter()).collect();
        let job_set: HashSet<_> = job.iter().collect();
        assert_eq!(union, job_set);
        assert!(report.matched.iter().all(|m| !report.missing.contains(m)));
    }

    #[test]
    fn test_gap_without_job_skills() {
        let report = SkillMatcher::gap(&[], &["rust".to_string()]);
        assert_eq!(report.overlap_percent, 0.0);
        assert_eq!(report.overlap_fraction(), 0.0);
        assert!(report.matched.is_empty() && report.missing.is_empty());
    }
}
