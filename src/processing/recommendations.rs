//! Rule-based advisories and resume edit suggestions

use serde::{Deserialize, Serialize};

const MAX_LISTED: usize = 8;

pub const SEMANTIC_ALIGNMENT_THRESHOLD: f64 = 0.5;
pub const SKILL_OVERLAP_THRESHOLD: f64 = 0.4;
pub const FIT_SCORE_THRESHOLD: u8 = 50;

pub const SEMANTIC_ADVICE: &str =
    "Resume content isn't semantically aligned. Add role-relevant projects and achievements.";
pub const OVERLAP_ADVICE: &str =
    "Your skill overlap is low. Add tools/keywords mentioned in the JD only if you have real experience.";
pub const FIT_ADVICE: &str =
    "Fit score is low. Consider applying only after improving missing skills and tailoring your resume.";

pub const KEYWORD_NOTE: &str =
    "Add missing keywords naturally only if you genuinely have the skill/experience.";

/// Where to add missing material in the resume
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionSuggestions {
    pub skills_section: Vec<String>,
    pub projects_section: Vec<String>,
    pub experience_section: Vec<String>,
}

/// Signals the advisory rules read
pub struct RecommendationInputs<'a> {
    pub missing_skills: &'a [String],
    pub missing_keywords: &'a [String],
    pub semantic: f64,
    pub overlap_fraction: f64,
    pub fit_score: u8,
}

/// Every rule is evaluated, in a fixed order
pub fn generate(inputs: &RecommendationInputs<'_>) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !inputs.missing_skills.is_empty() {
        recommendations.push(format!(
            "Missing critical skills: {}.",
            head(inputs.missing_skills, MAX_LISTED).join(", ")
        ));
    }
    if !inputs.missing_keywords.is_empty() {
        recommendations.push(format!(
            "Missing important JD keywords: {}.",
            head(inputs.missing_keywords, MAX_LISTED).join(", ")
        ));
    }
    if inputs.semantic < SEMANTIC_ALIGNMENT_THRESHOLD {
        recommendations.push(SEMANTIC_ADVICE.to_string());
    }
    if inputs.overlap_fraction < SKILL_OVERLAP_THRESHOLD {
        recommendations.push(OVERLAP_ADVICE.to_string());
    }
    if inputs.fit_score < FIT_SCORE_THRESHOLD {
        recommendations.push(FIT_ADVICE.to_string());
    }

    recommendations
}

pub fn section_suggestions(missing_skills: &[String], missing_keywords: &[String]) -> SectionSuggestions {
    let mut skills_section = head(missing_skills, 8).to_vec();
    skills_section.extend_from_slice(head(missing_keywords, 5));

    SectionSuggestions {
        skills_section,
        projects_section: head(missing_keywords, 8).to_vec(),
        experience_section: head(missing_skills, 5).to_vec(),
    }
}

pub fn bullet_rewrite_templates(missing_keywords: &[String]) -> Vec<String> {
    head(missing_keywords, 5)
        .iter()
        .map(|kw| {
            format!(
                "Add a bullet like: 'Implemented {} to improve performance, scalability, and maintainability.'",
                kw
            )
        })
        .collect()
}

fn head<T>(items: &[T], n: usize) -> &[T] {
    &items[..items.len().min(n)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let skills = strings(&["docker", "kubernetes"]);
        let keywords = strings(&["aws"]);
        let recs = generate(&RecommendationInputs {
            missing_skills: &skills,
            missing_keywords: &keywords,
            semantic: 0.2,
            overlap_fraction: 0.1,
            fit_score: 10,
        });

        assert_eq!(
            recs,
            vec![
                "Missing critical skills: docker, kubernetes.".to_string(),
                "Missing important JD keywords: aws.".to_string(),
                SEMANTIC_ADVICE.to_string(),
                OVERLAP_ADVICE.to_string(),
                FIT_ADVICE.to_string(),
            ]
        );
    }

    #[test]
    fn test_strong_match_has_no_recommendations() {
        let recs = generate(&RecommendationInputs {
            missing_skills: &[],
            missing_keywords: &[],
            semantic: 0.9,
            overlap_fraction: 1.0,
            fit_score: 90,
        });
        assert!(recs.is_empty());
    }

    #[test]
    fn test_lists_are_capped_at_eight() {
        let skills: Vec<String> = (0..12).map(|i| format!("s{}", i)).collect();
        let recs = generate(&RecommendationInputs {
            missing_skills: &skills,
            missing_keywords: &[],
            semantic: 0.9,
            overlap_fraction: 1.0,
            fit_score: 90,
        });
        assert_eq!(recs[0], "Missing critical skills: s0, s1, s2, s3, s4, s5, s6, s7.");
    }

    #[test]
    fn test_section_suggestions_and_templates() {
        let skills: Vec<String> = (0..10).map(|i| format!("skill{}", i)).collect();
        let keywords: Vec<String> = (0..10).map(|i| format!("kw{}", i)).collect();

        let suggestions = section_suggestions(&skills, &keywords);
        assert_eq!(suggestions.skills_section.len(), 13);
        assert_eq!(suggestions.projects_section.len(), 8);
        assert_eq!(suggestions.experience_section, skills[..5].to_vec());

        let templates = bullet_rewrite_templates(&keywords);
        assert_eq!(templates.len(), 5);
        assert!(templates[0].contains("Implemented kw0 to improve"));
    }
}
