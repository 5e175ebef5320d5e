//! Output formatters: colored console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{AnalysisResponse, RankResponse};
use colored::{Color, Colorize};
use std::path::Path;

/// Renders analysis and ranking responses in one output format
pub trait OutputFormatter {
    fn format_analysis(&self, response: &AnalysisResponse) -> Result<String>;
    fn format_ranking(&self, response: &RankResponse) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

/// Dispatches to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("VERY GOOD", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("BELOW AVG", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_list(&self, label: &str, items: &[String], color: Color) -> String {
        if items.is_empty() {
            format!("{}: none\n", label)
        } else {
            format!("{}: {}\n", label, self.colorize(&items.join(", "), color))
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_analysis(&self, response: &AnalysisResponse) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "Match Score: {}% {}\n",
            response.match_score,
            self.format_score_badge(response.match_score)
        ));
        output.push_str(&format!(
            "Fit Prediction: {}% {}\n",
            response.fit_prediction_score,
            self.format_score_badge(response.fit_prediction_score)
        ));

        output.push_str(&self.format_header("Similarity", 2));
        output.push_str(&format!("  • TF-IDF:   {:.4}\n", response.similarity.tfidf));
        output.push_str(&format!("  • Semantic: {:.4}\n", response.similarity.sbert));
        output.push_str(&format!("  • Hybrid:   {:.4}\n", response.similarity.hybrid));

        output.push_str(&self.format_header("Skills", 2));
        output.push_str(&format!("Overlap: {:.2}%\n", response.skills.overlap_percent));
        output.push_str(&self.format_list("Matched", &response.skills.matched, Color::Green));
        output.push_str(&self.format_list("Missing", &response.skills.missing, Color::Red));

        if self.detailed {
            output.push_str(&self.format_header("Explainability", 3));
            let explain = &response.explainability;
            output.push_str(&format!("  • TF-IDF contribution: {:.2}\n", explain.tfidf_contribution));
            output.push_str(&format!("  • Semantic contribution: {:.2}\n", explain.sbert_contribution));
            output.push_str(&format!("  • Skill overlap contribution: {:.2}\n", explain.skill_overlap_contribution));
            output.push_str(&format!("  • Missing skills: {}\n", explain.missing_skills_count));
            output.push_str(&format!("  • Keyword matches: {}\n", explain.keyword_matches));
            output.push_str(&format!("  • Fit probability: {:.4}\n", explain.classifier_fit_probability));

            if !response.shap_explainability.is_empty() {
                output.push_str(&self.format_header("Feature Attribution", 3));
                for contribution in &response.shap_explainability {
                    let color = if contribution.contribution >= 0.0 { Color::Green } else { Color::Red };
                    output.push_str(&format!(
                        "  • {:<16} {}\n",
                        contribution.feature,
                        self.colorize(&format!("{:+.4}", contribution.contribution), color)
                    ));
                }
            }

            output.push_str(&self.format_header("Keyword Optimization", 3));
            output.push_str(&self.format_list(
                "Top JD keywords",
                &response.keyword_optimization.top_job_keywords,
                Color::Cyan,
            ));
            output.push_str(&self.format_list(
                "Missing keywords",
                &response.keyword_optimization.missing_keywords,
                Color::Yellow,
            ));
            output.push_str(&format!("{}\n", response.keyword_optimization.note));

            output.push_str(&self.format_header("Where to add them", 3));
            let sections = &response.section_suggestions;
            output.push_str(&self.format_list("Skills section", &sections.skills_section, Color::White));
            output.push_str(&self.format_list("Projects section", &sections.projects_section, Color::White));
            output.push_str(&self.format_list("Experience section", &sections.experience_section, Color::White));
            for template in &response.bullet_rewrite_templates {
                output.push_str(&format!("  - {}\n", template));
            }
        }

        if !response.recommendations.is_empty() {
            output.push_str(&self.format_header("Recommendations", 2));
            for (i, rec) in response.recommendations.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, self.colorize(rec, Color::Yellow)));
            }
        }

        Ok(output)
    }

    fn format_ranking(&self, response: &RankResponse) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME RANKING", 1));
        output.push_str(&format!(
            "Ranked {} resumes, showing top {}\n",
            response.total_resumes,
            response.ranked_resumes.len()
        ));

        for (i, resume) in response.ranked_resumes.iter().enumerate() {
            output.push_str(&self.format_header(&format!("#{} {}", i + 1, resume.resume_name), 2));
            output.push_str(&format!(
                "Fit: {}% {} | Match: {}%\n",
                resume.fit_prediction_score,
                self.format_score_badge(resume.fit_prediction_score),
                resume.match_score
            ));
            output.push_str(&format!(
                "Similarity: tfidf {:.4} | semantic {:.4} | hybrid {:.4}\n",
                resume.similarity.tfidf, resume.similarity.sbert, resume.similarity.hybrid
            ));
            output.push_str(&self.format_list("Missing skills", &resume.missing_skills, Color::Red));
            if self.detailed {
                output.push_str(&self.format_list("Missing keywords", &resume.missing_keywords, Color::Yellow));
            }
        }

        if !response.failed_resumes.is_empty() {
            output.push_str(&self.format_header("Not ranked", 3));
            for failed in &response.failed_resumes {
                output.push_str(&format!(
                    "  • {}: {}\n",
                    failed.resume_name,
                    self.colorize(&failed.error, Color::Red)
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_analysis(&self, response: &AnalysisResponse) -> Result<String> {
        self.to_json(response)
    }

    fn format_ranking(&self, response: &RankResponse) -> Result<String> {
        self.to_json(response)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_analysis(&self, response: &AnalysisResponse) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Match Analysis\n\n");
        output.push_str(&format!("**Match Score:** {}%  \n", response.match_score));
        output.push_str(&format!("**Fit Prediction:** {}%\n\n", response.fit_prediction_score));

        output.push_str("## Similarity\n\n");
        output.push_str("| Signal | Score |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!("| TF-IDF | {:.4} |\n", response.similarity.tfidf));
        output.push_str(&format!("| Semantic | {:.4} |\n", response.similarity.sbert));
        output.push_str(&format!("| Hybrid | {:.4} |\n\n", response.similarity.hybrid));

        output.push_str("## Skills\n\n");
        output.push_str(&format!("**Overlap:** {:.2}%\n\n", response.skills.overlap_percent));
        output.push_str(&format!("- **Matched:** {}\n", Self::join_or_none(&response.skills.matched)));
        output.push_str(&format!("- **Missing:** {}\n\n", Self::join_or_none(&response.skills.missing)));

        if !response.shap_explainability.is_empty() {
            output.push_str("## Feature Attribution\n\n");
            output.push_str("| Feature | Contribution |\n");
            output.push_str("|---------|--------------|\n");
            for contribution in &response.shap_explainability {
                output.push_str(&format!("| {} | {:+.4} |\n", contribution.feature, contribution.contribution));
            }
            output.push('\n');
        }

        output.push_str("## Keyword Optimization\n\n");
        output.push_str(&format!(
            "- **Missing keywords:** {}\n",
            Self::join_or_none(&response.keyword_optimization.missing_keywords)
        ));
        output.push_str(&format!("\n> {}\n\n", response.keyword_optimization.note));

        if !response.recommendations.is_empty() {
            output.push_str("## Recommendations\n\n");
            for (i, rec) in response.recommendations.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, rec));
            }
        }

        Ok(output)
    }

    fn format_ranking(&self, response: &RankResponse) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Ranking\n\n");
        output.push_str(&format!(
            "**Resumes:** {} | **Top K:** {}\n\n",
            response.total_resumes, response.top_k
        ));
        output.push_str("| Rank | Resume | Fit | Match | Missing Skills |\n");
        output.push_str("|------|--------|-----|-------|----------------|\n");
        for (i, resume) in response.ranked_resumes.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {}% | {}% | {} |\n",
                i + 1,
                resume.resume_name,
                resume.fit_prediction_score,
                resume.match_score,
                Self::join_or_none(&resume.missing_skills)
            ));
        }

        if !response.failed_resumes.is_empty() {
            output.push_str("\n## Not Ranked\n\n");
            for failed in &response.failed_resumes {
                output.push_str(&format!("- `{}`: {}\n", failed.resume_name, failed.error));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl MarkdownFormatter {
    fn join_or_none(items: &[String]) -> String {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    }
}

impl ReportGenerator {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter,
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn analysis(&self, response: &AnalysisResponse, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_analysis(response)
    }

    pub fn ranking(&self, response: &RankResponse, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_ranking(response)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(true, false)
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{RankedResume, SimilarityReport};

    fn ranking() -> RankResponse {
        RankResponse {
            job_description: "Python developer".to_string(),
            total_resumes: 2,
            top_k: 1,
            ranked_resumes: vec![RankedResume {
                resume_name: "alice.pdf".to_string(),
                match_score: 82,
                fit_prediction_score: 91,
                missing_skills: vec!["docker".to_string()],
                missing_keywords: vec![],
                similarity: SimilarityReport { tfidf: 0.5, sbert: 0.8, hybrid: 0.7 },
            }],
            failed_resumes: vec![],
        }
    }

    #[test]
    fn test_console_ranking_without_colors() {
        let text = ConsoleFormatter::new(false, false).format_ranking(&ranking()).unwrap();
        assert!(text.contains("#1 alice.pdf"));
        assert!(text.contains("Fit: 91% [EXCELLENT]"));
        assert!(text.contains("Missing skills: docker"));
    }

    #[test]
    fn test_json_ranking_uses_wire_names() {
        let json = JsonFormatter::new(false).format_ranking(&ranking()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ranked_resumes"][0]["fit_prediction_score"], 91);
        assert_eq!(value["top_k"], 1);
        assert!(value.get("failed_resumes").is_none());
    }

    #[test]
    fn test_markdown_ranking_table() {
        let text = MarkdownFormatter.format_ranking(&ranking()).unwrap();
        assert!(text.contains("| 1 | alice.pdf | 91% | 82% | docker |"));
    }

    #[test]
    fn test_generator_dispatch() {
        let generator = ReportGenerator::new(false, false);
        assert!(generator.ranking(&ranking(), OutputFormat::Json).unwrap().starts_with('{'));
        assert_eq!(generator.formatter(OutputFormat::Markdown).supports_format(), OutputFormat::Markdown);
    }
}
