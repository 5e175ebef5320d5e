//! CLI interface for the resume matcher

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// File types accepted for resumes and job descriptions
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Hybrid resume and job description matching tool")]
#[command(long_about = "Score resumes against a job description with TF-IDF, embeddings, skill gaps and a fit classifier, or rank a batch of resumes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: console, json, markdown (defaults to the configured format)
    #[arg(short, long, global = true)]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one resume against a job description
    Analyze {
        /// Path to job description file (PDF, TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Rank several resumes against a job description
    Rank {
        /// Path to job description file (PDF, TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Paths to resume files
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        /// Number of top resumes to report (defaults to the configured value)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), SUPPORTED_EXTENSIONS).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), SUPPORTED_EXTENSIONS).is_err());
        assert!(validate_file_extension(Path::new("cv"), SUPPORTED_EXTENSIONS).is_err());
    }

    #[test]
    fn test_rank_command_parses() {
        let cli = Cli::try_parse_from([
            "resume-matcher",
            "--output",
            "json",
            "rank",
            "--job",
            "jd.txt",
            "--resumes",
            "a.txt",
            "b.md",
            "-k",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.output.as_deref(), Some("json"));
        match cli.command {
            Commands::Rank { resumes, top_k, .. } => {
                assert_eq!(resumes.len(), 2);
                assert_eq!(top_k, Some(3));
            }
            _ => panic!("expected rank command"),
        }
    }
}
