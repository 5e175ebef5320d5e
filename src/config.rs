//! Configuration management for the resume matcher

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Catalog used when no skills are configured.
pub const DEFAULT_SKILLS: &[&str] = &[
    "python", "java", "javascript", "typescript", "react", "next.js", "node.js",
    "express", "fastapi", "django", "flask", "sql", "postgresql", "mongodb",
    "docker", "kubernetes", "aws", "gcp", "azure", "redis", "graphql",
    "machine learning", "deep learning", "nlp", "pytorch", "tensorflow",
    "scikit-learn", "huggingface", "transformers", "pandas", "numpy",
    "git", "ci/cd", "linux",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub skills: SkillsConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Local directory name under `models_dir` or a Hugging Face repo id
    pub embedding_model: String,
    pub embedder: EmbedderKind,
    pub hashing_dimensions: usize,
    pub classifier_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    Model2Vec,
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    pub catalog: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub embedding_cache_capacity: u64,
    pub keyword_top_k: usize,
    pub keyword_ordering: KeywordOrdering,
    pub max_batch_resumes: usize,
    pub default_top_k: usize,
    pub analysis_timeout_secs: u64,
}

/// Order in which the top job keywords are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordOrdering {
    /// Alphabetical vocabulary order (legacy behavior)
    #[default]
    Vocabulary,
    /// Descending term weight
    Weight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-matcher")
            .join("models");

        Self {
            models: ModelConfig {
                classifier_path: models_dir.join("fit_model.json"),
                models_dir,
                embedding_model: "minishlab/potion-base-8M".to_string(),
                embedder: EmbedderKind::Model2Vec,
                hashing_dimensions: 384,
            },
            skills: SkillsConfig {
                catalog: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            },
            processing: ProcessingConfig {
                embedding_cache_capacity: 1024,
                keyword_top_k: 20,
                keyword_ordering: KeywordOrdering::Vocabulary,
                max_batch_resumes: 50,
                default_top_k: 10,
                analysis_timeout_secs: 30,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| MatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        let processing = &self.processing;
        if processing.keyword_top_k == 0 {
            return Err(MatcherError::Configuration(
                "processing.keyword_top_k must be at least 1".to_string(),
            ));
        }
        if processing.max_batch_resumes == 0 {
            return Err(MatcherError::Configuration(
                "processing.max_batch_resumes must be at least 1".to_string(),
            ));
        }
        if processing.default_top_k == 0 || processing.default_top_k > processing.max_batch_resumes {
            return Err(MatcherError::Configuration(format!(
                "processing.default_top_k must be within 1..={}",
                processing.max_batch_resumes
            )));
        }
        if processing.analysis_timeout_secs == 0 {
            return Err(MatcherError::Configuration(
                "processing.analysis_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.models.embedder == EmbedderKind::Hashing && self.models.hashing_dimensions == 0 {
            return Err(MatcherError::Configuration(
                "models.hashing_dimensions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the embedding model to a local path when one exists
    pub fn embedding_model_path(&self) -> PathBuf {
        let local_path = self.models.models_dir.join(&self.models.embedding_model);
        if local_path.exists() {
            local_path
        } else {
            PathBuf::from(&self.models.embedding_model)
        }
    }
}
