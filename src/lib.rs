//! Resume matcher library: hybrid resume and job description scoring and ranking

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{MatcherError, Result};
pub use processing::{AnalysisResult, RankEngine, Ranking, ResumeInput, ScoreEngine};
