//! Matching, scoring and ranking engine

pub mod text_processor;
pub mod skill_matcher;
pub mod lexical;
pub mod embeddings;
pub mod keywords;
pub mod features;
pub mod classifier;
pub mod scoring;
pub mod recommendations;
pub mod analyzer;
pub mod ranker;

pub use analyzer::{AnalysisResult, ScoreEngine};
pub use ranker::{RankEngine, Ranking, ResumeInput};
