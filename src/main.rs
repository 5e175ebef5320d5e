//! Resume matcher: hybrid resume and job description scoring tool

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction};
use resume_matcher::config::Config;
use resume_matcher::error::{MatcherError, Result};
use resume_matcher::input::InputManager;
use resume_matcher::output::{save_report_to_file, AnalysisResponse, RankResponse, ReportGenerator};
use resume_matcher::processing::{RankEngine, ScoreEngine};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Some(output) = &cli.output {
        match cli::parse_output_format(output) {
            Ok(format) => config.output.format = format,
            Err(e) => {
                error!("{}", e);
                process::exit(2);
            }
        }
    }

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(if e.is_validation() { 2 } else { 1 });
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    let format = config.output.format;

    match command {
        Commands::Analyze {
            job,
            resume,
            detailed,
            save,
        } => {
            info!("Starting resume analysis");
            check_extension(&job, "Job description")?;
            check_extension(&resume, "Resume")?;

            let mut input_manager = InputManager::new();
            let job_text = input_manager.extract_text(&job).await?;
            let resume_text = input_manager.extract_text(&resume).await?;

            let engine = ScoreEngine::from_config(&config)?;
            let result = tokio::task::spawn_blocking(move || engine.analyze(&job_text, &resume_text))
                .await
                .map_err(|e| MatcherError::AnalysisFailed(format!("Analysis task failed: {}", e)))??;

            let response = AnalysisResponse::from(&result);
            let generator = ReportGenerator::new(config.output.color_output, detailed || config.output.detailed);
            let rendered = generator.analysis(&response, format)?;
            emit(&rendered, save.as_deref())?;
        }

        Commands::Rank {
            job,
            resumes,
            top_k,
            save,
        } => {
            info!("Ranking {} resumes", resumes.len());
            check_extension(&job, "Job description")?;
            for path in &resumes {
                check_extension(path, "Resume")?;
            }

            let mut input_manager = InputManager::new();
            let job_text = input_manager.extract_text(&job).await?;

            let progress = ProgressBar::new(resumes.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .map_err(|e| MatcherError::OutputFormatting(e.to_string()))?
                    .progress_chars("=> "),
            );

            let mut inputs = Vec::with_capacity(resumes.len());
            for path in &resumes {
                progress.set_message(InputManager::display_name(path));
                inputs.push(input_manager.extract_resume(path).await);
                progress.inc(1);
            }
            progress.finish_with_message("extracted");

            let engine = Arc::new(ScoreEngine::from_config(&config)?);
            let ranker = RankEngine::from_config(engine, &config);
            let top_k = top_k.unwrap_or(config.processing.default_top_k);
            let ranking = ranker.rank_parallel(&job_text, &inputs, top_k).await?;

            let stats = ranker.engine().stats();
            debug!(
                "Embedding cache: {}/{} entries ({}), {} catalog skills",
                stats.embedding_cache.entries,
                stats.embedding_cache.capacity,
                stats.embedding_cache.model_name,
                stats.skill_catalog_size
            );

            let response = RankResponse::new(&job_text, &ranking);
            let generator = ReportGenerator::new(config.output.color_output, config.output.detailed);
            let rendered = generator.ranking(&response, format)?;
            emit(&rendered, save.as_deref())?;
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("# {}\n{}", config_path.display(), content);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset: {}", config_path.display());
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}

fn check_extension(path: &Path, label: &str) -> Result<()> {
    cli::validate_file_extension(path, cli::SUPPORTED_EXTENSIONS)
        .map_err(|e| MatcherError::InvalidInput(format!("{} file: {}", label, e)))
}

fn emit(rendered: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(rendered, path)?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
