//! Resume analyser: resume feature extraction and ATS scoring tool

use clap::Parser;
use log::{error, info};
use resume_analyser::cli::{self, Cli, Commands, ConfigAction};
use resume_analyser::config::{Config, MatcherKind};
use resume_analyser::input::manager::InputManager;
use resume_analyser::output::formatter::{save_report_to_file, ReportGenerator};
use resume_analyser::processing::analyzer::AnalysisEngine;
use resume_analyser::processing::entities::{BertEntityRecognizer, EntityRecognizer, NoopRecognizer};
use resume_analyser::processing::model_store::EntityModelStore;
use resume_analyser::processing::vocabulary::build_vocabulary;
use resume_analyser::{Result, ResumeAnalyserError};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            job_text,
            output,
            save,
            no_entities,
            fuzzy,
            detailed,
        } => {
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(ResumeAnalyserError::InvalidInput)?,
                None => config.output.format,
            };
            if fuzzy {
                config.skills.matcher = MatcherKind::Fuzzy;
            }

            let input_manager = InputManager::new();
            let resume_text = input_manager.extract_resume(&resume).await?;

            let job_description = match (job, job_text) {
                (Some(path), _) => Some(input_manager.extract_job_description(&path).await?),
                (None, text) => text,
            };
            if job_description.is_none() {
                info!("No job description given, similarity is skipped");
            }

            let recognizer = build_recognizer(&config, no_entities).await?;
            let engine = AnalysisEngine::new(&config, recognizer)?;
            let report = engine.analyze(
                &resume_text,
                job_description.as_deref(),
                &resume.to_string_lossy(),
            )?;

            let generator = ReportGenerator::from_config(&config.output, detailed);
            let rendered = generator.generate_report(&report, &output_format)?;
            println!("{}", rendered);

            if let Some(save_path) = save {
                // colour codes do not belong in a file
                let content = if config.output.color_output {
                    let mut plain = config.output.clone();
                    plain.color_output = false;
                    ReportGenerator::from_config(&plain, detailed).generate_report(&report, &output_format)?
                } else {
                    rendered
                };
                save_report_to_file(&content, &save_path)?;
                info!("Report saved to {}", save_path.display());
            }
        }

        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                println!("Configuration file: {}\n", config_path.display());
                println!("{}", config.to_toml()?);
            }
            ConfigAction::Path => {
                println!("{}", config_path.display());
            }
            ConfigAction::Reset => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset to defaults: {}", config_path.display());
            }
        },

        Commands::Vocabulary => {
            let vocabulary = build_vocabulary(&config.skills)?;
            println!("Skill vocabulary ({} terms, {:?} matcher):", vocabulary.terms().len(), config.skills.matcher);
            for term in vocabulary.terms() {
                println!("  • {}", term);
            }
        }
    }

    Ok(())
}

async fn build_recognizer(config: &Config, no_entities: bool) -> Result<Box<dyn EntityRecognizer>> {
    if no_entities || !config.entities.enabled {
        info!("Named entity recognition disabled");
        return Ok(Box::new(NoopRecognizer));
    }

    let store = EntityModelStore::new(config.entities.models_dir.clone());
    let model_dir = store
        .ensure(&config.entities.model_repo, config.entities.tokenizer_repo.as_deref())
        .await?;

    Ok(Box::new(BertEntityRecognizer::load_async(model_dir).await?))
}
