//! CLI interface for the resume analyser

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-analyser")]
#[command(about = "Resume analysis and ATS scoring tool")]
#[command(long_about = "Extract skills and named entities from a resume and score it against a job description with TF-IDF similarity and an ATS-style keyword score")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume, optionally against a job description
    Analyze {
        /// Path to resume file (PDF, DOCX)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (TXT, MD)
        #[arg(short, long, conflicts_with = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Output format: console, json, markdown (defaults to the configured format)
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skip named entity recognition
        #[arg(long)]
        no_entities: bool,

        /// Use the fuzzy skill matcher
        #[arg(long)]
        fuzzy: bool,

        /// Include a preview of the extracted resume text
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Print the configured skill vocabulary
    Vocabulary,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(parse_output_format("md").unwrap(), OutputFormat::Markdown);
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::parse_from([
            "resume-analyser", "analyze", "--resume", "cv.pdf", "--job-text", "Python developer", "--fuzzy",
        ]);
        match cli.command {
            Commands::Analyze { resume, job, job_text, fuzzy, no_entities, .. } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert!(job.is_none());
                assert_eq!(job_text.as_deref(), Some("Python developer"));
                assert!(fuzzy);
                assert!(!no_entities);
            }
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn test_job_file_and_text_conflict() {
        let result = Cli::try_parse_from([
            "resume-analyser", "analyze", "-r", "cv.pdf", "-j", "job.txt", "--job-text", "Python",
        ]);
        assert!(result.is_err());
    }
}
