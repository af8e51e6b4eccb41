//! Configuration management for the resume analyser

use crate::error::{Result, ResumeAnalyserError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub skills: SkillsConfig,
    pub scoring: ScoringConfig,
    pub entities: EntityConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Skill terms matched against resume text
    pub vocabulary: Vec<String>,
    pub matcher: MatcherKind,
    /// Minimum Jaro-Winkler similarity for the fuzzy matcher
    pub fuzzy_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub skills_weight: f64,
    pub keyword_weight: f64,
    pub experience_weight: f64,
    pub education_weight: f64,
    pub experience_keywords: Vec<String>,
    pub education_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    pub enabled: bool,
    pub models_dir: PathBuf,
    /// Hugging Face repository of a BERT token-classification model
    pub model_repo: String,
    /// Repository to take `tokenizer.json` from when the model repo ships none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_repo: Option<String>,
    pub max_entities: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub show_entities: bool,
    pub show_common_terms: bool,
    pub preview_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            vocabulary: [
                "Python", "Java", "SQL", "Excel", "C++", "TensorFlow", "AWS", "Docker",
                "JavaScript", "React", "Django", "Flask",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            matcher: MatcherKind::Exact,
            fuzzy_threshold: 0.9,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            skills_weight: 0.4,
            keyword_weight: 0.3,
            experience_weight: 0.2,
            education_weight: 0.1,
            experience_keywords: ["experience", "years", "projects"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            education_keywords: ["bachelor", "master", "degree", "phd"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ScoringConfig {
    pub fn weight_sum(&self) -> f64 {
        self.skills_weight + self.keyword_weight + self.experience_weight + self.education_weight
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-analyser")
            .join("models");

        Self {
            enabled: true,
            models_dir,
            model_repo: "dslim/bert-base-NER".to_string(),
            tokenizer_repo: Some("bert-base-cased".to_string()),
            max_entities: 50,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
            show_entities: true,
            show_common_terms: true,
            preview_chars: 1500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skills: SkillsConfig::default(),
            scoring: ScoringConfig::default(),
            entities: EntityConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config = Self::from_toml(&content)?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ResumeAnalyserError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ResumeAnalyserError::Configuration(format!("Failed to serialize config: {}", e)))
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(config_path, self.to_toml()?)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-analyser")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        let weights = [
            scoring.skills_weight,
            scoring.keyword_weight,
            scoring.experience_weight,
            scoring.education_weight,
        ];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(ResumeAnalyserError::Configuration(
                "Scoring weights must be finite and non-negative".to_string(),
            ));
        }
        if (scoring.weight_sum() - 1.0).abs() > 1e-6 {
            return Err(ResumeAnalyserError::Configuration(format!(
                "Scoring weights must sum to 1.0, got {}",
                scoring.weight_sum()
            )));
        }
        if !(0.0..=1.0).contains(&self.skills.fuzzy_threshold) {
            return Err(ResumeAnalyserError::Configuration(format!(
                "skills.fuzzy_threshold must be within [0, 1], got {}",
                self.skills.fuzzy_threshold
            )));
        }
        if self.skills.vocabulary.iter().any(|term| term.trim().is_empty()) {
            return Err(ResumeAnalyserError::Configuration(
                "skills.vocabulary must not contain blank terms".to_string(),
            ));
        }
        Ok(())
    }
}
