//! Analysis engine running the full resume scoring pipeline

use crate::config::{Config, ScoringConfig};
use crate::error::Result;
use crate::processing::ats_score::{AtsAggregator, AtsScore, AtsWeights};
use crate::processing::entities::EntityRecognizer;
use crate::processing::features::{FeatureExtractor, FeatureSet};
use crate::processing::similarity::{SimilarityResult, SimilarityScorer};
use crate::processing::vocabulary::build_vocabulary;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Main analysis engine that coordinates all analysis components
pub struct AnalysisEngine {
    features: FeatureExtractor,
    similarity: SimilarityScorer,
    aggregator: AtsAggregator,
    scoring: ScoringConfig,
    preview_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub resume_source: String,
    pub generated_at: DateTime<Utc>,
    /// Leading part of the extracted resume text
    pub preview: String,
    pub features: FeatureSet,
    /// Present only when a non-blank job description was supplied
    pub similarity: Option<SimilarityResult>,
    pub ats: AtsScore,
}

impl AnalysisEngine {
    pub fn new(config: &Config, recognizer: Box<dyn EntityRecognizer>) -> Result<Self> {
        let vocabulary = build_vocabulary(&config.skills)?;
        let features = FeatureExtractor::new(vocabulary, recognizer)
            .with_max_entities(config.entities.max_entities);

        Ok(Self {
            features,
            similarity: SimilarityScorer::new(),
            aggregator: AtsAggregator::new(AtsWeights::from(&config.scoring)),
            scoring: config.scoring.clone(),
            preview_chars: config.output.preview_chars,
        })
    }

    pub fn skill_vocabulary(&self) -> &[String] {
        self.features.vocabulary().terms()
    }

    pub fn analyze(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
        resume_source: &str,
    ) -> Result<AnalysisReport> {
        info!("Analyzing resume content ({} characters)", resume_text.len());
        let features = self.features.extract(resume_text)?;
        debug!(
            "Found {} words, {} skills, {} entities",
            features.word_count,
            features.skills_found.len(),
            features.entities_found.len()
        );

        let job_description = job_description.unwrap_or_default();
        let similarity = if job_description.trim().is_empty() {
            None
        } else {
            info!("Comparing resume with job description");
            Some(self.similarity.compare(resume_text, job_description))
        };

        let ats = self.aggregator.score(
            &features.skills_found,
            resume_text,
            job_description,
            &self.scoring.experience_keywords,
            &self.scoring.education_keywords,
        );
        info!("ATS score: {:.2}%", ats.overall);

        Ok(AnalysisReport {
            resume_source: resume_source.to_string(),
            generated_at: Utc::now(),
            preview: preview(resume_text, self.preview_chars),
            features,
            similarity,
            ats,
        })
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::entities::NoopRecognizer;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo wörld", 4), "héll...");
        assert_eq!(preview("short", 10), "short");
    }

    #[test]
    fn test_blank_job_description_skips_similarity() {
        let engine = AnalysisEngine::new(&Config::default(), Box::new(NoopRecognizer)).unwrap();
        let report = engine.analyze("Python developer, 4 years experience", Some("   "), "cv.pdf").unwrap();

        assert!(report.similarity.is_none());
        assert_eq!(report.ats.skills_match, 0.0);
        assert_eq!(report.ats.keyword_match, 0.0);
    }

    #[test]
    fn test_engine_uses_configured_vocabulary() {
        let mut config = Config::default();
        config.skills.vocabulary = vec!["Rust".to_string()];
        let engine = AnalysisEngine::new(&config, Box::new(NoopRecognizer)).unwrap();

        let report = engine.analyze("Rust and Python", None, "cv.docx").unwrap();
        assert_eq!(report.features.skills_found, vec!["Rust"]);
        assert_eq!(engine.skill_vocabulary(), &["Rust".to_string()]);
    }
}
