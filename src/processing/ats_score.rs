//! ATS (Applicant Tracking System) score aggregation
//!
//! Four sub-scores, each a percentage in [0, 100]:
//!
//! * skills match: share of job description tokens that are detected skills
//! * keyword match: share of job description tokens that occur in the resume
//! * experience match: share of experience keywords that occur in the resume
//! * education match: share of education keywords that occur in the resume
//!
//! Tokens are lower-cased whitespace-separated words with punctuation kept.

use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtsWeights {
    pub skills: f64,
    pub keyword: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for AtsWeights {
    fn default() -> Self {
        Self {
            skills: 0.4,
            keyword: 0.3,
            experience: 0.2,
            education: 0.1,
        }
    }
}

impl From<&ScoringConfig> for AtsWeights {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            skills: config.skills_weight,
            keyword: config.keyword_weight,
            experience: config.experience_weight,
            education: config.education_weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsScore {
    pub skills_match: f64,
    pub keyword_match: f64,
    pub experience_match: f64,
    pub education_match: f64,
    /// Weighted total rounded to two decimals
    pub overall: f64,
}

pub struct AtsAggregator {
    weights: AtsWeights,
}

impl Default for AtsAggregator {
    fn default() -> Self {
        Self::new(AtsWeights::default())
    }
}

impl AtsAggregator {
    pub fn new(weights: AtsWeights) -> Self {
        Self { weights }
    }

    pub fn score(
        &self,
        resume_skills: &[String],
        resume_text: &str,
        job_description: &str,
        experience_keywords: &[String],
        education_keywords: &[String],
    ) -> AtsScore {
        let job_words = lowercase_words(job_description);
        let resume_words = lowercase_words(resume_text);
        let skills: HashSet<String> = resume_skills.iter().map(|s| s.to_lowercase()).collect();

        let skills_match = percentage(skills.intersection(&job_words).count(), job_words.len());
        let keyword_match = percentage(resume_words.intersection(&job_words).count(), job_words.len());
        let experience_match = keyword_list_match(&resume_words, experience_keywords);
        let education_match = keyword_list_match(&resume_words, education_keywords);

        let weighted = self.weights.skills * skills_match
            + self.weights.keyword * keyword_match
            + self.weights.experience * experience_match
            + self.weights.education * education_match;

        AtsScore {
            skills_match,
            keyword_match,
            experience_match,
            education_match,
            overall: round2(weighted.clamp(0.0, 100.0)),
        }
    }
}

fn lowercase_words(text: &str) -> HashSet<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

fn percentage(found: usize, total: usize) -> f64 {
    found as f64 / total.max(1) as f64 * 100.0
}

/// Distinct keywords found over the length of the list as given; 0 for an empty list
fn keyword_list_match(resume_words: &HashSet<String>, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let wanted: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    percentage(wanted.intersection(resume_words).count(), keywords.len())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = AtsWeights::default();
        assert!((w.skills + w.keyword + w.experience + w.education - 1.0).abs() < 1e-12);
        assert_eq!(AtsWeights::from(&ScoringConfig::default()), w);
    }

    #[test]
    fn test_reference_scenario() {
        let aggregator = AtsAggregator::default();
        let score = aggregator.score(
            &strings(&["Python", "AWS", "Docker"]),
            "Python developer with 5 years experience in AWS and Docker",
            "Looking for Python AWS Docker experience",
            &strings(&["experience", "years"]),
            &[],
        );

        // job tokens: looking, for, python, aws, docker, experience
        assert!((score.skills_match - 50.0).abs() < 1e-9);
        assert!((score.keyword_match - 400.0 / 6.0).abs() < 1e-9);
        assert_eq!(score.experience_match, 100.0);
        assert_eq!(score.education_match, 0.0);
        assert_eq!(score.overall, 60.0);
    }

    #[test]
    fn test_empty_job_description_uses_only_keyword_lists() {
        let aggregator = AtsAggregator::default();
        let score = aggregator.score(
            &strings(&["Python"]),
            "Master degree, 3 years experience",
            "",
            &strings(&["experience", "years", "projects"]),
            &strings(&["bachelor", "master", "degree", "phd"]),
        );

        assert_eq!(score.skills_match, 0.0);
        assert_eq!(score.keyword_match, 0.0);
        let expected = 0.2 * score.experience_match + 0.1 * score.education_match;
        assert!((score.overall - round2(expected)).abs() < 1e-9);
        // "degree," keeps its comma, so only "master" counts
        assert_eq!(score.education_match, 25.0);
    }

    #[test]
    fn test_keyword_denominator_counts_duplicates() {
        let aggregator = AtsAggregator::default();
        let score = aggregator.score(
            &[],
            "years of experience",
            "",
            &strings(&["Years", "years"]),
            &[],
        );

        assert_eq!(score.experience_match, 50.0);
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let aggregator = AtsAggregator::default();
        let score = aggregator.score(
            &strings(&["python", "PYTHON"]),
            "python",
            "python",
            &strings(&["python"]),
            &strings(&["python"]),
        );

        assert_eq!(score.overall, 100.0);
        for sub in [score.skills_match, score.keyword_match, score.experience_match, score.education_match] {
            assert!((0.0..=100.0).contains(&sub));
        }
    }

    #[test]
    fn test_custom_weights() {
        let aggregator = AtsAggregator::new(AtsWeights {
            skills: 0.0,
            keyword: 1.0,
            experience: 0.0,
            education: 0.0,
        });
        let score = aggregator.score(&[], "rust go", "rust python go java", &[], &[]);

        assert_eq!(score.overall, 50.0);
    }
}
