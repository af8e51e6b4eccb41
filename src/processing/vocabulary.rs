//! Skill vocabulary providers
//!
//! A provider scans text and reports which configured skills it mentions.
//! The feature extractor only depends on the [`SkillVocabulary`] trait, so the
//! matching strategy can change without touching scoring.

use crate::config::{MatcherKind, SkillsConfig};
use crate::error::{Result, ResumeAnalyserError};
use regex::Regex;
use std::collections::HashSet;
use strsim::jaro_winkler;

pub trait SkillVocabulary {
    /// Skills mentioned in `text`, in order of first occurrence.
    fn lookup(&self, text: &str) -> Vec<String>;

    /// The configured vocabulary terms
    fn terms(&self) -> &[String];
}

/// Case-insensitive whole-word matching over a fixed term list.
///
/// Results keep the form found in the text and are deduplicated by that form,
/// so "Python" and "python" are reported separately.
pub struct RegexVocabulary {
    terms: Vec<String>,
    matcher: Option<Regex>,
}

impl RegexVocabulary {
    pub fn new(terms: &[String]) -> Result<Self> {
        let mut patterns: Vec<&String> = terms.iter().filter(|t| !t.trim().is_empty()).collect();
        // Longest first so "React Native" wins over "React"
        patterns.sort_by(|a, b| b.len().cmp(&a.len()));

        let matcher = if patterns.is_empty() {
            None
        } else {
            let alternation = patterns
                .iter()
                .map(|term| Self::term_pattern(term))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&format!("(?i)(?:{})", alternation)).map_err(|e| {
                ResumeAnalyserError::Configuration(format!("Invalid skill vocabulary: {}", e))
            })?;
            Some(regex)
        };

        Ok(Self {
            terms: terms.to_vec(),
            matcher,
        })
    }

    /// Word boundaries are only required on edges that are word characters,
    /// otherwise terms like "C++" could never match before a space.
    fn term_pattern(term: &str) -> String {
        let is_word = |c: Option<char>| c.map_or(false, |c| c.is_alphanumeric() || c == '_');
        let lead = if is_word(term.chars().next()) { r"\b" } else { "" };
        let tail = if is_word(term.chars().last()) { r"\b" } else { "" };
        format!("{}{}{}", lead, regex::escape(term), tail)
    }
}

impl SkillVocabulary for RegexVocabulary {
    fn lookup(&self, text: &str) -> Vec<String> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for mat in matcher.find_iter(text) {
            if seen.insert(mat.as_str()) {
                found.push(mat.as_str().to_string());
            }
        }
        found
    }

    fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Approximate matching of whitespace tokens against the vocabulary using
/// Jaro-Winkler similarity. Reports the canonical vocabulary term.
pub struct FuzzyVocabulary {
    terms: Vec<String>,
    lowered: Vec<String>,
    threshold: f64,
}

impl FuzzyVocabulary {
    pub fn new(terms: &[String], threshold: f64) -> Self {
        Self {
            terms: terms.to_vec(),
            lowered: terms.iter().map(|t| t.to_lowercase()).collect(),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    fn clean_word(word: &str) -> String {
        word.chars()
            .filter(|c| c.is_alphanumeric() || *c == '+' || *c == '#')
            .collect::<String>()
            .to_lowercase()
    }
}

impl SkillVocabulary for FuzzyVocabulary {
    fn lookup(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();

        for word in text.split_whitespace() {
            let clean_word = Self::clean_word(word);
            if clean_word.is_empty() {
                continue;
            }

            let best = self
                .lowered
                .iter()
                .enumerate()
                .map(|(idx, term)| (idx, jaro_winkler(&clean_word, term)))
                .filter(|(_, similarity)| *similarity >= self.threshold)
                .max_by(|a, b| a.1.total_cmp(&b.1));

            if let Some((idx, _)) = best {
                let term = &self.terms[idx];
                if !found.contains(term) {
                    found.push(term.clone());
                }
            }
        }

        found
    }

    fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Build the vocabulary provider selected in the configuration
pub fn build_vocabulary(config: &SkillsConfig) -> Result<Box<dyn SkillVocabulary>> {
    Ok(match config.matcher {
        MatcherKind::Exact => Box::new(RegexVocabulary::new(&config.vocabulary)?),
        MatcherKind::Fuzzy => Box::new(FuzzyVocabulary::new(&config.vocabulary, config.fuzzy_threshold)),
    })
}
