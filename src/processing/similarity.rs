//! TF-IDF cosine similarity between a resume and a job description

use crate::processing::stop_words::english_stop_words;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

const MAX_COMMON_TERMS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Cosine similarity as a percentage in [0, 100]
    pub score: f64,
    /// Shared cleaned tokens, sorted, at most ten
    pub common_terms: Vec<String>,
}

pub struct SimilarityScorer {
    stop_words: HashSet<&'static str>,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer {
    pub fn new() -> Self {
        Self {
            stop_words: english_stop_words(),
        }
    }

    /// Lower-case and drop everything that is not an ASCII letter or a space.
    ///
    /// Digits, punctuation and line breaks are removed outright, so words on
    /// either side of a newline are glued together.
    pub fn clean_text(text: &str) -> String {
        text.to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || *c == ' ')
            .collect()
    }

    pub fn compare(&self, resume_text: &str, job_description: &str) -> SimilarityResult {
        let resume = Self::clean_text(resume_text);
        let job = Self::clean_text(job_description);

        let score = self.tfidf_cosine(&resume, &job) * 100.0;

        let resume_words: BTreeSet<&str> = resume.split_whitespace().collect();
        let job_words: BTreeSet<&str> = job.split_whitespace().collect();
        let common_terms: Vec<String> = resume_words
            .intersection(&job_words)
            .take(MAX_COMMON_TERMS)
            .map(|w| w.to_string())
            .collect();

        debug!("Similarity {:.2}% with {} common terms", score, common_terms.len());
        SimilarityResult {
            score: score.clamp(0.0, 100.0),
            common_terms,
        }
    }

    /// Vectorizer tokens: runs of two or more letters, minus stop words
    fn terms<'a>(&self, cleaned: &'a str) -> Vec<&'a str> {
        cleaned
            .split_whitespace()
            .filter(|t| t.len() >= 2 && !self.stop_words.contains(t))
            .collect()
    }

    /// Cosine similarity of smoothed TF-IDF vectors over the two-document corpus.
    /// Returns 0.0 when neither document has any vocabulary.
    fn tfidf_cosine(&self, first: &str, second: &str) -> f64 {
        let counts = [term_counts(&self.terms(first)), term_counts(&self.terms(second))];

        let vocabulary: BTreeSet<&str> = counts.iter().flat_map(|c| c.keys().copied()).collect();
        if vocabulary.is_empty() {
            return 0.0;
        }

        let n_docs = counts.len() as f64;
        let idf: BTreeMap<&str, f64> = vocabulary
            .iter()
            .map(|term| {
                let df = counts.iter().filter(|c| c.contains_key(term)).count() as f64;
                (*term, ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0)
            })
            .collect();

        let vectors: Vec<BTreeMap<&str, f64>> = counts
            .iter()
            .map(|c| {
                let weighted: BTreeMap<&str, f64> =
                    c.iter().map(|(term, tf)| (*term, *tf as f64 * idf[term])).collect();
                l2_normalize(weighted)
            })
            .collect();

        vectors[0]
            .iter()
            .filter_map(|(term, w)| vectors[1].get(term).map(|v| w * v))
            .sum()
    }
}

fn term_counts<'a>(terms: &[&'a str]) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for term in terms {
        *counts.entry(*term).or_insert(0) += 1;
    }
    counts
}

fn l2_normalize(mut vector: BTreeMap<&str, f64>) -> BTreeMap<&str, f64> {
    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for w in vector.values_mut() {
            *w /= norm;
        }
    }
    vector
}
