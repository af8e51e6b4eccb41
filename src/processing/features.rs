//! Resume feature extraction: word count, skills and named entities

use crate::error::Result;
use crate::processing::entities::{Entity, EntityRecognizer};
use crate::processing::vocabulary::SkillVocabulary;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ENTITIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub word_count: usize,
    pub skills_found: Vec<String>,
    pub entities_found: Vec<Entity>,
}

pub struct FeatureExtractor {
    vocabulary: Box<dyn SkillVocabulary>,
    recognizer: Box<dyn EntityRecognizer>,
    max_entities: usize,
}

impl FeatureExtractor {
    pub fn new(vocabulary: Box<dyn SkillVocabulary>, recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self {
            vocabulary,
            recognizer,
            max_entities: DEFAULT_MAX_ENTITIES,
        }
    }

    pub fn with_max_entities(mut self, max_entities: usize) -> Self {
        self.max_entities = max_entities;
        self
    }

    pub fn vocabulary(&self) -> &dyn SkillVocabulary {
        self.vocabulary.as_ref()
    }

    pub fn extract(&self, text: &str) -> Result<FeatureSet> {
        let mut entities_found = self.recognizer.recognize(text)?;
        entities_found.truncate(self.max_entities);

        Ok(FeatureSet {
            word_count: text.split_whitespace().count(),
            skills_found: self.vocabulary.lookup(text),
            entities_found,
        })
    }
}
