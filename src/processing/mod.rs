//! Resume analysis pipeline: features, similarity and ATS scoring

pub mod vocabulary;
pub mod entities;
pub mod model_store;
pub mod features;
pub mod stop_words;
pub mod similarity;
pub mod ats_score;
pub mod analyzer;
