//! Named entity recognition
//!
//! The recognizer is an injected capability: the feature extractor holds a
//! `Box<dyn EntityRecognizer>` so tests and entity-free runs can substitute it.

use crate::error::{Result, ResumeAnalyserError};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

pub trait EntityRecognizer {
    /// Entities in the order the recognizer emits them
    fn recognize(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Recognizer used when entity detection is disabled
pub struct NoopRecognizer;

impl EntityRecognizer for NoopRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<Entity>> {
        Ok(Vec::new())
    }
}

/// Pretrained BERT token-classification tagger (CoNLL-style BIO labels)
pub struct BertEntityRecognizer {
    model: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    device: Device,
    cls_id: u32,
    sep_id: u32,
    window: usize,
}

/// Pick the inference device, honouring `RESUME_ANALYSER_DEVICE`
pub fn select_device() -> Result<Device> {
    if let Ok(device_preference) = std::env::var("RESUME_ANALYSER_DEVICE") {
        match device_preference.to_lowercase().as_str() {
            "cuda" => {
                return Device::new_cuda(0).map_err(|e| {
                    ResumeAnalyserError::ModelLoading(format!("Failed to initialize CUDA: {}", e))
                });
            }
            "metal" => {
                return Device::new_metal(0).map_err(|e| {
                    ResumeAnalyserError::ModelLoading(format!("Failed to initialize Metal: {}", e))
                });
            }
            "cpu" => return Ok(Device::Cpu),
            other => warn!("Unknown device '{}', falling back to auto-detection", other),
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA GPU for entity recognition");
            return Ok(device);
        }
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Using Metal GPU for entity recognition");
            return Ok(device);
        }
    }

    Ok(Device::Cpu)
}

impl BertEntityRecognizer {
    /// Load a model directory holding `config.json`, `tokenizer.json` and weights
    pub fn load(model_dir: &Path) -> Result<Self> {
        info!("Loading entity recognition model from: {}", model_dir.display());
        let device = select_device()?;

        let config_content = std::fs::read_to_string(model_dir.join("config.json")).map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to read model config: {}", e))
        })?;
        let raw_config: serde_json::Value = serde_json::from_str(&config_content).map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to parse model config: {}", e))
        })?;
        let bert_config: BertConfig = serde_json::from_value(raw_config.clone()).map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Unsupported model config: {}", e))
        })?;
        let labels = Self::labels_from_config(&raw_config)?;
        let hidden_size = Self::config_usize(&raw_config, "hidden_size")?;
        let max_positions = Self::config_usize(&raw_config, "max_position_embeddings")?;

        let tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json")).map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to load tokenizer: {}", e))
        })?;
        let special = |token: &str| {
            tokenizer.token_to_id(token).ok_or_else(|| {
                ResumeAnalyserError::ModelLoading(format!("Tokenizer has no {} token", token))
            })
        };
        let cls_id = special("[CLS]")?;
        let sep_id = special("[SEP]")?;

        let vb = Self::var_builder(model_dir, &device)?;
        let model = BertModel::load(vb.pp("bert"), &bert_config).map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to load BERT encoder: {}", e))
        })?;
        let classifier = candle_nn::linear(hidden_size, labels.len(), vb.pp("classifier")).map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to load classifier head: {}", e))
        })?;

        info!("Entity model ready ({} labels)", labels.len());
        Ok(Self {
            model,
            classifier,
            tokenizer,
            labels,
            device,
            cls_id,
            sep_id,
            window: max_positions.saturating_sub(2).max(1),
        })
    }

    /// Runs [`Self::load`] on the blocking thread pool.
    pub async fn load_async(model_dir: PathBuf) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::load(&model_dir))
            .await
            .map_err(|e| ResumeAnalyserError::ModelLoading(format!("Model loading task failed: {}", e)))?
    }

    fn var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
        let safetensors = model_dir.join("model.safetensors");
        let tensors: HashMap<String, Tensor> = if safetensors.exists() {
            candle_core::safetensors::load(&safetensors, device).map_err(|e| {
                ResumeAnalyserError::ModelLoading(format!("Failed to read safetensors weights: {}", e))
            })?
        } else {
            candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))
                .map_err(|e| {
                    ResumeAnalyserError::ModelLoading(format!("Failed to read PyTorch weights: {}", e))
                })?
                .into_iter()
                .collect()
        };
        Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
    }

    fn config_usize(config: &serde_json::Value, key: &str) -> Result<usize> {
        config[key]
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| ResumeAnalyserError::ModelLoading(format!("Model config has no {}", key)))
    }

    fn labels_from_config(config: &serde_json::Value) -> Result<Vec<String>> {
        let id2label = config["id2label"].as_object().ok_or_else(|| {
            ResumeAnalyserError::ModelLoading("Model config has no id2label map".to_string())
        })?;

        let mut labels = vec![String::new(); id2label.len()];
        for (id, label) in id2label {
            let idx: usize = id.parse().map_err(|_| {
                ResumeAnalyserError::ModelLoading(format!("Invalid label id '{}'", id))
            })?;
            let slot = labels.get_mut(idx).ok_or_else(|| {
                ResumeAnalyserError::ModelLoading(format!("Label id {} out of range", idx))
            })?;
            *slot = label.as_str().unwrap_or("O").to_string();
        }
        Ok(labels)
    }

    fn classify_window(&self, ids: &[u32]) -> Result<Vec<u32>> {
        let mut input = Vec::with_capacity(ids.len() + 2);
        input.push(self.cls_id);
        input.extend_from_slice(ids);
        input.push(self.sep_id);

        let input_ids = Tensor::new(input.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        let logits = self.classifier.forward(&hidden)?;
        let predictions = logits.squeeze(0)?.argmax(D::Minus1)?.to_vec1::<u32>()?;

        Ok(predictions[1..predictions.len() - 1].to_vec())
    }
}

impl EntityRecognizer for BertEntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let encoding = self.tokenizer.encode(text, false).map_err(|e| {
            ResumeAnalyserError::EntityRecognition(format!("Tokenization failed: {}", e))
        })?;
        let ids = encoding.get_ids();

        let mut predictions = Vec::with_capacity(ids.len());
        for window in ids.chunks(self.window) {
            predictions.extend(self.classify_window(window)?);
        }

        let tokens: Vec<TaggedToken> = predictions
            .iter()
            .zip(encoding.get_offsets())
            .zip(encoding.get_word_ids())
            .map(|((label_id, &(start, end)), word)| TaggedToken {
                label: self
                    .labels
                    .get(*label_id as usize)
                    .map(String::as_str)
                    .unwrap_or("O"),
                start,
                end,
                word: *word,
            })
            .collect();

        let entities = merge_tagged_tokens(text, &tokens);
        debug!("Recognized {} entities over {} tokens", entities.len(), tokens.len());
        Ok(entities)
    }
}

/// A word piece with its predicted BIO label and byte span in the source text
#[derive(Debug, Clone)]
pub(crate) struct TaggedToken<'a> {
    pub label: &'a str,
    pub start: usize,
    pub end: usize,
    pub word: Option<u32>,
}

/// Merge BIO-tagged word pieces into entity spans.
///
/// The label of a word is the label of its first piece; continuation pieces
/// extend whatever span the word belongs to.
pub(crate) fn merge_tagged_tokens(text: &str, tokens: &[TaggedToken<'_>]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut open: Option<(String, usize, usize)> = None;
    let mut previous_word: Option<u32> = None;

    let close = |open: &mut Option<(String, usize, usize)>, entities: &mut Vec<Entity>| {
        if let Some((label, start, end)) = open.take() {
            if let Some(span) = text.get(start..end) {
                entities.push(Entity {
                    text: span.to_string(),
                    label,
                });
            }
        }
    };

    for token in tokens {
        let continuation = token.word.is_some() && token.word == previous_word;
        previous_word = token.word;

        if continuation {
            if let Some((_, _, end)) = open.as_mut() {
                *end = token.end;
            }
            continue;
        }

        let (prefix, kind) = match token.label.split_once('-') {
            Some((prefix, kind)) => (prefix, kind),
            None => (token.label, ""),
        };

        let extends_open = prefix == "I" && matches!(&open, Some((label, _, _)) if label == kind);
        if extends_open {
            if let Some((_, _, end)) = open.as_mut() {
                *end = token.end;
            }
        } else if (prefix == "B" || prefix == "I") && !kind.is_empty() {
            close(&mut open, &mut entities);
            open = Some((kind.to_string(), token.start, token.end));
        } else {
            close(&mut open, &mut entities);
        }
    }
    close(&mut open, &mut entities);

    entities
}
