//! Local store for the entity recognition model, fetched from the Hugging Face hub on first use

use crate::error::{Result, ResumeAnalyserError};
use hf_hub::api::tokio::{Api, ApiRepo};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

pub struct EntityModelStore {
    models_dir: PathBuf,
}

impl EntityModelStore {
    pub fn new(models_dir: PathBuf) -> Self {
        Self { models_dir }
    }

    /// Directory a repository is stored under, e.g. `dslim--bert-base-NER`
    pub fn local_dir(&self, repo_id: &str) -> PathBuf {
        self.models_dir.join(repo_id.replace('/', "--"))
    }

    /// Check a directory holds a config, a tokenizer and one weight file
    pub fn is_available(dir: &Path) -> bool {
        dir.join("config.json").is_file()
            && dir.join("tokenizer.json").is_file()
            && WEIGHT_FILES.iter().any(|f| dir.join(f).is_file())
    }

    /// Return the local model directory, downloading the model if it is missing.
    ///
    /// `tokenizer_repo` supplies `tokenizer.json` when the model repository
    /// does not ship one.
    pub async fn ensure(&self, repo_id: &str, tokenizer_repo: Option<&str>) -> Result<PathBuf> {
        let model_dir = self.local_dir(repo_id);
        if Self::is_available(&model_dir) {
            info!("Using cached entity model: {}", model_dir.display());
            return Ok(model_dir);
        }

        info!("Entity model not found locally, downloading {}", repo_id);
        fs::create_dir_all(&model_dir).await.map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to create model directory: {}", e))
        })?;

        let api = Api::new().map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to initialize HF API: {}", e))
        })?;
        let repo = api.repo(hf_hub::Repo::model(repo_id.to_string()));

        Self::fetch(&repo, "config.json", &model_dir).await.map_err(|e| {
            ResumeAnalyserError::ModelLoading(format!("Failed to download config.json from {}: {}", repo_id, e))
        })?;

        if let Err(e) = Self::fetch(&repo, "tokenizer.json", &model_dir).await {
            let fallback = tokenizer_repo.ok_or_else(|| {
                ResumeAnalyserError::ModelLoading(format!("{} has no tokenizer.json: {}", repo_id, e))
            })?;
            warn!("{} has no tokenizer.json, using the one from {}", repo_id, fallback);
            let tokenizer_source = api.repo(hf_hub::Repo::model(fallback.to_string()));
            Self::fetch(&tokenizer_source, "tokenizer.json", &model_dir).await.map_err(|e| {
                ResumeAnalyserError::ModelLoading(format!("Failed to download tokenizer.json from {}: {}", fallback, e))
            })?;
        }

        let mut last_error = String::new();
        let mut weights_downloaded = false;
        for weights in WEIGHT_FILES {
            match Self::fetch(&repo, weights, &model_dir).await {
                Ok(()) => {
                    weights_downloaded = true;
                    break;
                }
                Err(e) => last_error = e,
            }
        }
        if !weights_downloaded {
            return Err(ResumeAnalyserError::ModelLoading(format!(
                "Failed to download model weights from {}: {}",
                repo_id, last_error
            )));
        }

        info!("Entity model {} downloaded to {}", repo_id, model_dir.display());
        Ok(model_dir)
    }

    async fn fetch(repo: &ApiRepo, file: &str, model_dir: &Path) -> std::result::Result<(), String> {
        let cached = repo.get(file).await.map_err(|e| e.to_string())?;
        fs::copy(&cached, model_dir.join(file))
            .await
            .map_err(|e| format!("Failed to copy {}: {}", file, e))?;
        info!("  Downloaded: {}", file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_dir_flattens_repo_id() {
        let store = EntityModelStore::new(PathBuf::from("/models"));
        assert_eq!(
            store.local_dir("dslim/bert-base-NER"),
            PathBuf::from("/models/dslim--bert-base-NER")
        );
    }

    #[test]
    fn test_incomplete_directory_is_not_available() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("tokenizer.json"), "{}").unwrap();

        assert!(!EntityModelStore::is_available(temp_dir.path()));

        std::fs::write(temp_dir.path().join("pytorch_model.bin"), b"").unwrap();
        assert!(EntityModelStore::is_available(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_ensure_uses_existing_model_without_download() {
        let temp_dir = TempDir::new().unwrap();
        let store = EntityModelStore::new(temp_dir.path().to_path_buf());
        let model_dir = store.local_dir("acme/ner");
        std::fs::create_dir_all(&model_dir).unwrap();
        for file in ["config.json", "tokenizer.json", "model.safetensors"] {
            std::fs::write(model_dir.join(file), b"").unwrap();
        }

        let resolved = store.ensure("acme/ner", None).await.unwrap();
        assert_eq!(resolved, model_dir);
    }
}
