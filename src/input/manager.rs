//! Input manager for reading resumes and job descriptions from disk

use crate::error::{Result, ResumeAnalyserError};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{extract_document, extract_with_format};
use log::info;
use std::path::Path;
use tokio::fs;

#[derive(Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a resume and extract its text.
    ///
    /// Extensions other than `pdf` and `docx` produce an empty string.
    pub async fn extract_resume(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path).await?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        info!("Extracting resume text from: {}", path.display());
        extract_document(&bytes, extension)
    }

    /// Read a job description from a text, markdown, PDF or DOCX file.
    pub async fn extract_job_description(&self, path: &Path) -> Result<String> {
        let format = DocumentFormat::from_path(path);
        if format == DocumentFormat::Unknown {
            return Err(ResumeAnalyserError::UnsupportedFormat(format!(
                "Unsupported job description file: {}",
                path.display()
            )));
        }

        let bytes = self.read(path).await?;
        info!("Reading job description ({:?}): {}", format, path.display());
        extract_with_format(format, &bytes)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        if !path.exists() {
            return Err(ResumeAnalyserError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }
        Ok(fs::read(path).await?)
    }
}
