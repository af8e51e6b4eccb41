//! File type detection

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
    Markdown,
    Unknown,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            "txt" => DocumentFormat::Text,
            "md" | "markdown" => DocumentFormat::Markdown,
            _ => DocumentFormat::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(DocumentFormat::Unknown)
    }

    /// Formats accepted for uploaded resumes
    pub fn is_resume_format(&self) -> bool {
        matches!(self, DocumentFormat::Pdf | DocumentFormat::Docx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension(".docx"), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_extension("markdown"), DocumentFormat::Markdown);
        assert_eq!(DocumentFormat::from_extension("doc"), DocumentFormat::Unknown);
    }

    #[test]
    fn test_path_without_extension_is_unknown() {
        assert_eq!(DocumentFormat::from_path(Path::new("resume")), DocumentFormat::Unknown);
        assert!(DocumentFormat::from_path(Path::new("cv.Docx")).is_resume_format());
        assert!(!DocumentFormat::from_path(Path::new("job.txt")).is_resume_format());
    }
}
