//! Integration tests for the resume analyser

use resume_analyser::config::{Config, OutputFormat};
use resume_analyser::error::Result;
use resume_analyser::input::manager::InputManager;
use resume_analyser::output::formatter::{save_report_to_file, ReportGenerator};
use resume_analyser::processing::analyzer::AnalysisEngine;
use resume_analyser::processing::entities::{Entity, EntityRecognizer, NoopRecognizer};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    std::fs::write(path, bytes).unwrap();
}

fn engine() -> AnalysisEngine {
    AnalysisEngine::new(&Config::default(), Box::new(NoopRecognizer)).unwrap()
}

/// Tags every capitalised word as a person
struct CapitalisedRecognizer;

impl EntityRecognizer for CapitalisedRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        Ok(text
            .split_whitespace()
            .filter(|w| w.chars().next().map_or(false, char::is_uppercase))
            .map(|w| Entity {
                text: w.to_string(),
                label: "PER".to_string(),
            })
            .collect())
    }
}

#[tokio::test]
async fn test_docx_resume_extraction() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resume.docx");
    write_docx(&path, &["Jane Doe", "Python developer"]);

    let text = InputManager::new().extract_resume(&path).await.unwrap();
    assert_eq!(text, "Jane Doe\nPython developer");
}

#[tokio::test]
async fn test_unsupported_resume_extension_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resume.txt");
    std::fs::write(&path, "Python developer").unwrap();

    let text = InputManager::new().extract_resume(&path).await.unwrap();
    assert!(text.is_empty());
}

#[tokio::test]
async fn test_missing_resume_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = InputManager::new()
        .extract_resume(&dir.path().join("missing.pdf"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_markdown_job_description_is_stripped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.md");
    std::fs::write(&path, "# Backend Engineer\n\n**Python** and *AWS* required").unwrap();

    let text = InputManager::new().extract_job_description(&path).await.unwrap();
    assert!(text.contains("Backend Engineer"));
    assert!(text.contains("Python and AWS required"));
    assert!(!text.contains('#'));
    assert!(!text.contains("**"));
}

#[tokio::test]
async fn test_unknown_job_extension_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.xyz");
    std::fs::write(&path, "Python").unwrap();

    assert!(InputManager::new().extract_job_description(&path).await.is_err());
}

#[tokio::test]
async fn test_docx_resume_through_pipeline() {
    let dir = TempDir::new().unwrap();
    let resume_path = dir.path().join("resume.docx");
    write_docx(
        &resume_path,
        &["Python developer with 5 years experience in AWS and Docker"],
    );
    let job_path = dir.path().join("job.txt");
    std::fs::write(&job_path, "Looking for Python AWS Docker experience").unwrap();

    let manager = InputManager::new();
    let resume_text = manager.extract_resume(&resume_path).await.unwrap();
    let job_text = manager.extract_job_description(&job_path).await.unwrap();

    let report = engine().analyze(&resume_text, Some(&job_text), "resume.docx").unwrap();
    for skill in ["Python", "AWS", "Docker"] {
        assert!(report.features.skills_found.iter().any(|s| s == skill));
    }
    assert_eq!(report.ats.overall, 60.0);
    assert!(report.similarity.unwrap().score > 0.0);
}

#[test]
fn test_reference_scenario() {
    let resume = "Python developer with 5 years experience in AWS and Docker";
    let job = "Looking for Python AWS Docker experience";
    let report = engine().analyze(resume, Some(job), "cv.pdf").unwrap();

    assert_eq!(report.ats.skills_match, 50.0);
    assert!((report.ats.keyword_match - 66.67).abs() < 0.01);
    assert_eq!(report.ats.experience_match, 100.0);
    assert_eq!(report.ats.overall, 60.0);
}

#[test]
fn test_analysis_is_deterministic() {
    let resume = "Java and SQL engineer, master degree, 7 years experience";
    let job = "Senior Java engineer with SQL and Excel";
    let engine = engine();

    let first = engine.analyze(resume, Some(job), "cv.pdf").unwrap();
    let second = engine.analyze(resume, Some(job), "cv.pdf").unwrap();
    assert_eq!(first.features, second.features);
    assert_eq!(first.similarity, second.similarity);
    assert_eq!(first.ats, second.ats);
}

#[test]
fn test_identical_texts_score_full_similarity() {
    let text = "Data engineer building Spark pipelines on AWS";
    let report = engine().analyze(text, Some(text), "cv.pdf").unwrap();

    let similarity = report.similarity.unwrap();
    assert!((similarity.score - 100.0).abs() < 1e-6);
}

#[test]
fn test_disjoint_texts_score_zero_similarity() {
    let report = engine()
        .analyze("gardening pottery", Some("kubernetes terraform"), "cv.pdf")
        .unwrap();

    let similarity = report.similarity.unwrap();
    assert_eq!(similarity.score, 0.0);
    assert!(similarity.common_terms.is_empty());
}

#[test]
fn test_missing_job_description() {
    let report = engine()
        .analyze("Python developer, 3 years experience", None, "cv.pdf")
        .unwrap();

    assert!(report.similarity.is_none());
    assert_eq!(report.ats.skills_match, 0.0);
    assert_eq!(report.ats.keyword_match, 0.0);
}

#[test]
fn test_entities_capped_at_fifty() {
    let resume = (0..120).map(|i| format!("Person{}", i)).collect::<Vec<_>>().join(" ");
    let engine = AnalysisEngine::new(&Config::default(), Box::new(CapitalisedRecognizer)).unwrap();

    let report = engine.analyze(&resume, None, "cv.pdf").unwrap();
    assert_eq!(report.features.entities_found.len(), 50);
    assert_eq!(report.features.word_count, 120);
}

#[test]
fn test_report_formats_include_ats_score() {
    let report = engine()
        .analyze(
            "Python developer with 5 years experience in AWS and Docker",
            Some("Looking for Python AWS Docker experience"),
            "cv.pdf",
        )
        .unwrap();
    let generator = ReportGenerator::with_options(false, Default::default(), true);

    let console = generator.generate_report(&report, &OutputFormat::Console).unwrap();
    let markdown = generator.generate_report(&report, &OutputFormat::Markdown).unwrap();
    let json = generator.generate_report(&report, &OutputFormat::Json).unwrap();

    assert!(console.contains("ATS Score: 60%"));
    assert!(markdown.contains("**60%**"));
    assert!(json.contains("\"overall\": 60.0"));
}

#[test]
fn test_save_report_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports").join("cv_analysis.md");

    save_report_to_file("# Resume Analysis", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Resume Analysis");
}
