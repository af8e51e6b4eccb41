//! Output formatters for analysis reports

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{Result, ResumeAnalyserError};
use crate::processing::analyzer::AnalysisReport;
use colored::{Color, Colorize};
use std::collections::BTreeMap;
use std::path::Path;

/// Trait for formatting analysis reports
pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
}

/// Which report sections to render
#[derive(Debug, Clone, Copy)]
pub struct Sections {
    pub entities: bool,
    pub common_terms: bool,
    pub preview: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            entities: true,
            common_terms: true,
            preview: false,
        }
    }
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    sections: Sections,
}

/// JSON formatter for structured output
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for saved reports
pub struct MarkdownFormatter {
    sections: Sections,
}

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

/// Count entities per label, the data behind the entity distribution chart
pub fn entity_label_counts(report: &AnalysisReport) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entity in &report.features.entities_found {
        *counts.entry(entity.label.clone()).or_insert(0) += 1;
    }
    counts
}

fn score_verdict(score: f64) -> (&'static str, Color) {
    match score {
        s if s >= 80.0 => ("STRONG", Color::Green),
        s if s >= 60.0 => ("GOOD", Color::BrightGreen),
        s if s >= 40.0 => ("FAIR", Color::Yellow),
        _ => ("WEAK", Color::Red),
    }
}

fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, sections: Sections) -> Self {
        Self { use_colors, sections }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = score_verdict(score);
        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME ANALYSIS", 1));
        output.push_str(&format!(
            "Resume: {} | Generated: {}\n",
            report.resume_source,
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if self.sections.preview {
            output.push_str(&self.format_header("Resume Preview", 2));
            output.push_str(&report.preview);
            output.push('\n');
        }

        output.push_str(&self.format_header("Overview", 2));
        output.push_str(&format!("Total words:        {}\n", report.features.word_count));
        output.push_str(&format!("Skills found:       {}\n", report.features.skills_found.len()));
        output.push_str(&format!("Entities extracted: {}\n", report.features.entities_found.len()));

        output.push_str(&self.format_header("Skills Identified", 2));
        if report.features.skills_found.is_empty() {
            output.push_str(&self.colorize("No predefined skills found in this resume.\n", Color::Yellow));
        } else {
            for skill in &report.features.skills_found {
                output.push_str(&format!("  • {}\n", self.colorize(skill, Color::Cyan)));
            }
        }

        if self.sections.entities && !report.features.entities_found.is_empty() {
            output.push_str(&self.format_header("Named Entity Distribution", 2));
            let counts = entity_label_counts(report);
            let max = counts.values().copied().max().unwrap_or(1);
            for (label, count) in &counts {
                let bar = "█".repeat((count * 30).div_ceil(max));
                output.push_str(&format!("  {:<8} {} {}\n", label, self.colorize(&bar, Color::Blue), count));
            }
        }

        if let Some(similarity) = &report.similarity {
            output.push_str(&self.format_header("Resume Match Score", 2));
            output.push_str(&format!(
                "Match Percentage: {:.2}%\n{}\n",
                similarity.score,
                progress_bar(similarity.score, 40)
            ));
            if self.sections.common_terms {
                let common = if similarity.common_terms.is_empty() {
                    "None".to_string()
                } else {
                    similarity.common_terms.join(", ")
                };
                output.push_str(&format!("Common Keywords: {}\n", self.colorize(&common, Color::Green)));
            }
        }

        output.push_str(&self.format_header("ATS Score", 2));
        output.push_str(&format!(
            "ATS Score: {}% {}\n{}\n",
            report.ats.overall,
            self.format_score_badge(report.ats.overall),
            progress_bar(report.ats.overall, 40)
        ));
        output.push_str(&self.format_header("Score Breakdown", 3));
        output.push_str(&format!("  Skills match:     {:.2}%\n", report.ats.skills_match));
        output.push_str(&format!("  Keyword match:    {:.2}%\n", report.ats.keyword_match));
        output.push_str(&format!("  Experience match: {:.2}%\n", report.ats.experience_match));
        output.push_str(&format!("  Education match:  {:.2}%\n", report.ats.education_match));

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

impl MarkdownFormatter {
    pub fn new(sections: Sections) -> Self {
        Self { sections }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Analysis\n\n");
        output.push_str(&format!(
            "*Resume:* `{}`  \n*Generated:* {}\n\n",
            report.resume_source,
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if self.sections.preview {
            output.push_str("## Resume Preview\n\n```text\n");
            output.push_str(&report.preview);
            output.push_str("\n```\n\n");
        }

        output.push_str("## Overview\n\n| Metric | Value |\n|---|---|\n");
        output.push_str(&format!("| Total words | {} |\n", report.features.word_count));
        output.push_str(&format!("| Skills found | {} |\n", report.features.skills_found.len()));
        output.push_str(&format!("| Entities extracted | {} |\n\n", report.features.entities_found.len()));

        output.push_str("## Skills Identified\n\n");
        if report.features.skills_found.is_empty() {
            output.push_str("_No predefined skills found in this resume._\n\n");
        } else {
            for skill in &report.features.skills_found {
                output.push_str(&format!("- {}\n", skill));
            }
            output.push('\n');
        }

        if self.sections.entities && !report.features.entities_found.is_empty() {
            output.push_str("## Named Entities\n\n| Entity | Count |\n|---|---|\n");
            for (label, count) in entity_label_counts(report) {
                output.push_str(&format!("| {} | {} |\n", Self::escape_cell(&label), count));
            }
            output.push('\n');
        }

        if let Some(similarity) = &report.similarity {
            output.push_str(&format!("## Resume Match Score\n\n**{:.2}%**\n\n", similarity.score));
            if self.sections.common_terms {
                let common = if similarity.common_terms.is_empty() {
                    "None".to_string()
                } else {
                    similarity.common_terms.join(", ")
                };
                output.push_str(&format!("Common keywords: {}\n\n", common));
            }
        }

        output.push_str(&format!("## ATS Score\n\n**{}%** ({})\n\n", report.ats.overall, score_verdict(report.ats.overall).0));
        output.push_str("| Component | Score |\n|---|---|\n");
        output.push_str(&format!("| Skills match | {:.2}% |\n", report.ats.skills_match));
        output.push_str(&format!("| Keyword match | {:.2}% |\n", report.ats.keyword_match));
        output.push_str(&format!("| Experience match | {:.2}% |\n", report.ats.experience_match));
        output.push_str(&format!("| Education match | {:.2}% |\n", report.ats.education_match));

        Ok(output)
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, Sections::default(), true)
    }

    pub fn with_options(use_colors: bool, sections: Sections, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, sections),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(sections),
        }
    }

    pub fn from_config(config: &OutputConfig, detailed: bool) -> Self {
        let sections = Sections {
            entities: config.show_entities,
            common_terms: config.show_common_terms,
            preview: detailed,
        };
        Self::with_options(config.color_output, sections, true)
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: &OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        };
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content).map_err(|e| {
        ResumeAnalyserError::OutputFormatting(format!("Failed to write {}: {}", file_path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ats_score::AtsScore;
    use crate::processing::entities::Entity;
    use crate::processing::features::FeatureSet;
    use crate::processing::similarity::SimilarityResult;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            resume_source: "jane.pdf".to_string(),
            generated_at: chrono::Utc::now(),
            preview: "Jane Doe...".to_string(),
            features: FeatureSet {
                word_count: 42,
                skills_found: vec!["Python".to_string(), "AWS".to_string()],
                entities_found: vec![
                    Entity { text: "Jane Doe".to_string(), label: "PER".to_string() },
                    Entity { text: "Acme".to_string(), label: "ORG".to_string() },
                    Entity { text: "Globex".to_string(), label: "ORG".to_string() },
                ],
            },
            similarity: Some(SimilarityResult {
                score: 37.5,
                common_terms: vec!["aws".to_string(), "python".to_string()],
            }),
            ats: AtsScore {
                skills_match: 50.0,
                keyword_match: 66.67,
                experience_match: 100.0,
                education_match: 0.0,
                overall: 60.0,
            },
        }
    }

    #[test]
    fn test_console_report_contains_scores() {
        let formatter = ConsoleFormatter::new(false, Sections::default());
        let output = formatter.format_report(&sample_report()).unwrap();

        assert!(output.contains("ATS Score: 60% [GOOD]"));
        assert!(output.contains("Match Percentage: 37.50%"));
        assert!(output.contains("Common Keywords: aws, python"));
        assert!(output.contains("Named Entity Distribution"));
    }

    #[test]
    fn test_hidden_sections_are_omitted() {
        let sections = Sections { entities: false, common_terms: false, preview: false };
        let output = ConsoleFormatter::new(false, sections).format_report(&sample_report()).unwrap();

        assert!(!output.contains("Named Entity Distribution"));
        assert!(!output.contains("Common Keywords"));
    }

    #[test]
    fn test_markdown_report() {
        let output = MarkdownFormatter::new(Sections::default())
            .format_report(&sample_report())
            .unwrap();

        assert!(output.starts_with("# Resume Analysis"));
        assert!(output.contains("| ORG | 2 |"));
        assert!(output.contains("**60%** (GOOD)"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let generator = ReportGenerator::new();
        let json = generator.generate_report(&sample_report(), &OutputFormat::Json).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.ats.overall, 60.0);
        assert_eq!(parsed.features.skills_found, vec!["Python", "AWS"]);
    }

    #[test]
    fn test_entity_label_counts() {
        let counts = entity_label_counts(&sample_report());
        assert_eq!(counts.get("ORG"), Some(&2));
        assert_eq!(counts.get("PER"), Some(&1));
    }
}
