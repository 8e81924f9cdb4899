// Result artifact documents for Tingwu API
//
// This module contains the typed shapes of the optional result artifacts
// (chapters, summarization, meeting assistance) and the rendering of each
// into the plain-text block the record sink receives. Every artifact is
// optional; a job only produces the ones its feature flags enabled.

use std::collections::HashMap;

use serde::Deserialize;

use crate::transcript::format_timestamp;

/// Shape of the AutoChapters artifact file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AutoChaptersDocument {
    pub auto_chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Chapter {
    pub start: u64,
    pub end: u64,
    pub headline: String,
    pub summary: String,
}

/// Shape of the Summarization artifact file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SummarizationDocument {
    pub summarization: Summarization,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Summarization {
    pub paragraph_summary: Option<String>,
    pub conversational_summary: Vec<ConversationalSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConversationalSummary {
    pub speaker_name: String,
    pub summary: String,
}

/// Shape of the MeetingAssistance artifact file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MeetingAssistanceDocument {
    pub meeting_assistance: MeetingAssistance,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MeetingAssistance {
    pub keywords: Vec<String>,
    pub classifications: HashMap<String, f64>,
}

/// Render chapters as one text block: a time range, headline and summary per chapter
pub fn render_chapters(chapters: &[Chapter]) -> String {
    chapters
        .iter()
        .map(|chapter| {
            let headline = if chapter.headline.is_empty() {
                "Untitled"
            } else {
                chapter.headline.as_str()
            };
            format!(
                "{} - {}: {}\n{}",
                format_timestamp(chapter.start),
                format_timestamp(chapter.end),
                headline,
                chapter.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the summarization artifact as one text block
pub fn render_summarization(summarization: &Summarization) -> String {
    let mut parts = Vec::new();

    if let Some(paragraph) = &summarization.paragraph_summary {
        parts.push(format!("Paragraph summary: {}", paragraph));
    }

    if !summarization.conversational_summary.is_empty() {
        let lines = summarization
            .conversational_summary
            .iter()
            .map(|item| format!("{}: {}", item.speaker_name, item.summary))
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("Conversational summary:\n{}", lines));
    }

    parts.join("\n\n")
}

/// Render the meeting assistance artifact as one text block
pub fn render_meeting_assistance(assistance: &MeetingAssistance) -> String {
    let mut parts = Vec::new();

    if !assistance.keywords.is_empty() {
        parts.push(format!("Keywords: {}", assistance.keywords.join(", ")));
    }

    if !assistance.classifications.is_empty() {
        let mut entries: Vec<_> = assistance.classifications.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let lines = entries
            .iter()
            .map(|(name, share)| format!("{}: {:.2}%", name, *share * 100.0))
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("Classifications:\n{}", lines));
    }

    parts.join("\n")
}
