// Transcript reconstruction for Tingwu API
//
// This module rebuilds a chronological, speaker-attributed transcript from
// the word-level Transcription artifact. Words carry individual timestamps
// but share their paragraph's speaker; the reconstruction flattens them,
// orders them globally by start time, and merges maximal same-speaker runs
// into turns.

use serde::{Deserialize, Serialize};

/// One time-stamped token of the transcription
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Word {
    /// Start offset in milliseconds
    #[serde(default)]
    pub start: u64,
    /// End offset in milliseconds, never before `start`
    #[serde(default)]
    pub end: u64,
    /// Token text, spacing and punctuation included
    #[serde(default)]
    pub text: String,
}

/// A speaker-tagged group of words as delivered by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Paragraph {
    /// Speaker identifier shared by all words of the paragraph
    #[serde(default)]
    pub speaker_id: String,
    #[serde(default)]
    pub words: Vec<Word>,
}

/// Top-level shape of the Transcription artifact file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TranscriptionDocument {
    pub task_id: String,
    pub transcription: Option<TranscriptionSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TranscriptionSection {
    pub paragraphs: Vec<Paragraph>,
}

/// A maximal run of consecutive same-speaker words in global time order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeakerTurn {
    /// Speaker identifier
    pub speaker: String,
    /// Start offset of the turn's first word, in milliseconds
    pub start_ms: u64,
    /// Concatenated word texts, trimmed
    pub text: String,
}

/// Merge paragraph words into chronological speaker turns
///
/// Words are flattened across paragraphs, stable-sorted by start time
/// (paragraph order breaks ties, so equal timestamps never reorder a
/// speaker's own words), then accumulated into turns that close on every
/// speaker change. Token text is appended verbatim; the source tokenization
/// already carries its spacing, so no separator is injected. The whole
/// accumulated text is trimmed once when the turn closes.
pub fn reconstruct(paragraphs: &[Paragraph]) -> Vec<SpeakerTurn> {
    let mut words: Vec<(&str, &Word)> = paragraphs
        .iter()
        .flat_map(|p| p.words.iter().map(move |w| (p.speaker_id.as_str(), w)))
        .collect();
    words.sort_by_key(|(_, w)| w.start);

    let mut turns = Vec::new();
    let mut current_speaker: Option<String> = None;
    let mut current_text = String::new();
    let mut turn_start = 0u64;

    for (speaker, word) in words {
        match &current_speaker {
            Some(s) if s.as_str() == speaker => {
                current_text.push_str(&word.text);
            }
            Some(s) => {
                turns.push(SpeakerTurn {
                    speaker: s.clone(),
                    start_ms: turn_start,
                    text: current_text.trim().to_string(),
                });
                current_speaker = Some(speaker.to_string());
                current_text = word.text.clone();
                turn_start = word.start;
            }
            None => {
                current_speaker = Some(speaker.to_string());
                current_text = word.text.clone();
                turn_start = word.start;
            }
        }
    }

    if let Some(speaker) = current_speaker {
        turns.push(SpeakerTurn {
            speaker,
            start_ms: turn_start,
            text: current_text.trim().to_string(),
        });
    }

    turns
}

/// Format a millisecond offset as `[mm:ss]`
pub fn format_timestamp(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("[{:02}:{:02}]", total_seconds / 60, total_seconds % 60)
}

/// Human-readable label for a speaker id
pub fn speaker_label(speaker: &str) -> String {
    format!("Speaker {}", speaker)
}

/// Render turns as the persisted transcript text
///
/// One `"<speaker> [mm:ss]"` header line per turn, followed by the turn text.
pub fn render_transcript(turns: &[SpeakerTurn]) -> String {
    let mut lines = Vec::with_capacity(turns.len() * 2);
    for turn in turns {
        lines.push(format!(
            "{} {}",
            speaker_label(&turn.speaker),
            format_timestamp(turn.start_ms)
        ));
        lines.push(turn.text.clone());
    }
    lines.join("\n")
}

/// Render turns as the single text block pushed to the record sink
pub fn render_sink_field(turns: &[SpeakerTurn]) -> String {
    turns
        .iter()
        .map(|turn| {
            format!(
                "{} {}: {}",
                format_timestamp(turn.start_ms),
                speaker_label(&turn.speaker),
                turn.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
