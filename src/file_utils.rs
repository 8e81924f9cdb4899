// File utilities for Tingwu API
//
// This module contains utility functions for file operations used in the Tingwu API.
// It handles deriving artifact filenames, creating per-task directories, and writing
// downloaded content to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Derive a local filename for an artifact from its download URL
///
/// Takes the last path segment of the URL and strips any query string.
/// Falls back to `<key>.json` when the URL has no usable segment, so a
/// malformed (but fetchable) URL never loses the artifact.
pub fn artifact_file_name(url: &str, key: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    let segment = without_query.rsplit('/').next().unwrap_or("");

    if segment.is_empty() {
        format!("{}.json", key)
    } else {
        segment.to_string()
    }
}

/// Create the output directory for a single task's files
///
/// # Arguments
///
/// * `base_dir` - Base output directory
/// * `task_id` - Remote task identifier, used as the subfolder name
pub fn task_output_dir(base_dir: &str, task_id: &str) -> io::Result<PathBuf> {
    let dir = Path::new(base_dir).join(task_id);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Save raw bytes to the filesystem
pub fn save_bytes(data: &[u8], file_path: &Path) -> io::Result<()> {
    fs::write(file_path, data)
}

/// Save text content to the filesystem
pub fn save_text(content: &str, file_path: &Path) -> io::Result<()> {
    fs::write(file_path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name_strips_query() {
        let url = "https://bucket.example.com/results/task123/Transcription.json?Expires=1700000000&Signature=abc%2Fdef";
        assert_eq!(
            artifact_file_name(url, "Transcription"),
            "Transcription.json"
        );
    }

    #[test]
    fn test_artifact_file_name_plain_url() {
        let url = "https://bucket.example.com/results/chapters.json";
        assert_eq!(artifact_file_name(url, "AutoChapters"), "chapters.json");
    }

    #[test]
    fn test_artifact_file_name_falls_back_to_key() {
        assert_eq!(
            artifact_file_name("https://bucket.example.com/", "Summarization"),
            "Summarization.json"
        );
        assert_eq!(artifact_file_name("", "MeetingAssistance"), "MeetingAssistance.json");
    }
}
