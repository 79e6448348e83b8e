//! The snapshot value
//!
//! A [`CodebaseSnapshot`] is one serialized text blob plus capture metadata.
//! Files are framed with a fixed delimiter so consumers can attribute any
//! span back to a file path:
//!
//! ```text
//! ****************************** (x100)
//! File: relative/path/to/file.py
//! ****************************** (x100)
//!
//! <file contents>
//!
//! ```

use chrono::{DateTime, Utc};

/// Delimiter line framing each file in the blob
pub const HEADER_LINE: &str = "****************************************************************************************************";

/// Separator appended after each file's contents
pub const FILE_SEPARATOR: &str = "\n\n";

/// Immutable textual capture of a source tree
#[derive(Debug, Clone)]
pub struct CodebaseSnapshot {
    text: String,
    file_count: usize,
    captured_at: DateTime<Utc>,
}

impl CodebaseSnapshot {
    /// Assemble a snapshot from already-framed file sections
    ///
    /// Used by the builder and by tests that fake a capture; `text` must
    /// carry the per-file framing produced by [`Self::frame_file`].
    #[must_use]
    pub fn from_framed_text(text: String, file_count: usize) -> Self {
        Self {
            text,
            file_count,
            captured_at: Utc::now(),
        }
    }

    /// The full serialized blob
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character count of the blob
    #[inline]
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Number of files captured
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Capture timestamp
    #[inline]
    #[must_use]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Frame one file as it appears inside the blob
    #[must_use]
    pub fn frame_file(relative_path: &str, contents: &str) -> String {
        format!("{HEADER_LINE}\nFile: {relative_path}\n{HEADER_LINE}\n\n{contents}{FILE_SEPARATOR}")
    }

    /// Extract the framed section for one file, if captured
    ///
    /// Returns the file's contents without the framing. Used by the prompt
    /// composer to pull hint excerpts and by the snippet validator for the
    /// no-op guard.
    #[must_use]
    pub fn file_section(&self, relative_path: &str) -> Option<&str> {
        let marker = format!("{HEADER_LINE}\nFile: {relative_path}\n{HEADER_LINE}\n\n");
        let start = self.text.find(&marker)? + marker.len();
        let rest = &self.text[start..];

        let end = rest.find(HEADER_LINE).unwrap_or(rest.len());
        Some(rest[..end].trim_end_matches('\n'))
    }

    /// Whether the snapshot captured the given file
    #[inline]
    #[must_use]
    pub fn contains_file(&self, relative_path: &str) -> bool {
        self.file_section(relative_path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CodebaseSnapshot {
        let mut text = String::new();
        text.push_str(&CodebaseSnapshot::frame_file(
            "backend/views.py",
            "def get_queryset(self):\n    return Todo.objects.all()\n",
        ));
        text.push_str(&CodebaseSnapshot::frame_file(
            "frontend/src/api.ts",
            "export const apiCall = () => fetch('/api');\n",
        ));
        CodebaseSnapshot::from_framed_text(text, 2)
    }

    #[test]
    fn metadata() {
        let snapshot = sample();
        assert_eq!(snapshot.file_count(), 2);
        assert_eq!(snapshot.char_count(), snapshot.text().chars().count());
    }

    #[test]
    fn file_section_extracts_contents() {
        let snapshot = sample();

        let section = snapshot.file_section("backend/views.py").unwrap();
        assert!(section.starts_with("def get_queryset"));
        assert!(!section.contains(HEADER_LINE));
        assert!(!section.contains("apiCall"));
    }

    #[test]
    fn file_section_last_file() {
        let snapshot = sample();

        let section = snapshot.file_section("frontend/src/api.ts").unwrap();
        assert_eq!(section, "export const apiCall = () => fetch('/api');");
    }

    #[test]
    fn file_section_missing_file() {
        let snapshot = sample();
        assert!(snapshot.file_section("nope.rs").is_none());
        assert!(!snapshot.contains_file("nope.rs"));
        assert!(snapshot.contains_file("backend/views.py"));
    }
}
