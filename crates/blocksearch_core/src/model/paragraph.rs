//! Paragraph input model.
//!
//! # Responsibility
//! - Represent one extracted word-processing paragraph and its text runs.
//! - Keep style identifiers as opaque strings; interpretation lives in
//!   `segment::style`.
//!
//! # Invariants
//! - Run order mirrors document order inside the paragraph.
//! - A paragraph is read-only once handed to segmentation.

use serde::{Deserialize, Serialize};

/// One run of text inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Run {
    /// Literal run text.
    pub text: String,
    /// Run-level style identifier, e.g. the citation character style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Run {
    /// Creates an unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    /// Creates a run carrying a run-level style identifier.
    pub fn styled(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(style.into()),
        }
    }
}

/// One paragraph as supplied by the document reader.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph style identifier, `None` when the paragraph has no style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Ordered text runs.
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Creates a paragraph with the given style and runs.
    pub fn new(style: Option<&str>, runs: Vec<Run>) -> Self {
        Self {
            style: style.map(str::to_string),
            runs,
        }
    }

    /// Creates a styled paragraph holding a single plain run.
    pub fn with_text(style: &str, text: impl Into<String>) -> Self {
        Self::new(Some(style), vec![Run::plain(text)])
    }

    /// Creates an unstyled body paragraph holding a single plain run.
    pub fn body(text: impl Into<String>) -> Self {
        Self::new(None, vec![Run::plain(text)])
    }

    /// Concatenated text of every run.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Text of the first run, or empty when the paragraph has no runs.
    pub fn first_run_text(&self) -> &str {
        self.runs.first().map_or("", |run| run.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Paragraph, Run};

    #[test]
    fn text_concatenates_runs_in_order() {
        let paragraph = Paragraph::new(
            Some("Heading4"),
            vec![Run::plain("Tax "), Run::styled("cuts", "Emphasis"), Run::plain(" bad")],
        );
        assert_eq!(paragraph.text(), "Tax cuts bad");
        assert_eq!(paragraph.first_run_text(), "Tax ");
    }

    #[test]
    fn first_run_text_is_empty_without_runs() {
        let paragraph = Paragraph::new(Some("Heading1"), Vec::new());
        assert_eq!(paragraph.first_run_text(), "");
        assert_eq!(paragraph.text(), "");
    }
}
