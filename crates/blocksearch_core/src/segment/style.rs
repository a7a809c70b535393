//! Paragraph style classification.
//!
//! # Responsibility
//! - Map paragraph style identifiers to outline levels.
//! - Carry the externally configured style identifiers.
//!
//! # Invariants
//! - `classify` is total: unknown or absent styles yield `None`.
//! - Configured identifiers are non-blank and pairwise distinct.

use crate::model::outline::HeaderLevel;
use crate::model::paragraph::{Paragraph, Run};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Structural paragraph kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParagraphKind {
    Pocket,
    Hat,
    Block,
    /// Introduces a card.
    Tag,
}

impl ParagraphKind {
    /// Header level for heading kinds, `None` for `Tag`.
    pub fn header_level(self) -> Option<HeaderLevel> {
        match self {
            Self::Pocket => Some(HeaderLevel::Pocket),
            Self::Hat => Some(HeaderLevel::Hat),
            Self::Block => Some(HeaderLevel::Block),
            Self::Tag => None,
        }
    }
}

/// Style identifiers of the outline convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub pocket: String,
    pub hat: String,
    pub block: String,
    pub tag: String,
    /// Run-level style marking the citation/author run.
    pub cite: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            pocket: "Heading1".to_string(),
            hat: "Heading2".to_string(),
            block: "Heading3".to_string(),
            tag: "Heading4".to_string(),
            cite: "Style13ptBold".to_string(),
        }
    }
}

/// Style configuration failures.
#[derive(Debug)]
pub enum StyleConfigError {
    /// A field is blank after trim.
    EmptyStyle(&'static str),
    /// Two fields share the same identifier.
    DuplicateStyle {
        first: &'static str,
        second: &'static str,
        value: String,
    },
    /// Config file could not be read.
    Io(std::io::Error),
    /// Config file is not valid JSON for `StyleConfig`.
    Parse(serde_json::Error),
}

impl Display for StyleConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStyle(field) => write!(f, "style `{field}` must not be blank"),
            Self::DuplicateStyle {
                first,
                second,
                value,
            } => write!(f, "styles `{first}` and `{second}` share identifier `{value}`"),
            Self::Io(err) => write!(f, "failed to read style config: {err}"),
            Self::Parse(err) => write!(f, "invalid style config: {err}"),
        }
    }
}

impl Error for StyleConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::EmptyStyle(_) | Self::DuplicateStyle { .. } => None,
        }
    }
}

impl StyleConfig {
    /// Loads and validates a JSON style config. Missing fields keep defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StyleConfigError> {
        let raw = std::fs::read_to_string(path).map_err(StyleConfigError::Io)?;
        let config: Self = serde_json::from_str(&raw).map_err(StyleConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that identifiers are usable for classification.
    pub fn validate(&self) -> Result<(), StyleConfigError> {
        let fields = self.fields();
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(StyleConfigError::EmptyStyle(name));
            }
        }
        for (index, (first, value)) in fields.iter().enumerate() {
            if let Some((second, _)) = fields[index + 1..].iter().find(|(_, other)| other == value) {
                return Err(StyleConfigError::DuplicateStyle {
                    first: *first,
                    second: *second,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a run carries the citation style.
    pub fn is_cite_run(&self, run: &Run) -> bool {
        run.style.as_deref() == Some(self.cite.as_str())
    }

    fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("pocket", self.pocket.as_str()),
            ("hat", self.hat.as_str()),
            ("block", self.block.as_str()),
            ("tag", self.tag.as_str()),
            ("cite", self.cite.as_str()),
        ]
    }
}

/// Classifies a paragraph by its style identifier.
pub fn classify(styles: &StyleConfig, paragraph: &Paragraph) -> Option<ParagraphKind> {
    let style = paragraph.style.as_deref()?;
    if style == styles.pocket {
        Some(ParagraphKind::Pocket)
    } else if style == styles.hat {
        Some(ParagraphKind::Hat)
    } else if style == styles.block {
        Some(ParagraphKind::Block)
    } else if style == styles.tag {
        Some(ParagraphKind::Tag)
    } else {
        None
    }
}

/// True when `classify` yields any structural kind.
pub fn is_structural(styles: &StyleConfig, paragraph: &Paragraph) -> bool {
    classify(styles, paragraph).is_some()
}

#[cfg(test)]
mod tests {
    use super::{classify, is_structural, ParagraphKind, StyleConfig, StyleConfigError};
    use crate::model::paragraph::Paragraph;

    #[test]
    fn known_styles_map_to_levels() {
        let styles = StyleConfig::default();
        let cases = [
            ("Heading1", ParagraphKind::Pocket),
            ("Heading2", ParagraphKind::Hat),
            ("Heading3", ParagraphKind::Block),
            ("Heading4", ParagraphKind::Tag),
        ];
        for (style, expected) in cases {
            let paragraph = Paragraph::with_text(style, "x");
            assert_eq!(classify(&styles, &paragraph), Some(expected), "{style}");
            assert!(is_structural(&styles, &paragraph));
        }
    }

    #[test]
    fn unknown_or_missing_style_is_not_structural() {
        let styles = StyleConfig::default();
        for paragraph in [
            Paragraph::body("plain"),
            Paragraph::with_text("Heading5", "deeper"),
            Paragraph::with_text("heading1", "case differs"),
            Paragraph::with_text("Style13ptBold", "cite is a run style"),
        ] {
            assert_eq!(classify(&styles, &paragraph), None);
            assert!(!is_structural(&styles, &paragraph));
        }
    }

    #[test]
    fn validate_rejects_blank_and_duplicate_styles() {
        let mut styles = StyleConfig::default();
        styles.hat = "  ".to_string();
        assert!(matches!(
            styles.validate(),
            Err(StyleConfigError::EmptyStyle("hat"))
        ));

        let mut styles = StyleConfig::default();
        styles.block = styles.pocket.clone();
        assert!(matches!(
            styles.validate(),
            Err(StyleConfigError::DuplicateStyle {
                first: "pocket",
                second: "block",
                ..
            })
        ));
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.json");
        std::fs::write(&path, r#"{"pocket": "Pocket", "cite": "Cite"}"#).unwrap();

        let styles = StyleConfig::from_json_file(&path).unwrap();
        assert_eq!(styles.pocket, "Pocket");
        assert_eq!(styles.hat, "Heading2");
        assert_eq!(styles.cite, "Cite");
    }
}
