//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Placeholder character standing in for a visible inline object.
pub const OBJECT_PLACEHOLDER: char = '\u{FFFC}';

/// A paragraph of formatted text.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Runs in the paragraph, in reading order
    pub runs: Vec<Run>,

    /// Style metadata (read-only input for classification)
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single plain text run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph from a list of runs.
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            style: ParagraphStyle::default(),
        }
    }

    /// Create a paragraph using the named style.
    pub fn styled(style_name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut p = Self::with_text(text);
        p.style.style_name = Some(style_name.into());
        p
    }

    /// Create a list item paragraph.
    pub fn list_item(level: u8, text: impl Into<String>) -> Self {
        let mut p = Self::with_text(text);
        p.style.list = Some(ListInfo::new(level));
        p
    }

    /// Replace the style and return self.
    pub fn with_style(mut self, style: ParagraphStyle) -> Self {
        self.style = style;
        self
    }

    /// Add plain text with the neutral format.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.runs.push(Run::plain(text));
    }

    /// Add a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph has no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Check if the paragraph holds any visible text.
    ///
    /// Whitespace and object placeholders do not count.
    pub fn has_text_content(&self) -> bool {
        self.runs
            .iter()
            .filter(|r| r.kind == RunKind::Text)
            .flat_map(|r| r.text.chars())
            .any(|c| !c.is_whitespace())
    }
}

/// Kind of content a run carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// Ordinary formatted text
    #[default]
    Text,
    /// Zero-width structural content; text is always empty
    Marker,
    /// Visible non-text content; text is a single placeholder
    Object,
}

/// A contiguous span of text sharing one formatting token.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Text payload
    pub text: String,

    /// Opaque formatting, copied verbatim
    pub format: FormatToken,

    /// What the run carries
    pub kind: RunKind,
}

impl Run {
    /// Create a text run with the given format.
    pub fn new(text: impl Into<String>, format: FormatToken) -> Self {
        Self {
            text: text.into(),
            format,
            kind: RunKind::Text,
        }
    }

    /// Create a text run with the neutral format.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, FormatToken::neutral())
    }

    /// Create a zero-width marker run.
    pub fn marker(format: FormatToken) -> Self {
        Self {
            text: String::new(),
            format,
            kind: RunKind::Marker,
        }
    }

    /// Create an inline object run.
    pub fn object(format: FormatToken) -> Self {
        Self {
            text: OBJECT_PLACEHOLDER.to_string(),
            format,
            kind: RunKind::Object,
        }
    }

    /// Check if this run has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if this is a text run.
    pub fn is_text(&self) -> bool {
        self.kind == RunKind::Text
    }
}

/// Opaque formatting handle attached to a run.
///
/// Containers store whatever they need to re-serialize a run (properties,
/// raw markup) behind it. Equality is identity: two tokens are equal only
/// when they share the same allocation, or are both neutral.
#[derive(Clone, Default)]
pub struct FormatToken(Option<Arc<dyn Any + Send + Sync>>);

impl FormatToken {
    /// The token used when no formatting is known.
    pub fn neutral() -> Self {
        Self(None)
    }

    /// Wrap a container-specific value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// Check if this is the neutral token.
    pub fn is_neutral(&self) -> bool {
        self.0.is_none()
    }

    /// Access the wrapped value if it has the expected type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref::<T>()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for FormatToken {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for FormatToken {}

impl fmt::Debug for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "FormatToken(neutral)"),
            Some(inner) => write!(f, "FormatToken({:p})", Arc::as_ptr(inner)),
        }
    }
}

/// Paragraph style metadata supplied by the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Style identifier (e.g., "Heading1" or a localized numeric id)
    pub style_id: Option<String>,

    /// Human-readable style name (e.g., "heading 1", "标题 1")
    pub style_name: Option<String>,

    /// Outline level 0-8; `None` for body text
    pub outline_level: Option<u8>,

    /// List membership if the paragraph is numbered or bulleted
    pub list: Option<ListInfo>,
}

impl ParagraphStyle {
    /// Iterate over the style id and name that are present.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.style_name
            .as_deref()
            .into_iter()
            .chain(self.style_id.as_deref())
    }
}

/// Information about a list item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    /// Nesting level (0 = top level)
    pub level: u8,

    /// Numbering definition reference, if known
    pub numbering_id: Option<String>,
}

impl ListInfo {
    /// Create list membership at the given level.
    pub fn new(level: u8) -> Self {
        Self {
            level,
            numbering_id: None,
        }
    }

    /// Set the numbering reference.
    pub fn with_numbering(mut self, id: impl Into<String>) -> Self {
        self.numbering_id = Some(id.into());
        self
    }
}
