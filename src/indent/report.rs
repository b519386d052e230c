//! Change report for a normalization pass.

use super::role::Role;
use crate::error::ParagraphStructureError;
use crate::model::StoryKind;
use serde::Serialize;
use std::fmt;

/// Which story a paragraph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "story", rename_all = "lowercase")]
pub enum StoryRef {
    /// Main document body
    Body,
    /// Header or footer, by position in the document's story list
    Secondary {
        /// Header or footer
        kind: StoryKind,
        /// Index into `Document::headers_footers`
        position: usize,
    },
}

/// Location of a paragraph within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParagraphLocation {
    /// Story holding the paragraph
    #[serde(flatten)]
    pub story: StoryRef,
    /// Paragraph ordinal within the story (document order, 0-based)
    pub index: usize,
}

impl fmt::Display for ParagraphLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.story {
            StoryRef::Body => write!(f, "body paragraph {}", self.index + 1),
            StoryRef::Secondary { kind, position } => {
                let name = match kind {
                    StoryKind::Header => "header",
                    StoryKind::Footer => "footer",
                };
                write!(f, "{} {} paragraph {}", name, position + 1, self.index + 1)
            }
        }
    }
}

/// A paragraph that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphFailure {
    /// Where the paragraph is
    pub location: ParagraphLocation,
    /// What was wrong with it
    pub error: ParagraphStructureError,
}

/// Number of paragraphs per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    /// Body paragraphs
    pub body: usize,
    /// Headings
    pub heading: usize,
    /// List items
    pub list_item: usize,
    /// Captions
    pub caption: usize,
    /// Quotes
    pub quote: usize,
    /// Code blocks
    pub code: usize,
    /// Empty paragraphs
    pub empty: usize,
}

impl RoleCounts {
    /// Increment the counter for a role.
    pub fn add(&mut self, role: Role) {
        match role {
            Role::Body => self.body += 1,
            Role::Heading => self.heading += 1,
            Role::ListItem => self.list_item += 1,
            Role::Caption => self.caption += 1,
            Role::Quote => self.quote += 1,
            Role::Code => self.code += 1,
            Role::Empty => self.empty += 1,
        }
    }

    /// Get the counter for a role.
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Body => self.body,
            Role::Heading => self.heading,
            Role::ListItem => self.list_item,
            Role::Caption => self.caption,
            Role::Quote => self.quote,
            Role::Code => self.code,
            Role::Empty => self.empty,
        }
    }
}

/// Outcome of normalizing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Paragraphs visited
    pub paragraphs: usize,

    /// Paragraphs whose leading whitespace changed
    pub touched: usize,

    /// Paragraphs left alone because of their role
    pub skipped_by_role: usize,

    /// Paragraphs already carrying the canonical indent
    pub skipped_already_correct: usize,

    /// Paragraphs with malformed run structure
    pub failed: Vec<ParagraphFailure>,

    /// Classification breakdown
    pub roles: RoleCounts,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failed paragraphs.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Check if any paragraph changed.
    pub fn has_changes(&self) -> bool {
        self.touched > 0
    }

    /// Check if no paragraph failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Record a failed paragraph.
    pub fn record_failure(&mut self, location: ParagraphLocation, error: ParagraphStructureError) {
        self.failed.push(ParagraphFailure { location, error });
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} touched, {} skipped by role, {} already correct, {} failed",
            self.touched,
            self.skipped_by_role,
            self.skipped_already_correct,
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_counts() {
        let mut counts = RoleCounts::default();
        counts.add(Role::Body);
        counts.add(Role::Body);
        counts.add(Role::ListItem);
        assert_eq!(counts.get(Role::Body), 2);
        assert_eq!(counts.get(Role::ListItem), 1);
        assert_eq!(counts.get(Role::Empty), 0);
    }

    #[test]
    fn test_location_display() {
        let body = ParagraphLocation {
            story: StoryRef::Body,
            index: 0,
        };
        assert_eq!(body.to_string(), "body paragraph 1");

        let footer = ParagraphLocation {
            story: StoryRef::Secondary {
                kind: StoryKind::Footer,
                position: 1,
            },
            index: 2,
        };
        assert_eq!(footer.to_string(), "footer 2 paragraph 3");
    }

    #[test]
    fn test_report_serializes() {
        let mut report = Report::new();
        report.touched = 3;
        report.record_failure(
            ParagraphLocation {
                story: StoryRef::Body,
                index: 4,
            },
            ParagraphStructureError::NoContent,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["touched"], 3);
        assert_eq!(json["failed"][0]["location"]["story"], "body");
        assert_eq!(json["failed"][0]["location"]["index"], 4);
        assert_eq!(json["failed"][0]["error"]["kind"], "no_content");
        assert_eq!(report.to_string(), "3 touched, 0 skipped by role, 0 already correct, 1 failed");
    }
}
