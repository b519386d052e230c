//! Paragraph role classification.
//!
//! Roles are assigned from an ordered decision table; the first matching
//! rule wins:
//!
//! 1. no visible text → [`Role::Empty`]
//! 2. heading style or outline level → [`Role::Heading`]
//! 3. list membership → [`Role::ListItem`]
//! 4. caption, quote or code style → the matching role
//! 5. anything else → [`Role::Body`]
//!
//! List membership is checked before caption/quote/code styles so that a
//! numbered paragraph never receives a fullwidth indent on top of its
//! list marker.

use crate::error::{Error, Result};
use crate::model::{Paragraph, ParagraphStyle};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default heading style pattern (English, Chinese, Russian, German, Swedish).
pub const DEFAULT_HEADING_PATTERN: &str = r"heading|title|标题|заголовок|überschrift|rubrik";

/// Default caption style pattern.
pub const DEFAULT_CAPTION_PATTERN: &str = r"caption|题注";

/// Default quote style pattern.
pub const DEFAULT_QUOTE_PATTERN: &str = r"quote|block text|引用";

/// Default code style pattern.
pub const DEFAULT_CODE_PATTERN: &str = r"code|preformatted|代码";

/// Highest outline level that still denotes a heading (level 9 is body text).
const MAX_HEADING_OUTLINE_LEVEL: u8 = 8;

/// Structural role of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Ordinary body text
    Body,
    /// Heading or title
    Heading,
    /// Numbered or bulleted list member
    ListItem,
    /// Figure or table caption
    Caption,
    /// Block quotation
    Quote,
    /// Code or preformatted text
    Code,
    /// No visible text
    Empty,
}

impl Role {
    /// All roles, in decision-table order.
    pub const ALL: [Role; 7] = [
        Role::Empty,
        Role::Heading,
        Role::ListItem,
        Role::Caption,
        Role::Quote,
        Role::Code,
        Role::Body,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Body => "body",
            Role::Heading => "heading",
            Role::ListItem => "list-item",
            Role::Caption => "caption",
            Role::Quote => "quote",
            Role::Code => "code",
            Role::Empty => "empty",
        }
    }

    /// Check whether paragraphs of this role may ever receive an indent.
    pub fn is_indentable(&self) -> bool {
        matches!(self, Role::Body | Role::Quote)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized || (normalized == "list" && *r == Role::ListItem))
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

/// Style-name patterns used to recognize non-body paragraphs.
///
/// Patterns are case-insensitive regular expressions matched against both
/// the style name and the style id.
#[derive(Debug, Clone)]
pub struct StyleRules {
    heading: Regex,
    caption: Regex,
    quote: Regex,
    code: Regex,
}

impl StyleRules {
    /// Create rules with the default patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the heading pattern.
    pub fn with_heading_pattern(mut self, pattern: &str) -> Result<Self> {
        self.heading = compile(pattern)?;
        Ok(self)
    }

    /// Replace the caption pattern.
    pub fn with_caption_pattern(mut self, pattern: &str) -> Result<Self> {
        self.caption = compile(pattern)?;
        Ok(self)
    }

    /// Replace the quote pattern.
    pub fn with_quote_pattern(mut self, pattern: &str) -> Result<Self> {
        self.quote = compile(pattern)?;
        Ok(self)
    }

    /// Replace the code pattern.
    pub fn with_code_pattern(mut self, pattern: &str) -> Result<Self> {
        self.code = compile(pattern)?;
        Ok(self)
    }

    /// Check whether the style denotes a heading.
    pub fn is_heading(&self, style: &ParagraphStyle) -> bool {
        style
            .outline_level
            .is_some_and(|level| level <= MAX_HEADING_OUTLINE_LEVEL)
            || matches_style(&self.heading, style)
    }

    /// Map a caption/quote/code style to its role.
    fn special_role(&self, style: &ParagraphStyle) -> Option<Role> {
        if matches_style(&self.caption, style) {
            Some(Role::Caption)
        } else if matches_style(&self.quote, style) {
            Some(Role::Quote)
        } else if matches_style(&self.code, style) {
            Some(Role::Code)
        } else {
            None
        }
    }
}

impl Default for StyleRules {
    fn default() -> Self {
        Self {
            heading: compile(DEFAULT_HEADING_PATTERN).unwrap(),
            caption: compile(DEFAULT_CAPTION_PATTERN).unwrap(),
            quote: compile(DEFAULT_QUOTE_PATTERN).unwrap(),
            code: compile(DEFAULT_CODE_PATTERN).unwrap(),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){}", pattern))
        .map_err(|e| Error::Other(format!("Invalid style pattern '{}': {}", pattern, e)))
}

fn matches_style(re: &Regex, style: &ParagraphStyle) -> bool {
    style.identifiers().any(|s| re.is_match(s))
}

/// Assign a role to a paragraph. Total: every paragraph gets exactly one.
pub fn classify(paragraph: &Paragraph, rules: &StyleRules) -> Role {
    if !paragraph.has_text_content() {
        return Role::Empty;
    }
    if rules.is_heading(&paragraph.style) {
        return Role::Heading;
    }
    if paragraph.style.list.is_some() {
        return Role::ListItem;
    }
    rules.special_role(&paragraph.style).unwrap_or(Role::Body)
}
