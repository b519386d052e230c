//! Indent planning: leading whitespace analysis and edit plans.

use super::options::IndentOptions;
use super::role::Role;
use super::width::{self, CharWidth};
use crate::model::{Run, RunKind};

/// Position in a run sequence where content begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentBoundary {
    /// Index of the run holding the first content character
    pub run: usize,
    /// Byte offset of that character inside the run's text
    pub offset: usize,
}

/// Maximal whitespace prefix of a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadingWhitespace {
    /// The whitespace characters themselves
    pub text: String,
    /// Where content begins; `None` when the paragraph has no content
    pub boundary: Option<IndentBoundary>,
}

impl LeadingWhitespace {
    /// Check if there is no leading whitespace.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if the prefix is exactly `width` fullwidth spaces.
    pub fn is_canonical(&self, width: usize) -> bool {
        self.text.chars().count() == width
            && self
                .text
                .chars()
                .all(|c| width::classify(c) == CharWidth::FullwidthSpace)
    }
}

/// Scan runs for the leading whitespace prefix.
///
/// Markers are transparent; objects count as content.
pub fn leading_whitespace(runs: &[Run]) -> LeadingWhitespace {
    let mut text = String::new();
    for (index, run) in runs.iter().enumerate() {
        match run.kind {
            RunKind::Marker => continue,
            RunKind::Object => {
                return LeadingWhitespace {
                    text,
                    boundary: Some(IndentBoundary {
                        run: index,
                        offset: 0,
                    }),
                };
            }
            RunKind::Text => {
                for (offset, c) in run.text.char_indices() {
                    if !width::is_indent_whitespace(c) {
                        return LeadingWhitespace {
                            text,
                            boundary: Some(IndentBoundary { run: index, offset }),
                        };
                    }
                    text.push(c);
                }
            }
        }
    }
    LeadingWhitespace {
        text,
        boundary: None,
    }
}

/// Why a paragraph is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The role is not configured for indentation
    ExcludedRole(Role),
    /// The leading whitespace is already canonical
    AlreadyCanonical,
}

/// Required change to a paragraph's leading whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Leave the paragraph unchanged
    Skip(SkipReason),
    /// Add an indent where there is none
    Insert,
    /// Replace existing leading whitespace with the indent
    Replace,
    /// Remove all leading whitespace
    Strip,
}

/// A derived, minimal description of the edit for one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditPlan {
    /// What to do
    pub action: PlanAction,
    /// Number of fullwidth spaces the paragraph should start with
    pub target_width: usize,
}

impl EditPlan {
    /// Check if the plan leaves the paragraph unchanged.
    pub fn is_noop(&self) -> bool {
        matches!(self.action, PlanAction::Skip(_))
    }

    /// The indent text the paragraph should start with.
    pub fn indent_text(&self) -> String {
        width::fullwidth_indent(self.target_width)
    }

    fn skip(reason: SkipReason, target_width: usize) -> Self {
        Self {
            action: PlanAction::Skip(reason),
            target_width,
        }
    }
}

/// Compute the edit plan for a paragraph. Always yields a valid plan.
pub fn plan(role: Role, leading: &LeadingWhitespace, options: &IndentOptions) -> EditPlan {
    let target_width = options.target_width;

    if !options.roles_to_indent.contains(role) {
        return EditPlan::skip(SkipReason::ExcludedRole(role), target_width);
    }
    if leading.is_canonical(target_width) {
        return EditPlan::skip(SkipReason::AlreadyCanonical, target_width);
    }

    let action = if target_width == 0 {
        PlanAction::Strip
    } else if leading.is_empty() {
        PlanAction::Insert
    } else {
        PlanAction::Replace
    };
    EditPlan {
        action,
        target_width,
    }
}
