//! Indentation normalization engine.
//!
//! The engine is a pure, synchronous transformation over a [`Document`]:
//!
//! - [`width`] classifies characters (fullwidth space, space, tab, other);
//! - [`role`] assigns each paragraph a structural role;
//! - [`plan`] finds the leading whitespace and decides the edit;
//! - [`splice`] applies the edit to the paragraph's runs;
//! - [`walker`] drives all of the above over a document and reports.
//!
//! # Example
//!
//! ```
//! use indentor::indent::{normalize, IndentOptions};
//! use indentor::model::{Document, Paragraph};
//!
//! let mut doc = Document::from_paragraphs([Paragraph::with_text("\tHello world")]);
//! let report = normalize(&mut doc, &IndentOptions::default());
//!
//! assert_eq!(report.touched, 1);
//! assert_eq!(doc.plain_text(), "\u{3000}\u{3000}Hello world");
//! ```
//!
//! [`Document`]: crate::model::Document

mod options;
pub mod plan;
mod report;
pub mod role;
pub mod splice;
pub mod walker;
pub mod width;

pub use options::{IndentOptions, RoleSet, DEFAULT_TARGET_WIDTH};
pub use plan::{leading_whitespace, EditPlan, IndentBoundary, LeadingWhitespace, PlanAction, SkipReason};
pub use report::{ParagraphFailure, ParagraphLocation, Report, RoleCounts, StoryRef};
pub use role::{Role, StyleRules};
pub use walker::normalize;
pub use width::{CharWidth, FULLWIDTH_SPACE};
