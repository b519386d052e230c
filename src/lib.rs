//! # indentor
//!
//! First-line indentation normalizer for CJK documents.
//!
//! Rewrites the leading whitespace of body paragraphs to a canonical run of
//! fullwidth spaces (U+3000), leaving headings, list items and empty lines
//! alone and preserving every run's formatting.
//!
//! ## Quick Start
//!
//! ```no_run
//! use indentor::normalize_file;
//!
//! fn main() -> indentor::Result<()> {
//!     let report = normalize_file("essay.docx", "essay_indent.docx")?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Minimal edits**: only leading whitespace changes; run formatting survives splits
//! - **Role aware**: headings, list items, captions, quotes and code follow configurable rules
//! - **Containers**: `.docx` (body, tables, content controls, headers, footers) and `.txt`
//! - **Encoding preserving**: UTF-8, UTF-16 and GB18030 text round-trips unchanged
//! - **Batch mode**: parallel processing with Rayon and conflict-free output names
//! - **Idempotent**: a second pass changes nothing

pub mod batch;
pub mod container;
pub mod detect;
pub mod error;
pub mod indent;
pub mod model;

// Re-export commonly used types
pub use batch::{
    process_document, resolve_output_path, run_batch, BatchEvent, BatchOptions, BatchReport,
    BatchSummary, DocumentOutcome,
};
pub use container::{
    ContainerFormat, DocxContainer, DocxFormat, FormatRegistry, LoadedContainer, TextContainer,
    TextEncoding, TextFormat,
};
pub use detect::{detect_container, ContainerKind};
pub use error::{Error, ParagraphStructureError, Result};
pub use indent::{normalize, IndentOptions, Report, Role, RoleSet, StyleRules, FULLWIDTH_SPACE};
pub use model::{
    Block, Document, FormatToken, Frame, ListInfo, Paragraph, ParagraphStyle, Run, RunKind,
    Story, StoryKind, Table, TableCell, TableRow,
};

use std::path::Path;

/// Normalize a file with default options and write the result.
///
/// The format is chosen by the source's extension.
///
/// # Example
///
/// ```no_run
/// use indentor::normalize_file;
///
/// let report = normalize_file("notes.txt", "notes_indent.txt").unwrap();
/// println!("{} paragraphs changed", report.touched);
/// ```
pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<Report> {
    Indentor::new().normalize_file(source, destination)
}

/// Normalize a file with custom options and write the result.
pub fn normalize_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    options: &IndentOptions,
) -> Result<Report> {
    let registry = FormatRegistry::with_defaults();
    process_document(
        source.as_ref(),
        Some(destination.as_ref()),
        &registry,
        options,
    )
}

/// Normalize a container held in memory.
///
/// Returns the rewritten bytes and the report.
///
/// # Example
///
/// ```
/// use indentor::{normalize_bytes, IndentOptions};
///
/// let (bytes, report) = normalize_bytes(b"\tfirst\nsecond\n", "txt", &IndentOptions::default()).unwrap();
/// assert_eq!(report.touched, 2);
/// assert_eq!(String::from_utf8(bytes).unwrap(), "\u{3000}\u{3000}first\n\u{3000}\u{3000}second\n");
/// ```
pub fn normalize_bytes(data: &[u8], ext: &str, options: &IndentOptions) -> Result<(Vec<u8>, Report)> {
    let registry = FormatRegistry::with_defaults();
    let mut container = registry.load_bytes(data, ext)?;
    let report = normalize(container.document_mut(), options);
    Ok((container.save()?, report))
}

/// Run the engine on a file without writing anything.
///
/// The report describes the edits a real run would make.
pub fn inspect_file<P: AsRef<Path>>(path: P, options: &IndentOptions) -> Result<Report> {
    let registry = FormatRegistry::with_defaults();
    process_document(path.as_ref(), None, &registry, options)
}

/// Builder for normalizing documents.
///
/// # Example
///
/// ```no_run
/// use indentor::Indentor;
///
/// let report = Indentor::new()
///     .with_width(2)
///     .with_headers_footers()
///     .normalize_file("essay.docx", "out/essay.docx")?;
/// # Ok::<(), indentor::Error>(())
/// ```
pub struct Indentor {
    options: IndentOptions,
    registry: FormatRegistry,
}

impl Indentor {
    /// Create a new builder with default options and formats.
    pub fn new() -> Self {
        Self {
            options: IndentOptions::default(),
            registry: FormatRegistry::with_defaults(),
        }
    }

    /// Set the indent width in fullwidth spaces.
    pub fn with_width(mut self, width: usize) -> Self {
        self.options = self.options.with_target_width(width);
        self
    }

    /// Remove first-line indentation instead of adding it.
    pub fn deindent(mut self) -> Self {
        self.options = self.options.deindent();
        self
    }

    /// Also process headers and footers.
    pub fn with_headers_footers(mut self) -> Self {
        self.options = self.options.with_headers_footers(true);
        self
    }

    /// Set which roles receive the indent.
    pub fn with_roles(mut self, roles: RoleSet) -> Self {
        self.options = self.options.with_roles(roles);
        self
    }

    /// Set style-name rules.
    pub fn with_style_rules(mut self, rules: StyleRules) -> Self {
        self.options = self.options.with_style_rules(rules);
        self
    }

    /// Replace the engine options.
    pub fn with_options(mut self, options: IndentOptions) -> Self {
        self.options = options;
        self
    }

    /// Register an additional container format.
    pub fn with_format(mut self, format: std::sync::Arc<dyn ContainerFormat>) -> Self {
        self.registry.register(format);
        self
    }

    /// Engine options in effect.
    pub fn options(&self) -> &IndentOptions {
        &self.options
    }

    /// Normalize a file and write the result.
    pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<Report> {
        process_document(
            source.as_ref(),
            Some(destination.as_ref()),
            &self.registry,
            &self.options,
        )
    }

    /// Normalize bytes of the given extension.
    pub fn normalize_bytes(&self, data: &[u8], ext: &str) -> Result<(Vec<u8>, Report)> {
        let mut container = self.registry.load_bytes(data, ext)?;
        let report = normalize(container.document_mut(), &self.options);
        Ok((container.save()?, report))
    }

    /// Normalize a document model in place.
    pub fn normalize_document(&self, document: &mut Document) -> Report {
        normalize(document, &self.options)
    }
}

impl Default for Indentor {
    fn default() -> Self {
        Self::new()
    }
}
