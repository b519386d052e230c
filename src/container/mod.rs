//! Document containers with a plugin architecture for multiple formats.
//!
//! A [`ContainerFormat`] turns bytes into a [`LoadedContainer`], which
//! exposes the document model for editing and serializes it back. The
//! [`FormatRegistry`] dispatches on file extension.
//!
//! # Example
//!
//! ```no_run
//! use indentor::container::FormatRegistry;
//! use indentor::indent::{normalize, IndentOptions};
//! use std::path::Path;
//!
//! fn main() -> indentor::Result<()> {
//!     let registry = FormatRegistry::with_defaults();
//!     let mut container = registry.load_path(Path::new("essay.docx"))?;
//!
//!     let report = normalize(container.document_mut(), &IndentOptions::default());
//!     println!("{}", report);
//!
//!     std::fs::write("essay_indent.docx", container.save()?)?;
//!     Ok(())
//! }
//! ```

mod docx;
mod text;

pub use docx::{DocxContainer, DocxFormat};
pub use text::{LineEnding, TextContainer, TextEncoding, TextFormat};

use crate::error::{Error, Result};
use crate::model::Document;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for container formats.
///
/// Implement this trait to add support for a new document format.
pub trait ContainerFormat: Send + Sync {
    /// Get the supported file extensions for this format.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["docx"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this format.
    fn name(&self) -> &str;

    /// Load a container from bytes.
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn LoadedContainer>>;

    /// Check if this format handles the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// A document loaded from a container, ready to edit and save.
pub trait LoadedContainer: Send {
    /// The document model.
    fn document(&self) -> &Document;

    /// The document model, for editing.
    fn document_mut(&mut self) -> &mut Document;

    /// Serialize the container with the current document content.
    ///
    /// Everything outside the edited runs is reproduced as loaded.
    fn save(&self) -> Result<Vec<u8>>;
}

/// Registry for container formats.
///
/// Maps file extensions to formats.
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn ContainerFormat>>,
    by_name: HashMap<String, Arc<dyn ContainerFormat>>,
}

impl FormatRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in formats (docx, txt).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxFormat::new()));
        registry.register(Arc::new(TextFormat::new()));
        registry
    }

    /// Register a format for all its supported extensions.
    pub fn register(&mut self, format: Arc<dyn ContainerFormat>) {
        for ext in format.supported_extensions() {
            self.formats.insert(ext.to_lowercase(), format.clone());
        }
        self.by_name.insert(format.name().to_lowercase(), format);
    }

    /// Get a format by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn ContainerFormat>> {
        self.formats.get(&ext.to_lowercase()).cloned()
    }

    /// Get a format by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn ContainerFormat>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.formats.contains_key(&ext.to_lowercase())
    }

    /// Check if a path has a supported extension.
    pub fn supports_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.supports(ext))
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.formats.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Find the format for a path.
    pub fn format_for_path(&self, path: &Path) -> Result<Arc<dyn ContainerFormat>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no extension", path.display())))?;

        self.get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no format for extension: {}", ext)))
    }

    /// Load a file using the format matching its extension.
    ///
    /// An unreadable file is a load failure like an undecodable one.
    pub fn load_path(&self, path: &Path) -> Result<Box<dyn LoadedContainer>> {
        let format = self.format_for_path(path)?;
        let bytes =
            std::fs::read(path).map_err(|e| Error::load(format!("{}: {}", path.display(), e)))?;
        format.load(&bytes)
    }

    /// Load bytes using the format registered for `ext`.
    pub fn load_bytes(&self, bytes: &[u8], ext: &str) -> Result<Box<dyn LoadedContainer>> {
        let format = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no format for extension: {}", ext)))?;
        format.load(bytes)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
