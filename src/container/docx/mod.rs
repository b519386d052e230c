//! Word (`.docx`) container.
//!
//! The package is read with `zip`, and the body, header and footer parts
//! are parsed with `quick-xml`. On save only parts whose XML changed are
//! recompressed; every other entry is copied byte for byte.

mod reader;
mod styles;
mod writer;

use super::{ContainerFormat, LoadedContainer};
use crate::detect::{detect_container, ContainerKind};
use crate::error::{Error, Result};
use crate::model::{Document, Story, StoryKind};
use reader::{parse_part, PartLayout};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use styles::StyleSheet;
use zip::result::ZipError;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Format handler for Office Open XML word-processing documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxFormat;

impl DocxFormat {
    /// Create a new handler.
    pub fn new() -> Self {
        Self
    }
}

impl ContainerFormat for DocxFormat {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn load(&self, bytes: &[u8]) -> Result<Box<dyn LoadedContainer>> {
        Ok(Box::new(DocxContainer::from_bytes(bytes)?))
    }
}

/// A loaded `.docx` package.
#[derive(Debug)]
pub struct DocxContainer {
    package: Vec<u8>,
    document: Document,
    body: PartLayout,
    stories: Vec<PartLayout>,
}

impl DocxContainer {
    /// Load a package from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match detect_container(bytes) {
            ContainerKind::OleCompound => {
                return Err(Error::UnsupportedFormat(
                    "legacy binary Word document; save it as .docx first".into(),
                ))
            }
            ContainerKind::Zip => {}
            _ => return Err(Error::load("not a zip package")),
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(Error::load)?;

        let styles = match read_entry(&mut archive, STYLES_PART)? {
            Some(xml) => StyleSheet::parse(&xml).map_err(|e| part_error(STYLES_PART, e))?,
            None => StyleSheet::default(),
        };

        let body_xml = read_entry(&mut archive, DOCUMENT_PART)?.ok_or_else(|| {
            Error::UnsupportedFormat(format!("zip package without {}", DOCUMENT_PART))
        })?;
        let (body, blocks) =
            parse_part(DOCUMENT_PART, body_xml, &styles).map_err(|e| part_error(DOCUMENT_PART, e))?;

        let mut document = Document::new();
        document.body = blocks;

        let mut stories = Vec::new();
        for (name, kind) in story_parts(&archive) {
            let Some(xml) = read_entry(&mut archive, &name)? else {
                continue;
            };
            let (layout, blocks) =
                parse_part(&name, xml, &styles).map_err(|e| part_error(&name, e))?;
            let mut story = Story::new(kind, name);
            story.blocks = blocks;
            document.add_story(story);
            stories.push(layout);
        }

        log::debug!(
            "Loaded docx: {} body paragraphs, {} headers/footers",
            document.paragraph_count(),
            stories.len()
        );

        Ok(Self {
            package: bytes.to_vec(),
            document,
            body,
            stories,
        })
    }

    /// Serialize the package with the current document content.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut replaced = HashMap::new();

        let xml = writer::write_part(&self.body, &self.document.paragraphs())?;
        if xml != self.body.xml {
            replaced.insert(self.body.name.clone(), xml);
        }

        if self.stories.len() != self.document.headers_footers.len() {
            return Err(Error::Other("header/footer list changed since load".into()));
        }
        for (layout, story) in self.stories.iter().zip(&self.document.headers_footers) {
            let xml = writer::write_part(layout, &story.paragraphs())?;
            if xml != layout.xml {
                replaced.insert(layout.name.clone(), xml);
            }
        }

        if replaced.is_empty() {
            return Ok(self.package.clone());
        }
        log::debug!("Rewriting {} part(s)", replaced.len());
        writer::write_package(&self.package, &replaced)
    }
}

impl LoadedContainer for DocxContainer {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn save(&self) -> Result<Vec<u8>> {
        self.to_bytes()
    }
}

fn part_error(part: &str, err: Error) -> Error {
    Error::load(format!("{}: {}", part, err))
}

/// Read a zip entry as UTF-8 text, `None` if absent.
fn read_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(Error::load(format!("{}: {}", name, e))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::load(format!("{}: {}", name, e)))?;
    Ok(Some(content))
}

/// Header and footer parts, ordered by kind then number.
fn story_parts<R: Read + std::io::Seek>(archive: &ZipArchive<R>) -> Vec<(String, StoryKind)> {
    let mut parts: Vec<(String, StoryKind)> = archive
        .file_names()
        .filter_map(|name| {
            let kind = story_kind(name)?;
            Some((name.to_string(), kind))
        })
        .collect();
    parts.sort_by(|(a, ka), (b, kb)| {
        let rank = |k: &StoryKind| matches!(k, StoryKind::Footer);
        (rank(ka), a.len(), a).cmp(&(rank(kb), b.len(), b))
    });
    parts
}

fn story_kind(name: &str) -> Option<StoryKind> {
    let file = name.strip_prefix("word/")?.strip_suffix(".xml")?;
    let (kind, number) = if let Some(n) = file.strip_prefix("header") {
        (StoryKind::Header, n)
    } else if let Some(n) = file.strip_prefix("footer") {
        (StoryKind::Footer, n)
    } else {
        return None;
    };
    number.chars().all(|c| c.is_ascii_digit()).then_some(kind)
}
