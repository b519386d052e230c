//! Plain text (`.txt`) container.
//!
//! Every line is one paragraph holding a single neutral run. Encoding and
//! per-line endings are detected on load and reproduced on save.

use super::{ContainerFormat, LoadedContainer};
use crate::error::{Error, Result};
use crate::model::{Block, Document, Paragraph};
use encoding_rs::{Encoding, GB18030, UTF_16BE, UTF_16LE, UTF_8};
use std::fmt;

/// Text encoding of a loaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with or without a byte order mark
    Utf8 {
        /// Whether the file started with a BOM
        bom: bool,
    },
    /// UTF-16 little endian with BOM
    Utf16Le,
    /// UTF-16 big endian with BOM
    Utf16Be,
    /// UTF-32 little endian with BOM
    Utf32Le,
    /// UTF-32 big endian with BOM
    Utf32Be,
    /// GB18030 (covers GBK and GB2312)
    Gb18030,
}

impl TextEncoding {
    /// Detect the encoding and decode.
    ///
    /// Order: byte order mark, strict UTF-8, then GB18030. UTF-32 marks
    /// are checked first since `FF FE 00 00` also starts like UTF-16LE.
    pub fn decode(bytes: &[u8]) -> Result<(Self, String)> {
        if let Some(rest) = bytes.strip_prefix(UTF32_LE_BOM) {
            return Ok((TextEncoding::Utf32Le, decode_utf32(rest, u32::from_le_bytes)?));
        }
        if let Some(rest) = bytes.strip_prefix(UTF32_BE_BOM) {
            return Ok((TextEncoding::Utf32Be, decode_utf32(rest, u32::from_be_bytes)?));
        }

        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let detected = if encoding == UTF_8 {
                TextEncoding::Utf8 { bom: true }
            } else if encoding == UTF_16LE {
                TextEncoding::Utf16Le
            } else {
                TextEncoding::Utf16Be
            };
            let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            if had_errors {
                return Err(Error::Encoding(format!("invalid {} sequence", encoding.name())));
            }
            return Ok((detected, text.into_owned()));
        }

        if let Ok(text) = std::str::from_utf8(bytes) {
            return Ok((TextEncoding::Utf8 { bom: false }, text.to_string()));
        }

        let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(Error::Encoding("neither UTF-8 nor GB18030".into()));
        }
        log::debug!("Decoded text as GB18030");
        Ok((TextEncoding::Gb18030, text.into_owned()))
    }

    /// Encode text, including the BOM when the source had one.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 { bom } => {
                let mut out = Vec::with_capacity(text.len() + 3);
                if *bom {
                    out.extend_from_slice(b"\xEF\xBB\xBF");
                }
                out.extend_from_slice(text.as_bytes());
                out
            }
            // encoding_rs only decodes UTF-16, so encode by hand
            TextEncoding::Utf16Le => {
                let mut out = vec![0xFF, 0xFE];
                out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                out
            }
            TextEncoding::Utf16Be => {
                let mut out = vec![0xFE, 0xFF];
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                out
            }
            TextEncoding::Utf32Le => {
                let mut out = UTF32_LE_BOM.to_vec();
                out.extend(text.chars().flat_map(|c| u32::from(c).to_le_bytes()));
                out
            }
            TextEncoding::Utf32Be => {
                let mut out = UTF32_BE_BOM.to_vec();
                out.extend(text.chars().flat_map(|c| u32::from(c).to_be_bytes()));
                out
            }
            TextEncoding::Gb18030 => GB18030.encode(text).0.into_owned(),
        }
    }
}

const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> Result<String> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Encoding("truncated UTF-32 sequence".into()));
    }
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let value = unit([chunk[0], chunk[1], chunk[2], chunk[3]]);
            char::from_u32(value)
                .ok_or_else(|| Error::Encoding(format!("invalid UTF-32 code point {:#x}", value)))
        })
        .collect()
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 { bom: false } => write!(f, "UTF-8"),
            TextEncoding::Utf8 { bom: true } => write!(f, "UTF-8 (BOM)"),
            TextEncoding::Utf16Le => write!(f, "UTF-16LE"),
            TextEncoding::Utf16Be => write!(f, "UTF-16BE"),
            TextEncoding::Utf32Le => write!(f, "UTF-32LE"),
            TextEncoding::Utf32Be => write!(f, "UTF-32BE"),
            TextEncoding::Gb18030 => write!(f, "GB18030"),
        }
    }
}

/// Line terminator of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\r\n`
    CrLf,
    /// `\n`
    Lf,
    /// `\r`
    Cr,
    /// Last line without terminator
    None,
}

impl LineEnding {
    /// The terminator text.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::None => "",
        }
    }
}

/// Split text into lines, keeping each line's terminator.
fn split_lines(text: &str) -> Vec<(&str, LineEnding)> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                let (ending, len) = match rest[pos..].as_bytes() {
                    [b'\r', b'\n', ..] => (LineEnding::CrLf, 2),
                    [b'\r', ..] => (LineEnding::Cr, 1),
                    _ => (LineEnding::Lf, 1),
                };
                lines.push((&rest[..pos], ending));
                rest = &rest[pos + len..];
            }
            None => {
                lines.push((rest, LineEnding::None));
                break;
            }
        }
    }
    lines
}

/// Format handler for plain text files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl TextFormat {
    /// Create a new handler.
    pub fn new() -> Self {
        Self
    }
}

impl ContainerFormat for TextFormat {
    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn name(&self) -> &str {
        "txt"
    }

    fn load(&self, bytes: &[u8]) -> Result<Box<dyn LoadedContainer>> {
        Ok(Box::new(TextContainer::from_bytes(bytes)?))
    }
}

/// A loaded text file.
#[derive(Debug, Clone)]
pub struct TextContainer {
    document: Document,
    endings: Vec<LineEnding>,
    encoding: TextEncoding,
}

impl TextContainer {
    /// Load from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (encoding, text) = TextEncoding::decode(bytes).map_err(Error::load)?;
        let lines = split_lines(&text);

        let endings = lines.iter().map(|(_, ending)| *ending).collect();
        let document = Document::from_paragraphs(lines.iter().map(|(line, _)| Paragraph::with_text(*line)));

        log::debug!("Loaded text: {} lines, {}", document.paragraph_count(), encoding);
        Ok(Self {
            document,
            endings,
            encoding,
        })
    }

    /// Detected encoding.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Serialize with the original encoding and line endings.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.document.body.len() != self.endings.len() {
            return Err(Error::Other("line count changed since load".into()));
        }

        let mut text = String::new();
        for (block, ending) in self.document.body.iter().zip(&self.endings) {
            match block {
                Block::Paragraph(p) => {
                    for run in &p.runs {
                        text.push_str(&run.text);
                    }
                }
                _ => return Err(Error::Other("text documents hold paragraphs only".into())),
            }
            text.push_str(ending.as_str());
        }
        Ok(self.encoding.encode(&text))
    }
}

impl LoadedContainer for TextContainer {
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
