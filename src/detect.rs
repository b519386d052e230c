//! Container detection from file signatures.

/// Zip local file header: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// Empty zip archive (end of central directory only)
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
/// OLE compound file, used by legacy .doc
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Kind of container found at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Zip package (docx and other OOXML formats)
    Zip,
    /// OLE compound file (legacy Word .doc)
    OleCompound,
    /// Anything else; possibly plain text
    Unknown,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Zip => write!(f, "zip package"),
            ContainerKind::OleCompound => write!(f, "OLE compound file"),
            ContainerKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Detect the container kind from the leading bytes.
///
/// # Example
/// ```
/// use indentor::detect::{detect_container, ContainerKind};
///
/// assert_eq!(detect_container(b"PK\x03\x04rest"), ContainerKind::Zip);
/// assert_eq!(detect_container(b"hello"), ContainerKind::Unknown);
/// ```
pub fn detect_container(data: &[u8]) -> ContainerKind {
    if data.starts_with(ZIP_MAGIC) || data.starts_with(ZIP_EMPTY_MAGIC) {
        ContainerKind::Zip
    } else if data.starts_with(OLE_MAGIC) {
        ContainerKind::OleCompound
    } else {
        ContainerKind::Unknown
    }
}
