//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Builder for minimal .docx packages.
pub struct DocxBuilder {
    body: String,
    styles: Option<String>,
    parts: Vec<(String, String)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            styles: None,
            parts: Vec::new(),
        }
    }

    /// Append raw body XML.
    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Append a paragraph with one plain run.
    pub fn paragraph(self, text: &str) -> Self {
        let xml = format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            text
        );
        self.body(&xml)
    }

    /// Append a paragraph with a paragraph style.
    pub fn styled(self, style_id: &str, text: &str) -> Self {
        let xml = format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            style_id, text
        );
        self.body(&xml)
    }

    /// Provide word/styles.xml content (inside <w:styles>).
    pub fn styles(mut self, xml: &str) -> Self {
        self.styles = Some(xml.to_string());
        self
    }

    /// Add a header part with one paragraph.
    pub fn header(mut self, name: &str, text: &str) -> Self {
        self.parts.push((
            format!("word/{}.xml", name),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:hdr xmlns:w="{}"><w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:hdr>"#,
                W_NS, text
            ),
        ));
        self
    }

    /// Add a footer part with one paragraph.
    pub fn footer(mut self, name: &str, text: &str) -> Self {
        self.parts.push((
            format!("word/{}.xml", name),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:ftr xmlns:w="{}"><w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:ftr>"#,
                W_NS, text
            ),
        ));
        self
    }

    /// Add an arbitrary entry.
    pub fn entry(mut self, name: &str, content: &str) -> Self {
        self.parts.push((name.to_string(), content.to_string()));
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            W_NS, self.body
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.start_file("[Content_Types].xml", options).unwrap();
        writer
            .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();

        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(self.document_xml().as_bytes()).unwrap();

        if let Some(styles) = &self.styles {
            writer.start_file("word/styles.xml", options).unwrap();
            writer
                .write_all(
                    format!(r#"<?xml version="1.0"?><w:styles xmlns:w="{}">{}</w:styles>"#, W_NS, styles)
                        .as_bytes(),
                )
                .unwrap();
        }

        for (name, content) in &self.parts {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }
}

/// Read a zip entry as text.
pub fn read_entry(package: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

/// Read a zip entry as bytes.
pub fn read_entry_bytes(package: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    file.read_to_end(&mut content).unwrap();
    content
}

/// Entry names in archive order.
pub fn entry_names(package: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    archive.file_names().map(str::to_string).collect()
}
