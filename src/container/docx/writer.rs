//! Writing parts and packages back out.

use super::reader::{ParagraphLayout, PartLayout, RunMarkup, Segment, Shell};
use crate::error::{Error, Result};
use crate::model::{Paragraph, Run, RunKind};
use quick_xml::escape::escape;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Rebuild a part's XML from its layout and the (possibly edited)
/// paragraphs, which must be given in document order.
pub(crate) fn write_part(layout: &PartLayout, paragraphs: &[&Paragraph]) -> Result<String> {
    let xml = layout.xml.as_str();
    let mut out = String::with_capacity(xml.len() + 64);
    let mut paragraphs = paragraphs.iter();

    for segment in &layout.segments {
        match segment {
            Segment::Raw(range) => out.push_str(&xml[range.clone()]),
            Segment::Paragraph(p) => {
                let paragraph = paragraphs.next().ok_or_else(|| {
                    Error::Other(format!("{}: fewer paragraphs than when loaded", layout.name))
                })?;
                write_paragraph(&mut out, xml, p, paragraph);
            }
        }
    }

    if paragraphs.next().is_some() {
        return Err(Error::Other(format!(
            "{}: more paragraphs than when loaded",
            layout.name
        )));
    }
    Ok(out)
}

fn write_paragraph(out: &mut String, xml: &str, layout: &ParagraphLayout, paragraph: &Paragraph) {
    if layout.self_closing {
        // Only ever holds an empty paragraph; nothing to rebuild.
        out.push_str(&xml[layout.head.clone()]);
        return;
    }
    out.push_str(&xml[layout.head.clone()]);
    let mut open = Vec::new();
    for run in &paragraph.runs {
        write_run(out, &mut open, run, &layout.prefix);
    }
    enter(out, &mut open, &[]);
    out.push_str(&xml[layout.tail.clone()]);
}

/// Close and open enclosing elements so that exactly `path` is open.
///
/// Consecutive pieces of one element share it, so an untouched paragraph
/// is reproduced byte for byte.
fn enter(out: &mut String, open: &mut Vec<Arc<Shell>>, path: &[Arc<Shell>]) {
    let common = open
        .iter()
        .zip(path)
        .take_while(|(a, b)| Arc::ptr_eq(*a, *b))
        .count();
    while open.len() > common {
        if let Some(shell) = open.pop() {
            out.push_str(&shell.close);
        }
    }
    for shell in &path[common..] {
        out.push_str(&shell.open);
        open.push(Arc::clone(shell));
    }
}

fn write_run(out: &mut String, open: &mut Vec<Arc<Shell>>, run: &Run, paragraph_prefix: &str) {
    let markup = run.format.downcast_ref::<RunMarkup>();
    match (run.kind, markup) {
        (RunKind::Marker | RunKind::Object, Some(RunMarkup::Verbatim { path, raw })) => {
            enter(out, open, path);
            out.push_str(raw);
        }
        (RunKind::Marker | RunKind::Object, _) => {}
        (RunKind::Text, Some(RunMarkup::Text { path, body, text, .. })) if *text == run.text => {
            enter(out, open, path);
            out.push_str(body);
        }
        (
            RunKind::Text,
            Some(RunMarkup::Text {
                path,
                open_tag,
                properties,
                prefix,
                ..
            }),
        ) => {
            // Regenerated as a run of its own inside the same wrappers.
            enter(out, open, &path[..path.len().saturating_sub(1)]);
            out.push_str(open_tag);
            out.push_str(properties);
            push_run_content(out, &run.text, prefix);
            out.push_str(&format!("</{}r>", prefix));
        }
        (RunKind::Text, _) => {
            enter(out, open, &[]);
            out.push_str(&format!("<{}r>", paragraph_prefix));
            push_run_content(out, &run.text, paragraph_prefix);
            out.push_str(&format!("</{}r>", paragraph_prefix));
        }
    }
}

/// Emit `w:t` and `w:tab` children for a run's text.
fn push_run_content(out: &mut String, text: &str, prefix: &str) {
    for (i, chunk) in text.split('\t').enumerate() {
        if i > 0 {
            out.push_str(&format!("<{}tab/>", prefix));
        }
        if !chunk.is_empty() {
            out.push_str(&format!(
                "<{p}t xml:space=\"preserve\">{}</{p}t>",
                escape(chunk),
                p = prefix
            ));
        }
    }
}

/// Copy a package, replacing the named parts.
///
/// Untouched entries are copied raw, keeping their original compression.
pub(crate) fn write_package(original: &[u8], replaced: &HashMap<String, String>) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(original))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(original.len())));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        match replaced.get(file.name()) {
            Some(xml) => {
                let name = file.name().to_string();
                drop(file);
                writer.start_file(name, options)?;
                writer.write_all(xml.as_bytes())?;
            }
            None => writer.raw_copy_file(file)?,
        }
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::docx::reader::parse_part;
    use crate::container::docx::styles::StyleSheet;
    use crate::indent::{normalize, IndentOptions};
    use crate::model::{collect_paragraphs, Document};

    fn roundtrip(body: &str, options: Option<&IndentOptions>) -> String {
        let xml = format!(r#"<w:document xmlns:w="urn:w"><w:body>{}</w:body></w:document>"#, body);
        let (layout, blocks) = parse_part("word/document.xml", xml, &StyleSheet::default()).unwrap();
        let mut doc = Document::new();
        doc.body = blocks;
        if let Some(options) = options {
            normalize(&mut doc, options);
        }
        let mut paragraphs = Vec::new();
        collect_paragraphs(&doc.body, &mut paragraphs);
        write_part(&layout, &paragraphs).unwrap()
    }

    #[test]
    fn test_untouched_part_is_identical() {
        let body = r#"<w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:bookmarkStart w:id="0"/><w:r><w:rPr><w:b/></w:rPr><w:t>Hi</w:t></w:r><w:r><w:drawing/></w:r></w:p>
<w:p><w:ins w:id="3"> <w:r><w:t>a</w:t> <w:br/><w:t>b</w:t> </w:r></w:ins><w:smartTag w:element="x"><w:smartTagPr/><w:r><w:tab/></w:r></w:smartTag></w:p>
<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl><w:sectPr/>"#;
        let xml = format!(r#"<w:document xmlns:w="urn:w"><w:body>{}</w:body></w:document>"#, body);
        assert_eq!(roundtrip(body, None), xml);
    }

    #[test]
    fn test_split_run_keeps_properties() {
        let out = roundtrip(
            r#"<w:p><w:r w:rsidR="00AB"><w:rPr><w:i/></w:rPr><w:tab/><w:t>Hello &amp; bye</w:t></w:r></w:p>"#,
            Some(&IndentOptions::default()),
        );
        assert!(out.contains(
            r#"<w:r w:rsidR="00AB"><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">　　</w:t></w:r><w:r w:rsidR="00AB"><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">Hello &amp; bye</w:t></w:r>"#
        ));
    }

    #[test]
    fn test_inserted_run_copies_content_properties() {
        let out = roundtrip(
            r#"<w:p><w:bookmarkStart w:id="1"/><w:r><w:rPr><w:sz w:val="28"/></w:rPr><w:t>Body</w:t></w:r></w:p>"#,
            Some(&IndentOptions::default()),
        );
        assert!(out.contains(
            r#"<w:bookmarkStart w:id="1"/><w:r><w:rPr><w:sz w:val="28"/></w:rPr><w:t xml:space="preserve">　　</w:t></w:r><w:r><w:rPr><w:sz w:val="28"/></w:rPr><w:t>Body</w:t></w:r>"#
        ));
    }

    #[test]
    fn test_mixed_run_keeps_break() {
        let out = roundtrip(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">  Hello</w:t><w:br/><w:t>World</w:t></w:r></w:p>"#,
            Some(&IndentOptions::default()),
        );
        assert!(out.contains(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">　　</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Hello</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:br/><w:t>World</w:t></w:r></w:p>"#
        ));
    }

    #[test]
    fn test_indent_stays_inside_insertion() {
        let out = roundtrip(
            r#"<w:p><w:ins w:id="1"><w:r><w:t>Tracked</w:t></w:r></w:ins></w:p>"#,
            Some(&IndentOptions::default()),
        );
        assert!(out.contains(
            r#"<w:p><w:ins w:id="1"><w:r><w:t xml:space="preserve">　　</w:t></w:r><w:r><w:t>Tracked</w:t></w:r></w:ins></w:p>"#
        ));
    }

    #[test]
    fn test_enter_reuses_common_prefix() {
        let outer = Arc::new(Shell {
            open: "<a>".into(),
            close: "</a>".into(),
        });
        let first = Arc::new(Shell {
            open: "<b>".into(),
            close: "</b>".into(),
        });
        let second = Arc::new(Shell {
            open: "<c>".into(),
            close: "</c>".into(),
        });
        let mut out = String::new();
        let mut open = Vec::new();
        enter(&mut out, &mut open, &[outer.clone(), first]);
        enter(&mut out, &mut open, &[outer.clone(), second]);
        enter(&mut out, &mut open, &[]);
        assert_eq!(out, "<a><b></b><c></c></a>");
        assert!(open.is_empty());
    }

    #[test]
    fn test_picture_only_paragraph_untouched() {
        let out = roundtrip(
            r#"<w:p><w:r><w:drawing/></w:r></w:p>"#,
            Some(&IndentOptions::default()),
        );
        assert!(out.contains("<w:p><w:r><w:drawing/></w:r></w:p>"));
    }

    #[test]
    fn test_neutral_text_run_uses_paragraph_prefix() {
        let mut out = String::new();
        write_run(&mut out, &mut Vec::new(), &Run::plain("\u{3000}"), "w:");
        assert_eq!(out, "<w:r><w:t xml:space=\"preserve\">\u{3000}</w:t></w:r>");
    }

    #[test]
    fn test_paragraph_count_mismatch_is_error() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body><w:p/></w:body></w:document>"#.to_string();
        let (layout, _) = parse_part("word/document.xml", xml, &StyleSheet::default()).unwrap();
        assert!(write_part(&layout, &[]).is_err());
    }

    #[test]
    fn test_run_content_tabs() {
        let mut out = String::new();
        push_run_content(&mut out, "a\tb<", "w:");
        assert_eq!(
            out,
            r#"<w:t xml:space="preserve">a</w:t><w:tab/><w:t xml:space="preserve">b&lt;</w:t>"#
        );
    }
}
