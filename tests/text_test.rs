//! Integration tests for the plain text container.

use encoding_rs::GB18030;
use indentor::container::{LoadedContainer, TextContainer, TextEncoding};
use indentor::{normalize, normalize_bytes, IndentOptions};

fn run(bytes: &[u8]) -> Vec<u8> {
    normalize_bytes(bytes, "txt", &IndentOptions::default()).unwrap().0
}

#[test]
fn test_lines_become_paragraphs() {
    let container = TextContainer::from_bytes("第一段\n  第二段\n\n\t第三段".as_bytes()).unwrap();
    let texts: Vec<String> = container.document().paragraphs().iter().map(|p| p.text()).collect();
    assert_eq!(texts, vec!["第一段", "  第二段", "", "\t第三段"]);
}

#[test]
fn test_line_endings_preserved() {
    let out = run(b"a\r\n b\n\tc\rd");
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\u{3000}\u{3000}a\r\n\u{3000}\u{3000}b\n\u{3000}\u{3000}c\r\u{3000}\u{3000}d"
    );
}

#[test]
fn test_blank_lines_untouched() {
    let out = run("  \n\u{3000}\n正文\n".as_bytes());
    assert_eq!(String::from_utf8(out).unwrap(), "  \n\u{3000}\n\u{3000}\u{3000}正文\n");
}

#[test]
fn test_utf8_bom_kept() {
    let mut input = b"\xEF\xBB\xBF".to_vec();
    input.extend_from_slice("段落".as_bytes());
    let out = run(&input);
    assert!(out.starts_with(b"\xEF\xBB\xBF"));
    assert_eq!(std::str::from_utf8(&out[3..]).unwrap(), "\u{3000}\u{3000}段落");
}

#[test]
fn test_utf16_roundtrip() {
    let mut input = vec![0xFF, 0xFE];
    for unit in "\t中文\r\n".encode_utf16() {
        input.extend_from_slice(&unit.to_le_bytes());
    }
    let out = run(&input);

    let container = TextContainer::from_bytes(&out).unwrap();
    assert_eq!(container.encoding(), TextEncoding::Utf16Le);
    assert_eq!(container.document().paragraphs()[0].text(), "\u{3000}\u{3000}中文");
    assert!(out.ends_with(&[b'\r', 0, b'\n', 0]));
}

#[test]
fn test_gb18030_roundtrip() {
    let input = GB18030.encode("    旧式缩进的段落\r\n第二段").0.into_owned();
    let out = run(&input);
    let (decoded, _, had_errors) = GB18030.decode(&out);
    assert!(!had_errors);
    assert_eq!(decoded, "\u{3000}\u{3000}旧式缩进的段落\r\n\u{3000}\u{3000}第二段");
}

#[test]
fn test_idempotent_on_text() {
    let once = run("  a\n\tb\n".as_bytes());
    let twice = run(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_deindent_text() {
    let (out, report) =
        normalize_bytes("\u{3000}\u{3000}a\n  b\nc".as_bytes(), "txt", &IndentOptions::default().deindent()).unwrap();
    assert_eq!(report.touched, 2);
    assert_eq!(String::from_utf8(out).unwrap(), "a\nb\nc");
}

#[test]
fn test_empty_file() {
    let mut container = TextContainer::from_bytes(b"").unwrap();
    let report = normalize(container.document_mut(), &IndentOptions::default());
    assert_eq!(report.paragraphs, 0);
    assert!(container.save().unwrap().is_empty());
}

#[test]
fn test_undecodable_bytes_fail_to_load() {
    // 0xFF is never valid in UTF-8 or as a GB18030 lead byte
    let err = TextContainer::from_bytes(&[0x61, 0xFF, 0x62]).unwrap_err();
    assert!(matches!(err, indentor::Error::ContainerLoad { .. }));
}

#[test]
fn test_utf32_le_not_mistaken_for_utf16() {
    let mut input = vec![0xFF, 0xFE, 0x00, 0x00];
    for c in "\t中文\n".chars() {
        input.extend_from_slice(&u32::from(c).to_le_bytes());
    }
    let container = TextContainer::from_bytes(&input).unwrap();
    assert_eq!(container.encoding(), TextEncoding::Utf32Le);
    assert_eq!(container.document().paragraphs()[0].text(), "\t中文");

    let out = run(&input);
    assert!(out.starts_with(&[0xFF, 0xFE, 0x00, 0x00]));
    assert_eq!(&out[4..8], &0x3000u32.to_le_bytes());
    let container = TextContainer::from_bytes(&out).unwrap();
    assert_eq!(container.document().paragraphs()[0].text(), "\u{3000}\u{3000}中文");
}

#[test]
fn test_truncated_utf32_fails_to_load() {
    let err = TextContainer::from_bytes(&[0x00, 0x00, 0xFE, 0xFF, 0x00, 0x4E]).unwrap_err();
    assert!(matches!(err, indentor::Error::ContainerLoad { .. }));
}
