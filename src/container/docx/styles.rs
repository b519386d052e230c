//! Paragraph style resolution from `word/styles.xml`.

use super::reader::attr;
use crate::error::Result;
use crate::model::ListInfo;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

/// Longest `basedOn` chain followed before giving up (cycle guard).
const MAX_INHERITANCE_DEPTH: usize = 16;

/// A paragraph style definition.
#[derive(Debug, Clone, Default)]
struct StyleDef {
    name: Option<String>,
    based_on: Option<String>,
    outline_level: Option<u8>,
    num_id: Option<String>,
    list_level: Option<u8>,
}

/// Style facts after following inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolvedStyle {
    pub style_id: Option<String>,
    pub style_name: Option<String>,
    pub outline_level: Option<u8>,
    pub list: Option<ListInfo>,
}

/// Paragraph styles of a package.
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleSheet {
    styles: HashMap<String, StyleDef>,
    default_style: Option<String>,
}

impl StyleSheet {
    /// Parse paragraph styles; other style types are ignored.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut sheet = Self::default();
        let mut current: Option<(String, StyleDef)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"style" => {
                    let is_paragraph = attr(&e, b"type").as_deref() == Some("paragraph");
                    current = match (is_paragraph, attr(&e, b"styleId")) {
                        (true, Some(id)) => {
                            if matches!(attr(&e, b"default").as_deref(), Some("1" | "true")) {
                                sheet.default_style = Some(id.clone());
                            }
                            Some((id, StyleDef::default()))
                        }
                        _ => None,
                    };
                }
                Event::Empty(e) | Event::Start(e) => {
                    if let Some((_, def)) = current.as_mut() {
                        match e.local_name().as_ref() {
                            b"name" => def.name = attr(&e, b"val"),
                            b"basedOn" => def.based_on = attr(&e, b"val"),
                            b"outlineLvl" => {
                                def.outline_level = attr(&e, b"val").and_then(|v| v.parse().ok())
                            }
                            b"numId" => def.num_id = attr(&e, b"val"),
                            b"ilvl" => def.list_level = attr(&e, b"val").and_then(|v| v.parse().ok()),
                            _ => {}
                        }
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"style" => {
                    if let Some((id, def)) = current.take() {
                        sheet.styles.insert(id, def);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        log::debug!("Loaded {} paragraph styles", sheet.styles.len());
        Ok(sheet)
    }

    /// Number of paragraph styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Resolve a style id, or the default paragraph style when `None`.
    ///
    /// Outline level and numbering are inherited through `basedOn`; the
    /// nearest definition wins.
    pub fn resolve(&self, style_id: Option<&str>) -> ResolvedStyle {
        let Some(id) = style_id.or(self.default_style.as_deref()) else {
            return ResolvedStyle::default();
        };

        let mut resolved = ResolvedStyle {
            style_id: Some(id.to_string()),
            ..ResolvedStyle::default()
        };
        let mut numbering: Option<(String, Option<u8>)> = None;
        let mut next = Some(id);

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let Some(def) = next.and_then(|id| self.styles.get(id)) else {
                break;
            };
            if resolved.style_name.is_none() {
                resolved.style_name = def.name.clone();
            }
            if resolved.outline_level.is_none() {
                resolved.outline_level = def.outline_level;
            }
            if numbering.is_none() {
                numbering = def.num_id.clone().map(|n| (n, def.list_level));
            }
            next = def.based_on.as_deref();
        }

        resolved.list = match numbering {
            Some((num_id, level)) if num_id != "0" => {
                Some(ListInfo::new(level.unwrap_or(0)).with_numbering(num_id))
            }
            _ => None,
        };
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="a"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="1"><w:name w:val="heading 1"/><w:basedOn w:val="a"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr></w:style>
  <w:style w:type="paragraph" w:styleId="Sub"><w:name w:val="My Sub"/><w:basedOn w:val="1"/></w:style>
  <w:style w:type="paragraph" w:styleId="Bullets"><w:name w:val="Bullets"/><w:pPr><w:numPr><w:ilvl w:val="2"/><w:numId w:val="7"/></w:numPr></w:pPr></w:style>
  <w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
  <w:style w:type="paragraph" w:styleId="Loop"><w:name w:val="Loop"/><w:basedOn w:val="Loop"/></w:style>
</w:styles>"#;

    #[test]
    fn test_parse_paragraph_styles_only() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(sheet.len(), 5);
    }

    #[test]
    fn test_resolve_inherits_outline_level() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        let heading = sheet.resolve(Some("1"));
        assert_eq!(heading.style_name.as_deref(), Some("heading 1"));
        assert_eq!(heading.outline_level, Some(0));

        let sub = sheet.resolve(Some("Sub"));
        assert_eq!(sub.style_name.as_deref(), Some("My Sub"));
        assert_eq!(sub.outline_level, Some(0));
    }

    #[test]
    fn test_resolve_default_and_numbering() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        let normal = sheet.resolve(None);
        assert_eq!(normal.style_id.as_deref(), Some("a"));
        assert_eq!(normal.style_name.as_deref(), Some("Normal"));
        assert!(normal.list.is_none());

        let bullets = sheet.resolve(Some("Bullets"));
        let list = bullets.list.unwrap();
        assert_eq!(list.level, 2);
        assert_eq!(list.numbering_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_resolve_unknown_and_cyclic() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        let unknown = sheet.resolve(Some("Missing"));
        assert_eq!(unknown.style_id.as_deref(), Some("Missing"));
        assert!(unknown.style_name.is_none());

        let looped = sheet.resolve(Some("Loop"));
        assert_eq!(looped.style_name.as_deref(), Some("Loop"));
    }
}
