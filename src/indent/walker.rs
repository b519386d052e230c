//! Document walker: runs the classifier, planner and splicer over every
//! paragraph of a document.

use super::options::IndentOptions;
use super::plan::{self, PlanAction, SkipReason};
use super::report::{ParagraphLocation, Report, StoryRef};
use super::role;
use super::splice;
use crate::model::{Block, Document, Paragraph};

/// Normalize leading indentation across a document, in place.
///
/// Body blocks are visited in document order, descending into tables and
/// frames; headers and footers follow when enabled. Paragraphs are
/// independent, so one paragraph's failure never affects another.
pub fn normalize(document: &mut Document, options: &IndentOptions) -> Report {
    let mut walker = Walker {
        options,
        report: Report::new(),
        story: StoryRef::Body,
        ordinal: 0,
    };

    walker.visit_blocks(&mut document.body);

    if options.include_headers_footers {
        for (position, story) in document.headers_footers.iter_mut().enumerate() {
            walker.story = StoryRef::Secondary {
                kind: story.kind,
                position,
            };
            walker.ordinal = 0;
            walker.visit_blocks(&mut story.blocks);
        }
    }

    walker.report
}

struct Walker<'a> {
    options: &'a IndentOptions,
    report: Report,
    story: StoryRef,
    ordinal: usize,
}

impl Walker<'_> {
    fn visit_blocks(&mut self, blocks: &mut [Block]) {
        for block in blocks {
            match block {
                Block::Paragraph(p) => self.visit_paragraph(p),
                Block::Table(table) => {
                    for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
                        self.visit_blocks(&mut cell.blocks);
                    }
                }
                Block::Frame(frame) => self.visit_blocks(&mut frame.blocks),
            }
        }
    }

    fn visit_paragraph(&mut self, paragraph: &mut Paragraph) {
        let location = ParagraphLocation {
            story: self.story,
            index: self.ordinal,
        };
        self.ordinal += 1;
        self.report.paragraphs += 1;

        if let Err(e) = splice::validate(paragraph) {
            log::warn!("Skipping {}: {}", location, e);
            self.report.record_failure(location, e);
            return;
        }

        let role = role::classify(paragraph, &self.options.style_rules);
        self.report.roles.add(role);

        let leading = plan::leading_whitespace(&paragraph.runs);
        let edit = plan::plan(role, &leading, self.options);

        match edit.action {
            PlanAction::Skip(SkipReason::ExcludedRole(_)) => self.report.skipped_by_role += 1,
            PlanAction::Skip(SkipReason::AlreadyCanonical) => {
                self.report.skipped_already_correct += 1
            }
            PlanAction::Insert | PlanAction::Replace | PlanAction::Strip => {
                match splice::apply(paragraph, &edit) {
                    Ok(_) => {
                        log::debug!("{:?} indent on {} ({})", edit.action, location, role);
                        self.report.touched += 1;
                    }
                    Err(e) => {
                        log::warn!("Cannot indent {}: {}", location, e);
                        self.report.record_failure(location, e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Frame, ListInfo, Run, Story, StoryKind, Table, TableRow};

    fn texts(doc: &Document) -> Vec<String> {
        doc.paragraphs().iter().map(|p| p.text()).collect()
    }

    #[test]
    fn test_normalize_mixed_document() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::styled("Heading 1", "  Chapter 1"));
        doc.add_paragraph(Paragraph::with_text("\tHello world"));
        doc.add_paragraph(Paragraph::list_item(0, "1. Buy milk"));
        doc.add_paragraph(Paragraph::with_text("\u{3000}\u{3000}Already indented."));
        doc.add_paragraph(Paragraph::with_text("   "));

        let report = normalize(&mut doc, &IndentOptions::default());

        assert_eq!(
            texts(&doc),
            vec![
                "  Chapter 1",
                "\u{3000}\u{3000}Hello world",
                "1. Buy milk",
                "\u{3000}\u{3000}Already indented.",
                "   ",
            ]
        );
        assert_eq!(report.paragraphs, 5);
        assert_eq!(report.touched, 1);
        assert_eq!(report.skipped_by_role, 3);
        assert_eq!(report.skipped_already_correct, 1);
        assert!(report.is_clean());
        assert_eq!(report.roles.empty, 1);
        assert_eq!(report.roles.list_item, 1);
    }

    #[test]
    fn test_nested_tables_and_frames() {
        let mut doc = Document::new();
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["cell one", " cell two"]));
        doc.add_block(Block::Table(table));
        doc.add_block(Block::Frame(Frame::new(vec![Block::Paragraph(
            Paragraph::with_text("boxed"),
        )])));

        let report = normalize(&mut doc, &IndentOptions::default());
        assert_eq!(report.touched, 3);
        assert!(texts(&doc).iter().all(|t| t.starts_with("\u{3000}\u{3000}c") || t == "\u{3000}\u{3000}boxed"));
    }

    #[test]
    fn test_headers_footers_opt_in() {
        let mut doc = Document::new();
        let mut header = Story::new(StoryKind::Header, "header1");
        header.blocks.push(Block::Paragraph(Paragraph::with_text("Draft")));
        doc.add_story(header);

        let report = normalize(&mut doc, &IndentOptions::default());
        assert_eq!(report.paragraphs, 0);
        assert_eq!(doc.headers_footers[0].paragraphs()[0].text(), "Draft");

        let report = normalize(&mut doc, &IndentOptions::default().with_headers_footers(true));
        assert_eq!(report.touched, 1);
        assert_eq!(doc.headers_footers[0].paragraphs()[0].text(), "\u{3000}\u{3000}Draft");
    }

    #[test]
    fn test_failure_is_recorded_and_pass_continues() {
        let mut bad = Run::object(crate::model::FormatToken::neutral());
        bad.text.clear();
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::from_runs(vec![Run::plain(" x"), bad]));
        doc.add_paragraph(Paragraph::with_text("fine"));

        let report = normalize(&mut doc, &IndentOptions::default());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed[0].location.index, 0);
        assert_eq!(report.touched, 1);
        assert_eq!(doc.paragraphs()[0].text(), " x");
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text(" \t mixed"));
        doc.add_paragraph(Paragraph::with_text("plain"));
        let mut numbered = Paragraph::with_text("\tstep");
        numbered.style.list = Some(ListInfo::new(0));
        doc.add_paragraph(numbered);

        let options = IndentOptions::default();
        let first = normalize(&mut doc, &options);
        assert_eq!(first.touched, 2);
        let second = normalize(&mut doc, &options);
        assert_eq!(second.touched, 0);
        assert_eq!(second.skipped_already_correct, 2);
    }
}
