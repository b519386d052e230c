//! Applying edit plans to a paragraph's runs.
//!
//! Only whitespace-only fragments before the indent boundary are edited.
//! A run straddling the boundary is split so that its content part is
//! never touched; both halves keep the original format token.

use super::plan::{leading_whitespace, EditPlan};
use crate::error::ParagraphStructureError;
use crate::model::{FormatToken, Paragraph, Run, RunKind, OBJECT_PLACEHOLDER};

/// Check the run sequence against the model contract.
pub fn validate(paragraph: &Paragraph) -> Result<(), ParagraphStructureError> {
    for (index, run) in paragraph.runs.iter().enumerate() {
        match run.kind {
            RunKind::Marker if !run.text.is_empty() => {
                return Err(ParagraphStructureError::MarkerHasText { run: index });
            }
            RunKind::Object if !is_placeholder(&run.text) => {
                return Err(ParagraphStructureError::MalformedObject { run: index });
            }
            _ => {}
        }
    }
    Ok(())
}

fn is_placeholder(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(OBJECT_PLACEHOLDER) && chars.next().is_none()
}

/// Apply a plan in place. Returns whether the paragraph changed.
///
/// On error the paragraph is left exactly as it was.
pub fn apply(paragraph: &mut Paragraph, plan: &EditPlan) -> Result<bool, ParagraphStructureError> {
    if plan.is_noop() {
        return Ok(false);
    }
    validate(paragraph)?;

    let boundary = leading_whitespace(&paragraph.runs)
        .boundary
        .ok_or(ParagraphStructureError::NoContent)?;
    let runs = &mut paragraph.runs;

    let mut content = boundary.run;
    if boundary.offset > 0 {
        let suffix = runs[content].text.split_off(boundary.offset);
        let format = runs[content].format.clone();
        runs.insert(content + 1, Run::new(suffix, format));
        content += 1;
    }

    // Every non-empty text run before `content` is now whitespace only.
    let leading: Vec<usize> = (0..content)
        .filter(|&i| runs[i].kind == RunKind::Text && !runs[i].text.is_empty())
        .collect();

    let indent = plan.indent_text();
    match leading.split_first() {
        Some((&first, rest)) if !indent.is_empty() => {
            runs[first].text = indent;
            for &i in rest {
                runs[i].text.clear();
            }
        }
        _ => {
            for &i in &leading {
                runs[i].text.clear();
            }
            if !indent.is_empty() {
                let format = content_format(&runs[content..]);
                runs.insert(content, Run::new(indent, format));
            }
        }
    }

    let mut index = 0;
    runs.retain(|run| {
        let emptied = leading.binary_search(&index).is_ok() && run.text.is_empty();
        index += 1;
        !emptied
    });

    Ok(true)
}

/// Format of the first text run holding visible content.
fn content_format(runs: &[Run]) -> FormatToken {
    runs.iter()
        .find(|r| r.kind == RunKind::Text && r.text.chars().any(|c| !c.is_whitespace()))
        .map(|r| r.format.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indent::options::IndentOptions;
    use crate::indent::plan::{plan, PlanAction};
    use crate::indent::role::Role;

    fn edit(paragraph: &mut Paragraph, options: &IndentOptions) -> bool {
        let lead = leading_whitespace(&paragraph.runs);
        let p = plan(Role::Body, &lead, options);
        apply(paragraph, &p).unwrap()
    }

    #[test]
    fn test_tab_replaced_inside_single_run() {
        let bold = FormatToken::new("bold");
        let mut p = Paragraph::from_runs(vec![Run::new("\tHello world", bold.clone())]);
        assert!(edit(&mut p, &IndentOptions::default()));

        assert_eq!(p.text(), "\u{3000}\u{3000}Hello world");
        assert_eq!(p.runs.len(), 2);
        assert_eq!(p.runs[0].text, "\u{3000}\u{3000}");
        assert_eq!(p.runs[1].text, "Hello world");
        assert!(p.runs.iter().all(|r| r.format.ptr_eq(&bold)));
    }

    #[test]
    fn test_insert_uses_content_format() {
        let marker = FormatToken::new("bookmark");
        let body = FormatToken::new("body");
        let mut p = Paragraph::from_runs(vec![
            Run::marker(marker.clone()),
            Run::new("Hello", body.clone()),
            Run::new(" world", FormatToken::new("italic")),
        ]);
        assert!(edit(&mut p, &IndentOptions::default()));

        assert_eq!(p.runs.len(), 4);
        assert_eq!(p.runs[0].kind, RunKind::Marker);
        assert!(p.runs[0].format.ptr_eq(&marker));
        assert_eq!(p.runs[1].text, "\u{3000}\u{3000}");
        assert!(p.runs[1].format.ptr_eq(&body));
        assert_eq!(p.runs[2].text, "Hello");
    }

    #[test]
    fn test_insert_before_object_takes_following_text_format() {
        let image = FormatToken::new("drawing");
        let body = FormatToken::new("body");
        let mut p = Paragraph::from_runs(vec![Run::object(image.clone()), Run::new(" caption-like", body.clone())]);
        assert!(edit(&mut p, &IndentOptions::default()));

        assert_eq!(p.runs[0].text, "\u{3000}\u{3000}");
        assert!(p.runs[0].format.ptr_eq(&body));
        assert!(p.runs[1].format.ptr_eq(&image));
        assert_eq!(p.runs[2].text, " caption-like");
    }

    #[test]
    fn test_insert_without_text_content_uses_neutral_format() {
        let mut p = Paragraph::from_runs(vec![Run::object(FormatToken::new("drawing"))]);
        assert!(edit(&mut p, &IndentOptions::default()));
        assert!(p.runs[0].format.is_neutral());
    }

    #[test]
    fn test_replace_spanning_runs_keeps_first_fragment_format() {
        let tab = FormatToken::new("tab");
        let space = FormatToken::new("space");
        let text = FormatToken::new("text");
        let mut p = Paragraph::from_runs(vec![
            Run::new("\t", tab.clone()),
            Run::marker(FormatToken::neutral()),
            Run::new("  ", space),
            Run::new("Body", text.clone()),
        ]);
        assert!(edit(&mut p, &IndentOptions::default()));

        assert_eq!(p.text(), "\u{3000}\u{3000}Body");
        assert_eq!(p.runs.len(), 3);
        assert!(p.runs[0].format.ptr_eq(&tab));
        assert_eq!(p.runs[1].kind, RunKind::Marker);
        assert!(p.runs[2].format.ptr_eq(&text));
    }

    #[test]
    fn test_strip_drops_emptied_runs() {
        let mut p = Paragraph::from_runs(vec![
            Run::plain("\u{3000}\u{3000}"),
            Run::plain(" Text  with  spaces "),
        ]);
        assert!(edit(&mut p, &IndentOptions::default().deindent()));

        assert_eq!(p.runs.len(), 1);
        assert_eq!(p.text(), "Text  with  spaces ");
    }

    #[test]
    fn test_preexisting_empty_runs_survive() {
        let mut p = Paragraph::from_runs(vec![Run::plain(""), Run::plain("  x")]);
        assert!(edit(&mut p, &IndentOptions::default()));
        assert_eq!(p.runs.len(), 3);
        assert_eq!(p.runs[0].text, "");
        assert_eq!(p.text(), "\u{3000}\u{3000}x");
    }

    #[test]
    fn test_noop_plan_leaves_paragraph() {
        let mut p = Paragraph::with_text("\u{3000}\u{3000}Already indented.");
        let lead = leading_whitespace(&p.runs);
        let noop = plan(Role::Body, &lead, &IndentOptions::default());
        assert!(matches!(noop.action, PlanAction::Skip(_)));
        assert!(!apply(&mut p, &noop).unwrap());
        assert_eq!(p.runs.len(), 1);
    }

    #[test]
    fn test_malformed_runs_fail_without_mutation() {
        let mut bad = Run::marker(FormatToken::neutral());
        bad.text = "oops".into();
        let mut p = Paragraph::from_runs(vec![Run::plain("\tx"), bad]);
        let before = p.clone();
        let replace = EditPlan {
            action: PlanAction::Replace,
            target_width: 2,
        };
        assert_eq!(
            apply(&mut p, &replace),
            Err(ParagraphStructureError::MarkerHasText { run: 1 })
        );
        assert_eq!(p.runs, before.runs);

        let mut obj = Run::object(FormatToken::neutral());
        obj.text = "xx".into();
        assert_eq!(
            validate(&Paragraph::from_runs(vec![obj])),
            Err(ParagraphStructureError::MalformedObject { run: 0 })
        );
    }

    #[test]
    fn test_no_content_is_an_error() {
        let mut p = Paragraph::with_text("   ");
        let insert = EditPlan {
            action: PlanAction::Insert,
            target_width: 2,
        };
        assert_eq!(apply(&mut p, &insert), Err(ParagraphStructureError::NoContent));
        assert_eq!(p.text(), "   ");
    }
}
