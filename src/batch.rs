//! Batch processing of many documents.
//!
//! Each document is loaded, normalized and saved independently, so a
//! failing document never stops the batch. Documents are processed in
//! parallel with rayon unless disabled; progress is reported over a
//! crossbeam channel.

use crate::container::FormatRegistry;
use crate::error::{Error, Result};
use crate::indent::{normalize, IndentOptions, Report};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix added to output names that would collide.
const CONFLICT_SUFFIX: &str = "_indent";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Engine options applied to every document
    pub indent: IndentOptions,

    /// Output directory; defaults to each source's directory
    pub output_dir: Option<PathBuf>,

    /// Overwrite sources instead of writing new files
    pub in_place: bool,

    /// Run the engine but write nothing
    pub dry_run: bool,

    /// Process documents in parallel
    pub parallel: bool,
}

impl BatchOptions {
    /// Create default batch options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set engine options.
    pub fn with_indent(mut self, indent: IndentOptions) -> Self {
        self.indent = indent;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Overwrite sources in place.
    pub fn in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    /// Skip writing output.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            indent: IndentOptions::default(),
            output_dir: None,
            in_place: false,
            dry_run: false,
            parallel: true,
        }
    }
}

/// Progress notification sent while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// A document was picked up
    Started {
        /// Position in the input list
        index: usize,
        /// Source path
        source: PathBuf,
    },
    /// A document finished, successfully or not
    Finished {
        /// Position in the input list
        index: usize,
        /// Source path
        source: PathBuf,
        /// Whether the document loaded, normalized and saved
        success: bool,
    },
}

/// Result for one document.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Input path
    pub source: PathBuf,
    /// Where the output went; `None` for dry runs
    pub destination: Option<PathBuf>,
    /// Engine report, or the document-level error
    pub result: Result<Report>,
}

impl DocumentOutcome {
    /// Check if the document was processed.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl Serialize for DocumentOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            source: &'a Path,
            destination: Option<&'a Path>,
            #[serde(skip_serializing_if = "Option::is_none")]
            report: Option<&'a Report>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<String>,
        }

        Repr {
            source: &self.source,
            destination: self.destination.as_deref(),
            report: self.result.as_ref().ok(),
            error: self.result.as_ref().err().map(|e| e.to_string()),
        }
        .serialize(serializer)
    }
}

/// Aggregate counters over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Documents attempted
    pub documents: usize,
    /// Documents processed
    pub succeeded: usize,
    /// Documents that failed to load or save
    pub failed: usize,
    /// Paragraphs changed
    pub touched: usize,
    /// Paragraphs skipped because of their role
    pub skipped_by_role: usize,
    /// Paragraphs already canonical
    pub skipped_already_correct: usize,
    /// Paragraphs with malformed structure
    pub failed_paragraphs: usize,
}

impl BatchSummary {
    fn add(&mut self, outcome: &DocumentOutcome) {
        self.documents += 1;
        match &outcome.result {
            Ok(report) => {
                self.succeeded += 1;
                self.touched += report.touched;
                self.skipped_by_role += report.skipped_by_role;
                self.skipped_already_correct += report.skipped_already_correct;
                self.failed_paragraphs += report.failed_count();
            }
            Err(_) => self.failed += 1,
        }
    }
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// One outcome per input path
    pub outcomes: Vec<DocumentOutcome>,
    /// Totals
    pub summary: BatchSummary,
}

impl BatchReport {
    fn from_outcomes(outcomes: Vec<DocumentOutcome>) -> Self {
        let mut summary = BatchSummary::default();
        for outcome in &outcomes {
            summary.add(outcome);
        }
        Self { outcomes, summary }
    }

    /// Check if any document failed.
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Serialize outcomes and summary as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| Error::Other(format!("JSON serialization failed: {}", e)))
    }
}

/// Normalize a set of documents.
///
/// Output paths are assigned up front so parallel workers never race for
/// the same name.
pub fn run_batch(
    paths: &[PathBuf],
    options: &BatchOptions,
    registry: &FormatRegistry,
    progress: Option<&Sender<BatchEvent>>,
) -> BatchReport {
    let destinations = plan_destinations(paths, options);
    log::info!(
        "Processing {} document(s){}",
        paths.len(),
        if options.parallel { " in parallel" } else { "" }
    );

    let outcomes: Vec<DocumentOutcome> = if options.parallel {
        paths
            .par_iter()
            .zip(destinations.par_iter())
            .enumerate()
            .map(|(index, (source, destination))| {
                process_one(index, source, destination.as_deref(), options, registry, progress)
            })
            .collect()
    } else {
        paths
            .iter()
            .zip(destinations.iter())
            .enumerate()
            .map(|(index, (source, destination))| {
                process_one(index, source, destination.as_deref(), options, registry, progress)
            })
            .collect()
    };

    BatchReport::from_outcomes(outcomes)
}

fn process_one(
    index: usize,
    source: &Path,
    destination: Option<&Path>,
    options: &BatchOptions,
    registry: &FormatRegistry,
    progress: Option<&Sender<BatchEvent>>,
) -> DocumentOutcome {
    notify(progress, BatchEvent::Started {
        index,
        source: source.to_path_buf(),
    });

    let result = process_document(source, destination, registry, &options.indent);
    match &result {
        Ok(report) => log::info!("{}: {}", source.display(), report),
        Err(e) => log::warn!("{}: {}", source.display(), e),
    }

    notify(progress, BatchEvent::Finished {
        index,
        source: source.to_path_buf(),
        success: result.is_ok(),
    });

    DocumentOutcome {
        source: source.to_path_buf(),
        destination: destination.map(Path::to_path_buf),
        result,
    }
}

fn notify(progress: Option<&Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event);
    }
}

/// Load, normalize and optionally save one document.
pub fn process_document(
    source: &Path,
    destination: Option<&Path>,
    registry: &FormatRegistry,
    options: &IndentOptions,
) -> Result<Report> {
    let mut container = registry.load_path(source)?;
    let report = normalize(container.document_mut(), options);

    if let Some(destination) = destination {
        let save_error = |reason: String| Error::ContainerSave {
            path: destination.to_path_buf(),
            reason,
        };
        let bytes = container.save().map_err(|e| save_error(e.to_string()))?;
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| save_error(e.to_string()))?;
        }
        fs::write(destination, bytes).map_err(|e| save_error(e.to_string()))?;
        log::debug!("Wrote {}", destination.display());
    }

    Ok(report)
}

fn plan_destinations(paths: &[PathBuf], options: &BatchOptions) -> Vec<Option<PathBuf>> {
    let mut reserved = HashSet::new();
    paths
        .iter()
        .map(|source| {
            if options.dry_run {
                return None;
            }
            if options.in_place {
                return Some(source.clone());
            }
            let dir = match &options.output_dir {
                Some(dir) => dir.clone(),
                None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
            };
            let path = free_output_path(&dir, source, &reserved);
            reserved.insert(path.clone());
            Some(path)
        })
        .collect()
}

/// Non-conflicting output path for `source` inside `out_dir`.
///
/// Tries `name.ext`, then `name_indent.ext`, then `name_indent1.ext`,
/// `name_indent2.ext`, and so on.
pub fn resolve_output_path(out_dir: &Path, source: &Path) -> PathBuf {
    free_output_path(out_dir, source, &HashSet::new())
}

fn free_output_path(out_dir: &Path, source: &Path, reserved: &HashSet<PathBuf>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let is_free = |p: &Path| !p.exists() && !reserved.contains(p);

    let candidate = out_dir.join(format!("{}{}", stem, ext));
    if is_free(&candidate) {
        return candidate;
    }
    let candidate = out_dir.join(format!("{}{}{}", stem, CONFLICT_SUFFIX, ext));
    if is_free(&candidate) {
        return candidate;
    }
    (1..)
        .map(|i| out_dir.join(format!("{}{}{}{}", stem, CONFLICT_SUFFIX, i, ext)))
        .find(|p| is_free(p))
        .unwrap_or_else(|| out_dir.join(format!("{}{}{}", stem, CONFLICT_SUFFIX, ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_output_path_sequence() {
        let dir = tempdir().unwrap();
        let source = Path::new("/somewhere/report.docx");

        let first = resolve_output_path(dir.path(), source);
        assert_eq!(first, dir.path().join("report.docx"));
        fs::write(&first, b"x").unwrap();

        let second = resolve_output_path(dir.path(), source);
        assert_eq!(second, dir.path().join("report_indent.docx"));
        fs::write(&second, b"x").unwrap();

        let third = resolve_output_path(dir.path(), source);
        assert_eq!(third, dir.path().join("report_indent1.docx"));
    }

    #[test]
    fn test_plan_destinations_reserves_names() {
        let dir = tempdir().unwrap();
        let options = BatchOptions::new().with_output_dir(dir.path());
        let paths = vec![PathBuf::from("a/notes.txt"), PathBuf::from("b/notes.txt")];
        let planned = plan_destinations(&paths, &options);
        assert_eq!(planned[0], Some(dir.path().join("notes.txt")));
        assert_eq!(planned[1], Some(dir.path().join("notes_indent.txt")));
    }

    #[test]
    fn test_plan_destinations_modes() {
        let paths = vec![PathBuf::from("x.txt")];
        assert_eq!(
            plan_destinations(&paths, &BatchOptions::new().in_place(true)),
            vec![Some(PathBuf::from("x.txt"))]
        );
        assert_eq!(plan_destinations(&paths, &BatchOptions::new().dry_run(true)), vec![None]);
    }

    #[test]
    fn test_summary_counts_failures() {
        let mut report = Report::new();
        report.touched = 2;
        let outcomes = vec![
            DocumentOutcome {
                source: "ok.txt".into(),
                destination: None,
                result: Ok(report),
            },
            DocumentOutcome {
                source: "bad.docx".into(),
                destination: None,
                result: Err(Error::load("not a zip package")),
            },
        ];
        let batch = BatchReport::from_outcomes(outcomes);
        assert_eq!(batch.summary.documents, 2);
        assert_eq!(batch.summary.succeeded, 1);
        assert_eq!(batch.summary.failed, 1);
        assert_eq!(batch.summary.touched, 2);
        assert!(batch.has_failures());

        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["outcomes"][1]["error"], "Cannot load document: not a zip package");
        assert_eq!(json["outcomes"][0]["report"]["touched"], 2);
    }
}
