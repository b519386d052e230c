//! indentor CLI - first-line indentation normalizer

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use indentor::{
    inspect_file, run_batch, BatchEvent, BatchOptions, BatchReport, FormatRegistry, IndentOptions,
    Report, Role, RoleSet, StyleRules,
};

#[derive(Parser)]
#[command(name = "indentor")]
#[command(version)]
#[command(about = "Normalize first-line indentation with fullwidth spaces", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Input .docx/.txt files or directories
    #[arg(value_name = "FILES")]
    inputs: Vec<PathBuf>,

    /// Output directory (default: next to each source)
    #[arg(short, long, value_name = "DIR", env = "INDENTOR_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Overwrite the source files
    #[arg(long, conflicts_with = "output")]
    in_place: bool,

    /// Run without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Append a dated log file in this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Process one document at a time
    #[arg(long)]
    sequential: bool,

    #[command(flatten)]
    indent: IndentArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show role breakdown and pending edits without writing
    Info {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        indent: IndentArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct IndentArgs {
    /// Indent width in fullwidth spaces (0 removes indentation)
    #[arg(short, long, default_value_t = 2, env = "INDENTOR_WIDTH")]
    width: usize,

    /// Remove first-line indentation (same as --width 0)
    #[arg(long)]
    deindent: bool,

    /// Also process headers and footers
    #[arg(long)]
    headers_footers: bool,

    /// Roles that receive the indent
    #[arg(long, value_name = "ROLES", default_value = "body,quote")]
    roles: RoleSet,

    /// Regex for heading style names
    #[arg(long, value_name = "REGEX")]
    heading_pattern: Option<String>,

    /// Regex for caption style names
    #[arg(long, value_name = "REGEX")]
    caption_pattern: Option<String>,

    /// Regex for quote style names
    #[arg(long, value_name = "REGEX")]
    quote_pattern: Option<String>,

    /// Regex for code style names
    #[arg(long, value_name = "REGEX")]
    code_pattern: Option<String>,
}

impl IndentArgs {
    fn to_options(&self) -> Result<IndentOptions, Box<dyn std::error::Error>> {
        let mut rules = StyleRules::default();
        if let Some(p) = &self.heading_pattern {
            rules = rules.with_heading_pattern(p)?;
        }
        if let Some(p) = &self.caption_pattern {
            rules = rules.with_caption_pattern(p)?;
        }
        if let Some(p) = &self.quote_pattern {
            rules = rules.with_quote_pattern(p)?;
        }
        if let Some(p) = &self.code_pattern {
            rules = rules.with_code_pattern(p)?;
        }

        let mut options = IndentOptions::new()
            .with_target_width(self.width)
            .with_headers_footers(self.headers_footers)
            .with_roles(self.roles)
            .with_style_rules(rules);
        if self.deindent {
            options = options.deindent();
        }
        Ok(options)
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_dir.as_deref()) {
        eprintln!("{}: cannot open log file: {}", "Warning".yellow().bold(), e);
    }

    let result = match &cli.command {
        Some(Commands::Info {
            input,
            json,
            indent,
        }) => cmd_info(input, indent, *json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(true)
        }
        None => {
            if cli.inputs.is_empty() {
                println!("{}", "Usage: indentor <FILES>... [-o DIR]".yellow());
                println!("       indentor --help for more information");
                Ok(true)
            } else {
                cmd_normalize(&cli)
            }
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Route log output to stderr, or to `indentor_YYYY-MM-DD.log` in `log_dir`.
fn init_logging(log_dir: Option<&Path>) -> std::io::Result<()> {
    let Some(dir) = log_dir else {
        env_logger::init();
        return Ok(());
    };

    let opened = fs::create_dir_all(dir).and_then(|_| {
        let name = format!("indentor_{}.log", chrono::Local::now().format("%Y-%m-%d"));
        OpenOptions::new().create(true).append(true).open(dir.join(name))
    });

    match opened {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
            Ok(())
        }
        Err(e) => {
            env_logger::init();
            Err(e)
        }
    }
}

/// Expand directories into the supported files they contain.
fn collect_inputs(inputs: &[PathBuf], registry: &FormatRegistry) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && registry.supports_path(p))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn cmd_normalize(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let registry = FormatRegistry::with_defaults();
    let paths = collect_inputs(&cli.inputs, &registry)?;
    if paths.is_empty() {
        println!("{}", "No supported files found".yellow());
        return Ok(true);
    }

    let mut options = BatchOptions::new()
        .with_indent(cli.indent.to_options()?)
        .in_place(cli.in_place)
        .dry_run(cli.dry_run)
        .with_parallel(!cli.sequential);
    if let Some(dir) = &cli.output {
        options = options.with_output_dir(dir);
    }

    let report = if cli.json {
        run_batch(&paths, &options, &registry, None)
    } else {
        run_with_progress(&paths, &options, &registry)
    };

    if cli.json {
        println!("{}", report.to_json(true)?);
    } else {
        print_batch(&report, cli.dry_run);
    }

    Ok(!report.has_failures())
}

fn run_with_progress(paths: &[PathBuf], options: &BatchOptions, registry: &FormatRegistry) -> BatchReport {
    let pb = ProgressBar::new(paths.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("#>-"));
    }

    let (tx, rx) = crossbeam_channel::unbounded();
    let report = std::thread::scope(|scope| {
        let bar = pb.clone();
        scope.spawn(move || {
            for event in rx {
                if let BatchEvent::Finished { source, .. } = event {
                    let name = source.file_name().unwrap_or_default().to_string_lossy().into_owned();
                    bar.set_message(name);
                    bar.inc(1);
                }
            }
        });
        let report = run_batch(paths, options, registry, Some(&tx));
        drop(tx);
        report
    });

    pb.finish_and_clear();
    report
}

fn print_batch(report: &BatchReport, dry_run: bool) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(doc) => {
                let target = match &outcome.destination {
                    Some(dest) => format!(" {} {}", "→".dimmed(), dest.display()),
                    None => String::new(),
                };
                println!("{} {}{}", "✓".green(), outcome.source.display(), target);
                println!("    {}", doc.to_string().dimmed());
                for failure in &doc.failed {
                    println!("    {} {}: {}", "!".yellow(), failure.location, failure.error);
                }
            }
            Err(e) => println!("{} {}: {}", "✗".red(), outcome.source.display(), e),
        }
    }

    let s = &report.summary;
    println!();
    println!(
        "{} {} document(s), {} failed; {} paragraph(s) {}",
        "Done!".green().bold(),
        s.succeeded,
        s.failed,
        s.touched,
        if dry_run { "would change" } else { "changed" }
    );
}

fn cmd_info(input: &Path, indent: &IndentArgs, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let report = inspect_file(input, &indent.to_options()?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(true);
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Paragraphs".bold(), report.paragraphs);

    println!();
    println!("{}", "Roles".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for role in Role::ALL {
        println!("{}: {}", role.to_string().bold(), report.roles.get(role));
    }

    println!();
    println!("{}", "Pending Edits".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print_pending(&report);

    Ok(true)
}

fn print_pending(report: &Report) {
    println!("{}: {}", "Would change".bold(), report.touched);
    println!("{}: {}", "Skipped by role".bold(), report.skipped_by_role);
    println!("{}: {}", "Already correct".bold(), report.skipped_already_correct);
    println!("{}: {}", "Malformed".bold(), report.failed_count());
    for failure in &report.failed {
        println!("  {} {}: {}", "├─".dimmed(), failure.location, failure.error);
    }
}

fn cmd_version() {
    println!("{} {}", "indentor".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("First-line indentation normalizer for CJK documents");
    println!();
    println!("Formats: {}", FormatRegistry::with_defaults().supported_extensions().join(", "));
    println!("License: MIT");
}
