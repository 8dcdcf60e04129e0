//! # CLI Module
//!
//! Command-line interface for the track vetter.
//!
//! ## Usage
//! ```bash
//! # Index a music library
//! track-vet index ~/Music
//!
//! # Vet an incoming folder against the library
//! track-vet vet ~/Downloads/new-tracks
//!
//! # With a custom categorization threshold
//! track-vet vet ~/Downloads/new-tracks --threshold 0.9
//!
//! # Vet plus review-history filtering
//! track-vet process ~/Downloads/new-tracks
//!
//! # Library statistics and past runs
//! track-vet stats
//! track-vet runs --limit 5
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;
use track_vetter::core::history::ReviewHistory;
use track_vetter::core::index::LibraryIndex;
use track_vetter::core::processing::{process_folder, ProcessingOutcome};
use track_vetter::core::vetting::{
    export_duplicates, export_new_songs, export_uncertain, Vetter, VettingReport,
};
use track_vetter::error::Result;
use track_vetter::events::{Event, EventChannel, ScanEvent, VetEvent};

/// Track Vetter - Import new music without creating duplicates
#[derive(Parser, Debug)]
#[command(name = "track-vet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index a folder of music into the library
    Index {
        /// Folder to index
        folder: PathBuf,

        /// Library database path
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// Vet an incoming folder against the library
    Vet {
        /// Folder to vet
        folder: PathBuf,

        /// Categorization threshold (0.0-1.0)
        #[arg(short, long, default_value = "0.8")]
        threshold: f64,

        /// Fuzzy floor: minimum title similarity kept as a match (0.0-1.0)
        #[arg(long, default_value = "0.7")]
        fuzzy_floor: f64,

        /// Library database path
        #[arg(long)]
        library: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Write new-file paths to this text file
        #[arg(long)]
        export_new: Option<PathBuf>,

        /// Write duplicate paths to this text file
        #[arg(long)]
        export_duplicates: Option<PathBuf>,

        /// Write uncertain paths to this text file
        #[arg(long)]
        export_uncertain: Option<PathBuf>,

        /// Skip persisting this run to the audit table
        #[arg(long)]
        no_save_run: bool,
    },

    /// Vet a folder, then split new files through the review history
    Process {
        /// Folder to process
        folder: PathBuf,

        /// Categorization threshold (0.0-1.0)
        #[arg(short, long, default_value = "0.8")]
        threshold: f64,

        /// Library database path
        #[arg(long)]
        library: Option<PathBuf>,

        /// History database path
        #[arg(long)]
        history: Option<PathBuf>,

        /// Record the truly-new files into the history after reporting
        #[arg(long)]
        record: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Show library statistics
    Stats {
        /// Library database path
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// List past vetting runs
    Runs {
        /// Library database path
        #[arg(long)]
        library: Option<PathBuf>,

        /// How many runs to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    track_vetter::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { folder, library } => run_index(folder, library),
        Commands::Vet {
            folder,
            threshold,
            fuzzy_floor,
            library,
            output,
            export_new,
            export_duplicates,
            export_uncertain,
            no_save_run,
        } => run_vet(
            folder,
            threshold,
            fuzzy_floor,
            library,
            output,
            export_new,
            export_duplicates,
            export_uncertain,
            no_save_run,
        ),
        Commands::Process {
            folder,
            threshold,
            library,
            history,
            record,
            output,
        } => run_process(folder, threshold, library, history, record, output),
        Commands::Stats { library } => run_stats(library),
        Commands::Runs { library, limit } => run_runs(library, limit),
    }
}

fn default_data_path(file: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("track-vetter")
        .join(file)
}

fn open_library(library: Option<PathBuf>) -> Result<LibraryIndex> {
    let path = library.unwrap_or_else(|| default_data_path("library.db"));
    Ok(LibraryIndex::open(&path)?)
}

fn open_history(history: Option<PathBuf>) -> Result<ReviewHistory> {
    let path = history.unwrap_or_else(|| default_data_path("history.db"));
    Ok(ReviewHistory::open(&path)?)
}

fn run_index(folder: PathBuf, library: Option<PathBuf>) -> Result<()> {
    let term = Term::stderr();
    let index = open_library(library)?;
    let vetter = Vetter::new(&index);

    let outcome = vetter.index_folder(&folder)?;

    term.write_line(&format!(
        "{} Indexed {} of {} files",
        style("✓").green().bold(),
        style(outcome.indexed).cyan(),
        outcome.total_files
    ))
    .ok();

    for path in &outcome.failed {
        term.write_line(&format!(
            "  {} could not read {}",
            style("!").yellow(),
            path.display()
        ))
        .ok();
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_vet(
    folder: PathBuf,
    threshold: f64,
    fuzzy_floor: f64,
    library: Option<PathBuf>,
    output: OutputFormat,
    export_new_path: Option<PathBuf>,
    export_duplicates_path: Option<PathBuf>,
    export_uncertain_path: Option<PathBuf>,
    no_save_run: bool,
) -> Result<()> {
    let index = open_library(library)?;
    let vetter = Vetter::with_fuzzy_floor(&index, fuzzy_floor)?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_files as u64);
                        pb.set_message("vetting");
                    }
                }
                Event::Vet(VetEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                    }
                }
                Event::Vet(VetEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = vetter.vet_folder_with_events(&folder, threshold, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let report = result?;

    if !no_save_run {
        index.save_vetting_run(&report.to_run_record())?;
    }

    if let Some(path) = export_new_path {
        export_new_songs(&report, &path)?;
    }
    if let Some(path) = export_duplicates_path {
        export_duplicates(&report, &path)?;
    }
    if let Some(path) = export_uncertain_path {
        export_uncertain(&report, &path)?;
    }

    match output {
        OutputFormat::Pretty => print_pretty_report(&Term::stderr(), &report),
        OutputFormat::Json => print_json_report(&report),
        OutputFormat::Minimal => print_minimal_report(&report),
    }

    Ok(())
}

fn run_process(
    folder: PathBuf,
    threshold: f64,
    library: Option<PathBuf>,
    history: Option<PathBuf>,
    record: bool,
    output: OutputFormat,
) -> Result<()> {
    let index = open_library(library)?;
    let history = open_history(history)?;
    let vetter = Vetter::new(&index);

    let outcome = process_folder(&vetter, &history, &folder, threshold)?;

    if record {
        for path in &outcome.truly_new {
            if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                history.add(filename, path)?;
            }
        }
    }

    match output {
        OutputFormat::Pretty => print_pretty_outcome(&Term::stderr(), &outcome),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome).unwrap_or_default());
        }
        OutputFormat::Minimal => {
            for path in &outcome.truly_new {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn run_stats(library: Option<PathBuf>) -> Result<()> {
    let term = Term::stderr();
    let index = open_library(library)?;
    let stats = index.get_statistics()?;

    term.write_line(&format!(
        "{}",
        style("Library Statistics").bold().underlined()
    ))
    .ok();
    term.write_line(&format!(
        "  {} active tracks ({})",
        style(stats.total_active_files).cyan(),
        format_bytes(stats.total_bytes)
    ))
    .ok();
    term.write_line(&format!(
        "  {} artists, {} albums",
        style(stats.distinct_artists).cyan(),
        style(stats.distinct_albums).cyan()
    ))
    .ok();

    for entry in &stats.files_by_format {
        term.write_line(&format!("    {:>8}  {}", entry.count, entry.format))
            .ok();
    }

    Ok(())
}

fn run_runs(library: Option<PathBuf>, limit: usize) -> Result<()> {
    let term = Term::stderr();
    let index = open_library(library)?;
    let runs = index.list_vetting_runs(limit)?;

    if runs.is_empty() {
        term.write_line("No vetting runs recorded yet.").ok();
        return Ok(());
    }

    for run in runs {
        term.write_line(&format!(
            "{}  {} files: {} duplicate, {} new, {} uncertain ({} ms)",
            run.folder,
            run.total_files,
            style(run.duplicates).yellow(),
            style(run.new_files).green(),
            style(run.uncertain).magenta(),
            run.duration_ms
        ))
        .ok();
    }

    Ok(())
}

fn print_pretty_report(term: &Term, report: &VettingReport) {
    term.write_line("").ok();
    term.write_line(&format!("{} Vetting Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(report.total_files).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates ({:.0}%)",
        style(report.duplicates.len()).yellow(),
        report.duplicate_percent()
    ))
    .ok();
    term.write_line(&format!(
        "  {} new ({:.0}%)",
        style(report.new_files.len()).green(),
        report.new_percent()
    ))
    .ok();
    term.write_line(&format!(
        "  {} uncertain ({:.0}%)",
        style(report.uncertain.len()).magenta(),
        report.uncertain_percent()
    ))
    .ok();
    term.write_line("").ok();

    for entry in &report.duplicates {
        let matched = entry
            .verdict
            .best_match
            .as_ref()
            .map(|m| m.path.display().to_string())
            .unwrap_or_default();
        term.write_line(&format!(
            "  {} {} ({}, {:.2})",
            style("dup").yellow(),
            entry.path.display(),
            entry.verdict.match_type,
            entry.verdict.confidence
        ))
        .ok();
        if !matched.is_empty() {
            term.write_line(&format!("      matches {}", style(matched).dim()))
                .ok();
        }
    }

    for entry in &report.uncertain {
        term.write_line(&format!(
            "  {} {} ({:.2}, review manually)",
            style("?").magenta(),
            entry.path.display(),
            entry.verdict.confidence
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("No files were moved or deleted. Review before importing.").dim()
    ))
    .ok();
}

fn print_json_report(report: &VettingReport) {
    println!(
        "{}",
        serde_json::to_string_pretty(report).unwrap_or_default()
    );
}

fn print_minimal_report(report: &VettingReport) {
    for path in &report.new_files {
        println!("{}", path.display());
    }
}

fn print_pretty_outcome(term: &Term, outcome: &ProcessingOutcome) {
    print_pretty_report(term, &outcome.report);

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} already reviewed, {} truly new",
        style(outcome.already_reviewed.len()).yellow(),
        style(outcome.truly_new.len()).green()
    ))
    .ok();

    for matched in &outcome.already_reviewed {
        term.write_line(&format!(
            "  {} {} (first seen {} at {})",
            style("seen").yellow(),
            matched.candidate_path.display(),
            matched.added_at.format("%Y-%m-%d"),
            matched.original_path.display()
        ))
        .ok();
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
