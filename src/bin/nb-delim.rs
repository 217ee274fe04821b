use clap::Parser;
use nb_delim::{NormalizeReport, Normalized, NotebookError, load, normalize, save};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Rewrite `\[ \]` and `\( \)` math delimiters in notebook markdown cells to
/// `$$` and `$`, in place.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Notebook file to rewrite
    path: PathBuf,
    /// Report what would change without writing; exits 2 if the file would change
    #[arg(long)]
    check: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    path: String,
    written: bool,
    report: &'a NormalizeReport,
}

fn main() {
    // Logs go to stderr so `--json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (report, written) = match run(&cli.path, cli.check) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if cli.json {
        let summary = RunSummary {
            path: cli.path.display().to_string(),
            written,
            report: &report,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    } else if report.is_clean() {
        println!("No delimiters to rewrite");
    } else {
        let verb = if written { "Rewrote" } else { "Would rewrite" };
        println!(
            "{verb} {} delimiter(s) in {} cell(s)",
            report.replacements.total(),
            report.cells_changed
        );
    }

    if cli.check && !report.is_clean() {
        std::process::exit(2);
    }
}

fn run(path: &Path, check: bool) -> Result<(NormalizeReport, bool), NotebookError> {
    let notebook = load(path)?;
    let Normalized { notebook, report } = normalize(&notebook);
    if check || report.is_clean() {
        return Ok((report, false));
    }
    save(path, &notebook)?;
    Ok((report, true))
}
