mod config;
mod error;
mod export;
mod output;
mod parser;
mod runner;
mod sink;
mod stats;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::config::{BlankLinePolicy, CollisionPolicy, Settings};
use crate::error::NoteSplitError;
use crate::sink::ConsoleSink;

#[derive(Parser)]
#[command(name = "notesplit", about = "Split and inspect exported note collections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split an export into one .txt file per note
    Split {
        /// Export document containing ###标题### markers
        input: PathBuf,
        /// Output directory (default: 分割后的笔记 next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// What to do when two notes get the same file name
        #[arg(long, value_enum)]
        collision: Option<CollisionPolicy>,
        /// Keep or collapse runs of blank lines inside note bodies
        #[arg(long, value_enum)]
        blank_lines: Option<BlankLinePolicy>,
        /// Date (YYYYMMDD) for notes without one, instead of the file's modification date
        #[arg(long)]
        fallback_date: Option<String>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-note character and blank-line counts, flagging empty notes
    Stats {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Build an export document from a JSON array of {title, body} records
    Compose {
        records: PathBuf,
        /// Directory for the export file
        #[arg(short, long, default_value = "笔记导出")]
        output: PathBuf,
        /// Name part of the export file, e.g. 日记
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Split {
            input,
            output,
            collision,
            blank_lines,
            fallback_date,
            json,
        } => {
            if let Some(c) = collision {
                settings.collision = c;
            }
            if let Some(b) = blank_lines {
                settings.blank_lines = b;
            }
            if fallback_date.is_some() {
                settings.fallback_date = fallback_date;
            }
            let mut sink = ConsoleSink::new();
            let report = runner::run_split(&input, output.as_deref(), &settings, &mut sink)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.markers == 0 {
                println!("No title markers found in {}.", input.display());
            } else {
                println!(
                    "Done: {} markers, {} files written ({} failed, {} collisions, {} undated).",
                    report.markers, report.written, report.failed, report.collisions, report.undated
                );
                println!("Saved to: {}", report.output_dir.display());
            }
            Ok(())
        }
        Commands::Stats { input, json } => {
            if !input.exists() {
                return Err(NoteSplitError::MissingInput(input).into());
            }
            let text = fs::read_to_string(&input).map_err(|e| NoteSplitError::io(&input, e))?;
            let report = stats::collect_stats(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                stats::print_table(&report);
            }
            Ok(())
        }
        Commands::Compose {
            records,
            output,
            prefix,
        } => {
            let prefix = prefix.unwrap_or_else(|| settings.export_prefix.clone());
            let loaded = export::load_records(&records)?;
            let now = chrono::Local::now();
            let (path, count) = export::write_export(&output, &prefix, loaded, &now)?;
            println!("Exported {} notes to {}", count, path.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
