mod file_io;
mod preferences;
mod replay;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use abdraw_core::{Document, ShapeType};
use abdraw_session::Session;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use preferences::Preferences;

/// Headless tooling for abDraw diagram documents
#[derive(Parser, Debug)]
#[command(name = "abdraw")]
#[command(version, about, long_about = None)]
struct Args {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a document and print a summary
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Re-save a document in canonical form
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (stdout when omitted)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
    /// Feed recorded input events through an editing session
    Replay {
        /// JSON array of input events and tool switches
        #[arg(long, value_name = "EVENTS")]
        events: PathBuf,

        /// Document to start from (empty when omitted)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output path (stdout when omitted)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Preferences file to use instead of the one in the config directory
        #[arg(long, value_name = "PATH")]
        preferences: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Check { file } => check(&file),
        Command::Normalize { file, output } => {
            let doc = file_io::load_document(&file)?;
            file_io::write_document(&doc, output.as_deref())
        }
        Command::Replay {
            events,
            input,
            output,
            preferences,
        } => {
            let prefs = match preferences {
                Some(path) => Preferences::load_from(&path),
                None => Preferences::load(),
            };
            let doc = replay_file(&events, input.as_deref(), prefs)?;
            file_io::write_document(&doc, output.as_deref())
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `abdraw=info`)
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "abdraw=debug,abdraw_core=debug,abdraw_session=debug"
    } else {
        "abdraw=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn check(file: &Path) -> Result<()> {
    let doc = file_io::load_document(file)?;
    print!("{}", summarize(&doc));
    Ok(())
}

/// Shape counts per type and grid settings
fn summarize(doc: &Document) -> String {
    let mut counts: BTreeMap<ShapeType, usize> = BTreeMap::new();
    for shape in doc.iter() {
        *counts.entry(shape.shape_type()).or_default() += 1;
    }
    let grid = doc.grid();
    let mut out = format!("{} shapes\n", doc.len());
    for (shape_type, count) in counts {
        out.push_str(&format!("  {shape_type}: {count}\n"));
    }
    out.push_str(&format!(
        "grid: {} {}px, snap {}, {}\n",
        grid.kind.name(),
        grid.spacing,
        if grid.snap { "on" } else { "off" },
        if grid.visible { "visible" } else { "hidden" },
    ));
    out
}

fn replay_file(events: &Path, input: Option<&Path>, prefs: Preferences) -> Result<Document> {
    let mut config = prefs.into_config();
    let mut session = match input {
        Some(path) => Session::open(&mut config, file_io::load_document(path)?),
        None => Session::new(&config),
    };
    let script = fs::read_to_string(events)
        .with_context(|| format!("Failed to read {}", events.display()))?;
    let steps = replay::parse_steps(&script)?;
    let summary = replay::run(&mut session, &mut config, &steps);
    info!(
        events = summary.events,
        committed = summary.committed,
        undone = summary.undone,
        redone = summary.redone,
        cancelled = summary.cancelled,
        shapes = session.document().len(),
        "replay finished"
    );
    Ok(session.document().clone())
}
