use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gradebook_extract::io::json_write;
use gradebook_extract::{Config, Result, ToolError, pipeline, report};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.root {
        Some(root) => Config::from_root(root),
        None => Config::default(),
    };

    match cli.command.unwrap_or(Command::Extract) {
        Command::Extract => pipeline::run(&config).map(|_| ()),
        Command::Student { name } => print_student(&config, &name),
    }
}

fn print_student(config: &Config, name: &str) -> Result<()> {
    if !config.output_file.exists() {
        return Err(ToolError::MissingInput(config.output_file.clone()));
    }
    let aggregate = json_write::read_aggregate(&config.output_file)?;
    let history = report::student_history(&aggregate, name);
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Collect per-class, per-subject mark sheets into one JSON document."
)]
struct Cli {
    /// Folder holding `Data/` and `.tmp/`; defaults to the tool's own folder.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse every workbook under `Data/` and write `.tmp/debug_data.json`.
    Extract,
    /// Print one student's results from the last extraction, oldest first.
    Student {
        /// Student name exactly as it appears in the sheets.
        name: String,
    },
}
