use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mixtask::{load_frames, run_mixed_event, run_same_event, TaskBudget, TaskConfig, TaskError};
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Pairs within one collision
    Same,
    /// Pairs across collisions of the same pool bin
    Mixed,
}

#[derive(Parser, Debug)]
#[command(name = "mixtask", version, about = "Two-particle correlations with event mixing")]
struct Args {
    /// JSON files with one data frame or an array of frames
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// JSON task configuration, defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Mode::Same)]
    mode: Mode,

    /// Worker threads, 0 for the rayon default
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Output JSON file, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), TaskError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .map_err(|e| TaskError::Config(format!("thread pool: {e}")))?;
    }

    let config = match &args.config {
        Some(path) => TaskConfig::from_json_file(path)?,
        None => TaskConfig::default(),
    };

    let mut frames = Vec::new();
    for path in &args.input {
        let loaded = load_frames(path)?;
        info!(path = %path.display(), frames = loaded.len(), "loaded input");
        frames.extend(loaded);
    }

    let mut budget = TaskBudget::new(config.df_max);
    let output = match args.mode {
        Mode::Same => run_same_event(&config, &mut budget, frames)?,
        Mode::Mixed => run_mixed_event(&config, &mut budget, frames)?,
    };

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &output)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &output)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
