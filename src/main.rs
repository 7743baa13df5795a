use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use impedance_sweep::config::SweepConfig;
use impedance_sweep::output::{resolve_output_path, write_table_file};
use impedance_sweep::{analyze, LogProgress, SampleStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sweep recording: `index,channelA,channelB` per line
    #[arg(short, long = "in")]
    input: PathBuf,

    /// Output CSV; a bare file name is written next to the input
    #[arg(short, long = "out", default_value = "out.csv")]
    output: PathBuf,

    /// JSON file with defaults for the settings below
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short = 's', long = "samplerate")]
    samples_per_second: Option<f64>,

    /// Reference resistor in ohms
    #[arg(short, long)]
    resistance: Option<f64>,

    #[arg(long = "minfrequency", visible_alias = "f1")]
    min_frequency: Option<f64>,

    #[arg(long = "maxfrequency", visible_alias = "f2")]
    max_frequency: Option<f64>,

    /// Lines to skip at the top of the input
    #[arg(long = "header")]
    header_lines: Option<usize>,

    /// Batches processed in parallel (default: half the hardware threads)
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<(SweepConfig, PathBuf, PathBuf)> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SweepConfig::default(),
        };

        if let Some(v) = self.samples_per_second { config.samples_per_second = v; }
        if let Some(v) = self.resistance { config.resistance = v; }
        if let Some(v) = self.min_frequency { config.min_frequency = v; }
        if let Some(v) = self.max_frequency { config.max_frequency = v; }
        if let Some(v) = self.header_lines { config.header_lines = v; }
        if let Some(v) = self.threads { config.threads = v; }

        Ok((config, self.input, self.output))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if args.verbose { "debug" } else { "info" },
    ))
    .format_timestamp(None)
    .init();

    let started = Instant::now();
    let (config, input, output) = args.into_config()?;
    config.validate()?;

    if !input.is_file() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }
    let output = resolve_output_path(&input, &output);

    let store = SampleStore::open(&input, config.header_lines)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let table = analyze(&store, &config, &LogProgress)?;

    info!("Frequencies: {}", table.len());
    if let (Some(first), Some(last)) = (table.first(), table.last()) {
        info!("First: {}Ω @ {}Hz", first.impedance, first.frequency);
        info!("Last: {}Ω @ {}Hz", last.impedance, last.frequency);
    }

    write_table_file(&output, &table)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {}", output.display());

    let elapsed = started.elapsed();
    info!("Completed in {}m {:.2}s", elapsed.as_secs() / 60, elapsed.as_secs_f64() % 60.0);
    Ok(())
}
