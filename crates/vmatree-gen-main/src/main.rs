// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::{
    error::Error,
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vmatree_gen_model::{
    emit::{CallWriter, Emitter, JsonLinesWriter},
    err::EmitError,
    generator::{GeneratorConfig, GeneratorConfigBuilder, RunStats, StimulusGenerator},
    oracle::UnboundedTopDown,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
enum Format {
    /// C statements for the kernel test harness.
    C,
    /// One JSON object per call.
    Jsonl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TopDownPolicy {
    NoMatch,
    AddressSpaceEnd,
}

impl From<TopDownPolicy> for UnboundedTopDown {
    fn from(policy: TopDownPolicy) -> Self {
        match policy {
            TopDownPolicy::NoMatch => UnboundedTopDown::NoMatch,
            TopDownPolicy::AddressSpaceEnd => UnboundedTopDown::AddressSpaceEnd,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vmatree-gen")]
#[command(about = "Generate randomized VMA tree test cases with their expected results")]
#[command(version)]
struct Args {
    /// Seed of the run; a random one is drawn and logged if omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = Format::C)]
    format: Format,

    /// Where to write the stimuli (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON run report to this path.
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// How top-down searches without an upper bound are answered.
    #[arg(long, value_enum, default_value_t = TopDownPolicy::NoMatch)]
    unbounded_topdown: TopDownPolicy,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    seed: u64,
    format: Format,
    config: String,
    stats: &'a RunStats,
}

// Logs go to stderr so they never mix with stimuli on stdout.
fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn generate<E>(config: GeneratorConfig, mut emitter: E) -> Result<RunStats, EmitError>
where
    E: Emitter<u64, Error = EmitError>,
{
    let mut generator = StimulusGenerator::new(config);
    generator.run(&mut emitter)
}

fn main() -> Result<(), Box<dyn Error>> {
    enable_tracing();
    let args = Args::parse();

    let builder = GeneratorConfigBuilder::new().unbounded_top_down(args.unbounded_topdown.into());
    let builder = match args.seed {
        Some(seed) => builder.seed(seed),
        None => builder.random_seed(),
    };
    let config = builder.build()?;
    info!(seed = config.seed(), format = ?args.format, "Starting generation");
    let described = config.to_string();
    let seed = config.seed();

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let sink = BufWriter::new(sink);
    let stats = match args.format {
        Format::C => generate(config, CallWriter::new(sink))?,
        Format::Jsonl => generate(config, JsonLinesWriter::new(sink))?,
    };

    if let Some(path) = &args.report {
        let report = RunReport {
            seed,
            format: args.format,
            config: described,
            stats: &stats,
        };
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %path.display(), "Wrote run report");
    }
    Ok(())
}
