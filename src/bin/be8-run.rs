use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use be8_rs::memory::image_from_slice;
use be8_rs::{assemble, Cpu, RunConfig, RunOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a BE-8 program on the be8-rs interpreter")]
struct Opts {
    /// Treat the input as assembly source instead of a raw image
    #[arg(long)]
    asm: bool,
    /// Step budget; overrides the config file
    #[arg(long)]
    max_steps: Option<u64>,
    /// JSON run configuration ({ "max_steps": N })
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Dump the final machine state as JSON
    #[arg(long)]
    json: bool,
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let mut cfg = match &opts.config {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<RunConfig>(&txt)?
        }
        None => RunConfig::default(),
    };
    if let Some(n) = opts.max_steps {
        cfg.max_steps = n;
    }

    let is_source = opts.asm || opts.input.extension().is_some_and(|e| e == "asm");
    let image = if is_source {
        let src = std::fs::read_to_string(&opts.input)
            .with_context(|| format!("reading {}", opts.input.display()))?;
        assemble(&src)?.image
    } else {
        let bytes = std::fs::read(&opts.input)?;
        match image_from_slice(&bytes) {
            Some(img) => img,
            None => bail!("image is {} bytes, at most 16 allowed", bytes.len()),
        }
    };

    let mut cpu = Cpu::with_image(&image);
    let outcome = cpu.run(cfg.max_steps)?;

    if opts.json {
        let report = serde_json::json!({ "outcome": outcome, "cpu": cpu });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("OUT() value: {}", cpu.out);
        if let RunOutcome::StepBudgetExhausted { steps } = outcome {
            eprintln!("stopped after {steps} steps without reaching HLT");
        }
    }

    if !outcome.halted() {
        std::process::exit(2);
    }
    Ok(())
}
