use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use be8_rs::disasm::listing;
use be8_rs::Assembler;
use be8_tools::load_source;

#[derive(Parser, Debug)]
#[command(author, version, about = "BE-8 assembler")]
struct Opts {
    /// Input assembly file (instructions and labels, `;` comments); stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output image (16 bytes); hex is printed to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the parsed labels and instructions
    #[arg(long)]
    listing: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let src = load_source(opts.input.as_deref())?;
    let asm = Assembler::default();

    let program = asm.parse(&src)?;
    if opts.listing {
        print!("{}", listing(&program, asm.table()));
    }
    let out = program.encode()?;
    match &opts.output {
        Some(path) => fs::write(path, out.image)?,
        None => println!("{}", out),
    }
    Ok(())
}
