use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use be8_rs::disasm::disassemble;
use be8_rs::OpcodeTable;
use be8_tools::{analyze, load_image, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "BE-8 disassembler CLI", long_about = None)]
struct Cli {
    /// Input image (at most 16 bytes)
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Show instruction bytes
    #[arg(long)]
    show_bytes: bool,
    /// Append a control-flow analysis from address 0
    #[arg(long)]
    analyze: bool,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, serde::Serialize)]
struct LineOut { addr: u8, byte: u8, text: String }

#[derive(Debug, Clone, serde::Serialize)]
struct ListingOut { lines: Vec<LineOut>, analysis: Option<Report> }

fn render_text(listing: &ListingOut, show_bytes: bool) -> String {
    let mut s = String::new();
    for l in &listing.lines {
        if show_bytes {
            s.push_str(&format!("{:x}: {:02x}  {}\n", l.addr, l.byte, l.text));
        } else {
            s.push_str(&format!("{:x}: {}\n", l.addr, l.text));
        }
    }
    if let Some(r) = &listing.analysis {
        s.push_str("\n; reachable:");
        for a in &r.reachable { s.push_str(&format!(" {:x}", a)); }
        s.push('\n');
        for e in &r.edges { s.push_str(&format!("; {:x} -> {:x} ({:?})\n", e.from, e.to, e.kind)); }
        if !r.invalid.is_empty() {
            s.push_str(&format!("; invalid opcodes at {:x?}\n", r.invalid));
        }
        if !r.can_halt() {
            s.push_str("; warning: no reachable HLT, program only stops on step budget\n");
        }
    }
    s
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let table = OpcodeTable::default();
    let img = load_image(&cli.input)?;

    let lines = disassemble(&img, &table)
        .into_iter()
        .zip(img.iter())
        .enumerate()
        .map(|(addr, (text, &byte))| LineOut { addr: addr as u8, byte, text })
        .collect();
    let analysis = cli.analyze.then(|| analyze(&img, &table));
    let listing = ListingOut { lines, analysis };

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&listing, cli.show_bytes),
        OutputFormat::Json => serde_json::to_string_pretty(&listing)?,
    };
    match &cli.out {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}
