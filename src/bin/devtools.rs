//! Local developer convenience: generates a plausible responder catalogue
//! file, the same shape `generate_rescuer_conf` produced for testing the
//! original scheduler. Not load-bearing for scheduler correctness.

use std::fs;

use clap::{Parser, Subcommand};
use dispatch_core::config::emit_responder_types;
use dispatch_core::model::{ResponderType, ResponderTypeId};

#[derive(Parser, Debug)]
#[command(name = "devtools", about = "Developer utilities for the dispatch scheduler")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes a synthetic responder-type catalogue to `path`.
    GenConfig {
        path: String,
        #[arg(long, default_value_t = 3)]
        types: u32,
        #[arg(long, default_value_t = 5)]
        fleet_size: u32,
        #[arg(long, default_value_t = 3)]
        speed: u32,
    },
}

const NAMES: &[&str] = &["Ambulanza", "Pompieri", "Polizia", "Soccorso", "Elicottero"];

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    match args.command {
        Command::GenConfig {
            path,
            types,
            fleet_size,
            speed,
        } => gen_config(&path, types, fleet_size, speed)?,
    }
    Ok(())
}

fn gen_config(path: &str, types: u32, fleet_size: u32, speed: u32) -> anyhow::Result<()> {
    let catalogue: Vec<ResponderType> = (0..types)
        .map(|i| ResponderType {
            id: ResponderTypeId(i),
            name: NAMES[(i as usize) % NAMES.len()].to_string(),
            speed,
            base: (0, 0),
            fleet_size,
        })
        .collect();

    let contents = emit_responder_types(&catalogue);
    fs::write(path, contents)?;
    println!("wrote {} responder types to {path}", catalogue.len());
    Ok(())
}
