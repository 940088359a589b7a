//! `mapsmith palette`: dump the color table

use serde::Serialize;
use std::process::ExitCode;

use super::{Context, EXIT_ERROR, EXIT_SUCCESS};

/// One row of the color table.
#[derive(Debug, Serialize)]
struct PaletteEntry<'a> {
    color: String,
    name: &'a str,
    kind: String,
    rotation: u16,
    team: u8,
}

/// Execute the palette command
pub(crate) fn run_palette(context: &Context, json: bool) -> ExitCode {
    let entries: Vec<PaletteEntry<'_>> = context
        .catalog
        .codec()
        .entries()
        .map(|(color, item)| PaletteEntry {
            color: color.to_hex(),
            name: item.name(),
            kind: item.kind().to_string(),
            rotation: item.rotation().degrees(),
            team: item.team(),
        })
        .collect();

    if json {
        match serde_json::to_string_pretty(&entries) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    let width = entries.iter().map(|entry| entry.name.len()).max().unwrap_or(0);
    for entry in &entries {
        println!(
            "{}  {:<width$}  {:>3}  {}",
            entry.color,
            entry.name,
            entry.rotation,
            entry.team,
            width = width
        );
    }
    println!();
    println!("{} colors, {} items", entries.len(), context.catalog.len());

    ExitCode::from(EXIT_SUCCESS)
}
