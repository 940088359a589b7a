//! `mapsmith info`: summarize a map file

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use crate::map_io::load_map;

use super::{Context, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the info command
pub(crate) fn run_info(context: &Context, map: &Path) -> ExitCode {
    let (grid, warnings) = match load_map(&context.catalog, map) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, item) in grid.cells() {
        *counts.entry(item.name()).or_default() += 1;
    }

    println!("{}", map.display());
    println!("  Size:     {}x{} cells", grid.width(), grid.height());
    println!("  Occupied: {} of {}", grid.len(), grid.size().cell_count());

    if !counts.is_empty() {
        println!();
        println!("Items:");
        let width = counts.keys().map(|name| name.len()).max().unwrap_or(0);
        for (name, count) in &counts {
            println!("  {:<width$}  {}", name, count, width = width);
        }
    }

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &warnings {
            println!("  {}", warning);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
