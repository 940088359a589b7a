//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod info;
mod paint;
mod palette;
mod render;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::catalog::{load_catalog, CatalogOptions, ItemCatalog};
use crate::config::{load_config, merge_cli_overrides, CliOverrides, MapsmithConfig, MAX_CELL_SIZE};
use crate::sprites::SpriteStore;

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Mapsmith - Edit color-coded PNG game maps
#[derive(Parser)]
#[command(name = "mapsmith")]
#[command(about = "Mapsmith - Inspect, render and edit color-coded PNG game maps")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: discover mapsmith.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sprite asset directory
    #[arg(long, global = true)]
    pub assets: Option<PathBuf>,

    /// Mod item directory
    #[arg(long, global = true)]
    pub mods: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show map dimensions and item counts
    Info {
        /// Map image
        map: PathBuf,
    },

    /// Print the color table: every encodable item variant in load order
    Palette {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a map with its sprites to a viewable PNG
    Render {
        /// Map image
        map: PathBuf,

        /// Output file or directory.
        /// If omitted: {map}_render.png
        /// If directory (ends with /): dir/{map}_render.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-64, default: 1)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=64))]
        scale: u32,

        /// Pixels per cell (1-256, default: editor.cell_size)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_CELL_SIZE as i64))]
        cell_size: Option<u32>,
    },

    /// Apply edits to a map: sets, then lines, then erases
    Paint {
        /// Map image to edit
        map: PathBuf,

        /// Start from an empty map of this size instead of loading: WxH (e.g. --new 40x30)
        #[arg(long, value_name = "WxH")]
        new: Option<String>,

        /// Place an item: x,y=name[@rotation][:team] (e.g. --set 3,4=ladder@90 --set 5,2=tent:1)
        #[arg(long, value_name = "X,Y=NAME[@ROT][:TEAM]")]
        set: Vec<String>,

        /// Erase the cell at x,y (e.g. --erase 5,10)
        #[arg(long, value_name = "X,Y")]
        erase: Vec<String>,

        /// Paint a line between two cells: x0,y0,x1,y1=name (e.g. --line 0,9,39,9=tile_ground)
        #[arg(long, value_name = "X0,Y0,X1,Y1=NAME")]
        line: Vec<String>,

        /// Mirror every edit across the vertical center line
        #[arg(long)]
        mirror: bool,

        /// Output file (default: overwrite the map)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Install the stderr log subscriber. `RUST_LOG` wins unless `-v` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Configuration and catalog shared by every command.
pub(crate) struct Context {
    pub config: MapsmithConfig,
    pub catalog: Arc<ItemCatalog>,
}

impl Context {
    fn load(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self, ExitCode> {
        let mut config = load_config(config_path).map_err(|e| {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        })?;
        merge_cli_overrides(&mut config, overrides);

        let options = CatalogOptions {
            include_vanilla: config.catalog.include_vanilla,
            mods_dir: Some(config.catalog.mods.clone()),
        };
        let (catalog, _warnings) = load_catalog(&options).map_err(|e| {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        })?;

        Ok(Self { config, catalog: Arc::new(catalog) })
    }

    /// Sprite assets, when the configured directory exists.
    pub fn sprites(&self) -> Option<SpriteStore> {
        let root = &self.config.catalog.assets;
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "no asset directory, sprites disabled");
            return None;
        }
        let (store, _warnings) = SpriteStore::load(&self.catalog, root);
        Some(store)
    }
}

/// Entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (cell_size, mirror_x) = match &cli.command {
        Commands::Render { cell_size, .. } => (*cell_size, None),
        Commands::Paint { mirror, .. } => (None, mirror.then_some(true)),
        _ => (None, None),
    };
    let overrides = CliOverrides { assets: cli.assets, mods: cli.mods, cell_size, mirror_x };
    let context = match Context::load(cli.config.as_deref(), &overrides) {
        Ok(context) => context,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Info { map } => info::run_info(&context, &map),
        Commands::Palette { json } => palette::run_palette(&context, json),
        Commands::Render { map, output, scale, .. } => {
            render::run_render(&context, &map, output.as_deref(), scale)
        }
        Commands::Paint { map, new, set, erase, line, output, dry_run, .. } => {
            paint::run_paint(
                &context,
                &paint::PaintArgs {
                    map: &map,
                    new: new.as_deref(),
                    set: &set,
                    erase: &erase,
                    line: &line,
                    output: output.as_deref(),
                    dry_run,
                },
            )
        }
    }
}
