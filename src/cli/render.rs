//! `mapsmith render`: flatten a map into a viewable image

use std::path::Path;
use std::process::ExitCode;

use crate::map_io::{load_map, render_map, RenderOptions};
use crate::output::{generate_output_path, save_png, scale_image};

use super::{Context, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the render command
pub(crate) fn run_render(
    context: &Context,
    map: &Path,
    output: Option<&Path>,
    scale: u32,
) -> ExitCode {
    let cell_size = context.config.editor.cell_size;

    let (grid, _warnings) = match load_map(&context.catalog, map) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let sprites = context.sprites();
    let teams = context.config.teams.palette();
    let options = RenderOptions { sprites: sprites.as_ref(), teams: &teams, cell_size };
    let image = match render_map(&grid, &context.catalog, &options) {
        Ok(image) => scale_image(image, scale),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let target = generate_output_path(map, "render", output);
    if let Err(e) = save_png(&image, &target) {
        eprintln!("Error: Failed to save '{}': {}", target.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    eprintln!("Wrote: {} ({}x{})", target.display(), image.width(), image.height());
    ExitCode::from(EXIT_SUCCESS)
}
