//! Map persistence: the color-coded PNG format and flattened renders.
//!
//! A saved map is one pixel per cell. Each pixel's color (read as ARGB) is a
//! key into the catalog's color table. Unoccupied cells hold the sky color.
//! Everything that cannot be encoded or decoded is skipped and reported as a
//! [`Warning`]; only file-level failures are errors.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use thiserror::Error;

use crate::catalog::ItemCatalog;
use crate::color::Argb;
use crate::grid::{Grid, GridSize};
use crate::models::{GridPos, Item, Warning};
use crate::output::{save_png, OutputError};
use crate::sprites::SpriteStore;
use crate::team::TeamPalette;

/// Error type for map file operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapIoError {
    /// The map file does not exist
    #[error("Map file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file exists but could not be read as an image
    #[error("Failed to read map '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Writing the image failed
    #[error("Failed to write map: {0}")]
    Output(#[from] OutputError),
    /// The rendered canvas would not fit in a `u32` image dimension
    #[error("Render of {width}x{height} cells at {cell_size}px per cell is too large")]
    RenderTooLarge { width: u32, height: u32, cell_size: u32 },
}

/// Serialize a grid to a color-coded image.
///
/// Cells whose item has no color for its rotation and team (even after the
/// symmetry fallback) are left as sky and reported.
pub fn encode_map(grid: &Grid, catalog: &ItemCatalog) -> (RgbaImage, Vec<Warning>) {
    let size = grid.size();
    let mut image = RgbaImage::from_pixel(size.width, size.height, catalog.sky_color().to_rgba());
    let mut warnings = Vec::new();

    for (pos, item) in grid.cells() {
        let Some(color) = catalog.codec().color_of(item) else {
            tracing::warn!(item = %item, %pos, "no color for item, cell skipped");
            warnings.push(Warning::new(format!(
                "Cell {} skipped: '{}' has no color for rotation {} team {}",
                pos,
                item.name(),
                item.rotation(),
                item.team()
            )));
            continue;
        };
        let target = size.clamp(pos.offset_by(item.offset()));
        image.put_pixel(target.x as u32, target.y as u32, color.to_rgba());
    }

    (image, warnings)
}

/// Deserialize a color-coded image into a grid.
///
/// Sky and fully transparent pixels are empty. Unknown colors are reported
/// once per distinct color. Tall items spanning several pixels collapse to
/// their lowest cell.
pub fn decode_map(image: &RgbaImage, catalog: &ItemCatalog) -> (Grid, Vec<Warning>) {
    let size = GridSize::new(image.width(), image.height());
    let sky = catalog.sky_color();
    let mut cells: HashMap<GridPos, Item> = HashMap::new();
    let mut unknown: HashSet<Argb> = HashSet::new();
    let mut warnings = Vec::new();

    for (x, y, pixel) in image.enumerate_pixels() {
        let color = Argb::from_rgba(*pixel);
        if color == sky || color.a == 0 {
            continue;
        }
        let Some(item) = catalog.codec().decode_pixel(color) else {
            if unknown.insert(color) {
                tracing::warn!(color = %color.to_hex(), x, y, "unknown map color");
                warnings.push(Warning::new(format!(
                    "Unknown color {} at ({}, {})",
                    color.to_hex(),
                    x,
                    y
                )));
            }
            continue;
        };
        if item.is_eraser() {
            continue;
        }
        let pos = size.clamp(GridPos::new(x as i32, y as i32).offset_back(item.offset()));
        cells.insert(pos, item);
    }

    collapse_tall_items(&mut cells);

    let mut grid = Grid::new(size);
    grid.resize(size, Some(cells));
    (grid, warnings)
}

/// Keep only the base (lowest) cell of each vertical run of a tall item.
fn collapse_tall_items(cells: &mut HashMap<GridPos, Item>) {
    let covered: Vec<GridPos> = cells
        .iter()
        .filter(|(pos, item)| {
            item.is_tall()
                && cells
                    .get(&GridPos::new(pos.x, pos.y + 1))
                    .is_some_and(|below| below.name() == item.name())
        })
        .map(|(pos, _)| *pos)
        .collect();

    for pos in covered {
        cells.remove(&pos);
    }
}

/// Write a grid to a PNG file.
pub fn save_map(grid: &Grid, catalog: &ItemCatalog, path: &Path) -> Result<Vec<Warning>, MapIoError> {
    let (image, warnings) = encode_map(grid, catalog);
    save_png(&image, path)?;
    tracing::info!(
        path = %path.display(),
        cells = grid.len(),
        skipped = warnings.len(),
        "map saved"
    );
    Ok(warnings)
}

/// Read a grid from a PNG file.
pub fn load_map(catalog: &ItemCatalog, path: &Path) -> Result<(Grid, Vec<Warning>), MapIoError> {
    if !path.exists() {
        return Err(MapIoError::NotFound(path.to_path_buf()));
    }
    let image = image::open(path)
        .map_err(|source| MapIoError::Image { path: path.to_path_buf(), source })?
        .to_rgba8();

    let (grid, warnings) = decode_map(&image, catalog);
    tracing::info!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        cells = grid.len(),
        "map loaded"
    );
    Ok((grid, warnings))
}

/// Options for [`render_map`].
#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    pub sprites: Option<&'a SpriteStore>,
    pub teams: &'a TeamPalette,
    /// Pixels per cell
    pub cell_size: u32,
}

/// Flatten a grid into a viewable image.
///
/// Items are painted in ascending z order, ties in row-major order. Each sprite
/// is team recolored and rotated, centered horizontally in its cell and
/// bottom-aligned so tall sprites extend upward. Items without a loaded sprite
/// are drawn as a solid block of their map color.
///
/// # Errors
///
/// Returns [`MapIoError::RenderTooLarge`] when the canvas dimensions overflow.
pub fn render_map(
    grid: &Grid,
    catalog: &ItemCatalog,
    options: &RenderOptions<'_>,
) -> Result<RgbaImage, MapIoError> {
    let cell = options.cell_size.max(1);
    let size = grid.size();
    let too_large =
        || MapIoError::RenderTooLarge { width: size.width, height: size.height, cell_size: cell };
    let canvas_width = size.width.checked_mul(cell).ok_or_else(too_large)?;
    let canvas_height = size.height.checked_mul(cell).ok_or_else(too_large)?;
    let mut canvas = RgbaImage::from_pixel(
        canvas_width,
        canvas_height,
        catalog.sky_color().with_alpha(255).to_rgba(),
    );

    let mut cells = grid.cells();
    cells.sort_by_key(|(_, item)| item.z());

    for (pos, item) in cells {
        let sprite = options
            .sprites
            .and_then(|sprites| sprites.pixmap(item, options.teams))
            .or_else(|| {
                catalog.codec().color_of(item).map(|color| {
                    RgbaImage::from_pixel(cell, cell, color.with_alpha(255).to_rgba())
                })
            });
        let Some(sprite) = sprite else {
            tracing::debug!(item = %item, %pos, "nothing to draw");
            continue;
        };

        let anchor = pos.offset_by(item.offset());
        let cell = cell as i64;
        let x = anchor.x as i64 * cell + (cell - sprite.width() as i64) / 2;
        let y = (anchor.y as i64 + 1) * cell - sprite.height() as i64;
        imageops::overlay(&mut canvas, &sprite, x, y);
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{load_catalog, CatalogOptions};
    use crate::models::{ItemKind, ItemProto, Offset, Rotation, SPECTATOR_TEAM};
    use image::Rgba;

    fn catalog() -> ItemCatalog {
        load_catalog(&CatalogOptions::default()).unwrap().0
    }

    fn place(grid: &mut Grid, catalog: &ItemCatalog, x: i32, y: i32, name: &str) {
        grid.set(GridPos::new(x, y), catalog.get_item_by_name(name).unwrap());
    }

    const SKY_RGBA: Rgba<u8> = Rgba([165, 189, 200, 255]);

    #[test]
    fn test_encode_single_tile() {
        let catalog = catalog();
        let mut grid = Grid::new(GridSize::new(10, 10));
        place(&mut grid, &catalog, 3, 4, "tile_ground");

        let (image, warnings) = encode_map(&grid, &catalog);
        assert!(warnings.is_empty());
        assert_eq!(image.dimensions(), (10, 10));
        assert_eq!(*image.get_pixel(3, 4), Rgba([132, 71, 21, 255]));
        for (x, y, pixel) in image.enumerate_pixels() {
            if (x, y) != (3, 4) {
                assert_eq!(*pixel, SKY_RGBA);
            }
        }
    }

    #[test]
    fn test_encode_skips_uncolored_items() {
        let catalog = catalog();
        let mut grid = Grid::new(GridSize::new(3, 1));
        place(&mut grid, &catalog, 0, 0, "moss");
        place(&mut grid, &catalog, 1, 0, "tile_stone");

        let (image, warnings) = encode_map(&grid, &catalog);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("moss"));
        assert_eq!(*image.get_pixel(0, 0), SKY_RGBA);
        assert_ne!(*image.get_pixel(1, 0), SKY_RGBA);
    }

    #[test]
    fn test_roundtrip_variants() {
        let catalog = catalog();
        let mut grid = Grid::new(GridSize::new(8, 8));
        place(&mut grid, &catalog, 0, 7, "tile_ground");
        grid.set(
            GridPos::new(1, 1),
            catalog.get_item_by_name("spikes").unwrap().with_rotation(Rotation::Deg270),
        );
        grid.set(
            GridPos::new(2, 2),
            catalog.get_item_by_name("ladder").unwrap().with_rotation(Rotation::Deg90),
        );
        grid.set(
            GridPos::new(3, 3),
            catalog
                .get_item_by_name("wooden_door")
                .unwrap()
                .with_rotation(Rotation::Deg180)
                .with_team(4),
        );
        grid.set(GridPos::new(4, 4), catalog.get_item_by_name("main_spawn").unwrap().with_team(1));
        place(&mut grid, &catalog, 5, 5, "hall");

        let (image, warnings) = encode_map(&grid, &catalog);
        assert!(warnings.is_empty());
        let (decoded, warnings) = decode_map(&image, &catalog);
        assert!(warnings.is_empty());
        assert_eq!(decoded, grid);

        let hall = decoded.get(GridPos::new(5, 5)).unwrap();
        assert_eq!(hall.team(), SPECTATOR_TEAM);
    }

    #[test]
    fn test_offset_is_applied_and_reversed() {
        let catalog = catalog();
        let mut grid = Grid::new(GridSize::new(4, 4));
        place(&mut grid, &catalog, 2, 3, "hall");

        let (image, _) = encode_map(&grid, &catalog);
        assert_eq!(*image.get_pixel(2, 3), SKY_RGBA);
        assert_ne!(*image.get_pixel(2, 2), SKY_RGBA);

        let (decoded, _) = decode_map(&image, &catalog);
        assert_eq!(decoded.get(GridPos::new(2, 3)).unwrap().name(), "hall");
    }

    #[test]
    fn test_symmetric_rotation_decodes_to_base() {
        let catalog = catalog();
        let mut grid = Grid::new(GridSize::new(2, 1));
        grid.set(
            GridPos::new(0, 0),
            catalog.get_item_by_name("platform").unwrap().with_rotation(Rotation::Deg180),
        );
        let (image, warnings) = encode_map(&grid, &catalog);
        assert!(warnings.is_empty());
        let (decoded, _) = decode_map(&image, &catalog);
        assert_eq!(decoded.get(GridPos::new(0, 0)).unwrap().rotation(), Rotation::Deg0);
    }

    #[test]
    fn test_unknown_colors_reported_once() {
        let catalog = catalog();
        let mut image = RgbaImage::from_pixel(4, 1, SKY_RGBA);
        image.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        image.put_pixel(1, 0, Rgba([1, 2, 3, 255]));
        image.put_pixel(2, 0, Rgba([0, 0, 0, 0]));

        let (grid, warnings) = decode_map(&image, &catalog);
        assert!(grid.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("#FF010203"));
    }

    #[test]
    fn test_tall_items_collapse_to_base() {
        let catalog = catalog();
        let pine = catalog.codec().color_of(&catalog.get_item_by_name("tree_pine").unwrap()).unwrap();
        let mut image = RgbaImage::from_pixel(3, 5, SKY_RGBA);
        for y in 1..=4 {
            image.put_pixel(1, y, pine.to_rgba());
        }
        image.put_pixel(2, 4, pine.to_rgba());

        let (grid, _) = decode_map(&image, &catalog);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.get(GridPos::new(1, 4)).unwrap().name(), "tree_pine");
        assert!(grid.get(GridPos::new(2, 4)).is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let catalog = catalog();
        let err = load_map(&catalog, Path::new("/nonexistent/mapsmith/map.png")).unwrap_err();
        assert!(matches!(err, MapIoError::NotFound(_)));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        let catalog = catalog();
        let mut grid = Grid::new(GridSize::new(5, 3));
        place(&mut grid, &catalog, 0, 2, "tile_ground");
        place(&mut grid, &catalog, 4, 0, "chest");

        save_map(&grid, &catalog, &path).unwrap();
        let (loaded, warnings) = load_map(&catalog, &path).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(loaded, grid);
    }

    #[test]
    fn test_encode_extreme_offset_is_clamped() {
        let mut far = ItemProto::new(ItemKind::Tile, "far").with_color(
            Rotation::Deg0,
            0,
            Argb::new(255, 1, 2, 3),
        );
        far.offset = Offset::new(i32::MAX, i32::MIN);
        let (catalog, _) = ItemCatalog::from_protos(vec![far]);
        let mut grid = Grid::new(GridSize::new(4, 3));
        place(&mut grid, &catalog, 2, 1, "far");

        let (image, warnings) = encode_map(&grid, &catalog);
        assert!(warnings.is_empty());
        assert_eq!(*image.get_pixel(3, 0), Rgba([1, 2, 3, 255]));

        let (decoded, _) = decode_map(&image, &catalog);
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_render_solid_blocks() {
        let catalog = catalog();
        let mut grid = Grid::new(GridSize::new(3, 2));
        place(&mut grid, &catalog, 1, 1, "tile_ground");
        let teams = TeamPalette::default();
        let options = RenderOptions { sprites: None, teams: &teams, cell_size: 4 };

        let image = render_map(&grid, &catalog, &options).unwrap();
        assert_eq!(image.dimensions(), (12, 8));
        assert_eq!(*image.get_pixel(0, 0), SKY_RGBA);
        assert_eq!(*image.get_pixel(4, 4), Rgba([132, 71, 21, 255]));
        assert_eq!(*image.get_pixel(7, 7), Rgba([132, 71, 21, 255]));
        assert_eq!(*image.get_pixel(8, 7), SKY_RGBA);
    }

    #[test]
    fn test_render_tall_sprite_bottom_aligned() {
        let catalog = catalog();
        let mut sprites = SpriteStore::new();
        sprites.insert("blobs/tree_pine.png", RgbaImage::from_pixel(2, 8, Rgba([0, 255, 0, 255])));
        let mut grid = Grid::new(GridSize::new(2, 3));
        place(&mut grid, &catalog, 0, 2, "tree_pine");

        let teams = TeamPalette::default();
        let options = RenderOptions { sprites: Some(&sprites), teams: &teams, cell_size: 4 };
        let image = render_map(&grid, &catalog, &options).unwrap();

        // Centered in the 4px cell, spanning two cells upward from the base.
        assert_eq!(*image.get_pixel(1, 11), Rgba([0, 255, 0, 255]));
        assert_eq!(*image.get_pixel(2, 4), Rgba([0, 255, 0, 255]));
        assert_eq!(*image.get_pixel(0, 11), SKY_RGBA);
        assert_eq!(*image.get_pixel(1, 3), SKY_RGBA);
    }

    #[test]
    fn test_render_overflowing_canvas_is_an_error() {
        let catalog = catalog();
        let grid = Grid::new(GridSize::new(u32::MAX / 2, 1));
        let teams = TeamPalette::default();
        let options = RenderOptions { sprites: None, teams: &teams, cell_size: 4 };

        let err = render_map(&grid, &catalog, &options).unwrap_err();
        assert!(matches!(err, MapIoError::RenderTooLarge { cell_size: 4, .. }));
    }
}
