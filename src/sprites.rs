//! Sprite image cache
//!
//! Loads every sprite asset the catalog declares, once, from an assets
//! directory. A missing or undecodable asset is logged and remembered; items
//! that depend on it cannot be placed.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use image::imageops;
use image::RgbaImage;

use crate::catalog::ItemCatalog;
use crate::models::{Item, Rotation, Warning};
use crate::team::TeamPalette;

/// Decoded sprite images keyed by asset path.
#[derive(Debug, Clone, Default)]
pub struct SpriteStore {
    images: HashMap<String, Arc<RgbaImage>>,
    missing: BTreeSet<String>,
}

impl SpriteStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every image referenced by the catalog.
    pub fn load(catalog: &ItemCatalog, root: &Path) -> (Self, Vec<Warning>) {
        let mut store = SpriteStore::new();
        let mut warnings = Vec::new();

        for proto in catalog.protos() {
            let Some(image_ref) = &proto.image else {
                continue;
            };
            if store.images.contains_key(image_ref) || store.missing.contains(image_ref) {
                continue;
            }

            let path = root.join(image_ref);
            match image::open(&path) {
                Ok(img) => {
                    store.images.insert(image_ref.clone(), Arc::new(img.to_rgba8()));
                }
                Err(e) => {
                    tracing::warn!(item = %proto.name, path = %path.display(), "missing sprite: {}", e);
                    warnings.push(Warning::new(format!(
                        "Sprite '{}' for item '{}' could not be loaded: {}",
                        path.display(),
                        proto.name,
                        e
                    )));
                    store.missing.insert(image_ref.clone());
                }
            }
        }

        tracing::info!(
            loaded = store.images.len(),
            missing = store.missing.len(),
            root = %root.display(),
            "sprites loaded"
        );
        (store, warnings)
    }

    /// Register an already decoded image.
    pub fn insert(&mut self, image_ref: impl Into<String>, image: RgbaImage) {
        let image_ref = image_ref.into();
        self.missing.remove(&image_ref);
        self.images.insert(image_ref, Arc::new(image));
    }

    /// Whether an item can be drawn: it declares no asset, or its asset loaded.
    pub fn is_resolvable(&self, item: &Item) -> bool {
        match &item.proto().image {
            Some(image_ref) => self.images.contains_key(image_ref),
            None => true,
        }
    }

    /// The undecorated sprite for an item.
    pub fn base(&self, item: &Item) -> Option<&RgbaImage> {
        let image_ref = item.proto().image.as_ref()?;
        self.images.get(image_ref).map(Arc::as_ref)
    }

    /// The sprite as it appears on the map: team recolored, then rotated clockwise.
    pub fn pixmap(&self, item: &Item, teams: &TeamPalette) -> Option<RgbaImage> {
        let base = self.base(item)?;
        let colored = if item.is_team_swappable() {
            teams.recolor(base, item.team())
        } else {
            base.clone()
        };
        Some(rotate(&colored, item.rotation()))
    }

    /// Asset paths that failed to load.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.missing.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Rotate a sprite clockwise.
pub fn rotate(image: &RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::Deg0 => image.clone(),
        Rotation::Deg90 => imageops::rotate90(image),
        Rotation::Deg180 => imageops::rotate180(image),
        Rotation::Deg270 => imageops::rotate270(image),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemKind, ItemProto};
    use image::Rgba;
    use tempfile::TempDir;

    fn catalog_with_images() -> ItemCatalog {
        let mut ground = ItemProto::new(ItemKind::Tile, "tile_ground");
        ground.image = Some("ground.png".to_string());
        let mut bush = ItemProto::new(ItemKind::Blob, "bush");
        bush.image = Some("bush.png".to_string());
        let sky = ItemProto::new(ItemKind::Tile, "sky");
        ItemCatalog::from_protos(vec![ground, bush, sky]).0
    }

    #[test]
    fn test_load_reports_missing_assets() {
        let temp = TempDir::new().expect("should create temp dir");
        RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]))
            .save(temp.path().join("ground.png"))
            .expect("should write sprite");

        let catalog = catalog_with_images();
        let (store, warnings) = SpriteStore::load(&catalog, temp.path());

        assert_eq!(store.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("bush"));
        assert_eq!(store.missing().collect::<Vec<_>>(), vec!["bush.png"]);

        let ground = catalog.get_item_by_name("tile_ground").unwrap();
        let bush = catalog.get_item_by_name("bush").unwrap();
        let sky = catalog.get_item_by_name("sky").unwrap();
        assert!(store.is_resolvable(&ground));
        assert!(!store.is_resolvable(&bush));
        assert!(store.is_resolvable(&sky));
    }

    #[test]
    fn test_insert_clears_missing() {
        let catalog = catalog_with_images();
        let (mut store, _) = SpriteStore::load(&catalog, Path::new("/nonexistent/mapsmith"));
        let bush = catalog.get_item_by_name("bush").unwrap();
        assert!(!store.is_resolvable(&bush));

        store.insert("bush.png", RgbaImage::new(4, 4));
        assert!(store.is_resolvable(&bush));
        assert_eq!(store.missing().count(), 1);
    }

    #[test]
    fn test_pixmap_rotates() {
        let mut proto = ItemProto::new(ItemKind::Blob, "spikes");
        proto.image = Some("spikes.png".to_string());
        proto.rotatable = true;
        let catalog = ItemCatalog::from_protos(vec![proto]).0;

        let mut store = SpriteStore::new();
        store.insert("spikes.png", RgbaImage::new(2, 6));

        let item = catalog.get_item_by_name("spikes").unwrap().with_rotation(Rotation::Deg90);
        let pixmap = store.pixmap(&item, &TeamPalette::default()).unwrap();
        assert_eq!(pixmap.dimensions(), (6, 2));
    }
}
