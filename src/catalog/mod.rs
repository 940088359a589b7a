//! Item catalog: every placeable item, looked up by name or by map color.
//!
//! A catalog is built once from vanilla and mod definitions and is immutable
//! afterwards; share it behind an `Arc`. Load order is significant: for both
//! name and color lookups the first loaded entry wins, so vanilla definitions
//! are canonical and later mods with the same name are shadowed.

mod loader;
pub mod schema;

use std::collections::HashMap;
use std::sync::Arc;

pub use loader::{
    find_mod_files, load_catalog, load_item_file, parse_item_file, vanilla_items, CatalogError,
    CatalogOptions, VANILLA_ITEMS,
};

use crate::codec::ColorCodec;
use crate::color::Argb;
use crate::models::{Item, ItemKind, ItemProto, Rotation, Warning, NEUTRAL_TEAM, SKY};

/// Sky color used when the catalog has no `sky` entry.
pub const DEFAULT_SKY_COLOR: Argb = Argb::from_u32(0xFFA5BDC8);

/// Immutable registry of placeable items.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    items: Vec<Arc<ItemProto>>,
    by_name: HashMap<String, usize>,
    codec: ColorCodec,
}

impl ItemCatalog {
    /// Build a catalog from prototypes in load order.
    ///
    /// Returns warnings for shadowed duplicate names.
    pub fn from_protos(protos: Vec<ItemProto>) -> (Self, Vec<Warning>) {
        let mut warnings = Vec::new();
        let items: Vec<Arc<ItemProto>> = protos.into_iter().map(Arc::new).collect();

        let mut by_name = HashMap::with_capacity(items.len());
        for (index, proto) in items.iter().enumerate() {
            if by_name.contains_key(&proto.name) {
                tracing::warn!(name = %proto.name, "duplicate item name, first definition wins");
                warnings.push(Warning::new(format!(
                    "Item '{}' is defined more than once, keeping the first definition",
                    proto.name
                )));
            } else {
                by_name.insert(proto.name.clone(), index);
            }
        }

        let codec = ColorCodec::build(&items);
        (Self { items, by_name, codec }, warnings)
    }

    /// A fresh copy of the item with this name.
    pub fn get_item_by_name(&self, name: &str) -> Option<Item> {
        self.proto(name).map(|proto| Item::new(proto.clone()))
    }

    /// A fresh copy of the item encoded by this color, with its rotation and
    /// team applied.
    pub fn get_item_by_color(&self, color: Argb) -> Option<Item> {
        self.codec.item_by_color(color)
    }

    /// Whether an item with this name and kind exists.
    pub fn item_exists(&self, name: &str, kind: ItemKind) -> bool {
        self.proto(name).is_some_and(|proto| proto.kind == kind)
    }

    /// The shared prototype for a name.
    pub fn proto(&self, name: &str) -> Option<&Arc<ItemProto>> {
        self.by_name.get(name).map(|&index| &self.items[index])
    }

    /// The sky item, synthesized when the catalog does not define one.
    pub fn sky(&self) -> Item {
        self.get_item_by_name(SKY).unwrap_or_else(|| {
            let proto = ItemProto::new(ItemKind::Tile, SKY).with_color(
                Rotation::Deg0,
                NEUTRAL_TEAM,
                DEFAULT_SKY_COLOR,
            );
            Item::new(Arc::new(proto))
        })
    }

    /// Background color of saved maps.
    pub fn sky_color(&self) -> Argb {
        self.codec.color_of(&self.sky()).unwrap_or(DEFAULT_SKY_COLOR)
    }

    /// The color codec built from this catalog.
    pub fn codec(&self) -> &ColorCodec {
        &self.codec
    }

    /// All prototypes in load order, shadowed duplicates included.
    pub fn protos(&self) -> impl Iterator<Item = &Arc<ItemProto>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
