//! Color codec: the bidirectional mapping between (item, rotation, team) and
//! map pixel colors.
//!
//! The lookup table is enumerated once from the catalog. Every item contributes
//! one entry per (rotation, team) pair its variant table declares. The first
//! item to claim a color keeps it and later claims are dropped, so catalog load
//! order defines precedence.

use std::collections::HashMap;
use std::sync::Arc;

use crate::color::Argb;
use crate::models::{AlphaEncoding, Item, ItemProto, Rotation, Team};

/// Precomputed color table for a catalog.
#[derive(Debug, Clone, Default)]
pub struct ColorCodec {
    by_color: HashMap<Argb, Item>,
    /// Colors in insertion order
    order: Vec<Argb>,
    /// RGB -> item for palette entries that pack team/angle into alpha
    packed: HashMap<[u8; 3], Item>,
}

impl ColorCodec {
    /// Enumerate every encodable variant of every item, in catalog order.
    pub fn build(items: &[Arc<ItemProto>]) -> Self {
        let mut codec = ColorCodec::default();

        for proto in items {
            let base = Item::new(proto.clone());
            for &rotation in proto.rotations() {
                for team in base.teams() {
                    let variant = base.clone().with_rotation(rotation).with_team(team);
                    let Some(color) = variant.color_variant(rotation, team) else {
                        continue;
                    };
                    codec.insert(color, variant);
                }
            }

            if proto.alpha.is_packed() {
                if let Some(&color) = proto.colors.values().next() {
                    codec.packed.entry([color.r, color.g, color.b]).or_insert_with(|| base.clone());
                }
            }
        }

        codec
    }

    fn insert(&mut self, color: Argb, item: Item) {
        if let Some(existing) = self.by_color.get(&color) {
            tracing::debug!(
                color = %color.to_hex(),
                kept = %existing,
                dropped = %item,
                "color already claimed"
            );
            return;
        }
        self.order.push(color);
        self.by_color.insert(color, item);
    }

    /// Color for an item at a given rotation and team.
    ///
    /// Tries the exact (rotation, team) variant first. With `use_symmetry`, a
    /// miss is retried at `rotation mod 180`. Returns `None` when the variant is
    /// not encodable.
    pub fn item_to_color(
        item: &Item,
        rotation: Rotation,
        team: Team,
        use_symmetry: bool,
    ) -> Option<Argb> {
        item.color_variant(rotation, team).or_else(|| {
            if use_symmetry {
                item.color_variant(rotation.symmetric(), team)
            } else {
                None
            }
        })
    }

    /// Color for an item at its own rotation and team, falling back to
    /// rotational symmetry.
    pub fn color_of(&self, item: &Item) -> Option<Argb> {
        Self::item_to_color(item, item.rotation(), item.team(), true)
    }

    /// Exact table lookup. The returned copy carries the variant's rotation and team.
    pub fn item_by_color(&self, color: Argb) -> Option<Item> {
        self.by_color.get(&color).cloned()
    }

    /// Decode a map pixel.
    ///
    /// Exact table hits are returned with their variant applied. Pixels whose
    /// alpha carries the packed marker fall back to an RGB-only lookup among
    /// alpha-packed items, and their team and angle are read from the alpha byte.
    pub fn decode_pixel(&self, color: Argb) -> Option<Item> {
        let mut item = match self.by_color.get(&color) {
            Some(item) => item.clone(),
            None if color.a & 0x80 != 0 => self.packed.get(&[color.r, color.g, color.b])?.clone(),
            None => return None,
        };
        apply_packed_alpha(&mut item, color.a);
        Some(item)
    }

    /// Table entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (Argb, &Item)> {
        self.order.iter().filter_map(move |color| self.by_color.get(color).map(|item| (*color, item)))
    }

    pub fn len(&self) -> usize {
        self.by_color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_color.is_empty()
    }
}

/// Apply team and angle packed into the alpha byte, for items that declare it.
fn apply_packed_alpha(item: &mut Item, alpha: u8) {
    let encoding = item.proto().alpha;
    if encoding.team && item.is_team_swappable() {
        item.set_team(AlphaEncoding::decode_team(alpha));
    }
    if encoding.angle && item.is_rotatable() {
        item.set_rotation(AlphaEncoding::decode_rotation(alpha));
    }
}
