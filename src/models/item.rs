//! Placeable items and their per-placement state.
//!
//! The immutable part of an item (name, sprite metadata, color variants, merge
//! rules) lives in an [`ItemProto`] shared through an `Arc`. An [`Item`] is a
//! cheap value that pairs the prototype with its own rotation and team, so
//! changing a placed item never touches the catalog entry or other placements.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::geometry::{Offset, Rotation};
use crate::color::Argb;

/// Team affiliation. 0..=6 are playable teams, 255 is the spectator team.
pub type Team = u8;

/// Neutral (blue) team.
pub const NEUTRAL_TEAM: Team = 0;

/// Spectator / no team.
pub const SPECTATOR_TEAM: Team = 255;

/// Every team a team-swappable item is enumerated over.
pub const TEAMS: [Team; 8] = [0, 1, 2, 3, 4, 5, 6, SPECTATOR_TEAM];

/// Names that act as the erase sentinel.
pub const ERASER_NAMES: [&str; 3] = ["sky", "tile_empty", ""];

/// Name of the background / empty item.
pub const SKY: &str = "sky";

/// Whether a team value is one of [`TEAMS`].
pub fn is_valid_team(team: Team) -> bool {
    team <= 6 || team == SPECTATOR_TEAM
}

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Terrain-layer item occupying one cell
    Tile,
    /// Entity-like item (creature, structure, decoration)
    Blob,
    /// Anything else (markers, spawns, water)
    Other,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Tile => write!(f, "tile"),
            ItemKind::Blob => write!(f, "blob"),
            ItemKind::Other => write!(f, "other"),
        }
    }
}

/// Lookup key into an item's color variant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey {
    pub rotation: Rotation,
    pub team: Team,
}

impl VariantKey {
    pub const fn new(rotation: Rotation, team: Team) -> Self {
        Self { rotation, team }
    }
}

/// Alpha-channel packing for palette entries that share one RGB value across
/// their team and/or rotation variants.
///
/// Packed alpha layout: `0x80 | angle_bits | team_bits` where
/// `team_bits = team & 0x0F` (teams above 7 become `0x0F`) and
/// `angle_bits = quarter_turns << 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlphaEncoding {
    #[serde(default)]
    pub team: bool,
    #[serde(default)]
    pub angle: bool,
}

impl AlphaEncoding {
    const MARKER: u8 = 0x80;
    const TEAM_MASK: u8 = 0x0F;
    const ANGLE_MASK: u8 = 0x30;

    pub fn is_packed(self) -> bool {
        self.team || self.angle
    }

    /// Alpha byte for a (rotation, team) pair.
    pub fn encode(self, rotation: Rotation, team: Team) -> u8 {
        let mut alpha = Self::MARKER;
        if self.team {
            alpha |= if team > 7 { Self::TEAM_MASK } else { team };
        }
        if self.angle {
            alpha |= rotation.quarter_turns() << 4;
        }
        alpha
    }

    /// Team packed in an alpha byte. Values above 7 mean spectator.
    pub fn decode_team(alpha: u8) -> Team {
        let team = alpha & Self::TEAM_MASK;
        if team > 7 {
            SPECTATOR_TEAM
        } else {
            team
        }
    }

    /// Rotation packed in an alpha byte.
    pub fn decode_rotation(alpha: u8) -> Rotation {
        Rotation::normalized(((alpha & Self::ANGLE_MASK) >> 4) as i32 * 90)
    }
}

/// Catalog entry: everything about an item that does not change per placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemProto {
    pub kind: ItemKind,
    /// Unique stable identifier
    pub name: String,
    pub display_name: String,
    pub section: String,
    /// Sprite asset path relative to the assets directory
    pub image: Option<String>,
    /// Draw order; higher paints later
    pub z: i32,
    pub rotatable: bool,
    pub team_swappable: bool,
    /// Team a fresh copy starts with
    pub default_team: Team,
    pub offset: Offset,
    /// Multi-cell vertical item anchored at its base (trees)
    pub tall: bool,
    pub colors: BTreeMap<VariantKey, Argb>,
    pub alpha: AlphaEncoding,
    /// Other item name -> resulting item name
    pub merges: HashMap<String, String>,
}

impl ItemProto {
    /// A prototype with defaults for every optional field.
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            display_name: name.clone(),
            name,
            section: String::new(),
            image: None,
            z: 0,
            rotatable: false,
            team_swappable: false,
            default_team: NEUTRAL_TEAM,
            offset: Offset::ZERO,
            tall: false,
            colors: BTreeMap::new(),
            alpha: AlphaEncoding::default(),
            merges: HashMap::new(),
        }
    }

    /// Declare the color for a (rotation, team) pair.
    pub fn with_color(mut self, rotation: Rotation, team: Team, color: Argb) -> Self {
        self.colors.insert(VariantKey::new(rotation, team), color);
        self
    }

    /// Declare a merge rule: placing this over `other` yields `result`.
    pub fn with_merge(mut self, other: impl Into<String>, result: impl Into<String>) -> Self {
        self.merges.insert(other.into(), result.into());
        self
    }

    /// Rotations this item is enumerated over.
    pub fn rotations(&self) -> &'static [Rotation] {
        if self.rotatable {
            &Rotation::ALL
        } else {
            &Rotation::ALL[..1]
        }
    }
}

/// A placeable item: a shared prototype plus this copy's rotation and team.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    proto: Arc<ItemProto>,
    rotation: Rotation,
    team: Team,
}

impl Item {
    /// A fresh copy at rotation 0 with the prototype's default team.
    pub fn new(proto: Arc<ItemProto>) -> Self {
        let team = proto.default_team;
        Self { proto, rotation: Rotation::Deg0, team }
    }

    pub fn proto(&self) -> &ItemProto {
        &self.proto
    }

    pub fn name(&self) -> &str {
        &self.proto.name
    }

    pub fn kind(&self) -> ItemKind {
        self.proto.kind
    }

    pub fn z(&self) -> i32 {
        self.proto.z
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn is_rotatable(&self) -> bool {
        self.proto.rotatable
    }

    pub fn is_team_swappable(&self) -> bool {
        self.proto.team_swappable
    }

    pub fn offset(&self) -> Offset {
        self.proto.offset
    }

    pub fn is_tall(&self) -> bool {
        self.proto.tall
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn set_team(&mut self, team: Team) {
        self.team = team;
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    /// Whether this item erases rather than places.
    pub fn is_eraser(&self) -> bool {
        is_eraser_name(&self.proto.name)
    }

    pub fn has_merges(&self) -> bool {
        !self.proto.merges.is_empty()
    }

    /// Result of merging this item into an item named `other`.
    pub fn merge_target(&self, other: &str) -> Option<&str> {
        self.proto.merges.get(other).map(String::as_str)
    }

    /// Exact color variant for a (rotation, team) pair.
    pub fn color_variant(&self, rotation: Rotation, team: Team) -> Option<Argb> {
        self.proto.colors.get(&VariantKey::new(rotation, team)).copied()
    }

    /// Teams this item is enumerated over.
    pub fn teams(&self) -> Vec<Team> {
        if self.proto.team_swappable {
            TEAMS.to_vec()
        } else {
            vec![self.team]
        }
    }

    /// Whether two items share the same prototype allocation.
    pub fn same_proto(&self, other: &Item) -> bool {
        Arc::ptr_eq(&self.proto, &other.proto)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.proto.name)?;
        if self.proto.rotatable {
            write!(f, "@{}", self.rotation)?;
        }
        if self.proto.team_swappable {
            write!(f, ":{}", self.team)?;
        }
        Ok(())
    }
}

/// Whether a name is one of the erase sentinels.
pub fn is_eraser_name(name: &str) -> bool {
    ERASER_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn door() -> Arc<ItemProto> {
        let mut proto = ItemProto::new(ItemKind::Blob, "door")
            .with_color(Rotation::Deg0, 0, Argb::new(255, 26, 78, 131))
            .with_merge("tile_castle_back", "door_castle");
        proto.rotatable = true;
        proto.team_swappable = true;
        Arc::new(proto)
    }

    #[test]
    fn test_copies_do_not_alias() {
        let proto = door();
        let mut a = Item::new(proto.clone());
        let b = Item::new(proto.clone());
        a.set_rotation(Rotation::Deg90);
        a.set_team(3);
        assert_eq!(b.rotation(), Rotation::Deg0);
        assert_eq!(b.team(), 0);
        assert_eq!(proto.default_team, 0);
        assert!(a.same_proto(&b));
    }

    #[test]
    fn test_eraser_names() {
        assert!(is_eraser_name("sky"));
        assert!(is_eraser_name("tile_empty"));
        assert!(is_eraser_name(""));
        assert!(!is_eraser_name("tile_ground"));
    }

    #[test]
    fn test_teams_enumeration() {
        let item = Item::new(door());
        assert_eq!(item.teams(), TEAMS.to_vec());

        let rock = Item::new(Arc::new(ItemProto::new(ItemKind::Tile, "tile_stone"))).with_team(2);
        assert_eq!(rock.teams(), vec![2]);
    }

    #[test]
    fn test_merge_target() {
        let item = Item::new(door());
        assert!(item.has_merges());
        assert_eq!(item.merge_target("tile_castle_back"), Some("door_castle"));
        assert_eq!(item.merge_target("tile_ground"), None);
    }

    #[test]
    fn test_alpha_encoding_roundtrip_values() {
        let both = AlphaEncoding { team: true, angle: true };
        let alpha = both.encode(Rotation::Deg270, 5);
        assert_eq!(alpha, 0x80 | 0x30 | 0x05);
        assert_eq!(AlphaEncoding::decode_team(alpha), 5);
        assert_eq!(AlphaEncoding::decode_rotation(alpha), Rotation::Deg270);

        let spectator = both.encode(Rotation::Deg0, SPECTATOR_TEAM);
        assert_eq!(spectator, 0x8F);
        assert_eq!(AlphaEncoding::decode_team(spectator), SPECTATOR_TEAM);
    }

    #[test]
    fn test_valid_team() {
        assert!(is_valid_team(0));
        assert!(is_valid_team(6));
        assert!(is_valid_team(255));
        assert!(!is_valid_team(7));
        assert!(!is_valid_team(100));
    }

    #[test]
    fn test_display() {
        let item = Item::new(door()).with_rotation(Rotation::Deg90).with_team(1);
        assert_eq!(item.to_string(), "door@90:1");
    }
}
