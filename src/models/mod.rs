//! Data models shared by the catalog, codecs and editor.

mod geometry;
mod item;
mod warning;

pub use geometry::{GridPos, Offset, Rotation};
pub use item::{
    is_eraser_name, is_valid_team, AlphaEncoding, Item, ItemKind, ItemProto, Team, VariantKey,
    ERASER_NAMES, NEUTRAL_TEAM, SKY, SPECTATOR_TEAM, TEAMS,
};
pub use warning::Warning;
