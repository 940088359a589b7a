//! Declarative item definition schema
//!
//! Item definition files are JSON documents of the form `{ "items": [ ... ] }`.
//! Every optional field has an explicit default; definitions are validated and
//! converted into [`ItemProto`] values before they reach the catalog.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::color::parse_argb;
use crate::models::{
    is_valid_team, AlphaEncoding, ItemKind, ItemProto, Offset, Rotation, Team, VariantKey,
    NEUTRAL_TEAM,
};

/// A whole definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemFile {
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

/// One explicit color variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorDef {
    #[serde(default)]
    pub rotation: u16,
    #[serde(default)]
    pub team: Team,
    /// `#AARRGGBB` or `#RRGGBB`
    pub color: String,
}

/// Largest accepted displacement, in cells, on either axis of an item offset.
pub const MAX_OFFSET: i32 = 64;

/// One item definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemDef {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub z: i32,
    #[serde(default)]
    pub rotatable: bool,
    #[serde(default)]
    pub team_swappable: bool,
    #[serde(default)]
    pub team: Team,
    #[serde(default)]
    pub offset: [i32; 2],
    #[serde(default)]
    pub tall: bool,
    /// Shorthand for the rotation 0 / default team variant, and the base RGB
    /// for alpha-packed encodings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorDef>,
    #[serde(default)]
    pub alpha: AlphaEncoding,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub merges: HashMap<String, String>,
}

/// A validation problem in an item definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemValidationError {
    /// Path to the invalid field (e.g., "door.colors[2].rotation")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

impl ItemDef {
    /// Validate and convert into a catalog prototype.
    pub fn into_proto(self) -> Result<ItemProto, Vec<ItemValidationError>> {
        let mut errors = Vec::new();
        let label = if self.name.is_empty() { "<unnamed>".to_string() } else { self.name.clone() };
        let mut error = |field: String, message: String| {
            errors.push(ItemValidationError { field, message });
        };

        if self.name.is_empty() {
            error("name".to_string(), "must be a non-empty string".to_string());
        }
        if !is_valid_team(self.team) {
            error(format!("{}.team", label), format!("must be 0-6 or 255, got {}", self.team));
        }
        if self.offset.iter().any(|v| !(-MAX_OFFSET..=MAX_OFFSET).contains(v)) {
            error(
                format!("{}.offset", label),
                format!(
                    "must stay within -{max}..={max} on both axes, got [{}, {}]",
                    self.offset[0],
                    self.offset[1],
                    max = MAX_OFFSET
                ),
            );
        }

        let base = match self.color.as_deref().map(parse_argb) {
            Some(Ok(color)) => Some(color),
            Some(Err(e)) => {
                error(format!("{}.color", label), e.to_string());
                None
            }
            None => None,
        };

        let mut colors = BTreeMap::new();

        if self.alpha.is_packed() {
            match base {
                Some(base) => {
                    let rotations: &[Rotation] = if self.alpha.angle && self.rotatable {
                        &Rotation::ALL
                    } else {
                        &Rotation::ALL[..1]
                    };
                    let teams: Vec<Team> = if self.alpha.team && self.team_swappable {
                        crate::models::TEAMS.to_vec()
                    } else {
                        vec![self.team]
                    };
                    for &rotation in rotations {
                        for &team in &teams {
                            let alpha = self.alpha.encode(rotation, team);
                            colors.insert(VariantKey::new(rotation, team), base.with_alpha(alpha));
                        }
                    }
                }
                None => error(
                    format!("{}.color", label),
                    "is required when the alpha channel packs team or angle".to_string(),
                ),
            }
        } else if let Some(base) = base {
            colors.insert(VariantKey::new(Rotation::Deg0, self.team), base);
        }

        for (i, def) in self.colors.iter().enumerate() {
            let rotation = Rotation::from_degrees(def.rotation);
            if rotation.is_none() {
                error(
                    format!("{}.colors[{}].rotation", label, i),
                    format!("must be 0, 90, 180 or 270, got {}", def.rotation),
                );
            }
            if !is_valid_team(def.team) {
                error(
                    format!("{}.colors[{}].team", label, i),
                    format!("must be 0-6 or 255, got {}", def.team),
                );
            }
            match parse_argb(&def.color) {
                Ok(color) => {
                    if let Some(rotation) = rotation {
                        colors.insert(VariantKey::new(rotation, def.team), color);
                    }
                }
                Err(e) => error(format!("{}.colors[{}].color", label, i), e.to_string()),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ItemProto {
            kind: self.kind,
            display_name: self.display_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            section: self.section,
            image: self.image,
            z: self.z,
            rotatable: self.rotatable,
            team_swappable: self.team_swappable,
            default_team: if is_valid_team(self.team) { self.team } else { NEUTRAL_TEAM },
            offset: Offset::new(self.offset[0], self.offset[1]),
            tall: self.tall,
            colors,
            alpha: self.alpha,
            merges: self.merges,
        })
    }
}
