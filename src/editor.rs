//! Editing session: placement, merging, erasing, mirroring and undo/redo.
//!
//! All edits go through [`EditorSession::place_item`]. It resolves merges
//! against the current occupant, suppresses edits that would change nothing,
//! and records the fully resolved before/after state as a [`Command`]. Undo and
//! redo replay those stored states directly, without merge resolution.
//!
//! The session never draws. Every visible change is queued as a
//! [`RenderEvent`] for the external renderer to pick up with
//! [`EditorSession::drain_events`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::ItemCatalog;
use crate::config::EditorConfig;
use crate::grid::{Grid, GridSize, RenderEvent};
use crate::history::{CellChange, Command, History};
use crate::map_io::{self, MapIoError};
use crate::models::{GridPos, Item, Rotation, Team, Warning, NEUTRAL_TEAM};
use crate::sprites::SpriteStore;

/// Default pixel size of one grid cell on screen.
pub const DEFAULT_CELL_SIZE: u32 = 8;

/// Grid points from `from` to `to` inclusive, for drag painting.
///
/// When the pointer moved more than one cell, `max(|dx|, |dy|)` steps are
/// interpolated linearly and rounded to the nearest cell so a fast drag leaves
/// no gaps. Otherwise only `to` is returned.
pub fn interpolate_line(from: GridPos, to: GridPos) -> Vec<GridPos> {
    let line = LineSteps::new(from, to);
    if line.steps <= 1 {
        return vec![to];
    }
    (0..=line.steps).map(|i| line.point(i)).collect()
}

/// The in-bounds subset of [`interpolate_line`], in the same order.
///
/// The segment is clipped to the grid before stepping, so an end point far
/// outside the map costs no more than a line across it.
pub fn interpolate_line_within(from: GridPos, to: GridPos, size: GridSize) -> Vec<GridPos> {
    let line = LineSteps::new(from, to);
    if line.steps <= 1 {
        return if size.contains(to) { vec![to] } else { Vec::new() };
    }
    let Some((first, last)) = line.clip(size) else {
        return Vec::new();
    };
    (first..=last).map(|i| line.point(i)).filter(|&point| size.contains(point)).collect()
}

/// A rasterized segment: `steps + 1` rounded points from `from` to `to`.
struct LineSteps {
    from: GridPos,
    dx: i64,
    dy: i64,
    steps: i64,
}

impl LineSteps {
    fn new(from: GridPos, to: GridPos) -> Self {
        let dx = to.x as i64 - from.x as i64;
        let dy = to.y as i64 - from.y as i64;
        Self { from, dx, dy, steps: dx.abs().max(dy.abs()) }
    }

    fn point(&self, i: i64) -> GridPos {
        let t = i as f64 / self.steps as f64;
        GridPos::new(
            (self.from.x as f64 + self.dx as f64 * t).round() as i32,
            (self.from.y as f64 + self.dy as f64 * t).round() as i32,
        )
    }

    /// Step range whose points may land inside `size`.
    ///
    /// Parametric clip against the grid grown by one cell on every side, so
    /// rounding can never push an in-bounds point outside the range.
    fn clip(&self, size: GridSize) -> Option<(i64, i64)> {
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        let axes = [
            (self.from.x as f64, self.dx as f64, size.width as f64),
            (self.from.y as f64, self.dy as f64, size.height as f64),
        ];
        for (start, delta, extent) in axes {
            let (lo, hi) = (-1.0, extent);
            if delta == 0.0 {
                if start < lo || start > hi {
                    return None;
                }
                continue;
            }
            let a = (lo - start) / delta;
            let b = (hi - start) / delta;
            t0 = t0.max(a.min(b));
            t1 = t1.min(a.max(b));
            if t0 > t1 {
                return None;
            }
        }
        let steps = self.steps as f64;
        let first = ((t0 * steps).floor() as i64).clamp(0, self.steps);
        let last = ((t1 * steps).ceil() as i64).clamp(0, self.steps);
        Some((first, last))
    }
}

/// One open map with its history and tool state.
#[derive(Debug)]
pub struct EditorSession {
    catalog: Arc<ItemCatalog>,
    sprites: Option<Arc<SpriteStore>>,
    grid: Grid,
    history: History,
    rotation: Rotation,
    team: Team,
    mirror_x: bool,
    cell_size: u32,
    events: Vec<RenderEvent>,
    /// Last cell of the drag in progress
    stroke: Option<GridPos>,
    autosave_path: Option<PathBuf>,
}

impl EditorSession {
    /// An empty map of the given size.
    pub fn new(catalog: Arc<ItemCatalog>, size: GridSize) -> Self {
        Self {
            catalog,
            sprites: None,
            grid: Grid::new(size),
            history: History::default(),
            rotation: Rotation::Deg0,
            team: NEUTRAL_TEAM,
            mirror_x: false,
            cell_size: DEFAULT_CELL_SIZE,
            events: Vec::new(),
            stroke: None,
            autosave_path: None,
        }
    }

    /// An empty map configured from the `[editor]` config section.
    pub fn from_config(catalog: Arc<ItemCatalog>, config: &EditorConfig, size: GridSize) -> Self {
        let mut session = Self::new(catalog, size)
            .with_history_capacity(config.history_capacity)
            .with_cell_size(config.cell_size);
        session.mirror_x = config.mirror_x;
        session.autosave_path = config.autosave.clone();
        session
    }

    /// Reject placements whose sprite asset failed to load.
    pub fn with_sprites(mut self, sprites: Arc<SpriteStore>) -> Self {
        self.sprites = Some(sprites);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = History::with_capacity(capacity);
        self
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size.max(1);
        self
    }

    pub fn with_autosave(mut self, path: impl Into<PathBuf>) -> Self {
        self.autosave_path = Some(path.into());
        self
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn mirror_x(&self) -> bool {
        self.mirror_x
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn rotate_left(&mut self) {
        self.rotation = self.rotation.rotated_ccw();
    }

    pub fn rotate_right(&mut self) {
        self.rotation = self.rotation.rotated_cw();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn set_team(&mut self, team: Team) {
        self.team = team;
    }

    pub fn set_mirror(&mut self, mirror_x: bool) {
        self.mirror_x = mirror_x;
    }

    /// Translate a pointer position in pixels to a grid cell.
    pub fn screen_to_grid(&self, px: i32, py: i32) -> GridPos {
        let cell = self.cell_size as i32;
        GridPos::new(px.div_euclid(cell), py.div_euclid(cell))
    }

    /// Place (or with `erase`, remove) an item at a cell.
    ///
    /// Returns true when an edit was recorded. Out-of-bounds cells, edits that
    /// would change nothing, and items whose sprite is unavailable are no-ops.
    pub fn place_item(
        &mut self,
        pos: GridPos,
        candidate: &Item,
        rotation: Rotation,
        team: Team,
        erase: bool,
        mirror: bool,
    ) -> bool {
        if self.grid.is_out_of_bounds(pos) {
            return false;
        }

        let mut initial = if erase { self.catalog.sky() } else { candidate.clone() };
        if initial.is_team_swappable() {
            initial.set_team(team);
        }

        let existing = self.grid.get(pos).cloned();
        let resolved = self.resolve_merge(initial, existing.as_ref(), team);

        match &existing {
            Some(existing) => {
                if existing.name() == resolved.name()
                    && (!resolved.is_rotatable() || existing.rotation() == rotation)
                {
                    return false;
                }
            }
            None if resolved.is_eraser() => return false,
            None => {}
        }

        let after = if resolved.is_eraser() {
            None
        } else {
            if !self.is_drawable(&resolved) {
                tracing::warn!(item = %resolved.name(), %pos, "placement rejected, sprite unavailable");
                return false;
            }
            let mut placed = resolved;
            if placed.is_rotatable() {
                placed.set_rotation(rotation);
            }
            Some(placed)
        };

        let mut command = Command::new(pos, after.clone(), existing);
        if mirror {
            let mirrored = self.grid.mirror_x(pos);
            if mirrored != pos {
                let before = self.grid.get(mirrored).cloned();
                if before.is_some() || after.is_some() {
                    command.push(CellChange { pos: mirrored, before, after });
                }
            }
        }

        tracing::debug!(%pos, cells = command.changes().len(), "edit recorded");
        self.history.execute(command, &mut self.grid, &mut self.events);
        true
    }

    /// Place with the session's current rotation, team and mirror setting.
    pub fn place(&mut self, pos: GridPos, candidate: &Item) -> bool {
        self.place_item(pos, candidate, self.rotation, self.team, false, self.mirror_x)
    }

    /// Place a catalog item by name. Unknown names are a no-op.
    pub fn place_by_name(&mut self, pos: GridPos, name: &str) -> bool {
        match self.catalog.get_item_by_name(name) {
            Some(item) => self.place(pos, &item),
            None => {
                tracing::debug!(name, "unknown item name");
                false
            }
        }
    }

    /// Erase with the session's mirror setting.
    pub fn erase(&mut self, pos: GridPos) -> bool {
        let sky = self.catalog.sky();
        self.place_item(pos, &sky, self.rotation, self.team, true, self.mirror_x)
    }

    /// Start a new drag. The first `stroke_to` places a single cell.
    pub fn begin_stroke(&mut self) {
        self.stroke = None;
    }

    /// Continue a drag to `pos`, filling any gap since the previous cell.
    ///
    /// Returns the number of edits recorded.
    pub fn stroke_to(&mut self, pos: GridPos, candidate: &Item, erase: bool) -> usize {
        let points = match self.stroke {
            Some(last) => interpolate_line_within(last, pos, self.grid.size()),
            None => vec![pos],
        };
        self.stroke = Some(pos);

        let (rotation, team, mirror) = (self.rotation, self.team, self.mirror_x);
        points
            .into_iter()
            .filter(|&point| self.place_item(point, candidate, rotation, team, erase, mirror))
            .count()
    }

    /// Finish the current drag.
    pub fn end_stroke(&mut self) {
        self.stroke = None;
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.grid, &mut self.events);
        if undone {
            tracing::debug!(index = self.history.index(), "undo");
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.grid, &mut self.events);
        if redone {
            tracing::debug!(index = self.history.index(), "redo");
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Take every pending render notification.
    pub fn drain_events(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resize the map, replacing its cells (empty by default).
    ///
    /// Undo history refers to the old bounds and is discarded.
    pub fn resize(&mut self, size: GridSize, cells: Option<HashMap<GridPos, Item>>) {
        self.grid.resize(size, cells);
        self.reset();
    }

    /// Start over with an empty map.
    pub fn new_map(&mut self, size: GridSize) {
        self.resize(size, None);
    }

    /// Swap in a whole grid, as after loading a map.
    pub fn replace_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.reset();
    }

    fn reset(&mut self) {
        self.history.clear();
        self.stroke = None;
        self.events.clear();
        self.events.push(RenderEvent::Redraw);
    }

    /// Load a map. `None` means the user cancelled the file picker.
    pub fn open(&mut self, path: Option<&Path>) -> Result<Option<Vec<Warning>>, MapIoError> {
        let Some(path) = path else {
            return Ok(None);
        };
        let (grid, warnings) = map_io::load_map(&self.catalog, path)?;
        self.replace_grid(grid);
        Ok(Some(warnings))
    }

    /// Save the map as a color-coded PNG.
    pub fn save(&self, path: &Path) -> Result<Vec<Warning>, MapIoError> {
        map_io::save_map(&self.grid, &self.catalog, path)
    }

    /// Save to the autosave path, if one is configured.
    ///
    /// Empty maps are skipped. Failures are logged, never returned. Returns
    /// whether a file was written.
    pub fn autosave(&self) -> bool {
        let Some(path) = &self.autosave_path else {
            return false;
        };
        if self.grid.is_empty() {
            tracing::debug!("autosave skipped, map is empty");
            return false;
        }
        match self.save(path) {
            Ok(warnings) => {
                for warning in warnings {
                    tracing::warn!("autosave: {}", warning);
                }
                tracing::info!(path = %path.display(), "autosaved");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "autosave failed: {}", e);
                false
            }
        }
    }

    /// End the session, autosaving first.
    pub fn close(self) -> bool {
        self.autosave()
    }

    fn is_drawable(&self, item: &Item) -> bool {
        self.sprites.as_ref().map_or(true, |sprites| sprites.is_resolvable(item))
    }

    /// Merge the incoming item with the current occupant.
    ///
    /// The incoming item's rule for the occupant is tried first, then the
    /// occupant's rule for the incoming item. Resolving to the occupant itself
    /// returns the occupant unchanged. Unresolvable rules fall back to placing
    /// the incoming item.
    fn resolve_merge(&self, initial: Item, existing: Option<&Item>, team: Team) -> Item {
        let Some(existing) = existing else {
            return initial;
        };
        if !initial.has_merges() && !existing.has_merges() {
            return initial;
        }

        let merged = initial
            .merge_target(existing.name())
            .and_then(|name| self.catalog.get_item_by_name(name))
            .or_else(|| {
                existing
                    .merge_target(initial.name())
                    .and_then(|name| self.catalog.get_item_by_name(name))
            });

        match merged {
            Some(merged) if merged.name() == existing.name() => existing.clone(),
            Some(mut merged) => {
                if merged.is_team_swappable() {
                    merged.set_team(team);
                }
                merged
            }
            None => initial,
        }
    }
}
