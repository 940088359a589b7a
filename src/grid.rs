//! Sparse grid model
//!
//! Only occupied cells are stored; an absent key is empty sky. Every stored key
//! lies inside `[0, width) x [0, height)`: out-of-bounds writes are ignored
//! before any mutation happens.

use std::collections::HashMap;

use crate::models::{GridPos, Item, Rotation};

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as i64) < self.width as i64 && (pos.y as i64) < self.height as i64
    }

    /// Clamp a position into the grid. The grid must not be empty.
    pub fn clamp(self, pos: GridPos) -> GridPos {
        let max_x = self.width.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_y = self.height.saturating_sub(1).min(i32::MAX as u32) as i32;
        GridPos::new(pos.x.clamp(0, max_x), pos.y.clamp(0, max_y))
    }

    pub fn cell_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Notification for the external renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Draw `item` at `pos`
    Place { pos: GridPos, item: Item, rotation: Rotation },
    /// Remove whatever is drawn at `pos`
    Erase { pos: GridPos },
    /// Throw everything away and redraw from the grid
    Redraw,
}

/// The map being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    size: GridSize,
    cells: HashMap<GridPos, Item>,
}

impl Grid {
    pub fn new(size: GridSize) -> Self {
        Self { size, cells: HashMap::new() }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn is_out_of_bounds(&self, pos: GridPos) -> bool {
        !self.size.contains(pos)
    }

    pub fn get(&self, pos: GridPos) -> Option<&Item> {
        self.cells.get(&pos)
    }

    /// Store an item, returning the previous occupant. Out-of-bounds is a no-op
    /// and an eraser clears the cell.
    pub fn set(&mut self, pos: GridPos, item: Item) -> Option<Item> {
        if self.is_out_of_bounds(pos) {
            return None;
        }
        if item.is_eraser() {
            return self.cells.remove(&pos);
        }
        self.cells.insert(pos, item)
    }

    /// Clear a cell, returning the previous occupant.
    pub fn remove(&mut self, pos: GridPos) -> Option<Item> {
        self.cells.remove(&pos)
    }

    /// The placement primitive: store `item`, or clear the cell when `item` is
    /// `None` or an eraser. Returns the render notification, if anything changed.
    pub fn apply(&mut self, pos: GridPos, item: Option<&Item>) -> Option<RenderEvent> {
        if self.is_out_of_bounds(pos) {
            return None;
        }
        match item {
            Some(item) if !item.is_eraser() => {
                self.cells.insert(pos, item.clone());
                Some(RenderEvent::Place { pos, item: item.clone(), rotation: item.rotation() })
            }
            _ => self.cells.remove(&pos).map(|_| RenderEvent::Erase { pos }),
        }
    }

    /// Replace the whole map. Cells outside the new bounds are dropped.
    pub fn resize(&mut self, size: GridSize, cells: Option<HashMap<GridPos, Item>>) {
        self.size = size;
        self.cells = cells.unwrap_or_default();
        self.cells.retain(|pos, item| size.contains(*pos) && !item.is_eraser());
    }

    /// Column mirrored over the vertical center line.
    pub fn mirror_x(&self, pos: GridPos) -> GridPos {
        GridPos::new(self.size.width as i32 - 1 - pos.x, pos.y)
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> Vec<(GridPos, &Item)> {
        let mut cells: Vec<(GridPos, &Item)> = self.cells.iter().map(|(pos, item)| (*pos, item)).collect();
        cells.sort_by_key(|(pos, _)| (pos.y, pos.x));
        cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemKind, ItemProto};
    use std::sync::Arc;

    fn item(name: &str) -> Item {
        Item::new(Arc::new(ItemProto::new(ItemKind::Tile, name)))
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(GridSize::new(10, 5));
        assert!(!grid.is_out_of_bounds(GridPos::new(0, 0)));
        assert!(!grid.is_out_of_bounds(GridPos::new(9, 4)));
        assert!(grid.is_out_of_bounds(GridPos::new(10, 0)));
        assert!(grid.is_out_of_bounds(GridPos::new(0, 5)));
        assert!(grid.is_out_of_bounds(GridPos::new(-1, 2)));
    }

    #[test]
    fn test_out_of_bounds_set_is_noop() {
        let mut grid = Grid::new(GridSize::new(4, 4));
        assert!(grid.set(GridPos::new(4, 0), item("tile_ground")).is_none());
        assert!(grid.apply(GridPos::new(-1, 0), Some(&item("tile_ground"))).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_apply_place_and_erase() {
        let mut grid = Grid::new(GridSize::new(4, 4));
        let pos = GridPos::new(1, 2);

        let event = grid.apply(pos, Some(&item("tile_ground")));
        assert!(matches!(event, Some(RenderEvent::Place { .. })));
        assert_eq!(grid.get(pos).unwrap().name(), "tile_ground");

        assert_eq!(grid.apply(pos, Some(&item("sky"))), Some(RenderEvent::Erase { pos }));
        assert!(grid.get(pos).is_none());

        // Erasing an empty cell changes nothing and stores nothing.
        assert_eq!(grid.apply(pos, None), None);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_set_eraser_clears_cell() {
        let mut grid = Grid::new(GridSize::new(4, 4));
        let pos = GridPos::new(2, 2);

        assert!(grid.set(pos, item("sky")).is_none());
        assert!(grid.is_empty());

        grid.set(pos, item("tile_ground"));
        let previous = grid.set(pos, item("sky"));
        assert_eq!(previous.unwrap().name(), "tile_ground");
        assert!(grid.get(pos).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_resize_drops_out_of_bounds_cells() {
        let mut grid = Grid::new(GridSize::new(4, 4));
        let mut cells = HashMap::new();
        cells.insert(GridPos::new(1, 1), item("tile_ground"));
        cells.insert(GridPos::new(5, 1), item("tile_ground"));
        cells.insert(GridPos::new(0, 0), item("sky"));
        grid.resize(GridSize::new(3, 3), Some(cells));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.size(), GridSize::new(3, 3));

        grid.resize(GridSize::new(8, 8), None);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_mirror_and_clamp() {
        let grid = Grid::new(GridSize::new(5, 3));
        assert_eq!(grid.mirror_x(GridPos::new(0, 1)), GridPos::new(4, 1));
        assert_eq!(grid.mirror_x(GridPos::new(2, 1)), GridPos::new(2, 1));
        assert_eq!(grid.size().clamp(GridPos::new(-3, 9)), GridPos::new(0, 2));
    }

    #[test]
    fn test_cells_row_major() {
        let mut grid = Grid::new(GridSize::new(4, 4));
        grid.set(GridPos::new(3, 0), item("a"));
        grid.set(GridPos::new(0, 1), item("b"));
        grid.set(GridPos::new(1, 0), item("c"));
        let names: Vec<&str> = grid.cells().iter().map(|(_, i)| i.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
