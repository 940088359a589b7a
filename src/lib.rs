//! Mapsmith - Library for editing color-coded PNG game maps
//!
//! This library provides functionality to:
//! - Load an item catalog (built-in and modded) from declarative JSON
//! - Map between item variants and pixel colors
//! - Edit a grid with merge rules, mirroring and undo/redo
//! - Save, load and render maps as PNG images

pub mod catalog;
pub mod cli;
pub mod codec;
pub mod color;
pub mod config;
pub mod editor;
pub mod grid;
pub mod history;
pub mod map_io;
pub mod models;
pub mod output;
pub mod sprites;
pub mod team;
