//! Criterion benchmarks for Mapsmith critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Catalog: vanilla load and codec construction
//! - Color: hex parsing
//! - Map format: PNG pixel encode/decode
//! - Editor: placement, strokes and undo
//!
//! Run with: cargo bench
//! View reports: target/criterion/report/index.html

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mapsmith::catalog::{load_catalog, CatalogOptions, ItemCatalog};
use mapsmith::codec::ColorCodec;
use mapsmith::color::parse_argb;
use mapsmith::editor::{interpolate_line, EditorSession};
use mapsmith::grid::{Grid, GridSize};
use mapsmith::map_io::{decode_map, encode_map};
use mapsmith::models::{GridPos, Rotation};

// =============================================================================
// Test Data Generators
// =============================================================================

fn vanilla() -> Arc<ItemCatalog> {
    let (catalog, _) = load_catalog(&CatalogOptions::default()).expect("vanilla catalog");
    Arc::new(catalog)
}

/// Build a terrain-like map: bedrock floor, ground strata, scattered props.
fn make_grid(catalog: &Arc<ItemCatalog>, width: u32, height: u32) -> Grid {
    let mut session = EditorSession::new(Arc::clone(catalog), GridSize::new(width, height));
    let w = width as i32;
    let h = height as i32;
    for x in 0..w {
        session.place_by_name(GridPos::new(x, h - 1), "tile_bedrock");
        let surface = h - 2 - (x % 7);
        for y in surface..h - 1 {
            session.place_by_name(GridPos::new(x, y), "tile_ground");
        }
        if x % 11 == 0 {
            session.place_by_name(GridPos::new(x, surface - 1), "ladder");
        } else if x % 5 == 0 {
            session.place_by_name(GridPos::new(x, surface - 1), "chest");
        }
    }
    session.grid().clone()
}

// =============================================================================
// Catalog Benchmarks
// =============================================================================

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");

    group.bench_function("load_vanilla", |b| {
        b.iter(|| load_catalog(black_box(&CatalogOptions::default())))
    });

    let catalog = vanilla();
    let protos: Vec<_> = catalog.protos().cloned().collect();
    group.bench_function("build_codec", |b| b.iter(|| ColorCodec::build(black_box(&protos))));

    group.bench_function("lookup_by_name", |b| {
        b.iter(|| catalog.get_item_by_name(black_box("wooden_door")))
    });

    group.finish();
}

// =============================================================================
// Color Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    let colors = ["#FF844715", "#A5BDC8", "#80a5bdc8", "#FFFFFFFF"];
    for color in colors.iter() {
        group.bench_with_input(BenchmarkId::new("parse_argb", color), color, |b, color| {
            b.iter(|| parse_argb(black_box(color)))
        });
    }

    group.finish();
}

// =============================================================================
// Map Format Benchmarks
// =============================================================================

fn bench_map_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_io");
    let catalog = vanilla();

    for (width, height) in [(40, 30), (200, 100), (500, 250)].iter() {
        let grid = make_grid(&catalog, *width, *height);
        let label = format!("{}x{}", width, height);
        group.throughput(Throughput::Elements((*width as u64) * (*height as u64)));

        group.bench_with_input(BenchmarkId::new("encode", &label), &grid, |b, grid| {
            b.iter(|| encode_map(black_box(grid), &catalog))
        });

        let (image, _) = encode_map(&grid, &catalog);
        group.bench_with_input(BenchmarkId::new("decode", &label), &image, |b, image| {
            b.iter(|| decode_map(black_box(image), &catalog))
        });
    }

    group.finish();
}

// =============================================================================
// Editor Benchmarks
// =============================================================================

fn bench_editor(c: &mut Criterion) {
    let mut group = c.benchmark_group("editor");
    let catalog = vanilla();
    let ground = catalog.get_item_by_name("tile_ground").expect("tile_ground");
    let door = catalog.get_item_by_name("wooden_door").expect("wooden_door");

    group.bench_function("place_fill_100x50", |b| {
        b.iter(|| {
            let mut session = EditorSession::new(Arc::clone(&catalog), GridSize::new(100, 50));
            for y in 0..50 {
                for x in 0..100 {
                    session.place_item(GridPos::new(x, y), &ground, Rotation::Deg0, 0, false, false);
                }
            }
            session
        })
    });

    group.bench_function("place_mirrored_rotated", |b| {
        b.iter(|| {
            let mut session = EditorSession::new(Arc::clone(&catalog), GridSize::new(64, 8));
            for x in 0..32 {
                session.place_item(GridPos::new(x, 4), &door, Rotation::Deg90, 2, false, true);
            }
            session
        })
    });

    group.bench_function("stroke_and_undo", |b| {
        b.iter(|| {
            let mut session = EditorSession::new(Arc::clone(&catalog), GridSize::new(128, 128));
            session.begin_stroke();
            session.stroke_to(GridPos::new(0, 0), &ground, false);
            session.stroke_to(GridPos::new(127, 127), &ground, false);
            session.end_stroke();
            while session.undo() {}
            session
        })
    });

    for len in [8, 64, 512].iter() {
        group.bench_with_input(BenchmarkId::new("interpolate_line", len), len, |b, &len| {
            b.iter(|| interpolate_line(black_box(GridPos::new(0, 0)), black_box(GridPos::new(len, len / 3))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_catalog, bench_color, bench_map_io, bench_editor);
criterion_main!(benches);
