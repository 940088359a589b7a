//! `mapsmith paint`: scripted edits through an editing session.
//!
//! All arguments are parsed and every item name resolved before the map is
//! touched, so a typo never leaves a half-edited file behind.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::editor::EditorSession;
use crate::grid::GridSize;
use crate::models::{is_valid_team, GridPos, Item, Rotation, Team};

use super::{Context, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Borrowed `paint` arguments.
pub(crate) struct PaintArgs<'a> {
    pub map: &'a Path,
    pub new: Option<&'a str>,
    pub set: &'a [String],
    pub erase: &'a [String],
    pub line: &'a [String],
    pub output: Option<&'a Path>,
    pub dry_run: bool,
}

/// A parsed `--set` argument.
#[derive(Debug, Clone, PartialEq)]
struct SetOp {
    pos: GridPos,
    name: String,
    rotation: Option<Rotation>,
    team: Option<Team>,
}

/// A parsed `--line` argument.
#[derive(Debug, Clone, PartialEq)]
struct LineOp {
    from: GridPos,
    to: GridPos,
    name: String,
}

/// Parse `X,Y` into a grid position.
fn parse_coords(s: &str) -> Result<GridPos, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("Invalid coordinates '{}'. Use X,Y", s))?;
    let x = x.trim().parse::<i32>().map_err(|_| format!("Invalid x in '{}'", s))?;
    let y = y.trim().parse::<i32>().map_err(|_| format!("Invalid y in '{}'", s))?;
    Ok(GridPos::new(x, y))
}

/// Parse a `WxH` map size.
fn parse_size(s: &str) -> Result<GridSize, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid size '{}'. Use WxH (e.g., 40x30)", s));
    }
    let w = parts[0].parse::<u32>().map_err(|_| format!("Invalid width in '{}'", s))?;
    let h = parts[1].parse::<u32>().map_err(|_| format!("Invalid height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err("Width and height must be greater than 0".to_string());
    }
    Ok(GridSize::new(w, h))
}

/// Parse `X,Y=NAME[@ROT][:TEAM]`.
fn parse_set(s: &str) -> Result<SetOp, String> {
    let (coords, spec) =
        s.split_once('=').ok_or_else(|| format!("Invalid --set '{}'. Use X,Y=NAME", s))?;
    let pos = parse_coords(coords)?;

    let (rest, team) = match spec.rsplit_once(':') {
        Some((rest, team)) => {
            let team = team.parse::<Team>().map_err(|_| format!("Invalid team in '{}'", s))?;
            if !is_valid_team(team) {
                return Err(format!("Team {} in '{}' must be 0-6 or 255", team, s));
            }
            (rest, Some(team))
        }
        None => (spec, None),
    };

    let (name, rotation) = match rest.split_once('@') {
        Some((name, degrees)) => {
            let rotation = degrees
                .parse::<u16>()
                .ok()
                .and_then(Rotation::from_degrees)
                .ok_or_else(|| format!("Rotation in '{}' must be 0, 90, 180 or 270", s))?;
            (name, Some(rotation))
        }
        None => (rest, None),
    };

    if name.is_empty() {
        return Err(format!("Missing item name in '{}'", s));
    }
    Ok(SetOp { pos, name: name.to_string(), rotation, team })
}

/// Parse `X0,Y0,X1,Y1=NAME`.
fn parse_line(s: &str) -> Result<LineOp, String> {
    let (coords, name) =
        s.split_once('=').ok_or_else(|| format!("Invalid --line '{}'. Use X0,Y0,X1,Y1=NAME", s))?;
    let values = coords
        .split(',')
        .map(|v| v.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("Invalid coordinates in '{}'", s))?;
    let [x0, y0, x1, y1] = values[..] else {
        return Err(format!("Invalid --line '{}'. Use X0,Y0,X1,Y1=NAME", s));
    };
    if name.is_empty() {
        return Err(format!("Missing item name in '{}'", s));
    }
    Ok(LineOp { from: GridPos::new(x0, y0), to: GridPos::new(x1, y1), name: name.to_string() })
}

type ParsedArgs = (Option<GridSize>, Vec<SetOp>, Vec<GridPos>, Vec<LineOp>);

fn parse_args(args: &PaintArgs<'_>) -> Result<ParsedArgs, String> {
    let size = args.new.map(parse_size).transpose()?;
    let sets = args.set.iter().map(|s| parse_set(s)).collect::<Result<Vec<_>, _>>()?;
    let erases = args.erase.iter().map(|s| parse_coords(s)).collect::<Result<Vec<_>, _>>()?;
    let lines = args.line.iter().map(|s| parse_line(s)).collect::<Result<Vec<_>, _>>()?;
    Ok((size, sets, erases, lines))
}

/// Execute the paint command
pub(crate) fn run_paint(context: &Context, args: &PaintArgs<'_>) -> ExitCode {
    let (size, sets, erases, lines) = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let resolve = |name: &str| -> Result<Item, ExitCode> {
        context.catalog.get_item_by_name(name).ok_or_else(|| {
            eprintln!("Error: unknown item '{}'", name);
            eprintln!("Run 'mapsmith palette' to list available items");
            ExitCode::from(EXIT_INVALID_ARGS)
        })
    };
    let mut set_items = Vec::with_capacity(sets.len());
    for op in &sets {
        match resolve(&op.name) {
            Ok(item) => set_items.push(item),
            Err(code) => return code,
        }
    }
    let mut line_items = Vec::with_capacity(lines.len());
    for op in &lines {
        match resolve(&op.name) {
            Ok(item) => line_items.push(item),
            Err(code) => return code,
        }
    }

    let config = &context.config.editor;
    let mut session = EditorSession::from_config(
        Arc::clone(&context.catalog),
        config,
        size.unwrap_or_default(),
    );
    if size.is_none() {
        match session.open(Some(args.map)) {
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
    if let Some(sprites) = context.sprites() {
        session = session.with_sprites(Arc::new(sprites));
    }
    let mirror = config.mirror_x;
    session.set_mirror(mirror);

    let requested = sets.len() + lines.len() + erases.len();
    let mut applied = 0;

    for (op, item) in sets.iter().zip(&set_items) {
        let rotation = op.rotation.unwrap_or(Rotation::Deg0);
        let team = op.team.unwrap_or(item.team());
        if session.place_item(op.pos, item, rotation, team, false, mirror) {
            applied += 1;
        } else {
            tracing::info!(pos = %op.pos, item = %op.name, "set changed nothing");
        }
    }

    for (op, item) in lines.iter().zip(&line_items) {
        session.begin_stroke();
        let placed = session.stroke_to(op.from, item, false) + session.stroke_to(op.to, item, false);
        session.end_stroke();
        if placed > 0 {
            applied += 1;
        }
    }

    for &pos in &erases {
        let sky = session.catalog().sky();
        if session.place_item(pos, &sky, Rotation::Deg0, 0, true, mirror) {
            applied += 1;
        } else {
            tracing::info!(%pos, "erase changed nothing");
        }
    }

    let edits = session.history().len();
    let target = args.output.unwrap_or(args.map);

    if args.dry_run {
        println!("{} of {} operations changed the map ({} edits)", applied, requested, edits);
        println!("Would write: {}", target.display());
        return ExitCode::from(EXIT_SUCCESS);
    }

    match session.save(target) {
        Ok(warnings) => {
            if !warnings.is_empty() {
                eprintln!("Warning: {} cells could not be encoded", warnings.len());
            }
            eprintln!("Wrote: {} ({} of {} operations applied)", target.display(), applied, requested);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
