//! Catalog loading: embedded vanilla definitions followed by mod files.
//!
//! The vanilla catalog is compiled into the binary and must load. Mod files are
//! discovered under a directory and loaded in sorted path order; a malformed mod
//! file is reported and skipped without affecting the rest of the catalog.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use thiserror::Error;

use super::schema::{ItemFile, ItemValidationError};
use super::ItemCatalog;
use crate::models::{ItemProto, Warning};

/// Embedded vanilla item definitions.
pub const VANILLA_ITEMS: &str = include_str!("../../assets/vanilla.json");

/// Catalog loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// File I/O error
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON parsing error
    #[error("failed to parse '{source_name}': {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
    /// One or more definitions failed validation
    #[error("invalid item definitions in '{}':\n{}", .source_name, .errors.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation {
        source_name: String,
        errors: Vec<ItemValidationError>,
    },
    /// Mod directory pattern could not be built
    #[error("invalid mod directory pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Where to load items from.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Load the embedded vanilla catalog first
    pub include_vanilla: bool,
    /// Directory holding `*.json` mod definition files
    pub mods_dir: Option<PathBuf>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self { include_vanilla: true, mods_dir: None }
    }
}

/// Parse and validate one definition document.
///
/// All definitions in a document are validated; any failure rejects the whole
/// document so a half-loaded mod never enters the catalog.
pub fn parse_item_file(source_name: &str, contents: &str) -> Result<Vec<ItemProto>, CatalogError> {
    let file: ItemFile = serde_json::from_str(contents).map_err(|source| CatalogError::Parse {
        source_name: source_name.to_string(),
        source,
    })?;

    let mut protos = Vec::with_capacity(file.items.len());
    let mut errors = Vec::new();
    for def in file.items {
        match def.into_proto() {
            Ok(proto) => protos.push(proto),
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if errors.is_empty() {
        Ok(protos)
    } else {
        Err(CatalogError::Validation { source_name: source_name.to_string(), errors })
    }
}

/// Load one definition file from disk.
pub fn load_item_file(path: &Path) -> Result<Vec<ItemProto>, CatalogError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
    parse_item_file(&path.display().to_string(), &contents)
}

/// The vanilla item definitions.
pub fn vanilla_items() -> Result<Vec<ItemProto>, CatalogError> {
    parse_item_file("vanilla", VANILLA_ITEMS)
}

/// Find mod definition files under a directory, sorted by path.
pub fn find_mod_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let pattern = format!("{}/**/*.json", dir.display());
    let mut files: Vec<PathBuf> = glob(&pattern)?.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

/// Build the catalog: vanilla first, then every mod file in sorted order.
///
/// Only a broken vanilla catalog is an error. Broken mod files become warnings.
pub fn load_catalog(options: &CatalogOptions) -> Result<(ItemCatalog, Vec<Warning>), CatalogError> {
    let mut protos = Vec::new();
    let mut warnings = Vec::new();

    if options.include_vanilla {
        protos.extend(vanilla_items()?);
    }
    let vanilla_count = protos.len();

    if let Some(dir) = &options.mods_dir {
        if dir.is_dir() {
            for path in find_mod_files(dir)? {
                match load_item_file(&path) {
                    Ok(items) => {
                        tracing::debug!(path = %path.display(), count = items.len(), "loaded mod items");
                        protos.extend(items);
                    }
                    Err(e) => {
                        tracing::warn!("skipping mod file: {}", e);
                        warnings.push(Warning::new(format!("Skipped mod file: {}", e)));
                    }
                }
            }
        } else {
            tracing::debug!(dir = %dir.display(), "mod directory not found, loading without mods");
        }
    }

    let (catalog, mut build_warnings) = ItemCatalog::from_protos(protos);
    warnings.append(&mut build_warnings);

    tracing::info!(
        vanilla = vanilla_count,
        modded = catalog.len() - vanilla_count,
        colors = catalog.codec().len(),
        "item catalog loaded"
    );
    Ok((catalog, warnings))
}
