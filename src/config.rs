//! Catalog loading options and DBC file lookup.

use crate::types::errors::{DbcError, Result};

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Options used when a DBC is turned into a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Extension of the catalog cache written next to the DBC.
    pub cache_extension: String,
    /// Extension of the initial-value file written next to the DBC.
    pub ledger_extension: String,
    /// Directories searched (recursively) for bare DBC file names.
    pub search_dirs: Vec<PathBuf>,
    /// When `false`, the DBC is always parsed and no cache is read or written.
    pub use_cache: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            cache_extension: "json".to_string(),
            ledger_extension: "initial.json".to_string(),
            search_dirs: Vec::new(),
            use_cache: true,
        }
    }
}

impl CatalogConfig {
    /// Reads a configuration from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file: File = File::open(path).map_err(|source| DbcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            log::error!("invalid configuration file: <{}>", path.display());
            DbcError::Config {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

fn has_dbc_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dbc"))
}

/// Resolves the DBC to load.
///
/// - an existing `.dbc` path is used as is;
/// - a `.dbc` file name is searched for in `search_dirs`, recursively;
/// - an empty name picks the first `.dbc` found in `search_dirs`.
///
/// Directory entries are visited in name order.
///
/// # Errors
/// [`DbcError::FileNotFound`] when nothing matches.
pub fn resolve_dbc_path(file: &str, search_dirs: &[PathBuf]) -> Result<PathBuf> {
    let requested: &Path = Path::new(file);
    if !file.is_empty() && has_dbc_extension(requested) && requested.is_file() {
        return Ok(requested.to_path_buf());
    }

    let wanted: Option<&std::ffi::OsStr> = if file.is_empty() {
        None
    } else if has_dbc_extension(requested) {
        requested.file_name()
    } else {
        log::error!("dbc file is not found: <{file}>");
        return Err(DbcError::FileNotFound {
            path: file.to_string(),
        });
    };

    for dir in search_dirs {
        if let Some(found) = search_dir(dir, wanted) {
            log::debug!("dbc file resolved: <{}>", found.display());
            return Ok(found);
        }
    }

    log::error!("dbc file is not found: <{file}>");
    Err(DbcError::FileNotFound {
        path: file.to_string(),
    })
}

fn search_dir(dir: &Path, wanted: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        log::debug!("search directory can not be read: <{}>", dir.display());
        return None;
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();

    // files of this directory first, then its subdirectories
    let (dirs, files): (Vec<PathBuf>, Vec<PathBuf>) = paths.into_iter().partition(|p| p.is_dir());
    let hit: Option<PathBuf> = files.into_iter().find(|p| match wanted {
        Some(name) => p.file_name() == Some(name),
        None => has_dbc_extension(p),
    });
    hit.or_else(|| dirs.iter().find_map(|d| search_dir(d, wanted)))
}
