use crate::dbc::parse;
use crate::types::{
    catalog::Catalog,
    errors::{DbcError, Result},
};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of a sidecar file next to the DBC (`vehicle.dbc` → `vehicle.<extension>`).
pub fn sidecar_path(dbc_path: &Path, extension: &str) -> PathBuf {
    dbc_path.with_extension(extension)
}

/// Reads a catalog previously written by [`store`].
pub fn load(path: &Path) -> Result<Catalog> {
    let file: File = File::open(path).map_err(|source| DbcError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        log::error!("cache file can not be read: <{}>", path.display());
        DbcError::Cache {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Writes `catalog` as pretty-printed JSON, replacing any existing file.
pub fn store(path: &Path, catalog: &Catalog) -> Result<()> {
    let io_err = |source| DbcError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file: File = File::create(path).map_err(io_err)?;
    let mut writer: BufWriter<File> = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, catalog).map_err(|source| DbcError::Cache {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

/// Returns the catalog of `dbc_path`, from its cache when one exists.
///
/// Without a cache the DBC is parsed and the result stored at `cache_path`.
/// A cache is never checked against the DBC it came from: delete it after
/// editing the DBC.
///
/// # Errors
/// Parse errors of [`parse::from_file`], and I/O or JSON errors on the cache.
pub fn load_or_build(dbc_path: &Path, cache_path: &Path) -> Result<Catalog> {
    if cache_path.exists() {
        log::info!(
            "dbc cache is found, if dbc is modified, please delete this cache file: <{}>",
            cache_path.display()
        );
        return load(cache_path);
    }

    let catalog: Catalog = parse::from_file(dbc_path)?;
    store(cache_path, &catalog)?;
    log::info!("dbc cache is created: <{}>", cache_path.display());
    Ok(catalog)
}
