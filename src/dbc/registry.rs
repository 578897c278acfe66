//! Registry of loaded DBC databases.
//!
//! Each DBC is loaded **once**, then handed out as a shared [`Arc<DbcDatabase>`].
//! Storage is a **SlotMap** arena with stable [`CatalogKey`]s, indexed by the
//! canonical path of the DBC file.

use crate::config::{CatalogConfig, resolve_dbc_path};
use crate::dbc::database::DbcDatabase;
use crate::types::errors::{DbcError, Result};

use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

new_key_type! { pub struct CatalogKey; }

/// Loaded DBC databases, keyed by file.
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    config: CatalogConfig,
    databases: SlotMap<CatalogKey, Arc<DbcDatabase>>,
    key_by_path: HashMap<PathBuf, CatalogKey>, // canonical path → CatalogKey
}

impl CatalogRegistry {
    pub fn new(config: CatalogConfig) -> Self {
        CatalogRegistry {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns the database of `file`, loading it on first use.
    ///
    /// `file` is resolved with [`resolve_dbc_path`] against the configured
    /// search directories; two names of the same file share one database.
    ///
    /// # Errors
    /// [`DbcError::FileNotFound`] when the file can not be resolved, or any
    /// error of [`DbcDatabase::open`].
    pub fn get_or_load(&mut self, file: &str) -> Result<Arc<DbcDatabase>> {
        let (key, _) = self.load(file)?;
        self.get(key).ok_or_else(|| DbcError::FileNotFound {
            path: file.to_string(),
        })
    }

    /// Same as [`CatalogRegistry::get_or_load`], returning the stable key.
    ///
    /// The flag is `true` when the database was loaded by this call.
    pub fn load(&mut self, file: &str) -> Result<(CatalogKey, bool)> {
        let resolved: PathBuf = resolve_dbc_path(file, &self.config.search_dirs)?;
        let canonical: PathBuf = resolved.canonicalize().map_err(|source| DbcError::Io {
            path: resolved.clone(),
            source,
        })?;

        if let Some(&key) = self.key_by_path.get(&canonical) {
            log::debug!("dbc already loaded: <{}>", canonical.display());
            return Ok((key, false));
        }

        let database: DbcDatabase = DbcDatabase::open(&canonical, &self.config)?;
        log::info!(
            "dbc loaded: <{}> ({} messages)",
            canonical.display(),
            database.catalog().len()
        );
        let key: CatalogKey = self.databases.insert(Arc::new(database));
        self.key_by_path.insert(canonical, key);
        Ok((key, true))
    }

    pub fn get(&self, key: CatalogKey) -> Option<Arc<DbcDatabase>> {
        self.databases.get(key).cloned()
    }

    /// Key of an already loaded file, looked up by path.
    pub fn key_for(&self, path: &Path) -> Option<CatalogKey> {
        let canonical: PathBuf = path.canonicalize().ok()?;
        self.key_by_path.get(&canonical).copied()
    }

    /// Drops the registry's handle; outstanding `Arc`s stay valid.
    pub fn unload(&mut self, key: CatalogKey) -> Option<Arc<DbcDatabase>> {
        let database: Arc<DbcDatabase> = self.databases.remove(key)?;
        self.key_by_path.retain(|_, k| *k != key);
        Some(database)
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CatalogKey, &Arc<DbcDatabase>)> {
        self.databases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DBC: &str = "BO_ 763 VMDR1: 8 GW\n SG_ VehSpd : 0|16@1+ (0.00390625,0) [0|255] \"km/h\" HUT\n";

    #[test]
    fn test_load_once_and_share() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("can");
        fs::create_dir(&sub).unwrap();
        let dbc_path = sub.join("P05.dbc");
        fs::write(&dbc_path, DBC).unwrap();

        let mut registry = CatalogRegistry::new(CatalogConfig {
            search_dirs: vec![dir.path().to_path_buf()],
            ..Default::default()
        });

        let (key, loaded) = registry.load(dbc_path.to_str().unwrap()).unwrap();
        assert!(loaded);
        let (same_key, loaded_again) = registry.load("P05.dbc").unwrap();
        assert!(!loaded_again);
        assert_eq!(key, same_key);
        assert_eq!(registry.len(), 1);

        let a = registry.get_or_load("P05.dbc").unwrap();
        let b = registry.get(key).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.catalog().len(), 1);
        assert_eq!(registry.key_for(&dbc_path), Some(key));

        // cache and ledger written next to the DBC
        assert!(sub.join("P05.json").exists());
        assert!(sub.join("P05.initial.json").exists());

        let removed = registry.unload(key).unwrap();
        assert!(Arc::ptr_eq(&removed, &a));
        assert!(registry.is_empty());
        assert_eq!(registry.key_for(&dbc_path), None);
    }

    #[test]
    fn test_missing_file() {
        let mut registry = CatalogRegistry::default();
        assert!(matches!(
            registry.get_or_load("Nowhere.dbc"),
            Err(DbcError::FileNotFound { .. })
        ));
    }
}
