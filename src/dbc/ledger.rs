use crate::types::{
    catalog::Catalog,
    errors::{DbcError, Result},
};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ledger key of a signal: `"<message id>-<signal name>"`.
pub fn ledger_key(message_id: u32, signal_name: &str) -> String {
    format!("{message_id}-{signal_name}")
}

/// A signal that was sent with a value other than its initial one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReset {
    pub message_id: u32,
    pub signal_name: String,
    /// Initial value to send back.
    pub value: String,
}

/// Initial value of every signal, plus the signals currently away from it.
///
/// The initial values are persisted next to the DBC; the pending set lives
/// only in memory and is shared between senders.
#[derive(Debug, Default)]
pub struct InitialValueLedger {
    initial: BTreeMap<String, String>,
    pending: Mutex<BTreeMap<(u32, String), String>>,
}

impl InitialValueLedger {
    /// Seeds one entry per signal: the first value declared in its `VAL_`
    /// table, or `"0"`.
    pub fn seed(catalog: &Catalog) -> Self {
        let mut initial: BTreeMap<String, String> = BTreeMap::new();
        for message in catalog.iter_messages() {
            for signal in message.signals.values() {
                let value: String = signal
                    .first_value
                    .map(|raw| raw.to_string())
                    .unwrap_or_else(|| "0".to_string());
                initial.insert(ledger_key(message.message_id, &signal.signal_name), value);
            }
        }
        InitialValueLedger {
            initial,
            pending: Mutex::default(),
        }
    }

    /// Loads the ledger at `path`, or seeds it from `catalog` and writes it there.
    pub fn load_or_seed(path: &Path, catalog: &Catalog) -> Result<Self> {
        if path.exists() {
            log::info!("initial value file is found: <{}>", path.display());
            return Self::load(path);
        }
        let ledger: InitialValueLedger = Self::seed(catalog);
        ledger.store(path)?;
        log::info!("initial value file is created: <{}>", path.display());
        Ok(ledger)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file: File = File::open(path).map_err(|source| DbcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let initial: BTreeMap<String, String> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| DbcError::Cache {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(InitialValueLedger {
            initial,
            pending: Mutex::default(),
        })
    }

    /// Writes the initial values as pretty-printed JSON.
    pub fn store(&self, path: &Path) -> Result<()> {
        let io_err = |source| DbcError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut writer: BufWriter<File> = BufWriter::new(File::create(path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut writer, &self.initial).map_err(|source| {
            DbcError::Cache {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)
    }

    pub fn len(&self) -> usize {
        self.initial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }

    pub fn initial_value(&self, message_id: u32, signal_name: &str) -> Option<&str> {
        self.initial
            .get(&ledger_key(message_id, signal_name))
            .map(String::as_str)
    }

    /// Tracks a value that was just sent.
    ///
    /// A value different from the initial one marks the signal pending; the
    /// initial value clears it. Signals without an initial value are ignored.
    pub fn record_sent(&self, message_id: u32, signal_name: &str, value: &str) {
        let Some(initial) = self.initial_value(message_id, signal_name) else {
            log::debug!(
                "no initial value stored for signal: <{}>",
                ledger_key(message_id, signal_name)
            );
            return;
        };

        let key: (u32, String) = (message_id, signal_name.to_string());
        let mut pending = self.lock_pending();
        if value == initial {
            pending.remove(&key);
        } else {
            pending.insert(key, value.to_string());
        }
    }

    /// Number of signals currently away from their initial value.
    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    /// Drains the pending set, returning the initial value of each signal.
    pub fn take_pending_resets(&self) -> Vec<PendingReset> {
        let drained: BTreeMap<(u32, String), String> = std::mem::take(&mut *self.lock_pending());
        drained
            .into_keys()
            .filter_map(|(message_id, signal_name)| {
                let value: String = self.initial_value(message_id, &signal_name)?.to_string();
                Some(PendingReset {
                    message_id,
                    signal_name,
                    value,
                })
            })
            .collect()
    }

    fn lock_pending(&self) -> MutexGuard<'_, BTreeMap<(u32, String), String>> {
        // a panicked holder leaves the map usable
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
