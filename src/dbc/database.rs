use crate::codec::{self, EncodedSignal, Frame, MergeReport};
use crate::config::CatalogConfig;
use crate::dbc::{
    cache::{self, sidecar_path},
    ledger::{InitialValueLedger, ledger_key},
    parse,
};
use crate::types::{
    catalog::Catalog,
    errors::Result,
    message::{Message, MessageRef},
    signal::Signal,
};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A loaded DBC: its catalog and its initial-value ledger.
#[derive(Debug)]
pub struct DbcDatabase {
    path: PathBuf,
    catalog: Catalog,
    ledger: InitialValueLedger,
}

impl DbcDatabase {
    /// Loads the catalog of `path` (through its cache when enabled) and its ledger.
    ///
    /// # Errors
    /// Any parse, cache or ledger error; see [`cache::load_or_build`].
    pub fn open(path: &Path, config: &CatalogConfig) -> Result<Self> {
        let catalog: Catalog = if config.use_cache {
            cache::load_or_build(path, &sidecar_path(path, &config.cache_extension))?
        } else {
            parse::from_file(path)?
        };
        let ledger: InitialValueLedger =
            InitialValueLedger::load_or_seed(&sidecar_path(path, &config.ledger_extension), &catalog)?;
        Ok(DbcDatabase {
            path: path.to_path_buf(),
            catalog,
            ledger,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &InitialValueLedger {
        &self.ledger
    }

    /// Resolves a message and one of its signals; see [`Catalog::lookup`].
    pub fn lookup(&self, msg: &MessageRef, signal: &str) -> Result<(&Message, &Signal)> {
        self.catalog.lookup(msg, signal)
    }

    /// Adds the raw value of `physical` into `frame` and records it in the ledger.
    pub fn physical_to_frame(
        &self,
        frame: &mut Frame,
        msg: &MessageRef,
        signal: &str,
        physical: f64,
    ) -> Result<MergeReport> {
        let (message, sig) = self.lookup(msg, signal)?;
        let encoded: EncodedSignal = codec::encode_signal(message, sig, physical)?;
        let report: MergeReport = codec::merge_into(frame, message, &encoded)?;
        self.ledger
            .record_sent(message.message_id, &sig.signal_name, &encoded.raw.to_string());
        Ok(report)
    }

    /// Builds a whole frame of `msg` from `(signal, physical value)` pairs.
    pub fn encode(&self, msg: &MessageRef, values: &[(&str, f64)]) -> Result<(Frame, MergeReport)> {
        let message: &Message = self.catalog.message(msg)?;
        codec::encode_message(message, values)
    }

    /// Physical value of `signal` in a received frame of `msg`.
    pub fn decode(&self, msg: &MessageRef, signal: &str, data: &[u8]) -> Result<f64> {
        let (message, sig) = self.lookup(msg, signal)?;
        codec::decode_signal(message, sig, data)
    }

    /// Frame of `message` with every signal at its ledger initial value.
    ///
    /// Signals without an initial value stay zero.
    pub fn initial_frame(&self, message: &Message) -> Result<Frame> {
        let mut frame: Frame = Frame::new(usize::from(message.message_size));
        for sig in message.signals.values() {
            let Some(value) = self.ledger.initial_value(message.message_id, &sig.signal_name) else {
                continue;
            };
            let Ok(raw) = value.parse::<i64>() else {
                log::warn!(
                    "initial value '{}' of signal <{}> is not a raw integer, skipped",
                    value,
                    ledger_key(message.message_id, &sig.signal_name)
                );
                continue;
            };
            let encoded: EncodedSignal = codec::encode_raw(message, sig, raw)?;
            codec::merge_into(&mut frame, message, &encoded)?;
        }
        Ok(frame)
    }

    /// Frames restoring every signal sent away from its initial value, one per message.
    ///
    /// Each frame carries all signals of its message at their initial value,
    /// so signals that were never changed keep it too. Drains the ledger's
    /// pending set.
    pub fn reset_frames(&self) -> Result<Vec<(u32, Frame)>> {
        let message_ids: BTreeSet<u32> = self
            .ledger
            .take_pending_resets()
            .into_iter()
            .map(|reset| reset.message_id)
            .collect();

        let mut frames: Vec<(u32, Frame)> = Vec::with_capacity(message_ids.len());
        for id in message_ids {
            let message: &Message = self.catalog.message(&MessageRef::Id(id))?;
            frames.push((id, self.initial_frame(message)?));
        }
        Ok(frames)
    }
}
