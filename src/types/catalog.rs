use crate::types::{
    errors::{DbcError, Result},
    message::{Message, MessageRef},
    signal::Signal,
};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

const HEAD_KEY: &str = "head";

/// Database-level metadata captured from `BA_ "BusType"` and `BA_ "DBName"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogHead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
}

/// Message/signal catalog built from one DBC file.
///
/// Serialized as a single JSON object: the `"head"` key carries the
/// [`CatalogHead`], every other key is a decimal message id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub head: CatalogHead,
    pub messages: BTreeMap<String, Message>,
}

// `Signal::values` has integer keys, which do not survive `#[serde(flatten)]` buffering.
impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.messages.len() + 1))?;
        map.serialize_entry(HEAD_KEY, &self.head)?;
        for (id, message) in &self.messages {
            map.serialize_entry(id, message)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(CatalogVisitor)
    }
}

struct CatalogVisitor;

impl<'de> Visitor<'de> for CatalogVisitor {
    type Value = Catalog;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a catalog object keyed by \"head\" and message ids")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Catalog, A::Error> {
        let mut catalog: Catalog = Catalog::default();
        while let Some(key) = access.next_key::<String>()? {
            if key == HEAD_KEY {
                catalog.head = access.next_value()?;
            } else {
                let message: Message = access.next_value()?;
                catalog.messages.insert(key, message);
            }
        }
        Ok(catalog)
    }
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates over messages in id-string order.
    pub fn iter_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn message_by_id(&self, id: u32) -> Option<&Message> {
        self.messages.get(&id.to_string())
    }

    pub(crate) fn message_by_id_mut(&mut self, id: u32) -> Option<&mut Message> {
        self.messages.get_mut(&id.to_string())
    }

    /// Returns a message by name (exact match).
    pub fn message_by_name(&self, name: &str) -> Option<&Message> {
        self.messages.values().find(|m| m.message_name == name)
    }

    /// Resolves a [`MessageRef`], failing with [`DbcError::UnknownMessage`].
    pub fn message(&self, msg: &MessageRef) -> Result<&Message> {
        let found: Option<&Message> = match msg {
            MessageRef::Id(id) => self.message_by_id(*id),
            MessageRef::Name(name) => self.message_by_name(name),
        };
        found.ok_or_else(|| {
            log::error!("can not find message according to message info: <{msg}>");
            DbcError::UnknownMessage {
                message: msg.to_string(),
            }
        })
    }

    /// Resolves a message and one of its signals.
    pub fn lookup(&self, msg: &MessageRef, signal: &str) -> Result<(&Message, &Signal)> {
        let message: &Message = self.message(msg)?;
        let sig: &Signal = message.signal(signal)?;
        log::debug!(
            "msg found: <{} {}>, signal: <{}>",
            message.id_hex(),
            message.message_name,
            sig.signal_name
        );
        Ok((message, sig))
    }

    /// Total number of signals across all messages.
    pub fn signal_count(&self) -> usize {
        self.messages.values().map(|m| m.signals.len()).sum()
    }
}
