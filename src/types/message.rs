use crate::types::{
    attributes::{FrameFormat, message_send_type_label},
    errors::{DbcError, Result},
    signal::Signal,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CAN message defined in the database, with its signals keyed by name.
///
/// Created from a `BO_` line, completed by `BA_ ... BO_` attributes, and
/// immutable once the catalog is finalized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Numeric CAN ID (base 10).
    pub message_id: u32,
    pub message_name: String,
    /// Payload length in bytes.
    pub message_size: u8,
    /// Transmitting node (ECU).
    pub node_name: String,
    /// `GenMsgSendType` code; `"0"` (cyclic) when only a positive cycle time was declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_type: Option<String>,
    #[serde(
        rename = "IL_support",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub il_support: Option<String>,
    /// Cycle time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_format: Option<FrameFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_manage_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnose_state: Option<String>,
    #[serde(default)]
    pub signals: BTreeMap<String, Signal>,
}

impl Message {
    /// **Normalized** hexadecimal CAN ID (`"0x..."`, uppercase).
    pub fn id_hex(&self) -> String {
        format!("0x{:X}", self.message_id)
    }

    /// Human-readable `GenMsgSendType`, when the code is known.
    pub fn send_type_label(&self) -> Option<&'static str> {
        self.send_type.as_deref().and_then(message_send_type_label)
    }

    pub fn is_cyclic(&self) -> bool {
        self.send_type.as_deref() == Some("0")
    }

    /// Finds a signal by name.
    ///
    /// Tries, in order: the exact name, a case-insensitive match, then the name
    /// with a trailing `_0x...` suffix removed (exact, then case-insensitive).
    pub fn get_signal(&self, name: &str) -> Option<&Signal> {
        if let Some(sig) = self.signals.get(name) {
            return Some(sig);
        }
        if let Some(sig) = self.find_ignore_case(name) {
            return Some(sig);
        }
        let stripped: &str = strip_id_suffix(name)?;
        self.signals
            .get(stripped)
            .or_else(|| self.find_ignore_case(stripped))
    }

    /// Like [`Message::get_signal`], but a miss is an [`DbcError::UnknownSignal`].
    pub fn signal(&self, name: &str) -> Result<&Signal> {
        self.get_signal(name).ok_or_else(|| {
            log::error!(
                "can not find signal data according to signal info: <message id={}, signal name={}>",
                self.message_id,
                name
            );
            DbcError::UnknownSignal {
                message_id: self.message_id,
                signal: name.to_string(),
            }
        })
    }

    fn find_ignore_case(&self, name: &str) -> Option<&Signal> {
        self.signals
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, sig)| sig)
    }
}

/// Strips a `_0x...` / `_0X...` suffix some callers append to signal names.
fn strip_id_suffix(name: &str) -> Option<&str> {
    let pos: usize = name.find("_0x").or_else(|| name.find("_0X"))?;
    Some(&name[..pos])
}

/// Parses a message id given either as decimal or as `0x`-prefixed hexadecimal.
pub fn parse_message_id(value: &str) -> Result<u32> {
    let trimmed: &str = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|_| DbcError::InvalidMessageId {
        value: value.to_string(),
    })
}

/// Reference to a message, by numeric id or by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageRef {
    Id(u32),
    Name(String),
}

impl MessageRef {
    /// Builds an id reference from a decimal or `0x...` string.
    pub fn parse_id(value: &str) -> Result<Self> {
        parse_message_id(value).map(MessageRef::Id)
    }

    pub fn name(name: &str) -> Self {
        MessageRef::Name(name.to_string())
    }
}

impl From<u32> for MessageRef {
    fn from(id: u32) -> Self {
        MessageRef::Id(id)
    }
}

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRef::Id(id) => write!(f, "message id={id}"),
            MessageRef::Name(name) => write!(f, "message name={name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_message() -> Message {
        let mut msg = Message {
            message_id: 763,
            message_name: "VMDR1".into(),
            message_size: 8,
            node_name: "GW".into(),
            send_type: Some("0".into()),
            cycle_time: Some(100),
            ..Default::default()
        };
        for name in ["MbrMonrEnaSts", "VehSpd"] {
            msg.signals.insert(
                name.to_string(),
                Signal {
                    signal_name: name.to_string(),
                    ..Default::default()
                },
            );
        }
        msg
    }

    #[test]
    fn test_get_signal_fallbacks() {
        let msg: Message = build_test_message();

        // Exact search
        assert_eq!(msg.get_signal("VehSpd").unwrap().signal_name, "VehSpd");
        // Insensitive search
        assert_eq!(msg.get_signal("vehspd").unwrap().signal_name, "VehSpd");
        // Suffixed search
        assert_eq!(msg.get_signal("VehSpd_0x2FB").unwrap().signal_name, "VehSpd");
        assert_eq!(
            msg.get_signal("mbrmonrenasts_0X2FB").unwrap().signal_name,
            "MbrMonrEnaSts"
        );
        // Signal not existing
        assert!(msg.get_signal("FakeSignal").is_none());
    }

    #[test]
    fn test_unknown_signal_is_an_error() {
        let msg: Message = build_test_message();
        match msg.signal("FakeSignal") {
            Err(DbcError::UnknownSignal { message_id, signal }) => {
                assert_eq!(message_id, 763);
                assert_eq!(signal, "FakeSignal");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_message_id() {
        assert_eq!(parse_message_id("0x2FB").unwrap(), 763);
        assert_eq!(parse_message_id("0X2fb").unwrap(), 763);
        assert_eq!(parse_message_id("763").unwrap(), 763);
        assert_eq!(parse_message_id(" 763 ").unwrap(), 763);
        assert!(parse_message_id("0xZZ").is_err());
        assert!(parse_message_id("VMDR1").is_err());
    }

    #[test]
    fn test_message_helpers() {
        let msg: Message = build_test_message();
        assert_eq!(msg.id_hex(), "0x2FB");
        assert!(msg.is_cyclic());
        assert_eq!(msg.send_type_label(), Some("Cyclic"));
    }
}
