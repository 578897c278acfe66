use crate::codec::value::BytePlacement;
use crate::types::attributes::signal_send_type_label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Byte order flag of a signal as written after `@` in an `SG_` line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// `@0`: big-endian, the declared start bit is the signal's MSB.
    #[serde(rename = "motorola")]
    Motorola,
    /// `@1`: little-endian, the declared start bit is the signal's LSB.
    #[default]
    #[serde(rename = "intel")]
    Intel,
}

impl ByteOrder {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "0" => Some(ByteOrder::Motorola),
            "1" => Some(ByteOrder::Intel),
            _ => None,
        }
    }

    pub fn flag(&self) -> u8 {
        match self {
            ByteOrder::Motorola => 0,
            ByteOrder::Intel => 1,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Motorola => f.write_str("Motorola"),
            ByteOrder::Intel => f.write_str("Intel"),
        }
    }
}

/// Value type flag of a signal (`+` or `-` after the byte order).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    #[serde(rename = "+")]
    Unsigned,
    #[serde(rename = "-")]
    Signed,
}

impl ValueType {
    pub fn from_sign(sign: &str) -> Option<Self> {
        match sign {
            "+" => Some(ValueType::Unsigned),
            "-" => Some(ValueType::Signed),
            _ => None,
        }
    }
}

/// Definition of a signal within a CAN message, as kept in the catalog.
///
/// Describes the declared bit layout, scaling (`physical = raw * factor + offset`),
/// valid range, unit and receiver, together with the values merged from
/// `BA_ ... SG_` attributes and `VAL_` tables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_name: String,
    /// Start bit as written in the `SG_` line.
    pub raw_start_bit: u16,
    /// Bit length.
    pub signal_size: u16,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    pub factor: f64,
    pub offset: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub unit: String,
    pub receiver: String,
    /// Absolute start bit derived from `raw_start_bit`, `signal_size` and `byte_order`.
    pub start_bit: i32,
    /// Raw default value (`GenSigStartValue`, rescaled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    /// Value table: raw value → label.
    #[serde(default)]
    pub values: BTreeMap<i64, String>,
    /// Raw value of the first `VAL_` pair, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_value: Option<i64>,
}

impl Signal {
    pub fn is_signed(&self) -> bool {
        self.value_type == ValueType::Signed
    }

    /// Byte/bit position of the signal derived from its absolute start bit.
    pub fn placement(&self) -> BytePlacement {
        BytePlacement::from_absolute(self.start_bit, self.signal_size)
    }

    /// Label of the raw value in the value table, if any.
    pub fn label_for(&self, raw: i64) -> Option<&str> {
        self.values.get(&raw).map(String::as_str)
    }

    /// Human-readable `GenSigSendType`, when the code is known.
    pub fn send_type_label(&self) -> Option<&'static str> {
        self.send_type.as_deref().and_then(signal_send_type_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_signal() -> Signal {
        Signal {
            signal_name: "LampSts".into(),
            raw_start_bit: 7,
            signal_size: 2,
            byte_order: ByteOrder::Motorola,
            value_type: ValueType::Unsigned,
            factor: 1.0,
            offset: 0.0,
            min_value: 0.0,
            max_value: 3.0,
            unit: String::new(),
            receiver: "HUT".into(),
            start_bit: 6,
            send_type: Some("3".into()),
            values: BTreeMap::from([
                (0, "Lamp off".to_string()),
                (1, "Lamp on".to_string()),
                (3, "Reserved".to_string()),
            ]),
            first_value: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_flags() {
        assert_eq!(ByteOrder::from_flag("0"), Some(ByteOrder::Motorola));
        assert_eq!(ByteOrder::from_flag("1"), Some(ByteOrder::Intel));
        assert_eq!(ByteOrder::from_flag("2"), None);
        assert_eq!(ByteOrder::Motorola.flag(), 0);
        assert_eq!(ValueType::from_sign("-"), Some(ValueType::Signed));
        assert_eq!(ValueType::from_sign("*"), None);
    }

    #[test]
    fn test_value_table_lookups() {
        let sig: Signal = build_test_signal();

        assert_eq!(sig.label_for(1), Some("Lamp on"));
        assert_eq!(sig.label_for(2), None);
        assert_eq!(sig.send_type_label(), Some("OnChange"));
    }

    #[test]
    fn test_serde_keeps_value_table_keys() {
        let sig: Signal = build_test_signal();
        let json: String = serde_json::to_string(&sig).unwrap();

        assert!(json.contains("\"byte_order\":\"motorola\""));
        assert!(json.contains("\"3\":\"Reserved\""));
        assert!(!json.contains("default_value"));

        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
