use serde::{Deserialize, Serialize};
use std::fmt;

/// Value carried by a `BA_` statement: either a bare number or a quoted string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// Bare numeric literal, kept as written.
    Number(&'a str),
    /// Content of a quoted string, without the quotes.
    Text(&'a str),
}

impl<'a> AttributeValue<'a> {
    /// Classifies a raw value token as written after the object reference.
    pub(crate) fn from_token(token: &'a str) -> Option<Self> {
        let token: &str = token.trim();
        if let Some(inner) = token.strip_prefix('"') {
            return inner.strip_suffix('"').map(AttributeValue::Text);
        }
        if token.is_empty() || token.contains(char::is_whitespace) {
            return None;
        }
        let numeric: bool = token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
        if numeric { Some(AttributeValue::Number(token)) } else { None }
    }

    /// The textual value, whatever its form.
    pub fn as_str(&self) -> &'a str {
        match self {
            AttributeValue::Number(s) | AttributeValue::Text(s) => s,
        }
    }
}

impl fmt::Display for AttributeValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(s) => f.write_str(s),
            AttributeValue::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Message attributes (`BA_ "<name>" BO_ ...`) kept in the catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageAttr {
    SendType,
    IlSupport,
    CycleTime,
    FrameFormat,
    NmMessage,
    DiagState,
}

impl MessageAttr {
    /// Maps a DBC attribute name to the catalog field it feeds.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GenMsgSendType" => Some(MessageAttr::SendType),
            "GenMsgILSupport" => Some(MessageAttr::IlSupport),
            "GenMsgCycleTime" => Some(MessageAttr::CycleTime),
            "VFrameFormat" => Some(MessageAttr::FrameFormat),
            "NmMessage" => Some(MessageAttr::NmMessage),
            "DiagState" => Some(MessageAttr::DiagState),
            _ => None,
        }
    }

    /// Canonical field name in the catalog.
    pub fn field_name(&self) -> &'static str {
        match self {
            MessageAttr::SendType => "send_type",
            MessageAttr::IlSupport => "IL_support",
            MessageAttr::CycleTime => "cycle_time",
            MessageAttr::FrameFormat => "frame_format",
            MessageAttr::NmMessage => "network_manage_message",
            MessageAttr::DiagState => "diagnose_state",
        }
    }
}

/// Signal attributes (`BA_ "<name>" SG_ ...`) kept in the catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SignalAttr {
    StartValue,
    SendType,
    CycleTime,
    LongName,
}

impl SignalAttr {
    /// Maps a DBC attribute name to the catalog field it feeds.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GenSigStartValue" => Some(SignalAttr::StartValue),
            "GenSigSendType" => Some(SignalAttr::SendType),
            "GenSigCycleTime" => Some(SignalAttr::CycleTime),
            "SystemSignalLongSymbol" => Some(SignalAttr::LongName),
            _ => None,
        }
    }

    /// Canonical field name in the catalog.
    pub fn field_name(&self) -> &'static str {
        match self {
            SignalAttr::StartValue => "default_value",
            SignalAttr::SendType => "send_type",
            SignalAttr::CycleTime => "cycle_time",
            SignalAttr::LongName => "long_name",
        }
    }
}

/// Frame format as declared by the `VFrameFormat` attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    #[serde(rename = "StandardCAN")]
    StandardCan,
    #[serde(rename = "ExtendedCAN")]
    ExtendedCan,
    #[serde(rename = "StandardCAN_FD")]
    StandardCanFd,
    #[serde(rename = "ExtendedCAN_FD")]
    ExtendedCanFd,
}

impl FrameFormat {
    /// Decodes the numeric `VFrameFormat` code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(FrameFormat::StandardCan),
            "1" => Some(FrameFormat::ExtendedCan),
            "14" => Some(FrameFormat::StandardCanFd),
            "15" => Some(FrameFormat::ExtendedCanFd),
            _ => None,
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameFormat::StandardCan => f.write_str("StandardCAN"),
            FrameFormat::ExtendedCan => f.write_str("ExtendedCAN"),
            FrameFormat::StandardCanFd => f.write_str("StandardCAN_FD"),
            FrameFormat::ExtendedCanFd => f.write_str("ExtendedCAN_FD"),
        }
    }
}

/// `GenMsgILSupport` code → label.
pub fn il_support_label(code: &str) -> Option<&'static str> {
    match code {
        "0" => Some("No"),
        "1" => Some("Yes"),
        _ => None,
    }
}

/// `GenMsgSendType` code → label.
pub fn message_send_type_label(code: &str) -> Option<&'static str> {
    match code {
        "0" => Some("Cyclic"),
        "1" => Some("CyclicAndSpontanX"),
        "2" => Some("Event"),
        _ => None,
    }
}

/// `GenSigSendType` code → label.
pub fn signal_send_type_label(code: &str) -> Option<&'static str> {
    match code {
        "0" => Some("Cyclic"),
        "1" => Some("OnWrite"),
        "2" => Some("OnWriteWithRepetition"),
        "3" => Some("OnChange"),
        "4" => Some("OnChangeWithRepetition"),
        "7" => Some("NoSigSendType"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_from_token() {
        assert_eq!(
            AttributeValue::from_token("100"),
            Some(AttributeValue::Number("100"))
        );
        assert_eq!(
            AttributeValue::from_token("-2.5"),
            Some(AttributeValue::Number("-2.5"))
        );
        assert_eq!(
            AttributeValue::from_token("\"VehSpeedLong\""),
            Some(AttributeValue::Text("VehSpeedLong"))
        );
        assert_eq!(AttributeValue::from_token("\"unterminated"), None);
        assert_eq!(AttributeValue::from_token("abc"), None);
        assert_eq!(AttributeValue::from_token(""), None);
    }

    #[test]
    fn test_frame_format_codes() {
        assert_eq!(FrameFormat::from_code("0"), Some(FrameFormat::StandardCan));
        assert_eq!(FrameFormat::from_code("15"), Some(FrameFormat::ExtendedCanFd));
        assert_eq!(FrameFormat::from_code("7"), None);
        assert_eq!(FrameFormat::StandardCanFd.to_string(), "StandardCAN_FD");
    }

    #[test]
    fn test_attribute_names() {
        assert_eq!(
            MessageAttr::from_name("VFrameFormat"),
            Some(MessageAttr::FrameFormat)
        );
        assert_eq!(MessageAttr::from_name("GenMsgDelayTime"), None);
        assert_eq!(
            SignalAttr::from_name("GenSigStartValue").map(|a| a.field_name()),
            Some("default_value")
        );
        assert_eq!(il_support_label("1"), Some("Yes"));
        assert_eq!(signal_send_type_label("7"), Some("NoSigSendType"));
        assert_eq!(message_send_type_label("5"), None);
    }
}
