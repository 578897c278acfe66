use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DbcError>;

/// Errors produced while building, caching or using a DBC catalog.
///
/// Every variant is fatal to the operation that returned it. The only
/// recoverable condition in the pipeline (undecodable bytes on a line) is
/// logged and never surfaces here.
#[derive(Debug, Error)]
pub enum DbcError {
    #[error("DBC file not found: <{path}>")]
    FileNotFound { path: String },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("DBC, {kind} can not be parsed at line {line_no}: <{line}>")]
    Grammar {
        kind: &'static str,
        line_no: usize,
        line: String,
    },
    #[error("DBC, multiplexed signals are not supported (line {line_no}): <{line}>")]
    MultiplexedSignal { line_no: usize, line: String },
    #[error("DBC, signal defined outside of a message block (line {line_no}): <{line}>")]
    OrphanSignal { line_no: usize, line: String },
    #[error("DBC, invalid {field} value '{value}' at line {line_no}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        line_no: usize,
    },
    #[error("DBC, attribute '{attribute}' has no entry for code '{code}'")]
    UnknownAttributeCode { attribute: String, code: String },
    #[error("DBC, message id {message_id} is defined twice")]
    DuplicateMessage { message_id: u32 },
    #[error("DBC, value table for signal '{signal}' of message {message_id} already exists")]
    DuplicateValueTable { message_id: u32, signal: String },
    #[error("can not find message according to message info: <{message}>")]
    UnknownMessage { message: String },
    #[error("can not find signal '{signal}' in message {message_id}")]
    UnknownSignal { message_id: u32, signal: String },
    #[error("invalid message id: '{value}'")]
    InvalidMessageId { value: String },
    #[error("signal '{signal}' has a zero scale factor")]
    ZeroScale { signal: String },
    #[error("raw value {raw} does not fit the {bits} bit(s) of signal '{signal}'")]
    RawOutOfRange { signal: String, raw: i64, bits: u16 },
    #[error("frame buffer of {actual} byte(s) is shorter than message size {expected}")]
    FrameTooShort { expected: usize, actual: usize },
    #[error("Failed to (de)serialize cache '{path}'. \nError: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration '{path}'. \nError: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Layout(#[from] MessageLayoutError),
}

/// Errors produced while verifying that a signal fits a CAN frame layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageLayoutError {
    #[error("Signal Bit Length cannot be zero")]
    ZeroBitLength,
    #[error(
        "Out of bounds (Intel)! \nSignal end bit = {end} \nMessage total bits = {total_bits} (bytes={dlc})"
    )]
    IntelOutOfBounds {
        end: usize,
        total_bits: usize,
        dlc: u8,
    },
    #[error(
        "Out of bounds (Motorola)! \nSignal linearized  start = {start} \nMessage total bits = {total_bits} (bytes={dlc})"
    )]
    MotorolaStartOutOfBounds {
        start: usize,
        total_bits: usize,
        dlc: u8,
    },
    #[error(
        "Out of bounds (Motorola)! \nSignal linearized  end = {end} \nMessage total bits = {total_bits} (bytes={dlc})"
    )]
    MotorolaEndOutOfBounds {
        end: usize,
        total_bits: usize,
        dlc: u8,
    },
    #[error("Signal Bit Length {length} exceeds the 64 bit raw value range")]
    TooWide { length: u16 },
}
