//! # codec
//!
//! Physical ↔ raw conversion and packing of signals into CAN payloads.
//!
//! Encoding a signal goes through three stages:
//! 1. [`value::physical_to_raw`] scales the physical value;
//! 2. [`SignalLayout::split`] cuts the raw bit pattern into byte chunks;
//! 3. [`Frame::merge`] adds the chunks into the shared payload.

pub mod frame;
pub mod layout;
pub mod value;

pub use frame::{Frame, MergeReport, Overlap};
pub use layout::{ByteChunk, SignalLayout};
pub use value::{BytePlacement, physical_to_raw, raw_to_physical};

use crate::types::{
    errors::{DbcError, Result},
    message::Message,
    signal::Signal,
};

/// A signal encoded to raw value and byte chunks, ready to merge.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedSignal {
    pub raw: i64,
    pub placement: BytePlacement,
    pub chunks: Vec<ByteChunk>,
}

/// Encodes one physical value of `signal` (belonging to `message`).
pub fn encode_signal(message: &Message, signal: &Signal, physical: f64) -> Result<EncodedSignal> {
    let raw: i64 = value::physical_to_raw(signal, physical)?;
    log::debug!(
        "encode <{}:{}={}>: raw={}",
        message.id_hex(),
        signal.signal_name,
        physical,
        raw
    );
    encode_raw(message, signal, raw)
}

/// Encodes an already scaled raw value of `signal`.
///
/// # Errors
/// - [`DbcError::RawOutOfRange`] when `raw` does not fit the signal's bits.
/// - [`DbcError::Layout`] when the signal does not fit the message.
pub fn encode_raw(message: &Message, signal: &Signal, raw: i64) -> Result<EncodedSignal> {
    value::check_raw(signal, raw)?;
    let layout: SignalLayout = SignalLayout::compile(signal, message.message_size)?;
    let chunks: Vec<ByteChunk> = layout.split(value::raw_to_bits(signal, raw));
    let placement: BytePlacement = signal.placement();
    log::debug!(
        "placement <{}:{}>: byte_position={} bit_position={} byte_len={}",
        message.id_hex(),
        signal.signal_name,
        placement.byte_position,
        placement.bit_position,
        placement.byte_len
    );
    Ok(EncodedSignal {
        raw,
        placement,
        chunks,
    })
}

/// Encodes `physical` for `signal` and merges it into `frame`.
///
/// # Errors
/// - [`DbcError::FrameTooShort`] when `frame` is smaller than the message.
/// - any error of [`encode_signal`].
pub fn physical_to_frame(
    frame: &mut Frame,
    message: &Message,
    signal: &Signal,
    physical: f64,
) -> Result<MergeReport> {
    ensure_frame_size(message, frame.len())?;
    let encoded: EncodedSignal = encode_signal(message, signal, physical)?;
    Ok(frame.merge(&encoded.chunks))
}

/// Merges an already encoded signal of `message` into `frame`.
pub fn merge_into(frame: &mut Frame, message: &Message, encoded: &EncodedSignal) -> Result<MergeReport> {
    ensure_frame_size(message, frame.len())?;
    Ok(frame.merge(&encoded.chunks))
}

/// Builds a fresh frame for `message` from `(signal name, physical value)` pairs.
///
/// Signals not listed stay zero. Overlapping signals are summed and reported.
pub fn encode_message(message: &Message, values: &[(&str, f64)]) -> Result<(Frame, MergeReport)> {
    let mut frame: Frame = Frame::new(message.message_size as usize);
    let mut report: MergeReport = MergeReport::default();
    for &(name, physical) in values {
        let signal: &Signal = message.signal(name)?;
        report.extend(physical_to_frame(&mut frame, message, signal, physical)?);
    }
    Ok((frame, report))
}

/// Reads the raw value of `signal` from a payload.
pub fn decode_raw(message: &Message, signal: &Signal, data: &[u8]) -> Result<i64> {
    ensure_frame_size(message, data.len())?;
    let layout: SignalLayout = SignalLayout::compile(signal, message.message_size)?;
    Ok(value::bits_to_raw(signal, layout.extract(data)))
}

/// Reads the physical value of `signal` from a payload.
pub fn decode_signal(message: &Message, signal: &Signal, data: &[u8]) -> Result<f64> {
    decode_raw(message, signal, data).map(|raw| value::raw_to_physical(signal, raw))
}

fn ensure_frame_size(message: &Message, actual: usize) -> Result<()> {
    let expected: usize = message.message_size as usize;
    if actual < expected {
        log::error!(
            "frame of {} byte(s) is shorter than message <{}> ({} bytes)",
            actual,
            message.message_name,
            expected
        );
        return Err(DbcError::FrameTooShort { expected, actual });
    }
    Ok(())
}
