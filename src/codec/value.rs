use crate::types::{
    errors::{DbcError, Result},
    signal::Signal,
};

/// Byte/bit coordinates of a signal derived from its absolute start bit.
///
/// Positions are 1-based, as reported to frame-oriented tooling:
/// - `byte_position = start_bit div 8 + 1`
/// - `bit_position = start_bit mod 8 + 1`
/// - `byte_len = length div 8 + 1`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BytePlacement {
    pub byte_position: i32,
    pub bit_position: u8,
    pub byte_len: u16,
}

impl BytePlacement {
    pub fn from_absolute(start_bit: i32, length: u16) -> Self {
        BytePlacement {
            byte_position: start_bit.div_euclid(8) + 1,
            bit_position: start_bit.rem_euclid(8) as u8 + 1,
            byte_len: length / 8 + 1,
        }
    }
}

/// Inclusive range of raw values representable by the signal's bit width.
pub fn raw_range(signal: &Signal) -> (i64, i64) {
    let bits: u32 = u32::from(signal.signal_size.clamp(1, 64));
    if signal.is_signed() {
        if bits == 64 {
            (i64::MIN, i64::MAX)
        } else {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        }
    } else if bits >= 63 {
        (0, i64::MAX)
    } else {
        (0, (1i64 << bits) - 1)
    }
}

/// Physical → raw: `floor((physical - offset) / factor)`.
///
/// # Errors
/// - [`DbcError::ZeroScale`] when the factor is zero.
/// - [`DbcError::RawOutOfRange`] when the result does not fit the signal's bits.
pub fn physical_to_raw(signal: &Signal, physical: f64) -> Result<i64> {
    if signal.factor == 0.0 {
        log::error!("signal <{}> has a zero scale factor", signal.signal_name);
        return Err(DbcError::ZeroScale {
            signal: signal.signal_name.clone(),
        });
    }
    let scaled: f64 = ((physical - signal.offset) / signal.factor).floor();
    let (min, max) = raw_range(signal);
    if !scaled.is_finite() || scaled < min as f64 || scaled > max as f64 {
        let raw: i64 = scaled as i64;
        log::error!(
            "physical value {} of signal <{}> gives raw {} outside [{}, {}]",
            physical,
            signal.signal_name,
            raw,
            min,
            max
        );
        return Err(DbcError::RawOutOfRange {
            signal: signal.signal_name.clone(),
            raw,
            bits: signal.signal_size,
        });
    }
    Ok(scaled as i64)
}

/// Fails with [`DbcError::RawOutOfRange`] when `raw` does not fit the signal's bits.
pub fn check_raw(signal: &Signal, raw: i64) -> Result<()> {
    let (min, max) = raw_range(signal);
    if raw < min || raw > max {
        log::error!(
            "raw value {} of signal <{}> is outside [{}, {}]",
            raw,
            signal.signal_name,
            min,
            max
        );
        return Err(DbcError::RawOutOfRange {
            signal: signal.signal_name.clone(),
            raw,
            bits: signal.signal_size,
        });
    }
    Ok(())
}

/// Raw → physical: `raw * factor + offset`.
pub fn raw_to_physical(signal: &Signal, raw: i64) -> f64 {
    (raw as f64) * signal.factor + signal.offset
}

/// Raw value as the unsigned bit pattern transmitted on the bus (two's complement).
pub fn raw_to_bits(signal: &Signal, raw: i64) -> u64 {
    let bits: u16 = signal.signal_size.min(64);
    let mask: u64 = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
    (raw as u64) & mask
}

/// Bit pattern → raw value, sign-extending signed signals.
pub fn bits_to_raw(signal: &Signal, bits_value: u64) -> i64 {
    let n: u16 = signal.signal_size.min(64);
    if signal.is_signed() && n > 0 && n < 64 {
        let sign_bit: u64 = 1u64 << (n - 1);
        if (bits_value & sign_bit) != 0 {
            let mask: u64 = (1u64 << n) - 1;
            return (bits_value | !mask) as i64;
        }
    }
    bits_value as i64
}
