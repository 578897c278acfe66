use crate::dbc::core::message_layout::check_signal_fits;
use crate::types::{
    errors::Result,
    signal::{ByteOrder, Signal},
};

/// Elementary step mapping part of a signal onto one payload byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Step {
    /// Payload byte index.
    pub(crate) byte_index: usize,
    /// LSB within the payload byte (0..7).
    pub(crate) src_lsb: u8,
    /// Number of bits in this byte (1..8).
    pub(crate) width: u8,
    /// LSB of the same bits in the raw value (LSB-first).
    pub(crate) dst_lsb: u16,
}

impl Step {
    #[inline]
    fn value_mask(&self) -> u64 {
        if self.width >= 8 {
            0xFF
        } else {
            (1u64 << self.width) - 1
        }
    }
}

/// One byte-sized piece of an encoded signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteChunk {
    /// Payload byte index (0-based).
    pub index: usize,
    /// Signal bits already shifted into their position within the byte.
    pub value: u8,
    /// Bits of the byte owned by the signal.
    pub mask: u8,
}

/// Bit layout of one signal inside a frame of a given size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalLayout {
    steps: Vec<Step>,
}

impl SignalLayout {
    /// Compiles the byte steps of `signal` for a frame of `message_size` bytes.
    ///
    /// # Errors
    /// [`MessageLayoutError`](crate::MessageLayoutError) when the signal does not fit the frame.
    pub fn compile(signal: &Signal, message_size: u8) -> Result<Self> {
        check_signal_fits(
            message_size,
            signal.raw_start_bit,
            signal.signal_size,
            signal.byte_order,
        )
        .inspect_err(|e| {
            log::error!(
                "signal <{}> does not fit a {} byte frame: {}",
                signal.signal_name,
                message_size,
                e
            )
        })?;

        // ceil((bit_len + (bit_start % 8)) / 8)
        let n_steps: usize = (signal.signal_size as usize + (signal.raw_start_bit as usize & 7))
            .div_ceil(8)
            .max(1);
        let mut steps: Vec<Step> = Vec::with_capacity(n_steps);

        match signal.byte_order {
            ByteOrder::Intel => compile_intel(&mut steps, signal.raw_start_bit, signal.signal_size),
            ByteOrder::Motorola => {
                compile_motorola(&mut steps, signal.raw_start_bit, signal.signal_size)
            }
        }
        Ok(SignalLayout { steps })
    }

    /// Index of the first payload byte (in transmission order) holding signal bits.
    pub fn first_byte(&self) -> usize {
        self.steps.first().map(|s| s.byte_index).unwrap_or(0)
    }

    /// Number of payload bytes touched by the signal.
    pub fn byte_count(&self) -> usize {
        self.steps.len()
    }

    /// Splits a raw bit pattern into per-byte chunks, padded into position by
    /// each byte's bit offset.
    pub fn split(&self, bits_value: u64) -> Vec<ByteChunk> {
        self.steps
            .iter()
            .map(|st| {
                let mask: u64 = st.value_mask();
                let piece: u64 = (bits_value >> st.dst_lsb) & mask;
                ByteChunk {
                    index: st.byte_index,
                    value: (piece << st.src_lsb) as u8,
                    mask: (mask << st.src_lsb) as u8,
                }
            })
            .collect()
    }

    /// Extracts the **unsigned** bit pattern (LSB-first accumulation) from the payload.
    pub fn extract(&self, bytes: &[u8]) -> u64 {
        let mut out: u64 = 0;
        for st in &self.steps {
            if let Some(&b) = bytes.get(st.byte_index) {
                let chunk: u64 = (u64::from(b) >> st.src_lsb) & st.value_mask();
                out |= chunk << st.dst_lsb;
            }
        }
        out
    }
}

/// Step compilation for little-endian (Intel) signals: LSB first, moving up.
fn compile_intel(steps: &mut Vec<Step>, bit_start: u16, bit_length: u16) {
    let mut remaining: u16 = bit_length;
    let mut bit: u16 = bit_start;
    let mut dst: u16 = 0u16;

    while remaining > 0 {
        let byte_index: usize = (bit / 8) as usize;
        let bit_off: u8 = (bit % 8) as u8;
        let avail: u8 = 8 - bit_off;
        let take: u8 = remaining.min(avail as u16) as u8;

        steps.push(Step {
            byte_index,
            src_lsb: bit_off,
            width: take,
            dst_lsb: dst,
        });

        bit += take as u16;
        dst += take as u16;
        remaining -= take as u16;
    }
}

/// Step compilation for big-endian (Motorola) signals.
fn compile_motorola(steps: &mut Vec<Step>, bit_start: u16, bit_length: u16) {
    // @0: the start bit is the MSB of the signal; we advance MSB-first,
    // continuing at bit 7 of the next byte.
    let mut remaining: u16 = bit_length;
    let mut byte: usize = (bit_start / 8) as usize;
    let mut bit_msb: u8 = (bit_start % 8) as u8;

    while remaining > 0 {
        let can_take: u16 = (bit_msb as u16 + 1).min(remaining);
        let src_lsb: u8 = bit_msb + 1 - can_take as u8;
        let dst_lsb: u16 = remaining - can_take;

        steps.push(Step {
            byte_index: byte,
            src_lsb,
            width: can_take as u8,
            dst_lsb,
        });

        remaining -= can_take;
        byte += 1;
        bit_msb = 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(start: u16, size: u16, byte_order: ByteOrder) -> Signal {
        Signal {
            signal_name: "Sig".into(),
            raw_start_bit: start,
            signal_size: size,
            byte_order,
            factor: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_intel_split_across_bytes() {
        let layout = SignalLayout::compile(&signal(4, 12, ByteOrder::Intel), 8).unwrap();
        assert_eq!(layout.byte_count(), 2);
        assert_eq!(
            layout.split(0xABC),
            vec![
                ByteChunk { index: 0, value: 0xC0, mask: 0xF0 },
                ByteChunk { index: 1, value: 0xAB, mask: 0xFF },
            ]
        );
    }

    #[test]
    fn test_motorola_split_across_bytes() {
        // MSB at bit 3 of byte 0, 12 bits -> byte0[3..0] + byte1[7..0]
        let layout = SignalLayout::compile(&signal(3, 12, ByteOrder::Motorola), 8).unwrap();
        assert_eq!(layout.first_byte(), 0);
        assert_eq!(
            layout.split(0xABC),
            vec![
                ByteChunk { index: 0, value: 0x0A, mask: 0x0F },
                ByteChunk { index: 1, value: 0xBC, mask: 0xFF },
            ]
        );
    }

    #[test]
    fn test_motorola_full_word() {
        let layout = SignalLayout::compile(&signal(7, 16, ByteOrder::Motorola), 8).unwrap();
        let chunks = layout.split(0x1234);
        assert_eq!(chunks[0].value, 0x12);
        assert_eq!(chunks[1].value, 0x34);
    }

    #[test]
    fn test_extract_matches_split() {
        for (start, size, order) in [
            (0, 16, ByteOrder::Intel),
            (13, 7, ByteOrder::Intel),
            (7, 16, ByteOrder::Motorola),
            (21, 10, ByteOrder::Motorola),
        ] {
            let layout = SignalLayout::compile(&signal(start, size, order), 8).unwrap();
            let value: u64 = 0x2A5 & ((1u64 << size) - 1);
            let mut payload = [0u8; 8];
            for c in layout.split(value) {
                payload[c.index] |= c.value;
            }
            assert_eq!(layout.extract(&payload), value, "{start}|{size}@{order}");
        }
    }

    #[test]
    fn test_out_of_frame_is_rejected() {
        assert!(SignalLayout::compile(&signal(60, 8, ByteOrder::Intel), 8).is_err());
        assert!(SignalLayout::compile(&signal(0, 8, ByteOrder::Intel), 0).is_err());
    }
}
