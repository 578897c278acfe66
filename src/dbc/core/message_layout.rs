use crate::types::errors::MessageLayoutError;
use crate::types::signal::ByteOrder;

/// Swaps a bit number between LSB-first and MSB-first numbering within its byte.
///
/// `b - (b % 8) + 7 - (b % 8)`, with a Euclidean remainder so that negative
/// intermediates land in the same byte-relative slot.
#[inline]
fn swap_bit_numbering(b: i32) -> i32 {
    b - 2 * b.rem_euclid(8) + 7
}

/// Absolute start bit of a signal, used to place it inside the frame.
///
/// 1. convert the declared start bit from LSB0 to MSB0 numbering;
/// 2. Motorola: the declared bit is the MSB, move to the LSB (`+ length - 1`);
///    Intel: the declared bit is the LSB, move to the MSB (`- length + 1`);
/// 3. convert back from MSB0 to LSB0 numbering.
pub fn absolute_start_bit(raw_start_bit: u16, length: u16, byte_order: ByteOrder) -> i32 {
    let length: i32 = i32::from(length);
    let msb0: i32 = swap_bit_numbering(i32::from(raw_start_bit));
    let adjusted: i32 = match byte_order {
        ByteOrder::Motorola => msb0 + length - 1,
        ByteOrder::Intel => msb0 - length + 1,
    };
    swap_bit_numbering(adjusted)
}

/// Verify that (bit_start, bit_length) fits within a frame of `dlc` bytes.
/// Returns Ok(()) if the signal fits; Err(...) with the reason otherwise.
///
/// DBC assumptions:
/// - Intel: the field occupies bits [start, start + len - 1] on a linear 0..(8*bytes-1) plane.
/// - Motorola: map DBC bit_start to the MSB0 index `lin = (start & !7) + (7 - (start & 7))`,
///   then the field advances forward: [lin .. lin + (len-1)].
pub fn check_signal_fits(
    dlc: u8,
    bit_start: u16,
    bit_length: u16,
    byte_order: ByteOrder,
) -> Result<(), MessageLayoutError> {
    if bit_length == 0 {
        return Err(MessageLayoutError::ZeroBitLength);
    }
    if bit_length > 64 {
        return Err(MessageLayoutError::TooWide { length: bit_length });
    }
    let total_bits: usize = (dlc as usize) * 8;

    match byte_order {
        ByteOrder::Intel => {
            let start: usize = bit_start as usize;
            let end: usize = start + (bit_length as usize) - 1;
            if end < total_bits {
                Ok(())
            } else {
                Err(MessageLayoutError::IntelOutOfBounds {
                    end,
                    total_bits,
                    dlc,
                })
            }
        }
        ByteOrder::Motorola => {
            let s: usize = bit_start as usize;
            let linearized_start: usize = (s & !7) + (7 - (s & 7)); // e.g., start=0 -> 7, start=7 -> 0, start=8 -> 15, etc.
            let linearized_end: usize = linearized_start + (bit_length as usize) - 1;

            if linearized_start >= total_bits {
                return Err(MessageLayoutError::MotorolaStartOutOfBounds {
                    start: linearized_start,
                    total_bits,
                    dlc,
                });
            }
            if linearized_end >= total_bits {
                return Err(MessageLayoutError::MotorolaEndOutOfBounds {
                    end: linearized_end,
                    total_bits,
                    dlc,
                });
            }
            Ok(())
        }
    }
}
