use crate::codec::layout::ByteChunk;
use std::fmt;

/// Bits written twice into the same payload byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overlap {
    pub byte_index: usize,
    /// Byte value before the merge.
    pub existing: u8,
    /// Chunk value that was added.
    pub incoming: u8,
    /// Bits claimed by both.
    pub bits: u8,
}

/// Outcome of merging chunks into a [`Frame`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub overlaps: Vec<Overlap>,
}

impl MergeReport {
    pub fn is_clean(&self) -> bool {
        self.overlaps.is_empty()
    }

    pub(crate) fn extend(&mut self, other: MergeReport) {
        self.overlaps.extend(other.overlaps);
    }
}

/// CAN payload buffer shared by the signals of one message.
///
/// Besides the bytes, the frame remembers which bits were already written so
/// that two signals claiming the same bits are reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    occupied: Vec<u8>,
}

impl Frame {
    /// Zero-initialized frame of `size` bytes.
    pub fn new(size: usize) -> Self {
        Frame {
            data: vec![0; size],
            occupied: vec![0; size],
        }
    }

    /// Wraps an existing payload; its set bits count as already written.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let occupied: Vec<u8> = data.clone();
        Frame { data, occupied }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Adds each chunk into its byte.
    ///
    /// A byte that already holds a value is summed with the incoming one
    /// rather than overwritten, so signals sharing a byte on disjoint bits
    /// combine. When the bit ranges do intersect the sum is still applied and
    /// the collision is returned (and logged) as an [`Overlap`].
    pub fn merge(&mut self, chunks: &[ByteChunk]) -> MergeReport {
        let mut report: MergeReport = MergeReport::default();
        for chunk in chunks {
            let Some(byte) = self.data.get_mut(chunk.index) else {
                log::warn!(
                    "byte {} is outside of the {} byte frame, chunk dropped",
                    chunk.index,
                    self.occupied.len()
                );
                continue;
            };
            let clash: u8 = self.occupied[chunk.index] & chunk.mask;
            if clash != 0 {
                log::warn!(
                    "bits {:#010b} of byte {} are written twice ({:#04X} + {:#04X})",
                    clash,
                    chunk.index,
                    *byte,
                    chunk.value
                );
                report.overlaps.push(Overlap {
                    byte_index: chunk.index,
                    existing: *byte,
                    incoming: chunk.value,
                    bits: clash,
                });
            }
            *byte = byte.wrapping_add(chunk.value);
            self.occupied[chunk.index] |= chunk.mask;
        }
        report
    }
}

impl fmt::Display for Frame {
    /// Space-separated uppercase hex bytes, e.g. `00 5C 01 00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}
