// SPDX-License-Identifier: AGPL-3.0-or-later
// Tessera - Pixel-Partitioned Columnar Storage Engine
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Streaming run-length coding of byte values.
//!
//! Three implicit states: empty, literal run, repeat run. A literal run of
//! length L is framed as the signed header byte `-L` followed by the L
//! data bytes; a repeat run of length R (`R >= 3`) as the header byte
//! `R - 3` followed by the single repeated byte. A repeat starts once
//! three equal bytes arrive in a row; the trailing two equal bytes of a
//! pending literal are detached into the new repeat, with any literal
//! prefix flushed first.

/// Shortest run framed as a repeat.
pub const MIN_REPEAT: usize = 3;
/// Longest literal frame.
pub const MAX_LITERAL: usize = 128;
/// Longest repeat frame (`MIN_REPEAT + 127`).
pub const MAX_REPEAT: usize = MIN_REPEAT + 127;

pub struct RunLenByteEncoder {
    output: Vec<u8>,
    literals: [u8; MAX_LITERAL],
    num_literals: usize,
    repeat: bool,
    tail_run_length: usize,
}

impl Default for RunLenByteEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLenByteEncoder {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            literals: [0u8; MAX_LITERAL],
            num_literals: 0,
            repeat: false,
            tail_run_length: 0,
        }
    }

    /// Feeds one byte through the state machine.
    pub fn write(&mut self, value: u8) {
        if self.num_literals == 0 {
            self.literals[0] = value;
            self.num_literals = 1;
            self.tail_run_length = 1;
        } else if self.repeat {
            if value == self.literals[0] {
                self.num_literals += 1;
                if self.num_literals == MAX_REPEAT {
                    self.write_values();
                }
            } else {
                self.write_values();
                self.literals[0] = value;
                self.num_literals = 1;
                self.tail_run_length = 1;
            }
        } else {
            if value == self.literals[self.num_literals - 1] {
                self.tail_run_length += 1;
            } else {
                self.tail_run_length = 1;
            }
            if self.tail_run_length == MIN_REPEAT {
                if self.num_literals + 1 == MIN_REPEAT {
                    // the whole pending literal is the new repeat
                    self.repeat = true;
                    self.num_literals += 1;
                } else {
                    // detach the trailing equal bytes, flush the prefix
                    self.num_literals -= MIN_REPEAT - 1;
                    self.write_values();
                    self.literals[0] = value;
                    self.repeat = true;
                    self.num_literals = MIN_REPEAT;
                }
            } else {
                self.literals[self.num_literals] = value;
                self.num_literals += 1;
                if self.num_literals == MAX_LITERAL {
                    self.write_values();
                }
            }
        }
    }

    fn write_values(&mut self) {
        if self.num_literals != 0 {
            if self.repeat {
                self.output.push((self.num_literals - MIN_REPEAT) as u8);
                self.output.push(self.literals[0]);
            } else {
                self.output.push((self.num_literals as i8).wrapping_neg() as u8);
                self.output
                    .extend_from_slice(&self.literals[..self.num_literals]);
            }
            self.repeat = false;
            self.tail_run_length = 0;
            self.num_literals = 0;
        }
    }

    /// Emits any pending run.
    pub fn flush(&mut self) {
        self.write_values();
    }

    /// Encodes `values`, flushes, appends to `out`, and returns the number
    /// of bytes written.
    pub fn encode(&mut self, values: &[u8], out: &mut Vec<u8>) -> usize {
        for &v in values {
            self.write(v);
        }
        self.flush();
        let len = self.output.len();
        out.extend_from_slice(&self.output);
        self.output.clear();
        len
    }

    /// Resets streamed state without touching buffered output.
    pub fn clear(&mut self) {
        self.num_literals = 0;
        self.repeat = false;
        self.tail_run_length = 0;
    }

    /// Releases the output buffer.
    pub fn close(&mut self) {
        self.clear();
        self.output = Vec::new();
    }
}

/// Read-path mirror of the byte framing; used by round-trip verification.
pub fn decode_rle_bytes(encoded: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < encoded.len() {
        let header = encoded[pos] as i8;
        pos += 1;
        if header < 0 {
            let len = (-(header as i16)) as usize;
            out.extend_from_slice(&encoded[pos..pos + len]);
            pos += len;
        } else {
            let len = header as usize + MIN_REPEAT;
            let value = encoded[pos];
            pos += 1;
            out.extend(std::iter::repeat(value).take(len));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn encode_all(values: &[u8]) -> Vec<u8> {
        let mut enc = RunLenByteEncoder::new();
        let mut out = Vec::new();
        enc.encode(values, &mut out);
        out
    }

    #[test]
    fn test_repeat_framing() {
        // 4 equal bytes: header 4 - 3 = 1, then the value
        assert_eq!(encode_all(&[7, 7, 7, 7]), vec![0x01, 7]);
        // minimum repeat
        assert_eq!(encode_all(&[9, 9, 9]), vec![0x00, 9]);
    }

    #[test]
    fn test_literal_framing() {
        // no run of 3: one literal frame, header -4
        assert_eq!(encode_all(&[2, 2, 3, 4]), vec![0xFC, 2, 2, 3, 4]);
        assert_eq!(encode_all(&[5]), vec![0xFF, 5]);
        assert!(encode_all(&[]).is_empty());
    }

    #[test]
    fn test_literal_prefix_detach() {
        // literal prefix [1, 2] flushed, then repeat of 3x3
        assert_eq!(
            encode_all(&[1, 2, 3, 3, 3]),
            vec![0xFE, 1, 2, 0x00, 3]
        );
    }

    #[test]
    fn test_max_repeat_split() {
        // a run of k >= 3 equal bytes costs at most ceil(k / MAX_REPEAT) * 2 bytes
        let run = vec![42u8; 300];
        let encoded = encode_all(&run);
        assert!(encoded.len() <= 300usize.div_ceil(MAX_REPEAT) * 2 + 2);
        assert_eq!(decode_rle_bytes(&encoded), run);
    }

    #[test]
    fn test_max_literal_split() {
        let values: Vec<u8> = (0..=255).collect();
        let encoded = encode_all(&values);
        assert_eq!(decode_rle_bytes(&encoded), values);
    }

    #[test]
    fn test_random_roundtrip() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let len = rng.gen_range(0..600);
            // low-cardinality input so both frame kinds show up
            let values: Vec<u8> = (0..len).map(|_| rng.gen_range(0..4)).collect();
            let encoded = encode_all(&values);
            assert_eq!(decode_rle_bytes(&encoded), values);
        }
    }

    #[test]
    fn test_encoder_reuse_between_pixels() {
        let mut enc = RunLenByteEncoder::new();
        let mut first = Vec::new();
        enc.encode(&[1, 1, 1, 1], &mut first);
        let mut second = Vec::new();
        enc.encode(&[1, 1, 1, 1], &mut second);
        assert_eq!(first, second, "encode+flush must leave no carried state");
    }
}
