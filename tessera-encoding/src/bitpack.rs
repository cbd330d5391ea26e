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

//! Bit packing of boolean arrays.
//!
//! Output length is `ceil(n / 8)`. Under [`ByteOrder::Little`] bit `i` of
//! the input lands in bit `i % 8` of byte `i / 8` (LSB first within each
//! byte); under [`ByteOrder::Big`] it lands in bit `7 - i % 8` (MSB
//! first). Both boolean pixel bodies and compacted null bitmaps go
//! through here, so the packing must stay byte-exact across releases.

use tessera_core::ByteOrder;

/// Packs `bits` into bytes under the given bit order. Pure function.
pub fn pack_bits(bits: &[bool], order: ByteOrder) -> Vec<u8> {
    let mut out = vec![0u8; bits.len().div_ceil(8)];
    match order {
        ByteOrder::Little => {
            for (i, &bit) in bits.iter().enumerate() {
                if bit {
                    out[i / 8] |= 1 << (i % 8);
                }
            }
        }
        ByteOrder::Big => {
            for (i, &bit) in bits.iter().enumerate() {
                if bit {
                    out[i / 8] |= 1 << (7 - i % 8);
                }
            }
        }
    }
    out
}

/// Inverse of [`pack_bits`]; the read-path mirror used by round-trip
/// verification.
pub fn unpack_bits(bytes: &[u8], count: usize, order: ByteOrder) -> Vec<bool> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let byte = bytes[i / 8];
        let bit = match order {
            ByteOrder::Little => (byte >> (i % 8)) & 1,
            ByteOrder::Big => (byte >> (7 - i % 8)) & 1,
        };
        out.push(bit == 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let bits = [true, false, true, true, false, false, false, true];
        assert_eq!(pack_bits(&bits, ByteOrder::Little), vec![0x8D]);
    }

    #[test]
    fn test_big_endian_layout() {
        let bits = [true, false, true, true, false, false, false, true];
        assert_eq!(pack_bits(&bits, ByteOrder::Big), vec![0xB1]);
    }

    #[test]
    fn test_partial_byte() {
        let bits = [true, true, true];
        assert_eq!(pack_bits(&bits, ByteOrder::Little), vec![0x07]);
        assert_eq!(pack_bits(&bits, ByteOrder::Big), vec![0xE0]);
        assert!(pack_bits(&[], ByteOrder::Little).is_empty());
    }

    #[test]
    fn test_roundtrip_both_orders() {
        let bits: Vec<bool> = (0..131).map(|i| i % 3 == 0 || i % 7 == 0).collect();
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let packed = pack_bits(&bits, order);
            assert_eq!(packed.len(), bits.len().div_ceil(8));
            assert_eq!(unpack_bits(&packed, bits.len(), order), bits);
        }
    }
}
