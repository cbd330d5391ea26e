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

//! 128-bit integers stored as a `(high: i64, low: u64)` pair.
//!
//! This is the value representation of the long-decimal path: two 64-bit
//! words per value, with big-endian serialization for statistics and index
//! blobs. Arithmetic wraps mod 2^128.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Int128 {
    high: i64,
    low: u64,
}

impl Int128 {
    pub const ZERO: Int128 = Int128 { high: 0, low: 0 };
    pub const ONE: Int128 = Int128 { high: 0, low: 1 };
    pub const MAX: Int128 = Int128 {
        high: i64::MAX,
        low: u64::MAX,
    };
    pub const MIN: Int128 = Int128 {
        high: i64::MIN,
        low: 0,
    };

    pub fn new(high: i64, low: u64) -> Self {
        Self { high, low }
    }

    /// Sign-extends a 64-bit value into the full width.
    pub fn from_i64(value: i64) -> Self {
        Self {
            high: if value < 0 { -1 } else { 0 },
            low: value as u64,
        }
    }

    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    /// In-place addition; the carry of the low words propagates into the
    /// high word. Wraps mod 2^128.
    pub fn add(&mut self, high: i64, low: u64) {
        let (new_low, carry) = self.low.overflowing_add(low);
        self.low = new_low;
        self.high = self
            .high
            .wrapping_add(high)
            .wrapping_add(if carry { 1 } else { 0 });
    }

    pub fn wrapping_add(mut self, other: Int128) -> Int128 {
        self.add(other.high, other.low);
        self
    }

    /// 16 bytes, high word first, each word most-significant byte first.
    pub fn to_be_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.high.to_be_bytes());
        out[8..].copy_from_slice(&self.low.to_be_bytes());
        out
    }

    /// Reads a big-endian two's-complement value of up to 16 bytes.
    ///
    /// Inputs of 16 bytes or more use the final 16; an exact 8-byte input
    /// fills the low word with the high word sign-free; shorter inputs are
    /// sign-extended. Empty input is rejected.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(TesseraError::InvalidArgument(
                "empty byte array for int128".to_string(),
            ));
        }

        let size = bytes.len();
        let low = if size >= 8 {
            read_word_be(&bytes[size - 8..])
        } else {
            let mut v: i64 = 0;
            for &b in bytes {
                v = (v << 8) | b as i64;
            }
            // shift the value into the top bits and arithmetic-shift back
            // to sign-extend the partial word
            let used = (size * 8) as u32;
            v = (v << (64 - used)) >> (64 - used);
            return Ok(Self::from_i64(v));
        };

        let high = if size > 8 {
            let start = size.saturating_sub(16);
            let hi_slice = &bytes[start..size - 8];
            let mut v: i64 = 0;
            for &b in hi_slice {
                v = (v << 8) | b as i64;
            }
            if hi_slice.len() < 8 {
                let used = (hi_slice.len() * 8) as u32;
                v = (v << (64 - used)) >> (64 - used);
            }
            v
        } else if (bytes[0] & 0x80) != 0 {
            -1
        } else {
            0
        };

        Ok(Self { high, low })
    }
}

fn read_word_be(bytes: &[u8]) -> u64 {
    let mut v: u64 = 0;
    for &b in &bytes[..8] {
        v = (v << 8) | b as u64;
    }
    v
}

impl PartialOrd for Int128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int128 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.high
            .cmp(&other.high)
            .then_with(|| self.low.cmp(&other.low))
    }
}

impl From<i64> for Int128 {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<i128> for Int128 {
    fn from(value: i128) -> Self {
        Self {
            high: (value >> 64) as i64,
            low: value as u64,
        }
    }
}

impl From<Int128> for i128 {
    fn from(value: Int128) -> Self {
        ((value.high as i128) << 64) | value.low as i128
    }
}
