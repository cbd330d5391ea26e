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

//! Per-family statistics recorders.
//!
//! Each column writer keeps two recorders of the same family: one
//! accumulating the current pixel, one accumulating the whole chunk.
//! Closing a pixel merges the pixel recorder into the chunk recorder,
//! serializes the pixel recorder into an opaque blob for the chunk index,
//! and resets it.
//!
//! Blob layout, little-endian: family tag byte, `count: u64`,
//! `null_count: u64`, `has_null: u8`, then the family payload guarded by
//! presence flags. The blob is embedded opaquely in the chunk index; only
//! the matching reader interprets it.

use byteorder::{LittleEndian, WriteBytesExt};
use tessera_core::Int128;

pub trait StatsRecorder: Default {
    /// Records `n` null occurrences.
    fn increment_null(&mut self, n: u64);
    fn set_has_null(&mut self);
    fn merge(&mut self, other: &Self);
    fn serialize(&self) -> Vec<u8>;
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Shared count/null bookkeeping embedded in every family recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsCommon {
    pub count: u64,
    pub null_count: u64,
    pub has_null: bool,
}

impl StatsCommon {
    fn merge(&mut self, other: &StatsCommon) {
        self.count += other.count;
        self.null_count += other.null_count;
        self.has_null |= other.has_null;
    }

    fn serialize_into(&self, tag: u8, out: &mut Vec<u8>) {
        out.push(tag);
        out.write_u64::<LittleEndian>(self.count).unwrap();
        out.write_u64::<LittleEndian>(self.null_count).unwrap();
        out.push(self.has_null as u8);
    }
}

const TAG_BOOLEAN: u8 = 1;
const TAG_INTEGER: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_INT128: u8 = 4;
const TAG_BYTES: u8 = 5;
const TAG_VECTOR: u8 = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanStats {
    pub common: StatsCommon,
    pub true_count: u64,
    pub false_count: u64,
}

impl BooleanStats {
    pub fn update(&mut self, value: bool, n: u64) {
        self.common.count += n;
        if value {
            self.true_count += n;
        } else {
            self.false_count += n;
        }
    }
}

impl StatsRecorder for BooleanStats {
    fn increment_null(&mut self, n: u64) {
        self.common.null_count += n;
    }

    fn set_has_null(&mut self) {
        self.common.has_null = true;
    }

    fn merge(&mut self, other: &Self) {
        self.common.merge(&other.common);
        self.true_count += other.true_count;
        self.false_count += other.false_count;
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(34);
        self.common.serialize_into(TAG_BOOLEAN, &mut out);
        out.write_u64::<LittleEndian>(self.true_count).unwrap();
        out.write_u64::<LittleEndian>(self.false_count).unwrap();
        out
    }
}

/// Covers every 64-bit-or-narrower integer family: byte, short, int,
/// long, short decimal, date, time, timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerStats {
    pub common: StatsCommon,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub sum: i64,
}

impl IntegerStats {
    pub fn update(&mut self, value: i64, n: u64) {
        self.common.count += n;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum = self.sum.wrapping_add(value.wrapping_mul(n as i64));
    }
}

impl StatsRecorder for IntegerStats {
    fn increment_null(&mut self, n: u64) {
        self.common.null_count += n;
    }

    fn set_has_null(&mut self) {
        self.common.has_null = true;
    }

    fn merge(&mut self, other: &Self) {
        self.common.merge(&other.common);
        if let Some(v) = other.min {
            self.min = Some(self.min.map_or(v, |m| m.min(v)));
        }
        if let Some(v) = other.max {
            self.max = Some(self.max.map_or(v, |m| m.max(v)));
        }
        self.sum = self.sum.wrapping_add(other.sum);
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(43);
        self.common.serialize_into(TAG_INTEGER, &mut out);
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                out.push(1);
                out.write_i64::<LittleEndian>(min).unwrap();
                out.write_i64::<LittleEndian>(max).unwrap();
            }
            _ => out.push(0),
        }
        out.write_i64::<LittleEndian>(self.sum).unwrap();
        out
    }
}

/// Covers float and double; always records the decoded IEEE value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatStats {
    pub common: StatsCommon,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum: f64,
}

impl FloatStats {
    pub fn update(&mut self, value: f64) {
        self.common.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
    }
}

impl StatsRecorder for FloatStats {
    fn increment_null(&mut self, n: u64) {
        self.common.null_count += n;
    }

    fn set_has_null(&mut self) {
        self.common.has_null = true;
    }

    fn merge(&mut self, other: &Self) {
        self.common.merge(&other.common);
        if let Some(v) = other.min {
            self.min = Some(self.min.map_or(v, |m| m.min(v)));
        }
        if let Some(v) = other.max {
            self.max = Some(self.max.map_or(v, |m| m.max(v)));
        }
        self.sum += other.sum;
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(43);
        self.common.serialize_into(TAG_FLOAT, &mut out);
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                out.push(1);
                out.write_f64::<LittleEndian>(min).unwrap();
                out.write_f64::<LittleEndian>(max).unwrap();
            }
            _ => out.push(0),
        }
        out.write_f64::<LittleEndian>(self.sum).unwrap();
        out
    }
}

/// Long decimals: two 64-bit words per value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int128Stats {
    pub common: StatsCommon,
    pub min: Option<Int128>,
    pub max: Option<Int128>,
}

impl Int128Stats {
    pub fn update(&mut self, value: Int128, n: u64) {
        self.common.count += n;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }
}

impl StatsRecorder for Int128Stats {
    fn increment_null(&mut self, n: u64) {
        self.common.null_count += n;
    }

    fn set_has_null(&mut self) {
        self.common.has_null = true;
    }

    fn merge(&mut self, other: &Self) {
        self.common.merge(&other.common);
        if let Some(v) = other.min {
            self.min = Some(self.min.map_or(v, |m| m.min(v)));
        }
        if let Some(v) = other.max {
            self.max = Some(self.max.map_or(v, |m| m.max(v)));
        }
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(51);
        self.common.serialize_into(TAG_INT128, &mut out);
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                out.push(1);
                out.extend_from_slice(&min.to_be_bytes());
                out.extend_from_slice(&max.to_be_bytes());
            }
            _ => out.push(0),
        }
        out
    }
}

/// Covers the string and binary families: lexicographic min/max keys plus
/// the byte-length sum.
#[derive(Debug, Clone, Default)]
pub struct BytesStats {
    pub common: StatsCommon,
    pub min: Option<Vec<u8>>,
    pub max: Option<Vec<u8>>,
    pub sum_len: u64,
}

impl BytesStats {
    pub fn update(&mut self, value: &[u8], n: u64) {
        self.common.count += n;
        match &self.min {
            Some(m) if m.as_slice() <= value => {}
            _ => self.min = Some(value.to_vec()),
        }
        match &self.max {
            Some(m) if m.as_slice() >= value => {}
            _ => self.max = Some(value.to_vec()),
        }
        self.sum_len += value.len() as u64 * n;
    }
}

impl StatsRecorder for BytesStats {
    fn increment_null(&mut self, n: u64) {
        self.common.null_count += n;
    }

    fn set_has_null(&mut self) {
        self.common.has_null = true;
    }

    fn merge(&mut self, other: &Self) {
        self.common.merge(&other.common);
        if let Some(v) = &other.min {
            match &self.min {
                Some(m) if m <= v => {}
                _ => self.min = Some(v.clone()),
            }
        }
        if let Some(v) = &other.max {
            match &self.max {
                Some(m) if m >= v => {}
                _ => self.max = Some(v.clone()),
            }
        }
        self.sum_len += other.sum_len;
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.common.serialize_into(TAG_BYTES, &mut out);
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => {
                out.push(1);
                out.write_u32::<LittleEndian>(min.len() as u32).unwrap();
                out.extend_from_slice(min);
                out.write_u32::<LittleEndian>(max.len() as u32).unwrap();
                out.extend_from_slice(max);
            }
            _ => out.push(0),
        }
        out.write_u64::<LittleEndian>(self.sum_len).unwrap();
        out
    }
}

/// Vector columns carry no ordering; only counts are tracked.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorStats {
    pub common: StatsCommon,
}

impl VectorStats {
    pub fn update(&mut self, n: u64) {
        self.common.count += n;
    }
}

impl StatsRecorder for VectorStats {
    fn increment_null(&mut self, n: u64) {
        self.common.null_count += n;
    }

    fn set_has_null(&mut self) {
        self.common.has_null = true;
    }

    fn merge(&mut self, other: &Self) {
        self.common.merge(&other.common);
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(18);
        self.common.serialize_into(TAG_VECTOR, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ReadBytesExt;
    use std::io::Cursor;

    #[test]
    fn test_integer_min_max_sum() {
        let mut s = IntegerStats::default();
        s.update(5, 1);
        s.update(-3, 1);
        s.update(5, 2);
        s.increment_null(1);
        assert_eq!(s.common.count, 4);
        assert_eq!(s.common.null_count, 1);
        assert_eq!(s.min, Some(-3));
        assert_eq!(s.max, Some(5));
        assert_eq!(s.sum, 12);
    }

    #[test]
    fn test_merge_pixel_into_chunk() {
        let mut chunk = IntegerStats::default();
        let mut pixel = IntegerStats::default();
        pixel.update(10, 1);
        pixel.set_has_null();
        pixel.increment_null(2);
        chunk.merge(&pixel);
        pixel.reset();
        pixel.update(-7, 1);
        chunk.merge(&pixel);

        assert_eq!(chunk.common.count, 2);
        assert_eq!(chunk.common.null_count, 2);
        assert!(chunk.common.has_null);
        assert_eq!(chunk.min, Some(-7));
        assert_eq!(chunk.max, Some(10));
    }

    #[test]
    fn test_serialized_layout() {
        let mut s = IntegerStats::default();
        s.update(1, 1);
        s.update(9, 1);
        let blob = s.serialize();

        let mut cur = Cursor::new(blob);
        assert_eq!(cur.read_u8().unwrap(), 2); // integer tag
        assert_eq!(cur.read_u64::<LittleEndian>().unwrap(), 2); // count
        assert_eq!(cur.read_u64::<LittleEndian>().unwrap(), 0); // nulls
        assert_eq!(cur.read_u8().unwrap(), 0); // has_null
        assert_eq!(cur.read_u8().unwrap(), 1); // min/max present
        assert_eq!(cur.read_i64::<LittleEndian>().unwrap(), 1);
        assert_eq!(cur.read_i64::<LittleEndian>().unwrap(), 9);
        assert_eq!(cur.read_i64::<LittleEndian>().unwrap(), 10);
    }

    #[test]
    fn test_empty_recorder_serializes_without_bounds() {
        let blob = FloatStats::default().serialize();
        // tag + count + nulls + has_null + presence flag + sum
        assert_eq!(blob.len(), 1 + 8 + 8 + 1 + 1 + 8);
        assert_eq!(blob[18], 0);
    }

    #[test]
    fn test_bytes_lexicographic_bounds() {
        let mut s = BytesStats::default();
        s.update(b"pear", 1);
        s.update(b"apple", 1);
        s.update(b"plum", 1);
        assert_eq!(s.min.as_deref(), Some(b"apple".as_slice()));
        assert_eq!(s.max.as_deref(), Some(b"plum".as_slice()));
        assert_eq!(s.sum_len, 13);
    }

    #[test]
    fn test_int128_bounds() {
        let mut s = Int128Stats::default();
        s.update(Int128::from_i64(-2), 1);
        s.update(Int128::new(1, 0), 1);
        assert_eq!(s.min, Some(Int128::from_i64(-2)));
        assert_eq!(s.max, Some(Int128::new(1, 0)));
    }
}
