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

//! Column-chunk index and encoding descriptors.
//!
//! The index is built incrementally while pixels close and sealed at
//! flush; file-level metadata layers embed it as-is. `pixel_positions[i]`
//! is the output-stream write position at the start of pixel `i`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChunkIndex {
    little_endian: bool,
    nulls_padding: bool,
    isnull_alignment: u32,
    pixel_positions: Vec<u64>,
    pixel_statistics: Vec<Vec<u8>>,
    isnull_offset: u64,
}

impl ColumnChunkIndex {
    pub fn new(little_endian: bool, nulls_padding: bool, isnull_alignment: u32) -> Self {
        Self {
            little_endian,
            nulls_padding,
            isnull_alignment,
            pixel_positions: Vec::new(),
            pixel_statistics: Vec::new(),
            isnull_offset: 0,
        }
    }

    /// Records one closed pixel: its start position and serialized stats.
    pub fn add_pixel(&mut self, position: u64, statistics: Vec<u8>) {
        self.pixel_positions.push(position);
        self.pixel_statistics.push(statistics);
    }

    pub fn set_isnull_offset(&mut self, offset: u64) {
        self.isnull_offset = offset;
    }

    pub fn little_endian(&self) -> bool {
        self.little_endian
    }

    pub fn nulls_padding(&self) -> bool {
        self.nulls_padding
    }

    pub fn isnull_alignment(&self) -> u32 {
        self.isnull_alignment
    }

    pub fn pixel_positions(&self) -> &[u64] {
        &self.pixel_positions
    }

    pub fn pixel_statistics(&self) -> &[Vec<u8>] {
        &self.pixel_statistics
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_positions.len()
    }

    pub fn isnull_offset(&self) -> u64 {
        self.isnull_offset
    }

    /// Drops accumulated pixel entries, keeping the configuration flags.
    pub fn clear(&mut self) {
        self.pixel_positions.clear();
        self.pixel_statistics.clear();
        self.isnull_offset = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingKind {
    None,
    RunLength,
    Dictionary,
}

/// Encoding applied to a column chunk, possibly cascaded (run-length over
/// dictionary codes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEncoding {
    kind: EncodingKind,
    dictionary_size: Option<u32>,
    cascade: Option<Box<ColumnEncoding>>,
}

impl ColumnEncoding {
    pub fn none() -> Self {
        Self {
            kind: EncodingKind::None,
            dictionary_size: None,
            cascade: None,
        }
    }

    pub fn run_length() -> Self {
        Self {
            kind: EncodingKind::RunLength,
            dictionary_size: None,
            cascade: None,
        }
    }

    pub fn dictionary(size: u32, cascade: Option<ColumnEncoding>) -> Self {
        Self {
            kind: EncodingKind::Dictionary,
            dictionary_size: Some(size),
            cascade: cascade.map(Box::new),
        }
    }

    pub fn kind(&self) -> EncodingKind {
        self.kind
    }

    pub fn dictionary_size(&self) -> Option<u32> {
        self.dictionary_size
    }

    pub fn cascade(&self) -> Option<&ColumnEncoding> {
        self.cascade.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_accumulation() {
        let mut index = ColumnChunkIndex::new(true, false, 8);
        index.add_pixel(0, vec![1]);
        index.add_pixel(16, vec![2]);
        index.set_isnull_offset(32);
        assert_eq!(index.pixel_positions(), &[0, 16]);
        assert_eq!(index.pixel_count(), 2);
        assert_eq!(index.isnull_offset(), 32);

        index.clear();
        assert_eq!(index.pixel_count(), 0);
        assert!(index.little_endian());
        assert_eq!(index.isnull_alignment(), 8);
    }

    #[test]
    fn test_cascaded_encoding() {
        let enc = ColumnEncoding::dictionary(3, Some(ColumnEncoding::run_length()));
        assert_eq!(enc.kind(), EncodingKind::Dictionary);
        assert_eq!(enc.dictionary_size(), Some(3));
        assert_eq!(enc.cascade().unwrap().kind(), EncodingKind::RunLength);
    }
}
