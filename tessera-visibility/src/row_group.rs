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

//! Row-group visibility: a contiguous array of 256-row tiles.
//!
//! Global row ids map to `(tile, local row)` by division; per-tile
//! operations proceed under the tile's own lock, so different tiles never
//! contend. Deletion history crosses the row-group boundary as packed
//! `(global_row << 48) | ts` items.

use tessera_core::{Result, TesseraError};

use crate::tile::{item_row, item_ts, pack_item, TileVisibility};
use crate::{BITMAP_WORDS, TILE_CAPACITY, TIMESTAMP_MASK};

pub struct RowGroupVisibility {
    tiles: Vec<TileVisibility>,
    record_num: u64,
}

impl RowGroupVisibility {
    pub fn new(rg_record_num: u64) -> Self {
        let tile_count = (rg_record_num as usize).div_ceil(TILE_CAPACITY);
        Self {
            tiles: (0..tile_count).map(|_| TileVisibility::new()).collect(),
            record_num: rg_record_num,
        }
    }

    /// Restores a row group from a checkpointed bitmap of
    /// `tile_count * 4` words.
    pub fn restore(rg_record_num: u64, initial_bitmap: &[u64]) -> Result<Self> {
        let tile_count = (rg_record_num as usize).div_ceil(TILE_CAPACITY);
        if initial_bitmap.len() < tile_count * BITMAP_WORDS {
            return Err(TesseraError::InvalidArgument(format!(
                "initial bitmap of {} words is too small for {} records",
                initial_bitmap.len(),
                rg_record_num
            )));
        }
        let tiles = (0..tile_count)
            .map(|i| {
                let mut words = [0u64; BITMAP_WORDS];
                words.copy_from_slice(&initial_bitmap[i * BITMAP_WORDS..(i + 1) * BITMAP_WORDS]);
                TileVisibility::with_base(&words)
            })
            .collect();
        Ok(Self {
            tiles,
            record_num: rg_record_num,
        })
    }

    pub fn record_num(&self) -> u64 {
        self.record_num
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Words in the bitmap returned by [`Self::bitmap_at`].
    pub fn bitmap_size(&self) -> usize {
        self.tiles.len() * BITMAP_WORDS
    }

    fn tile_for(&self, global_row: u32) -> Result<&TileVisibility> {
        let tile_index = global_row as usize / TILE_CAPACITY;
        self.tiles.get(tile_index).ok_or_else(|| {
            TesseraError::InvalidArgument(format!(
                "row {global_row} is out of range for {} records",
                self.record_num
            ))
        })
    }

    /// Opens the epoch in every tile so subsequent deletes anywhere in
    /// the row group attach to it.
    pub fn create_epoch(&self, ts: u64) {
        for tile in &self.tiles {
            tile.create_epoch(ts);
        }
    }

    pub fn delete(&self, global_row: u32, ts: u64) -> Result<()> {
        let tile = self.tile_for(global_row)?;
        tile.delete((global_row as usize % TILE_CAPACITY) as u16, ts)
    }

    /// The deletion bitmap of the whole row group at epoch `ts`; the
    /// caller owns the returned words.
    pub fn bitmap_at(&self, ts: u64) -> Result<Vec<u64>> {
        let mut out = vec![0u64; self.bitmap_size()];
        for (i, tile) in self.tiles.iter().enumerate() {
            let words = tile.bitmap_at(ts)?;
            out[i * BITMAP_WORDS..(i + 1) * BITMAP_WORDS].copy_from_slice(&words);
        }
        Ok(out)
    }

    pub fn collect_garbage(&self, cutoff: u64) -> Result<()> {
        for tile in &self.tiles {
            tile.collect_garbage(cutoff)?;
        }
        tracing::debug!(cutoff, tiles = self.tiles.len(), "collected row-group garbage");
        Ok(())
    }

    /// Every recorded deletion lifted to global row ids, packed as
    /// `(global_row << 48) | ts`.
    pub fn export_deletion_blocks(&self) -> Result<Vec<u64>> {
        let mut result = Vec::new();
        for (tile_index, tile) in self.tiles.iter().enumerate() {
            for item in tile.export_deletion_blocks()? {
                let global_row = (tile_index * TILE_CAPACITY) as u64 + item_row(item) as u64;
                result.push((global_row << 48) | (item_ts(item) & TIMESTAMP_MASK));
            }
        }
        Ok(result)
    }

    /// Splits exported items by tile and splices them in front of each
    /// tile's history.
    pub fn prepend_deletion_blocks(&self, items: &[u64]) -> Result<()> {
        let mut per_tile: Vec<Vec<u64>> = vec![Vec::new(); self.tiles.len()];
        for &item in items {
            let global_row = (item >> 48) as u32;
            let ts = item & TIMESTAMP_MASK;
            let tile_index = global_row as usize / TILE_CAPACITY;
            if tile_index >= self.tiles.len() {
                return Err(TesseraError::InvalidArgument(format!(
                    "row {global_row} is out of range for {} records",
                    self.record_num
                )));
            }
            per_tile[tile_index].push(pack_item(
                (global_row as usize % TILE_CAPACITY) as u16,
                ts,
            ));
        }
        for (tile, items) in self.tiles.iter().zip(per_tile) {
            if !items.is_empty() {
                tile.prepend_deletion_blocks(&items)?;
            }
        }
        Ok(())
    }

    /// Per-tile base bitmaps concatenated for checkpointing.
    pub fn base_bitmap(&self) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.bitmap_size());
        for tile in &self.tiles {
            out.extend_from_slice(&tile.base_bitmap());
        }
        out
    }

    /// Fraction of the row group's capacity marked deleted.
    pub fn invalid_ratio(&self) -> f64 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        let total: u64 = self.tiles.iter().map(|t| t.invalid_count() as u64).sum();
        total as f64 / (self.tiles.len() * TILE_CAPACITY) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::get_bit;

    #[test]
    fn test_tile_partitioning() {
        let rg = RowGroupVisibility::new(1000);
        assert_eq!(rg.tile_count(), 4);
        assert_eq!(rg.bitmap_size(), 16);

        rg.create_epoch(10);
        rg.delete(5, 10).unwrap();
        rg.delete(300, 10).unwrap();
        rg.delete(999, 10).unwrap();
        assert!(rg.delete(1024, 10).is_err());

        let bm = rg.bitmap_at(10).unwrap();
        assert!(get_bit(&bm, 5));
        assert!(get_bit(&bm, 300));
        assert!(get_bit(&bm, 999));
        assert!(!get_bit(&bm, 6));
    }

    #[test]
    fn test_cross_tile_snapshots() {
        let rg = RowGroupVisibility::new(512);
        rg.create_epoch(10);
        rg.delete(0, 10).unwrap();
        rg.create_epoch(20);
        rg.delete(256, 20).unwrap();

        let at_10 = rg.bitmap_at(10).unwrap();
        assert!(get_bit(&at_10, 0));
        assert!(!get_bit(&at_10, 256));

        let at_20 = rg.bitmap_at(20).unwrap();
        assert!(get_bit(&at_20, 0));
        assert!(get_bit(&at_20, 256));
    }

    #[test]
    fn test_export_prepend_roundtrip() {
        let source = RowGroupVisibility::new(600);
        source.create_epoch(10);
        source.delete(1, 10).unwrap();
        source.delete(400, 10).unwrap();
        source.create_epoch(20);
        source.delete(599, 20).unwrap();

        let items = source.export_deletion_blocks().unwrap();
        assert_eq!(items.len(), 3);

        let restored = RowGroupVisibility::new(600);
        restored.prepend_deletion_blocks(&items).unwrap();
        for ts in [10, 20] {
            assert_eq!(
                restored.bitmap_at(ts).unwrap(),
                source.bitmap_at(ts).unwrap(),
                "row-group snapshot at {ts}"
            );
        }
    }

    #[test]
    fn test_restore_validates_bitmap_size() {
        assert!(RowGroupVisibility::restore(600, &[0u64; 4]).is_err());

        let mut bitmap = vec![0u64; 12];
        bitmap[0] = 0b100; // row 2 deleted at the base
        let rg = RowGroupVisibility::restore(600, &bitmap).unwrap();
        assert!(matches!(
            rg.delete(2, 10),
            Err(TesseraError::AlreadyDeleted { row: 2 })
        ));
        assert_eq!(rg.base_bitmap(), bitmap);
    }

    #[test]
    fn test_invalid_ratio() {
        let rg = RowGroupVisibility::new(512);
        assert_eq!(rg.invalid_ratio(), 0.0);
        rg.create_epoch(1);
        for row in 0..128 {
            rg.delete(row, 1).unwrap();
        }
        assert!((rg.invalid_ratio() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_collection_forwarding() {
        let rg = RowGroupVisibility::new(300);
        rg.create_epoch(10);
        rg.delete(1, 10).unwrap();
        rg.create_epoch(20);
        rg.delete(2, 20).unwrap();
        rg.collect_garbage(20).unwrap();

        let at_10 = rg.bitmap_at(10).unwrap();
        assert!(at_10.iter().all(|&w| w == 0), "epoch 10 dropped everywhere");
        let at_20 = rg.bitmap_at(20).unwrap();
        assert!(get_bit(&at_20, 1));
        assert!(get_bit(&at_20, 2));
    }
}
