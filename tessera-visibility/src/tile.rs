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

//! Per-tile visibility state: 256 rows, one mutex, an epoch log and a
//! patch log.
//!
//! Opening an epoch snapshots the 32-byte intend-delete bitmap into the
//! patch stream; each delete appends one row byte and extends the owning
//! epoch's range. Reconstructing a snapshot copies the checkpoint back
//! and replays the row bytes. A row id is marked at most once; the second
//! delete of the same row fails.

use parking_lot::Mutex;
use tessera_core::{Result, TesseraError};

use crate::bitmap::{get_bit, set_bit, words_to_bytes};
use crate::epoch_log::EpochLog;
use crate::patch_log::PatchLog;
use crate::{BITMAP_WORDS, CHECKPOINT_SIZE, TILE_CAPACITY, TIMESTAMP_MASK};

/// Packs a tile-local deletion into `(row << 48) | (ts & 48 bits)`.
#[inline]
pub fn pack_item(row: u16, ts: u64) -> u64 {
    ((row as u64) << 48) | (ts & TIMESTAMP_MASK)
}

#[inline]
pub fn item_row(item: u64) -> u16 {
    (item >> 48) as u16
}

#[inline]
pub fn item_ts(item: u64) -> u64 {
    item & TIMESTAMP_MASK
}

struct TileInner {
    /// Deletions at timestamp zero, the restored checkpoint state.
    base_bitmap: [u64; BITMAP_WORDS],
    intend_delete: [u64; BITMAP_WORDS],
    actual_delete: [u64; BITMAP_WORDS],
    invalid_count: u32,
    epochs: EpochLog,
    patches: PatchLog,
}

pub struct TileVisibility {
    inner: Mutex<TileInner>,
}

impl Default for TileVisibility {
    fn default() -> Self {
        Self::new()
    }
}

impl TileVisibility {
    pub fn new() -> Self {
        Self::with_base(&[0u64; BITMAP_WORDS])
    }

    /// Restores a tile from a checkpointed base bitmap; the base rows
    /// count as already deleted.
    pub fn with_base(bitmap: &[u64; BITMAP_WORDS]) -> Self {
        let invalid_count = bitmap.iter().map(|w| w.count_ones()).sum();
        Self {
            inner: Mutex::new(TileInner {
                base_bitmap: *bitmap,
                intend_delete: *bitmap,
                actual_delete: *bitmap,
                invalid_count,
                epochs: EpochLog::new(),
                patches: PatchLog::new(),
            }),
        }
    }

    /// Opens an epoch at `ts`: the current intend-delete bitmap becomes
    /// the epoch's checkpoint.
    pub fn create_epoch(&self, ts: u64) {
        let mut inner = self.inner.lock();
        let patch_start = inner.patches.write_pos();
        let checkpoint = words_to_bytes(&inner.intend_delete);
        inner.patches.append(&checkpoint);
        let patch_end = inner.patches.write_pos();
        inner.epochs.insert(ts, patch_start, patch_end);
    }

    /// Marks `row` deleted at the epoch with exactly timestamp `ts`.
    ///
    /// The intend bit is set even when no such epoch exists; the patch
    /// byte only lands when it does.
    pub fn delete(&self, row: u16, ts: u64) -> Result<()> {
        if row as usize >= TILE_CAPACITY {
            return Err(TesseraError::InvalidArgument(format!(
                "row {row} exceeds the tile capacity {TILE_CAPACITY}"
            )));
        }
        let mut inner = self.inner.lock();
        if get_bit(&inner.intend_delete, row as usize) {
            return Err(TesseraError::AlreadyDeleted { row });
        }
        set_bit(&mut inner.intend_delete, row as usize);
        set_bit(&mut inner.actual_delete, row as usize);
        inner.invalid_count += 1;

        if inner.epochs.find(ts).is_some() {
            inner.patches.append_byte(row as u8);
            let end = inner.patches.write_pos();
            if let Some(epoch) = inner.epochs.find_mut(ts) {
                epoch.patch_end = end;
            }
        }
        Ok(())
    }

    /// Reconstructs the deletion bitmap visible at epoch `ts`.
    ///
    /// A timestamp with no retained epoch yields the empty bitmap.
    pub fn bitmap_at(&self, ts: u64) -> Result<[u64; BITMAP_WORDS]> {
        let inner = self.inner.lock();
        let mut out = [0u64; BITMAP_WORDS];
        let Some(epoch) = inner.epochs.find(ts) else {
            return Ok(out);
        };
        if epoch.patch_end - epoch.patch_start < CHECKPOINT_SIZE {
            return Err(TesseraError::CorruptPatch(format!(
                "epoch {ts} patch range shorter than its checkpoint"
            )));
        }
        let mut checkpoint = [0u8; CHECKPOINT_SIZE];
        inner.patches.read(epoch.patch_start, &mut checkpoint)?;
        out = crate::bitmap::bytes_to_words(&checkpoint);
        for pos in epoch.patch_start + CHECKPOINT_SIZE..epoch.patch_end {
            let row = inner.patches.read_byte(pos)?;
            set_bit(&mut out, row as usize);
        }
        Ok(out)
    }

    /// Drops epochs before `cutoff` and reclaims patch chunks no retained
    /// epoch references. Dropping the whole history is an error.
    pub fn collect_garbage(&self, cutoff: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.epochs.is_empty() {
            return Ok(());
        }
        let removed = inner.epochs.cleanup(cutoff)?;
        let reclaimed = match inner.epochs.first_patch_start() {
            Some(start) => inner.patches.reclaim_before(start),
            None => 0,
        };
        tracing::debug!(cutoff, removed, reclaimed, "collected tile garbage");
        Ok(())
    }

    /// Every recorded deletion as `(row, ts)` items, in epoch order.
    pub fn export_deletion_blocks(&self) -> Result<Vec<u64>> {
        let inner = self.inner.lock();
        let mut items = Vec::new();
        for epoch in inner.epochs.iter() {
            if epoch.patch_end - epoch.patch_start < CHECKPOINT_SIZE {
                return Err(TesseraError::CorruptPatch(format!(
                    "epoch {} patch range shorter than its checkpoint",
                    epoch.ts
                )));
            }
            for pos in epoch.patch_start + CHECKPOINT_SIZE..epoch.patch_end {
                let row = inner.patches.read_byte(pos)?;
                items.push(pack_item(row as u16, epoch.ts));
            }
        }
        Ok(items)
    }

    /// Splices exported deletion history in front of this tile's own.
    ///
    /// Items must be timestamp-ordered and no newer than the oldest
    /// retained epoch. Existing checkpoints absorb the prepended rows so
    /// snapshots stay monotone across the splice.
    pub fn prepend_deletion_blocks(&self, items: &[u64]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut inner = self.inner.lock();

        let mut prev_ts = 0;
        for &item in items {
            let ts = item_ts(item);
            if ts < prev_ts {
                return Err(TesseraError::InvalidArgument(
                    "prepended deletion items must be timestamp-ordered".to_string(),
                ));
            }
            prev_ts = ts;
        }
        if let Some(min_ts) = inner.epochs.min_ts() {
            if prev_ts > min_ts {
                return Err(TesseraError::InvalidArgument(format!(
                    "prepended history reaches {prev_ts}, newer than the oldest retained epoch {min_ts}"
                )));
            }
        }

        // build the prefix logs without touching tile state, so a bad
        // item leaves the tile unchanged
        let mut prefix_epochs = EpochLog::new();
        let mut prefix_patches = PatchLog::new();
        let mut running = inner.base_bitmap;
        let mut open_ts = None;
        for &item in items {
            let (row, ts) = (item_row(item), item_ts(item));
            if row as usize >= TILE_CAPACITY {
                return Err(TesseraError::InvalidArgument(format!(
                    "row {row} exceeds the tile capacity {TILE_CAPACITY}"
                )));
            }
            if get_bit(&running, row as usize) || get_bit(&inner.intend_delete, row as usize) {
                return Err(TesseraError::AlreadyDeleted { row });
            }
            if open_ts != Some(ts) {
                let start = prefix_patches.write_pos();
                prefix_patches.append(&words_to_bytes(&running));
                prefix_epochs.insert(ts, start, prefix_patches.write_pos());
                open_ts = Some(ts);
            }
            set_bit(&mut running, row as usize);
            prefix_patches.append_byte(row as u8);
            let end = prefix_patches.write_pos();
            prefix_epochs.extend_last(end);
        }

        // splice: shift the existing history up, move its chunks behind
        // the prefix, and fold the prefix rows into every existing
        // checkpoint and the live bitmaps
        let prefix_len = prefix_patches.write_pos();
        let old_epochs = std::mem::take(&mut inner.epochs);
        let old_patches = std::mem::take(&mut inner.patches);

        let mut epochs = prefix_epochs;
        let mut shifted = old_epochs;
        shifted.shift(prefix_len);

        let mut patches = prefix_patches.splice_before(old_patches);
        let prefix_bytes = words_to_bytes(&running);
        for epoch in shifted.iter() {
            let mut checkpoint = [0u8; CHECKPOINT_SIZE];
            patches.read(epoch.patch_start, &mut checkpoint)?;
            for (dst, src) in checkpoint.iter_mut().zip(prefix_bytes.iter()) {
                *dst |= src;
            }
            patches.write_at(epoch.patch_start, &checkpoint)?;
        }
        epochs.append_log(shifted);

        let mut added = 0;
        for word in 0..BITMAP_WORDS {
            let fresh = running[word] & !inner.intend_delete[word];
            added += fresh.count_ones();
            inner.intend_delete[word] |= running[word];
            inner.actual_delete[word] |= running[word];
        }
        inner.invalid_count += added;
        inner.epochs = epochs;
        inner.patches = patches;
        Ok(())
    }

    pub fn base_bitmap(&self) -> [u64; BITMAP_WORDS] {
        self.inner.lock().base_bitmap
    }

    /// Rows marked deleted over the tile's lifetime, base rows included.
    pub fn invalid_count(&self) -> u32 {
        self.inner.lock().invalid_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_and_snapshot_sequence() {
        let tile = TileVisibility::new();
        tile.create_epoch(10);
        tile.delete(5, 10).unwrap();
        tile.create_epoch(20);
        tile.delete(100, 20).unwrap();

        // second delete of the same row fails, tile stays usable
        let err = tile.delete(5, 20).unwrap_err();
        assert!(matches!(err, TesseraError::AlreadyDeleted { row: 5 }));
        tile.delete(7, 20).unwrap();

        let at_10 = tile.bitmap_at(10).unwrap();
        assert!(get_bit(&at_10, 5));
        assert!(!get_bit(&at_10, 100));

        let at_20 = tile.bitmap_at(20).unwrap();
        assert!(get_bit(&at_20, 5));
        assert!(get_bit(&at_20, 100));
        assert!(get_bit(&at_20, 7));
        assert_eq!(tile.invalid_count(), 3);
    }

    #[test]
    fn test_snapshot_monotonicity() {
        let tile = TileVisibility::new();
        let mut expected: Vec<(u64, Vec<usize>)> = Vec::new();
        let mut all_rows = Vec::new();
        for (i, ts) in [10u64, 20, 30, 40].into_iter().enumerate() {
            tile.create_epoch(ts);
            for j in 0..3 {
                let row = (i * 3 + j) as u16;
                tile.delete(row, ts).unwrap();
                all_rows.push(row as usize);
            }
            expected.push((ts, all_rows.clone()));
        }
        // each snapshot is a superset of every earlier one
        for (ts, rows) in &expected {
            let bm = tile.bitmap_at(*ts).unwrap();
            for row in 0..TILE_CAPACITY {
                assert_eq!(get_bit(&bm, row), rows.contains(&row), "ts {ts} row {row}");
            }
        }
    }

    #[test]
    fn test_missing_epoch_is_empty() {
        let tile = TileVisibility::new();
        tile.create_epoch(10);
        tile.delete(1, 10).unwrap();
        assert_eq!(tile.bitmap_at(99).unwrap(), [0u64; BITMAP_WORDS]);
    }

    #[test]
    fn test_delete_without_epoch_sets_only_the_bit() {
        let tile = TileVisibility::new();
        tile.delete(3, 77).unwrap();
        // no epoch existed, so no snapshot reflects the delete...
        assert_eq!(tile.bitmap_at(77).unwrap(), [0u64; BITMAP_WORDS]);
        // ...but the row is spoken for
        assert!(matches!(
            tile.delete(3, 78),
            Err(TesseraError::AlreadyDeleted { row: 3 })
        ));
    }

    #[test]
    fn test_cleanup_drops_old_epochs() {
        let tile = TileVisibility::new();
        tile.create_epoch(10);
        tile.delete(1, 10).unwrap();
        tile.create_epoch(20);
        tile.delete(2, 20).unwrap();

        tile.collect_garbage(20).unwrap();
        assert_eq!(tile.bitmap_at(10).unwrap(), [0u64; BITMAP_WORDS]);
        let at_20 = tile.bitmap_at(20).unwrap();
        assert!(get_bit(&at_20, 1), "checkpoint of epoch 20 retains row 1");
        assert!(get_bit(&at_20, 2));

        // dropping the entire history is refused
        assert!(tile.collect_garbage(1000).is_err());
    }

    #[test]
    fn test_row_out_of_range() {
        let tile = TileVisibility::new();
        assert!(tile.delete(256, 1).is_err());
    }

    #[test]
    fn test_restore_base_counts_as_deleted() {
        let mut base = [0u64; BITMAP_WORDS];
        set_bit(&mut base, 9);
        let tile = TileVisibility::with_base(&base);
        assert_eq!(tile.invalid_count(), 1);
        assert!(matches!(
            tile.delete(9, 5),
            Err(TesseraError::AlreadyDeleted { row: 9 })
        ));
        // the base state flows into new epoch checkpoints
        tile.create_epoch(5);
        assert!(get_bit(&tile.bitmap_at(5).unwrap(), 9));
    }

    #[test]
    fn test_export_prepend_roundtrip() {
        let source = TileVisibility::new();
        source.create_epoch(10);
        source.delete(5, 10).unwrap();
        source.delete(6, 10).unwrap();
        source.create_epoch(20);
        source.delete(200, 20).unwrap();

        let items = source.export_deletion_blocks().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(item_row(items[0]), 5);
        assert_eq!(item_ts(items[2]), 20);

        let restored = TileVisibility::new();
        restored.prepend_deletion_blocks(&items).unwrap();
        for ts in [10, 20] {
            assert_eq!(
                restored.bitmap_at(ts).unwrap(),
                source.bitmap_at(ts).unwrap(),
                "snapshot at {ts} must survive the roundtrip"
            );
        }
        assert_eq!(restored.invalid_count(), 3);
    }

    #[test]
    fn test_prepend_before_existing_history() {
        let tile = TileVisibility::new();
        tile.create_epoch(100);
        tile.delete(40, 100).unwrap();

        tile.prepend_deletion_blocks(&[pack_item(1, 10), pack_item(2, 20)])
            .unwrap();

        // old snapshots exist now
        let at_10 = tile.bitmap_at(10).unwrap();
        assert!(get_bit(&at_10, 1));
        assert!(!get_bit(&at_10, 2));

        // the existing epoch's checkpoint absorbed the prefix rows
        let at_100 = tile.bitmap_at(100).unwrap();
        assert!(get_bit(&at_100, 1));
        assert!(get_bit(&at_100, 2));
        assert!(get_bit(&at_100, 40));

        // prepending history newer than the retained epochs is rejected
        assert!(tile
            .prepend_deletion_blocks(&[pack_item(9, 500)])
            .is_err());
    }

    #[test]
    fn test_random_epoch_replay() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(42);
        let tile = TileVisibility::new();
        let mut pool: Vec<u16> = (0..TILE_CAPACITY as u16).collect();
        let mut history: Vec<(u64, Vec<u16>)> = Vec::new();
        let mut ts = 0u64;
        let mut all_deleted: Vec<u16> = Vec::new();
        for _ in 0..20 {
            ts += rng.gen_range(1..10);
            tile.create_epoch(ts);
            for _ in 0..rng.gen_range(0..10) {
                if pool.is_empty() {
                    break;
                }
                let row = pool.swap_remove(rng.gen_range(0..pool.len()));
                tile.delete(row, ts).unwrap();
                all_deleted.push(row);
            }
            history.push((ts, all_deleted.clone()));
        }
        // every snapshot equals its checkpoint plus the epoch's deletes
        for (ts, rows) in &history {
            let bm = tile.bitmap_at(*ts).unwrap();
            let count: u32 = bm.iter().map(|w| w.count_ones()).sum();
            assert_eq!(count as usize, rows.len(), "snapshot at {ts}");
            for &row in rows {
                assert!(get_bit(&bm, row as usize));
            }
        }
    }

    #[test]
    fn test_prepend_rejects_unordered_items() {
        let tile = TileVisibility::new();
        let err = tile
            .prepend_deletion_blocks(&[pack_item(1, 20), pack_item(2, 10)])
            .unwrap_err();
        assert!(matches!(err, TesseraError::InvalidArgument(_)));
    }
}
