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

//! Block-structured epoch metadata.
//!
//! Epochs append to the tail block, 1024 per block; each block tracks its
//! timestamp range so lookups binary-search the block array first, then
//! the block. Epoch timestamps are non-decreasing in insertion order, so
//! `min_ts <= max_ts <=` the next block's `min_ts`.

use tessera_core::{Result, TesseraError};

pub(crate) const EPOCH_BLOCK_CAPACITY: usize = 1024;

/// One epoch: its timestamp and the `[patch_start, patch_end)` byte range
/// in the tile's patch log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EpochInfo {
    pub ts: u64,
    pub patch_start: usize,
    pub patch_end: usize,
}

#[derive(Debug)]
pub(crate) struct EpochBlock {
    epochs: Vec<EpochInfo>,
    min_ts: u64,
    max_ts: u64,
}

impl EpochBlock {
    fn new() -> Self {
        Self {
            epochs: Vec::with_capacity(EPOCH_BLOCK_CAPACITY),
            min_ts: 0,
            max_ts: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.epochs.len() >= EPOCH_BLOCK_CAPACITY
    }
}

#[derive(Debug, Default)]
pub(crate) struct EpochLog {
    blocks: Vec<EpochBlock>,
}

impl EpochLog {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Appends one epoch, allocating a new block when the tail is full.
    pub fn insert(&mut self, ts: u64, patch_start: usize, patch_end: usize) {
        if self.blocks.last().map_or(true, EpochBlock::is_full) {
            self.blocks.push(EpochBlock::new());
        }
        let block = self.blocks.last_mut().expect("tail block exists");
        let info = EpochInfo {
            ts,
            patch_start,
            patch_end,
        };
        if block.epochs.is_empty() {
            block.min_ts = ts;
            block.max_ts = ts;
        } else {
            block.min_ts = block.min_ts.min(ts);
            block.max_ts = block.max_ts.max(ts);
        }
        block.epochs.push(info);
    }

    /// Exact-timestamp lookup: binary search over block ranges, then over
    /// the epochs of the candidate block.
    pub fn find(&self, ts: u64) -> Option<&EpochInfo> {
        let idx = self.candidate_block(ts)?;
        let block = &self.blocks[idx];
        block
            .epochs
            .binary_search_by_key(&ts, |e| e.ts)
            .ok()
            .map(|i| &block.epochs[i])
    }

    pub fn find_mut(&mut self, ts: u64) -> Option<&mut EpochInfo> {
        let idx = self.candidate_block(ts)?;
        let block = &mut self.blocks[idx];
        block
            .epochs
            .binary_search_by_key(&ts, |e| e.ts)
            .ok()
            .map(|i| &mut block.epochs[i])
    }

    fn candidate_block(&self, ts: u64) -> Option<usize> {
        let idx = self.blocks.partition_point(|b| b.max_ts < ts);
        let block = self.blocks.get(idx)?;
        if block.epochs.is_empty() || ts < block.min_ts || ts > block.max_ts {
            return None;
        }
        Some(idx)
    }

    /// Drops history before `cutoff`: whole blocks whose `max_ts` lies
    /// before it, then leading epochs of the boundary block. Dropping
    /// every retained epoch is an error.
    pub fn cleanup(&mut self, cutoff: u64) -> Result<usize> {
        let whole = self.blocks.partition_point(|b| b.max_ts < cutoff);
        if whole == self.blocks.len() && !self.blocks.is_empty() {
            return Err(TesseraError::InvalidArgument(format!(
                "cleanup to {cutoff} would drop every epoch"
            )));
        }
        let mut removed: usize = self.blocks[..whole].iter().map(|b| b.epochs.len()).sum();
        self.blocks.drain(..whole);

        if let Some(head) = self.blocks.first_mut() {
            // the head block survived the range check, so at least one of
            // its epochs reaches the cutoff
            let keep_from = head.epochs.partition_point(|e| e.ts < cutoff);
            if keep_from > 0 {
                head.epochs.drain(..keep_from);
                removed += keep_from;
                head.min_ts = head.epochs.iter().map(|e| e.ts).min().unwrap_or(0);
            }
        }
        Ok(removed)
    }

    /// Patch position of the oldest retained epoch.
    pub fn first_patch_start(&self) -> Option<usize> {
        self.blocks
            .first()
            .and_then(|b| b.epochs.first())
            .map(|e| e.patch_start)
    }

    /// Timestamp of the oldest retained epoch.
    pub fn min_ts(&self) -> Option<u64> {
        self.blocks.first().and_then(|b| b.epochs.first()).map(|e| e.ts)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpochInfo> {
        self.blocks.iter().flat_map(|b| b.epochs.iter())
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.epochs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.epochs.is_empty())
    }

    /// Moves every patch range up by `delta`; used when older history is
    /// spliced in front.
    pub fn shift(&mut self, delta: usize) {
        for block in &mut self.blocks {
            for epoch in &mut block.epochs {
                epoch.patch_start += delta;
                epoch.patch_end += delta;
            }
        }
    }

    /// Extends the most recent epoch's patch range.
    pub fn extend_last(&mut self, patch_end: usize) {
        if let Some(epoch) = self.blocks.last_mut().and_then(|b| b.epochs.last_mut()) {
            epoch.patch_end = patch_end;
        }
    }

    /// Appends the blocks of `newer` after this log's blocks.
    pub fn append_log(&mut self, newer: EpochLog) {
        self.blocks.extend(newer.blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let mut log = EpochLog::new();
        log.insert(10, 0, 32);
        log.insert(20, 32, 64);
        log.insert(30, 64, 96);

        assert_eq!(log.find(20).map(|e| e.patch_start), Some(32));
        assert!(log.find(15).is_none());
        assert!(log.find(5).is_none());
        assert!(log.find(40).is_none());
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_block_overflow() {
        let mut log = EpochLog::new();
        for i in 0..(EPOCH_BLOCK_CAPACITY + 10) as u64 {
            log.insert(i, i as usize * 32, i as usize * 32 + 32);
        }
        assert_eq!(log.len(), EPOCH_BLOCK_CAPACITY + 10);
        // both sides of the block boundary remain findable
        assert!(log.find((EPOCH_BLOCK_CAPACITY - 1) as u64).is_some());
        assert!(log.find(EPOCH_BLOCK_CAPACITY as u64).is_some());
    }

    #[test]
    fn test_cleanup_boundary_block() {
        let mut log = EpochLog::new();
        log.insert(10, 0, 33);
        log.insert(20, 33, 66);
        let removed = log.cleanup(20).unwrap();
        assert_eq!(removed, 1);
        assert!(log.find(10).is_none());
        assert!(log.find(20).is_some());
        assert_eq!(log.first_patch_start(), Some(33));
    }

    #[test]
    fn test_cleanup_refuses_to_drop_everything() {
        let mut log = EpochLog::new();
        log.insert(10, 0, 32);
        log.insert(20, 32, 64);
        assert!(log.cleanup(100).is_err());
        // nothing was removed by the failed call... the boundary block
        // path rejects before draining
        assert_eq!(log.len(), 2);
        // empty log cleanup is a no-op
        assert_eq!(EpochLog::new().cleanup(5).unwrap(), 0);
    }

    #[test]
    fn test_cleanup_across_blocks() {
        let mut log = EpochLog::new();
        for i in 0..(EPOCH_BLOCK_CAPACITY + 4) as u64 {
            log.insert(i, i as usize, i as usize + 1);
        }
        let cutoff = (EPOCH_BLOCK_CAPACITY + 2) as u64;
        let removed = log.cleanup(cutoff).unwrap();
        assert_eq!(removed, EPOCH_BLOCK_CAPACITY + 2);
        assert_eq!(log.min_ts(), Some(cutoff));
    }
}
