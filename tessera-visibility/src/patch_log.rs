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

//! Append-only patch byte storage, chunked into owned 4096-byte nodes.
//!
//! Offsets are global across the log's lifetime: `base_offset` of each
//! chunk never changes once written (except for the wholesale shift when
//! older history is spliced in front), so epoch ranges stay valid after
//! head chunks are reclaimed.

use std::collections::VecDeque;

use tessera_core::{Result, TesseraError};

pub(crate) const PATCH_CHUNK_SIZE: usize = 4096;

#[derive(Debug)]
struct PatchChunk {
    data: Box<[u8; PATCH_CHUNK_SIZE]>,
    used: usize,
    base_offset: usize,
}

impl PatchChunk {
    fn new(base_offset: usize) -> Self {
        Self {
            data: Box::new([0u8; PATCH_CHUNK_SIZE]),
            used: 0,
            base_offset,
        }
    }

    fn end(&self) -> usize {
        self.base_offset + self.used
    }
}

#[derive(Debug, Default)]
pub(crate) struct PatchLog {
    chunks: VecDeque<PatchChunk>,
    write_pos: usize,
}

impl PatchLog {
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            write_pos: 0,
        }
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn append(&mut self, bytes: &[u8]) {
        let mut offset = 0;
        while offset < bytes.len() {
            let need_chunk = self
                .chunks
                .back()
                .map_or(true, |c| c.used == PATCH_CHUNK_SIZE);
            if need_chunk {
                let base = self.chunks.back().map_or(self.write_pos, PatchChunk::end);
                self.chunks.push_back(PatchChunk::new(base));
            }
            let tail = self.chunks.back_mut().expect("tail chunk exists");
            let take = (bytes.len() - offset).min(PATCH_CHUNK_SIZE - tail.used);
            tail.data[tail.used..tail.used + take].copy_from_slice(&bytes[offset..offset + take]);
            tail.used += take;
            offset += take;
        }
        self.write_pos += bytes.len();
    }

    pub fn append_byte(&mut self, byte: u8) {
        self.append(&[byte]);
    }

    /// Reads `dest.len()` bytes starting at the global `offset`.
    pub fn read(&self, offset: usize, dest: &mut [u8]) -> Result<()> {
        if dest.is_empty() {
            return Ok(());
        }
        let mut idx = self.chunks.partition_point(|c| c.end() <= offset);
        let mut pos = offset;
        let mut filled = 0;
        while filled < dest.len() {
            let Some(chunk) = self.chunks.get(idx) else {
                return Err(TesseraError::CorruptPatch(format!(
                    "patch read of {} bytes at {offset} beyond the retained range",
                    dest.len()
                )));
            };
            if pos < chunk.base_offset {
                return Err(TesseraError::CorruptPatch(format!(
                    "patch offset {pos} falls before the retained range"
                )));
            }
            let in_chunk = pos - chunk.base_offset;
            let take = (dest.len() - filled).min(chunk.used - in_chunk);
            if take == 0 {
                return Err(TesseraError::CorruptPatch(format!(
                    "patch read stalled at offset {pos}"
                )));
            }
            dest[filled..filled + take]
                .copy_from_slice(&chunk.data[in_chunk..in_chunk + take]);
            filled += take;
            pos += take;
            idx += 1;
        }
        Ok(())
    }

    pub fn read_byte(&self, offset: usize) -> Result<u8> {
        let mut byte = [0u8];
        self.read(offset, &mut byte)?;
        Ok(byte[0])
    }

    /// Overwrites already-written bytes in place; the range must lie
    /// within the retained stream.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mut idx = self.chunks.partition_point(|c| c.end() <= offset);
        let mut pos = offset;
        let mut written = 0;
        while written < bytes.len() {
            let Some(chunk) = self.chunks.get_mut(idx) else {
                return Err(TesseraError::CorruptPatch(format!(
                    "patch write of {} bytes at {offset} beyond the retained range",
                    bytes.len()
                )));
            };
            if pos < chunk.base_offset {
                return Err(TesseraError::CorruptPatch(format!(
                    "patch offset {pos} falls before the retained range"
                )));
            }
            let in_chunk = pos - chunk.base_offset;
            let take = (bytes.len() - written).min(chunk.used - in_chunk);
            if take == 0 {
                return Err(TesseraError::CorruptPatch(format!(
                    "patch write stalled at offset {pos}"
                )));
            }
            chunk.data[in_chunk..in_chunk + take]
                .copy_from_slice(&bytes[written..written + take]);
            written += take;
            pos += take;
            idx += 1;
        }
        Ok(())
    }

    /// Frees head chunks that lie entirely before `offset`. Returns the
    /// number of chunks reclaimed.
    pub fn reclaim_before(&mut self, offset: usize) -> usize {
        let mut reclaimed = 0;
        while self.chunks.front().is_some_and(|c| c.end() <= offset) {
            self.chunks.pop_front();
            reclaimed += 1;
        }
        reclaimed
    }

    /// Moves the whole log up by `delta` global offsets; used when older
    /// history is spliced in front.
    pub fn shift(&mut self, delta: usize) {
        for chunk in &mut self.chunks {
            chunk.base_offset += delta;
        }
        self.write_pos += delta;
    }

    /// Splices this log's bytes in front of `newer`, consuming both.
    pub fn splice_before(mut self, mut newer: PatchLog) -> PatchLog {
        let prefix = self.write_pos;
        newer.shift(prefix);
        self.chunks.extend(newer.chunks);
        self.write_pos = newer.write_pos;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_across_chunks() {
        let mut log = PatchLog::new();
        let payload: Vec<u8> = (0..(PATCH_CHUNK_SIZE * 2 + 100)).map(|i| i as u8).collect();
        log.append(&payload);
        assert_eq!(log.write_pos(), payload.len());

        let mut out = vec![0u8; payload.len()];
        log.read(0, &mut out).unwrap();
        assert_eq!(out, payload);

        // a read spanning the chunk seam
        let mut seam = [0u8; 16];
        log.read(PATCH_CHUNK_SIZE - 8, &mut seam).unwrap();
        assert_eq!(&out[PATCH_CHUNK_SIZE - 8..PATCH_CHUNK_SIZE + 8], &seam);
    }

    #[test]
    fn test_read_past_end_is_corrupt() {
        let mut log = PatchLog::new();
        log.append(&[1, 2, 3]);
        let mut out = [0u8; 4];
        assert!(log.read(0, &mut out).is_err());
        assert_eq!(log.read_byte(2).unwrap(), 3);
        assert!(log.read_byte(3).is_err());
    }

    #[test]
    fn test_reclaim_head_chunks() {
        let mut log = PatchLog::new();
        log.append(&vec![7u8; PATCH_CHUNK_SIZE * 3]);
        let reclaimed = log.reclaim_before(PATCH_CHUNK_SIZE * 2);
        assert_eq!(reclaimed, 2);
        // surviving range still reads, freed range does not
        assert_eq!(log.read_byte(PATCH_CHUNK_SIZE * 2).unwrap(), 7);
        assert!(log.read_byte(0).is_err());
        // appends continue at the same global position
        log.append(&[9]);
        assert_eq!(log.read_byte(PATCH_CHUNK_SIZE * 3).unwrap(), 9);
    }

    #[test]
    fn test_write_at() {
        let mut log = PatchLog::new();
        log.append(&vec![0u8; 40]);
        log.write_at(4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(log.read_byte(4).unwrap(), 1);
        assert_eq!(log.read_byte(7).unwrap(), 4);
        assert!(log.write_at(39, &[1, 2]).is_err());
    }

    #[test]
    fn test_splice_before() {
        let mut old = PatchLog::new();
        old.append(&[1, 2, 3]);
        let mut newer = PatchLog::new();
        newer.append(&[4, 5]);

        let combined = old.splice_before(newer);
        assert_eq!(combined.write_pos(), 5);
        assert_eq!(combined.read_byte(0).unwrap(), 1);
        assert_eq!(combined.read_byte(3).unwrap(), 4);
        assert_eq!(combined.read_byte(4).unwrap(), 5);
    }
}
