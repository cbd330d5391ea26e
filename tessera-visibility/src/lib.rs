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

//! Tessera Row Visibility
//!
//! MVCC row-visibility engine for a real-time ingestion buffer. A row
//! group of up to a few hundred thousand rows is split into 256-row
//! *tiles*; each tile keeps the set of rows deleted at each epoch
//! timestamp so a reader at any past timestamp can reconstruct the
//! visibility bitmap.
//!
//! ## Tile layout
//!
//! ```text
//! epoch log:   [ block 0 | block 1 | ... ]   up to 1024 epochs per block
//! patch log:   [ chunk 0 -> chunk 1 -> ... ] 4096 bytes per chunk
//!
//! one epoch's patch range:
//!   +----------------------------+----+----+----+
//!   | 32-byte checkpoint bitmap  | r0 | r1 | .. |   one byte per delete
//!   +----------------------------+----+----+----+
//! ```
//!
//! Writers call `create_epoch(ts)` then `delete(row, ts)`; readers call
//! `bitmap_at(ts)`, which copies the epoch's checkpoint and replays its
//! patch bytes. Epoch-based reclamation drops history before a cutoff.
//! Each tile serializes its operations behind one mutex; different tiles
//! proceed independently.

pub mod bitmap;
mod epoch_log;
mod patch_log;
pub mod row_group;
pub mod tile;

pub use row_group::RowGroupVisibility;
pub use tile::TileVisibility;

/// Rows per tile.
pub const TILE_CAPACITY: usize = 256;

/// 64-bit words per tile bitmap.
pub const BITMAP_WORDS: usize = TILE_CAPACITY / 64;

/// Bytes of one intend-delete checkpoint (the whole tile bitmap).
pub const CHECKPOINT_SIZE: usize = BITMAP_WORDS * 8;

/// Low 48 bits of a packed deletion item hold the timestamp.
pub const TIMESTAMP_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;
