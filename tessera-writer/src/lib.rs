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

//! Tessera Column-Chunk Write Path
//!
//! Converts per-column typed value batches into a column-chunk byte
//! stream, partitioned into fixed-size pixels (runs of rows), with
//! per-pixel statistics, per-chunk index metadata, null bitmaps, and
//! optional cascaded encodings.
//!
//! ## Chunk byte layout
//!
//! ```text
//! +-----------------------------+
//! | pixel bodies, in order      |  encoded bytes produced per pixel
//! +-----------------------------+
//! | zero padding (optional)     |  up to isnull_alignment bytes
//! +-----------------------------+
//! | null bitmap                 |  compacted per pixel, concatenated
//! +-----------------------------+
//! | auxiliary sections          |  string starts / dictionary content
//! +-----------------------------+
//! ```
//!
//! One writer owns one chunk; all writer state is mutated by a single
//! logical producer. Writers for different columns run on different
//! threads sharing only the immutable options and type registry.

pub mod batch;
pub mod index;
pub mod stats;
pub mod writer;

pub use batch::{BytesBatch, ColumnBatch, ScalarBatch, VectorBatch};
pub use index::{ColumnChunkIndex, ColumnEncoding, EncodingKind};
pub use writer::{new_column_writer, ColumnWriter};
