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

//! Tessera Encodings
//!
//! The leaf encoders of the column-chunk write path:
//!
//! - [`bitpack`]: boolean arrays to packed bytes under a chosen bit order
//! - [`rle_byte`]: streaming literal/repeat run-length coding of bytes
//! - [`rle_int`]: framed run-length coding of integer streams with
//!   zig-zag varints
//! - [`dictionary`]: insertion-ordered deduplication of byte keys into
//!   dense codes
//!
//! Every encoder is deterministic: the byte output depends only on the
//! input values and the constructor configuration, never on allocation or
//! iteration order.

pub mod bitpack;
pub mod dictionary;
pub mod rle_byte;
pub mod rle_int;

pub use bitpack::{pack_bits, unpack_bits};
pub use dictionary::Dictionary;
pub use rle_byte::RunLenByteEncoder;
pub use rle_int::RunLenIntEncoder;
