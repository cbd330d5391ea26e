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

//! Tessera Core
//!
//! Fundamental types shared by the encode pipeline and the row-visibility
//! engine:
//!
//! - **Errors**: one workspace-wide error enum with a `Result` alias
//! - **Types**: the column category enum and immutable type descriptors
//! - **Config**: writer options (pixel stride, encoding level, byte order,
//!   nulls padding, null-bitmap alignment)
//! - **Int128**: the 128-bit integer pair underlying long decimals

pub mod config;
pub mod error;
pub mod int128;
pub mod types;

pub use config::{ByteOrder, EncodingLevel, WriterOptions};
pub use error::{Result, TesseraError};
pub use int128::Int128;
pub use types::{Category, TypeDescriptor, SHORT_DECIMAL_MAX_PRECISION};
