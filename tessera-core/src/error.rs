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

//! Error types for Tessera
//!
//! Errors always surface to the caller of the public operation that raised
//! them; the engine never swallows one. A column writer that fails in the
//! middle of `write` is left in an undefined state and must be discarded by
//! the caller. A tile that reports `AlreadyDeleted` stays usable for other
//! row ids.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TesseraError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported column type: {0}")]
    InvalidType(String),

    #[error("Batch kind mismatch: writer expects {expected}, got {actual}")]
    InvalidBatchKind {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Row {row} is already marked for deletion")]
    AlreadyDeleted { row: u16 },

    #[error("Corrupt patch data: {0}")]
    CorruptPatch(String),

    #[error("Corrupt dictionary: {0}")]
    CorruptDictionary(String),
}

pub type Result<T> = std::result::Result<T, TesseraError>;
