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

//! Writer configuration.
//!
//! All knobs are passed explicitly into writer constructors; there is no
//! process-global configuration state. Options are immutable once a writer
//! is built.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};

/// Byte order of multi-byte scalars inside a column chunk.
///
/// Callers pick one order per chunk and use it consistently; the choice is
/// recorded in the chunk index so the read path can mirror it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    pub fn is_little(self) -> bool {
        self == ByteOrder::Little
    }

    pub fn put_i32(self, out: &mut Vec<u8>, v: i32) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub fn put_u32(self, out: &mut Vec<u8>, v: u32) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub fn put_i64(self, out: &mut Vec<u8>, v: i64) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub fn put_u64(self, out: &mut Vec<u8>, v: u64) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    /// IEEE 754 bit pattern, no numeric conversion.
    pub fn put_f32(self, out: &mut Vec<u8>, v: f32) {
        self.put_u32(out, v.to_bits());
    }

    /// IEEE 754 bit pattern, no numeric conversion.
    pub fn put_f64(self, out: &mut Vec<u8>, v: f64) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&v.to_bits().to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_bits().to_be_bytes()),
        }
    }
}

/// How aggressively a column chunk is encoded.
///
/// - `EL0`: raw values only
/// - `EL1`: dictionary encoding for string-family columns
/// - `EL2`: run-length encoding, cascaded over the dictionary for strings
///   and applied directly for integer-family columns
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum EncodingLevel {
    EL0,
    EL1,
    #[default]
    EL2,
}

impl EncodingLevel {
    pub fn from_level(level: i32) -> Result<Self> {
        match level {
            0 => Ok(EncodingLevel::EL0),
            1 => Ok(EncodingLevel::EL1),
            2 => Ok(EncodingLevel::EL2),
            other => Err(TesseraError::InvalidArgument(format!(
                "invalid encoding level: {other}"
            ))),
        }
    }

    pub fn ge(self, other: EncodingLevel) -> bool {
        self >= other
    }

    pub fn to_level(self) -> i32 {
        match self {
            EncodingLevel::EL0 => 0,
            EncodingLevel::EL1 => 1,
            EncodingLevel::EL2 => 2,
        }
    }
}

/// Options shared by every column writer of a row group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Number of rows per pixel.
    pub pixel_stride: usize,
    pub encoding_level: EncodingLevel,
    pub byte_order: ByteOrder,
    /// Emit a type-specific zero for null positions so the encoded stream
    /// stays positionally random-accessible. Run-length writers override
    /// this at `EL2`; see `decide_nulls_padding` on the writers.
    pub nulls_padding: bool,
    /// Alignment of the null-bitmap section within the chunk; 0 disables
    /// alignment padding.
    pub isnull_alignment: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            pixel_stride: 10_000,
            encoding_level: EncodingLevel::EL2,
            byte_order: ByteOrder::Little,
            nulls_padding: false,
            isnull_alignment: 8,
        }
    }
}

impl WriterOptions {
    pub fn validate(&self) -> Result<()> {
        if self.pixel_stride == 0 {
            return Err(TesseraError::InvalidArgument(
                "pixel_stride must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_pixel_stride(mut self, stride: usize) -> Self {
        self.pixel_stride = stride;
        self
    }

    pub fn with_encoding_level(mut self, level: EncodingLevel) -> Self {
        self.encoding_level = level;
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_nulls_padding(mut self, padding: bool) -> Self {
        self.nulls_padding = padding;
        self
    }

    pub fn with_isnull_alignment(mut self, alignment: usize) -> Self {
        self.isnull_alignment = alignment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_level_ordering() {
        assert!(EncodingLevel::EL2.ge(EncodingLevel::EL1));
        assert!(EncodingLevel::EL1.ge(EncodingLevel::EL1));
        assert!(!EncodingLevel::EL0.ge(EncodingLevel::EL1));
        assert_eq!(EncodingLevel::from_level(2).unwrap(), EncodingLevel::EL2);
        assert!(EncodingLevel::from_level(3).is_err());
    }

    #[test]
    fn test_endian_helpers() {
        let mut le = Vec::new();
        ByteOrder::Little.put_i32(&mut le, 0x0102_0304);
        assert_eq!(le, [0x04, 0x03, 0x02, 0x01]);

        let mut be = Vec::new();
        ByteOrder::Big.put_i32(&mut be, 0x0102_0304);
        assert_eq!(be, [0x01, 0x02, 0x03, 0x04]);

        let mut f = Vec::new();
        ByteOrder::Little.put_f32(&mut f, 1.0);
        assert_eq!(f, 0x3F80_0000u32.to_le_bytes());
    }

    #[test]
    fn test_options_validation() {
        assert!(WriterOptions::default().validate().is_ok());
        assert!(WriterOptions::default()
            .with_pixel_stride(0)
            .validate()
            .is_err());
    }
}
