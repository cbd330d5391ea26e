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

//! Typed value batches fed into column writers.
//!
//! Every batch keeps a parallel `nulls` vec the length of the batch; a
//! null position still occupies a slot in `values` (holding the type
//! default) so indices line up. Byte-string values use offset encoding:
//! value `i` is `data[offsets[i]..offsets[i + 1]]`, which keeps the batch
//! a flat pair of allocations regardless of row count.

use tessera_core::{Int128, Result, TesseraError};

/// Fixed-width values plus validity flags.
#[derive(Debug, Clone, Default)]
pub struct ScalarBatch<T> {
    pub values: Vec<T>,
    pub nulls: Vec<bool>,
}

impl<T: Copy + Default> ScalarBatch<T> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            nulls: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            nulls: Vec::with_capacity(capacity),
        }
    }

    /// All-valid batch over the given values.
    pub fn from_values(values: Vec<T>) -> Self {
        let nulls = vec![false; values.len()];
        Self { values, nulls }
    }

    pub fn push(&mut self, value: T) {
        self.values.push(value);
        self.nulls.push(false);
    }

    pub fn push_null(&mut self) {
        self.values.push(T::default());
        self.nulls.push(true);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Byte-string values in offset encoding, shared by the string and binary
/// families.
#[derive(Debug, Clone)]
pub struct BytesBatch {
    /// `len + 1` entries; value `i` spans `offsets[i]..offsets[i + 1]`.
    pub offsets: Vec<u32>,
    pub data: Vec<u8>,
    pub nulls: Vec<bool>,
}

impl Default for BytesBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl BytesBatch {
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            data: Vec::new(),
            nulls: Vec::new(),
        }
    }

    pub fn push(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
        self.offsets.push(self.data.len() as u32);
        self.nulls.push(false);
    }

    /// A null occupies a zero-length span so positions stay addressable.
    pub fn push_null(&mut self) {
        self.offsets.push(self.data.len() as u32);
        self.nulls.push(true);
    }

    pub fn value(&self, i: usize) -> &[u8] {
        &self.data[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }

    pub fn len(&self) -> usize {
        self.nulls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nulls.is_empty()
    }
}

/// Dense vectors of a fixed dimension, stored flattened.
#[derive(Debug, Clone)]
pub struct VectorBatch {
    dimension: usize,
    pub data: Vec<f64>,
    pub nulls: Vec<bool>,
}

impl VectorBatch {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
            nulls: Vec::new(),
        }
    }

    pub fn push(&mut self, value: &[f64]) -> Result<()> {
        if value.len() != self.dimension {
            return Err(TesseraError::InvalidArgument(format!(
                "vector of dimension {} pushed into a batch of dimension {}",
                value.len(),
                self.dimension
            )));
        }
        self.data.extend_from_slice(value);
        self.nulls.push(false);
        Ok(())
    }

    pub fn push_null(&mut self) {
        self.data.extend(std::iter::repeat(0.0).take(self.dimension));
        self.nulls.push(true);
    }

    pub fn value(&self, i: usize) -> &[f64] {
        &self.data[i * self.dimension..(i + 1) * self.dimension]
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.nulls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nulls.is_empty()
    }
}

/// One batch of values for a single column, tagged by value kind.
///
/// The kind must match the writer's category; a mismatch is rejected with
/// `InvalidBatchKind` before any bytes are written.
#[derive(Debug, Clone)]
pub enum ColumnBatch {
    Boolean(ScalarBatch<bool>),
    Byte(ScalarBatch<u8>),
    /// Shared by the short, int, and long categories.
    Integer(ScalarBatch<i64>),
    Float(ScalarBatch<f32>),
    Double(ScalarBatch<f64>),
    Decimal(ScalarBatch<i64>),
    LongDecimal(ScalarBatch<Int128>),
    /// Shared by string, char, varchar, binary, and varbinary.
    Bytes(BytesBatch),
    Date(ScalarBatch<i32>),
    Time(ScalarBatch<i32>),
    Timestamp(ScalarBatch<i64>),
    Vector(VectorBatch),
}

macro_rules! batch_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub fn $fn_name(&self) -> Result<&$ty> {
            match self {
                ColumnBatch::$variant(b) => Ok(b),
                other => Err(TesseraError::InvalidBatchKind {
                    expected: $expected,
                    actual: other.kind_name(),
                }),
            }
        }
    };
}

impl ColumnBatch {
    pub fn len(&self) -> usize {
        match self {
            ColumnBatch::Boolean(b) => b.len(),
            ColumnBatch::Byte(b) => b.len(),
            ColumnBatch::Integer(b) => b.len(),
            ColumnBatch::Float(b) => b.len(),
            ColumnBatch::Double(b) => b.len(),
            ColumnBatch::Decimal(b) => b.len(),
            ColumnBatch::LongDecimal(b) => b.len(),
            ColumnBatch::Bytes(b) => b.len(),
            ColumnBatch::Date(b) => b.len(),
            ColumnBatch::Time(b) => b.len(),
            ColumnBatch::Timestamp(b) => b.len(),
            ColumnBatch::Vector(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ColumnBatch::Boolean(_) => "boolean",
            ColumnBatch::Byte(_) => "byte",
            ColumnBatch::Integer(_) => "integer",
            ColumnBatch::Float(_) => "float",
            ColumnBatch::Double(_) => "double",
            ColumnBatch::Decimal(_) => "decimal",
            ColumnBatch::LongDecimal(_) => "long decimal",
            ColumnBatch::Bytes(_) => "bytes",
            ColumnBatch::Date(_) => "date",
            ColumnBatch::Time(_) => "time",
            ColumnBatch::Timestamp(_) => "timestamp",
            ColumnBatch::Vector(_) => "vector",
        }
    }

    batch_accessor!(as_boolean, Boolean, ScalarBatch<bool>, "boolean");
    batch_accessor!(as_byte, Byte, ScalarBatch<u8>, "byte");
    batch_accessor!(as_integer, Integer, ScalarBatch<i64>, "integer");
    batch_accessor!(as_float, Float, ScalarBatch<f32>, "float");
    batch_accessor!(as_double, Double, ScalarBatch<f64>, "double");
    batch_accessor!(as_decimal, Decimal, ScalarBatch<i64>, "decimal");
    batch_accessor!(
        as_long_decimal,
        LongDecimal,
        ScalarBatch<Int128>,
        "long decimal"
    );
    batch_accessor!(as_bytes, Bytes, BytesBatch, "bytes");
    batch_accessor!(as_date, Date, ScalarBatch<i32>, "date");
    batch_accessor!(as_time, Time, ScalarBatch<i32>, "time");
    batch_accessor!(as_timestamp, Timestamp, ScalarBatch<i64>, "timestamp");
    batch_accessor!(as_vector, Vector, VectorBatch, "vector");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_batch_nulls_keep_alignment() {
        let mut b: ScalarBatch<i64> = ScalarBatch::new();
        b.push(1);
        b.push_null();
        b.push(3);
        assert_eq!(b.len(), 3);
        assert_eq!(b.values, vec![1, 0, 3]);
        assert_eq!(b.nulls, vec![false, true, false]);
    }

    #[test]
    fn test_bytes_batch_offsets() {
        let mut b = BytesBatch::new();
        b.push(b"ab");
        b.push_null();
        b.push(b"cde");
        assert_eq!(b.len(), 3);
        assert_eq!(b.value(0), b"ab");
        assert_eq!(b.value(1), b"");
        assert_eq!(b.value(2), b"cde");
        assert_eq!(b.offsets, vec![0, 2, 2, 5]);
    }

    #[test]
    fn test_vector_batch_dimension_check() {
        let mut b = VectorBatch::new(3);
        assert!(b.push(&[1.0, 2.0, 3.0]).is_ok());
        assert!(b.push(&[1.0]).is_err());
        b.push_null();
        assert_eq!(b.len(), 2);
        assert_eq!(b.value(1), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_kind_mismatch() {
        let batch = ColumnBatch::Integer(ScalarBatch::from_values(vec![1, 2]));
        assert!(batch.as_integer().is_ok());
        let err = batch.as_boolean().unwrap_err();
        assert!(matches!(
            err,
            TesseraError::InvalidBatchKind {
                expected: "boolean",
                actual: "integer"
            }
        ));
    }
}
