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

//! Column writers.
//!
//! One writer per column chunk. Every category writer is the same shape:
//! a shared [`WriterBase`] doing the pixel bookkeeping (null bitmap,
//! counters, index entries, statistics merge) plus a per-category value
//! emission step, either staged per pixel or written immediately.
//!
//! Invariants maintained here:
//!
//! - `cur_pixel_ele_index <= pixel_stride`; reaching the stride closes
//!   the pixel
//! - `cur_pixel_is_null_index == cur_pixel_ele_index` at every external
//!   observation point
//! - after a pixel closes both counters are zero and a new index entry
//!   exists
//! - `pixel_positions[i]` is the output position at the start of pixel `i`

mod binary;
mod boolean;
mod byte;
mod decimal;
mod float;
mod integer;
mod string;
mod temporal;
mod vector;

pub use binary::BinaryWriter;
pub use boolean::BooleanWriter;
pub use byte::ByteWriter;
pub use decimal::{DecimalWriter, LongDecimalWriter};
pub use float::{DoubleWriter, FloatWriter};
pub use integer::IntegerWriter;
pub use string::{StringWriter, VarcharWriter};
pub use temporal::{Time32Writer, TimestampWriter};
pub use vector::VectorWriter;

use tessera_core::{ByteOrder, Category, Result, TesseraError, TypeDescriptor, WriterOptions};
use tessera_encoding::pack_bits;

use crate::batch::ColumnBatch;
use crate::index::{ColumnChunkIndex, ColumnEncoding};
use crate::stats::StatsRecorder;

/// Contract exposed by every category writer.
///
/// A writer that returns an error from `write` is left in an undefined
/// state; discard it. `close` is mandatory to release encoder buffers.
/// Writers own all their state, so chunks for different columns can be
/// produced on different threads.
pub trait ColumnWriter: Send {
    /// Consumes `size` logical values from `batch`, closing pixels at each
    /// stride boundary. Returns the current output write position.
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize>;

    /// Closes any partial pixel, aligns the output, and appends the null
    /// bitmap section (plus category-specific auxiliary sections).
    fn flush(&mut self) -> Result<()>;

    /// Restores the fresh-construction state so the writer can produce an
    /// identical chunk from the same inputs.
    fn reset(&mut self);

    /// Releases owned buffers. The writer is unusable afterwards.
    fn close(&mut self);

    fn chunk_content(&self) -> &[u8];

    fn chunk_size(&self) -> usize;

    fn chunk_index(&self) -> &ColumnChunkIndex;

    /// Serialized chunk-level statistics blob.
    fn chunk_stats_bytes(&self) -> Vec<u8>;

    fn chunk_encoding(&self) -> ColumnEncoding;
}

/// Builds the writer matching the descriptor's category.
///
/// Short/Int/Long share the integer writer; Decimal branches on the
/// precision split; Char/Varchar share the bounded string writer and
/// Binary/Varbinary the bounded binary writer.
pub fn new_column_writer(
    type_desc: &TypeDescriptor,
    options: &WriterOptions,
) -> Result<Box<dyn ColumnWriter>> {
    options.validate()?;
    match type_desc.category() {
        Category::Boolean => Ok(Box::new(BooleanWriter::new(options)?)),
        Category::Byte => Ok(Box::new(ByteWriter::new(options)?)),
        Category::Short | Category::Int => Ok(Box::new(IntegerWriter::new(options, false)?)),
        Category::Long => Ok(Box::new(IntegerWriter::new(options, true)?)),
        Category::Float => Ok(Box::new(FloatWriter::new(options)?)),
        Category::Double => Ok(Box::new(DoubleWriter::new(options)?)),
        Category::Decimal => {
            if type_desc.is_short_decimal() {
                Ok(Box::new(DecimalWriter::new(options)?))
            } else {
                Ok(Box::new(LongDecimalWriter::new(options)?))
            }
        }
        Category::String => Ok(Box::new(StringWriter::new(options)?)),
        Category::Char | Category::Varchar => {
            Ok(Box::new(VarcharWriter::new(type_desc, options)?))
        }
        Category::Binary | Category::Varbinary => {
            Ok(Box::new(BinaryWriter::new(type_desc, options)?))
        }
        Category::Date => Ok(Box::new(Time32Writer::new(options, Category::Date)?)),
        Category::Time => Ok(Box::new(Time32Writer::new(options, Category::Time)?)),
        Category::Timestamp => Ok(Box::new(TimestampWriter::new(options)?)),
        Category::Vector => {
            if type_desc.dimension() == 0 {
                return Err(TesseraError::InvalidType(
                    "vector column without a dimension".to_string(),
                ));
            }
            Ok(Box::new(VectorWriter::new(type_desc, options)?))
        }
    }
}

/// One slice of an incoming batch, cut at pixel boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelPart {
    pub offset: usize,
    pub len: usize,
    /// True when this part lands exactly on a stride boundary, so the
    /// pixel closes right after it.
    pub ends_pixel: bool,
}

/// Splits `size` values into parts filling whole pixels plus a (possibly
/// empty) partial tail. `filled` is the number of values already staged in
/// the current pixel.
pub(crate) fn pixel_parts(filled: usize, stride: usize, size: usize) -> Vec<PixelPart> {
    let mut parts = Vec::new();
    let mut offset = 0;
    let mut filled = filled;
    let mut remaining = size;
    while filled + remaining >= stride {
        let take = stride - filled;
        parts.push(PixelPart {
            offset,
            len: take,
            ends_pixel: true,
        });
        offset += take;
        remaining -= take;
        filled = 0;
    }
    parts.push(PixelPart {
        offset,
        len: remaining,
        ends_pixel: false,
    });
    parts
}

pub(crate) fn check_size(batch_len: usize, size: usize) -> Result<()> {
    if size > batch_len {
        return Err(TesseraError::InvalidArgument(format!(
            "write of {size} values from a batch of {batch_len}"
        )));
    }
    Ok(())
}

/// State shared by every category writer: pixel counters, null bitmap,
/// output and null streams, chunk index, and the pixel / chunk statistics
/// recorders.
pub(crate) struct WriterBase<S> {
    pub pixel_stride: usize,
    pub byte_order: ByteOrder,
    pub nulls_padding: bool,
    pub isnull_alignment: usize,

    /// Null flags of the current pixel; `..cur_pixel_is_null_index` valid.
    pub is_null: Vec<bool>,
    pub index: ColumnChunkIndex,
    pub pixel_stats: S,
    pub chunk_stats: S,

    pub last_pixel_position: usize,
    pub cur_pixel_position: usize,
    pub cur_pixel_ele_index: usize,
    pub cur_pixel_is_null_index: usize,
    pub has_null: bool,

    pub output: Vec<u8>,
    pub is_null_stream: Vec<u8>,
}

impl<S: StatsRecorder> WriterBase<S> {
    /// `nulls_padding` is the effective policy after the category's
    /// `decide_nulls_padding` hook ran.
    pub fn new(options: &WriterOptions, nulls_padding: bool) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            pixel_stride: options.pixel_stride,
            byte_order: options.byte_order,
            nulls_padding,
            isnull_alignment: options.isnull_alignment,
            is_null: vec![false; options.pixel_stride],
            index: ColumnChunkIndex::new(
                options.byte_order.is_little(),
                nulls_padding,
                options.isnull_alignment as u32,
            ),
            pixel_stats: S::default(),
            chunk_stats: S::default(),
            last_pixel_position: 0,
            cur_pixel_position: 0,
            cur_pixel_ele_index: 0,
            cur_pixel_is_null_index: 0,
            has_null: false,
            output: Vec::new(),
            is_null_stream: Vec::new(),
        })
    }

    /// Copies a slice of input null flags into the pixel's bitmap.
    pub fn record_nulls(&mut self, nulls: &[bool]) {
        let start = self.cur_pixel_is_null_index;
        self.is_null[start..start + nulls.len()].copy_from_slice(nulls);
        self.cur_pixel_is_null_index += nulls.len();
    }

    /// Pushes a single null flag; the immediate-write categories go value
    /// by value.
    pub fn record_null(&mut self, null: bool) {
        self.is_null[self.cur_pixel_is_null_index] = null;
        self.cur_pixel_is_null_index += 1;
    }

    /// Shared tail of every category's pixel close: compact the null
    /// bitmap (only when the pixel saw a null), record the pixel position
    /// and serialized stats in the index, merge pixel stats into chunk
    /// stats, reset the per-pixel counters.
    pub fn finish_pixel(&mut self) {
        if self.has_null {
            let compacted = pack_bits(
                &self.is_null[..self.cur_pixel_is_null_index],
                self.byte_order,
            );
            self.is_null_stream.extend_from_slice(&compacted);
            self.pixel_stats.set_has_null();
        }
        self.cur_pixel_position = self.output.len();
        self.cur_pixel_ele_index = 0;
        self.cur_pixel_is_null_index = 0;

        self.chunk_stats.merge(&self.pixel_stats);
        let pixel_blob = self.pixel_stats.serialize();
        self.index
            .add_pixel(self.last_pixel_position as u64, pixel_blob);

        self.last_pixel_position = self.cur_pixel_position;
        self.pixel_stats.reset();
        self.has_null = false;
    }

    /// Flush tail: align the output to `isnull_alignment`, record the
    /// null-bitmap offset, append the accumulated null stream.
    pub fn seal_chunk(&mut self) {
        let mut offset = self.output.len();
        if self.isnull_alignment != 0 && offset % self.isnull_alignment != 0 {
            let pad = self.isnull_alignment - offset % self.isnull_alignment;
            self.output.extend(std::iter::repeat(0u8).take(pad));
            offset += pad;
        }
        self.index.set_isnull_offset(offset as u64);
        self.output.extend_from_slice(&self.is_null_stream);
        tracing::debug!(
            chunk_size = self.output.len(),
            pixels = self.index.pixel_count(),
            "sealed column chunk"
        );
    }

    pub fn reset(&mut self) {
        self.last_pixel_position = 0;
        self.cur_pixel_position = 0;
        self.cur_pixel_ele_index = 0;
        self.cur_pixel_is_null_index = 0;
        self.has_null = false;
        self.index.clear();
        self.pixel_stats.reset();
        self.chunk_stats.reset();
        self.output.clear();
        self.is_null_stream.clear();
    }

    pub fn close(&mut self) {
        self.output = Vec::new();
        self.is_null_stream = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_parts_exact_boundary() {
        let parts = pixel_parts(0, 4, 8);
        assert_eq!(
            parts,
            vec![
                PixelPart {
                    offset: 0,
                    len: 4,
                    ends_pixel: true
                },
                PixelPart {
                    offset: 4,
                    len: 4,
                    ends_pixel: true
                },
                PixelPart {
                    offset: 8,
                    len: 0,
                    ends_pixel: false
                },
            ]
        );
    }

    #[test]
    fn test_pixel_parts_partial_fill() {
        // 3 already staged, stride 4: one value completes the pixel, the
        // remaining 2 stay partial
        let parts = pixel_parts(3, 4, 3);
        assert_eq!(
            parts,
            vec![
                PixelPart {
                    offset: 0,
                    len: 1,
                    ends_pixel: true
                },
                PixelPart {
                    offset: 1,
                    len: 2,
                    ends_pixel: false
                },
            ]
        );
    }

    #[test]
    fn test_pixel_parts_small_batch() {
        let parts = pixel_parts(0, 100, 7);
        assert_eq!(
            parts,
            vec![PixelPart {
                offset: 0,
                len: 7,
                ends_pixel: false
            }]
        );
    }
}
