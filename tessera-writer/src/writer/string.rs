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

//! String-family columns.
//!
//! Two modes:
//!
//! - *Dictionary* (`EL1` and above): every value resolves through the
//!   dictionary to a dense code; codes stage per pixel and are written at
//!   pixel close, run-length encoded at `EL2` or as 4-byte ints below.
//!   Flush appends the dictionary content in code order, a starts array of
//!   `size + 1` entries (run-length encoded at `EL2`), then the two
//!   absolute offsets of those sections.
//! - *Direct* (`EL0`): payload bytes append straight to the output with a
//!   starts array recording each value's offset; with nulls padding on,
//!   null positions also push a starts entry so positions stay
//!   random-accessible. Flush appends the starts array and its absolute
//!   offset.
//!
//! Varchar shares this core with a length bound: oversized payloads are
//! truncated and counted, the caller's batch stays untouched. Char keeps
//! the same behavior apart from the padding policy.

use tessera_core::{EncodingLevel, Result, TypeDescriptor, WriterOptions};
use tessera_encoding::{Dictionary, RunLenIntEncoder};

use crate::batch::{BytesBatch, ColumnBatch};
use crate::index::{ColumnChunkIndex, ColumnEncoding};
use crate::stats::{BytesStats, StatsRecorder};
use crate::writer::{check_size, pixel_parts, ColumnWriter, WriterBase};

pub struct StringWriter {
    base: WriterBase<BytesStats>,
    /// Staged dictionary codes of the current pixel.
    codes: Vec<i64>,
    /// Direct-mode start offsets.
    starts: Vec<i32>,
    start_offset: i32,
    dictionary: Dictionary,
    encoder: Option<RunLenIntEncoder>,
    dictionary_encoding: bool,
}

impl StringWriter {
    pub fn new(options: &WriterOptions) -> Result<Self> {
        Self::with_padding(options, Self::decide_nulls_padding(options))
    }

    /// Run-length output is undefined over padded zero codes, so padding
    /// is forced off at `EL2`. Varchar and char keep the configured
    /// policy instead.
    fn decide_nulls_padding(options: &WriterOptions) -> bool {
        if options.encoding_level.ge(EncodingLevel::EL2) {
            return false;
        }
        options.nulls_padding
    }

    fn with_padding(options: &WriterOptions, nulls_padding: bool) -> Result<Self> {
        let runlength = options.encoding_level.ge(EncodingLevel::EL2);
        let dictionary_encoding = options.encoding_level.ge(EncodingLevel::EL1);
        Ok(Self {
            base: WriterBase::new(options, nulls_padding)?,
            codes: Vec::with_capacity(if dictionary_encoding {
                options.pixel_stride
            } else {
                0
            }),
            starts: Vec::new(),
            start_offset: 0,
            dictionary: Dictionary::new(),
            encoder: runlength.then(|| RunLenIntEncoder::new(false)),
            dictionary_encoding,
        })
    }

    fn value_with_limit<'a>(b: &'a BytesBatch, i: usize, max_length: Option<usize>) -> (&'a [u8], bool) {
        let v = b.value(i);
        match max_length {
            Some(max) if v.len() > max => (&v[..max], true),
            _ => (v, false),
        }
    }

    fn write_part_with_dict(
        &mut self,
        b: &BytesBatch,
        offset: usize,
        len: usize,
        max_length: Option<usize>,
        truncated: &mut u64,
    ) {
        for i in offset..offset + len {
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
                if self.base.nulls_padding {
                    self.codes.push(0);
                }
            } else {
                let (v, was_truncated) = Self::value_with_limit(b, i, max_length);
                if was_truncated {
                    *truncated += 1;
                }
                let code = self.dictionary.add(v);
                self.codes.push(code as i64);
                self.base.pixel_stats.update(v, 1);
            }
        }
        self.base.record_nulls(&b.nulls[offset..offset + len]);
    }

    fn write_part_direct(
        &mut self,
        b: &BytesBatch,
        offset: usize,
        len: usize,
        max_length: Option<usize>,
        truncated: &mut u64,
    ) {
        for i in offset..offset + len {
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
                if self.base.nulls_padding {
                    // a starts entry even for nulls keeps positions
                    // random-accessible
                    self.starts.push(self.start_offset);
                }
            } else {
                let (v, was_truncated) = Self::value_with_limit(b, i, max_length);
                if was_truncated {
                    *truncated += 1;
                }
                self.base.output.extend_from_slice(v);
                self.starts.push(self.start_offset);
                self.start_offset += v.len() as i32;
                self.base.pixel_stats.update(v, 1);
            }
        }
        self.base.record_nulls(&b.nulls[offset..offset + len]);
    }

    /// Core write path; `max_length` carries the varchar/char bound and
    /// `truncated` accumulates the clip count.
    fn write_bounded(
        &mut self,
        batch: &ColumnBatch,
        size: usize,
        max_length: Option<usize>,
        truncated: &mut u64,
    ) -> Result<usize> {
        let b = batch.as_bytes()?;
        check_size(b.len(), size)?;
        for part in pixel_parts(self.base.cur_pixel_is_null_index, self.base.pixel_stride, size) {
            if self.dictionary_encoding {
                self.write_part_with_dict(b, part.offset, part.len, max_length, truncated);
            } else {
                self.write_part_direct(b, part.offset, part.len, max_length, truncated);
            }
            if part.ends_pixel {
                self.finish_pixel();
            }
        }
        Ok(self.base.output.len())
    }

    fn finish_pixel(&mut self) {
        if let Some(encoder) = &mut self.encoder {
            // cascade run-length over the dictionary codes
            encoder.encode(&self.codes, &mut self.base.output);
            self.codes.clear();
        } else if self.dictionary_encoding {
            for &code in &self.codes {
                self.base.byte_order.put_i32(&mut self.base.output, code as i32);
            }
            self.codes.clear();
        }
        // direct mode wrote its payload immediately
        self.base.finish_pixel();
    }

    fn flush_starts(&mut self) {
        let starts_field_offset = self.base.output.len() as i32;
        self.starts.push(self.start_offset);
        for i in 0..self.starts.len() {
            self.base.byte_order.put_i32(&mut self.base.output, self.starts[i]);
        }
        self.starts.clear();
        self.base
            .byte_order
            .put_i32(&mut self.base.output, starts_field_offset);
    }

    fn flush_dictionary(&mut self) {
        let dict_content_offset = self.base.output.len() as i32;
        let size = self.dictionary.size();

        let mut starts: Vec<i64> = Vec::with_capacity(size + 1);
        let mut init_start = 0i64;
        for key in self.dictionary.iter() {
            self.base.output.extend_from_slice(key);
            starts.push(init_start);
            init_start += key.len() as i64;
        }

        let dict_starts_offset = self.base.output.len() as i32;
        starts.push((dict_starts_offset - dict_content_offset) as i64);

        if let Some(encoder) = &mut self.encoder {
            encoder.encode(&starts, &mut self.base.output);
        } else {
            for &start in &starts {
                self.base.byte_order.put_i32(&mut self.base.output, start as i32);
            }
        }

        self.base
            .byte_order
            .put_i32(&mut self.base.output, dict_content_offset);
        self.base
            .byte_order
            .put_i32(&mut self.base.output, dict_starts_offset);
    }

    fn flush_inner(&mut self) -> Result<()> {
        if self.base.cur_pixel_ele_index > 0 {
            self.finish_pixel();
        }
        self.base.seal_chunk();
        if self.dictionary_encoding {
            self.flush_dictionary();
        } else {
            self.flush_starts();
        }
        Ok(())
    }

    fn encoding(&self) -> ColumnEncoding {
        if self.dictionary_encoding {
            let cascade = self.encoder.as_ref().map(|_| ColumnEncoding::run_length());
            ColumnEncoding::dictionary(self.dictionary.size() as u32, cascade)
        } else {
            ColumnEncoding::none()
        }
    }

    fn reset_inner(&mut self) {
        self.base.reset();
        self.codes.clear();
        self.starts.clear();
        self.start_offset = 0;
        self.dictionary.clear();
        if let Some(encoder) = &mut self.encoder {
            encoder.clear();
        }
    }

    fn close_inner(&mut self) {
        self.codes = Vec::new();
        self.starts = Vec::new();
        self.dictionary.clear();
        if let Some(encoder) = &mut self.encoder {
            encoder.close();
        }
        self.base.close();
    }
}

impl ColumnWriter for StringWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let mut ignored = 0;
        self.write_bounded(batch, size, None, &mut ignored)
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_inner()
    }

    fn reset(&mut self) {
        self.reset_inner();
    }

    fn close(&mut self) {
        self.close_inner();
    }

    fn chunk_content(&self) -> &[u8] {
        &self.base.output
    }

    fn chunk_size(&self) -> usize {
        self.base.output.len()
    }

    fn chunk_index(&self) -> &ColumnChunkIndex {
        &self.base.index
    }

    fn chunk_stats_bytes(&self) -> Vec<u8> {
        self.base.chunk_stats.serialize()
    }

    fn chunk_encoding(&self) -> ColumnEncoding {
        self.encoding()
    }
}

/// Length-bounded string writer shared by varchar and char.
pub struct VarcharWriter {
    inner: StringWriter,
    max_length: usize,
    num_truncated: u64,
}

impl VarcharWriter {
    pub fn new(type_desc: &TypeDescriptor, options: &WriterOptions) -> Result<Self> {
        // bounded strings keep the configured padding policy even at EL2
        Ok(Self {
            inner: StringWriter::with_padding(options, options.nulls_padding)?,
            max_length: type_desc.max_length() as usize,
            num_truncated: 0,
        })
    }

    /// Values clipped to the length bound so far.
    pub fn num_truncated(&self) -> u64 {
        self.num_truncated
    }

    fn limit(&self) -> Option<usize> {
        (self.max_length > 0).then_some(self.max_length)
    }
}

impl ColumnWriter for VarcharWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let limit = self.limit();
        let mut truncated = 0;
        let pos = self.inner.write_bounded(batch, size, limit, &mut truncated)?;
        if truncated > 0 {
            self.num_truncated += truncated;
            tracing::debug!(truncated, max_length = self.max_length, "clipped oversized values");
        }
        Ok(pos)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush_inner()
    }

    fn reset(&mut self) {
        self.inner.reset_inner();
        self.num_truncated = 0;
    }

    fn close(&mut self) {
        self.inner.close_inner();
    }

    fn chunk_content(&self) -> &[u8] {
        &self.inner.base.output
    }

    fn chunk_size(&self) -> usize {
        self.inner.base.output.len()
    }

    fn chunk_index(&self) -> &ColumnChunkIndex {
        &self.inner.base.index
    }

    fn chunk_stats_bytes(&self) -> Vec<u8> {
        self.inner.base.chunk_stats.serialize()
    }

    fn chunk_encoding(&self) -> ColumnEncoding {
        self.inner.encoding()
    }
}
