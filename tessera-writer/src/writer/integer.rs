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

//! Integer columns (short/int/long share this writer).
//!
//! Values are staged as 64-bit regardless of the logical width. At `EL2`
//! the pixel runs through the integer run-length encoder; below that,
//! raw 4-byte (short/int) or 8-byte (long) words in the configured
//! endian.

use tessera_core::{EncodingLevel, Result, WriterOptions};
use tessera_encoding::RunLenIntEncoder;

use crate::batch::ColumnBatch;
use crate::index::{ColumnChunkIndex, ColumnEncoding};
use crate::stats::{IntegerStats, StatsRecorder};
use crate::writer::{check_size, pixel_parts, ColumnWriter, WriterBase};

pub struct IntegerWriter {
    base: WriterBase<IntegerStats>,
    staging: Vec<i64>,
    encoder: Option<RunLenIntEncoder>,
    is_long: bool,
}

impl IntegerWriter {
    pub fn new(options: &WriterOptions, is_long: bool) -> Result<Self> {
        let runlength = options.encoding_level.ge(EncodingLevel::EL2);
        Ok(Self {
            base: WriterBase::new(options, Self::decide_nulls_padding(options))?,
            staging: Vec::with_capacity(options.pixel_stride),
            encoder: runlength.then(|| RunLenIntEncoder::new(false)),
            is_long,
        })
    }

    fn decide_nulls_padding(options: &WriterOptions) -> bool {
        if options.encoding_level.ge(EncodingLevel::EL2) {
            return false;
        }
        options.nulls_padding
    }

    fn write_part(&mut self, values: &[i64], nulls: &[bool], offset: usize, len: usize) {
        for i in offset..offset + len {
            self.base.cur_pixel_ele_index += 1;
            if nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
                if self.base.nulls_padding {
                    self.staging.push(0);
                }
            } else {
                self.staging.push(values[i]);
                self.base.pixel_stats.update(values[i], 1);
            }
        }
        self.base.record_nulls(&nulls[offset..offset + len]);
    }

    fn finish_pixel(&mut self) {
        if let Some(encoder) = &mut self.encoder {
            encoder.encode(&self.staging, &mut self.base.output);
        } else if self.is_long {
            for &v in &self.staging {
                self.base.byte_order.put_i64(&mut self.base.output, v);
            }
        } else {
            for &v in &self.staging {
                self.base.byte_order.put_i32(&mut self.base.output, v as i32);
            }
        }
        self.staging.clear();
        self.base.finish_pixel();
    }
}

impl ColumnWriter for IntegerWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let b = batch.as_integer()?;
        check_size(b.len(), size)?;
        for part in pixel_parts(self.base.cur_pixel_is_null_index, self.base.pixel_stride, size) {
            self.write_part(&b.values, &b.nulls, part.offset, part.len);
            if part.ends_pixel {
                self.finish_pixel();
            }
        }
        Ok(self.base.output.len())
    }

    fn flush(&mut self) -> Result<()> {
        if self.base.cur_pixel_ele_index > 0 {
            self.finish_pixel();
        }
        self.base.seal_chunk();
        Ok(())
    }

    fn reset(&mut self) {
        self.base.reset();
        self.staging.clear();
        if let Some(encoder) = &mut self.encoder {
            encoder.clear();
        }
    }

    fn close(&mut self) {
        self.staging = Vec::new();
        if let Some(encoder) = &mut self.encoder {
            encoder.close();
        }
        self.base.close();
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
        if self.encoder.is_some() {
            ColumnEncoding::run_length()
        } else {
            ColumnEncoding::none()
        }
    }
}
