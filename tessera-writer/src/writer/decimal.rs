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

//! Decimal columns.
//!
//! Short decimals (precision <= 18) are one 64-bit two's-complement word
//! per value; long decimals are two words. Both write immediately, still
//! honoring pixel boundaries through the element counter. Long-decimal
//! word order follows the chunk endian: high word first in big-endian,
//! low word first in little-endian.

use tessera_core::{ByteOrder, Result, WriterOptions};

use crate::batch::ColumnBatch;
use crate::index::{ColumnChunkIndex, ColumnEncoding};
use crate::stats::{Int128Stats, IntegerStats, StatsRecorder};
use crate::writer::{check_size, ColumnWriter, WriterBase};

pub struct DecimalWriter {
    base: WriterBase<IntegerStats>,
}

impl DecimalWriter {
    pub fn new(options: &WriterOptions) -> Result<Self> {
        Ok(Self {
            base: WriterBase::new(options, options.nulls_padding)?,
        })
    }
}

impl ColumnWriter for DecimalWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let b = batch.as_decimal()?;
        check_size(b.len(), size)?;
        for i in 0..size {
            self.base.record_null(b.nulls[i]);
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
                if self.base.nulls_padding {
                    self.base.byte_order.put_i64(&mut self.base.output, 0);
                }
            } else {
                self.base.byte_order.put_i64(&mut self.base.output, b.values[i]);
                self.base.pixel_stats.update(b.values[i], 1);
            }
            if self.base.cur_pixel_ele_index >= self.base.pixel_stride {
                self.base.finish_pixel();
            }
        }
        Ok(self.base.output.len())
    }

    fn flush(&mut self) -> Result<()> {
        if self.base.cur_pixel_ele_index > 0 {
            self.base.finish_pixel();
        }
        self.base.seal_chunk();
        Ok(())
    }

    fn reset(&mut self) {
        self.base.reset();
    }

    fn close(&mut self) {
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
        ColumnEncoding::none()
    }
}

pub struct LongDecimalWriter {
    base: WriterBase<Int128Stats>,
}

impl LongDecimalWriter {
    pub fn new(options: &WriterOptions) -> Result<Self> {
        Ok(Self {
            base: WriterBase::new(options, options.nulls_padding)?,
        })
    }

    fn put_words(&mut self, high: i64, low: u64) {
        match self.base.byte_order {
            ByteOrder::Big => {
                self.base.byte_order.put_i64(&mut self.base.output, high);
                self.base.byte_order.put_u64(&mut self.base.output, low);
            }
            ByteOrder::Little => {
                self.base.byte_order.put_u64(&mut self.base.output, low);
                self.base.byte_order.put_i64(&mut self.base.output, high);
            }
        }
    }
}

impl ColumnWriter for LongDecimalWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let b = batch.as_long_decimal()?;
        check_size(b.len(), size)?;
        for i in 0..size {
            self.base.record_null(b.nulls[i]);
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
                if self.base.nulls_padding {
                    self.put_words(0, 0);
                }
            } else {
                let v = b.values[i];
                self.put_words(v.high(), v.low());
                self.base.pixel_stats.update(v, 1);
            }
            if self.base.cur_pixel_ele_index >= self.base.pixel_stride {
                self.base.finish_pixel();
            }
        }
        Ok(self.base.output.len())
    }

    fn flush(&mut self) -> Result<()> {
        if self.base.cur_pixel_ele_index > 0 {
            self.base.finish_pixel();
        }
        self.base.seal_chunk();
        Ok(())
    }

    fn reset(&mut self) {
        self.base.reset();
    }

    fn close(&mut self) {
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
        ColumnEncoding::none()
    }
}
