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

//! Float and double columns.
//!
//! No per-pixel staging: each non-null value goes straight to the output
//! as its raw IEEE bit pattern in the configured endian. A padded null
//! writes the zero bit pattern. Statistics record the decoded numeric
//! value.

use tessera_core::{Result, WriterOptions};

use crate::batch::ColumnBatch;
use crate::index::{ColumnChunkIndex, ColumnEncoding};
use crate::stats::{FloatStats, StatsRecorder};
use crate::writer::{check_size, ColumnWriter, WriterBase};

pub struct FloatWriter {
    base: WriterBase<FloatStats>,
}

impl FloatWriter {
    pub fn new(options: &WriterOptions) -> Result<Self> {
        Ok(Self {
            base: WriterBase::new(options, options.nulls_padding)?,
        })
    }
}

impl ColumnWriter for FloatWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let b = batch.as_float()?;
        check_size(b.len(), size)?;
        for i in 0..size {
            self.base.record_null(b.nulls[i]);
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
                if self.base.nulls_padding {
                    self.base.byte_order.put_u32(&mut self.base.output, 0);
                }
            } else {
                self.base.byte_order.put_f32(&mut self.base.output, b.values[i]);
                self.base.pixel_stats.update(b.values[i] as f64);
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

pub struct DoubleWriter {
    base: WriterBase<FloatStats>,
}

impl DoubleWriter {
    pub fn new(options: &WriterOptions) -> Result<Self> {
        Ok(Self {
            base: WriterBase::new(options, options.nulls_padding)?,
        })
    }
}

impl ColumnWriter for DoubleWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let b = batch.as_double()?;
        check_size(b.len(), size)?;
        for i in 0..size {
            self.base.record_null(b.nulls[i]);
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
                if self.base.nulls_padding {
                    self.base.byte_order.put_u64(&mut self.base.output, 0);
                }
            } else {
                self.base.byte_order.put_f64(&mut self.base.output, b.values[i]);
                self.base.pixel_stats.update(b.values[i]);
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
