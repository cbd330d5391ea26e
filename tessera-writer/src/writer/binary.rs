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

//! Binary and varbinary columns: length-prefixed byte sequences written
//! immediately, truncated to the declared maximum length.

use tessera_core::{Result, TypeDescriptor, WriterOptions};

use crate::batch::ColumnBatch;
use crate::index::{ColumnChunkIndex, ColumnEncoding};
use crate::stats::{BytesStats, StatsRecorder};
use crate::writer::{check_size, ColumnWriter, WriterBase};

pub struct BinaryWriter {
    base: WriterBase<BytesStats>,
    max_length: usize,
    num_truncated: u64,
}

impl BinaryWriter {
    pub fn new(type_desc: &TypeDescriptor, options: &WriterOptions) -> Result<Self> {
        Ok(Self {
            base: WriterBase::new(options, options.nulls_padding)?,
            max_length: type_desc.max_length() as usize,
            num_truncated: 0,
        })
    }

    pub fn num_truncated(&self) -> u64 {
        self.num_truncated
    }
}

impl ColumnWriter for BinaryWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let b = batch.as_bytes()?;
        check_size(b.len(), size)?;
        for i in 0..size {
            self.base.record_null(b.nulls[i]);
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
            } else {
                let v = b.value(i);
                let clipped = if self.max_length > 0 && v.len() > self.max_length {
                    self.num_truncated += 1;
                    &v[..self.max_length]
                } else {
                    v
                };
                self.base
                    .byte_order
                    .put_i32(&mut self.base.output, clipped.len() as i32);
                self.base.output.extend_from_slice(clipped);
                self.base.pixel_stats.update(clipped, 1);
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
        self.num_truncated = 0;
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
