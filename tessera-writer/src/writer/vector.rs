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

//! Vector columns: fixed-dimension runs of doubles, each value written as
//! `dimension` big-endian words regardless of the chunk byte order.

use tessera_core::{Result, TesseraError, TypeDescriptor, WriterOptions};

use crate::batch::ColumnBatch;
use crate::index::{ColumnChunkIndex, ColumnEncoding};
use crate::stats::{StatsRecorder, VectorStats};
use crate::writer::{check_size, ColumnWriter, WriterBase};

pub struct VectorWriter {
    base: WriterBase<VectorStats>,
    dimension: usize,
}

impl VectorWriter {
    pub fn new(type_desc: &TypeDescriptor, options: &WriterOptions) -> Result<Self> {
        Ok(Self {
            base: WriterBase::new(options, options.nulls_padding)?,
            dimension: type_desc.dimension() as usize,
        })
    }
}

impl ColumnWriter for VectorWriter {
    fn write(&mut self, batch: &ColumnBatch, size: usize) -> Result<usize> {
        let b = batch.as_vector()?;
        check_size(b.len(), size)?;
        if b.dimension() != self.dimension {
            return Err(TesseraError::InvalidArgument(format!(
                "batch of dimension {} fed into a writer of dimension {}",
                b.dimension(),
                self.dimension
            )));
        }
        for i in 0..size {
            self.base.record_null(b.nulls[i]);
            self.base.cur_pixel_ele_index += 1;
            if b.nulls[i] {
                self.base.has_null = true;
                self.base.pixel_stats.increment_null(1);
            } else {
                for &component in b.value(i) {
                    self.base
                        .output
                        .extend_from_slice(&component.to_bits().to_be_bytes());
                }
                self.base.pixel_stats.update(1);
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
