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

//! Concurrent access across tiles: writers on disjoint tiles proceed in
//! parallel, and readers observe every delete whose call returned before
//! the read.

use std::sync::Arc;
use std::thread;

use tessera_visibility::bitmap::get_bit;
use tessera_visibility::{RowGroupVisibility, TILE_CAPACITY};

#[test]
fn test_parallel_deletes_across_tiles() {
    let tile_count = 8;
    let rg = Arc::new(RowGroupVisibility::new((tile_count * TILE_CAPACITY) as u64));
    rg.create_epoch(1);

    let mut handles = Vec::new();
    for tile in 0..tile_count {
        let rg = Arc::clone(&rg);
        handles.push(thread::spawn(move || {
            for local in 0..64u32 {
                let row = (tile * TILE_CAPACITY) as u32 + local * 2;
                rg.delete(row, 1).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let bitmap = rg.bitmap_at(1).unwrap();
    for tile in 0..tile_count {
        for local in 0..TILE_CAPACITY {
            let row = tile * TILE_CAPACITY + local;
            let expect = local % 2 == 0 && local < 128;
            assert_eq!(get_bit(&bitmap, row), expect, "row {row}");
        }
    }
}

#[test]
fn test_readers_interleaved_with_writers() {
    let rg = Arc::new(RowGroupVisibility::new(TILE_CAPACITY as u64));
    rg.create_epoch(1);

    let writer = {
        let rg = Arc::clone(&rg);
        thread::spawn(move || {
            for row in 0..TILE_CAPACITY as u32 {
                rg.delete(row, 1).unwrap();
            }
        })
    };

    // snapshots taken while the writer runs never regress: the count of
    // visible deletes only grows
    let reader = {
        let rg = Arc::clone(&rg);
        thread::spawn(move || {
            let mut last = 0u32;
            for _ in 0..200 {
                let bitmap = rg.bitmap_at(1).unwrap();
                let count: u32 = bitmap.iter().map(|w| w.count_ones()).sum();
                assert!(count >= last, "visible deletes regressed: {count} < {last}");
                last = count;
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    let bitmap = rg.bitmap_at(1).unwrap();
    assert!(bitmap.iter().all(|&w| w == u64::MAX));
}

#[test]
fn test_concurrent_double_delete_single_winner() {
    let rg = Arc::new(RowGroupVisibility::new(TILE_CAPACITY as u64));
    rg.create_epoch(1);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let rg = Arc::clone(&rg);
        handles.push(thread::spawn(move || {
            let mut wins = 0u32;
            for row in 0..TILE_CAPACITY as u32 {
                if rg.delete(row, 1).is_ok() {
                    wins += 1;
                }
            }
            wins
        }));
    }

    let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total as usize, TILE_CAPACITY, "each row deleted exactly once");
}
