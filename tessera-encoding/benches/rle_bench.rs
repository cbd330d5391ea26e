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

//! Run-length encoder throughput.
//!
//! Run with: cargo bench -p tessera-encoding --bench rle_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tessera_encoding::{RunLenByteEncoder, RunLenIntEncoder};

fn bench_rle_byte(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let runs: Vec<u8> = (0..64 * 1024).map(|i| ((i / 97) % 7) as u8).collect();
    let noise: Vec<u8> = (0..64 * 1024).map(|_| rng.gen()).collect();

    let mut group = c.benchmark_group("rle_byte");
    group.throughput(Throughput::Bytes(runs.len() as u64));
    group.bench_function("runs", |b| {
        let mut enc = RunLenByteEncoder::new();
        b.iter(|| {
            let mut out = Vec::new();
            enc.encode(black_box(&runs), &mut out);
            out
        })
    });
    group.bench_function("noise", |b| {
        let mut enc = RunLenByteEncoder::new();
        b.iter(|| {
            let mut out = Vec::new();
            enc.encode(black_box(&noise), &mut out);
            out
        })
    });
    group.finish();
}

fn bench_rle_int(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let ramps: Vec<i64> = (0..16 * 1024).map(|i| (i / 200) * 1000 + i % 200).collect();
    let noise: Vec<i64> = (0..16 * 1024).map(|_| rng.gen()).collect();

    let mut group = c.benchmark_group("rle_int");
    group.throughput(Throughput::Elements(ramps.len() as u64));
    group.bench_function("ramps", |b| {
        let mut enc = RunLenIntEncoder::new(true);
        b.iter(|| {
            let mut out = Vec::new();
            enc.encode(black_box(&ramps), &mut out);
            out
        })
    });
    group.bench_function("noise", |b| {
        let mut enc = RunLenIntEncoder::new(true);
        b.iter(|| {
            let mut out = Vec::new();
            enc.encode(black_box(&noise), &mut out);
            out
        })
    });
    group.finish();
}

criterion_group!(benches, bench_rle_byte, bench_rle_int);
criterion_main!(benches);
