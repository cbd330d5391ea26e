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

//! Insertion-ordered deduplication of byte keys.
//!
//! Every distinct key is assigned the dense code `size()` at the moment it
//! is first seen, so codes always form `0..size()`. Key bytes are stored
//! once in an append-only arena with a code-indexed span table; lookups go
//! through 41 hash shards whose buckets hold candidate codes. Flush-time
//! emission iterates the span table directly, which yields keys in code
//! order without consulting the shards.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};

use smallvec::SmallVec;
use tessera_core::{Result, TesseraError};

/// Shard count of the code lookup table.
const NUM_SHARDS: usize = 41;

#[derive(Debug, Clone, Copy)]
struct KeySpan {
    offset: u32,
    len: u32,
}

pub struct Dictionary {
    /// Concatenated key bytes in insertion order.
    arena: Vec<u8>,
    /// Code -> span into the arena.
    spans: Vec<KeySpan>,
    /// Hash -> candidate codes, sharded by hash modulus.
    shards: Vec<HashMap<u64, SmallVec<[u32; 1]>>>,
    hasher: RandomState,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            spans: Vec::new(),
            shards: (0..NUM_SHARDS).map(|_| HashMap::new()).collect(),
            hasher: RandomState::new(),
        }
    }

    fn hash_key(&self, key: &[u8]) -> u64 {
        let mut h = self.hasher.build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    fn span_bytes(&self, span: KeySpan) -> &[u8] {
        &self.arena[span.offset as usize..(span.offset + span.len) as usize]
    }

    /// Returns the code of `key`, assigning the next dense code on first
    /// insertion.
    pub fn add(&mut self, key: &[u8]) -> u32 {
        let hash = self.hash_key(key);
        let shard = (hash % NUM_SHARDS as u64) as usize;

        if let Some(candidates) = self.shards[shard].get(&hash) {
            for &code in candidates {
                if self.span_bytes(self.spans[code as usize]) == key {
                    return code;
                }
            }
        }

        let code = self.spans.len() as u32;
        let offset = self.arena.len() as u32;
        self.arena.extend_from_slice(key);
        self.spans.push(KeySpan {
            offset,
            len: key.len() as u32,
        });
        self.shards[shard].entry(hash).or_default().push(code);
        code
    }

    /// Number of distinct keys.
    pub fn size(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Key bytes behind `code`.
    pub fn key(&self, code: u32) -> Result<&[u8]> {
        let span = self
            .spans
            .get(code as usize)
            .copied()
            .ok_or_else(|| {
                TesseraError::CorruptDictionary(format!("no key at code position {code}"))
            })?;
        if (span.offset + span.len) as usize > self.arena.len() {
            return Err(TesseraError::CorruptDictionary(format!(
                "key span at code {code} exceeds the arena"
            )));
        }
        Ok(self.span_bytes(span))
    }

    /// Keys in code order (0, 1, 2, ...); the flush-time emission path.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.spans.iter().map(|&span| self.span_bytes(span))
    }

    /// Resets to empty, keeping shard allocations.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.spans.clear();
        for shard in &mut self.shards {
            shard.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_insertion_order_codes() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.add(b"a"), 0);
        assert_eq!(dict.add(b"b"), 1);
        assert_eq!(dict.add(b"a"), 0);
        assert_eq!(dict.add(b"a"), 0);
        assert_eq!(dict.add(b"c"), 2);
        assert_eq!(dict.add(b"b"), 1);
        assert_eq!(dict.size(), 3);

        let keys: Vec<&[u8]> = dict.iter().collect();
        assert_eq!(keys, vec![b"a".as_slice(), b"b", b"c"]);
    }

    #[test]
    fn test_code_density() {
        let mut dict = Dictionary::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut codes = Vec::new();
        for _ in 0..2000 {
            let key = format!("key_{}", rng.gen_range(0..300));
            codes.push(dict.add(key.as_bytes()));
        }
        // assigned codes are exactly {0, 1, ..., size - 1}
        let mut distinct: Vec<u32> = codes.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), dict.size());
        assert_eq!(distinct, (0..dict.size() as u32).collect::<Vec<_>>());
        // and re-adding returns the insertion rank
        for (code, key) in dict.iter().map(|k| k.to_vec()).enumerate().collect::<Vec<_>>() {
            assert_eq!(dict.add(&key), code as u32);
        }
    }

    #[test]
    fn test_empty_key_and_lookup() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.add(b""), 0);
        assert_eq!(dict.add(b""), 0);
        assert_eq!(dict.key(0).unwrap(), b"");
        assert!(dict.key(1).is_err());
    }

    #[test]
    fn test_clear() {
        let mut dict = Dictionary::new();
        dict.add(b"x");
        dict.add(b"y");
        dict.clear();
        assert_eq!(dict.size(), 0);
        assert_eq!(dict.add(b"y"), 0);
    }
}
