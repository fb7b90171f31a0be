// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Per-column codec selection from one pass of cheap statistics.
//!
//! Applicability:
//! - Null: every value is null.
//! - SingleValue: at least two rows, one distinct value (null state
//!   included in the identity).
//! - Dictionary: distinct/rows <= 0.10.
//! - RLE: mean run length >= 4.
//! - Raw: always.
//!
//! The smallest estimated payload wins; on equal estimates the earlier
//! codec in the order above wins. All estimates are exact byte counts,
//! never underestimates. The selector never mutates its input.

use std::collections::HashSet;

use super::{dictionary, CodecKind, EncodeElement};
use crate::schema::StorageType;

pub(crate) fn select<V: EncodeElement>(values: &[V], storage: StorageType) -> CodecKind {
    let row_count = values.len() as u64;

    let mut seen = HashSet::new();
    let mut null_count = 0u64;
    let mut run_count = 0u64;
    let mut raw_size = 0u64;
    let mut rle_size = 4u64; // run count field
    let mut dict_entries_size = 0u64;
    let mut prev_key: Option<V::Key> = None;
    for value in values {
        let key = value.key();
        let size = value.byte_size(storage);
        if value.is_null() {
            null_count += 1;
        }
        raw_size += size;
        if seen.insert(key.clone()) {
            dict_entries_size += size;
        }
        if prev_key.as_ref() != Some(&key) {
            run_count += 1;
            rle_size += size + 4;
            prev_key = Some(key);
        }
    }
    let distinct = seen.len() as u64;

    let dict_width = dictionary::code_width(seen.len()) as u64;
    let dict_size = 4 + dict_entries_size + 1 + (row_count * dict_width).div_ceil(8);
    let single_size = values
        .first()
        .map_or(0, |v| v.byte_size(storage) + 4);

    // Scanned in reverse preference order with `<=`, so on ties the
    // earliest of Null, SingleValue, Dictionary, RLE, Raw survives.
    let candidates = [
        (CodecKind::Rle, run_count * 4 <= row_count, rle_size),
        (
            CodecKind::Dictionary,
            row_count > 0 && distinct * 10 <= row_count,
            dict_size,
        ),
        (
            CodecKind::SingleValue,
            row_count >= 2 && distinct == 1,
            single_size,
        ),
        (
            CodecKind::Null,
            row_count > 0 && null_count == row_count,
            4,
        ),
    ];
    let mut best = (CodecKind::Raw, raw_size);
    for (kind, applicable, estimate) in candidates {
        if applicable && estimate <= best.1 {
            best = (kind, estimate);
        }
    }
    best.0
}
