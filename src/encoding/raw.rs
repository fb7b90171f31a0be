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

//! Raw codec (tag 1): values in declared storage width, row-major.
//!
//! Integers are stored at their reduced bit width through the shared
//! packing primitive, floats as big-endian IEEE-754, booleans as one
//! tri-state byte per value, strings as `u16` length + UTF-8 bytes with
//! `0xFFFF` marking null.

use std::io::Read;

use bytes::BytesMut;

use super::{util, DecodeElement, EncodeElement};
use crate::error::Result;
use crate::schema::StorageType;

pub(crate) fn encode<V: EncodeElement>(
    values: &[V],
    storage: StorageType,
    buf: &mut BytesMut,
) -> Result<()> {
    for value in values {
        value.write_raw(storage, buf)?;
    }
    Ok(())
}

pub(crate) fn decode<V: DecodeElement>(
    reader: &mut impl Read,
    storage: StorageType,
    row_count: usize,
) -> Result<Vec<V>> {
    let mut out = Vec::with_capacity(row_count);
    for _ in 0..row_count {
        out.push(V::read_raw(reader, storage)?);
    }
    Ok(out)
}

/// Bulk path for integer columns: the whole payload is one contiguous
/// packed stream.
pub(crate) fn encode_ints(values: &[i64], storage: StorageType, buf: &mut BytesMut) -> Result<()> {
    let packed: Vec<u64> = values.iter().map(|&v| v as u64).collect();
    util::write_bitpacked(buf, storage.bit_width as usize, &packed);
    Ok(())
}

pub(crate) fn decode_ints(
    reader: &mut impl Read,
    storage: StorageType,
    row_count: usize,
) -> Result<Vec<i64>> {
    let width = storage.bit_width as usize;
    let packed = util::read_bitpacked(reader, width, row_count)?;
    Ok(packed
        .into_iter()
        .map(|v| util::sign_extend(v, width))
        .collect())
}
