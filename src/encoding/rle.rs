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

//! RLE codec (tag 3): `u32` run count, then (value, `u32` run length)
//! records. The run sum must equal the declared row count.

use std::io::Read;

use bytes::{BufMut, BytesMut};
use snafu::ensure;

use super::{util, DecodeElement, EncodeElement};
use crate::error::{InvalidEncodingSnafu, Result};
use crate::schema::StorageType;

/// Runs of consecutive equal values as (start index, length) pairs.
/// Equality is key equality, so null floats run together.
pub(crate) fn run_spans<V: EncodeElement>(values: &[V]) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<(V::Key, usize, usize)> = None;
    for (i, value) in values.iter().enumerate() {
        let key = value.key();
        match &mut current {
            Some((run_key, _, length)) if *run_key == key => *length += 1,
            _ => {
                if let Some((_, start, length)) = current.take() {
                    spans.push((start, length));
                }
                current = Some((key, i, 1));
            }
        }
    }
    if let Some((_, start, length)) = current {
        spans.push((start, length));
    }
    spans
}

pub(crate) fn encode<V: EncodeElement>(
    values: &[V],
    storage: StorageType,
    buf: &mut BytesMut,
) -> Result<()> {
    let spans = run_spans(values);
    buf.put_u32(spans.len() as u32);
    for (start, length) in spans {
        values[start].write_raw(storage, buf)?;
        buf.put_u32(length as u32);
    }
    Ok(())
}

pub(crate) fn decode<V: DecodeElement + Clone>(
    reader: &mut impl Read,
    storage: StorageType,
    row_count: usize,
) -> Result<Vec<V>> {
    let run_count = util::read_u32(reader, "run count")? as usize;
    let mut out = Vec::with_capacity(row_count);
    for _ in 0..run_count {
        let value = V::read_raw(reader, storage)?;
        let length = util::read_u32(reader, "run length")? as usize;
        ensure!(
            out.len() + length <= row_count,
            InvalidEncodingSnafu {
                msg: format!(
                    "run lengths sum past declared row count {row_count}"
                ),
            }
        );
        out.extend(std::iter::repeat(value).take(length));
    }
    ensure!(
        out.len() == row_count,
        InvalidEncodingSnafu {
            msg: format!(
                "run lengths sum to {} but row count is {row_count}",
                out.len()
            ),
        }
    );
    Ok(out)
}
