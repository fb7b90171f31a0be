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

//! SingleValue codec (tag 2): one raw element followed by a `u32` row
//! count. The ordering (value then count) is fixed.

use std::io::Read;

use bytes::{BufMut, BytesMut};
use snafu::ensure;

use super::{util, DecodeElement, EncodeElement};
use crate::error::{InvalidEncodingSnafu, Result};
use crate::schema::StorageType;

pub(crate) fn encode<V: EncodeElement>(
    values: &[V],
    storage: StorageType,
    buf: &mut BytesMut,
) -> Result<()> {
    debug_assert!(!values.is_empty(), "SingleValue requires at least one row");
    values[0].write_raw(storage, buf)?;
    buf.put_u32(values.len() as u32);
    Ok(())
}

pub(crate) fn decode<V: DecodeElement + Clone>(
    reader: &mut impl Read,
    storage: StorageType,
    row_count: usize,
) -> Result<Vec<V>> {
    let value = V::read_raw(reader, storage)?;
    let count = util::read_u32(reader, "single-value row count")? as usize;
    ensure!(
        count == row_count,
        InvalidEncodingSnafu {
            msg: format!("single-value row count {count} does not match declared {row_count}"),
        }
    );
    Ok(vec![value; count])
}
