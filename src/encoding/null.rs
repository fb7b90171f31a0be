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

//! Null codec (tag 5): the payload is just a `u32` row count.

use std::io::Read;

use bytes::{BufMut, BytesMut};
use snafu::ensure;

use super::{util, DecodeElement};
use crate::error::{InvalidEncodingSnafu, Result};

pub(crate) fn encode(row_count: usize, buf: &mut BytesMut) -> Result<()> {
    buf.put_u32(row_count as u32);
    Ok(())
}

pub(crate) fn decode<V: DecodeElement + Clone>(
    reader: &mut impl Read,
    row_count: usize,
) -> Result<Vec<V>> {
    let count = util::read_u32(reader, "null row count")? as usize;
    ensure!(
        count == row_count,
        InvalidEncodingSnafu {
            msg: format!("null row count {count} does not match declared {row_count}"),
        }
    );
    let Some(null) = V::null() else {
        return InvalidEncodingSnafu {
            msg: "column type cannot represent nulls",
        }
        .fail();
    };
    Ok(vec![null; count])
}
