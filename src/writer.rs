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

//! Write path: validation, storage analysis, Minimal/Compressed
//! dispatch, and file assembly.

use std::io::Write;

use bytes::{BufMut, BytesMut};
use snafu::{ensure, ResultExt};

use crate::array::Column;
use crate::encoding;
use crate::error::{InvalidEncodingSnafu, IoSnafu, Result};
use crate::schema::{analyze_storage, StorageType};
use crate::{FormatKind, FORMAT_VERSION, MAGIC};

/// Hard constant of format version 1: a table whose Minimal rendition
/// would reach this many bytes is written Compressed instead.
const FORMAT_SWITCH_THRESHOLD: u64 = 4096;

/// Fixed bytes before the column definitions: magic, version, format
/// type, column count, row count.
const FILE_PREAMBLE_SIZE: u64 = 12;

/// Per-column definition bytes besides the name itself.
const COLUMN_DEF_FIXED_SIZE: u64 = 5;

/// Serialise `columns` as a single HYBF file into `sink`.
///
/// The file is assembled in memory and committed with one write, so a
/// failure before the final write leaves the sink untouched; a failure
/// during it leaves the sink position undefined and the caller owns
/// truncation. Nothing is ever committed on a validation error.
pub fn write_table<W: Write>(columns: &[Column], sink: &mut W) -> Result<()> {
    let row_count = validate_columns(columns)?;
    let storages: Vec<StorageType> = columns
        .iter()
        .map(|column| analyze_storage(&column.array))
        .collect();
    let format = choose_format(columns, &storages);

    let mut buf = BytesMut::new();
    buf.put_slice(&MAGIC);
    buf.put_u8(FORMAT_VERSION);
    buf.put_u8(format.to_tag());
    buf.put_u16(columns.len() as u16);
    buf.put_u32(row_count);

    for (column, storage) in columns.iter().zip(&storages) {
        encoding::util::write_name(&mut buf, &column.name)?;
        buf.put_u8(column.array.logical_type().to_tag());
        buf.put_u8(storage.base.to_tag());
        buf.put_u8(storage.bit_width);
    }

    for (column, &storage) in columns.iter().zip(&storages) {
        match format {
            FormatKind::Minimal => {
                encoding::encode_column_raw(&column.array, storage, &mut buf)?;
            }
            FormatKind::Compressed => {
                let mut payload = BytesMut::new();
                let codec = encoding::encode_column_auto(&column.array, storage, &mut payload)?;
                ensure!(
                    payload.len() as u64 <= u64::from(u32::MAX),
                    InvalidEncodingSnafu {
                        msg: format!("column '{}' payload exceeds u32 framing", column.name),
                    }
                );
                buf.put_u8(codec.to_tag());
                buf.put_u32(payload.len() as u32);
                buf.extend_from_slice(&payload);
            }
        }
    }

    sink.write_all(&buf).context(IoSnafu)
}

fn validate_columns(columns: &[Column]) -> Result<u32> {
    ensure!(
        columns.len() <= usize::from(u16::MAX),
        InvalidEncodingSnafu {
            msg: format!("{} columns exceed u16 framing", columns.len()),
        }
    );
    let row_count = columns.first().map_or(0, |c| c.array.len());
    for column in columns {
        ensure!(
            column.array.len() == row_count,
            InvalidEncodingSnafu {
                msg: format!(
                    "column '{}' has {} rows, expected {row_count}",
                    column.name,
                    column.array.len()
                ),
            }
        );
    }
    ensure!(
        row_count as u64 <= u64::from(u32::MAX),
        InvalidEncodingSnafu {
            msg: format!("{row_count} rows exceed u32 framing"),
        }
    );
    Ok(row_count as u32)
}

/// Write-side dispatch: the estimate is the exact size of the would-be
/// Minimal file (Raw payloads plus header, row count, and definitions).
fn choose_format(columns: &[Column], storages: &[StorageType]) -> FormatKind {
    let mut estimate = FILE_PREAMBLE_SIZE;
    for (column, &storage) in columns.iter().zip(storages) {
        estimate += COLUMN_DEF_FIXED_SIZE + column.name.len() as u64;
        estimate += encoding::estimate_raw_size(&column.array, storage);
    }
    if estimate < FORMAT_SWITCH_THRESHOLD {
        FormatKind::Minimal
    } else {
        FormatKind::Compressed
    }
}
