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

//! Read path: header sniffing, column definitions, and per-column
//! decoding for both container formats.
//!
//! File layout, big-endian throughout:
//!
//! ```text
//! offset 0: magic        = "HYBF"
//! offset 4: version      = 0x01
//! offset 5: format_type  = 0x01 | 0x02
//! offset 6: column_count = u16
//! offset 8: row_count    = u32
//! then column_count definitions:
//!   name_length u8, name, logical_type u8, storage_base u8, storage_width u8
//! then the data section:
//!   Minimal:    Raw payloads, concatenated in column order
//!   Compressed: per column, codec_tag u8 + payload_length u32 + payload
//! ```

use std::io::{self, Read};

use snafu::{ensure, ResultExt};

use crate::array::ColumnArray;
use crate::encoding::{self, util, CodecKind};
use crate::error::{
    self, InvalidEncodingSnafu, InvalidMagicSnafu, Result, UnknownCodecSnafu,
    UnsupportedVersionSnafu,
};
use crate::schema::{ColumnType, LogicalType, StorageType};
use crate::{FormatKind, FORMAT_VERSION, MAGIC};

struct Header {
    format: FormatKind,
    column_count: usize,
}

/// Read and validate the 8-byte header without consuming further bytes.
pub fn sniff_format<R: Read>(source: &mut R) -> Result<FormatKind> {
    Ok(read_header(source)?.format)
}

/// Materialise a whole table: column definitions plus one array per
/// column, in file order. Never returns a partial table.
pub fn read_table<R: Read>(source: &mut R) -> Result<(Vec<ColumnType>, Vec<ColumnArray>)> {
    let header = read_header(source)?;
    let row_count = util::read_u32(source, "row count")? as usize;

    let columns = (0..header.column_count)
        .map(|_| read_column_type(source))
        .collect::<Result<Vec<_>>>()?;

    let mut arrays = Vec::with_capacity(columns.len());
    for column in &columns {
        let array = match header.format {
            FormatKind::Minimal => {
                encoding::decode_column(source, column, CodecKind::Raw, row_count)?
            }
            FormatKind::Compressed => read_compressed_column(source, column, row_count)?,
        };
        arrays.push(array);
    }
    Ok((columns, arrays))
}

fn read_header(source: &mut impl Read) -> Result<Header> {
    let mut magic = [0u8; 4];
    util::read_exact(source, &mut magic, "magic bytes")?;
    ensure!(magic == MAGIC, InvalidMagicSnafu { magic });

    let version = util::read_u8(source, "version")?;
    ensure!(
        version == FORMAT_VERSION,
        UnsupportedVersionSnafu { version }
    );

    let format_type = util::read_u8(source, "format type")?;
    let format = FormatKind::from_tag(format_type)
        .ok_or_else(|| error::UnknownFormatSnafu { format_type }.build())?;

    let column_count = util::read_u16(source, "column count")? as usize;
    Ok(Header {
        format,
        column_count,
    })
}

fn read_column_type(source: &mut impl Read) -> Result<ColumnType> {
    let name = util::read_name(source)?;
    let logical = LogicalType::from_tag(util::read_u8(source, "logical type")?)?;
    let base = LogicalType::from_tag(util::read_u8(source, "storage base")?)?;
    let bit_width = util::read_u8(source, "storage width")?;

    ensure!(
        base == logical,
        InvalidEncodingSnafu {
            msg: format!("column '{name}' storage base {base} does not match {logical}"),
        }
    );
    let width_ok = match logical {
        LogicalType::Int32 | LogicalType::Int64 => matches!(bit_width, 8 | 16 | 32 | 64),
        LogicalType::Float32 => bit_width == 32,
        LogicalType::Float64 => bit_width == 64,
        LogicalType::String | LogicalType::Boolean => bit_width == 8,
    };
    ensure!(
        width_ok,
        InvalidEncodingSnafu {
            msg: format!("column '{name}' has invalid storage width {bit_width} for {logical}"),
        }
    );

    Ok(ColumnType {
        name,
        logical,
        storage: StorageType::new(base, bit_width),
    })
}

fn read_compressed_column(
    source: &mut impl Read,
    column: &ColumnType,
    row_count: usize,
) -> Result<ColumnArray> {
    let tag = util::read_u8(source, "codec tag")?;
    let payload_length = util::read_u32(source, "payload length")? as usize;

    let Some(codec) = CodecKind::from_tag(tag) else {
        // Skip the declared payload so the source stays positioned at
        // the next column, then report.
        io::copy(
            &mut source.take(payload_length as u64),
            &mut io::sink(),
        )
        .context(error::IoSnafu)?;
        return UnknownCodecSnafu {
            tag,
            column: column.name.clone(),
        }
        .fail();
    };

    let mut payload = vec![0u8; payload_length];
    util::read_exact(source, &mut payload, "column payload")?;
    let mut cursor = io::Cursor::new(payload.as_slice());
    let array = encoding::decode_column(&mut cursor, column, codec, row_count)?;
    ensure!(
        cursor.position() as usize == payload_length,
        InvalidEncodingSnafu {
            msg: format!(
                "column '{}' payload has {} trailing bytes",
                column.name,
                payload_length - cursor.position() as usize
            ),
        }
    );
    Ok(array)
}
