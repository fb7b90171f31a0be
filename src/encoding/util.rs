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

//! Byte-level primitives: big-endian field reads, name framing, and the
//! bit-packing routines shared by raw integer storage and dictionary
//! code streams.

use std::io::{self, Read};

use bytes::{BufMut, BytesMut};
use snafu::{ensure, ResultExt};

use crate::error::{self, InvalidEncodingSnafu, NameTooLongSnafu, Result};

/// Fill `buf` from the reader, mapping a clean EOF to `Truncated`.
pub(crate) fn read_exact(
    reader: &mut impl Read,
    buf: &mut [u8],
    reading: &'static str,
) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            error::TruncatedSnafu { reading }.fail()
        }
        Err(e) => Err(e).context(error::IoSnafu),
    }
}

pub(crate) fn read_u8(reader: &mut impl Read, reading: &'static str) -> Result<u8> {
    let mut byte = [0u8; 1];
    read_exact(reader, &mut byte, reading)?;
    Ok(byte[0])
}

pub(crate) fn read_u16(reader: &mut impl Read, reading: &'static str) -> Result<u16> {
    let mut bytes = [0u8; 2];
    read_exact(reader, &mut bytes, reading)?;
    Ok(u16::from_be_bytes(bytes))
}

pub(crate) fn read_u32(reader: &mut impl Read, reading: &'static str) -> Result<u32> {
    let mut bytes = [0u8; 4];
    read_exact(reader, &mut bytes, reading)?;
    Ok(u32::from_be_bytes(bytes))
}

/// Write a column name as `u8` length + UTF-8 bytes. Names are 1..=255
/// bytes.
pub(crate) fn write_name(buf: &mut BytesMut, name: &str) -> Result<()> {
    ensure!(
        !name.is_empty(),
        InvalidEncodingSnafu {
            msg: "column name must not be empty"
        }
    );
    ensure!(name.len() <= 255, NameTooLongSnafu { length: name.len() });
    buf.put_u8(name.len() as u8);
    buf.put_slice(name.as_bytes());
    Ok(())
}

pub(crate) fn read_name(reader: &mut impl Read) -> Result<String> {
    let length = read_u8(reader, "column name length")?;
    ensure!(
        length > 0,
        InvalidEncodingSnafu {
            msg: "column name must not be empty"
        }
    );
    let mut bytes = vec![0u8; length as usize];
    read_exact(reader, &mut bytes, "column name")?;
    String::from_utf8(bytes).map_err(|e| {
        InvalidEncodingSnafu {
            msg: format!("column name is not valid UTF-8: {e}"),
        }
        .build()
    })
}

/// Reinterpret the low `bit_width` bits of `value` as a two's complement
/// signed integer.
pub(crate) fn sign_extend(value: u64, bit_width: usize) -> i64 {
    debug_assert!((1..=64).contains(&bit_width), "bit_width must be in [1, 64]");
    let shift = 64 - bit_width;
    ((value << shift) as i64) >> shift
}

fn low_bits_mask(bits: usize) -> u8 {
    debug_assert!(bits <= 8);
    ((1u16 << bits) - 1) as u8
}

/// Pack `values` at `bit_width` bits each, MSB-first within each byte,
/// with no padding between values and a zero-padded final byte. Values
/// wider than `bit_width` are truncated to their low bits, which for
/// signed integers is exactly two's complement truncation.
///
/// For widths that are a multiple of 8 the output degenerates to
/// big-endian fixed-width integers.
pub(crate) fn write_bitpacked(buf: &mut BytesMut, bit_width: usize, values: &[u64]) {
    debug_assert!((1..=64).contains(&bit_width), "bit_width must be in [1, 64]");
    let value_mask = if bit_width == 64 {
        u64::MAX
    } else {
        (1u64 << bit_width) - 1
    };

    let mut bits_left = 8;
    let mut current_byte = 0u8;
    for &value in values {
        let value = value & value_mask;
        let mut bits_to_write = bit_width;
        // Drain whole bytes while the value still has more bits than the
        // current byte has room for.
        while bits_to_write > bits_left {
            let shift = bits_to_write - bits_left;
            current_byte |= (value >> shift) as u8 & low_bits_mask(bits_left);
            bits_to_write -= bits_left;
            buf.put_u8(current_byte);
            current_byte = 0;
            bits_left = 8;
        }

        bits_left -= bits_to_write;
        current_byte |= ((value << bits_left) & 0xFF) as u8;
        if bits_left == 0 {
            buf.put_u8(current_byte);
            current_byte = 0;
            bits_left = 8;
        }
    }
    if bits_left != 8 {
        buf.put_u8(current_byte);
    }
}

/// Inverse of [`write_bitpacked`]: read `count` values of `bit_width`
/// bits each. Fails with `Truncated` if the stream ends mid-record.
pub(crate) fn read_bitpacked(
    reader: &mut impl Read,
    bit_width: usize,
    count: usize,
) -> Result<Vec<u64>> {
    debug_assert!((1..=64).contains(&bit_width), "bit_width must be in [1, 64]");
    let mut out = Vec::with_capacity(count);
    let mut bits_left = 0;
    let mut current_byte = 0u8;
    for _ in 0..count {
        let mut result = 0u64;
        let mut bits_to_read = bit_width;
        while bits_to_read > bits_left {
            result <<= bits_left;
            result |= u64::from(current_byte & low_bits_mask(bits_left));
            bits_to_read -= bits_left;
            current_byte = read_u8(reader, "bit-packed values")?;
            bits_left = 8;
        }
        if bits_to_read > 0 {
            result <<= bits_to_read;
            bits_left -= bits_to_read;
            result |= u64::from((current_byte >> bits_left) & low_bits_mask(bits_to_read));
        }
        out.push(result);
    }
    Ok(out)
}
