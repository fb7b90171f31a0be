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

//! Encoding/decoding logic for column payloads.
//!
//! The public seam is monomorphic over [`ColumnArray`]; internally the
//! codecs are generic over a pair of element traits so one
//! implementation of each codec serves every logical type.

use std::hash::Hash;
use std::io::Read;

use arrow::buffer::NullBuffer;
use bytes::BytesMut;

use crate::array::ColumnArray;
use crate::error::{InvalidEncodingSnafu, Result};
use crate::schema::{ColumnType, LogicalType, StorageType};

pub(crate) mod dictionary;
pub(crate) mod null;
pub(crate) mod raw;
pub(crate) mod rle;
pub(crate) mod selector;
pub(crate) mod single_value;
pub(crate) mod util;

/// Payload shape of an encoded column, with its stable tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodecKind {
    Raw = 1,
    SingleValue = 2,
    Rle = 3,
    Dictionary = 4,
    Null = 5,
}

impl CodecKind {
    pub(crate) fn to_tag(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Raw),
            2 => Some(Self::SingleValue),
            3 => Some(Self::Rle),
            4 => Some(Self::Dictionary),
            5 => Some(Self::Null),
            _ => None,
        }
    }
}

/// A single logical value on the encode side.
///
/// `Key` is the identity used for run detection and dictionary lookup:
/// all nulls of a type share one key, and float NaNs are canonicalised
/// so every null float compares equal.
pub(crate) trait EncodeElement {
    type Key: Hash + Eq + Clone;

    fn key(&self) -> Self::Key;
    fn is_null(&self) -> bool;
    /// Exact serialized size of this element in Raw form.
    fn byte_size(&self, storage: StorageType) -> u64;
    fn write_raw(&self, storage: StorageType, buf: &mut BytesMut) -> Result<()>;
}

/// A single logical value on the decode side.
pub(crate) trait DecodeElement: Sized {
    fn read_raw(reader: &mut impl Read, storage: StorageType) -> Result<Self>;
    /// The null value, or `None` for types that cannot represent null.
    fn null() -> Option<Self>;
}

/// Generically represent f32 and f64 for the float codec paths.
pub(crate) trait Float: num::Float + std::fmt::Debug + num::traits::ToBytes {
    /// Named OBytes to not conflict with Bytes from [`num::traits::ToBytes`].
    type OBytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn from_be_bytes(bytes: Self::OBytes) -> Self;
}

impl Float for f32 {
    type OBytes = [u8; 4];

    #[inline]
    fn from_be_bytes(bytes: Self::OBytes) -> Self {
        Self::from_be_bytes(bytes)
    }
}

impl Float for f64 {
    type OBytes = [u8; 8];

    #[inline]
    fn from_be_bytes(bytes: Self::OBytes) -> Self {
        Self::from_be_bytes(bytes)
    }
}

/// NaN carries the null meaning, so all NaNs are written with the one
/// canonical bit pattern to keep output deterministic.
fn write_float<T: Float>(value: T, buf: &mut BytesMut) {
    let value = if value.is_nan() { T::nan() } else { value };
    buf.extend_from_slice(value.to_be_bytes().as_ref());
}

fn read_float<T: Float>(reader: &mut impl Read) -> Result<T> {
    let mut bytes = T::OBytes::default();
    util::read_exact(reader, bytes.as_mut(), "float value")?;
    Ok(T::from_be_bytes(bytes))
}

/// Both INT32 and INT64 columns move through the codecs as `i64`; INT32
/// narrows with a checked conversion when the array is rebuilt.
impl EncodeElement for i64 {
    type Key = i64;

    fn key(&self) -> i64 {
        *self
    }

    fn is_null(&self) -> bool {
        false
    }

    fn byte_size(&self, storage: StorageType) -> u64 {
        storage.byte_width()
    }

    fn write_raw(&self, storage: StorageType, buf: &mut BytesMut) -> Result<()> {
        util::write_bitpacked(buf, storage.bit_width as usize, &[*self as u64]);
        Ok(())
    }
}

impl DecodeElement for i64 {
    fn read_raw(reader: &mut impl Read, storage: StorageType) -> Result<Self> {
        let width = storage.bit_width as usize;
        let raw = util::read_bitpacked(reader, width, 1)?;
        Ok(util::sign_extend(raw[0], width))
    }

    fn null() -> Option<Self> {
        None
    }
}

impl EncodeElement for f32 {
    type Key = u32;

    fn key(&self) -> u32 {
        if self.is_nan() {
            f32::NAN.to_bits()
        } else {
            self.to_bits()
        }
    }

    fn is_null(&self) -> bool {
        self.is_nan()
    }

    fn byte_size(&self, _storage: StorageType) -> u64 {
        4
    }

    fn write_raw(&self, _storage: StorageType, buf: &mut BytesMut) -> Result<()> {
        write_float(*self, buf);
        Ok(())
    }
}

impl DecodeElement for f32 {
    fn read_raw(reader: &mut impl Read, _storage: StorageType) -> Result<Self> {
        read_float(reader)
    }

    fn null() -> Option<Self> {
        Some(f32::NAN)
    }
}

impl EncodeElement for f64 {
    type Key = u64;

    fn key(&self) -> u64 {
        if self.is_nan() {
            f64::NAN.to_bits()
        } else {
            self.to_bits()
        }
    }

    fn is_null(&self) -> bool {
        self.is_nan()
    }

    fn byte_size(&self, _storage: StorageType) -> u64 {
        8
    }

    fn write_raw(&self, _storage: StorageType, buf: &mut BytesMut) -> Result<()> {
        write_float(*self, buf);
        Ok(())
    }
}

impl DecodeElement for f64 {
    fn read_raw(reader: &mut impl Read, _storage: StorageType) -> Result<Self> {
        read_float(reader)
    }

    fn null() -> Option<Self> {
        Some(f64::NAN)
    }
}

const BOOLEAN_FALSE: u8 = 0;
const BOOLEAN_TRUE: u8 = 1;
const BOOLEAN_NULL: u8 = 2;

impl EncodeElement for Option<bool> {
    type Key = Option<bool>;

    fn key(&self) -> Option<bool> {
        *self
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn byte_size(&self, _storage: StorageType) -> u64 {
        1
    }

    fn write_raw(&self, _storage: StorageType, buf: &mut BytesMut) -> Result<()> {
        let byte = match self {
            Some(false) => BOOLEAN_FALSE,
            Some(true) => BOOLEAN_TRUE,
            None => BOOLEAN_NULL,
        };
        buf.extend_from_slice(&[byte]);
        Ok(())
    }
}

impl DecodeElement for Option<bool> {
    fn read_raw(reader: &mut impl Read, _storage: StorageType) -> Result<Self> {
        match util::read_u8(reader, "boolean value")? {
            BOOLEAN_FALSE => Ok(Some(false)),
            BOOLEAN_TRUE => Ok(Some(true)),
            BOOLEAN_NULL => Ok(None),
            other => InvalidEncodingSnafu {
                msg: format!("invalid boolean byte {other}"),
            }
            .fail(),
        }
    }

    fn null() -> Option<Self> {
        Some(None)
    }
}

/// `u16` length prefix; this sentinel length marks a null row.
const STRING_NULL_LENGTH: u16 = 0xFFFF;
const STRING_MAX_LENGTH: usize = 0xFFFE;

impl<'a> EncodeElement for Option<&'a str> {
    type Key = Option<&'a str>;

    fn key(&self) -> Option<&'a str> {
        *self
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn byte_size(&self, _storage: StorageType) -> u64 {
        match self {
            Some(s) => 2 + s.len() as u64,
            None => 2,
        }
    }

    fn write_raw(&self, _storage: StorageType, buf: &mut BytesMut) -> Result<()> {
        use bytes::BufMut;
        match self {
            Some(s) => {
                snafu::ensure!(
                    s.len() <= STRING_MAX_LENGTH,
                    InvalidEncodingSnafu {
                        msg: format!(
                            "string of {} bytes exceeds the maximum of {}",
                            s.len(),
                            STRING_MAX_LENGTH
                        ),
                    }
                );
                buf.put_u16(s.len() as u16);
                buf.put_slice(s.as_bytes());
            }
            None => buf.put_u16(STRING_NULL_LENGTH),
        }
        Ok(())
    }
}

impl DecodeElement for Option<String> {
    fn read_raw(reader: &mut impl Read, _storage: StorageType) -> Result<Self> {
        let length = util::read_u16(reader, "string length")?;
        if length == STRING_NULL_LENGTH {
            return Ok(None);
        }
        let mut bytes = vec![0u8; length as usize];
        util::read_exact(reader, &mut bytes, "string value")?;
        let value = String::from_utf8(bytes).map_err(|e| {
            InvalidEncodingSnafu {
                msg: format!("string value is not valid UTF-8: {e}"),
            }
            .build()
        })?;
        Ok(Some(value))
    }

    fn null() -> Option<Self> {
        Some(None)
    }
}

/// Exact Raw payload size of a column, used by the format dispatcher.
pub(crate) fn estimate_raw_size(array: &ColumnArray, storage: StorageType) -> u64 {
    match array {
        ColumnArray::Int32(values) => values.len() as u64 * storage.byte_width(),
        ColumnArray::Int64(values) => values.len() as u64 * storage.byte_width(),
        ColumnArray::Float32(values) => values.len() as u64 * 4,
        ColumnArray::Float64(values) => values.len() as u64 * 8,
        ColumnArray::Boolean { values, .. } => values.len() as u64,
        ColumnArray::Utf8 { values, nulls } => values
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if is_null_at(nulls, i) {
                    2
                } else {
                    2 + s.len() as u64
                }
            })
            .sum(),
    }
}

/// Encode a column with the Raw codec (the Minimal container's only
/// encoding).
pub(crate) fn encode_column_raw(
    array: &ColumnArray,
    storage: StorageType,
    buf: &mut BytesMut,
) -> Result<()> {
    match array {
        ColumnArray::Int32(values) => {
            let values: Vec<i64> = values.iter().map(|&v| i64::from(v)).collect();
            raw::encode_ints(&values, storage, buf)
        }
        ColumnArray::Int64(values) => raw::encode_ints(values, storage, buf),
        ColumnArray::Float32(values) => raw::encode(values, storage, buf),
        ColumnArray::Float64(values) => raw::encode(values, storage, buf),
        ColumnArray::Boolean { values, nulls } => {
            raw::encode(&boolean_elements(values, nulls), storage, buf)
        }
        ColumnArray::Utf8 { values, nulls } => {
            raw::encode(&utf8_elements(values, nulls), storage, buf)
        }
    }
}

/// Select the best codec for a column and encode its payload, returning
/// the choice so the container can record the tag.
pub(crate) fn encode_column_auto(
    array: &ColumnArray,
    storage: StorageType,
    buf: &mut BytesMut,
) -> Result<CodecKind> {
    match array {
        ColumnArray::Int32(values) => {
            let values: Vec<i64> = values.iter().map(|&v| i64::from(v)).collect();
            encode_elements_auto(&values, storage, buf)
        }
        ColumnArray::Int64(values) => encode_elements_auto(values, storage, buf),
        ColumnArray::Float32(values) => encode_elements_auto(values, storage, buf),
        ColumnArray::Float64(values) => encode_elements_auto(values, storage, buf),
        ColumnArray::Boolean { values, nulls } => {
            encode_elements_auto(&boolean_elements(values, nulls), storage, buf)
        }
        ColumnArray::Utf8 { values, nulls } => {
            encode_elements_auto(&utf8_elements(values, nulls), storage, buf)
        }
    }
}

fn encode_elements_auto<V: EncodeElement>(
    values: &[V],
    storage: StorageType,
    buf: &mut BytesMut,
) -> Result<CodecKind> {
    let codec = selector::select(values, storage);
    match codec {
        CodecKind::Raw => raw::encode(values, storage, buf)?,
        CodecKind::SingleValue => single_value::encode(values, storage, buf)?,
        CodecKind::Rle => rle::encode(values, storage, buf)?,
        CodecKind::Dictionary => dictionary::encode(values, storage, buf)?,
        CodecKind::Null => null::encode(values.len(), buf)?,
    }
    Ok(codec)
}

/// Decode one column payload into a materialised array.
pub(crate) fn decode_column(
    reader: &mut impl Read,
    column: &ColumnType,
    codec: CodecKind,
    row_count: usize,
) -> Result<ColumnArray> {
    let storage = column.storage;
    match column.logical {
        LogicalType::Int32 => {
            let values = decode_int_elements(reader, storage, codec, row_count)?;
            let values = values
                .into_iter()
                .map(|v| {
                    i32::try_from(v).map_err(|_| {
                        InvalidEncodingSnafu {
                            msg: format!("value {v} does not fit INT32"),
                        }
                        .build()
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ColumnArray::Int32(values))
        }
        LogicalType::Int64 => {
            let values = decode_int_elements(reader, storage, codec, row_count)?;
            Ok(ColumnArray::Int64(values))
        }
        LogicalType::Float32 => Ok(ColumnArray::Float32(decode_elements(
            reader, storage, codec, row_count,
        )?)),
        LogicalType::Float64 => Ok(ColumnArray::Float64(decode_elements(
            reader, storage, codec, row_count,
        )?)),
        LogicalType::Boolean => Ok(build_boolean(decode_elements(
            reader, storage, codec, row_count,
        )?)),
        LogicalType::String => Ok(build_utf8(decode_elements(
            reader, storage, codec, row_count,
        )?)),
    }
}

fn decode_int_elements(
    reader: &mut impl Read,
    storage: StorageType,
    codec: CodecKind,
    row_count: usize,
) -> Result<Vec<i64>> {
    match codec {
        // The whole stream is one packed run of fixed-width values.
        CodecKind::Raw => raw::decode_ints(reader, storage, row_count),
        _ => decode_elements::<i64>(reader, storage, codec, row_count),
    }
}

fn decode_elements<V: DecodeElement + Clone>(
    reader: &mut impl Read,
    storage: StorageType,
    codec: CodecKind,
    row_count: usize,
) -> Result<Vec<V>> {
    match codec {
        CodecKind::Raw => raw::decode(reader, storage, row_count),
        CodecKind::SingleValue => single_value::decode(reader, storage, row_count),
        CodecKind::Rle => rle::decode(reader, storage, row_count),
        CodecKind::Dictionary => dictionary::decode(reader, storage, row_count),
        CodecKind::Null => null::decode(reader, row_count),
    }
}

fn is_null_at(nulls: &Option<NullBuffer>, index: usize) -> bool {
    nulls.as_ref().is_some_and(|n| n.is_null(index))
}

fn boolean_elements(values: &[bool], nulls: &Option<NullBuffer>) -> Vec<Option<bool>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| if is_null_at(nulls, i) { None } else { Some(v) })
        .collect()
}

fn utf8_elements<'a>(values: &'a [String], nulls: &Option<NullBuffer>) -> Vec<Option<&'a str>> {
    values
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if is_null_at(nulls, i) {
                None
            } else {
                Some(s.as_str())
            }
        })
        .collect()
}

fn build_boolean(elements: Vec<Option<bool>>) -> ColumnArray {
    let mut values = Vec::with_capacity(elements.len());
    let mut validity = Vec::with_capacity(elements.len());
    let mut has_nulls = false;
    for element in elements {
        match element {
            Some(v) => {
                values.push(v);
                validity.push(true);
            }
            None => {
                values.push(false);
                validity.push(false);
                has_nulls = true;
            }
        }
    }
    ColumnArray::Boolean {
        values,
        nulls: has_nulls.then(|| NullBuffer::from(validity)),
    }
}

fn build_utf8(elements: Vec<Option<String>>) -> ColumnArray {
    let mut values = Vec::with_capacity(elements.len());
    let mut validity = Vec::with_capacity(elements.len());
    let mut has_nulls = false;
    for element in elements {
        match element {
            Some(v) => {
                values.push(v);
                validity.push(true);
            }
            None => {
                values.push(String::new());
                validity.push(false);
                has_nulls = true;
            }
        }
    }
    ColumnArray::Utf8 {
        values,
        nulls: has_nulls.then(|| NullBuffer::from(validity)),
    }
}
