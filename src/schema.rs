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

//! The logical/storage type model and write-time storage analysis.

use std::fmt::Display;

use crate::array::ColumnArray;
use crate::error::{Result, UnknownLogicalTypeSnafu};

/// User-visible element type of a column. Closed set with stable 1-byte
/// tags; extending the set is reserved for a future version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Int32 = 1,
    Int64 = 2,
    Float32 = 3,
    Float64 = 4,
    String = 5,
    Boolean = 6,
}

impl LogicalType {
    pub fn to_tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::Int32),
            2 => Ok(Self::Int64),
            3 => Ok(Self::Float32),
            4 => Ok(Self::Float64),
            5 => Ok(Self::String),
            6 => Ok(Self::Boolean),
            _ => UnknownLogicalTypeSnafu { tag }.fail(),
        }
    }
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::Float32 => "FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
        };
        write!(f, "{name}")
    }
}

/// How a column is physically laid out: the base type plus the number of
/// bits per value used by the raw encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageType {
    pub base: LogicalType,
    pub bit_width: u8,
}

impl StorageType {
    pub fn new(base: LogicalType, bit_width: u8) -> Self {
        Self { base, bit_width }
    }

    /// Bytes per fixed-width value. Strings are variable length; their
    /// 8-bit storage describes the byte-oriented payload, not a stride.
    pub(crate) fn byte_width(&self) -> u64 {
        u64::from(self.bit_width) / 8
    }
}

/// On-disk descriptor of a column: name, logical type, storage type.
///
/// Produced by analysis at write time, recorded verbatim in the file and
/// reconstructed on read; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub name: String,
    pub logical: LogicalType,
    pub storage: StorageType,
}

/// Determine the storage layout for a column's values.
///
/// Integer columns store two's complement at the narrowest width from
/// {8, 16, 32, 64} whose signed range covers the observed min/max; the
/// decoder sign-extends, so the width alone fully describes the stream.
/// All other types store at their natural width (booleans as one
/// tri-state byte per value, strings as length-prefixed bytes).
pub fn analyze_storage(array: &ColumnArray) -> StorageType {
    match array {
        ColumnArray::Int32(values) => {
            let (min, max) = min_max(values.iter().map(|&v| i64::from(v)));
            StorageType::new(LogicalType::Int32, integer_bit_width(min, max))
        }
        ColumnArray::Int64(values) => {
            let (min, max) = min_max(values.iter().copied());
            StorageType::new(LogicalType::Int64, integer_bit_width(min, max))
        }
        ColumnArray::Float32(_) => StorageType::new(LogicalType::Float32, 32),
        ColumnArray::Float64(_) => StorageType::new(LogicalType::Float64, 64),
        ColumnArray::Utf8 { .. } => StorageType::new(LogicalType::String, 8),
        ColumnArray::Boolean { .. } => StorageType::new(LogicalType::Boolean, 8),
    }
}

/// An empty column has no range to narrow; it analyses to width 8.
fn min_max(values: impl Iterator<Item = i64>) -> (i64, i64) {
    values.fold((0, 0), |(min, max), v| (min.min(v), max.max(v)))
}

fn integer_bit_width(min: i64, max: i64) -> u8 {
    for width in [8u8, 16, 32] {
        let lo = -(1i64 << (width - 1));
        let hi = (1i64 << (width - 1)) - 1;
        if min >= lo && max <= hi {
            return width;
        }
    }
    64
}
