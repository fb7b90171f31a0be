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

//! In-memory column representation handed to the writer and produced by
//! the reader.

use arrow::buffer::NullBuffer;

use crate::schema::LogicalType;

/// A single column's values, densely packed per type.
///
/// Nullability follows the format's rules: float NaN encodes null,
/// booleans and strings carry an optional validity bitmap (unset bit =
/// null), and integer columns are non-nullable. Callers with nullable
/// integer data are expected to widen to `Float64` or `Utf8` before
/// handing columns in.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnArray {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Boolean {
        values: Vec<bool>,
        nulls: Option<NullBuffer>,
    },
    Utf8 {
        values: Vec<String>,
        nulls: Option<NullBuffer>,
    },
}

impl ColumnArray {
    /// A non-nullable boolean column.
    pub fn boolean(values: Vec<bool>) -> Self {
        Self::Boolean {
            values,
            nulls: None,
        }
    }

    /// A boolean column with a validity mask; `false` marks a null row.
    pub fn boolean_with_nulls(values: Vec<bool>, validity: Vec<bool>) -> Self {
        Self::Boolean {
            values,
            nulls: Some(NullBuffer::from(validity)),
        }
    }

    /// A non-nullable string column.
    pub fn utf8(values: Vec<String>) -> Self {
        Self::Utf8 {
            values,
            nulls: None,
        }
    }

    /// A string column with a validity mask; `false` marks a null row.
    pub fn utf8_with_nulls(values: Vec<String>, validity: Vec<bool>) -> Self {
        Self::Utf8 {
            values,
            nulls: Some(NullBuffer::from(validity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int32(values) => values.len(),
            Self::Int64(values) => values.len(),
            Self::Float32(values) => values.len(),
            Self::Float64(values) => values.len(),
            Self::Boolean { values, .. } => values.len(),
            Self::Utf8 { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn logical_type(&self) -> LogicalType {
        match self {
            Self::Int32(_) => LogicalType::Int32,
            Self::Int64(_) => LogicalType::Int64,
            Self::Float32(_) => LogicalType::Float32,
            Self::Float64(_) => LogicalType::Float64,
            Self::Boolean { .. } => LogicalType::Boolean,
            Self::Utf8 { .. } => LogicalType::String,
        }
    }

    /// Number of null rows under the format's null rules.
    pub fn null_count(&self) -> usize {
        match self {
            Self::Int32(_) | Self::Int64(_) => 0,
            Self::Float32(values) => values.iter().filter(|v| v.is_nan()).count(),
            Self::Float64(values) => values.iter().filter(|v| v.is_nan()).count(),
            Self::Boolean { nulls, .. } | Self::Utf8 { nulls, .. } => {
                nulls.as_ref().map_or(0, NullBuffer::null_count)
            }
        }
    }
}

/// A named column, the unit `write_table` consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub array: ColumnArray,
}

impl Column {
    pub fn new(name: impl Into<String>, array: ColumnArray) -> Self {
        Self {
            name: name.into(),
            array,
        }
    }
}
