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

//! HYBF (Hybrid Binary Format): a self-describing, column-oriented
//! binary container for tabular data.
//!
//! One writer and one reader span two regimes. Tables whose raw
//! rendition stays under a fixed threshold are written in the Minimal
//! container, where metadata overhead is the enemy and every column is
//! stored raw at its reduced bit width. Larger tables use the
//! Compressed container, where each column independently picks the
//! cheapest of five codecs (raw, single-value, run-length, dictionary,
//! null) from one pass of statistics.
//!
//! ```
//! use hybf_rust::{read_table, write_table, Column, ColumnArray};
//!
//! let columns = vec![
//!     Column::new("id", ColumnArray::Int32(vec![1, 2, 3])),
//!     Column::new("name", ColumnArray::utf8(vec!["x".into(), "y".into(), "z".into()])),
//! ];
//! let mut file = Vec::new();
//! write_table(&columns, &mut file).unwrap();
//!
//! let (defs, arrays) = read_table(&mut std::io::Cursor::new(file)).unwrap();
//! assert_eq!(defs[1].name, "name");
//! assert_eq!(arrays[0], columns[0].array);
//! ```

pub mod array;
mod encoding;
pub mod error;
mod reader;
pub mod schema;
mod writer;

pub use array::{Column, ColumnArray};
pub use error::{HybfError, Result};
pub use reader::{read_table, sniff_format};
pub use schema::{analyze_storage, ColumnType, LogicalType, StorageType};
pub use writer::write_table;

pub(crate) const MAGIC: [u8; 4] = *b"HYBF";
pub(crate) const FORMAT_VERSION: u8 = 1;

/// Which container layout a file uses; returned by [`sniff_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Minimal,
    Compressed,
}

impl FormatKind {
    pub(crate) fn to_tag(self) -> u8 {
        match self {
            Self::Minimal => 1,
            Self::Compressed => 2,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Minimal),
            2 => Some(Self::Compressed),
            _ => None,
        }
    }
}
