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

use std::io;

use snafu::prelude::*;
use snafu::Location;

/// Errors surfaced at the `write_table`/`read_table` boundary.
///
/// No error is recovered internally; readers never return partial tables
/// and writers never claim success after a failure.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HybfError {
    #[snafu(display("I/O failure, source: {}", source))]
    IoError {
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid magic bytes: {:02x?}", magic))]
    InvalidMagic {
        magic: [u8; 4],
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Unsupported format version: {}", version))]
    UnsupportedVersion {
        version: u8,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Unknown format type: {}", format_type))]
    UnknownFormat {
        format_type: u8,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Unknown logical type tag: {}", tag))]
    UnknownLogicalType {
        tag: u8,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Unknown codec tag {} for column '{}'", tag, column))]
    UnknownCodec {
        tag: u8,
        column: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Source truncated while reading {}", reading))]
    Truncated {
        reading: &'static str,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid encoding: {}", msg))]
    InvalidEncoding {
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Column name is {} bytes, maximum is 255", length))]
    NameTooLong {
        length: usize,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Unsupported type: {}", msg))]
    UnsupportedType {
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type Result<T, E = HybfError> = std::result::Result<T, E>;
