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

use std::io::Cursor;

use pretty_assertions::assert_eq;

use hybf_rust::{
    read_table, sniff_format, write_table, Column, ColumnArray, FormatKind, HybfError,
    LogicalType,
};

fn write_to_vec(columns: &[Column]) -> Vec<u8> {
    let mut out = Vec::new();
    write_table(columns, &mut out).unwrap();
    out
}

fn roundtrip(columns: &[Column]) -> Vec<ColumnArray> {
    let bytes = write_to_vec(columns);
    let (defs, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(defs.len(), columns.len());
    for (def, column) in defs.iter().zip(columns) {
        assert_eq!(def.name, column.name);
        assert_eq!(def.logical, column.array.logical_type());
    }
    arrays
}

/// Equality with NaN treated as equal to NaN (null positions).
fn assert_float64_eq(actual: &ColumnArray, expected: &[f64]) {
    let ColumnArray::Float64(values) = actual else {
        panic!("expected a Float64 column, got {actual:?}");
    };
    assert_eq!(values.len(), expected.len());
    for (a, e) in values.iter().zip(expected) {
        assert!(
            (a.is_nan() && e.is_nan()) || a == e,
            "mismatch: {a} vs {e}"
        );
    }
}

#[test]
fn tiny_table_exact_bytes() {
    let columns = vec![
        Column::new("a", ColumnArray::Int32(vec![1, 2, 3])),
        Column::new(
            "b",
            ColumnArray::utf8(vec!["x".into(), "y".into(), "z".into()]),
        ),
    ];
    let bytes = write_to_vec(&columns);

    #[rustfmt::skip]
    let expected = vec![
        0x48, 0x59, 0x42, 0x46, // "HYBF"
        0x01,                   // version
        0x01,                   // Minimal
        0x00, 0x02,             // two columns
        0x00, 0x00, 0x00, 0x03, // three rows
        0x01, 0x61, 0x01, 0x01, 0x08, // "a": INT32 in 8-bit storage
        0x01, 0x62, 0x05, 0x05, 0x08, // "b": STRING
        0x01, 0x02, 0x03,       // column "a" raw payload
        0x00, 0x01, 0x78,       // "x"
        0x00, 0x01, 0x79,       // "y"
        0x00, 0x01, 0x7A,       // "z"
    ];
    assert_eq!(bytes, expected);

    let arrays = roundtrip(&columns);
    assert_eq!(arrays[0], columns[0].array);
    assert_eq!(arrays[1], columns[1].array);
}

#[test]
fn all_null_column_uses_null_codec() {
    let columns = vec![Column::new("n", ColumnArray::Float64(vec![f64::NAN; 1000]))];
    let bytes = write_to_vec(&columns);

    assert_eq!(bytes[5], 2, "1000 doubles must be Compressed");
    // Data section starts after header (8), row count (4), and the
    // single definition (5 + 1): codec tag, payload length 4, count 1000.
    let column_start = 18;
    assert_eq!(
        &bytes[column_start..],
        &[0x05, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x03, 0xE8]
    );

    let (_, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_float64_eq(&arrays[0], &vec![f64::NAN; 1000]);
}

#[test]
fn constant_column_roundtrip() {
    let columns = vec![Column::new("k", ColumnArray::Int32(vec![7; 5]))];
    let arrays = roundtrip(&columns);
    assert_eq!(arrays[0], ColumnArray::Int32(vec![7; 5]));
}

#[test]
fn constant_column_uses_single_value_codec() {
    // Large enough to land in the Compressed container.
    let columns = vec![Column::new("k", ColumnArray::Int64(vec![70_000; 2000]))];
    let bytes = write_to_vec(&columns);
    assert_eq!(bytes[5], 2);
    let column_start = 18;
    assert_eq!(bytes[column_start], 2, "expected the SingleValue tag");

    let (_, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(arrays[0], columns[0].array);
}

#[test]
fn low_cardinality_strings_use_dictionary_codec() {
    let pool = ["A", "B", "C"];
    let values: Vec<String> = (0..5000).map(|i| pool[i % 3].to_owned()).collect();
    let columns = vec![Column::new("cat", ColumnArray::utf8(values.clone()))];
    let bytes = write_to_vec(&columns);

    assert_eq!(bytes[5], 2);
    // Data section offset: 12 + (5 + 3)-byte definition.
    let column_start = 20;
    assert_eq!(bytes[column_start], 4, "expected the Dictionary tag");
    // Payload: dict_size 3, entries "A" "B" "C", then a 2-bit code width.
    let payload = &bytes[column_start + 5..];
    assert_eq!(&payload[..4], &[0, 0, 0, 3]);
    assert_eq!(payload[4 + 9], 2, "three entries need 2-bit codes");

    let (_, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(arrays[0], ColumnArray::utf8(values));
}

#[test]
fn long_runs_use_rle_codec() {
    let mut values = vec![1i32; 2000];
    values.extend(vec![2i32; 2000]);
    values.extend(vec![3i32; 2000]);
    let columns = vec![Column::new("r", ColumnArray::Int32(values.clone()))];
    let bytes = write_to_vec(&columns);

    assert_eq!(bytes[5], 2);
    let column_start = 18;
    assert_eq!(bytes[column_start], 3, "expected the RLE tag");

    let (_, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(arrays[0], ColumnArray::Int32(values));
}

#[test]
fn format_switch_boundary() {
    // One f64 column: the file is 18 + 8n bytes raw, so 509 rows is the
    // largest Minimal table and 510 the smallest Compressed one.
    let below = vec![Column::new("v", ColumnArray::Float64(vec![0.25; 509]))];
    let bytes = write_to_vec(&below);
    assert_eq!(bytes[5], 1);
    let (_, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(arrays[0], below[0].array);

    let above = vec![Column::new("v", ColumnArray::Float64(vec![0.25; 510]))];
    let bytes = write_to_vec(&above);
    assert_eq!(bytes[5], 2);
    let (_, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(arrays[0], above[0].array);
}

#[test]
fn format_choice_is_monotone_in_columns() {
    let wide = vec![
        Column::new("a", ColumnArray::Int64(vec![1; 100])),
        Column::new("b", ColumnArray::Float64(vec![0.5; 100])),
    ];
    let narrow = vec![wide[0].clone()];
    assert_eq!(sniff_format(&mut Cursor::new(write_to_vec(&wide))).unwrap(), FormatKind::Minimal);
    assert_eq!(
        sniff_format(&mut Cursor::new(write_to_vec(&narrow))).unwrap(),
        FormatKind::Minimal
    );
}

#[test]
fn roundtrip_every_type_minimal() {
    let columns = vec![
        Column::new("i32", ColumnArray::Int32(vec![i32::MIN, -1, 0, i32::MAX])),
        Column::new("i64", ColumnArray::Int64(vec![i64::MIN, -1, 0, i64::MAX])),
        Column::new("f32", ColumnArray::Float32(vec![-0.5, 0.0, 1.5, f32::MAX])),
        Column::new("f64", ColumnArray::Float64(vec![-0.5, 0.0, 1.5, f64::MAX])),
        Column::new(
            "s",
            ColumnArray::utf8(vec!["".into(), "a".into(), "héllo".into(), "zz".into()]),
        ),
        Column::new(
            "flag",
            ColumnArray::boolean(vec![true, false, true, false]),
        ),
    ];
    let bytes = write_to_vec(&columns);
    assert_eq!(bytes[5], 1);
    let (_, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    for (array, column) in arrays.iter().zip(&columns) {
        assert_eq!(array, &column.array);
    }
}

#[test]
fn roundtrip_nullable_columns() {
    // Null slots carry the type's default so derived equality holds
    // after the round-trip.
    let columns = vec![
        Column::new(
            "s",
            ColumnArray::utf8_with_nulls(
                vec!["a".into(), String::new(), "c".into()],
                vec![true, false, true],
            ),
        ),
        Column::new(
            "flag",
            ColumnArray::boolean_with_nulls(
                vec![true, false, false],
                vec![true, true, false],
            ),
        ),
    ];
    let arrays = roundtrip(&columns);
    assert_eq!(arrays[0], columns[0].array);
    assert_eq!(arrays[1], columns[1].array);

    let nan = f64::NAN;
    let floats = vec![1.0, nan, 3.0, nan];
    let columns = vec![Column::new("f", ColumnArray::Float64(floats.clone()))];
    let arrays = roundtrip(&columns);
    assert_float64_eq(&arrays[0], &floats);
}

#[test]
fn roundtrip_mixed_codecs_compressed() {
    let n = 3000;
    let pool = ["red", "green", "blue"];
    let columns = vec![
        Column::new("id", ColumnArray::Int32((0..n as i32).collect())),
        Column::new("constant", ColumnArray::Int64(vec![42; n])),
        Column::new(
            "color",
            ColumnArray::utf8((0..n).map(|i| pool[i % 3].to_owned()).collect()),
        ),
        Column::new(
            "runs",
            ColumnArray::Int32((0..n as i32).map(|i| i / 500).collect()),
        ),
        Column::new("nulls", ColumnArray::Float32(vec![f32::NAN; n])),
        Column::new("flag", ColumnArray::boolean((0..n).map(|i| i % 2 == 0).collect())),
    ];
    let bytes = write_to_vec(&columns);
    assert_eq!(bytes[5], 2);

    let (defs, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(defs[0].logical, LogicalType::Int32);
    assert_eq!(arrays[0], columns[0].array);
    assert_eq!(arrays[1], columns[1].array);
    assert_eq!(arrays[2], columns[2].array);
    assert_eq!(arrays[3], columns[3].array);
    let ColumnArray::Float32(nulls) = &arrays[4] else {
        panic!("expected Float32");
    };
    assert!(nulls.iter().all(|v| v.is_nan()));
    assert_eq!(arrays[5], columns[5].array);
}

#[test]
fn empty_table_roundtrip() {
    let bytes = write_to_vec(&[]);
    assert_eq!(&bytes[..8], b"HYBF\x01\x01\x00\x00");
    let (defs, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert!(defs.is_empty());
    assert!(arrays.is_empty());
}

#[test]
fn zero_row_columns_roundtrip() {
    let columns = vec![
        Column::new("a", ColumnArray::Int32(vec![])),
        Column::new("b", ColumnArray::utf8(vec![])),
    ];
    let arrays = roundtrip(&columns);
    assert_eq!(arrays[0], columns[0].array);
    assert_eq!(arrays[1], columns[1].array);
}

#[test]
fn sniff_does_not_consume_past_header() {
    let columns = vec![Column::new("a", ColumnArray::Int32(vec![1, 2, 3]))];
    let bytes = write_to_vec(&columns);

    let mut source = Cursor::new(&bytes);
    assert_eq!(sniff_format(&mut source).unwrap(), FormatKind::Minimal);
    assert_eq!(source.position(), 8);

    source.set_position(0);
    let (_, arrays) = read_table(&mut source).unwrap();
    assert_eq!(arrays[0], columns[0].array);
}

#[test]
fn truncated_file_reports_truncation() {
    let columns = vec![Column::new("a", ColumnArray::Int64(vec![1, 2, 3, 4]))];
    let bytes = write_to_vec(&columns);

    for cut in [3, 9, 14, bytes.len() - 1] {
        let err = read_table(&mut Cursor::new(&bytes[..cut])).unwrap_err();
        assert!(
            matches!(err, HybfError::Truncated { .. }),
            "cut at {cut} gave {err}"
        );
    }
}

#[test]
fn integer_width_reduction_is_visible_on_disk() {
    // 4 rows in 16-bit storage: 12 + 6 + 8 payload bytes.
    let columns = vec![Column::new("w", ColumnArray::Int64(vec![-300, 300, 0, 1]))];
    let bytes = write_to_vec(&columns);
    assert_eq!(bytes[16], 16, "storage width byte");
    assert_eq!(bytes.len(), 18 + 4 * 2);

    let (defs, arrays) = read_table(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(defs[0].storage.bit_width, 16);
    assert_eq!(arrays[0], columns[0].array);
}
