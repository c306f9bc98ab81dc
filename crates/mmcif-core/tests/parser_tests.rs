// Dweve mmCIF - Macromolecular Crystallographic Information File toolkit
//
// Copyright (c) 2026 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end parser tests over realistic mmCIF fragments.

use mmcif_core::{parse_file, parse_str, parse_str_with_options, CifErrorKind, ParseOptions};
use std::io::Write;

const TWO_LOOPS: &str = "data_T\n\
loop_\n\
_entity.id\n\
_entity.type\n\
1 polymer\n\
loop_\n\
_struct_asym.id\n\
_struct_asym.entity_id\n\
A 1\n";

// =============================================================================
// Grammar coverage
// =============================================================================

#[test]
fn parses_simple_items_and_loops() {
    let doc = parse_str(TWO_LOOPS).unwrap();
    let block = doc.get("T").unwrap();

    let entity = block.get("entity").unwrap();
    assert_eq!(entity.values("id").unwrap(), ["1"]);
    assert_eq!(entity.values("type").unwrap(), ["polymer"]);

    let asym = block.get("struct_asym").unwrap();
    assert_eq!(asym.values("id").unwrap(), ["A"]);
    assert_eq!(asym.values("entity_id").unwrap(), ["1"]);
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let source = "# header comment\n\
                  data_X\n\
                  #\n\
                  \n\
                  _entry.id X\n\
                  # trailing\n";
    let doc = parse_str(source).unwrap();
    assert_eq!(
        doc.get("X").unwrap().get("entry").unwrap().values("id").unwrap(),
        ["X"]
    );
}

#[test]
fn quoted_values_keep_embedded_whitespace() {
    let source = "data_X\n_entity.pdbx_description 'Test protein'\n_s.d \"double quoted\"\n";
    let doc = parse_str(source).unwrap();
    let block = doc.get("X").unwrap();
    assert_eq!(
        block.get("entity").unwrap().values("pdbx_description").unwrap(),
        ["Test protein"]
    );
    assert_eq!(block.get("s").unwrap().values("d").unwrap(), ["double quoted"]);
}

#[test]
fn multiline_value_joins_continuation_lines() {
    let source = "data_X\n_struct.details ;\nfirst\nsecond\n;\n_entry.id X\n";
    let doc = parse_str(source).unwrap();
    let block = doc.get("X").unwrap();
    assert_eq!(
        block.get("struct").unwrap().values("details").unwrap(),
        ["first\nsecond"]
    );
    // Parsing resumes cleanly after the terminator.
    assert_eq!(block.get("entry").unwrap().values("id").unwrap(), ["X"]);
}

#[test]
fn loop_rows_may_span_lines() {
    let source = "data_X\nloop_\n_a.x\n_a.y\n_a.z\n1\n2 3\n4 5 6\n";
    let doc = parse_str(source).unwrap();
    let a = doc.get("X").unwrap().get("a").unwrap();
    assert_eq!(a.values("x").unwrap(), ["1", "4"]);
    assert_eq!(a.values("y").unwrap(), ["2", "5"]);
    assert_eq!(a.values("z").unwrap(), ["3", "6"]);
}

#[test]
fn second_data_block_closes_the_first() {
    let source = "data_A\n_entry.id A\ndata_B\n_entry.id B\n";
    let doc = parse_str(source).unwrap();
    assert_eq!(doc.block_names(), vec!["A", "B"]);
    assert_eq!(doc.get("B").unwrap().get("entry").unwrap().values("id").unwrap(), ["B"]);
}

#[test]
fn duplicate_block_name_overwrites() {
    let source = "data_A\n_entry.id first\ndata_A\n_cell.length_a 10\n";
    let doc = parse_str(source).unwrap();
    let block = doc.get("A").unwrap();
    assert!(block.category("entry").is_none());
    assert_eq!(block.get("cell").unwrap().values("length_a").unwrap(), ["10"]);
}

#[test]
fn simple_item_after_loop_rows() {
    let source = "data_X\nloop_\n_e.id\n1\n2\n_cell.length_a 11.2\n";
    let doc = parse_str(source).unwrap();
    let block = doc.get("X").unwrap();
    assert_eq!(block.get("e").unwrap().values("id").unwrap(), ["1", "2"]);
    assert_eq!(block.get("cell").unwrap().values("length_a").unwrap(), ["11.2"]);
}

// =============================================================================
// Lenient error recovery
// =============================================================================

#[test]
fn bare_item_line_without_value_is_skipped() {
    // A `_incomplete` line outside a loop, with no value: the parse
    // completes and no item named `incomplete` exists anywhere.
    let source = "data_X\n_incomplete\n_entry.id X\n";
    let doc = parse_str(source).unwrap();
    let block = doc.get("X").unwrap();
    assert_eq!(block.get("entry").unwrap().values("id").unwrap(), ["X"]);
    for category in block.iter() {
        assert!(category.item("incomplete").is_none());
        assert_ne!(category.name(), "incomplete");
    }
}

#[test]
fn bare_category_item_outside_loop_is_skipped() {
    let source = "data_X\n_orphan.item\n_entry.id X\n";
    let doc = parse_str(source).unwrap();
    assert!(doc.get("X").unwrap().category("orphan").is_none());
}

#[test]
fn cross_category_loop_tag_is_skipped() {
    let source = "data_X\nloop_\n_a.x\n_b.y\n_a.z\n1 2\n";
    let doc = parse_str(source).unwrap();
    let block = doc.get("X").unwrap();
    // The stray `_b.y` tag is dropped; the loop keeps category `a` with its
    // two declared columns.
    assert!(block.category("b").is_none());
    let a = block.get("a").unwrap();
    assert_eq!(a.values("x").unwrap(), ["1"]);
    assert_eq!(a.values("z").unwrap(), ["2"]);
}

#[test]
fn partial_trailing_row_is_discarded() {
    let source = "data_X\nloop_\n_a.x\n_a.y\n1 2\n3\n";
    let doc = parse_str(source).unwrap();
    let a = doc.get("X").unwrap().get("a").unwrap();
    // The leftover `3` never commits; both items keep one row.
    assert_eq!(a.values("x").unwrap(), ["1"]);
    assert_eq!(a.values("y").unwrap(), ["2"]);
    assert_eq!(a.row_count(), 1);
}

#[test]
fn unterminated_multiline_is_discarded() {
    let source = "data_X\n_entry.id X\n_struct.details ;\ndangling text\n";
    let doc = parse_str(source).unwrap();
    let block = doc.get("X").unwrap();
    assert_eq!(block.get("entry").unwrap().values("id").unwrap(), ["X"]);
    // The struct category exists but the unterminated value was never stored.
    assert_eq!(block.get("struct").unwrap().row_count(), 0);
}

#[test]
fn invalid_utf8_input_is_a_syntax_error() {
    let err = mmcif_core::parse_bytes(vec![0x64, 0x61, 0xff, 0x0a]).unwrap_err();
    assert_eq!(err.kind, CifErrorKind::Syntax);
}

// =============================================================================
// Row-count invariant and span decoding
// =============================================================================

#[test]
fn all_items_of_a_category_share_one_length() {
    let source = "data_T\nloop_\n_atom.id\n_atom.x\n_atom.y\n1 0.1 0.2\n2 0.3 0.4\n3 0.5 0.6\n";
    let doc = parse_str(source).unwrap();
    for block in doc.iter() {
        for category in block.iter() {
            assert!(category.rows_consistent(), "category {}", category.name());
        }
    }
}

#[test]
fn recorded_spans_decode_to_the_original_token() {
    let source = "data_T\nloop_\n_entity.id\n_entity.type\n1 polymer\n7 water\n";
    let doc = parse_str(source).unwrap();
    let source_buf = doc.source().unwrap().clone();
    let entity = doc.get("T").unwrap().get("entity").unwrap();

    let item = entity.get_item("type").unwrap();
    let expected = ["polymer", "water"];
    for (i, want) in expected.iter().enumerate() {
        let span = item.span(i).expect("loop token should be span-backed");
        assert_eq!(source_buf.decode(span), *want);
        assert_eq!(item.get(i), Some(*want));
    }
}

#[test]
fn indexed_and_bulk_decode_agree() {
    let doc = parse_str(TWO_LOOPS).unwrap();
    for block in doc.iter() {
        for category in block.iter() {
            for item in category.items() {
                let indexed: Vec<&str> =
                    (0..item.len()).map(|i| item.get(i).unwrap()).collect();
                let bulk: Vec<&str> = item.values().iter().map(String::as_str).collect();
                assert_eq!(indexed, bulk, "item {}", item.name());
            }
        }
    }
}

// =============================================================================
// Category allow-list
// =============================================================================

#[test]
fn allow_list_restricts_retained_categories() {
    let options = ParseOptions::builder().category("entity").build();
    let doc = parse_str_with_options(TWO_LOOPS, options).unwrap();
    let block = doc.get("T").unwrap();
    assert_eq!(block.category_names(), vec!["entity"]);
    assert_eq!(block.get("entity").unwrap().values("id").unwrap(), ["1"]);
}

#[test]
fn allow_list_skips_simple_items_too() {
    let source = "data_X\n_entry.id X\n_cell.length_a 10\n";
    let options = ParseOptions::builder().category("cell").build();
    let doc = parse_str_with_options(source, options).unwrap();
    let block = doc.get("X").unwrap();
    assert_eq!(block.category_names(), vec!["cell"]);
}

#[test]
fn excluded_loop_does_not_disturb_later_parsing() {
    let source = "data_X\n\
                  loop_\n\
                  _skip.a\n\
                  _skip.b\n\
                  1 2\n\
                  3 4\n\
                  loop_\n\
                  _keep.x\n\
                  5\n\
                  6\n";
    let options = ParseOptions::builder().category("keep").build();
    let doc = parse_str_with_options(source, options).unwrap();
    let block = doc.get("X").unwrap();
    assert_eq!(block.category_names(), vec!["keep"]);
    assert_eq!(block.get("keep").unwrap().values("x").unwrap(), ["5", "6"]);
}

// =============================================================================
// Memory-mapped files
// =============================================================================

#[test]
fn parse_file_maps_and_decodes_lazily() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TWO_LOOPS.as_bytes()).unwrap();
    file.flush().unwrap();

    let doc = parse_file(file.path()).unwrap();
    let entity = doc.get("T").unwrap().get("entity").unwrap();
    assert!(entity.get_item("type").unwrap().is_lazy());
    assert_eq!(entity.values("type").unwrap(), ["polymer"]);
}

#[test]
fn parse_empty_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let doc = parse_file(file.path()).unwrap();
    assert!(doc.is_empty());
}

#[test]
fn parse_missing_file_is_io_error() {
    let err = parse_file("/no/such/file.cif").unwrap_err();
    assert_eq!(err.kind, CifErrorKind::Io);
}

#[test]
fn values_outlive_intermediate_borrows() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"data_X\n_entity.id 42\n").unwrap();
    file.flush().unwrap();

    let doc = parse_file(file.path()).unwrap();
    // The temp file object may go away; the mapping lives on via the
    // document's handle.
    drop(file);
    assert_eq!(
        doc.get("X").unwrap().get("entity").unwrap().values("id").unwrap(),
        ["42"]
    );
}
