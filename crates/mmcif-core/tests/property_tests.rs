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

//! Property tests for the tokenizer, the lazy value store and the parser.

use mmcif_core::lex::tokenize;
use mmcif_core::{parse_str, write_string, Item, Source, Span};
use proptest::prelude::*;

proptest! {
    /// Tokenizing unquoted tokens joined by whitespace reproduces them.
    #[test]
    fn tokenize_round_trips(tokens in prop::collection::vec("[A-Za-z0-9._-]{1,8}", 1..8)) {
        let line = tokens.join("  ");
        let parsed: Vec<String> = tokenize(&line)
            .into_iter()
            .map(|t| t.text.to_string())
            .collect();
        prop_assert_eq!(parsed, tokens);
    }

    /// Token offsets always slice back to the token text.
    #[test]
    fn token_offsets_are_consistent(line in "[A-Za-z0-9 .'_-]{0,40}") {
        for token in tokenize(&line) {
            prop_assert_eq!(&line[token.start..token.end], token.text);
        }
    }

    /// Indexed decode and bulk decode yield an identical sequence, for any
    /// mix of span-backed and eager slots.
    #[test]
    fn indexed_decode_equals_bulk(values in prop::collection::vec("[a-z0-9]{1,6}", 0..16)) {
        let text = values.join(" ");
        let source = Source::from_bytes(text.as_bytes().to_vec());
        let mut item = Item::with_source("prop", source);

        let mut offset = 0usize;
        for (i, value) in values.iter().enumerate() {
            if i % 3 == 2 {
                item.push_value(value.clone());
            } else {
                item.push_span(Span::new(offset, offset + value.len()));
            }
            offset += value.len() + 1;
        }

        let indexed: Vec<String> =
            (0..item.len()).map(|i| item.get(i).unwrap().to_string()).collect();
        let bulk = item.values().to_vec();
        prop_assert_eq!(indexed, bulk.clone());
        prop_assert_eq!(bulk, values);
    }

    /// Every parsed loop keeps the row-count invariant and reproduces its
    /// column values.
    #[test]
    fn parsed_loop_grid_is_consistent(
        rows in prop::collection::vec(("[a-z0-9]{1,5}", "[a-z0-9]{1,5}"), 1..12),
    ) {
        let mut text = String::from("data_P\nloop_\n_t.a\n_t.b\n");
        for (a, b) in &rows {
            text.push_str(a);
            text.push(' ');
            text.push_str(b);
            text.push('\n');
        }

        let doc = parse_str(&text).unwrap();
        let category = doc.get("P").unwrap().get("t").unwrap();
        prop_assert!(category.rows_consistent());
        prop_assert_eq!(category.row_count(), rows.len());

        let a_vals: Vec<&str> = rows.iter().map(|(a, _)| a.as_str()).collect();
        let b_vals: Vec<&str> = rows.iter().map(|(_, b)| b.as_str()).collect();
        prop_assert_eq!(category.values("a").unwrap(), a_vals);
        prop_assert_eq!(category.values("b").unwrap(), b_vals);
    }

    /// Writing and re-parsing preserves simple values.
    #[test]
    fn write_parse_round_trip(values in prop::collection::vec("[a-z0-9]{1,6}", 1..8)) {
        let mut text = String::from("data_R\nloop_\n_t.v\n");
        for value in &values {
            text.push_str(value);
            text.push('\n');
        }

        let first = parse_str(&text).unwrap();
        let emitted = write_string(&first).unwrap();
        let second = parse_str(&emitted).unwrap();
        prop_assert_eq!(
            second.get("R").unwrap().get("t").unwrap().values("v").unwrap(),
            values
        );
    }
}
