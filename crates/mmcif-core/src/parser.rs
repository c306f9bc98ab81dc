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

//! Parser state machine for mmCIF input.
//!
//! The parser walks the source line by line, classifies each line against
//! the current loop/multiline context and stores values as `(start, end)`
//! byte spans into the shared source buffer wherever the raw bytes already
//! equal the decoded value. Values that need reassembly (multiline blocks,
//! quoted tokens with surrounding whitespace) are stored eagerly.
//!
//! # Error policy
//!
//! Line-level problems are recovered locally so a single malformed line
//! never aborts extraction from a large file:
//!
//! - an item line with no inline value outside a loop header is skipped
//! - a tag missing its `category.item` separator is skipped
//! - a tag from a second category inside one loop header is skipped
//! - a partial row left over at end of input is discarded, never committed
//!
//! Only unusable input as a whole (a file that cannot be opened or mapped,
//! or bytes that are not UTF-8) produces an error.

use crate::error::{CifError, CifResult};
use crate::lex::{classify, tokenize, LineKind, Token};
use crate::model::CifDocument;
use crate::source::{Source, SourceHandle, Span};
use std::collections::BTreeSet;
use std::path::Path;

/// Parsing options.
///
/// # Examples
///
/// ```
/// use mmcif_core::ParseOptions;
///
/// let options = ParseOptions::builder()
///     .category("entity")
///     .category("struct_asym")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Optional allow-list of category names to retain. `None` keeps all.
    pub categories: Option<BTreeSet<String>>,
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Builder for ergonomic construction of [`ParseOptions`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    categories: Option<BTreeSet<String>>,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one category to the allow-list.
    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.categories
            .get_or_insert_with(BTreeSet::new)
            .insert(name.into());
        self
    }

    /// Add several categories to the allow-list.
    pub fn categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.categories.get_or_insert_with(BTreeSet::new);
        for name in names {
            set.insert(name.into());
        }
        self
    }

    /// Build the ParseOptions.
    pub fn build(self) -> ParseOptions {
        ParseOptions {
            categories: self.categories,
        }
    }
}

/// Parse an mmCIF document from a string.
pub fn parse_str(input: &str) -> CifResult<CifDocument> {
    parse_str_with_options(input, ParseOptions::default())
}

/// Parse an mmCIF document from a string with custom options.
pub fn parse_str_with_options(input: &str, options: ParseOptions) -> CifResult<CifDocument> {
    parse_bytes_with_options(input.as_bytes().to_vec(), options)
}

/// Parse an mmCIF document from an owned byte buffer.
pub fn parse_bytes(bytes: Vec<u8>) -> CifResult<CifDocument> {
    parse_bytes_with_options(bytes, ParseOptions::default())
}

/// Parse an mmCIF document from an owned byte buffer with custom options.
pub fn parse_bytes_with_options(bytes: Vec<u8>, options: ParseOptions) -> CifResult<CifDocument> {
    Parser::new(Source::from_bytes(bytes), options).run()
}

/// Parse an mmCIF file through a read-only memory map.
pub fn parse_file(path: impl AsRef<Path>) -> CifResult<CifDocument> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Parse an mmCIF file through a read-only memory map with custom options.
pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: ParseOptions,
) -> CifResult<CifDocument> {
    let source = Source::map_file(path)?;
    Parser::new(source, options).run()
}

/// A pending row value awaiting an atomic commit.
#[derive(Debug)]
enum Pending {
    /// Byte span into the source buffer.
    Span(Span),
    /// Eagerly assembled text.
    Text(String),
    /// Column suspended by an open multiline value.
    Open,
}

/// What an open `;` block belongs to.
#[derive(Debug)]
enum MultilineTarget {
    /// A simple `_category.item` whose value follows in a `;` block.
    Item { category: String, item: String },
    /// One suspended loop column.
    LoopColumn,
}

#[derive(Debug)]
struct Multiline {
    target: MultilineTarget,
    buffer: Vec<String>,
}

struct Parser {
    source: SourceHandle,
    options: ParseOptions,
    doc: CifDocument,
    block: Option<String>,
    in_loop: bool,
    /// Category of the first tag declared in the current loop header,
    /// allow-listed or not.
    loop_category: Option<String>,
    /// Item names of the retained loop tags, in declaration order.
    loop_items: Vec<String>,
    rows_started: bool,
    row: Vec<Pending>,
    filled: usize,
    multiline: Option<Multiline>,
}

impl Parser {
    fn new(source: SourceHandle, options: ParseOptions) -> Self {
        let doc = CifDocument::with_source(source.clone());
        Self {
            source,
            options,
            doc,
            block: None,
            in_loop: false,
            loop_category: None,
            loop_items: Vec::new(),
            rows_started: false,
            row: Vec::new(),
            filled: 0,
            multiline: None,
        }
    }

    fn run(mut self) -> CifResult<CifDocument> {
        let source = self.source.clone();
        let text = std::str::from_utf8(source.as_bytes())
            .map_err(|err| CifError::syntax(format!("input is not valid UTF-8: {}", err), 0))?;

        let mut pos = 0usize;
        for raw in text.split('\n') {
            let line_start = pos;
            pos += raw.len() + 1;
            self.process_line(raw.trim_end(), line_start);
        }
        // A partial row or unterminated multiline value left at end of
        // input is discarded rather than committed.
        Ok(self.doc)
    }

    fn process_line(&mut self, line: &str, line_start: usize) {
        match classify(line, self.in_loop, self.multiline.is_some()) {
            LineKind::Comment | LineKind::Ignored => {}
            LineKind::BlockHeader => self.handle_block_header(line),
            LineKind::LoopHeader => self.start_loop(),
            LineKind::ItemLine => self.handle_item_line(line, line_start),
            LineKind::LoopRow => self.handle_loop_row(line, line_start),
            LineKind::Continuation => {
                if let Some(multiline) = &mut self.multiline {
                    multiline.buffer.push(line.to_string());
                }
            }
            LineKind::MultilineEnd => self.finish_multiline(),
        }
    }

    /// `data_X`: close any pending loop/multiline state and open a fresh
    /// block named `X`, replacing a previous block of the same name.
    fn handle_block_header(&mut self, line: &str) {
        let name = line["data_".len()..].trim().to_string();
        self.in_loop = false;
        self.reset_loop();
        self.multiline = None;
        self.doc.insert_block(&name);
        self.block = Some(name);
    }

    fn start_loop(&mut self) {
        self.in_loop = true;
        self.reset_loop();
    }

    fn reset_loop(&mut self) {
        self.loop_category = None;
        self.loop_items.clear();
        self.rows_started = false;
        self.row.clear();
        self.filled = 0;
    }

    fn handle_item_line(&mut self, line: &str, line_start: usize) {
        if self.block.is_none() {
            return; // item line before any data block
        }
        let tokens = tokenize(line);
        let Some(tag) = tokens.first().copied() else {
            return;
        };
        let Some((category, item)) = split_tag(tag.text) else {
            return; // tag missing its category separator
        };

        if tokens.len() < 2 {
            self.handle_bare_tag(category, item);
            return;
        }

        // Inline `tag value` pair.
        if !self.include_category(category) {
            return;
        }
        let value = tokens[1];
        if !value.quoted && value.text.starts_with(';') {
            // Multiline opener scoped to this item; the fragment after `;`
            // on the opener line is dropped, the value starts on the next
            // line. The category exists from this point even if the value
            // never terminates.
            self.ensure_category(category);
            self.multiline = Some(Multiline {
                target: MultilineTarget::Item {
                    category: category.to_string(),
                    item: item.to_string(),
                },
                buffer: Vec::new(),
            });
            return;
        }
        let pending = if tokens.len() == 2 {
            pending_for(value, line_start)
        } else {
            // More than one value token: keep the raw remainder as the value.
            Pending::Text(line[tag.end..].trim().to_string())
        };
        self.store_simple(category, item, pending);
    }

    /// A `_category.item` line with no inline value: a loop tag declaration
    /// while a loop header is open, malformed otherwise.
    fn handle_bare_tag(&mut self, category: &str, item: &str) {
        if !self.in_loop || self.rows_started {
            return; // lacking loop context: skipped
        }
        match &self.loop_category {
            None => {
                self.loop_category = Some(category.to_string());
                if self.include_category(category) {
                    self.loop_items.push(item.to_string());
                    self.ensure_category(category);
                }
            }
            Some(current) if current == category => {
                if self.include_category(category) {
                    self.loop_items.push(item.to_string());
                }
            }
            Some(_) => {
                // Tag from a second category inside one loop header: skipped.
            }
        }
    }

    fn handle_loop_row(&mut self, line: &str, line_start: usize) {
        if self.multiline.is_some() {
            if line == ";" {
                self.finish_multiline();
            } else if let Some(multiline) = &mut self.multiline {
                multiline.buffer.push(line.to_string());
            }
            return;
        }
        if self.loop_items.is_empty() {
            return; // excluded or tagless loop: tokens are not looked up
        }
        if !line.is_empty() {
            self.rows_started = true;
        }
        for token in tokenize(line) {
            if self.row.len() >= self.loop_items.len() {
                break; // tokens beyond the declared arity are dropped
            }
            if !token.quoted && token.text.starts_with(';') {
                // Suspend the row: this column continues as a multiline
                // value opened by the rest of the line after `;`.
                let fragment = &line[token.start + 1..];
                let buffer = if fragment.is_empty() {
                    Vec::new()
                } else {
                    vec![fragment.to_string()]
                };
                self.multiline = Some(Multiline {
                    target: MultilineTarget::LoopColumn,
                    buffer,
                });
                self.row.push(Pending::Open);
                return;
            }
            self.row.push(pending_for(token, line_start));
            self.filled += 1;
        }
        self.maybe_commit_row();
    }

    fn finish_multiline(&mut self) {
        let Some(multiline) = self.multiline.take() else {
            return;
        };
        let value = multiline.buffer.join("\n");
        match multiline.target {
            MultilineTarget::LoopColumn => {
                if let Some(last) = self.row.last_mut() {
                    *last = Pending::Text(value);
                    self.filled += 1;
                }
                self.maybe_commit_row();
            }
            MultilineTarget::Item { category, item } => {
                self.store_simple(&category, &item, Pending::Text(value));
            }
        }
    }

    /// Commit the pending row atomically: one value appended per retained
    /// tag's item, all-or-nothing.
    fn maybe_commit_row(&mut self) {
        if self.loop_items.is_empty() || self.filled != self.loop_items.len() {
            return;
        }
        let row = std::mem::take(&mut self.row);
        self.filled = 0;
        let (Some(block), Some(category)) = (self.block.clone(), self.loop_category.clone())
        else {
            return;
        };
        let target = self.doc.get_or_create(&block).get_or_create(&category);
        for (item, pending) in self.loop_items.iter().zip(row) {
            match pending {
                Pending::Span(span) => target.get_or_create_item(item).push_span(span),
                Pending::Text(text) => target.get_or_create_item(item).push_value(text),
                Pending::Open => target.get_or_create_item(item).push_value(String::new()),
            }
        }
        debug_assert!(
            target.rows_consistent(),
            "row commit left category `{}` with mismatched item lengths",
            category
        );
    }

    fn store_simple(&mut self, category: &str, item: &str, pending: Pending) {
        let Some(block) = self.block.clone() else {
            return;
        };
        let target = self
            .doc
            .get_or_create(&block)
            .get_or_create(category)
            .get_or_create_item(item);
        match pending {
            Pending::Span(span) => target.push_span(span),
            Pending::Text(text) => target.push_value(text),
            Pending::Open => target.push_value(String::new()),
        }
    }

    fn ensure_category(&mut self, category: &str) {
        let Some(block) = self.block.clone() else {
            return;
        };
        self.doc.get_or_create(&block).get_or_create(category);
    }

    fn include_category(&self, category: &str) -> bool {
        match &self.options.categories {
            None => true,
            Some(allowed) => allowed.contains(category),
        }
    }
}

/// Store a token as a byte span when decoding the span reproduces the token
/// text exactly; fall back to eager text otherwise (quoted content with
/// surrounding whitespace, which span decoding would trim away).
fn pending_for(token: Token<'_>, line_start: usize) -> Pending {
    if token.quoted && token.text.trim() != token.text {
        Pending::Text(token.text.to_string())
    } else {
        Pending::Span(Span::new(line_start + token.start, line_start + token.end))
    }
}

/// Split `_category.item` into its halves; `None` when the leading
/// underscore or the separator is missing.
fn split_tag(tag: &str) -> Option<(&str, &str)> {
    let rest = tag.strip_prefix('_')?;
    let dot = rest.find('.')?;
    let (category, item) = (&rest[..dot], &rest[dot + 1..]);
    if category.is_empty() || item.is_empty() {
        return None;
    }
    Some((category, item))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== split_tag ====================

    #[test]
    fn test_split_tag() {
        assert_eq!(split_tag("_entity.id"), Some(("entity", "id")));
        assert_eq!(
            split_tag("_atom_site.label_asym_id"),
            Some(("atom_site", "label_asym_id"))
        );
    }

    #[test]
    fn test_split_tag_malformed() {
        assert_eq!(split_tag("_incomplete"), None);
        assert_eq!(split_tag("entity.id"), None);
        assert_eq!(split_tag("_.id"), None);
        assert_eq!(split_tag("_entity."), None);
    }

    // ==================== Options builder ====================

    #[test]
    fn test_options_default_keeps_all() {
        assert!(ParseOptions::default().categories.is_none());
    }

    #[test]
    fn test_options_builder_collects_categories() {
        let options = ParseOptions::builder()
            .category("entity")
            .categories(["struct_asym", "atom_site"])
            .build();
        let set = options.categories.unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("entity"));
        assert!(set.contains("atom_site"));
    }

    // ==================== Small end-to-end checks ====================
    //
    // Full grammar coverage lives in tests/parser_tests.rs; these cover the
    // state machine edges directly.

    #[test]
    fn test_simple_item_stored_lazily() {
        let doc = parse_str("data_X\n_entity.id 7\n").unwrap();
        let item = doc.get("X").unwrap().get("entity").unwrap().get_item("id").unwrap();
        assert!(item.is_lazy());
        assert_eq!(item.get(0), Some("7"));
    }

    #[test]
    fn test_item_line_before_block_is_skipped() {
        let doc = parse_str("_entity.id 1\ndata_X\n").unwrap();
        assert!(doc.get("X").unwrap().category("entity").is_none());
    }

    #[test]
    fn test_quoted_value_with_padding_stored_eagerly() {
        let doc = parse_str("data_X\n_entity.desc ' padded '\n").unwrap();
        let item = doc.get("X").unwrap().get("entity").unwrap().get_item("desc").unwrap();
        assert!(!item.is_lazy());
        assert_eq!(item.get(0), Some(" padded "));
    }

    #[test]
    fn test_rest_of_line_value() {
        let doc = parse_str("data_X\n_entity.desc one two three\n").unwrap();
        let block = doc.get("X").unwrap();
        assert_eq!(
            block.get("entity").unwrap().get_item("desc").unwrap().get(0),
            Some("one two three")
        );
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let err = parse_bytes(vec![b'd', 0xff, 0xfe]).unwrap_err();
        assert_eq!(err.kind, crate::error::CifErrorKind::Syntax);
    }

    #[test]
    fn test_empty_input() {
        let doc = parse_str("").unwrap();
        assert!(doc.is_empty());
    }
}
