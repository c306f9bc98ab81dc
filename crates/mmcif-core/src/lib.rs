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

//! Core parser, lazy value store and relational data model for mmCIF.
//!
//! This crate parses mmCIF, the loop-based text format behind Protein Data
//! Bank entries, into a queryable block/category/item model, and rebuilds
//! the implicit parent-child hierarchy across its flat relational categories
//! from schema-declared foreign-key links.
//!
//! Two design points carry most of the weight:
//!
//! - **Lazy values.** Parsing records `(start, end)` byte spans into one
//!   shared read-only buffer (a memory map for [`parse_file`]) instead of
//!   copying every value; spans decode on first access and are memoized.
//!   Data never read is never materialized.
//! - **Relationship resolution.** The [`resolve_block`] pass consumes flat
//!   categories plus a [`LinkMap`] of `child → (link item, parent)`
//!   declarations and produces a nested tree, with a fixed fallback table
//!   for well-known mmCIF relationships.
//!
//! Parsing is single-threaded and lenient: malformed lines are skipped, a
//! partial trailing loop row is discarded, and only unusable input as a
//! whole errors. Reads of missing blocks/categories/items fail immediately,
//! while `get_or_create` write access builds structure on demand.

mod error;
pub mod lex;
mod model;
mod parser;
mod resolve;
mod schema;
mod source;
mod writer;

pub use error::{CifError, CifErrorKind, CifResult};
pub use model::{Category, CifDocument, DataBlock, Item, Row};
pub use parser::{
    parse_bytes, parse_bytes_with_options, parse_file, parse_file_with_options, parse_str,
    parse_str_with_options, ParseOptions, ParseOptionsBuilder,
};
pub use resolve::{
    resolve_block, resolve_document, NestedChildren, NestedNode, NestedTree, KEY_PRIORITY,
};
pub use schema::{
    LinkMap, MetadataCache, MetadataProvider, ParentLink, RelationshipLink, StaticMetadata,
    FALLBACK_LINKS,
};
pub use source::{Source, SourceHandle, Span};
pub use writer::{write_document, write_string};
