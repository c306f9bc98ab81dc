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

//! # mmCIF - lazy parsing and relationship resolution for macromolecular CIF
//!
//! mmCIF is the loop-based text format behind Protein Data Bank entries.
//! This crate parses it into a queryable block/category/item model backed by
//! a shared read-only buffer (values decode lazily on access), and rebuilds
//! the implicit parent-child hierarchy across the flat categories from
//! schema-declared foreign-key links.
//!
//! ## Quick Start
//!
//! ```rust
//! use mmcif::{parse, resolve_document, LinkMap};
//!
//! let source = "\
//! data_T
//! loop_
//! _entity.id
//! _entity.type
//! 1 polymer
//! loop_
//! _struct_asym.id
//! _struct_asym.entity_id
//! A 1
//! ";
//!
//! let doc = parse(source).expect("parse failed");
//! let entity = doc.get("T").unwrap().get("entity").unwrap();
//! assert_eq!(entity.values("type").unwrap(), ["polymer"]);
//!
//! let links = LinkMap::new().with_link("struct_asym", "entity_id", "entity");
//! let tree = resolve_document(&doc, &links).unwrap();
//! assert!(tree.roots["entity"]["1"].children.contains_key("struct_asym"));
//! ```
//!
//! ## Modules
//!
//! - [`mmcif_core`]-backed model, parser, resolver and writer (re-exported
//!   at the crate root)
//! - [`json`]: flat and nested JSON conversion via `serde_json`
//! - [`lex`]: line classification and tokenization utilities

// Re-export core types
pub use mmcif_core::{
    // Parser entry points
    parse_bytes,
    parse_bytes_with_options,
    parse_file,
    parse_file_with_options,
    parse_str,
    parse_str_with_options,
    // Resolver
    resolve_block,
    resolve_document,
    // Writer
    write_document,
    write_string,
    // Model
    Category,
    CifDocument,
    // Errors
    CifError,
    CifErrorKind,
    CifResult,
    DataBlock,
    Item,
    // Metadata contract
    LinkMap,
    MetadataCache,
    MetadataProvider,
    NestedChildren,
    NestedNode,
    NestedTree,
    ParentLink,
    // Options
    ParseOptions,
    ParseOptionsBuilder,
    RelationshipLink,
    Row,
    Source,
    SourceHandle,
    Span,
    StaticMetadata,
    FALLBACK_LINKS,
    KEY_PRIORITY,
};

// Error handling extensions
mod error_ext;
pub use error_ext::CifResultExt;

// JSON conversion
pub mod json;

// Re-export lexer utilities
pub mod lex {
    //! Line classification and tokenization utilities
    pub use mmcif_core::lex::{classify, tokenize, LineKind, Token};
}

/// Parse an mmCIF document from a string.
///
/// Shorthand for [`parse_str`].
pub fn parse(input: &str) -> CifResult<CifDocument> {
    parse_str(input)
}
