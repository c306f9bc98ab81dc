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

//! JSON conversion for the flat model and the resolved tree.
//!
//! Flat shape: block → category → either an object of `item: value` pairs
//! (single-row category) or an array of row objects (multi-row category).
//!
//! Nested shape: root category → root-row key → row object with children
//! inlined, a single matching child as an object and two or more as an
//! array.
//!
//! [`resolve_to_json`] is the lenient resolver boundary: a resolution
//! failure becomes an explicit `{"error": message}` payload instead of
//! propagating.

use crate::{resolve_document, CifDocument, CifError, CifResult, LinkMap};
use mmcif_core::{Category, DataBlock, NestedChildren, NestedNode, NestedTree};
use serde_json::{json, Map, Value};

/// Convert a whole document to the flat JSON shape.
pub fn document_to_json(doc: &CifDocument) -> Value {
    let mut blocks = Map::new();
    for block in doc.iter() {
        blocks.insert(block.name().to_string(), block_to_json(block));
    }
    Value::Object(blocks)
}

/// Convert one block to the flat JSON shape.
pub fn block_to_json(block: &DataBlock) -> Value {
    let mut categories = Map::new();
    for category in block.iter() {
        categories.insert(category.name().to_string(), category_to_json(category));
    }
    Value::Object(categories)
}

/// Convert one category: an object for a single row, an array of row
/// objects otherwise.
pub fn category_to_json(category: &Category) -> Value {
    let multi_row = category.items().any(|item| item.len() > 1);
    if multi_row {
        let rows: Vec<Value> = (0..category.row_count())
            .map(|index| {
                let mut row = Map::new();
                for item in category.items() {
                    if let Some(value) = item.get(index) {
                        row.insert(item.name().to_string(), Value::String(value.to_string()));
                    }
                }
                Value::Object(row)
            })
            .collect();
        Value::Array(rows)
    } else {
        let mut object = Map::new();
        for item in category.items() {
            if let Some(value) = item.get(0) {
                object.insert(item.name().to_string(), Value::String(value.to_string()));
            }
        }
        Value::Object(object)
    }
}

/// Render a document as a pretty-printed flat JSON string.
pub fn to_json_string(doc: &CifDocument) -> CifResult<String> {
    serde_json::to_string_pretty(&document_to_json(doc))
        .map_err(|err| CifError::conversion(err.to_string()))
}

/// Convert a resolved tree to JSON.
pub fn tree_to_json(tree: &NestedTree) -> Value {
    let mut roots = Map::new();
    for (category, rows) in &tree.roots {
        let mut by_key = Map::new();
        for (key, node) in rows {
            by_key.insert(key.clone(), node_to_json(node));
        }
        roots.insert(category.clone(), Value::Object(by_key));
    }
    Value::Object(roots)
}

fn node_to_json(node: &NestedNode) -> Value {
    let mut object = Map::new();
    for (item, value) in &node.fields {
        object.insert(item.clone(), Value::String(value.clone()));
    }
    for (category, children) in &node.children {
        let value = match children {
            NestedChildren::One(child) => node_to_json(child),
            NestedChildren::Many(list) => Value::Array(list.iter().map(node_to_json).collect()),
        };
        object.insert(category.clone(), value);
    }
    Value::Object(object)
}

/// Resolve a document and render the tree as JSON; a resolution failure
/// becomes an explicit `{"error": message}` payload.
pub fn resolve_to_json(doc: &CifDocument, links: &LinkMap) -> Value {
    match resolve_document(doc, links) {
        Ok(tree) => tree_to_json(&tree),
        Err(err) => json!({ "error": err.to_string() }),
    }
}
