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

//! Relationship resolution: flat categories into a nested tree.
//!
//! The resolver consumes already-parsed flat categories plus a [`LinkMap`]
//! and rebuilds the implicit parent-child hierarchy in a single pass:
//!
//! 1. The first established link per child wins; later links for the same
//!    child are ignored, making the result deterministic.
//! 2. Categories never appearing as a child are roots.
//! 3. A root row's map key is the first present of `id`, `name`, `code`,
//!    falling back to the first declared item's value. The key item is
//!    hoisted out of the root row's own field list.
//! 4. A child row attaches when its link-field value equals the parent key.
//!    Two named link fields additionally match against the parent's `id`:
//!    `entity_id` and `label_asym_id`. These are deliberate special cases,
//!    not a general rule.
//! 5. A category is never revisited on one descent path, so link cycles
//!    terminate without error.
//! 6. Exactly one matching child row nests as a single node; two or more
//!    nest as an array in source row order.
//! 7. Child rows matching no parent are absent from the tree and remain in
//!    the flat categories.
//!
//! Resolution is best-effort over whatever rows decode: rows missing the
//! link field are orphans, empty categories are skipped, and nothing here
//! panics or errors for data-shape reasons.

use crate::error::{CifError, CifResult};
use crate::model::{Category, CifDocument, DataBlock, Row};
use crate::schema::LinkMap;
use std::collections::BTreeMap;

/// Root-row key priority. This exact order is a contract, not a heuristic.
pub const KEY_PRIORITY: [&str; 3] = ["id", "name", "code"];

/// A resolved row: its fields plus nested children per category.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NestedNode {
    /// `(item, value)` pairs in item declaration order.
    pub fields: Vec<(String, String)>,
    /// Attached children, keyed by child category name.
    pub children: BTreeMap<String, NestedChildren>,
}

/// Children of one category under a parent row.
///
/// The arity asymmetry is part of the output contract: a single match is a
/// node, two or more are an array.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NestedChildren {
    /// Exactly one matching child row.
    One(NestedNode),
    /// Two or more matching child rows, in source order.
    Many(Vec<NestedNode>),
}

/// Resolver output: root category name, then root-row key, then node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NestedTree {
    pub roots: BTreeMap<String, BTreeMap<String, NestedNode>>,
}

/// Resolve the first block of a document.
///
/// Fails only at the resolver boundary, when the document holds no data
/// block at all; callers converting to a serialized payload should map that
/// error to an explicit `{"error": …}` object.
pub fn resolve_document(doc: &CifDocument, links: &LinkMap) -> CifResult<NestedTree> {
    let block = doc
        .first_block()
        .ok_or_else(|| CifError::resolve("document contains no data block"))?;
    Ok(resolve_block(block, links))
}

/// Resolve one block's flat categories into a nested tree.
pub fn resolve_block(block: &DataBlock, links: &LinkMap) -> NestedTree {
    // First established link per child wins.
    let mut link_field: BTreeMap<&str, &str> = BTreeMap::new();
    let mut children_of: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for link in links.iter() {
        let child = link.child_category.as_str();
        let parent = link.parent_category.as_str();
        if block.category(child).is_none() || block.category(parent).is_none() {
            continue;
        }
        if link_field.contains_key(child) {
            continue;
        }
        link_field.insert(child, link.link_item.as_str());
        children_of.entry(parent).or_default().push(child);
    }

    let mut tree = NestedTree::default();
    for category in block.iter() {
        let name = category.name();
        if link_field.contains_key(name) {
            continue; // reachable as a child somewhere
        }
        let mut rows = BTreeMap::new();
        for row in category.rows() {
            let Some(key) = row_key(category, row) else {
                continue;
            };
            let mut path = vec![name];
            let node = build_node(
                block,
                category,
                row,
                &key,
                true,
                &children_of,
                &link_field,
                &mut path,
            );
            rows.insert(key, node);
        }
        if !rows.is_empty() {
            tree.roots.insert(name.to_string(), rows);
        }
    }
    tree
}

/// The key of a row: first present of [`KEY_PRIORITY`], else the value of
/// the first declared item.
fn row_key(category: &Category, row: Row<'_>) -> Option<String> {
    for field in KEY_PRIORITY {
        if let Some(value) = row.value(field) {
            return Some(value.to_string());
        }
    }
    let first = *category.item_names().first()?;
    row.value(first).map(str::to_string)
}

/// The name of the item [`row_key`] took its value from, if any.
fn key_item(category: &Category, row: Row<'_>) -> Option<String> {
    for field in KEY_PRIORITY {
        if row.value(field).is_some() {
            return Some(field.to_string());
        }
    }
    let first = *category.item_names().first()?;
    row.value(first).map(|_| first.to_string())
}

#[allow(clippy::too_many_arguments)]
fn build_node<'a>(
    block: &'a DataBlock,
    category: &'a Category,
    row: Row<'a>,
    key: &str,
    hoist_key: bool,
    children_of: &BTreeMap<&'a str, Vec<&'a str>>,
    link_field: &BTreeMap<&'a str, &'a str>,
    path: &mut Vec<&'a str>,
) -> NestedNode {
    let hoisted = if hoist_key {
        key_item(category, row)
    } else {
        None
    };

    let mut node = NestedNode::default();
    for (item, value) in row.data() {
        if hoisted.as_deref() == Some(item) {
            continue;
        }
        node.fields.push((item.to_string(), value.to_string()));
    }

    let Some(child_names) = children_of.get(category.name()) else {
        return node;
    };
    let parent_id = row.value("id");
    for &child_name in child_names {
        if path.contains(&child_name) {
            continue; // cycle guard: never revisit on one descent path
        }
        let Some(child_category) = block.category(child_name) else {
            continue;
        };
        let Some(&field) = link_field.get(child_name) else {
            continue;
        };

        let mut matches: Vec<Row<'_>> = Vec::new();
        for child_row in child_category.rows() {
            let Some(value) = child_row.value(field) else {
                continue; // no link value: orphan
            };
            let attaches = value == key
                || (field == "entity_id" && parent_id == Some(value))
                || (field == "label_asym_id" && parent_id == Some(value));
            if attaches {
                matches.push(child_row);
            }
        }
        if matches.is_empty() {
            continue;
        }

        path.push(child_name);
        let mut built: Vec<NestedNode> = matches
            .into_iter()
            .map(|child_row| {
                let child_key = row_key(child_category, child_row).unwrap_or_default();
                build_node(
                    block,
                    child_category,
                    child_row,
                    &child_key,
                    false,
                    children_of,
                    link_field,
                    path,
                )
            })
            .collect();
        path.pop();

        let entry = if built.len() == 1 {
            NestedChildren::One(built.remove(0))
        } else {
            NestedChildren::Many(built)
        };
        node.children.insert(child_name.to_string(), entry);
    }
    node
}
