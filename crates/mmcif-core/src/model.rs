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

//! Relational data model: documents, blocks, categories, items and rows.
//!
//! Access follows a strict asymmetry: write access auto-creates missing
//! entries (`get_or_create*`), read access on a missing entry fails with a
//! [`CifErrorKind::NotFound`](crate::CifErrorKind) error. A thin `Index`
//! operator layer exists for ergonomics only and panics on missing keys.
//!
//! Item values are stored slot-wise: each slot is either an owned string or
//! a byte [`Span`] into the shared source buffer, decoded on first access and
//! memoized per slot. Appending a value invalidates the item's bulk cache
//! before the next read.

use crate::error::{CifError, CifResult};
use crate::source::{SourceHandle, Span};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// One stored value: eager text or a lazy byte span.
#[derive(Debug, Clone)]
enum Slot {
    Text(String),
    Lazy(Span),
}

/// A named column of values.
pub struct Item {
    name: String,
    source: Option<SourceHandle>,
    slots: Vec<Slot>,
    decoded: Vec<OnceCell<String>>,
    bulk: OnceCell<Vec<String>>,
}

impl Item {
    /// Create an empty item with no backing buffer (eager values only).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            slots: Vec::new(),
            decoded: Vec::new(),
            bulk: OnceCell::new(),
        }
    }

    /// Create an empty item backed by a shared source buffer.
    pub fn with_source(name: impl Into<String>, source: SourceHandle) -> Self {
        Self {
            source: Some(source),
            ..Self::new(name)
        }
    }

    /// The item name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of values, independent of decode state.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the item holds no values.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append an eager value.
    pub fn push_value(&mut self, value: impl Into<String>) {
        self.slots.push(Slot::Text(value.into()));
        self.decoded.push(OnceCell::new());
        self.bulk.take();
    }

    /// Append a lazy byte span into the shared buffer.
    ///
    /// A span pushed onto an item with no source buffer decodes to the empty
    /// string.
    pub fn push_span(&mut self, span: Span) {
        self.slots.push(Slot::Lazy(span));
        self.decoded.push(OnceCell::new());
        self.bulk.take();
    }

    /// The value at `index`, decoding and memoizing the span on first access.
    pub fn get(&self, index: usize) -> Option<&str> {
        match self.slots.get(index)? {
            Slot::Text(text) => Some(text.as_str()),
            Slot::Lazy(span) => {
                let cell = &self.decoded[index];
                let decoded = cell.get_or_init(|| match &self.source {
                    Some(source) => source.decode(*span).to_string(),
                    None => String::new(),
                });
                Some(decoded.as_str())
            }
        }
    }

    /// The byte span recorded for the value at `index`, if it is lazy.
    pub fn span(&self, index: usize) -> Option<Span> {
        match self.slots.get(index)? {
            Slot::Lazy(span) => Some(*span),
            Slot::Text(_) => None,
        }
    }

    /// Whether any value is still backed by a byte span.
    pub fn is_lazy(&self) -> bool {
        self.slots.iter().any(|slot| matches!(slot, Slot::Lazy(_)))
    }

    /// All values, materialized once and cached until the next mutation.
    pub fn values(&self) -> &[String] {
        self.bulk.get_or_init(|| {
            (0..self.slots.len())
                .map(|i| self.get(i).unwrap_or("").to_string())
                .collect()
        })
    }

    /// Iterate over all values (forces materialization).
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values().iter().map(String::as_str)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("len", &self.slots.len())
            .field("lazy", &self.is_lazy())
            .finish()
    }
}

/// A named group of items sharing one row count.
///
/// Items keep declaration order; the first-declared item is the category's
/// deterministic "first attribute".
pub struct Category {
    name: String,
    source: Option<SourceHandle>,
    items: Vec<Item>,
    index: BTreeMap<String, usize>,
}

impl Category {
    /// Create an empty category with no backing buffer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            items: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Create an empty category backed by a shared source buffer.
    pub fn with_source(name: impl Into<String>, source: Option<SourceHandle>) -> Self {
        Self {
            source,
            ..Self::new(name)
        }
    }

    /// The category name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Item names in declaration order.
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(Item::name).collect()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the category holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over items in declaration order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Look up an item by name.
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    /// Look up an item by name, failing if it does not exist.
    pub fn get_item(&self, name: &str) -> CifResult<&Item> {
        match self.index.get(name) {
            Some(&i) => Ok(&self.items[i]),
            None => Err(CifError::not_found(format!(
                "no item `{}` in category `{}`",
                name, self.name
            ))),
        }
    }

    /// Look up an item, creating it if missing.
    pub fn get_or_create_item(&mut self, name: &str) -> &mut Item {
        if let Some(&i) = self.index.get(name) {
            return &mut self.items[i];
        }
        let item = match &self.source {
            Some(source) => Item::with_source(name, source.clone()),
            None => Item::new(name),
        };
        let idx = self.items.len();
        self.items.push(item);
        self.index.insert(name.to_string(), idx);
        &mut self.items[idx]
    }

    /// All values of one item (forces materialization), failing if missing.
    pub fn values(&self, item: &str) -> CifResult<&[String]> {
        Ok(self.get_item(item)?.values())
    }

    /// Number of rows: the length of the first item, zero when empty.
    pub fn row_count(&self) -> usize {
        self.items.first().map_or(0, Item::len)
    }

    /// The row at `index`, if in range.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.row_count()).then_some(Row {
            category: self,
            index,
        })
    }

    /// The row at `index`, failing when out of range.
    pub fn get_row(&self, index: usize) -> CifResult<Row<'_>> {
        self.row(index).ok_or_else(|| {
            CifError::not_found(format!(
                "row index {} out of range for category `{}` ({} rows)",
                index,
                self.name,
                self.row_count()
            ))
        })
    }

    /// All rows of the category.
    pub fn rows(&self) -> Vec<Row<'_>> {
        (0..self.row_count())
            .map(|index| Row {
                category: self,
                index,
            })
            .collect()
    }

    /// Whether every item currently stores the same number of values.
    ///
    /// A populated category must always satisfy this outside an in-flight row
    /// commit; a violation observed elsewhere is an internal bug.
    pub fn rows_consistent(&self) -> bool {
        let mut lens = self.items.iter().map(Item::len);
        match lens.next() {
            None => true,
            Some(first) => lens.all(|len| len == first),
        }
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.name)
            .field("items", &self.item_names())
            .field("rows", &self.row_count())
            .finish()
    }
}

impl Index<&str> for Category {
    type Output = Item;

    /// Ergonomic item access. Panics on a missing item; the fallible API is
    /// [`Category::get_item`].
    fn index(&self, name: &str) -> &Item {
        match self.item(name) {
            Some(item) => item,
            None => panic!("no item `{}` in category `{}`", name, self.name),
        }
    }
}

/// A lightweight view of one row of a category.
///
/// Rows do not own data; value lookup delegates to the owning category, and
/// two rows are equal when they view the same category at the same index.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    category: &'a Category,
    index: usize,
}

impl<'a> Row<'a> {
    /// The owning category.
    pub fn category(&self) -> &'a Category {
        self.category
    }

    /// The row index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The value of one item in this row.
    pub fn value(&self, item: &str) -> Option<&'a str> {
        let category: &'a Category = self.category;
        category.item(item)?.get(self.index)
    }

    /// The value of one item in this row, failing if the item is missing or
    /// the row index is out of range for it.
    pub fn get(&self, item: &str) -> CifResult<&'a str> {
        let category: &'a Category = self.category;
        let found = category.get_item(item)?;
        found.get(self.index).ok_or_else(|| {
            CifError::not_found(format!(
                "item `{}` has no value at row {} in category `{}`",
                item, self.index, category.name
            ))
        })
    }

    /// All `(item, value)` pairs of this row in item declaration order.
    pub fn data(&self) -> Vec<(&'a str, &'a str)> {
        let category: &'a Category = self.category;
        category
            .items()
            .filter_map(|item| item.get(self.index).map(|value| (item.name(), value)))
            .collect()
    }
}

impl PartialEq for Row<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.category, other.category) && self.index == other.index
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row({}, {})", self.index, self.category.name)
    }
}

/// A named data block owning categories.
pub struct DataBlock {
    name: String,
    source: Option<SourceHandle>,
    categories: BTreeMap<String, Category>,
}

impl DataBlock {
    /// Create an empty block with no backing buffer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            categories: BTreeMap::new(),
        }
    }

    /// Create an empty block backed by a shared source buffer.
    pub fn with_source(name: impl Into<String>, source: Option<SourceHandle>) -> Self {
        Self {
            source,
            ..Self::new(name)
        }
    }

    /// The block name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category names.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the block holds no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Iterate over categories.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    /// Look up a category by name, failing if it does not exist.
    pub fn get(&self, name: &str) -> CifResult<&Category> {
        self.categories.get(name).ok_or_else(|| {
            CifError::not_found(format!("no category `{}` in block `{}`", name, self.name))
        })
    }

    /// Look up a category, creating it if missing.
    pub fn get_or_create(&mut self, name: &str) -> &mut Category {
        let source = self.source.clone();
        self.categories
            .entry(name.to_string())
            .or_insert_with(|| Category::with_source(name, source))
    }
}

impl fmt::Debug for DataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBlock")
            .field("name", &self.name)
            .field("categories", &self.category_names())
            .finish()
    }
}

impl Index<&str> for DataBlock {
    type Output = Category;

    /// Ergonomic category access. Panics on a missing category; the fallible
    /// API is [`DataBlock::get`].
    fn index(&self, name: &str) -> &Category {
        match self.category(name) {
            Some(category) => category,
            None => panic!("no category `{}` in block `{}`", name, self.name),
        }
    }
}

/// A parsed mmCIF document: data blocks plus the shared source handle.
///
/// The source buffer outlives every lazy value derived from it because the
/// document (and each category created from it) holds a reference-counted
/// handle; the mapping is released when the last handle drops.
#[derive(Default)]
pub struct CifDocument {
    source: Option<SourceHandle>,
    blocks: BTreeMap<String, DataBlock>,
}

impl CifDocument {
    /// Create an empty document with no backing buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document backed by a shared source buffer.
    pub fn with_source(source: SourceHandle) -> Self {
        Self {
            source: Some(source),
            blocks: BTreeMap::new(),
        }
    }

    /// The shared source handle, if the document was parsed from a buffer.
    pub fn source(&self) -> Option<&SourceHandle> {
        self.source.as_ref()
    }

    /// Block names.
    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.keys().map(String::as_str).collect()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the document holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over blocks.
    pub fn iter(&self) -> impl Iterator<Item = &DataBlock> {
        self.blocks.values()
    }

    /// The first block in name order, if any.
    pub fn first_block(&self) -> Option<&DataBlock> {
        self.blocks.values().next()
    }

    /// Look up a block by name.
    pub fn block(&self, name: &str) -> Option<&DataBlock> {
        self.blocks.get(name)
    }

    /// Look up a block by name, failing if it does not exist.
    pub fn get(&self, name: &str) -> CifResult<&DataBlock> {
        self.blocks
            .get(name)
            .ok_or_else(|| CifError::not_found(format!("no data block named `{}`", name)))
    }

    /// Look up a block, creating it if missing.
    pub fn get_or_create(&mut self, name: &str) -> &mut DataBlock {
        let source = self.source.clone();
        self.blocks
            .entry(name.to_string())
            .or_insert_with(|| DataBlock::with_source(name, source))
    }

    /// Insert a fresh block named `name`, replacing any existing one.
    pub fn insert_block(&mut self, name: &str) -> &mut DataBlock {
        use std::collections::btree_map::Entry;
        let source = self.source.clone();
        match self.blocks.entry(name.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(DataBlock::with_source(name, source));
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(DataBlock::with_source(name, source)),
        }
    }
}

impl fmt::Debug for CifDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CifDocument")
            .field("blocks", &self.block_names())
            .finish()
    }
}

impl Index<&str> for CifDocument {
    type Output = DataBlock;

    /// Ergonomic block access. Panics on a missing block; the fallible API is
    /// [`CifDocument::get`].
    fn index(&self, name: &str) -> &DataBlock {
        match self.block(name) {
            Some(block) => block,
            None => panic!("no data block named `{}`", name),
        }
    }
}
