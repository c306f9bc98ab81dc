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

//! Metadata provider contract and relationship link map.
//!
//! Dictionary extraction itself lives outside this crate; only its output
//! contract matters here: ordered per-category key items and parent link
//! declarations. [`LinkMap`] flattens those declarations into the resolver's
//! input, falling back to a small fixed table of well-known mmCIF
//! relationships for categories the dictionary says nothing about.
//!
//! Provider snapshots are shared through an explicitly passed
//! [`MetadataCache`] keyed by source path and modification time; there is no
//! process-wide mutable state.

use crate::error::{CifError, CifResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// One declared parent link of a child category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentLink {
    /// The parent category name.
    pub parent_category: String,
    /// The key item on the parent side.
    pub parent_item: String,
    /// The foreign-key item on the child side.
    pub child_item: String,
}

/// Output contract of dictionary/schema metadata extraction.
pub trait MetadataProvider {
    /// Ordered key item names of a category; empty when unknown.
    fn category_keys(&self, category: &str) -> Vec<String>;

    /// Declared parent links of a child category; empty when unknown.
    fn parent_links(&self, child: &str) -> Vec<ParentLink>;
}

/// Map-backed [`MetadataProvider`] for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    keys: BTreeMap<String, Vec<String>>,
    links: BTreeMap<String, Vec<ParentLink>>,
}

impl StaticMetadata {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the ordered key items of a category.
    pub fn with_keys<I, S>(mut self, category: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys
            .insert(category.into(), items.into_iter().map(Into::into).collect());
        self
    }

    /// Declare a parent link of a child category.
    pub fn with_link(
        mut self,
        child: impl Into<String>,
        parent_category: impl Into<String>,
        parent_item: impl Into<String>,
        child_item: impl Into<String>,
    ) -> Self {
        self.links.entry(child.into()).or_default().push(ParentLink {
            parent_category: parent_category.into(),
            parent_item: parent_item.into(),
            child_item: child_item.into(),
        });
        self
    }
}

impl MetadataProvider for StaticMetadata {
    fn category_keys(&self, category: &str) -> Vec<String> {
        self.keys.get(category).cloned().unwrap_or_default()
    }

    fn parent_links(&self, child: &str) -> Vec<ParentLink> {
        self.links.get(child).cloned().unwrap_or_default()
    }
}

/// Last-resort table of well-known mmCIF relationships, as
/// `(child category, link item, parent category)`.
///
/// Consulted only for categories with no dictionary-sourced link; a
/// dictionary link is never overridden.
pub const FALLBACK_LINKS: &[(&str, &str, &str)] = &[
    ("citation_author", "citation_id", "citation"),
    ("citation_editor", "citation_id", "citation"),
    ("atom_site", "entity_id", "entity"),
    ("entity_poly", "entity_id", "entity"),
    ("entity_poly_seq", "entity_id", "entity"),
    ("struct_asym", "entity_id", "entity"),
];

/// One resolved foreign-key link consumed by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationshipLink {
    /// The child category name.
    pub child_category: String,
    /// The foreign-key item on the child side.
    pub link_item: String,
    /// The parent category name.
    pub parent_category: String,
}

/// Ordered relationship links: dictionary-declared links first, fallback
/// table entries after, preserving declaration order within each.
#[derive(Debug, Clone, Default)]
pub struct LinkMap {
    links: Vec<RelationshipLink>,
}

impl LinkMap {
    /// Create an empty link map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one link (builder style).
    pub fn with_link(
        mut self,
        child: impl Into<String>,
        link_item: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        self.push(child, link_item, parent);
        self
    }

    /// Append one link.
    pub fn push(
        &mut self,
        child: impl Into<String>,
        link_item: impl Into<String>,
        parent: impl Into<String>,
    ) {
        self.links.push(RelationshipLink {
            child_category: child.into(),
            link_item: link_item.into(),
            parent_category: parent.into(),
        });
    }

    /// Build the link map for a set of categories from a metadata provider,
    /// adding fallback-table entries only for children the provider knows
    /// nothing about.
    pub fn from_provider(provider: &dyn MetadataProvider, categories: &[&str]) -> Self {
        let mut map = Self::new();
        for &child in categories {
            for link in provider.parent_links(child) {
                map.push(child, link.child_item, link.parent_category);
            }
        }
        for &(child, link_item, parent) in FALLBACK_LINKS {
            let declared = map.links.iter().any(|l| l.child_category == child);
            if !declared && categories.contains(&child) {
                map.push(child, link_item, parent);
            }
        }
        map
    }

    /// Iterate over links in established order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationshipLink> {
        self.links.iter()
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the map holds no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Explicitly passed cache of provider snapshots, keyed by source path and
/// modification time.
///
/// A snapshot is reused only while the file's modification time matches the
/// one recorded at insertion; a changed file misses and is reloaded.
#[derive(Debug, Default)]
pub struct MetadataCache<P> {
    entries: BTreeMap<PathBuf, (SystemTime, Arc<P>)>,
}

impl<P> MetadataCache<P> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The cached snapshot for `path`, if its modification time still
    /// matches.
    pub fn get(&self, path: &Path) -> Option<Arc<P>> {
        let (recorded, snapshot) = self.entries.get(path)?;
        let current = std::fs::metadata(path).ok()?.modified().ok()?;
        (current == *recorded).then(|| snapshot.clone())
    }

    /// Record a snapshot for `path` at its current modification time.
    pub fn insert(&mut self, path: impl Into<PathBuf>, snapshot: P) -> CifResult<Arc<P>> {
        let path = path.into();
        let mtime = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(|err| CifError::io(format!("failed to stat {}: {}", path.display(), err)))?;
        let snapshot = Arc::new(snapshot);
        self.entries.insert(path, (mtime, snapshot.clone()));
        Ok(snapshot)
    }

    /// The cached snapshot for `path`, loading and recording it on a miss.
    pub fn get_or_load<F>(&mut self, path: impl AsRef<Path>, load: F) -> CifResult<Arc<P>>
    where
        F: FnOnce() -> CifResult<P>,
    {
        if let Some(hit) = self.get(path.as_ref()) {
            return Ok(hit);
        }
        self.insert(path.as_ref().to_path_buf(), load()?)
    }

    /// Number of cached snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached snapshots.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ==================== StaticMetadata tests ====================

    #[test]
    fn test_static_metadata_keys() {
        let meta = StaticMetadata::new().with_keys("entity", ["id"]);
        assert_eq!(meta.category_keys("entity"), vec!["id".to_string()]);
        assert!(meta.category_keys("unknown").is_empty());
    }

    #[test]
    fn test_static_metadata_links() {
        let meta = StaticMetadata::new().with_link("struct_asym", "entity", "id", "entity_id");
        let links = meta.parent_links("struct_asym");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].parent_category, "entity");
        assert_eq!(links[0].child_item, "entity_id");
        assert!(meta.parent_links("entity").is_empty());
    }

    // ==================== LinkMap tests ====================

    #[test]
    fn test_link_map_builder() {
        let map = LinkMap::new().with_link("struct_asym", "entity_id", "entity");
        assert_eq!(map.len(), 1);
        let link = map.iter().next().unwrap();
        assert_eq!(link.child_category, "struct_asym");
        assert_eq!(link.parent_category, "entity");
    }

    #[test]
    fn test_from_provider_uses_dictionary_links() {
        let meta = StaticMetadata::new().with_link("struct_asym", "entity", "id", "entity_id");
        let map = LinkMap::from_provider(&meta, &["entity", "struct_asym"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.iter().next().unwrap().link_item, "entity_id");
    }

    #[test]
    fn test_fallback_applies_only_without_dictionary_link() {
        // No dictionary links at all: struct_asym falls back.
        let empty = StaticMetadata::new();
        let map = LinkMap::from_provider(&empty, &["entity", "struct_asym"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.iter().next().unwrap().parent_category, "entity");
    }

    #[test]
    fn test_fallback_never_overrides_dictionary_link() {
        let meta = StaticMetadata::new().with_link("struct_asym", "pdbx_entity", "id", "entity_id");
        let map = LinkMap::from_provider(&meta, &["entity", "struct_asym"]);
        let parents: Vec<&str> = map.iter().map(|l| l.parent_category.as_str()).collect();
        assert_eq!(parents, vec!["pdbx_entity"]);
    }

    #[test]
    fn test_fallback_skips_absent_categories() {
        let empty = StaticMetadata::new();
        let map = LinkMap::from_provider(&empty, &["entity"]);
        assert!(map.is_empty());
    }

    // ==================== MetadataCache tests ====================

    #[test]
    fn test_cache_hit_while_mtime_matches() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"dictionary").unwrap();
        file.flush().unwrap();

        let mut cache: MetadataCache<StaticMetadata> = MetadataCache::new();
        let mut loads = 0;
        let _ = cache
            .get_or_load(file.path(), || {
                loads += 1;
                Ok(StaticMetadata::new())
            })
            .unwrap();
        let _ = cache
            .get_or_load(file.path(), || {
                loads += 1;
                Ok(StaticMetadata::new())
            })
            .unwrap();
        assert_eq!(loads, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_get_unknown_path() {
        let cache: MetadataCache<StaticMetadata> = MetadataCache::new();
        assert!(cache.get(Path::new("/nonexistent")).is_none());
    }

    #[test]
    fn test_cache_insert_missing_file_fails() {
        let mut cache: MetadataCache<StaticMetadata> = MetadataCache::new();
        let err = cache
            .insert("/this/path/does/not/exist", StaticMetadata::new())
            .unwrap_err();
        assert_eq!(err.kind, crate::error::CifErrorKind::Io);
    }

    #[test]
    fn test_cache_clear() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x").unwrap();
        file.flush().unwrap();

        let mut cache: MetadataCache<StaticMetadata> = MetadataCache::new();
        cache.insert(file.path(), StaticMetadata::new()).unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
