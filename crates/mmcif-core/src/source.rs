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

//! Shared read-only source buffer and byte spans.
//!
//! One parse produces one [`Source`] (a memory-mapped file or an owned byte
//! buffer), shared by reference count across every lazily stored value
//! derived from it. Values record `(start, end)` byte spans and decode on
//! access; the mapping is released when the last handle drops.

use crate::error::{CifError, CifResult};
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// A `(start, end)` byte range into the shared source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Byte offset of the first byte of the value.
    pub start: usize,
    /// Byte offset one past the last byte of the value.
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// Read-only source buffer backing lazily decoded values.
pub struct Source {
    backing: Backing,
}

/// Reference-counted handle to a [`Source`].
pub type SourceHandle = Arc<Source>;

impl Source {
    /// Memory-map a file read-only.
    ///
    /// Empty files cannot be mapped and fall back to an empty owned buffer.
    pub fn map_file(path: impl AsRef<Path>) -> CifResult<SourceHandle> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| CifError::io(format!("failed to open {}: {}", path.display(), err)))?;
        let len = file
            .metadata()
            .map_err(|err| CifError::io(format!("failed to stat {}: {}", path.display(), err)))?
            .len();
        if len == 0 {
            return Ok(Arc::new(Self {
                backing: Backing::Owned(Vec::new()),
            }));
        }
        let mmap = unsafe {
            Mmap::map(&file)
                .map_err(|err| CifError::io(format!("failed to map {}: {}", path.display(), err)))?
        };
        Ok(Arc::new(Self {
            backing: Backing::Mapped(mmap),
        }))
    }

    /// Wrap an owned byte buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> SourceHandle {
        Arc::new(Self {
            backing: Backing::Owned(bytes),
        })
    }

    /// The raw bytes of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(bytes) => bytes,
        }
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Decode one span: UTF-8 with surrounding whitespace trimmed.
    ///
    /// Malformed bytes and out-of-range spans decode to the empty string
    /// rather than failing.
    pub fn decode(&self, span: Span) -> &str {
        let bytes = match self.as_bytes().get(span.start..span.end) {
            Some(bytes) => bytes,
            None => return "",
        };
        match std::str::from_utf8(bytes) {
            Ok(text) => text.trim(),
            Err(_) => "",
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.backing {
            Backing::Mapped(_) => "mapped",
            Backing::Owned(_) => "owned",
        };
        f.debug_struct("Source")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}
