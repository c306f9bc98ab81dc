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

//! Error types for mmCIF parsing and data access.
//!
//! Line-level grammar problems are handled leniently inside the parser and
//! never surface as errors; the error type here covers the strict read path
//! (missing blocks, categories, items, rows), I/O, resolver-boundary failures
//! and format conversion.

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CifErrorKind {
    /// Structurally unusable input (e.g. the source is not valid UTF-8).
    Syntax,
    /// Read access to a block, category, item or row that does not exist.
    NotFound,
    /// Relationship resolution failed at the resolver boundary.
    Resolve,
    /// Error while converting to another representation (JSON, text output).
    Conversion,
    /// I/O error (file open, memory map, write).
    Io,
}

impl fmt::Display for CifErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "SyntaxError"),
            Self::NotFound => write!(f, "NotFoundError"),
            Self::Resolve => write!(f, "ResolveError"),
            Self::Conversion => write!(f, "ConversionError"),
            Self::Io => write!(f, "IOError"),
        }
    }
}

/// An error raised by mmCIF parsing or data access.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct CifError {
    /// The kind of error.
    pub kind: CifErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Line number (1-based, 0 when not line-related).
    pub line: usize,
    /// Column number (1-based, optional).
    pub column: Option<usize>,
    /// Additional context (e.g. "while resolving block X").
    pub context: Option<String>,
}

impl CifError {
    /// Create a new error.
    pub fn new(kind: CifErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: 0,
            column: None,
            context: None,
        }
    }

    /// Add line information.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Add column information.
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Add context information.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Convenience constructors for each error kind

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::new(CifErrorKind::Syntax, message).with_line(line)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CifErrorKind::NotFound, message)
    }

    pub fn resolve(message: impl Into<String>) -> Self {
        Self::new(CifErrorKind::Resolve, message)
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::new(CifErrorKind::Conversion, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(CifErrorKind::Io, message)
    }
}

/// Result type for mmCIF operations.
pub type CifResult<T> = Result<T, CifError>;
