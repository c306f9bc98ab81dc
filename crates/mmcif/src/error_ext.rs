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

//! Error context helpers.
//!
//! Extension methods for `Result` that annotate errors with context as they
//! propagate, converting foreign error types on the way.
//!
//! ```rust
//! use mmcif::{parse_file, CifResultExt};
//!
//! fn load(path: &str) -> Result<mmcif::CifDocument, mmcif::CifError> {
//!     parse_file(path).with_context(|| format!("while loading {}", path))
//! }
//! ```

use crate::CifError;
use std::fmt;

/// Extension trait adding context to results carrying [`CifError`]-compatible
/// errors.
pub trait CifResultExt<T> {
    /// Add context to an error. Existing context is kept; new context is
    /// prepended.
    fn context<C>(self, context: C) -> Result<T, CifError>
    where
        C: fmt::Display;

    /// Add context lazily; the closure runs only on the error path.
    fn with_context<C, F>(self, f: F) -> Result<T, CifError>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

fn add_context(mut error: CifError, new_context: String) -> CifError {
    if new_context.is_empty() {
        return error;
    }
    error.context = Some(match error.context {
        Some(existing) => format!("{}; {}", new_context, existing),
        None => new_context,
    });
    error
}

impl<T> CifResultExt<T> for Result<T, CifError> {
    fn context<C>(self, context: C) -> Result<T, CifError>
    where
        C: fmt::Display,
    {
        self.map_err(|err| add_context(err, context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, CifError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|err| add_context(err, f().to_string()))
    }
}

impl<T> CifResultExt<T> for Result<T, std::io::Error> {
    fn context<C>(self, context: C) -> Result<T, CifError>
    where
        C: fmt::Display,
    {
        self.map_err(|err| add_context(CifError::io(err.to_string()), context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, CifError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|err| add_context(CifError::io(err.to_string()), f().to_string()))
    }
}

impl<T> CifResultExt<T> for Result<T, serde_json::Error> {
    fn context<C>(self, context: C) -> Result<T, CifError>
    where
        C: fmt::Display,
    {
        self.map_err(|err| add_context(CifError::conversion(err.to_string()), context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, CifError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|err| add_context(CifError::conversion(err.to_string()), f().to_string()))
    }
}
