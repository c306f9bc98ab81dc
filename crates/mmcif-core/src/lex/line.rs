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

//! Line classification.
//!
//! Classification applies prefix rules in a fixed priority order and falls
//! back to the parser's loop/multiline context for everything else. The
//! prefix rules win over context: a `data_` header inside an unterminated
//! multiline value still starts a new block.

/// The role of one input line, given the current parser context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `#` comment, ignored.
    Comment,
    /// `data_<name>` block header.
    BlockHeader,
    /// `loop_` header; resets the declared tag list.
    LoopHeader,
    /// Line starting with `_`: an inline `tag value` pair, a bare loop tag,
    /// or the opener of a multiline value.
    ItemLine,
    /// Data line inside an open loop.
    LoopRow,
    /// Body line of an open multiline value.
    Continuation,
    /// Terminator of a multiline value (the line is exactly `;`).
    MultilineEnd,
    /// Anything else: blank or out-of-context, ignored.
    Ignored,
}

/// Classify one line.
///
/// `in_loop` is true once a `loop_` header has been seen in the current
/// block; `in_multiline` is true while a `;` block opened outside a loop is
/// unterminated. Loop-scoped multiline state is handled by the loop-row
/// consumer, so it does not participate here.
pub fn classify(line: &str, in_loop: bool, in_multiline: bool) -> LineKind {
    if line.starts_with('#') {
        LineKind::Comment
    } else if line.starts_with("data_") {
        LineKind::BlockHeader
    } else if line.starts_with("loop_") {
        LineKind::LoopHeader
    } else if line.starts_with('_') {
        LineKind::ItemLine
    } else if in_loop {
        LineKind::LoopRow
    } else if in_multiline {
        if line == ";" {
            LineKind::MultilineEnd
        } else {
            LineKind::Continuation
        }
    } else {
        LineKind::Ignored
    }
}
