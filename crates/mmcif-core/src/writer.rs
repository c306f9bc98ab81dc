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

//! Value-level mmCIF emission.
//!
//! Categories with any multi-valued item are written as a `loop_`; the rest
//! as simple `_category.item value` pairs. Emission forces one bulk
//! materialization per item through the same cached path every bulk reader
//! uses. The round trip is value-level, not byte-exact.

use crate::error::{CifError, CifResult};
use crate::model::{Category, CifDocument};
use std::io::Write;

/// Write a document as mmCIF text.
pub fn write_document<W: Write>(out: &mut W, doc: &CifDocument) -> CifResult<()> {
    emit_document(out, doc).map_err(|err| CifError::io(format!("write failed: {}", err)))
}

/// Render a document as an mmCIF string.
pub fn write_string(doc: &CifDocument) -> CifResult<String> {
    let mut buf = Vec::new();
    write_document(&mut buf, doc)?;
    String::from_utf8(buf)
        .map_err(|err| CifError::conversion(format!("emitted text is not UTF-8: {}", err)))
}

fn emit_document<W: Write>(out: &mut W, doc: &CifDocument) -> std::io::Result<()> {
    for block in doc.iter() {
        writeln!(out, "data_{}", block.name())?;
        writeln!(out, "#")?;
        for category in block.iter() {
            emit_category(out, category)?;
            writeln!(out, "#")?;
        }
    }
    Ok(())
}

fn emit_category<W: Write>(out: &mut W, category: &Category) -> std::io::Result<()> {
    let looped = category.items().any(|item| item.len() > 1);
    if looped {
        writeln!(out, "loop_")?;
        for item in category.items() {
            writeln!(out, "_{}.{}", category.name(), item.name())?;
        }
        for index in 0..category.row_count() {
            let mut line = String::new();
            for item in category.items() {
                line.push_str(&format_value(item.get(index).unwrap_or("")));
            }
            writeln!(out, "{}", line.trim_end())?;
        }
    } else {
        for item in category.items() {
            for value in item.values() {
                if needs_multiline(value) {
                    writeln!(out, "_{}.{} ;", category.name(), item.name())?;
                    writeln!(out, "{}", value.trim())?;
                    writeln!(out, ";")?;
                } else {
                    writeln!(
                        out,
                        "_{}.{} {}",
                        category.name(),
                        item.name(),
                        format_value(value).trim_end()
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn needs_multiline(value: &str) -> bool {
    value.contains('\n') || value.starts_with(' ') || value.starts_with(';')
}

/// Format one value for emission, with a trailing separator space.
fn format_value(value: &str) -> String {
    if needs_multiline(value) {
        format!("\n;{}\n;\n", value.trim())
    } else if value.is_empty() {
        "'' ".to_string()
    } else if value.contains(' ')
        || value.starts_with('_')
        || value.starts_with('\'')
        || value.starts_with('"')
    {
        format!("'{}' ", value)
    } else {
        format!("{} ", value)
    }
}
