// Copyright (C) 2025 Kashin Vladislav (Rust adaptation author)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The textual source format of prefix maps: one `prefix|description` per
//! line, `#` starts a comment.

use std::{collections::BTreeMap, io::BufRead};

use super::errors::{PrefixMapError, Result};

const MAX_LINE_LENGTH: usize = 2 * 1024;

pub fn parse_prefixes<R: BufRead>(mut reader: R) -> Result<BTreeMap<u32, String>> {
    let mut prefixes = BTreeMap::new();
    let mut line_buffer = String::with_capacity(MAX_LINE_LENGTH);
    let mut line_number = 0;

    loop {
        line_number += 1;
        line_buffer.clear();

        let bytes_read = reader.read_line(&mut line_buffer)?;
        if bytes_read == 0 {
            break;
        }
        if bytes_read > MAX_LINE_LENGTH {
            return Err(PrefixMapError::LineTooLong {
                line_num: line_number,
                max_len: MAX_LINE_LENGTH,
            });
        }

        let line = line_buffer.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((prefix_str, desc)) = line.split_once('|') {
            if prefix_str.is_empty() {
                continue;
            }
            let prefix_code = prefix_str.parse().map_err(|e| PrefixMapError::PrefixParseError {
                prefix: prefix_str.to_string(),
                source: e,
            })?;
            prefixes.insert(prefix_code, desc.to_string());
        }
    }

    Ok(prefixes)
}
