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

use std::num::ParseIntError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrefixMapError>;

#[derive(Debug, Error)]
pub enum PrefixMapError {
    #[error("IO error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid modified UTF-8 string")]
    MalformedUtf,

    #[error("String of {0} encoded bytes does not fit a 16-bit length")]
    StringTooLong(usize),

    #[error("Invalid word size {0}, expected 2 or 4")]
    InvalidWordSize(i32),

    #[error("Negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },

    #[error("Prefix {0} does not fit a signed 32-bit integer")]
    PrefixOutOfRange(u32),

    #[error("Prefixes are not strictly increasing at entry {0}")]
    UnsortedPrefixes(usize),

    #[error("Description index {index} is out of range for a pool of {pool_len}")]
    DescriptionIndexOutOfRange { index: u32, pool_len: usize },

    #[error("Line {line_num} is too long (max is {max_len} bytes)")]
    LineTooLong { line_num: usize, max_len: usize },

    #[error("Failed to parse prefix '{prefix}': {source}")]
    PrefixParseError {
        prefix: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Missing prefix data resource: {file}")]
    MissingResource { file: String },

    #[error("Malformed prefix data in {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: Box<PrefixMapError>,
    },
}

impl PrefixMapError {
    pub(crate) fn in_file(self, file: &str) -> Self {
        PrefixMapError::Malformed { file: file.to_owned(), source: Box::new(self) }
    }
}
