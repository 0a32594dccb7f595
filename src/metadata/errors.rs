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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetadataError>;

#[derive(Debug, Error)]
pub enum MetadataError {
    /// The loader has nothing for this file. Usually a packaging mistake.
    #[error("Missing metadata resource: {file}")]
    MissingResource { file: String },
    #[error("Malformed metadata in {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: ParseError,
    },
    #[error("{0}")]
    ContractViolation(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    /// A strict parser was handed no input at all.
    #[error("Metadata source is null")]
    NullSource,
    #[error("Failed to decode metadata collection: {0}")]
    Protobuf(#[from] protobuf::Error),
    #[error("Metadata collection is empty")]
    EmptyMetadata,
}
