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

//! Lazily bootstrapped metadata records.
//!
//! A [`MetadataSource`] resolves the file holding a record, asks its
//! [`BootstrappingGuard`] to load that file once, and reads the record back
//! from a [`CompositeMetadataContainer`].

mod calling_codes;
mod container;
mod errors;
mod file_name_provider;
mod guard;
mod loader;
mod parser;
mod source;

pub use calling_codes::CallingCodeRegistry;
pub use container::{CompositeMetadataContainer, KeyProvider, MapBackedMetadataContainer};
pub use errors::{MetadataError, ParseError, Result};
pub use file_name_provider::{
    FileNameProvider, MultiFileModeFileNameProvider, SingleFileModeFileNameProvider,
};
pub use guard::BootstrappingGuard;
pub use loader::{DirectoryMetadataLoader, StaticMetadataLoader};
pub use parser::ProtoMetadataParser;
pub use source::MetadataSource;
