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

//! Prefix-keyed description tables used for geocoding and carrier lookups.

mod data_io;
mod errors;
mod mapping_file_provider;
mod phone_prefix_map;
mod prefix_file_reader;
mod storage;
mod text_format;

pub use errors::{PrefixMapError, Result};
pub use mapping_file_provider::MappingFileProvider;
pub use phone_prefix_map::PhonePrefixMap;
pub use prefix_file_reader::{PrefixFileReader, CONFIG_FILE_NAME};
pub use storage::{DefaultMapStorage, FlyweightMapStorage, PhonePrefixMapStorage};
pub use text_format::parse_prefixes;
