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

use std::{borrow::Cow, sync::Arc};

use crate::{
    metadata::ParseError,
    proto_gen::phonemetadata::{PhoneMetadata, PhoneNumberDesc},
};

/// Internal phonenumber matching API used to isolate the underlying
/// implementation of the matcher and allow different implementations to be
/// swapped in easily.
pub trait MatcherApi: Send + Sync {
    /// Returns whether the given national number (a string containing only decimal
    /// digits) matches the national number pattern defined in the given
    /// PhoneNumberDesc message.
    fn match_national_number(
        &self,
        number: &str,
        number_desc: &PhoneNumberDesc,
        allow_prefix_match: bool,
    ) -> bool;
}

/// Source of raw metadata bytes, keyed by file name.
pub trait MetadataLoader: Send + Sync {
    /// Returns the contents of `file_name`, or `None` when there is no such
    /// resource.
    fn load_metadata(&self, file_name: &str) -> Option<Cow<'static, [u8]>>;
}

/// Turns raw bytes into metadata records.
pub trait MetadataParser: Send + Sync {
    /// `None` stands for a source that could not be opened at all. Whether
    /// that is an error depends on the parser's strictness.
    fn parse(&self, source: Option<&[u8]>) -> Result<Vec<PhoneMetadata>, ParseError>;
}

/// Write-once storage for parsed records.
pub trait MetadataContainer: Send + Sync {
    /// Stores the record under its key. A key that is already present keeps
    /// its first record.
    fn accept(&self, metadata: Arc<PhoneMetadata>);
}
