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

mod interfaces;
/// This module is automatically generated from /resources/*.proto
mod proto_gen;
mod regexp_cache;
mod regex_based_matcher;
mod digit_sequence_matcher;
pub mod classifier;
pub mod i18n;
pub mod matcher;
pub mod metadata;
pub mod prefixmapper;

#[cfg(test)]
mod tests;

pub use interfaces::{MatcherApi, MetadataContainer, MetadataLoader, MetadataParser};
pub use proto_gen::phonemetadata::{PhoneMetadata, PhoneMetadataCollection, PhoneNumberDesc};
pub use regexp_cache::{InvalidRegexError, RegexCache};
pub use regex_based_matcher::RegexBasedMatcher;
pub use digit_sequence_matcher::DigitSequenceMatcher;
pub use classifier::{NumberTypeClassifier, PhoneNumberType};
