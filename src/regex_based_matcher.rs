// Copyright (C) 2009 The Libphonenumber Authors
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

use log::error;

use crate::{
    interfaces,
    proto_gen::phonemetadata::PhoneNumberDesc,
    regexp_cache::{InvalidRegexError, RegexCache},
};

const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Matches national numbers against the regular expressions in the metadata.
pub struct RegexBasedMatcher {
    cache: RegexCache,
}

impl RegexBasedMatcher {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self { cache: RegexCache::with_capacity(capacity) }
    }

    pub fn cache(&self) -> &RegexCache {
        &self.cache
    }

    fn match_number(
        &self,
        phone_number: &str,
        number_pattern: &str,
        allow_prefix_match: bool,
    ) -> Result<bool, InvalidRegexError> {
        // Anchoring is part of the cache key, a pattern used both ways is
        // cached twice.
        let anchored = if allow_prefix_match {
            fast_cat::concat_str!("^(?:", number_pattern, ")")
        } else {
            fast_cat::concat_str!("^(?:", number_pattern, ")$")
        };
        Ok(self.cache.get_regex(&anchored)?.is_match(phone_number))
    }
}

impl Default for RegexBasedMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl interfaces::MatcherApi for RegexBasedMatcher {
    fn match_national_number(
        &self,
        number: &str,
        number_desc: &PhoneNumberDesc,
        allow_prefix_match: bool,
    ) -> bool {
        let national_number_pattern = number_desc.national_number_pattern();
        // We don't want to consider it a prefix match when matching non-empty input
        // against an empty pattern.
        if national_number_pattern.is_empty() {
            return false;
        }
        match self.match_number(number, national_number_pattern, allow_prefix_match) {
            Ok(res) => res,
            Err(err) => {
                error!("Invalid regex! {}: {}", national_number_pattern, err);
                false
            }
        }
    }
}
