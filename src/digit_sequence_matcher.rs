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

use log::{error, trace};

use crate::{
    interfaces::MatcherApi,
    matcher::{match_digits, DigitSequence, MatchResult},
    proto_gen::phonemetadata::PhoneNumberDesc,
};

/// Matches national numbers by running the compiled program stored in
/// `national_number_matcher_data`. Holds no state, so one instance can be
/// shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitSequenceMatcher;

impl DigitSequenceMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl MatcherApi for DigitSequenceMatcher {
    fn match_national_number(
        &self,
        number: &str,
        number_desc: &PhoneNumberDesc,
        allow_prefix_match: bool,
    ) -> bool {
        let program = number_desc.national_number_matcher_data();
        if program.is_empty() {
            return false;
        }
        let digits = match DigitSequence::parse(number) {
            Ok(digits) => digits,
            Err(err) => {
                error!("National number '{}' is not a digit sequence: {}", number, err);
                return false;
            }
        };
        match match_digits(program, digits.rewound()) {
            MatchResult::Matched => true,
            MatchResult::TooLong => allow_prefix_match,
            _ if allow_prefix_match && has_matching_prefix(program, &digits) => true,
            result => {
                trace!("National number '{}' did not match: {:?}", number, result);
                false
            }
        }
    }
}

/// Whether some proper leading part of `digits` is a full match. Covers
/// inputs that pass an accepting state and then diverge.
fn has_matching_prefix(program: &[u8], digits: &DigitSequence<'_>) -> bool {
    let values: Vec<u8> = digits.rewound().collect();
    (0..values.len()).rev().any(|len| {
        DigitSequence::from_digits(&values[..len])
            .is_ok_and(|prefix| match_digits(program, prefix) == MatchResult::Matched)
    })
}
