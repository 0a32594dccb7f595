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

use std::collections::HashSet;

use log::trace;
use strum::IntoEnumIterator;

use super::enums::PhoneNumberType;
use crate::{
    digit_sequence_matcher::DigitSequenceMatcher,
    interfaces::MatcherApi,
    proto_gen::phonemetadata::{PhoneMetadata, PhoneNumberDesc},
};

/// Returns the description for a number type, `None` when the metadata does
/// not carry one.
pub fn get_number_desc_by_type(
    metadata: &PhoneMetadata,
    phone_number_type: PhoneNumberType,
) -> Option<&PhoneNumberDesc> {
    let desc = match phone_number_type {
        PhoneNumberType::PremiumRate => &metadata.premium_rate,
        PhoneNumberType::TollFree => &metadata.toll_free,
        PhoneNumberType::Mobile => &metadata.mobile,
        PhoneNumberType::FixedLine | PhoneNumberType::FixedLineOrMobile => &metadata.fixed_line,
        PhoneNumberType::SharedCost => &metadata.shared_cost,
        PhoneNumberType::VoIP => &metadata.voip,
        PhoneNumberType::PersonalNumber => &metadata.personal_number,
        PhoneNumberType::Pager => &metadata.pager,
        PhoneNumberType::UAN => &metadata.uan,
        PhoneNumberType::VoiceMail => &metadata.voicemail,
        PhoneNumberType::Unknown => &metadata.general_desc,
    };
    desc.as_ref()
}

pub fn desc_has_possible_number_data(desc: &PhoneNumberDesc) -> bool {
    // If this is empty, it means numbers of this type inherit from the "general
    // desc" -> the value "-1" means that no numbers exist for this type.
    desc.possible_length.len() != 1 || desc.possible_length.first().is_some_and(|l| *l != -1)
}

pub fn desc_has_data(desc: &PhoneNumberDesc) -> bool {
    // possible_length_local_only alone does not make a type usable.
    desc.has_example_number()
        || desc_has_possible_number_data(desc)
        || desc.has_national_number_pattern()
        || desc.has_national_number_matcher_data()
}

/// Returns the types we have metadata for. Never contains
/// `FixedLineOrMobile` or `Unknown`.
pub fn get_supported_types_for_metadata(metadata: &PhoneMetadata) -> HashSet<PhoneNumberType> {
    PhoneNumberType::iter()
        .filter(|number_type| {
            !matches!(number_type, PhoneNumberType::FixedLineOrMobile | PhoneNumberType::Unknown)
        })
        .filter(|number_type| {
            get_number_desc_by_type(metadata, *number_type).is_some_and(desc_has_data)
        })
        .collect()
}

/// Works out the type of a national significant number from the metadata
/// of its region.
pub struct NumberTypeClassifier {
    matcher_api: Box<dyn MatcherApi>,
}

impl NumberTypeClassifier {
    pub fn new(matcher_api: impl MatcherApi + 'static) -> Self {
        Self { matcher_api: Box::new(matcher_api) }
    }

    pub fn get_number_type(&self, national_number: &str, metadata: &PhoneMetadata) -> PhoneNumberType {
        if !self.is_number_matching_desc(national_number, metadata.general_desc.as_ref()) {
            trace!("Number '{national_number}' type unknown - doesn't match general national number pattern");
            return PhoneNumberType::Unknown;
        }
        const EXCLUSIVE_TYPES: [PhoneNumberType; 8] = [
            PhoneNumberType::PremiumRate,
            PhoneNumberType::TollFree,
            PhoneNumberType::SharedCost,
            PhoneNumberType::VoIP,
            PhoneNumberType::PersonalNumber,
            PhoneNumberType::Pager,
            PhoneNumberType::UAN,
            PhoneNumberType::VoiceMail,
        ];
        for number_type in EXCLUSIVE_TYPES {
            if self.is_number_matching_desc(national_number, get_number_desc_by_type(metadata, number_type)) {
                trace!("Number '{national_number}' is of type {number_type:?}");
                return number_type;
            }
        }

        let is_fixed_line = self.is_number_matching_desc(national_number, metadata.fixed_line.as_ref());
        if is_fixed_line {
            if metadata.same_mobile_and_fixed_line_pattern() {
                trace!("Number '{national_number}': fixed-line and mobile patterns equal, \
                        number is fixed-line or mobile");
                return PhoneNumberType::FixedLineOrMobile;
            } else if self.is_number_matching_desc(national_number, metadata.mobile.as_ref()) {
                trace!("Number '{national_number}': Fixed-line and mobile patterns differ, but number is \
                        still fixed-line or mobile");
                return PhoneNumberType::FixedLineOrMobile;
            }
            trace!("Number '{national_number}' is a fixed line number.");
            return PhoneNumberType::FixedLine;
        }
        // Otherwise, test to see if the number is mobile. Only do this if certain
        // that the patterns for mobile and fixed line aren't the same.
        if !metadata.same_mobile_and_fixed_line_pattern()
            && self.is_number_matching_desc(national_number, metadata.mobile.as_ref())
        {
            trace!("Number '{national_number}' is a mobile number.");
            return PhoneNumberType::Mobile;
        }
        trace!("Number '{national_number}' type unknown - doesn't match any specific number type pattern.");
        PhoneNumberType::Unknown
    }

    pub fn is_number_matching_desc(
        &self,
        national_number: &str,
        number_desc: Option<&PhoneNumberDesc>,
    ) -> bool {
        let Some(number_desc) = number_desc else {
            return false;
        };
        // Check if any possible number lengths are present; if so, we use them to
        // avoid checking the validation pattern if they don't match. If they are
        // absent, this means they match the general description, which we have
        // already checked before checking a specific number type.
        let actual_length = national_number.len() as i32;
        if !number_desc.possible_length.is_empty()
            && !number_desc.possible_length.contains(&actual_length)
        {
            return false;
        }
        self.matcher_api.match_national_number(national_number, number_desc, false)
    }

    pub fn is_valid_number_for_metadata(&self, national_number: &str, metadata: &PhoneMetadata) -> bool {
        self.get_number_type(national_number, metadata) != PhoneNumberType::Unknown
    }
}

impl Default for NumberTypeClassifier {
    fn default() -> Self {
        Self::new(DigitSequenceMatcher::new())
    }
}
