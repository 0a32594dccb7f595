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

//! Small hand-built metadata records shared by the tests.

use protobuf::{Message, MessageField};

use crate::{
    matcher::compile,
    proto_gen::phonemetadata::{PhoneMetadata, PhoneMetadataCollection, PhoneNumberDesc},
};

pub(crate) fn region(id: &str, country_code: i32) -> PhoneMetadata {
    let mut metadata = PhoneMetadata::new();
    metadata.set_id(id.to_owned());
    metadata.set_country_code(country_code);
    metadata
}

pub(crate) fn non_geo(country_code: i32) -> PhoneMetadata {
    region("001", country_code)
}

/// A description carrying both the regex and the compiled program.
pub(crate) fn desc(pattern: &str, possible_lengths: &[i32]) -> MessageField<PhoneNumberDesc> {
    let mut desc = PhoneNumberDesc::new();
    desc.set_national_number_pattern(pattern.to_owned());
    desc.set_national_number_matcher_data(
        compile(pattern).expect("test pattern should compile").as_bytes().to_vec(),
    );
    desc.possible_length = possible_lengths.to_vec();
    MessageField::some(desc)
}

/// A cut-down US record: NANPA area codes, toll free 8xx, premium 900.
pub(crate) fn us() -> PhoneMetadata {
    let mut metadata = region("US", 1);
    metadata.general_desc = desc(r"[2-9]\d{9}", &[10]);
    metadata.fixed_line = desc(r"[2-9]\d{9}", &[]);
    metadata.mobile = desc(r"[2-9]\d{9}", &[]);
    metadata.toll_free = desc(r"8[0-8]{2}[2-9]\d{6}", &[]);
    metadata.premium_rate = desc(r"900[2-9]\d{6}", &[]);
    metadata.set_same_mobile_and_fixed_line_pattern(true);
    metadata
}

/// A cut-down GB record with distinct fixed-line and mobile ranges.
pub(crate) fn gb() -> PhoneMetadata {
    let mut metadata = region("GB", 44);
    metadata.general_desc = desc(r"[1-9]\d{9}", &[10]);
    metadata.fixed_line = desc(r"[12]\d{9}", &[]);
    metadata.mobile = desc(r"7[1-9]\d{8}", &[]);
    metadata.voip = desc(r"56\d{8}", &[]);
    metadata
}

/// The international freephone service.
pub(crate) fn freephone() -> PhoneMetadata {
    let mut metadata = non_geo(800);
    metadata.general_desc = desc(r"\d{8}", &[8]);
    metadata.toll_free = desc(r"\d{8}", &[]);
    metadata
}

pub(crate) fn collection_bytes(records: &[PhoneMetadata]) -> Vec<u8> {
    let mut collection = PhoneMetadataCollection::new();
    collection.metadata = records.to_vec();
    collection.write_to_bytes().expect("test metadata should serialize")
}
