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

use std::{
    collections::BTreeMap,
    fmt,
    io::{Read, Write},
};

use log::trace;

use super::{
    data_io::{DataInput, DataOutput},
    errors::Result,
    storage::{DefaultMapStorage, FlyweightMapStorage, PhonePrefixMapStorage},
};

/// An immutable map from number prefixes to descriptions, answering
/// longest-prefix lookups.
///
/// The storage layout is picked when the map is built: the flyweight layout
/// is used only when it serializes strictly smaller than the default one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonePrefixMap {
    storage: PhonePrefixMapStorage,
}

impl PhonePrefixMap {
    pub fn build(sorted_prefix_map: &BTreeMap<u32, String>) -> Result<Self> {
        let default = DefaultMapStorage::from_sorted_map(sorted_prefix_map)?;
        if sorted_prefix_map.is_empty() {
            return Ok(Self { storage: PhonePrefixMapStorage::Default(default) });
        }
        let flyweight = FlyweightMapStorage::from_sorted_map(sorted_prefix_map)?;
        let default_size = serialized_size(|out| default.write_to(out))?;
        let flyweight_size = serialized_size(|out| flyweight.write_to(out))?;
        trace!(
            "Prefix map of {} entries: default {} bytes, flyweight {} bytes",
            sorted_prefix_map.len(),
            default_size,
            flyweight_size
        );
        let storage = if flyweight_size < default_size {
            PhonePrefixMapStorage::Flyweight(flyweight)
        } else {
            PhonePrefixMapStorage::Default(default)
        };
        Ok(Self { storage })
    }

    pub fn storage(&self) -> &PhonePrefixMapStorage {
        &self.storage
    }

    pub fn is_empty(&self) -> bool {
        self.storage.num_of_entries() == 0
    }

    pub fn len(&self) -> usize {
        self.storage.num_of_entries()
    }

    /// Looks up the description of the longest prefix of the calling code
    /// followed by the national significant number.
    pub fn lookup(&self, country_calling_code: i32, national_significant_number: &str) -> Option<&str> {
        let mut buf = itoa::Buffer::new();
        let digits =
            fast_cat::concat_str!(buf.format(country_calling_code), national_significant_number);
        self.lookup_digits(&digits)
    }

    /// Looks up the description of the longest prefix of `digits`. Only exact
    /// prefix hits count.
    pub fn lookup_digits(&self, digits: &str) -> Option<&str> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            trace!("'{}' is not a plain digit string", digits);
            return None;
        }
        let mut end = self.storage.num_of_entries().checked_sub(1)?;
        for &length in self.storage.possible_lengths().iter().rev() {
            let candidate = &digits[..digits.len().min(length as usize)];
            // A candidate above every stored prefix can not hit, a shorter one still may.
            let Ok(candidate) = candidate.parse::<u32>() else {
                continue;
            };
            end = self.binary_search(end, candidate)?;
            if self.storage.get_prefix(end) == candidate {
                return Some(self.storage.get_description(end));
            }
        }
        None
    }

    /// Index of the largest prefix in `0..=end` that is not above `value`.
    fn binary_search(&self, end: usize, value: u32) -> Option<usize> {
        let (mut low, mut high) = (0usize, end + 1);
        while low < high {
            let mid = low + (high - low) / 2;
            if self.storage.get_prefix(mid) <= value {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low.checked_sub(1)
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_bool(self.storage.is_flyweight())?;
        self.storage.write_to(writer)
    }

    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let storage = if reader.read_bool()? {
            PhonePrefixMapStorage::Flyweight(FlyweightMapStorage::read_from(reader)?)
        } else {
            PhonePrefixMapStorage::Default(DefaultMapStorage::read_from(reader)?)
        };
        Ok(Self { storage })
    }
}

fn serialized_size(write: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> Result<usize> {
    let mut out = Vec::new();
    write(&mut out)?;
    Ok(out.len())
}

impl fmt::Display for PhonePrefixMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (prefix, description) in self.storage.entries() {
            writeln!(f, "{prefix}|{description}")?;
        }
        Ok(())
    }
}
