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

//! The two in-memory layouts of a prefix map.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::{Read, Write},
};

use super::{
    data_io::{DataInput, DataOutput},
    errors::{PrefixMapError, Result},
};

/// Number of decimal digits of a prefix.
fn prefix_length(prefix: u32) -> u32 {
    prefix.checked_ilog10().map_or(1, |log| log + 1)
}

fn possible_lengths(map: &BTreeMap<u32, String>) -> Vec<u32> {
    map.keys()
        .map(|prefix| prefix_length(*prefix))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn check_prefix(prefix: u32) -> Result<i32> {
    i32::try_from(prefix).map_err(|_| PrefixMapError::PrefixOutOfRange(prefix))
}

fn read_prefix<R: Read + ?Sized>(reader: &mut R, entry: usize, previous: Option<u32>) -> Result<u32> {
    let prefix = u32::try_from(reader.read_i32_be()?)
        .map_err(|_| PrefixMapError::UnsortedPrefixes(entry))?;
    if previous.is_some_and(|previous| previous >= prefix) {
        return Err(PrefixMapError::UnsortedPrefixes(entry));
    }
    Ok(prefix)
}

fn write_lengths<W: Write + ?Sized>(writer: &mut W, lengths: &[u32]) -> Result<()> {
    writer.write_count(lengths.len())?;
    for length in lengths {
        writer.write_i32_be(*length as i32)?;
    }
    Ok(())
}

fn read_lengths<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u32>> {
    let count = reader.read_count("possible length")?;
    let mut lengths = Vec::with_capacity(count.min(16));
    for _ in 0..count {
        let length = reader.read_i32_be()?;
        lengths.push(
            u32::try_from(length)
                .map_err(|_| PrefixMapError::NegativeCount { what: "prefix length", count: length })?,
        );
    }
    lengths.sort_unstable();
    lengths.dedup();
    Ok(lengths)
}

/// Flat parallel arrays, one description per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMapStorage {
    prefixes: Vec<u32>,
    descriptions: Vec<String>,
    possible_lengths: Vec<u32>,
}

impl DefaultMapStorage {
    pub fn from_sorted_map(map: &BTreeMap<u32, String>) -> Result<Self> {
        for prefix in map.keys() {
            check_prefix(*prefix)?;
        }
        Ok(Self {
            prefixes: map.keys().copied().collect(),
            descriptions: map.values().cloned().collect(),
            possible_lengths: possible_lengths(map),
        })
    }

    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let entries = reader.read_count("entry")?;
        let mut prefixes = Vec::with_capacity(entries.min(1 << 16));
        let mut descriptions = Vec::with_capacity(entries.min(1 << 16));
        for entry in 0..entries {
            prefixes.push(read_prefix(reader, entry, prefixes.last().copied())?);
            descriptions.push(reader.read_utf()?);
        }
        let possible_lengths = read_lengths(reader)?;
        Ok(Self { prefixes, descriptions, possible_lengths })
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_count(self.prefixes.len())?;
        for (prefix, description) in self.prefixes.iter().zip(&self.descriptions) {
            writer.write_i32_be(check_prefix(*prefix)?)?;
            writer.write_utf(description)?;
        }
        write_lengths(writer, &self.possible_lengths)
    }
}

/// A fixed width array of unsigned values, two bytes per value when the
/// largest one fits a positive `i16`, four otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Words {
    Short(Vec<u16>),
    Int(Vec<u32>),
}

impl Words {
    fn from_values(values: Vec<u32>) -> Self {
        if values.iter().all(|value| *value <= i16::MAX as u32) {
            Words::Short(values.into_iter().map(|value| value as u16).collect())
        } else {
            Words::Int(values)
        }
    }

    fn word_size(&self) -> i32 {
        match self {
            Words::Short(_) => 2,
            Words::Int(_) => 4,
        }
    }

    fn get(&self, index: usize) -> u32 {
        match self {
            Words::Short(words) => words[index] as u32,
            Words::Int(words) => words[index],
        }
    }

    /// Keeps the word size found in the input.
    fn with_word_size(word_size: i32, values: Vec<u32>) -> Result<Self> {
        match word_size {
            2 => Ok(Words::Short(values.into_iter().map(|value| value as u16).collect())),
            4 => Ok(Words::Int(values)),
            size => Err(PrefixMapError::InvalidWordSize(size)),
        }
    }

    fn write_word<W: Write + ?Sized>(&self, writer: &mut W, index: usize) -> Result<()> {
        match self {
            Words::Short(words) => writer.write_u16_be(words[index]),
            Words::Int(words) => writer.write_i32_be(words[index] as i32),
        }
    }

    fn len(&self) -> usize {
        match self {
            Words::Short(words) => words.len(),
            Words::Int(words) => words.len(),
        }
    }
}

fn read_word<R: Read + ?Sized>(reader: &mut R, word_size: i32) -> Result<u32> {
    match word_size {
        2 => Ok(reader.read_u16_be()? as u32),
        4 => Ok(reader.read_i32_be()? as u32),
        size => Err(PrefixMapError::InvalidWordSize(size)),
    }
}

/// Distinct descriptions are stored once, entries refer to them by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlyweightMapStorage {
    prefixes: Words,
    description_indexes: Words,
    description_pool: Vec<String>,
    possible_lengths: Vec<u32>,
}

impl FlyweightMapStorage {
    pub fn from_sorted_map(map: &BTreeMap<u32, String>) -> Result<Self> {
        for prefix in map.keys() {
            check_prefix(*prefix)?;
        }
        let description_pool: Vec<String> =
            map.values().collect::<BTreeSet<_>>().into_iter().cloned().collect();
        let description_indexes = map
            .values()
            .map(|description| {
                // The pool is sorted and holds every description.
                description_pool.binary_search(description).unwrap_or_default() as u32
            })
            .collect();
        Ok(Self {
            prefixes: Words::from_values(map.keys().copied().collect()),
            description_indexes: Words::from_values(description_indexes),
            description_pool,
            possible_lengths: possible_lengths(map),
        })
    }

    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let prefix_word_size = reader.read_i32_be()?;
        let index_word_size = reader.read_i32_be()?;
        if let Some(size) = [prefix_word_size, index_word_size].into_iter().find(|size| *size != 2 && *size != 4) {
            return Err(PrefixMapError::InvalidWordSize(size));
        }
        let possible_lengths = read_lengths(reader)?;
        let pool_len = reader.read_count("description pool")?;
        let mut description_pool = Vec::with_capacity(pool_len.min(1 << 16));
        for _ in 0..pool_len {
            description_pool.push(reader.read_utf()?);
        }

        let entries = reader.read_count("entry")?;
        let mut prefixes: Vec<u32> = Vec::with_capacity(entries.min(1 << 16));
        let mut description_indexes = Vec::with_capacity(entries.min(1 << 16));
        for entry in 0..entries {
            let prefix = read_word(reader, prefix_word_size)?;
            if prefixes.last().is_some_and(|previous| *previous >= prefix) {
                return Err(PrefixMapError::UnsortedPrefixes(entry));
            }
            let index = read_word(reader, index_word_size)?;
            if index as usize >= pool_len {
                return Err(PrefixMapError::DescriptionIndexOutOfRange { index, pool_len });
            }
            prefixes.push(prefix);
            description_indexes.push(index);
        }
        Ok(Self {
            prefixes: Words::with_word_size(prefix_word_size, prefixes)?,
            description_indexes: Words::with_word_size(index_word_size, description_indexes)?,
            description_pool,
            possible_lengths,
        })
    }

    /// Pool before entries, each entry as its prefix word followed by its
    /// description index word.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32_be(self.prefixes.word_size())?;
        writer.write_i32_be(self.description_indexes.word_size())?;
        write_lengths(writer, &self.possible_lengths)?;
        writer.write_count(self.description_pool.len())?;
        for description in &self.description_pool {
            writer.write_utf(description)?;
        }
        writer.write_count(self.num_of_entries())?;
        for entry in 0..self.num_of_entries() {
            self.prefixes.write_word(writer, entry)?;
            self.description_indexes.write_word(writer, entry)?;
        }
        Ok(())
    }

    fn num_of_entries(&self) -> usize {
        self.prefixes.len()
    }

    /// Size in bytes of each prefix word.
    pub fn prefix_word_size(&self) -> i32 {
        self.prefixes.word_size()
    }

    pub fn description_pool(&self) -> &[String] {
        &self.description_pool
    }
}

/// Storage behind a [`PhonePrefixMap`](super::PhonePrefixMap). Both
/// variants answer the same queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhonePrefixMapStorage {
    Default(DefaultMapStorage),
    Flyweight(FlyweightMapStorage),
}

impl PhonePrefixMapStorage {
    pub fn num_of_entries(&self) -> usize {
        match self {
            Self::Default(storage) => storage.prefixes.len(),
            Self::Flyweight(storage) => storage.num_of_entries(),
        }
    }

    /// `index` must be below [`num_of_entries`](Self::num_of_entries).
    pub fn get_prefix(&self, index: usize) -> u32 {
        match self {
            Self::Default(storage) => storage.prefixes[index],
            Self::Flyweight(storage) => storage.prefixes.get(index),
        }
    }

    /// `index` must be below [`num_of_entries`](Self::num_of_entries).
    pub fn get_description(&self, index: usize) -> &str {
        match self {
            Self::Default(storage) => &storage.descriptions[index],
            Self::Flyweight(storage) => {
                &storage.description_pool[storage.description_indexes.get(index) as usize]
            }
        }
    }

    /// Distinct prefix lengths in ascending order.
    pub fn possible_lengths(&self) -> &[u32] {
        match self {
            Self::Default(storage) => &storage.possible_lengths,
            Self::Flyweight(storage) => &storage.possible_lengths,
        }
    }

    pub fn is_flyweight(&self) -> bool {
        matches!(self, Self::Flyweight(_))
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::Default(storage) => storage.write_to(writer),
            Self::Flyweight(storage) => storage.write_to(writer),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        (0..self.num_of_entries()).map(|i| (self.get_prefix(i), self.get_description(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<u32, String> {
        BTreeMap::from([
            (331402, "Paris".to_owned()),
            (331434, "Paris".to_owned()),
            (334, "Ile-de-France".to_owned()),
            (33149, "Paris".to_owned()),
        ])
    }

    #[test]
    fn flyweight_interns_descriptions() {
        let storage = FlyweightMapStorage::from_sorted_map(&sample()).unwrap();
        assert_eq!(storage.description_pool(), ["Ile-de-France", "Paris"]);
        assert_eq!(storage.prefix_word_size(), 4);
        let storage = PhonePrefixMapStorage::Flyweight(storage);
        assert_eq!(storage.num_of_entries(), 4);
        assert_eq!(storage.possible_lengths(), [3, 5, 6]);
        assert_eq!(storage.get_prefix(0), 334);
        assert_eq!(storage.get_description(1), "Paris");
    }

    #[test]
    fn small_prefixes_use_short_words() {
        let map = BTreeMap::from([(1, "a".to_owned()), (32767, "b".to_owned())]);
        assert_eq!(FlyweightMapStorage::from_sorted_map(&map).unwrap().prefix_word_size(), 2);
        let map = BTreeMap::from([(32768, "a".to_owned())]);
        assert_eq!(FlyweightMapStorage::from_sorted_map(&map).unwrap().prefix_word_size(), 4);
    }

    #[test]
    fn default_layout_is_entry_by_entry() {
        let map = BTreeMap::from([(1201, "NJ".to_owned())]);
        let mut out: Vec<u8> = Vec::new();
        DefaultMapStorage::from_sorted_map(&map).unwrap().write_to(&mut out).unwrap();
        assert_eq!(
            out,
            [0, 0, 0, 1, 0, 0, 0x04, 0xB1, 0, 2, b'N', b'J', 0, 0, 0, 1, 0, 0, 0, 4]
        );
    }

    #[test]
    fn flyweight_layout_interleaves_entry_words_after_pool() {
        let map = BTreeMap::from([(12, "x".to_owned()), (13, "y".to_owned())]);
        let mut out: Vec<u8> = Vec::new();
        FlyweightMapStorage::from_sorted_map(&map).unwrap().write_to(&mut out).unwrap();
        assert_eq!(
            out,
            [
                0, 0, 0, 2, // prefix word size
                0, 0, 0, 2, // index word size
                0, 0, 0, 1, 0, 0, 0, 2, // lengths
                0, 0, 0, 2, 0, 1, b'x', 0, 1, b'y', // pool
                0, 0, 0, 2, // entries
                0, 12, 0, 0, // 12 -> "x"
                0, 13, 0, 1, // 13 -> "y"
            ]
        );
        let read = FlyweightMapStorage::read_from(&mut out.as_slice()).unwrap();
        assert_eq!(read, FlyweightMapStorage::from_sorted_map(&map).unwrap());
    }

    #[test]
    fn rejects_corrupt_input() {
        // Unsorted prefixes.
        let bytes = [0, 0, 0, 2, 0, 0, 0, 5, 0, 1, b'a', 0, 0, 0, 4, 0, 1, b'b'];
        assert!(matches!(
            DefaultMapStorage::read_from(&mut bytes.as_slice()),
            Err(PrefixMapError::UnsortedPrefixes(1))
        ));
        // Word size 3.
        let bytes = [0, 0, 0, 3, 0, 0, 0, 2];
        assert!(matches!(
            FlyweightMapStorage::read_from(&mut bytes.as_slice()),
            Err(PrefixMapError::InvalidWordSize(3))
        ));
        // Unsorted flyweight entries.
        let bytes = [
            0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, b'a', 0, 0, 0, 2, 0, 9, 0, 0, 0, 8,
            0, 0,
        ];
        assert!(matches!(
            FlyweightMapStorage::read_from(&mut bytes.as_slice()),
            Err(PrefixMapError::UnsortedPrefixes(1))
        ));
        // Index past the pool.
        let bytes = [0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 7, 0, 1];
        assert!(matches!(
            FlyweightMapStorage::read_from(&mut bytes.as_slice()),
            Err(PrefixMapError::DescriptionIndexOutOfRange { index: 1, pool_len: 0 })
        ));
        // Prefix that does not fit an i32.
        let map = BTreeMap::from([(u32::MAX, "x".to_owned())]);
        assert!(matches!(
            DefaultMapStorage::from_sorted_map(&map),
            Err(PrefixMapError::PrefixOutOfRange(u32::MAX))
        ));
    }
}
