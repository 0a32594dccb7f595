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
    collections::{BTreeMap, BTreeSet},
    fmt,
    io::{Read, Write},
};

use super::{
    data_io::{DataInput, DataOutput},
    errors::Result,
};

/// Locales whose data is shared under another file name.
const LOCALE_NORMALIZATION_MAP: [(&str, &str); 3] =
    [("zh_TW", "zh_Hant"), ("zh_HK", "zh_Hant"), ("zh_MO", "zh_Hant")];

/// Lists the languages that prefix data is available in for each calling
/// code, and turns a request into a data file name such as `86_zh_Hant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingFileProvider {
    country_calling_codes: Vec<i32>,
    available_languages: Vec<BTreeSet<String>>,
}

impl MappingFileProvider {
    pub fn from_sorted_map(available_data_files: &BTreeMap<i32, BTreeSet<String>>) -> Self {
        Self {
            country_calling_codes: available_data_files.keys().copied().collect(),
            available_languages: available_data_files.values().cloned().collect(),
        }
    }

    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let entries = reader.read_count("calling code")?;
        let mut available_data_files = BTreeMap::new();
        for _ in 0..entries {
            let country_calling_code = reader.read_i32_be()?;
            let languages = reader.read_count("language")?;
            let mut set = BTreeSet::new();
            for _ in 0..languages {
                set.insert(reader.read_utf()?);
            }
            available_data_files.insert(country_calling_code, set);
        }
        Ok(Self::from_sorted_map(&available_data_files))
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_count(self.country_calling_codes.len())?;
        for (code, languages) in self.country_calling_codes.iter().zip(&self.available_languages) {
            writer.write_i32_be(*code)?;
            writer.write_count(languages.len())?;
            for language in languages {
                writer.write_utf(language)?;
            }
        }
        Ok(())
    }

    /// Returns the name of the file holding descriptions for the calling code
    /// in the best matching language, or `None` if there is no such file.
    pub fn get_file_name(
        &self,
        country_calling_code: i32,
        language: &str,
        script: &str,
        region: &str,
    ) -> Option<String> {
        if language.is_empty() {
            return None;
        }
        let index = self.country_calling_codes.binary_search(&country_calling_code).ok()?;
        let languages = &self.available_languages[index];
        let language_code = find_best_matching_language_code(languages, language, script, region)?;
        let mut buf = itoa::Buffer::new();
        Some(fast_cat::concat_str!(buf.format(country_calling_code), "_", language_code))
    }
}

fn find_best_matching_language_code<'a>(
    languages: &'a BTreeSet<String>,
    language: &str,
    script: &str,
    region: &str,
) -> Option<&'a str> {
    let lookup = |code: &str| languages.get(code).map(String::as_str);

    let full_locale = construct_full_locale(language, script, region);
    let normalized = LOCALE_NORMALIZATION_MAP
        .iter()
        .find(|(locale, _)| *locale == full_locale)
        .and_then(|(_, normalized)| lookup(*normalized));
    if normalized.is_some() {
        return normalized;
    }
    if let Some(code) = lookup(&full_locale) {
        return Some(code);
    }
    if script.is_empty() != region.is_empty() {
        return lookup(language);
    }
    if !script.is_empty() && !region.is_empty() {
        return lookup(&fast_cat::concat_str!(language, "_", script))
            .or_else(|| lookup(&fast_cat::concat_str!(language, "_", region)))
            .or_else(|| lookup(language));
    }
    None
}

fn construct_full_locale(language: &str, script: &str, region: &str) -> String {
    let mut locale = String::with_capacity(language.len() + script.len() + region.len() + 2);
    locale.push_str(language);
    for part in [script, region] {
        if !part.is_empty() {
            locale.push('_');
            locale.push_str(part);
        }
    }
    locale
}

impl fmt::Display for MappingFileProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (code, languages) in self.country_calling_codes.iter().zip(&self.available_languages) {
            write!(f, "{code}|")?;
            for language in languages {
                write!(f, "{language},")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
