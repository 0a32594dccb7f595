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

use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, trace};
use parking_lot::Mutex;

use super::{
    errors::{PrefixMapError, Result},
    mapping_file_provider::MappingFileProvider,
    phone_prefix_map::PhonePrefixMap,
};
use crate::interfaces::MetadataLoader;

/// Name of the file listing the available data files.
pub const CONFIG_FILE_NAME: &str = "config";

/// NANPA data is split by area code, the file key for +1 numbers is
/// `1000 + area code`.
const NANPA_COUNTRY_CODE: i32 = 1;
const NANPA_SUBSCRIBER_DIVISOR: u64 = 10_000_000;

/// Loads prefix maps lazily, one file per calling code and language, and
/// looks up descriptions in them.
pub struct PrefixFileReader {
    loader: Arc<dyn MetadataLoader>,
    mapping_file_provider: MappingFileProvider,
    available_phone_prefix_maps: DashMap<String, Arc<PhonePrefixMap>>,
    load_lock: Mutex<()>,
}

impl PrefixFileReader {
    /// Reads the mapping file named [`CONFIG_FILE_NAME`] through `loader`.
    pub fn new(loader: Arc<dyn MetadataLoader>) -> Result<Self> {
        let bytes = loader
            .load_metadata(CONFIG_FILE_NAME)
            .ok_or_else(|| PrefixMapError::MissingResource { file: CONFIG_FILE_NAME.to_owned() })?;
        let mapping_file_provider = MappingFileProvider::read_from(&mut bytes.as_ref())
            .map_err(|err| err.in_file(CONFIG_FILE_NAME))?;
        Ok(Self::with_mapping_file_provider(loader, mapping_file_provider))
    }

    pub fn with_mapping_file_provider(
        loader: Arc<dyn MetadataLoader>,
        mapping_file_provider: MappingFileProvider,
    ) -> Self {
        Self {
            loader,
            mapping_file_provider,
            available_phone_prefix_maps: DashMap::new(),
            load_lock: Mutex::new(()),
        }
    }

    pub fn mapping_file_provider(&self) -> &MappingFileProvider {
        &self.mapping_file_provider
    }

    /// Returns the map for the key in the best matching language, or `None`
    /// when no file covers it.
    pub fn get_phone_prefix_descriptions(
        &self,
        prefix_map_key: i32,
        language: &str,
        script: &str,
        region: &str,
    ) -> Result<Option<Arc<PhonePrefixMap>>> {
        let Some(file_name) =
            self.mapping_file_provider.get_file_name(prefix_map_key, language, script, region)
        else {
            return Ok(None);
        };
        if let Some(map) = self.available_phone_prefix_maps.get(&file_name) {
            return Ok(Some(map.clone()));
        }
        let _lock = self.load_lock.lock();
        if let Some(map) = self.available_phone_prefix_maps.get(&file_name) {
            trace!("Prefix map {} was loaded by another thread", file_name);
            return Ok(Some(map.clone()));
        }
        let map = Arc::new(self.load_phone_prefix_map(&file_name)?);
        self.available_phone_prefix_maps.insert(file_name, map.clone());
        Ok(Some(map))
    }

    fn load_phone_prefix_map(&self, file_name: &str) -> Result<PhonePrefixMap> {
        let bytes = self
            .loader
            .load_metadata(file_name)
            .ok_or_else(|| PrefixMapError::MissingResource { file: file_name.to_owned() })?;
        let map =
            PhonePrefixMap::read_from(&mut bytes.as_ref()).map_err(|err| err.in_file(file_name))?;
        debug!("Loaded prefix map {} with {} entries", file_name, map.len());
        Ok(map)
    }

    /// Returns the description of the number in the requested language,
    /// falling back to English except for Chinese, Japanese and Korean.
    /// An empty string means no description is known.
    pub fn get_description_for_number(
        &self,
        country_calling_code: i32,
        national_significant_number: &str,
        language: &str,
        script: &str,
        region: &str,
    ) -> Result<String> {
        let Some(prefix_map_key) = prefix_map_key(country_calling_code, national_significant_number)
        else {
            trace!("'{}' is not a national significant number", national_significant_number);
            return Ok(String::new());
        };
        let lookup = |map: Option<Arc<PhonePrefixMap>>| {
            map.and_then(|map| {
                map.lookup(country_calling_code, national_significant_number).map(str::to_owned)
            })
            .filter(|description| !description.is_empty())
        };

        let descriptions = self.get_phone_prefix_descriptions(prefix_map_key, language, script, region)?;
        if let Some(description) = lookup(descriptions) {
            return Ok(description);
        }
        if !may_fall_back_to_english(language) {
            return Ok(String::new());
        }
        let english = self.get_phone_prefix_descriptions(prefix_map_key, "en", "", "")?;
        Ok(lookup(english).unwrap_or_default())
    }
}

fn prefix_map_key(country_calling_code: i32, national_significant_number: &str) -> Option<i32> {
    if country_calling_code != NANPA_COUNTRY_CODE {
        return Some(country_calling_code);
    }
    let national_number: u64 = national_significant_number.parse().ok()?;
    i32::try_from(national_number / NANPA_SUBSCRIBER_DIVISOR).ok()?.checked_add(1000)
}

fn may_fall_back_to_english(language: &str) -> bool {
    // Don't fall back to English if the requested language is among the following:
    // - Chinese
    // - Japanese
    // - Korean
    !matches!(language, "zh" | "ja" | "ko")
}

#[cfg(test)]
mod tests {
    use std::{
        borrow::Cow,
        collections::{BTreeMap, BTreeSet, HashMap},
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    use super::*;

    fn map_bytes(entries: &[(u32, &str)]) -> Vec<u8> {
        let map: BTreeMap<u32, String> =
            entries.iter().map(|(prefix, text)| (*prefix, text.to_string())).collect();
        let mut bytes: Vec<u8> = Vec::new();
        PhonePrefixMap::build(&map).unwrap().write_to(&mut bytes).unwrap();
        bytes
    }

    struct CountingLoader {
        files: HashMap<String, Vec<u8>>,
        calls: AtomicUsize,
    }

    impl MetadataLoader for CountingLoader {
        fn load_metadata(&self, file_name: &str) -> Option<Cow<'static, [u8]>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.files.get(file_name).cloned().map(Cow::Owned)
        }
    }

    fn loader() -> Arc<CountingLoader> {
        let mut available = BTreeMap::new();
        available.insert(1650, BTreeSet::from(["en".to_owned(), "de".to_owned()]));
        available.insert(1212, BTreeSet::from(["en".to_owned()]));
        available.insert(86, BTreeSet::from(["en".to_owned(), "zh".to_owned()]));
        available.insert(44, BTreeSet::from(["en".to_owned()]));
        let mut config: Vec<u8> = Vec::new();
        MappingFileProvider::from_sorted_map(&available).write_to(&mut config).unwrap();

        let files = HashMap::from([
            ("config".to_owned(), config),
            ("1650_en".to_owned(), map_bytes(&[(1650, "California"), (1650345, "San Mateo, CA")])),
            ("1650_de".to_owned(), map_bytes(&[(1650, "Kalifornien"), (1650345, "")])),
            ("86_en".to_owned(), map_bytes(&[(8610, "Beijing")])),
            ("86_zh".to_owned(), map_bytes(&[(8620, "广州")])),
        ]);
        Arc::new(CountingLoader { files, calls: AtomicUsize::new(0) })
    }

    #[test]
    fn nanpa_numbers_are_keyed_by_area_code() {
        assert_eq!(prefix_map_key(1, "6503451234"), Some(1650));
        assert_eq!(prefix_map_key(1, "2125551234"), Some(1212));
        assert_eq!(prefix_map_key(44, "2070313000"), Some(44));
        assert_eq!(prefix_map_key(1, "65a"), None);
    }

    #[test]
    fn looks_up_in_the_requested_language() {
        let reader = PrefixFileReader::new(loader()).unwrap();
        assert_eq!(reader.get_description_for_number(1, "6503451234", "en", "", "").unwrap(), "San Mateo, CA");
        assert_eq!(reader.get_description_for_number(1, "6502531234", "de", "", "").unwrap(), "Kalifornien");
        assert_eq!(reader.get_description_for_number(86, "2012345678", "zh", "", "").unwrap(), "广州");
    }

    #[test]
    fn falls_back_to_english_unless_cjk() {
        let reader = PrefixFileReader::new(loader()).unwrap();
        // Empty German description.
        assert_eq!(reader.get_description_for_number(1, "6503451234", "de", "", "").unwrap(), "San Mateo, CA");
        // No French file at all.
        assert_eq!(reader.get_description_for_number(1, "6502531234", "fr", "", "").unwrap(), "California");
        // No Chinese entry, and no fallback for Chinese.
        assert_eq!(reader.get_description_for_number(86, "1012345678", "zh", "", "").unwrap(), "");
        assert_eq!(reader.get_description_for_number(86, "1012345678", "en", "", "").unwrap(), "Beijing");
    }

    #[test]
    fn unknown_numbers_give_an_empty_description() {
        let reader = PrefixFileReader::new(loader()).unwrap();
        assert_eq!(reader.get_description_for_number(7, "4951234567", "en", "", "").unwrap(), "");
        assert_eq!(reader.get_description_for_number(1, "3105551234", "en", "", "").unwrap(), "");
    }

    #[test]
    fn missing_files_are_errors_and_retried() {
        let loader = loader();
        let reader = PrefixFileReader::new(loader.clone()).unwrap();
        for _ in 0..2 {
            assert!(matches!(
                reader.get_description_for_number(1, "2125551234", "en", "", ""),
                Err(PrefixMapError::MissingResource { file }) if file == "1212_en"
            ));
        }
        // config plus two attempts
        assert_eq!(loader.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn maps_are_loaded_once() {
        let loader = loader();
        let reader = PrefixFileReader::new(loader.clone()).unwrap();
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let description =
                        reader.get_description_for_number(1, "6503451234", "en", "", "").unwrap();
                    assert_eq!(description, "San Mateo, CA");
                });
            }
        });
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_or_corrupt_config_is_reported() {
        let empty = Arc::new(CountingLoader { files: HashMap::new(), calls: AtomicUsize::new(0) });
        assert!(matches!(
            PrefixFileReader::new(empty),
            Err(PrefixMapError::MissingResource { file }) if file == CONFIG_FILE_NAME
        ));
        let corrupt = Arc::new(CountingLoader {
            files: HashMap::from([("config".to_owned(), vec![0, 0, 0, 1, 0])]),
            calls: AtomicUsize::new(0),
        });
        assert!(matches!(
            PrefixFileReader::new(corrupt),
            Err(PrefixMapError::Malformed { file, .. }) if file == CONFIG_FILE_NAME
        ));
    }
}
