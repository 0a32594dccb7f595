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

use std::borrow::Cow;

use super::errors::{MetadataError, Result};

/// Maps a metadata key (region code or calling code) to the file that holds
/// its record.
pub trait FileNameProvider: Send + Sync {
    fn get_for(&self, key: &str) -> Result<Cow<'_, str>>;
}

/// Every record lives in one file.
#[derive(Debug, Clone)]
pub struct SingleFileModeFileNameProvider {
    file_name: String,
}

impl SingleFileModeFileNameProvider {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into() }
    }
}

impl FileNameProvider for SingleFileModeFileNameProvider {
    fn get_for(&self, _key: &str) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(&self.file_name))
    }
}

/// One file per key, named `<base>_<key>`.
#[derive(Debug, Clone)]
pub struct MultiFileModeFileNameProvider {
    base: String,
}

impl MultiFileModeFileNameProvider {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl FileNameProvider for MultiFileModeFileNameProvider {
    fn get_for(&self, key: &str) -> Result<Cow<'_, str>> {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(MetadataError::ContractViolation(fast_cat::concat_str!(
                "Invalid metadata key: '", key, "'"
            )));
        }
        Ok(Cow::Owned(fast_cat::concat_str!(&self.base, "_", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_file_names_are_suffixed_with_the_key() {
        let provider = MultiFileModeFileNameProvider::new("/data/PhoneNumberMetadataProto");
        assert_eq!(provider.get_for("US").unwrap(), "/data/PhoneNumberMetadataProto_US");
        assert_eq!(provider.get_for("800").unwrap(), "/data/PhoneNumberMetadataProto_800");
    }

    #[test]
    fn multi_file_rejects_non_alphanumeric_keys() {
        let provider = MultiFileModeFileNameProvider::new("base");
        for key in ["", "../US", "U S", "1_2"] {
            assert!(matches!(provider.get_for(key), Err(MetadataError::ContractViolation(_))));
        }
    }

    #[test]
    fn single_file_ignores_the_key() {
        let provider = SingleFileModeFileNameProvider::new("all_metadata");
        assert_eq!(provider.get_for("US").unwrap(), "all_metadata");
        assert_eq!(provider.get_for("882").unwrap(), "all_metadata");
    }
}
