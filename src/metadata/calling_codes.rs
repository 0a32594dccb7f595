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

use std::collections::{BTreeMap, HashMap};

use crate::i18n::RegionCode;

/// Which regions share each country calling code. Non-geographical
/// entities are listed under [`RegionCode::get_non_geo`].
#[derive(Debug, Clone, Default)]
pub struct CallingCodeRegistry {
    regions_by_code: BTreeMap<i32, Vec<String>>,
    code_by_region: HashMap<String, i32>,
}

impl CallingCodeRegistry {
    /// The first region listed for a code is its main country.
    pub fn new<I, R, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i32, R)>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for (calling_code, regions) in entries {
            let regions: Vec<String> = regions.into_iter().map(Into::into).collect();
            for region in &regions {
                if !RegionCode::is_non_geo(region) {
                    registry.code_by_region.entry(region.clone()).or_insert(calling_code);
                }
            }
            registry.regions_by_code.entry(calling_code).or_default().extend(regions);
        }
        registry
    }

    pub fn get_region_codes_for_country_code(&self, calling_code: i32) -> &[String] {
        self.regions_by_code.get(&calling_code).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get_country_code_for_region(&self, region_code: &str) -> Option<i32> {
        self.code_by_region.get(region_code).copied()
    }

    pub fn is_known_calling_code(&self, calling_code: i32) -> bool {
        self.regions_by_code.contains_key(&calling_code)
    }

    /// A calling code is geographical when it is known and not shared with
    /// the non-geographical entity.
    pub fn is_geo_entity(&self, calling_code: i32) -> bool {
        self.regions_by_code
            .get(&calling_code)
            .is_some_and(|regions| !regions.iter().any(|r| RegionCode::is_non_geo(r)))
    }

    pub fn supported_regions(&self) -> impl Iterator<Item = &str> {
        self.code_by_region.keys().map(String::as_str)
    }

    pub fn supported_global_network_calling_codes(&self) -> impl Iterator<Item = i32> + '_ {
        self.regions_by_code
            .iter()
            .filter(|(_, regions)| regions.iter().any(|r| RegionCode::is_non_geo(r)))
            .map(|(code, _)| *code)
    }
}
