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

use std::{fmt::Debug, hash::Hash, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};
use log::warn;

use crate::{
    i18n::RegionCode, interfaces::MetadataContainer, proto_gen::phonemetadata::PhoneMetadata,
};

/// Derives the lookup key of a record.
pub type KeyProvider<K> = fn(&PhoneMetadata) -> K;

/// A write-once map from a key derived from each record to the record.
pub struct MapBackedMetadataContainer<K> {
    metadata: DashMap<K, Arc<PhoneMetadata>>,
    key_provider: KeyProvider<K>,
}

impl MapBackedMetadataContainer<String> {
    pub fn by_region_code() -> Self {
        Self::new(|metadata| metadata.id().to_owned())
    }
}

impl MapBackedMetadataContainer<i32> {
    pub fn by_country_calling_code() -> Self {
        Self::new(|metadata| metadata.country_code())
    }
}

impl<K: Eq + Hash + Debug> MapBackedMetadataContainer<K> {
    pub fn new(key_provider: KeyProvider<K>) -> Self {
        Self { metadata: DashMap::new(), key_provider }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<Arc<PhoneMetadata>>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.metadata.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

impl<K: Eq + Hash + Debug + Send + Sync> MetadataContainer for MapBackedMetadataContainer<K> {
    fn accept(&self, metadata: Arc<PhoneMetadata>) {
        match self.metadata.entry((self.key_provider)(&metadata)) {
            Entry::Occupied(entry) => {
                warn!("Duplicate metadata for key {:?}, keeping the first record", entry.key());
            }
            Entry::Vacant(entry) => {
                entry.insert(metadata);
            }
        }
    }
}

/// Keeps region records and non-geographical records apart, keyed by
/// region code and by calling code respectively.
pub struct CompositeMetadataContainer {
    by_region: MapBackedMetadataContainer<String>,
    by_calling_code: MapBackedMetadataContainer<i32>,
}

impl CompositeMetadataContainer {
    pub fn new() -> Self {
        Self {
            by_region: MapBackedMetadataContainer::by_region_code(),
            by_calling_code: MapBackedMetadataContainer::by_country_calling_code(),
        }
    }

    pub fn get_metadata_by_region_code(&self, region_code: &str) -> Option<Arc<PhoneMetadata>> {
        self.by_region.get(region_code)
    }

    pub fn get_metadata_by_calling_code(&self, calling_code: i32) -> Option<Arc<PhoneMetadata>> {
        self.by_calling_code.get(&calling_code)
    }
}

impl Default for CompositeMetadataContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataContainer for CompositeMetadataContainer {
    fn accept(&self, metadata: Arc<PhoneMetadata>) {
        if RegionCode::is_non_geo(metadata.id()) {
            self.by_calling_code.accept(metadata);
        } else {
            self.by_region.accept(metadata);
        }
    }
}
