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

use log::warn;

use super::{
    calling_codes::CallingCodeRegistry,
    container::CompositeMetadataContainer,
    errors::{MetadataError, Result},
    file_name_provider::FileNameProvider,
    guard::BootstrappingGuard,
};
use crate::{
    i18n::RegionCode,
    interfaces::{MetadataLoader, MetadataParser},
    proto_gen::phonemetadata::PhoneMetadata,
};

/// Lazily loaded phone number metadata for regions and non-geographical
/// entities.
///
/// Owned by the host application, there is no process-wide instance.
pub struct MetadataSource {
    file_name_provider: Box<dyn FileNameProvider>,
    guard: BootstrappingGuard<CompositeMetadataContainer>,
    registry: CallingCodeRegistry,
}

impl MetadataSource {
    pub fn new(
        file_name_provider: impl FileNameProvider + 'static,
        loader: Arc<dyn MetadataLoader>,
        parser: Arc<dyn MetadataParser>,
        registry: CallingCodeRegistry,
    ) -> Self {
        Self {
            file_name_provider: Box::new(file_name_provider),
            guard: BootstrappingGuard::new(loader, parser, CompositeMetadataContainer::new()),
            registry,
        }
    }

    pub fn registry(&self) -> &CallingCodeRegistry {
        &self.registry
    }

    /// Returns `Ok(None)` for a region that has no calling code.
    pub fn get_metadata_for_region(&self, region_code: &str) -> Result<Option<Arc<PhoneMetadata>>> {
        if RegionCode::is_non_geo(region_code) {
            return Err(MetadataError::ContractViolation(fast_cat::concat_str!(
                region_code, " region code is a non-geo entity"
            )));
        }
        if self.registry.get_country_code_for_region(region_code).is_none() {
            warn!("Invalid or unknown region code provided: {}", region_code);
            return Ok(None);
        }
        let file_name = self.file_name_provider.get_for(region_code)?;
        Ok(self.guard.get_or_bootstrap(&file_name)?.get_metadata_by_region_code(region_code))
    }

    /// Returns `Ok(None)` for calling codes that nothing is registered under.
    pub fn get_metadata_for_non_geographical_region(
        &self,
        country_calling_code: i32,
    ) -> Result<Option<Arc<PhoneMetadata>>> {
        if self.registry.is_geo_entity(country_calling_code) {
            let mut buf = itoa::Buffer::new();
            return Err(MetadataError::ContractViolation(fast_cat::concat_str!(
                buf.format(country_calling_code),
                " calling code belongs to a geo entity"
            )));
        }
        if !self.registry.is_known_calling_code(country_calling_code) {
            warn!(
                "Unknown country calling code for a non-geographical entity provided: {}",
                country_calling_code
            );
            return Ok(None);
        }
        let mut buf = itoa::Buffer::new();
        let file_name = self.file_name_provider.get_for(buf.format(country_calling_code))?;
        Ok(self
            .guard
            .get_or_bootstrap(&file_name)?
            .get_metadata_by_calling_code(country_calling_code))
    }

    /// Picks the non-geographical lookup when `region_code` is the
    /// non-geo marker, the regional one otherwise.
    pub fn get_metadata_for_region_or_calling_code(
        &self,
        country_calling_code: i32,
        region_code: &str,
    ) -> Result<Option<Arc<PhoneMetadata>>> {
        if RegionCode::is_non_geo(region_code) {
            self.get_metadata_for_non_geographical_region(country_calling_code)
        } else {
            self.get_metadata_for_region(region_code)
        }
    }
}
