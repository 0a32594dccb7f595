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

use dashmap::DashSet;
use log::{debug, trace};
use parking_lot::Mutex;

use super::errors::{MetadataError, Result};
use crate::interfaces::{MetadataContainer, MetadataLoader, MetadataParser};

/// Loads each metadata file into a shared container at most once.
///
/// Lookups of files that are already loaded only touch a concurrent set.
/// The first request for a file takes the bootstrap lock, checks again and
/// then runs the loader and the parser. A failed load leaves the file
/// unmarked, so the next request tries again.
pub struct BootstrappingGuard<C> {
    loader: Arc<dyn MetadataLoader>,
    parser: Arc<dyn MetadataParser>,
    container: C,
    loaded_files: DashSet<String>,
    bootstrap_lock: Mutex<()>,
}

impl<C: MetadataContainer> BootstrappingGuard<C> {
    pub fn new(
        loader: Arc<dyn MetadataLoader>,
        parser: Arc<dyn MetadataParser>,
        container: C,
    ) -> Self {
        Self {
            loader,
            parser,
            container,
            loaded_files: DashSet::new(),
            bootstrap_lock: Mutex::new(()),
        }
    }

    pub fn get_or_bootstrap(&self, file_name: &str) -> Result<&C> {
        if self.loaded_files.contains(file_name) {
            return Ok(&self.container);
        }
        let _lock = self.bootstrap_lock.lock();
        if self.loaded_files.contains(file_name) {
            trace!("Metadata file {} was loaded by another thread", file_name);
            return Ok(&self.container);
        }
        self.bootstrap(file_name)?;
        self.loaded_files.insert(file_name.to_owned());
        Ok(&self.container)
    }

    pub fn is_loaded(&self, file_name: &str) -> bool {
        self.loaded_files.contains(file_name)
    }

    fn bootstrap(&self, file_name: &str) -> Result<()> {
        let bytes = self
            .loader
            .load_metadata(file_name)
            .ok_or_else(|| MetadataError::MissingResource { file: file_name.to_owned() })?;
        let records = self
            .parser
            .parse(Some(&bytes))
            .map_err(|source| MetadataError::Malformed { file: file_name.to_owned(), source })?;
        debug!("Loaded {} metadata records from {}", records.len(), file_name);
        for metadata in records {
            self.container.accept(Arc::new(metadata));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        borrow::Cow,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Barrier,
        },
        thread,
    };

    use super::*;
    use crate::{
        metadata::{CompositeMetadataContainer, ParseError, ProtoMetadataParser},
        proto_gen::phonemetadata::PhoneMetadata,
        tests::test_metadata::{collection_bytes, region},
    };

    struct CountingLoader {
        calls: AtomicUsize,
        bytes: Option<Vec<u8>>,
    }

    impl MetadataLoader for CountingLoader {
        fn load_metadata(&self, _file_name: &str) -> Option<Cow<'static, [u8]>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bytes.clone().map(Cow::Owned)
        }
    }

    struct CountingParser {
        calls: AtomicUsize,
    }

    impl MetadataParser for CountingParser {
        fn parse(&self, source: Option<&[u8]>) -> std::result::Result<Vec<PhoneMetadata>, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ProtoMetadataParser::strict().parse(source)
        }
    }

    fn guard(
        bytes: Option<Vec<u8>>,
    ) -> (Arc<CountingLoader>, Arc<CountingParser>, BootstrappingGuard<CompositeMetadataContainer>) {
        let loader = Arc::new(CountingLoader { calls: AtomicUsize::new(0), bytes });
        let parser = Arc::new(CountingParser { calls: AtomicUsize::new(0) });
        let guard =
            BootstrappingGuard::new(loader.clone(), parser.clone(), CompositeMetadataContainer::new());
        (loader, parser, guard)
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let (loader, parser, guard) = guard(Some(collection_bytes(&[region("US", 1)])));
        let threads = 16;
        let barrier = Barrier::new(threads);

        thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    barrier.wait();
                    let container = guard.get_or_bootstrap("meta_US").unwrap();
                    assert!(container.get_metadata_by_region_code("US").is_some());
                });
            }
        });

        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(parser.calls.load(Ordering::SeqCst), 1);
        assert!(guard.is_loaded("meta_US"));
    }

    #[test]
    fn missing_resource_names_the_file_and_is_retried() {
        let (loader, parser, guard) = guard(None);

        let err = guard.get_or_bootstrap("meta_XX").err().unwrap();
        assert!(matches!(&err, MetadataError::MissingResource { file } if file == "meta_XX"));
        assert!(err.to_string().contains("meta_XX"));

        assert!(guard.get_or_bootstrap("meta_XX").is_err());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(parser.calls.load(Ordering::SeqCst), 0);
        assert!(!guard.is_loaded("meta_XX"));
    }

    #[test]
    fn malformed_data_is_reported_with_the_file() {
        let (_, parser, guard) = guard(Some(vec![0x0A, 0x05, 0x01]));

        let err = guard.get_or_bootstrap("meta_BAD").err().unwrap();
        assert!(matches!(
            &err,
            MetadataError::Malformed { file, source: ParseError::Protobuf(_) } if file == "meta_BAD"
        ));
        guard.get_or_bootstrap("meta_BAD").err().unwrap();
        assert_eq!(parser.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn distinct_files_are_loaded_separately() {
        let (loader, _, guard) = guard(Some(collection_bytes(&[region("US", 1)])));
        guard.get_or_bootstrap("a").unwrap();
        guard.get_or_bootstrap("b").unwrap();
        guard.get_or_bootstrap("a").unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }
}
