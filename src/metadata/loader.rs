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
    borrow::Cow,
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, error};

use crate::interfaces::MetadataLoader;

/// Reads metadata files from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryMetadataLoader {
    root: PathBuf,
}

impl DirectoryMetadataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MetadataLoader for DirectoryMetadataLoader {
    fn load_metadata(&self, file_name: &str) -> Option<Cow<'static, [u8]>> {
        let path = self.root.join(file_name);
        match std::fs::read(&path) {
            Ok(bytes) => Some(Cow::Owned(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Metadata file {} not found", path.display());
                None
            }
            Err(err) => {
                error!("Failed to read metadata file {}: {}", path.display(), err);
                None
            }
        }
    }
}

/// Serves metadata compiled into the binary, e.g. with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataLoader {
    files: HashMap<&'static str, &'static [u8]>,
}

impl StaticMetadataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file_name: &'static str, bytes: &'static [u8]) -> Self {
        self.files.insert(file_name, bytes);
        self
    }
}

impl FromIterator<(&'static str, &'static [u8])> for StaticMetadataLoader {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static [u8])>>(iter: T) -> Self {
        Self { files: iter.into_iter().collect() }
    }
}

impl MetadataLoader for StaticMetadataLoader {
    fn load_metadata(&self, file_name: &str) -> Option<Cow<'static, [u8]>> {
        self.files.get(file_name).map(|bytes| Cow::Borrowed(*bytes))
    }
}
