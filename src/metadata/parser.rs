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

use log::{trace, warn};
use protobuf::Message;

use super::errors::ParseError;
use crate::{
    interfaces::MetadataParser,
    proto_gen::phonemetadata::{PhoneMetadata, PhoneMetadataCollection},
};

/// Decodes a serialized `PhoneMetadataCollection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoMetadataParser {
    strict: bool,
}

impl ProtoMetadataParser {
    /// Rejects a missing source with [`ParseError::NullSource`].
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Treats a missing source as an empty collection.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl Default for ProtoMetadataParser {
    fn default() -> Self {
        Self::strict()
    }
}

impl MetadataParser for ProtoMetadataParser {
    fn parse(&self, source: Option<&[u8]>) -> Result<Vec<PhoneMetadata>, ParseError> {
        let Some(bytes) = source else {
            if self.strict {
                return Err(ParseError::NullSource);
            }
            warn!("Metadata source is null, returning empty collection");
            return Ok(Vec::new());
        };
        let collection = PhoneMetadataCollection::parse_from_bytes(bytes)?;
        if collection.metadata.is_empty() {
            return Err(ParseError::EmptyMetadata);
        }
        trace!("Parsed {} metadata records", collection.metadata.len());
        Ok(collection.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_metadata::{collection_bytes, region};

    #[test]
    fn parses_records_in_order() {
        let bytes = collection_bytes(&[region("US", 1), region("CA", 1)]);
        let parsed = ProtoMetadataParser::strict().parse(Some(&bytes)).unwrap();
        let ids: Vec<_> = parsed.iter().map(|m| m.id()).collect();
        assert_eq!(ids, ["US", "CA"]);
        assert_eq!(parsed[0].country_code(), 1);
    }

    #[test]
    fn null_source_depends_on_strictness() {
        assert!(matches!(
            ProtoMetadataParser::strict().parse(None),
            Err(ParseError::NullSource)
        ));
        assert!(ProtoMetadataParser::lenient().parse(None).unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_and_corrupt_input() {
        let empty = collection_bytes(&[]);
        for parser in [ProtoMetadataParser::strict(), ProtoMetadataParser::lenient()] {
            assert!(matches!(parser.parse(Some(&empty)), Err(ParseError::EmptyMetadata)));
            assert!(matches!(
                parser.parse(Some(&[0x0A, 0x05, 0x01])),
                Err(ParseError::Protobuf(_))
            ));
        }
    }
}
