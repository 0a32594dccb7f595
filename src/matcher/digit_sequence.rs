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

use super::errors::InvalidDigitError;

/// An ordered run of decimal digits consumed front to back.
///
/// The digits themselves are never modified; only the read position moves.
/// Cloning a sequence gives an independent cursor over the same digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitSequence<'a> {
    digits: Cow<'a, [u8]>,
    position: usize,
}

impl<'a> DigitSequence<'a> {
    /// Builds a sequence from digit values (each must be `0..=9`).
    pub fn from_digits(digits: &'a [u8]) -> Result<Self, InvalidDigitError> {
        if let Some(position) = digits.iter().position(|d| *d > 9) {
            return Err(InvalidDigitError { position });
        }
        Ok(Self { digits: Cow::Borrowed(digits), position: 0 })
    }

    /// Parses a string of decimal digits. Any unicode decimal digit is
    /// accepted and normalized, everything else is rejected.
    pub fn parse(s: &str) -> Result<DigitSequence<'static>, InvalidDigitError> {
        let normalized = dec_from_char::normalize_decimals(s);
        let mut digits = Vec::with_capacity(normalized.len());
        for (position, c) in normalized.chars().enumerate() {
            match c.to_digit(10) {
                Some(d) => digits.push(d as u8),
                None => return Err(InvalidDigitError { position }),
            }
        }
        Ok(DigitSequence { digits: Cow::Owned(digits), position: 0 })
    }

    /// Returns whether there are digits left to consume.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.position < self.digits.len()
    }

    /// Consumes and returns the next digit.
    #[inline]
    pub fn next_digit(&mut self) -> Option<u8> {
        let digit = self.digits.get(self.position).copied()?;
        self.position += 1;
        Some(digit)
    }

    /// Number of digits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.digits.len() - self.position
    }

    /// Total number of digits, consumed or not.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Returns a fresh cursor positioned at the first digit.
    pub fn rewound(&self) -> DigitSequence<'_> {
        DigitSequence { digits: Cow::Borrowed(self.digits.as_ref()), position: 0 }
    }
}

impl Iterator for DigitSequence<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.next_digit()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}
