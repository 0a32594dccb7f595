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

//! Big-endian primitives and length-prefixed modified UTF-8 strings, laid
//! out like `java.io.DataOutput` writes them.

use std::io::{Read, Write};

use super::errors::{PrefixMapError, Result};

pub(crate) trait DataInput: Read {
    fn read_bool(&mut self) -> Result<bool> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }

    fn read_u16_be(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_i32_be(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Reads an `i32` element count, rejecting negative values.
    fn read_count(&mut self, what: &'static str) -> Result<usize> {
        let count = self.read_i32_be()?;
        usize::try_from(count).map_err(|_| PrefixMapError::NegativeCount { what, count })
    }

    fn read_utf(&mut self) -> Result<String> {
        let len = self.read_u16_be()? as usize;
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes)?;
        decode_modified_utf8(&bytes)
    }
}

impl<R: Read + ?Sized> DataInput for R {}

pub(crate) trait DataOutput: Write {
    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_all(&[value as u8])?;
        Ok(())
    }

    fn write_u16_be(&mut self, value: u16) -> Result<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_i32_be(&mut self, value: i32) -> Result<()> {
        self.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        // Counts come from in-memory collections that were read or built
        // through the same format, so they always fit.
        self.write_i32_be(count as i32)
    }

    fn write_utf(&mut self, value: &str) -> Result<()> {
        let encoded = encode_modified_utf8(value);
        let len = u16::try_from(encoded.len())
            .map_err(|_| PrefixMapError::StringTooLong(encoded.len()))?;
        self.write_u16_be(len)?;
        self.write_all(&encoded)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> DataOutput for W {}

/// NUL becomes two bytes and characters outside the BMP are written as two
/// three-byte surrogates.
fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let continuation = |i: usize| -> Result<u16> {
        match bytes.get(i) {
            Some(&b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
            _ => Err(PrefixMapError::MalformedUtf),
        }
    };
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        match lead >> 4 {
            0x0..=0x7 => {
                units.push(lead as u16);
                i += 1;
            }
            0xC | 0xD => {
                units.push(((lead & 0x1F) as u16) << 6 | continuation(i + 1)?);
                i += 2;
            }
            0xE => {
                units.push(
                    ((lead & 0x0F) as u16) << 12 | continuation(i + 1)? << 6 | continuation(i + 2)?,
                );
                i += 3;
            }
            _ => return Err(PrefixMapError::MalformedUtf),
        }
    }
    String::from_utf16(&units).map_err(|_| PrefixMapError::MalformedUtf)
}
