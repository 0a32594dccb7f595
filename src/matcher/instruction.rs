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

//! The six instruction encodings of a compiled matcher program.
//!
//! Every instruction starts with a byte whose 3 high bits select its kind.
//! Multi-byte words are big-endian. Jump-table entries are single bytes
//! holding a forward offset measured from the byte after the entry.
//!
//! ```text
//! Branch      000 E oooo [oooooooo]      E: 12-bit offset follows
//! Single      001 T vvvv                 T: exhausted input is terminal
//! Run         010 T nnnn                 consumes n + 1 digits
//! Set         011 T L 0 m9..m0 [jj jj]   L: 2-entry jump table follows
//! Map         100 + 29-bit index field + jump table
//! TerminalMap 101 + 29-bit index field + jump table
//! ```

use strum::{EnumIter, FromRepr};

use super::{digit_sequence::DigitSequence, State};

const EXTENSION_BIT: u8 = 1 << 4;
const TERMINAL_BIT: u8 = 1 << 4;
const LOW_NIBBLE: u8 = 0x0F;
const SET_TERMINAL_BIT: u16 = 1 << 12;
const SET_LONG_FORM_BIT: u16 = 1 << 11;
const SET_MASK: u16 = 0x03FF;

/// Largest offset of the one byte branch form.
pub const MAX_SHORT_BRANCH: usize = 0x0F;
/// Largest offset of the two byte branch form.
pub const MAX_LONG_BRANCH: usize = 0x0FFF;
/// Longest digit run a single Run instruction can consume.
pub const MAX_RUN: usize = 16;
/// Largest offset a jump-table entry can hold.
pub const MAX_TABLE_OFFSET: usize = 0xFF;

/// Bits used by each digit in the map index field. Digit `d` can only be
/// assigned an index up to `d + 1` since indices are handed out in digit
/// order, which bounds the width.
const MAP_WIDTHS: [u32; 10] = [1, 2, 2, 3, 3, 3, 3, 4, 4, 4];
const MAP_SHIFTS: [u32; 10] = [0, 1, 3, 5, 8, 11, 14, 17, 21, 25];
pub const MAP_FIELD_BITS: u32 = 29;

/// The 3-bit tag stored in the top of the first instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum OpCode {
    Branch = 0,
    Single = 1,
    Run = 2,
    Set = 3,
    Map = 4,
    TerminalMap = 5,
}

impl OpCode {
    /// Reads the tag out of the leading byte of an instruction.
    #[inline]
    pub fn of(byte: u8) -> Option<Self> {
        Self::from_repr(byte >> 5)
    }

    #[inline]
    fn tag(self) -> u8 {
        (self as u8) << 5
    }
}

/// A decoded instruction. Jump tables are borrowed from the program bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Skips `offset` bytes past the end of the instruction, `0` is terminal.
    Branch { offset: u16, long: bool },
    Single { digit: u8, terminal: bool },
    Run { count: u8, terminal: bool },
    /// `jump_table` is `[member, non_member]` in the long form; the short form
    /// rejects non-members.
    Set { mask: u16, terminal: bool, jump_table: Option<[u8; 2]> },
    Map { indices: u32, jump_table: &'a [u8] },
    TerminalMap { indices: u32, jump_table: &'a [u8] },
}

type Decoder = for<'a> fn(&'a [u8]) -> Option<(Instruction<'a>, usize)>;

/// Decoders indexed by the 3-bit tag.
const DECODERS: [Decoder; 8] = [
    decode_branch,
    decode_single,
    decode_run,
    decode_set,
    decode_map,
    decode_terminal_map,
    decode_reserved,
    decode_reserved,
];

impl<'a> Instruction<'a> {
    /// Decodes the instruction starting at `bytes[0]`, returning it with its
    /// encoded length. `None` means the bytes are not a valid instruction.
    #[inline]
    pub fn decode(bytes: &'a [u8]) -> Option<(Self, usize)> {
        let first = *bytes.first()?;
        DECODERS[(first >> 5) as usize](bytes)
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::Branch { .. } => OpCode::Branch,
            Instruction::Single { .. } => OpCode::Single,
            Instruction::Run { .. } => OpCode::Run,
            Instruction::Set { .. } => OpCode::Set,
            Instruction::Map { .. } => OpCode::Map,
            Instruction::TerminalMap { .. } => OpCode::TerminalMap,
        }
    }

    /// Runs the instruction located at `at` (spanning `len` bytes), consuming
    /// digits as needed. Returns the resulting state and, for
    /// [`State::Continue`], the offset of the next instruction.
    pub fn execute(&self, at: usize, len: usize, digits: &mut DigitSequence<'_>) -> (State, usize) {
        let end = at + len;
        match *self {
            Instruction::Branch { offset, .. } => {
                if offset == 0 {
                    (State::Terminal, end)
                } else {
                    (State::Continue, end + offset as usize)
                }
            }
            Instruction::Single { digit, terminal } => match digits.next_digit() {
                None => (exhausted(terminal), end),
                Some(d) if d == digit => (State::Continue, end),
                Some(_) => (State::Invalid, end),
            },
            Instruction::Run { count, terminal } => {
                for _ in 0..count {
                    if digits.next_digit().is_none() {
                        return (exhausted(terminal), end);
                    }
                }
                (State::Continue, end)
            }
            Instruction::Set { mask, terminal, jump_table } => {
                let Some(d) = digits.next_digit() else {
                    return (exhausted(terminal), end);
                };
                let member = mask & (1 << d) != 0;
                match jump_table {
                    None if member => (State::Continue, end),
                    None => (State::Invalid, end),
                    Some(table) => {
                        let entry = if member { 0 } else { 1 };
                        // the table occupies the last two bytes of the instruction
                        let table_start = end - 2;
                        (State::Continue, table_start + entry + 1 + table[entry] as usize)
                    }
                }
            }
            Instruction::Map { indices, jump_table } => {
                map_jump(indices, jump_table, end, digits, State::Truncated)
            }
            Instruction::TerminalMap { indices, jump_table } => {
                map_jump(indices, jump_table, end, digits, State::Terminal)
            }
        }
    }

    /// Appends the encoded instruction to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match *self {
            Instruction::Branch { offset, long } => {
                if long {
                    out.push(OpCode::Branch.tag() | EXTENSION_BIT | ((offset >> 8) as u8 & LOW_NIBBLE));
                    out.push(offset as u8);
                } else {
                    out.push(OpCode::Branch.tag() | (offset as u8 & LOW_NIBBLE));
                }
            }
            Instruction::Single { digit, terminal } => {
                out.push(OpCode::Single.tag() | terminal_bit(terminal) | (digit & LOW_NIBBLE));
            }
            Instruction::Run { count, terminal } => {
                out.push(OpCode::Run.tag() | terminal_bit(terminal) | ((count - 1) & LOW_NIBBLE));
            }
            Instruction::Set { mask, terminal, jump_table } => {
                let mut word = ((OpCode::Set as u16) << 13) | (mask & SET_MASK);
                if terminal {
                    word |= SET_TERMINAL_BIT;
                }
                if jump_table.is_some() {
                    word |= SET_LONG_FORM_BIT;
                }
                out.extend_from_slice(&word.to_be_bytes());
                if let Some(table) = jump_table {
                    out.extend_from_slice(&table);
                }
            }
            Instruction::Map { indices, jump_table } => {
                encode_map(OpCode::Map, indices, jump_table, out)
            }
            Instruction::TerminalMap { indices, jump_table } => {
                encode_map(OpCode::TerminalMap, indices, jump_table, out)
            }
        }
    }
}

/// Packs per-digit jump-table indices (0 = no transition) into the 29-bit
/// map field. Returns `None` if an index exceeds the width of its digit.
pub fn pack_map_indices(indices: &[u8; 10]) -> Option<u32> {
    let mut field = 0u32;
    for (digit, &index) in indices.iter().enumerate() {
        if u32::from(index) >= 1 << MAP_WIDTHS[digit] {
            return None;
        }
        field |= u32::from(index) << MAP_SHIFTS[digit];
    }
    Some(field)
}

#[inline]
pub fn map_index(field: u32, digit: u8) -> u8 {
    let d = digit as usize;
    ((field >> MAP_SHIFTS[d]) & ((1 << MAP_WIDTHS[d]) - 1)) as u8
}

/// Number of jump-table entries referenced by a map field.
fn map_table_len(field: u32) -> usize {
    (0..10u8).map(|d| map_index(field, d)).max().unwrap_or(0) as usize
}

#[inline]
fn exhausted(terminal: bool) -> State {
    if terminal { State::Terminal } else { State::Truncated }
}

#[inline]
fn terminal_bit(terminal: bool) -> u8 {
    if terminal { TERMINAL_BIT } else { 0 }
}

fn map_jump(
    indices: u32,
    jump_table: &[u8],
    end: usize,
    digits: &mut DigitSequence<'_>,
    no_input: State,
) -> (State, usize) {
    let Some(d) = digits.next_digit() else {
        return (no_input, end);
    };
    let index = map_index(indices, d) as usize;
    if index == 0 {
        return (State::Invalid, end);
    }
    let table_start = end - jump_table.len();
    (State::Continue, table_start + index + jump_table[index - 1] as usize)
}

fn encode_map(opcode: OpCode, indices: u32, jump_table: &[u8], out: &mut Vec<u8>) {
    let word = ((opcode as u32) << MAP_FIELD_BITS) | (indices & ((1 << MAP_FIELD_BITS) - 1));
    out.extend_from_slice(&word.to_be_bytes());
    out.extend_from_slice(jump_table);
}

fn decode_branch(bytes: &[u8]) -> Option<(Instruction<'_>, usize)> {
    let op = bytes[0];
    let offset = (op & LOW_NIBBLE) as u16;
    if op & EXTENSION_BIT == 0 {
        return Some((Instruction::Branch { offset, long: false }, 1));
    }
    let low = *bytes.get(1)? as u16;
    Some((Instruction::Branch { offset: (offset << 8) | low, long: true }, 2))
}

fn decode_single(bytes: &[u8]) -> Option<(Instruction<'_>, usize)> {
    let op = bytes[0];
    let digit = op & LOW_NIBBLE;
    if digit > 9 {
        return None;
    }
    Some((Instruction::Single { digit, terminal: op & TERMINAL_BIT != 0 }, 1))
}

fn decode_run(bytes: &[u8]) -> Option<(Instruction<'_>, usize)> {
    let op = bytes[0];
    let count = (op & LOW_NIBBLE) + 1;
    Some((Instruction::Run { count, terminal: op & TERMINAL_BIT != 0 }, 1))
}

fn decode_set(bytes: &[u8]) -> Option<(Instruction<'_>, usize)> {
    let word = u16::from_be_bytes([bytes[0], *bytes.get(1)?]);
    let mask = word & SET_MASK;
    let terminal = word & SET_TERMINAL_BIT != 0;
    if word & SET_LONG_FORM_BIT == 0 {
        return Some((Instruction::Set { mask, terminal, jump_table: None }, 2));
    }
    let table = [*bytes.get(2)?, *bytes.get(3)?];
    Some((Instruction::Set { mask, terminal, jump_table: Some(table) }, 4))
}

fn read_map(bytes: &[u8]) -> Option<(u32, &[u8], usize)> {
    let word = u32::from_be_bytes(bytes.get(..4)?.try_into().ok()?);
    let indices = word & ((1 << MAP_FIELD_BITS) - 1);
    let table_len = map_table_len(indices);
    let jump_table = bytes.get(4..4 + table_len)?;
    Some((indices, jump_table, 4 + table_len))
}

fn decode_map(bytes: &[u8]) -> Option<(Instruction<'_>, usize)> {
    let (indices, jump_table, len) = read_map(bytes)?;
    Some((Instruction::Map { indices, jump_table }, len))
}

fn decode_terminal_map(bytes: &[u8]) -> Option<(Instruction<'_>, usize)> {
    let (indices, jump_table, len) = read_map(bytes)?;
    Some((Instruction::TerminalMap { indices, jump_table }, len))
}

fn decode_reserved(_: &[u8]) -> Option<(Instruction<'_>, usize)> {
    None
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn encoded(instruction: Instruction<'_>) -> Vec<u8> {
        let mut out = Vec::new();
        instruction.encode(&mut out);
        out
    }

    #[test]
    fn tags_select_opcodes() {
        for opcode in OpCode::iter() {
            assert_eq!(OpCode::of(opcode.tag() | 0x1F), Some(opcode));
        }
        assert_eq!(OpCode::of(0b1100_0000), None);
        assert_eq!(OpCode::of(0b1110_0000), None);
    }

    #[test]
    fn branch_forms() {
        assert_eq!(encoded(Instruction::Branch { offset: 0, long: false }), vec![0x00]);
        assert_eq!(encoded(Instruction::Branch { offset: 9, long: false }), vec![0x09]);
        assert_eq!(encoded(Instruction::Branch { offset: 0x123, long: true }), vec![0x11, 0x23]);
        assert_eq!(
            Instruction::decode(&[0x11, 0x23]),
            Some((Instruction::Branch { offset: 0x123, long: true }, 2))
        );
        // a long branch missing its second byte is not decodable
        assert_eq!(Instruction::decode(&[0x11]), None);
    }

    #[test]
    fn single_and_run_bits() {
        assert_eq!(encoded(Instruction::Single { digit: 7, terminal: true }), vec![0b0011_0111]);
        assert_eq!(encoded(Instruction::Run { count: 16, terminal: false }), vec![0b0100_1111]);
        assert_eq!(
            Instruction::decode(&[0b0100_0010]),
            Some((Instruction::Run { count: 3, terminal: false }, 1))
        );
        // digit values above 9 cannot be matched and are rejected
        assert_eq!(Instruction::decode(&[0b0010_1010]), None);
    }

    #[test]
    fn set_forms() {
        let short = encoded(Instruction::Set { mask: 0b10_0000_0101, terminal: false, jump_table: None });
        assert_eq!(short, vec![0b0110_0010, 0b0000_0101]);
        let long = encoded(Instruction::Set { mask: 0b1, terminal: true, jump_table: Some([3, 7]) });
        assert_eq!(long, vec![0b0111_1000, 0b0000_0001, 3, 7]);
        assert_eq!(
            Instruction::decode(&long),
            Some((Instruction::Set { mask: 1, terminal: true, jump_table: Some([3, 7]) }, 4))
        );
    }

    #[test]
    fn map_field_layout() {
        let indices = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let field = pack_map_indices(&indices).unwrap();
        for digit in 0..10u8 {
            assert_eq!(map_index(field, digit), indices[digit as usize]);
        }
        assert!(field < 1 << MAP_FIELD_BITS);
        // digit 0 only has room for index 1
        assert_eq!(pack_map_indices(&[2, 0, 0, 0, 0, 0, 0, 0, 0, 0]), None);

        let table = [0u8; 10];
        let bytes = encoded(Instruction::TerminalMap { indices: field, jump_table: &table });
        assert_eq!(bytes.len(), 14);
        assert_eq!(bytes[0] >> 5, OpCode::TerminalMap as u8);
        let (decoded, len) = Instruction::decode(&bytes).unwrap();
        assert_eq!(len, 14);
        assert_eq!(decoded, Instruction::TerminalMap { indices: field, jump_table: &table });
    }

    #[test]
    fn map_jump_uses_offset_after_entry() {
        let field = pack_map_indices(&[0, 1, 0, 2, 0, 0, 0, 0, 0, 0]).unwrap();
        let table = [4u8, 0];
        let map = Instruction::Map { indices: field, jump_table: &table };
        let mut digits = DigitSequence::from_digits(&[3]).unwrap();
        // instruction at 10, 6 bytes long: table at 14, entry 1 at 15, next byte 16
        assert_eq!(map.execute(10, 6, &mut digits), (State::Continue, 16));
        let mut digits = DigitSequence::from_digits(&[1]).unwrap();
        assert_eq!(map.execute(10, 6, &mut digits), (State::Continue, 19));
        let mut digits = DigitSequence::from_digits(&[2]).unwrap();
        assert_eq!(map.execute(10, 6, &mut digits).0, State::Invalid);
        let mut digits = DigitSequence::from_digits(&[]).unwrap();
        assert_eq!(map.execute(10, 6, &mut digits).0, State::Truncated);
    }
}
