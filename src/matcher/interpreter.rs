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

use std::fmt;

use log::error;

use super::{digit_sequence::DigitSequence, instruction::Instruction};

/// State of the matcher after executing an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Valid so far, more input is expected.
    Continue,
    /// A terminal state was reached.
    Terminal,
    /// The input diverges from every transition of the current state.
    Invalid,
    /// Input ran out before a terminal state, a longer input may still match.
    Truncated,
}

/// Outcome of matching a whole digit sequence against a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    /// The digits were fully consumed and ended in a terminal state.
    Matched,
    /// The digits are a proper prefix of some matching sequence.
    TooShort,
    /// The digits can never match.
    Invalid,
    /// A terminal state was reached with digits left over.
    TooLong,
}

/// Runs `program` over `digits` starting at byte offset 0.
///
/// Never returns [`State::Continue`]. Malformed programs produce
/// [`State::Invalid`]. The function holds no state and may be called from
/// any number of threads at once.
pub fn execute(program: &[u8], digits: &mut DigitSequence<'_>) -> State {
    let mut pc = 0;
    loop {
        let Some((instruction, len)) = program.get(pc..).and_then(Instruction::decode) else {
            error!(
                "Malformed matcher program: no valid instruction at offset {} of {}",
                pc,
                program.len()
            );
            return State::Invalid;
        };
        let (state, next) = instruction.execute(pc, len, digits);
        if state != State::Continue {
            return state;
        }
        pc = next;
    }
}

/// Matches a complete digit sequence, distinguishing a full match from one
/// that stops early.
pub fn match_digits(program: &[u8], mut digits: DigitSequence<'_>) -> MatchResult {
    match execute(program, &mut digits) {
        State::Terminal if digits.has_next() => MatchResult::TooLong,
        State::Terminal => MatchResult::Matched,
        State::Truncated => MatchResult::TooShort,
        State::Invalid | State::Continue => MatchResult::Invalid,
    }
}

/// An immutable compiled matcher program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    bytes: Box<[u8]>,
}

impl Program {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes: bytes.into_boxed_slice() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn match_digits(&self, digits: DigitSequence<'_>) -> MatchResult {
        match_digits(&self.bytes, digits)
    }

    /// Decodes the instructions in byte order along with their offsets.
    /// Stops at the first byte that does not decode.
    pub fn instructions(&self) -> impl Iterator<Item = (usize, Instruction<'_>)> + '_ {
        let mut pc = 0;
        std::iter::from_fn(move || {
            let (instruction, len) = Instruction::decode(self.bytes.get(pc..)?)?;
            let at = pc;
            pc += len;
            Some((at, instruction))
        })
    }
}

impl AsRef<[u8]> for Program {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (at, instruction) in self.instructions() {
            writeln!(f, "{at:04}: {instruction:?}")?;
        }
        Ok(())
    }
}
