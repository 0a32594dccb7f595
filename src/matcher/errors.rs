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

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Character at position {position} is not a decimal digit")]
pub struct InvalidDigitError {
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntaxError {
    #[error("Empty alternative at position {0}")]
    EmptyAlternative(usize),
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },
    #[error("Unterminated {0} starting at position {1}")]
    Unterminated(&'static str, usize),
    #[error("Invalid repetition {{{min},{max}}} at position {position}")]
    InvalidRepetition { min: usize, max: usize, position: usize },
    #[error("Empty digit class at position {0}")]
    EmptyClass(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] PatternSyntaxError),
    /// A jump needs an offset wider than any branch encoding can carry.
    #[error("Program too large: jump of {distance} bytes exceeds the {max} byte branch limit")]
    ProgramTooLarge { distance: usize, max: usize },
    #[error("Jump from offset {from} back to {to} cannot be encoded")]
    BackwardJump { from: usize, to: usize },
}
