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

//! Parser for the digit pattern subset accepted by the program compiler:
//! alternatives separated by `|`, each a sequence of `5`, `\d` or `[2-9]`
//! style atoms with an optional `?`, `{n}` or `{n,m}` suffix.

use std::{iter::Peekable, str::CharIndices};

use super::errors::PatternSyntaxError;

pub(super) const ALL_DIGITS: u16 = 0x03FF;
/// Upper bound on a repetition count, keeps compiled programs small.
pub(super) const MAX_REPETITION: usize = 32;

/// One digit position of an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Slot {
    pub digits: u16,
    pub optional: bool,
}

impl Slot {
    #[inline]
    pub fn accepts(&self, digit: u8) -> bool {
        self.digits & (1 << digit) != 0
    }
}

/// Parses a pattern into one slot list per alternative.
pub(super) fn parse_pattern(pattern: &str) -> Result<Vec<Vec<Slot>>, PatternSyntaxError> {
    let mut chars = pattern.char_indices().peekable();
    let mut alternatives = Vec::new();
    let mut current = Vec::new();
    let mut alternative_start = 0;
    let mut atoms = 0;

    while let Some((position, c)) = chars.next() {
        let digits = match c {
            '|' => {
                if atoms == 0 {
                    return Err(PatternSyntaxError::EmptyAlternative(alternative_start));
                }
                alternatives.push(std::mem::take(&mut current));
                alternative_start = position + 1;
                atoms = 0;
                continue;
            }
            '0'..='9' => 1 << (c as u8 - b'0'),
            '\\' => match chars.next() {
                Some((_, 'd')) => ALL_DIGITS,
                Some((position, found)) => {
                    return Err(PatternSyntaxError::UnexpectedChar { found, position });
                }
                None => return Err(PatternSyntaxError::Unterminated("escape", position)),
            },
            '[' => parse_class(&mut chars, position)?,
            found => return Err(PatternSyntaxError::UnexpectedChar { found, position }),
        };
        let (min, max) = parse_quantifier(&mut chars)?;
        current.extend(std::iter::repeat(Slot { digits, optional: false }).take(min));
        current.extend(std::iter::repeat(Slot { digits, optional: true }).take(max - min));
        atoms += 1;
    }
    if atoms == 0 {
        return Err(PatternSyntaxError::EmptyAlternative(alternative_start));
    }
    alternatives.push(current);
    Ok(alternatives)
}

fn parse_class(
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
) -> Result<u16, PatternSyntaxError> {
    let mut digits = 0u16;
    loop {
        let Some((position, c)) = chars.next() else {
            return Err(PatternSyntaxError::Unterminated("class", start));
        };
        match c {
            ']' if digits == 0 => return Err(PatternSyntaxError::EmptyClass(start)),
            ']' => return Ok(digits),
            '0'..='9' => {
                let low = c as u8 - b'0';
                if chars.next_if(|&(_, c)| c == '-').is_none() {
                    digits |= 1 << low;
                    continue;
                }
                match chars.next() {
                    Some((_, c @ '0'..='9')) if c as u8 - b'0' >= low => {
                        for d in low..=(c as u8 - b'0') {
                            digits |= 1 << d;
                        }
                    }
                    Some((position, found)) => {
                        return Err(PatternSyntaxError::UnexpectedChar { found, position });
                    }
                    None => return Err(PatternSyntaxError::Unterminated("class", start)),
                }
            }
            found => return Err(PatternSyntaxError::UnexpectedChar { found, position }),
        }
    }
}

fn parse_quantifier(
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<(usize, usize), PatternSyntaxError> {
    match chars.peek().copied() {
        Some((_, '?')) => {
            chars.next();
            Ok((0, 1))
        }
        Some((start, '{')) => {
            chars.next();
            let min = parse_number(chars, start)?;
            let max = if chars.next_if(|&(_, c)| c == ',').is_some() {
                parse_number(chars, start)?
            } else {
                min
            };
            match chars.next() {
                Some((_, '}')) => {}
                Some((position, found)) => {
                    return Err(PatternSyntaxError::UnexpectedChar { found, position });
                }
                None => return Err(PatternSyntaxError::Unterminated("repetition", start)),
            }
            if min > max || max == 0 || max > MAX_REPETITION {
                return Err(PatternSyntaxError::InvalidRepetition { min, max, position: start });
            }
            Ok((min, max))
        }
        _ => Ok((1, 1)),
    }
}

fn parse_number(
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
) -> Result<usize, PatternSyntaxError> {
    let mut value: Option<usize> = None;
    while let Some((_, c)) = chars.next_if(|(_, c)| c.is_ascii_digit()) {
        let digit = (c as u8 - b'0') as usize;
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit));
    }
    match value {
        Some(value) => Ok(value),
        None => match chars.peek() {
            Some(&(position, found)) => Err(PatternSyntaxError::UnexpectedChar { found, position }),
            None => Err(PatternSyntaxError::Unterminated("repetition", start)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(digits: u16, optional: bool) -> Slot {
        Slot { digits, optional }
    }

    #[test]
    fn parses_atoms_and_quantifiers() {
        let parsed = parse_pattern(r"[2-9]\d{1,2}5?").unwrap();
        assert_eq!(
            parsed,
            vec![vec![
                slot(0b11_1111_1100, false),
                slot(ALL_DIGITS, false),
                slot(ALL_DIGITS, true),
                slot(1 << 5, true),
            ]]
        );
    }

    #[test]
    fn parses_alternatives_and_classes() {
        let parsed = parse_pattern("[135]|0{2}").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], vec![slot(0b10_1010, false)]);
        assert_eq!(parsed[1], vec![slot(1, false), slot(1, false)]);
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert_eq!(parse_pattern(""), Err(PatternSyntaxError::EmptyAlternative(0)));
        assert_eq!(parse_pattern("1||2"), Err(PatternSyntaxError::EmptyAlternative(2)));
        assert!(matches!(parse_pattern("1a"), Err(PatternSyntaxError::UnexpectedChar { found: 'a', .. })));
        assert!(matches!(parse_pattern("[12"), Err(PatternSyntaxError::Unterminated("class", 0))));
        assert!(matches!(parse_pattern("[]"), Err(PatternSyntaxError::EmptyClass(0))));
        assert!(matches!(parse_pattern("[9-2]"), Err(PatternSyntaxError::UnexpectedChar { .. })));
        assert!(matches!(parse_pattern(r"\d{3,2}"), Err(PatternSyntaxError::InvalidRepetition { .. })));
        assert!(matches!(parse_pattern(r"\d{40}"), Err(PatternSyntaxError::InvalidRepetition { .. })));
        assert!(matches!(parse_pattern(r"\d{"), Err(PatternSyntaxError::Unterminated(..))));
    }
}
