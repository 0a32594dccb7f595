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

//! Builds matcher programs from digit patterns.
//!
//! The pattern is turned into a minimal acyclic DFA whose states are
//! numbered deterministically (`INITIAL = 0`, `TERMINAL = 1`, the rest in
//! breadth-first topological discovery order), so the same pattern always
//! produces byte-identical programs.

use std::collections::{BTreeSet, HashMap, VecDeque};

use log::trace;

use super::{
    errors::CompileError,
    instruction::{
        pack_map_indices, Instruction, MAX_LONG_BRANCH, MAX_RUN, MAX_SHORT_BRANCH,
        MAX_TABLE_OFFSET,
    },
    interpreter::Program,
    pattern::{parse_pattern, Slot, ALL_DIGITS},
};

pub const INITIAL: usize = 0;
pub const TERMINAL: usize = 1;

/// Compiles a digit pattern such as `[2-9]\d{6,7}|800\d{4}` into a program.
pub fn compile(pattern: &str) -> Result<Program, CompileError> {
    let alternatives = parse_pattern(pattern)?;
    let graph = DigitGraph::from_alternatives(&alternatives);
    let program = ProgramWriter::new(&graph).write()?;
    trace!(
        "Compiled pattern '{}' into {} states, {} bytes",
        pattern,
        graph.nodes.len(),
        program.len()
    );
    Ok(program)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    accepting: bool,
    next: [Option<usize>; 10],
}

impl Node {
    /// Outgoing edges grouped by target, ordered by the lowest digit leading
    /// to each target.
    fn groups(&self) -> Vec<(u16, usize)> {
        let mut groups: Vec<(u16, usize)> = Vec::new();
        for (digit, target) in self.next.iter().enumerate() {
            let Some(target) = *target else { continue };
            match groups.iter_mut().find(|(_, t)| *t == target) {
                Some((mask, _)) => *mask |= 1 << digit,
                None => groups.push((1 << digit, target)),
            }
        }
        groups
    }

    fn targets(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups().into_iter().map(|(_, target)| target)
    }
}

/// A minimal acyclic digit automaton with canonical state numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DigitGraph {
    nodes: Vec<Node>,
}

impl DigitGraph {
    fn from_alternatives(alternatives: &[Vec<Slot>]) -> Self {
        let raw = subset_construction(alternatives);
        let (minimal, start) = minimize(&raw);
        Self::renumber(&minimal, start)
    }

    /// Numbers states by a FIFO topological traversal from the start state,
    /// visiting edges by ascending digit. The accepting sink is forced to
    /// [`TERMINAL`].
    fn renumber(nodes: &[Node], start: usize) -> Self {
        let mut in_degree = vec![0usize; nodes.len()];
        for node in nodes {
            for target in node.targets() {
                in_degree[target] += 1;
            }
        }
        let mut order = Vec::with_capacity(nodes.len());
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for target in nodes[node].targets() {
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    queue.push_back(target);
                }
            }
        }

        let mut number = vec![0usize; nodes.len()];
        let mut next_number = TERMINAL + 1;
        for &node in &order {
            number[node] = if node == start {
                INITIAL
            } else if nodes[node].next.iter().all(Option::is_none) {
                TERMINAL
            } else {
                next_number += 1;
                next_number - 1
            };
        }

        let mut renumbered = vec![Node { accepting: true, next: [None; 10] }; order.len().max(2)];
        for &node in &order {
            let mut next = [None; 10];
            for (digit, target) in nodes[node].next.iter().enumerate() {
                next[digit] = target.map(|t| number[t]);
            }
            renumbered[number[node]] = Node { accepting: nodes[node].accepting, next };
        }
        if order.len() == 1 {
            // the start state is itself the sink
            renumbered.truncate(1);
        }
        Self { nodes: renumbered }
    }

    /// States in emission order: numbering order with the sink moved last,
    /// which keeps every jump pointing forward.
    fn layout_order(&self) -> Vec<usize> {
        if self.nodes.len() == 1 {
            return vec![INITIAL];
        }
        let mut order = vec![INITIAL];
        order.extend(TERMINAL + 1..self.nodes.len());
        order.push(TERMINAL);
        order
    }

    fn in_degrees(&self) -> Vec<usize> {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for node in &self.nodes {
            for target in node.targets() {
                in_degree[target] += 1;
            }
        }
        in_degree
    }
}

/// Determinizes the alternatives. A DFA state is the set of
/// `(alternative, next slot)` positions that are still alive.
fn subset_construction(alternatives: &[Vec<Slot>]) -> Vec<Node> {
    let start: Vec<(usize, usize)> = (0..alternatives.len()).map(|a| (a, 0)).collect();
    let mut ids = HashMap::from([(start.clone(), 0usize)]);
    let mut sets = vec![start];
    let mut nodes = Vec::new();

    let mut current = 0;
    while current < sets.len() {
        let set = sets[current].clone();
        let accepting = set
            .iter()
            .any(|&(a, p)| alternatives[a][p..].iter().all(|slot| slot.optional));
        let mut next = [None; 10];
        for digit in 0..10u8 {
            let mut targets = BTreeSet::new();
            for &(a, p) in &set {
                for (j, slot) in alternatives[a].iter().enumerate().skip(p) {
                    if slot.accepts(digit) {
                        targets.insert((a, j + 1));
                    }
                    if !slot.optional {
                        break;
                    }
                }
            }
            if targets.is_empty() {
                continue;
            }
            let key: Vec<(usize, usize)> = targets.into_iter().collect();
            let id = match ids.get(&key) {
                Some(&id) => id,
                None => {
                    let id = sets.len();
                    ids.insert(key.clone(), id);
                    sets.push(key);
                    id
                }
            };
            next[digit as usize] = Some(id);
        }
        nodes.push(Node { accepting, next });
        current += 1;
    }
    nodes
}

/// Merges states with identical futures. Returns the minimal nodes and the
/// index of the start state among them.
fn minimize(nodes: &[Node]) -> (Vec<Node>, usize) {
    fn canonical(
        node: usize,
        nodes: &[Node],
        canon: &mut [Option<usize>],
        signatures: &mut HashMap<Node, usize>,
        out: &mut Vec<Node>,
    ) -> usize {
        if let Some(id) = canon[node] {
            return id;
        }
        let mut next = [None; 10];
        for (digit, target) in nodes[node].next.iter().enumerate() {
            if let Some(target) = *target {
                next[digit] = Some(canonical(target, nodes, canon, signatures, out));
            }
        }
        let signature = Node { accepting: nodes[node].accepting, next };
        let id = *signatures.entry(signature).or_insert_with(|| {
            out.push(signature);
            out.len() - 1
        });
        canon[node] = Some(id);
        id
    }

    let mut canon = vec![None; nodes.len()];
    let mut signatures = HashMap::new();
    let mut out = Vec::new();
    let start = canonical(0, nodes, &mut canon, &mut signatures, &mut out);
    (out, start)
}

#[derive(Debug)]
enum Piece {
    /// Instruction bytes without outgoing jumps; execution falls through.
    Code(Vec<u8>),
    /// An instruction whose jump table entry `i` points at the `i`-th
    /// [`Piece::Jump`] following it.
    Dispatch { header: Vec<u8>, entries: usize },
    /// A branch to the first instruction of a state. Zero sized when the
    /// target directly follows.
    Jump { target: usize, size: usize },
}

impl Piece {
    fn size(&self) -> usize {
        match self {
            Piece::Code(bytes) => bytes.len(),
            Piece::Dispatch { header, entries } => header.len() + entries,
            Piece::Jump { size, .. } => *size,
        }
    }
}

struct ProgramWriter<'g> {
    graph: &'g DigitGraph,
    pieces: Vec<Piece>,
    /// Index of the first piece of each emitted state.
    block_start: HashMap<usize, usize>,
}

impl<'g> ProgramWriter<'g> {
    fn new(graph: &'g DigitGraph) -> Self {
        Self { graph, pieces: Vec::new(), block_start: HashMap::new() }
    }

    fn write(mut self) -> Result<Program, CompileError> {
        let in_degree = self.graph.in_degrees();
        let mut absorbed = vec![false; self.graph.nodes.len()];
        for state in self.graph.layout_order() {
            if absorbed[state] {
                continue;
            }
            self.block_start.insert(state, self.pieces.len());
            self.emit_state(state, &in_degree, &mut absorbed);
        }
        let positions = self.resolve_jumps()?;
        Ok(Program::from_bytes(self.encode(&positions)))
    }

    fn emit_state(&mut self, state: usize, in_degree: &[usize], absorbed: &mut [bool]) {
        let node = self.graph.nodes[state];
        let terminal = node.accepting;
        let groups = node.groups();
        match groups.as_slice() {
            [] => self.code(Instruction::Branch { offset: 0, long: false }),
            [(mask, target)] if mask.count_ones() == 1 => {
                self.code(Instruction::Single { digit: mask.trailing_zeros() as u8, terminal });
                self.jump(*target);
            }
            [(ALL_DIGITS, target)] => {
                let (count, target) = if terminal {
                    (1, *target)
                } else {
                    self.run_chain(*target, in_degree, absorbed)
                };
                self.code(Instruction::Run { count, terminal });
                self.jump(target);
            }
            [(mask, target)] => {
                self.code(Instruction::Set { mask: *mask, terminal, jump_table: None });
                self.jump(*target);
            }
            [(member, first), (other, second)] if member | other == ALL_DIGITS => {
                let mut header = Vec::with_capacity(4);
                // the table bytes are patched in once offsets are known
                Instruction::Set { mask: *member, terminal, jump_table: Some([0, 0]) }
                    .encode(&mut header);
                header.truncate(2);
                self.pieces.push(Piece::Dispatch { header, entries: 2 });
                self.jump(*first);
                self.jump(*second);
            }
            _ => {
                let mut indices = [0u8; 10];
                for (index, (mask, _)) in groups.iter().enumerate() {
                    for digit in 0..10 {
                        if *mask & (1u16 << digit) != 0 {
                            indices[digit] = index as u8 + 1;
                        }
                    }
                }
                // groups are ordered by their lowest digit, so every index fits
                let indices = pack_map_indices(&indices).unwrap_or_default();
                let mut header = Vec::with_capacity(4);
                let instruction = if terminal {
                    Instruction::TerminalMap { indices, jump_table: &[] }
                } else {
                    Instruction::Map { indices, jump_table: &[] }
                };
                instruction.encode(&mut header);
                self.pieces.push(Piece::Dispatch { header, entries: groups.len() });
                for (_, target) in &groups {
                    self.jump(*target);
                }
            }
        }
    }

    /// Follows a chain of non-accepting states reached only from their
    /// predecessor by any digit, folding them into one run.
    fn run_chain(&self, mut target: usize, in_degree: &[usize], absorbed: &mut [bool]) -> (u8, usize) {
        let mut count = 1;
        while count < MAX_RUN && target != TERMINAL && in_degree[target] == 1 {
            let node = self.graph.nodes[target];
            if node.accepting {
                break;
            }
            match node.groups().as_slice() {
                [(ALL_DIGITS, next)] => {
                    absorbed[target] = true;
                    target = *next;
                    count += 1;
                }
                _ => break,
            }
        }
        (count as u8, target)
    }

    fn code(&mut self, instruction: Instruction<'_>) {
        let mut bytes = Vec::with_capacity(2);
        instruction.encode(&mut bytes);
        self.pieces.push(Piece::Code(bytes));
    }

    fn jump(&mut self, target: usize) {
        self.pieces.push(Piece::Jump { target, size: 0 });
    }

    fn positions(&self) -> Vec<usize> {
        let mut positions = Vec::with_capacity(self.pieces.len() + 1);
        let mut position = 0;
        for piece in &self.pieces {
            positions.push(position);
            position += piece.size();
        }
        positions.push(position);
        positions
    }

    /// Grows jumps to the smallest branch encoding their distance needs,
    /// repeating until no size changes. Sizes never shrink, so distances
    /// only grow and the loop terminates.
    fn resolve_jumps(&mut self) -> Result<Vec<usize>, CompileError> {
        loop {
            let positions = self.positions();
            let mut changed = false;
            for index in 0..self.pieces.len() {
                let Piece::Jump { target, size } = self.pieces[index] else { continue };
                let end = positions[index] + size;
                let target_start = positions[self.block_start[&target]];
                // the layout is topological, a backward jump cannot be expressed
                let distance = target_start.checked_sub(end).ok_or_else(|| {
                    CompileError::BackwardJump { from: end, to: target_start }
                })?;
                let needed = match distance {
                    0 => 0,
                    1..=MAX_SHORT_BRANCH => 1,
                    d if d <= MAX_LONG_BRANCH => 2,
                    d => return Err(CompileError::ProgramTooLarge { distance: d, max: MAX_LONG_BRANCH }),
                };
                if needed > size {
                    self.pieces[index] = Piece::Jump { target, size: needed };
                    changed = true;
                }
            }
            if !changed {
                return Ok(positions);
            }
        }
    }

    fn encode(&self, positions: &[usize]) -> Vec<u8> {
        let mut out = Vec::with_capacity(positions[self.pieces.len()]);
        for (index, piece) in self.pieces.iter().enumerate() {
            match piece {
                Piece::Code(bytes) => out.extend_from_slice(bytes),
                Piece::Dispatch { header, entries } => {
                    out.extend_from_slice(header);
                    let table_start = positions[index] + header.len();
                    for entry in 0..*entries {
                        let trampoline = positions[index + 1 + entry];
                        let offset = trampoline - (table_start + entry + 1);
                        debug_assert!(offset <= MAX_TABLE_OFFSET);
                        out.push(offset as u8);
                    }
                }
                Piece::Jump { size: 0, .. } => {}
                Piece::Jump { target, size } => {
                    let end = positions[index] + size;
                    let offset = (positions[self.block_start[target]] - end) as u16;
                    Instruction::Branch { offset, long: *size == 2 }.encode(&mut out);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;
    use crate::matcher::{instruction::OpCode, DigitSequence, MatchResult};

    fn matches(program: &Program, digits: &str) -> MatchResult {
        program.match_digits(DigitSequence::parse(digits).unwrap())
    }

    fn all_digit_strings(max_len: usize) -> Vec<String> {
        let mut all = vec![String::new()];
        let mut layer = vec![String::new()];
        for _ in 0..max_len {
            layer = layer
                .iter()
                .flat_map(|prefix| (0..10).map(move |d| format!("{prefix}{d}")))
                .collect();
            all.extend(layer.iter().cloned());
        }
        all
    }

    #[test]
    fn simple_programs_have_expected_bytes() {
        assert_eq!(compile("5").unwrap().as_bytes(), &[0b0010_0101, 0x00]);
        assert_eq!(compile("5?").unwrap().as_bytes(), &[0b0011_0101, 0x00]);
        assert_eq!(compile(r"\d{3}").unwrap().as_bytes(), &[0b0100_0010, 0x00]);
        assert_eq!(compile("[2-4]").unwrap().as_bytes(), &[0b0110_0000, 0b0001_1100, 0x00]);
    }

    #[test]
    fn long_runs_are_split() {
        let program = compile(r"\d{20}").unwrap();
        assert_eq!(program.as_bytes(), &[0b0100_1111, 0b0100_0011, 0x00]);
        assert_eq!(matches(&program, "12345678901234567890"), MatchResult::Matched);
        assert_eq!(matches(&program, "1234567890123456789"), MatchResult::TooShort);
    }

    #[test]
    fn accepting_states_use_terminal_flags() {
        let program = compile(r"1\d{0,2}").unwrap();
        assert_eq!(matches(&program, "1"), MatchResult::Matched);
        assert_eq!(matches(&program, "12"), MatchResult::Matched);
        assert_eq!(matches(&program, "123"), MatchResult::Matched);
        assert_eq!(matches(&program, "1234"), MatchResult::TooLong);
        assert_eq!(matches(&program, ""), MatchResult::TooShort);
    }

    #[test]
    fn maps_dispatch_on_digit() {
        let program = compile(r"1\d|2[05]|3").unwrap();
        let (_, first) = program.instructions().next().unwrap();
        assert_eq!(first.opcode(), OpCode::Map);
        assert_eq!(matches(&program, "17"), MatchResult::Matched);
        assert_eq!(matches(&program, "25"), MatchResult::Matched);
        assert_eq!(matches(&program, "24"), MatchResult::Invalid);
        assert_eq!(matches(&program, "3"), MatchResult::Matched);
        assert_eq!(matches(&program, "2"), MatchResult::TooShort);
        assert_eq!(matches(&program, "4"), MatchResult::Invalid);
    }

    #[test]
    fn compilation_is_deterministic() {
        let pattern = r"[2-9]\d{2}|800\d{3,4}|1[2-5]\d?";
        let first = compile(pattern).unwrap();
        for _ in 0..5 {
            assert_eq!(compile(pattern).unwrap(), first);
        }
        // equivalent patterns share a minimal automaton and hence the bytes
        assert_eq!(compile("12|13").unwrap(), compile("1[23]").unwrap());
    }

    #[test]
    fn agrees_with_regex_on_small_inputs() {
        let patterns = [
            r"[2-9]\d{2}",
            r"800\d?|80",
            r"1\d?|2[13-5]\d|3",
            r"0?[1-3]\d{2}",
            r"[02468]{2}|[13579]\d{3}",
            r"9\d{3}|99",
        ];
        let inputs = all_digit_strings(4);
        for pattern in patterns {
            let program = compile(pattern).unwrap();
            let full = Regex::new(&format!("^(?:{pattern})$")).unwrap();
            let accepted: Vec<&String> = inputs.iter().filter(|s| full.is_match(s)).collect();
            for input in &inputs {
                let is_match = full.is_match(input);
                let is_proper_prefix =
                    accepted.iter().any(|a| a.len() > input.len() && a.starts_with(input.as_str()));
                let result = matches(&program, input);
                assert_eq!(result == MatchResult::Matched, is_match, "{pattern} on '{input}'");
                assert_eq!(
                    result == MatchResult::TooShort,
                    !is_match && is_proper_prefix,
                    "{pattern} on '{input}'"
                );
            }
        }
    }

    #[test]
    fn states_are_numbered_initial_terminal_then_discovery() {
        let graph = DigitGraph::from_alternatives(&parse_pattern(r"1\d{2}|2").unwrap());
        assert_eq!(graph.nodes.len(), 4);
        let terminal = graph.nodes[TERMINAL];
        assert!(terminal.accepting && terminal.next.iter().all(Option::is_none));
        // initial: 1 -> state 2, 2 -> terminal
        assert_eq!(graph.nodes[INITIAL].next[1], Some(2));
        assert_eq!(graph.nodes[INITIAL].next[2], Some(TERMINAL));
        assert_eq!(graph.nodes[2].next[0], Some(3));
        assert_eq!(graph.layout_order(), vec![0, 2, 3, 1]);
    }
}
