//! Compiler back-end: transforms a Pattern tree into a CompiledRegex

use crate::ast::{AnchorKind, ParsedPattern, Pattern};
use crate::bytesearch::{AsciiBitmap, ByteArraySet};
use crate::insn::{CompiledRegex, Insn, LoopFields};
use crate::startpredicate;
use crate::types::{CaptureGroupID, CharRange, ClassContents, LoopID};

/// \return an anchor instruction for a given anchor kind.
fn make_anchor(kind: AnchorKind) -> Insn {
    match kind {
        AnchorKind::StartOfInput => Insn::StartOfInput,
        AnchorKind::EndOfInput => Insn::EndOfInput,
    }
}

/// \return all chars of a class if it contains only a few ASCII chars.
fn small_ascii_set(ranges: &[CharRange], limit: usize) -> Option<Vec<u8>> {
    let mut result = Vec::new();
    for &(lo, hi) in ranges {
        if !hi.is_ascii() {
            return None;
        }
        for b in (lo as u8)..=(hi as u8) {
            if result.len() == limit {
                return None;
            }
            result.push(b);
        }
    }
    Some(result)
}

/// If the given class can be represented as ASCII contents, return the
/// bitmap. Otherwise nothing.
fn bracket_as_ascii(ranges: &[CharRange]) -> Option<AsciiBitmap> {
    let mut result = AsciiBitmap::default();
    for &(lo, hi) in ranges {
        debug_assert!(lo <= hi);
        if !hi.is_ascii() {
            return None;
        }
        for bit in (lo as u8)..=(hi as u8) {
            result.set(bit)
        }
    }
    Some(result)
}

/// Type which wraps up the context needed to emit a CompiledRegex.
struct Emitter {
    result: CompiledRegex,

    // Number of loops seen so far.
    next_loop_id: u32,
}

impl Emitter {
    /// Emit an instruction.
    fn emit_insn(&mut self, insn: Insn) {
        self.result.insns.push(insn);
    }

    /// Get an instruction at a given index.
    fn get_insn(&mut self, idx: u32) -> &mut Insn {
        &mut self.result.insns[idx as usize]
    }

    /// \return the offset of the next instruction emitted.
    fn next_offset(&self) -> u32 {
        self.result.insns.len() as u32
    }

    fn emit_insn_offset(&mut self, insn: Insn) -> u32 {
        let ret = self.next_offset();
        self.emit_insn(insn);
        ret
    }

    /// Emit a single instruction matching one char of a class.
    fn emit_class(&mut self, ranges: &[CharRange], negate: bool) {
        let insn = match (negate, ranges.is_empty()) {
            (false, true) => Insn::JustFail,
            (true, true) => Insn::MatchAny,
            (true, false) => self.push_bracket(ranges, negate),
            (false, false) => match small_ascii_set(ranges, 3).as_deref() {
                Some(&[b]) => Insn::Char(b as char),
                Some(&[b0, b1]) => Insn::ByteSet2(ByteArraySet([b0, b1])),
                Some(&[b0, b1, b2]) => Insn::ByteSet3(ByteArraySet([b0, b1, b2])),
                _ => match bracket_as_ascii(ranges) {
                    Some(bitmap) => Insn::AsciiBracket(bitmap),
                    None => self.push_bracket(ranges, negate),
                },
            },
        };
        self.emit_insn(insn)
    }

    fn push_bracket(&mut self, ranges: &[CharRange], negate: bool) -> Insn {
        let idx = self.result.brackets.len();
        self.result.brackets.push(ClassContents {
            negate,
            ranges: ranges.to_vec(),
        });
        Insn::Bracket(idx)
    }

    /// \return whether a node emits exactly one instruction which always
    /// matches exactly one char, so it may be the body of a Loop1CharBody.
    fn is_single_char_insn(node: &Pattern) -> bool {
        match node {
            Pattern::CharClass { ranges, negate } => *negate || !ranges.is_empty(),
            _ => node.matches_exactly_one_char(),
        }
    }

    /// Emit instructions corresponding to a given node.
    fn emit_node(&mut self, node: &Pattern) {
        match node {
            Pattern::Literal(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => {}
                    (Some(c), None) => self.emit_insn(Insn::Char(c)),
                    _ => self.emit_insn(Insn::ByteSeq(text.as_bytes().into())),
                }
            }
            Pattern::AnyChar => self.emit_insn(Insn::MatchAny),
            Pattern::Concat(children) => {
                for nn in children {
                    self.emit_node(nn)
                }
            }
            Pattern::Alternation(branches) => {
                // Each branch but the last is preceded by an Alt pointing at the
                // next branch, and followed by a jump to the continuation.
                let mut exit_jumps = Vec::new();
                if let Some((last, rest)) = branches.split_last() {
                    for branch in rest {
                        let alt_insn = self.emit_insn_offset(Insn::Alt { secondary: 0 });
                        self.emit_node(branch);
                        exit_jumps.push(self.emit_insn_offset(Insn::Jump { target: 0 }));
                        let next_branch = self.next_offset();
                        match self.get_insn(alt_insn) {
                            Insn::Alt { secondary } => *secondary = next_branch,
                            _ => panic!("Should be an Alt instruction"),
                        }
                    }
                    self.emit_node(last);
                }
                // Fix up our jump targets.
                let exit = self.next_offset();
                for jump_insn in exit_jumps {
                    match self.get_insn(jump_insn) {
                        Insn::Jump { target } => *target = exit,
                        _ => panic!("Should be a Jump instruction"),
                    }
                }
            }
            Pattern::Repeat {
                inner,
                min,
                max,
                greedy,
            } => {
                let max_iters = max.unwrap_or(usize::MAX);
                if Self::is_single_char_insn(inner) {
                    self.emit_insn(Insn::Loop1CharBody {
                        min_iters: *min,
                        max_iters,
                        greedy: *greedy,
                    });
                    self.emit_node(inner);
                    return;
                }
                let loop_id = self.next_loop_id as LoopID;
                self.next_loop_id += 1;
                let loop_insn = self.emit_insn_offset(Insn::EnterLoop(LoopFields {
                    loop_id,
                    min_iters: *min,
                    max_iters,
                    greedy: *greedy,
                    exit: 0,
                }));
                self.result.loops += 1;
                self.emit_node(inner);
                self.emit_insn(Insn::LoopAgain { begin: loop_insn });
                // Fix up our loop exit.
                let exit = self.next_offset();
                match self.get_insn(loop_insn) {
                    Insn::EnterLoop(fields) => fields.exit = exit,
                    _ => panic!("Should be an EnterLoop instruction"),
                }
            }
            Pattern::Group {
                inner,
                capturing: true,
                index: Some(index),
            } => {
                debug_assert!(*index >= 1, "Group should not be zero");
                // -1 because group 1 has storage index 0.
                let group = (*index - 1) as CaptureGroupID;
                self.emit_insn(Insn::BeginCaptureGroup(group));
                self.emit_node(inner);
                self.emit_insn(Insn::EndCaptureGroup(group));
            }
            Pattern::Group { inner, .. } => self.emit_node(inner),
            Pattern::CharClass { ranges, negate } => self.emit_class(ranges, *negate),
            Pattern::Anchor(kind) => self.emit_insn(make_anchor(*kind)),
        }
    }
}

/// Compile the given pattern to a CompiledRegex.
pub fn emit(n: &ParsedPattern) -> CompiledRegex {
    let mut emitter = Emitter {
        next_loop_id: 0,
        result: CompiledRegex {
            insns: Vec::new(),
            brackets: Vec::new(),
            loops: 0,
            groups: n.groups as u32,
            flags: n.flags,
            start_pred: startpredicate::predicate_for_pattern(&n.node),
        },
    };
    emitter.emit_node(&n.node);
    emitter.emit_insn(Insn::Goal);
    debug!(
        "emitted {} instructions, {} loops, {} groups",
        emitter.result.insns.len(),
        emitter.result.loops,
        emitter.result.groups
    );
    emitter.result
}
