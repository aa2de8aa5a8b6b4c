//! Bytecode instructions for a compiled regex

use crate::api;
use crate::bytesearch::{AsciiBitmap, ByteArraySet, ByteBitmap};
use crate::types::{CaptureGroupID, ClassContents, LoopID};
extern crate memchr;
use core::fmt;
use memchr::memmem;

type JumpTarget = u32;

#[derive(Debug, Clone)]
pub struct LoopFields {
    pub loop_id: LoopID,
    pub min_iters: usize,
    pub max_iters: usize,
    pub greedy: bool,
    pub exit: JumpTarget,
}

#[derive(Debug, Clone)]
/// The list of bytecode instructions.
pub enum Insn {
    /// The match was successful.
    Goal,

    /// Match a single char.
    Char(char),

    /// Match the start of the input; emitted by '^'
    StartOfInput,

    /// Match the end of the input; emitted by '$'
    EndOfInput,

    /// Match any character; emitted by '.'
    MatchAny,

    /// Enter a loop from "outside".
    EnterLoop(LoopFields),

    /// Re-enter a loop.
    LoopAgain { begin: JumpTarget },

    /// The next instruction is a "1Char" instruction which always matches one
    /// character. Attempt to match it [min, max] times.
    Loop1CharBody {
        min_iters: usize,
        max_iters: usize,
        greedy: bool,
    },

    /// Set the IP to a new value.
    Jump { target: JumpTarget },

    /// The next instruction is the primary branch.
    /// If it fails to match, jump to secondary.
    Alt { secondary: JumpTarget },

    /// Enter a capture group.
    BeginCaptureGroup(CaptureGroupID),

    /// Exit a capture group.
    EndCaptureGroup(CaptureGroupID),

    /// Match the next character against the class contents, stored at the
    /// given index in the CompiledRegex.
    Bracket(usize),

    /// A simple bitmap bracket for ASCII.
    /// It contains a bitmap of the range [0, 127].
    AsciiBracket(AsciiBitmap),

    /// Match the next byte against some ASCII possibilities.
    ByteSet2(ByteArraySet<[u8; 2]>),
    ByteSet3(ByteArraySet<[u8; 3]>),

    /// Match a sequence of literal bytes, which are a whole number of chars.
    ByteSeq(Box<[u8]>),

    /// An instruction that always fails, emitted for the empty class `[]`.
    JustFail,
}

/// The peeled prefix start predicate.
/// This is a fast way of locating the first potential match.
#[derive(Debug, Clone)]
pub enum StartPredicate {
    /// May match an arbitrary sequence.
    Arbitrary,

    /// Look for the first instance of any of the given bytes.
    ByteSet2([u8; 2]),
    ByteSet3([u8; 3]),

    /// Look for a byte sequence.
    ByteSeq(Box<memmem::Finder<'static>>),

    /// Look for a byte which matches the bitmap.
    ByteBracket(ByteBitmap),

    /// The regex is anchored to the start of the input.
    /// This avoids string searching entirely and only tries matching at offset 0.
    StartAnchored,
}

#[derive(Debug, Clone)]
pub struct CompiledRegex {
    // Sequence of instructions.
    pub insns: Vec<Insn>,

    // The class contents, indexed by the value of the `Bracket` instruction.
    pub brackets: Vec<ClassContents>,

    // Predicate to rapidly find the first potential match.
    pub start_pred: StartPredicate,

    // Number of loops, used to populate loop data.
    pub loops: u32,

    // Number of capture groups, used to populate capture group data.
    pub groups: u32,

    // Flags used to compile.
    pub flags: api::Flags,
}

impl fmt::Display for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, insn) in self.insns.iter().enumerate() {
            match insn {
                Insn::Bracket(bidx) => {
                    writeln!(f, "{:>4}: Bracket({}) {:?}", idx, bidx, self.brackets[*bidx])?
                }
                Insn::ByteSeq(bytes) => writeln!(
                    f,
                    "{:>4}: ByteSeq({:?})",
                    idx,
                    String::from_utf8_lossy(bytes)
                )?,
                _ => writeln!(f, "{:>4}: {:?}", idx, insn)?,
            }
        }
        writeln!(f, "start predicate: {:?}", self.start_pred)
    }
}
