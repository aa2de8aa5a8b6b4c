use crate::bytesearch::{ByteArraySet, ByteSet, SmallArraySet};
use crate::indexing::Utf8Input;
use crate::types::ClassContents;

/// A trait for things that match a single char.
pub trait SingleCharMatcher {
    /// \return whether we match the character at the given position, advancing
    /// the position if so. On a false return, the position is unspecified.
    fn matches(&self, input: &Utf8Input, pos: &mut usize) -> bool;
}

/// Insn::Char
pub struct Char {
    pub c: char,
}

impl SingleCharMatcher for Char {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut usize) -> bool {
        match input.next_right(pos) {
            Some(c2) => c2 == self.c,
            _ => false,
        }
    }
}

/// Insn::Bracket
pub struct Bracket<'a> {
    pub bc: &'a ClassContents,
}

impl SingleCharMatcher for Bracket<'_> {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut usize) -> bool {
        match input.next_right(pos) {
            Some(c) => self.bc.matches(c),
            _ => false,
        }
    }
}

/// Insn::MatchAny
pub struct MatchAny {}

impl MatchAny {
    pub fn new() -> Self {
        Self {}
    }
}

impl SingleCharMatcher for MatchAny {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut usize) -> bool {
        // If there is a character, it counts as a match.
        input.next_right(pos).is_some()
    }
}

/// Any ByteSet may match a single ASCII char.
/// Non-ASCII lead bytes are never members, so a hit always lands on a char
/// boundary.
pub struct MatchByteSet<'a, Bytes: ByteSet> {
    pub bytes: &'a Bytes,
}

impl<Bytes: ByteSet> SingleCharMatcher for MatchByteSet<'_, Bytes> {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut usize) -> bool {
        match input.peek_byte_right(*pos) {
            Some(b) if self.bytes.contains(b) => {
                *pos += 1;
                true
            }
            _ => false,
        }
    }
}

/// Provide a variant for ByteArraySet where we hold it directly.
pub struct MatchByteArraySet<ArraySet: SmallArraySet> {
    pub bytes: ByteArraySet<ArraySet>,
}

impl<ArraySet: SmallArraySet> SingleCharMatcher for MatchByteArraySet<ArraySet> {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut usize) -> bool {
        match input.peek_byte_right(*pos) {
            Some(b) if b < 128 && self.bytes.contains(b) => {
                *pos += 1;
                true
            }
            _ => false,
        }
    }
}
