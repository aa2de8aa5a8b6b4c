use core::ops;

/// A group index is u16.
/// CaptureGroupID 0 corresponds to the first capture group, which the
/// public API reports as group 1.
pub type CaptureGroupID = u16;

/// The maximum number of capture groups supported.
pub const MAX_CAPTURE_GROUPS: usize = 65535;

/// The maximum number of loops supported.
pub const MAX_LOOPS: usize = 65535;

/// The maximum depth of nested groups.
pub const MAX_NESTING_DEPTH: usize = 250;
pub type LoopID = u16;

/// An inclusive range of chars, as stored in a character class.
pub type CharRange = (char, char);

/// The stuff in a bracket, after predefined classes have been expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassContents {
    pub negate: bool,
    pub ranges: Vec<CharRange>,
}

impl ClassContents {
    /// \return whether the class matches the given character \p c.
    /// Respects 'negate'.
    #[inline(always)]
    pub(crate) fn matches(&self, c: char) -> bool {
        let contained = self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
        contained != self.negate
    }

    /// \return whether this class can never match anything.
    pub fn is_empty(&self) -> bool {
        !self.negate && self.ranges.is_empty()
    }
}

/// An instruction pointer.
pub type IP = usize;

/// Representation of a loop.
#[derive(Debug, Copy, Clone)]
pub struct LoopData {
    pub iters: usize,
    pub entry: usize,
}

impl LoopData {
    pub fn new(entry: usize) -> LoopData {
        LoopData { iters: 0, entry }
    }
}

/// Representation of a capture group.
#[derive(Debug, Copy, Clone, Default)]
pub struct GroupData {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl GroupData {
    pub fn new() -> GroupData {
        GroupData {
            start: None,
            end: None,
        }
    }

    pub fn start_matched(&self) -> bool {
        self.start.is_some()
    }

    pub fn as_range(&self) -> Option<ops::Range<usize>> {
        // A group that was entered but whose exit has not been reached yet has
        // only a start.
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(ops::Range { start, end }),
            _ => None,
        }
    }

    /// Reset the group to "not entered."
    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
    }
}
