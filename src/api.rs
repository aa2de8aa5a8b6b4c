use crate::ast::ParsedPattern;
use crate::classicalbacktrack;
use crate::emit;
use crate::exec;
use crate::insn::CompiledRegex;
use crate::optimizer;
use crate::parse;

use core::{fmt, str::FromStr};

pub use crate::ast::{AnchorKind, Pattern};
pub use parse::{ErrorKind, SyntaxError};

/// Flags used to control pattern compilation.
/// The default flags run the optimizer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// If set, disable the optimizer passes. Matching behaves identically
    /// either way.
    pub no_opt: bool,
}

impl Flags {
    /// Construct a Flags from a sequence of flag letters.
    /// 'O' disables optimization. Other letters are not implemented and are
    /// ignored.
    #[inline]
    pub fn new<T: Iterator<Item = char>>(chars: T) -> Self {
        let mut result = Self::default();
        for c in chars {
            match c {
                'O' => {
                    result.no_opt = true;
                }
                _ => {
                    // Silently skip unsupported flags.
                }
            }
        }
        result
    }
}

impl From<&str> for Flags {
    /// Construct a Flags from a string of flag letters.
    ///
    /// See also: [`Flags::new`].
    #[inline]
    fn from(s: &str) -> Self {
        Self::new(s.chars())
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.no_opt {
            f.write_str("O")?;
        }
        Ok(())
    }
}

/// Range is used to express the extent of a match, as byte indexes into the
/// input string.
pub type Range = core::ops::Range<usize>;

/// An iterator type which yields `Match`es found in a string.
pub type Matches<'r, 't> = exec::Matches<classicalbacktrack::BacktrackExecutor<'r, 't>>;

/// A Match represents a portion of a string which was found to match a Regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The total range of the match. Note this may be empty, if the regex
    /// matched an empty string.
    pub range: Range,

    /// The list of captures. This has length equal to the number of capturing
    /// groups in the regex. For each capture, if the value is None, that group
    /// did not match (for example, it was in a not-taken branch of an
    /// alternation). If the value is Some, the group did match with the
    /// enclosed range. A group inside a repetition holds the span of the last
    /// iteration.
    pub captures: Vec<Option<Range>>,
}

impl Match {
    /// Access a capture by index. Index 0 is the total match, index 1 is the
    /// first capture group. Indexes past the last group yield None.
    #[inline]
    pub fn capture(&self, idx: usize) -> Option<Range> {
        if idx == 0 {
            Some(self.range.clone())
        } else {
            self.captures.get(idx - 1).cloned().flatten()
        }
    }

    /// Access a group by index, using the convention of Python's group()
    /// function. This is the same as [`Match::capture`].
    #[inline]
    pub fn group(&self, idx: usize) -> Option<Range> {
        self.capture(idx)
    }

    /// Returns the range over the starting and ending byte offsets of the match in the haystack.
    ///
    /// This is a convenience function to work around
    /// the fact that Range does not support Copy.
    #[inline]
    pub fn range(&self) -> Range {
        self.range.clone()
    }

    /// Returns the starting byte offset of the match in the haystack.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the ending byte offset of the match in the haystack.
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Return an iterator over a Match. The first returned value is the total
    /// match, and subsequent values represent the capture groups.
    #[inline]
    pub fn groups(&self) -> Groups<'_> {
        Groups::new(self)
    }
}

/// An iterator over the capture groups of a [`Match`]
///
/// This struct is created by the [`groups`] method on [`Match`].
///
/// [`Match`]: ../struct.Match.html
/// [`groups`]: ../struct.Match.html#method.groups
#[derive(Clone)]
pub struct Groups<'m> {
    mat: &'m Match,
    i: usize,
    max: usize,
}

impl<'m> Groups<'m> {
    #[inline]
    fn new(mat: &'m Match) -> Self {
        Self {
            mat,
            i: 0,
            max: mat.captures.len() + 1,
        }
    }
}

impl Iterator for Groups<'_> {
    type Item = Option<Range>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let i = self.i;
        if i < self.max {
            self.i += 1;
            Some(self.mat.capture(i))
        } else {
            None
        }
    }
}

/// A Regex is the compiled version of a pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    source: String,
    node: Pattern,
    cr: CompiledRegex,
}

impl Regex {
    /// Construct a regex by parsing `pattern` using the default flags.
    /// A SyntaxError may be returned if the syntax is invalid.
    /// Note that this is rather expensive; prefer to cache a Regex which is
    /// intended to be used more than once.
    #[inline]
    pub fn new(pattern: &str) -> Result<Regex, SyntaxError> {
        Self::with_flags(pattern, Flags::default())
    }

    /// Construct a regex by parsing `pattern` with `flags`.
    /// A SyntaxError may be returned if the syntax is invalid.
    pub fn with_flags<F>(pattern: &str, flags: F) -> Result<Regex, SyntaxError>
    where
        F: Into<Flags>,
    {
        let flags = flags.into();
        let mut ire = parse::try_parse(pattern, flags)?;
        if !flags.no_opt {
            optimizer::optimize(&mut ire);
        }
        let cr = emit::emit(&ire);
        let ParsedPattern { node, .. } = ire;
        Ok(Regex {
            source: pattern.to_string(),
            node,
            cr,
        })
    }

    /// Attempts a match which begins exactly at byte offset `start` of `text`.
    /// Returns None if there is no such match, or if `start` is past the end
    /// of `text` or not on a char boundary.
    #[inline]
    pub fn find(&self, text: &str, start: usize) -> Option<Match> {
        classicalbacktrack::BacktrackExecutor::new(&self.cr, text).try_at(start)
    }

    /// Searches `text` to find the first match, trying each start offset in
    /// turn.
    #[inline]
    pub fn search(&self, text: &str) -> Option<Match> {
        self.search_from(text, 0)
    }

    /// Searches `text` to find the first match beginning at or after byte
    /// offset `start`.
    #[inline]
    pub fn search_from(&self, text: &str, start: usize) -> Option<Match> {
        self.find_from(text, start).next()
    }

    /// Returns whether `text` contains a match anywhere.
    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.search(text).is_some()
    }

    /// Searches `text`, returning an iterator over non-overlapping matches.
    /// After an empty match, the next search begins one character later.
    #[inline]
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        self.find_from(text, 0)
    }

    /// Returns an iterator for matches found in 'text' starting at byte index
    /// `start`.
    pub fn find_from<'r, 't>(&'r self, text: &'t str, start: usize) -> Matches<'r, 't> {
        exec::Matches::new(
            classicalbacktrack::BacktrackExecutor::new(&self.cr, text),
            start,
        )
    }

    /// Returns the pattern tree. When optimization is enabled this is the
    /// optimized tree.
    #[inline]
    pub fn pattern(&self) -> &Pattern {
        &self.node
    }

    /// Returns the source text this regex was compiled from.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the number of capturing groups.
    #[inline]
    pub fn captures_len(&self) -> usize {
        self.cr.groups as usize
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Regex {
    type Err = SyntaxError;

    /// Attempts to parse a string into a regular expression
    #[inline]
    fn from_str(s: &str) -> Result<Self, SyntaxError> {
        Self::new(s)
    }
}

/// Compiles `pattern` with the default flags.
#[inline]
pub fn compile(pattern: &str) -> Result<Regex, SyntaxError> {
    Regex::new(pattern)
}

/// Attempts a match of `re` which begins exactly at byte offset `start` of
/// `text`.
#[inline]
pub fn find(re: &Regex, text: &str, start: usize) -> Option<Match> {
    re.find(text, start)
}

/// Finds the first match of `re` anywhere in `text`.
#[inline]
pub fn search(re: &Regex, text: &str) -> Option<Match> {
    re.search(text)
}

/// Returns a pattern which matches `text` literally.
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

// Access to the individual compilation stages, for tooling.
#[doc(hidden)]
pub mod backends {
    pub use crate::ast::ParsedPattern;
    pub use crate::emit::emit;
    pub use crate::insn::CompiledRegex;
    pub use crate::optimizer::optimize;
    pub use crate::parse::try_parse;
}
