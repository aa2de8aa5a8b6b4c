//! Abstract syntax tree for a pattern

use crate::api;
use crate::types::CharRange;
use core::fmt;

/// A zero-width assertion about the current position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnchorKind {
    /// `^`: matches only at offset 0.
    StartOfInput,
    /// `$`: matches only at the end of the input.
    EndOfInput,
}

/// A compiled pattern tree.
///
/// Once built the tree is never mutated; a [`crate::Regex`] owns its tree and
/// may be shared across threads and reused for any number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// An exact sequence of characters.
    Literal(String),

    /// Matches exactly one character (`.`).
    AnyChar,

    /// Sequential composition. The empty Concat matches the empty string.
    Concat(Vec<Pattern>),

    /// Ordered choice: branches are tried left to right and the first one
    /// that lets the rest of the pattern succeed wins.
    Alternation(Vec<Pattern>),

    /// Repetition of `inner` between `min` and `max` times (`None` is
    /// unbounded).
    Repeat {
        inner: Box<Pattern>,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    },

    /// A parenthesized sub-pattern. Capturing groups carry their 1-based
    /// index, assigned by the position of the opening parenthesis.
    Group {
        inner: Box<Pattern>,
        capturing: bool,
        index: Option<usize>,
    },

    /// Matches one character iff it falls in some range, or outside all of
    /// them when `negate` is set.
    CharClass { ranges: Vec<CharRange>, negate: bool },

    /// A zero-width assertion.
    Anchor(AnchorKind),
}

impl Pattern {
    /// \return a pattern which matches the empty string.
    pub fn empty() -> Pattern {
        Pattern::Concat(Vec::new())
    }

    /// \return whether this is the empty Concat.
    pub fn is_empty(&self) -> bool {
        matches!(self, Pattern::Concat(nodes) if nodes.is_empty())
    }

    /// \return whether this pattern is known to match exactly one char.
    /// This is best-effort: a false return is always safe.
    pub fn matches_exactly_one_char(&self) -> bool {
        match self {
            Pattern::Literal(s) => s.chars().count() == 1,
            Pattern::AnyChar => true,
            Pattern::CharClass { .. } => true,
            _ => false,
        }
    }

    /// \return whether this pattern may succeed without consuming input.
    pub fn can_match_empty(&self) -> bool {
        match self {
            Pattern::Literal(s) => s.is_empty(),
            Pattern::AnyChar | Pattern::CharClass { .. } => false,
            Pattern::Anchor(..) => true,
            Pattern::Concat(nodes) => nodes.iter().all(Pattern::can_match_empty),
            Pattern::Alternation(nodes) => nodes.iter().any(Pattern::can_match_empty),
            Pattern::Repeat { inner, min, .. } => *min == 0 || inner.can_match_empty(),
            Pattern::Group { inner, .. } => inner.can_match_empty(),
        }
    }

    /// \return the indexes of all capturing groups within this pattern,
    /// including itself, in textual order.
    pub fn capture_indexes(&self) -> Vec<usize> {
        let mut result = Vec::new();
        walk(false, self, &mut |n: &Pattern, _w: &mut Walk| {
            if let Pattern::Group {
                capturing: true,
                index: Some(idx),
                ..
            } = n
            {
                result.push(*idx)
            }
        });
        result
    }
}

/// A helper type for walking.
#[derive(Debug, Clone)]
pub struct Walk {
    // It set to true, skip the children of this node.
    pub skip_children: bool,

    // The current depth of the walk.
    pub depth: usize,
}

impl Walk {
    fn new() -> Self {
        Self {
            skip_children: false,
            depth: 0,
        }
    }
}

#[derive(Debug)]
struct Walker<'a, F>
where
    F: FnMut(&Pattern, &mut Walk),
{
    func: &'a mut F,
    postorder: bool,
    walk: Walk,
}

impl<F> Walker<'_, F>
where
    F: FnMut(&Pattern, &mut Walk),
{
    fn process_children(&mut self, n: &Pattern) {
        match n {
            Pattern::Literal(..)
            | Pattern::AnyChar
            | Pattern::CharClass { .. }
            | Pattern::Anchor(..) => {}
            Pattern::Concat(nodes) | Pattern::Alternation(nodes) => {
                for node in nodes {
                    self.process(node);
                }
            }
            Pattern::Repeat { inner, .. } | Pattern::Group { inner, .. } => {
                self.process(inner.as_ref())
            }
        }
    }

    fn process(&mut self, n: &Pattern) {
        self.walk.skip_children = false;
        if !self.postorder {
            (self.func)(n, &mut self.walk);
        }
        if !self.walk.skip_children {
            self.walk.depth += 1;
            self.process_children(n);
            self.walk.depth -= 1;
        }
        if self.postorder {
            (self.func)(n, &mut self.walk)
        }
    }
}

#[derive(Debug)]
struct MutWalker<'a, F>
where
    F: FnMut(&mut Pattern, &mut Walk),
{
    func: &'a mut F,
    postorder: bool,
    walk: Walk,
}

impl<F> MutWalker<'_, F>
where
    F: FnMut(&mut Pattern, &mut Walk),
{
    fn process_children(&mut self, n: &mut Pattern) {
        match n {
            Pattern::Literal(..)
            | Pattern::AnyChar
            | Pattern::CharClass { .. }
            | Pattern::Anchor(..) => {}
            Pattern::Concat(nodes) | Pattern::Alternation(nodes) => {
                nodes.iter_mut().for_each(|node| self.process(node));
            }
            Pattern::Repeat { inner, .. } | Pattern::Group { inner, .. } => {
                self.process(inner.as_mut())
            }
        }
    }

    fn process(&mut self, n: &mut Pattern) {
        self.walk.skip_children = false;
        if !self.postorder {
            (self.func)(n, &mut self.walk);
        }
        if !self.walk.skip_children {
            self.walk.depth += 1;
            self.process_children(n);
            self.walk.depth -= 1;
        }
        if self.postorder {
            (self.func)(n, &mut self.walk);
        }
    }
}

/// Call a function on every Pattern node.
/// If \p postorder is true, then process children before the node;
/// otherwise process children after the node.
pub fn walk<F>(postorder: bool, n: &Pattern, func: &mut F)
where
    F: FnMut(&Pattern, &mut Walk),
{
    let mut walker = Walker {
        func,
        postorder,
        walk: Walk::new(),
    };
    walker.process(n);
}

/// Call a function on every Pattern node, which may mutate the node.
/// If \p postorder is true, then process children before the node;
/// otherwise process children after the node.
/// A preorder function may set `skip_children` to avoid descending.
pub fn walk_mut<F>(postorder: bool, n: &mut Pattern, func: &mut F)
where
    F: FnMut(&mut Pattern, &mut Walk),
{
    let mut walker = MutWalker {
        func,
        postorder,
        walk: Walk::new(),
    };
    walker.process(n);
}

/// A pattern as produced by the parser, together with what the later stages
/// need to know about it.
#[derive(Debug, Clone)]
pub struct ParsedPattern {
    pub node: Pattern,

    /// Number of capturing groups.
    pub groups: usize,

    pub flags: api::Flags,
}

fn display_node(node: &Pattern, depth: usize, f: &mut fmt::Formatter) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "..")?;
    }
    match node {
        Pattern::Literal(text) => writeln!(f, "Literal {:?}", text),
        Pattern::AnyChar => writeln!(f, "AnyChar"),
        Pattern::Concat(nodes) if nodes.is_empty() => writeln!(f, "Empty"),
        Pattern::Concat(..) => writeln!(f, "Concat"),
        Pattern::Alternation(nodes) => writeln!(f, "Alternation ({} branches)", nodes.len()),
        Pattern::Repeat {
            min, max, greedy, ..
        } => {
            let kind = if *greedy { "greedy" } else { "lazy" };
            match max {
                Some(max) => writeln!(f, "Repeat {{{},{}}} {}", min, max, kind),
                None => writeln!(f, "Repeat {{{},}} {}", min, kind),
            }
        }
        Pattern::Group {
            capturing: true,
            index: Some(idx),
            ..
        } => writeln!(f, "Group {}", idx),
        Pattern::Group { .. } => writeln!(f, "Group (non-capturing)"),
        Pattern::CharClass { ranges, negate } => {
            write!(f, "CharClass{}", if *negate { " ^" } else { "" })?;
            for &(lo, hi) in ranges {
                if lo == hi {
                    write!(f, " {:?}", lo)?;
                } else {
                    write!(f, " {:?}-{:?}", lo, hi)?;
                }
            }
            writeln!(f)
        }
        Pattern::Anchor(kind) => writeln!(f, "Anchor {:?}", kind),
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = Ok(());
        walk(false, self, &mut |node: &Pattern, walk: &mut Walk| {
            if result.is_ok() {
                result = display_node(node, walk.depth, f)
            }
        });
        result
    }
}

impl fmt::Display for ParsedPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}
