//! Parser from pattern strings to the Pattern tree

use crate::api;
use crate::ast::{AnchorKind, ParsedPattern, Pattern};
use crate::charclasses::{self, ClassEscape};
use crate::types::{CharRange, MAX_CAPTURE_GROUPS, MAX_LOOPS, MAX_NESTING_DEPTH};
use std::fmt;

/// The reason a pattern failed to compile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A `(` without its `)`.
    UnterminatedGroup,
    /// A `)` without its `(`.
    UnmatchedCloseParen,
    /// A `[` without its `]`.
    UnterminatedClass,
    /// A quantifier with nothing before it to repeat.
    DanglingQuantifier,
    /// A malformed `{m,n}`, or one with `m > n`.
    InvalidRepeat,
    /// A class range whose low end exceeds its high end, or whose end is a
    /// predefined class.
    InvalidRange,
    /// A `\` at the end of the pattern.
    UnterminatedEscape,
    /// A `\` followed by a character with no escape meaning.
    UnknownEscape,
    /// An alternation with an empty branch, such as `a||b`.
    EmptyAlternationBranch,
    /// More capturing groups than can be numbered.
    CaptureLimitExceeded,
    /// More repetitions than can be tracked.
    LoopLimitExceeded,
    /// Groups nested more deeply than the parser allows.
    NestingLimitExceeded,
}

/// Represents an error encountered during pattern compilation.
/// The text contains a human-readable error message, and the position is the
/// byte offset in the pattern where parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub text: String,
    pub position: usize,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at offset {}", self.text, self.position)
    }
}

impl std::error::Error for SyntaxError {}

enum ClassAtom {
    CodePoint(char),
    CharacterClass(Vec<CharRange>),
}

fn make_cat(mut nodes: Vec<Pattern>) -> Pattern {
    match nodes.len() {
        1 => nodes.pop().unwrap_or_else(Pattern::empty),
        _ => Pattern::Concat(nodes),
    }
}

fn make_alt(mut nodes: Vec<Pattern>) -> Pattern {
    match nodes.len() {
        0 => Pattern::empty(),
        1 => nodes.pop().unwrap_or_else(Pattern::empty),
        _ => Pattern::Alternation(nodes),
    }
}

/// Parsed quantifier suffix.
#[derive(Debug, Copy, Clone)]
struct Quantifier {
    min: usize,
    max: Option<usize>,
    greedy: bool,
}

/// Represents the state used to parse a pattern.
struct Parser<'a> {
    /// The full pattern.
    pattern: &'a str,

    /// Byte offset of the next unparsed character.
    pos: usize,

    /// Flags used.
    flags: api::Flags,

    /// Number of loops.
    loop_count: usize,

    /// Number of capturing groups.
    group_count: usize,

    /// Number of groups enclosing the current position.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn error<T>(&self, kind: ErrorKind, position: usize, text: impl ToString) -> Result<T, SyntaxError> {
        Err(SyntaxError {
            kind,
            text: text.to_string(),
            position,
        })
    }

    /// Peek at the next character.
    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    /// Peek at the character after the next one.
    fn peek2(&self) -> Option<char> {
        let mut chars = self.pattern[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// \return the next character.
    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume a character which is known to be next.
    fn consume(&mut self, c: char) -> char {
        debug_assert!(self.peek() == Some(c), "char was not next");
        self.pos += c.len_utf8();
        c
    }

    /// If our contents begin with the char c, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.consume(c);
            true
        } else {
            false
        }
    }

    fn try_parse(&mut self) -> Result<ParsedPattern, SyntaxError> {
        // Parse a disjunction. If we consume everything, it's success. If
        // there's something left, it must be an excess closing paren.
        let body = self.consume_disjunction()?;
        match self.peek() {
            Some(')') => self.error(ErrorKind::UnmatchedCloseParen, self.pos, "Unmatched ')'"),
            Some(c) => self.error(
                ErrorKind::UnmatchedCloseParen,
                self.pos,
                format!("Unexpected char: {}", c),
            ),
            None => Ok(ParsedPattern {
                node: body,
                groups: self.group_count,
                flags: self.flags,
            }),
        }
    }

    /// alternation := concat ('|' concat)*
    fn consume_disjunction(&mut self) -> Result<Pattern, SyntaxError> {
        let mut branches = Vec::new();
        let mut empty_branch = None;
        loop {
            let branch_start = self.pos;
            let terms = self.consume_term()?;
            if terms.is_empty() && empty_branch.is_none() {
                empty_branch = Some(branch_start);
            }
            branches.push(make_cat(terms));
            if !self.try_consume('|') {
                break;
            }
        }
        if branches.len() > 1 {
            if let Some(position) = empty_branch {
                return self.error(
                    ErrorKind::EmptyAlternationBranch,
                    position,
                    "Empty alternation branch",
                );
            }
        }
        Ok(make_alt(branches))
    }

    /// concat := postfix*
    fn consume_term(&mut self) -> Result<Vec<Pattern>, SyntaxError> {
        let mut result: Vec<Pattern> = Vec::new();
        loop {
            let atom_start = self.pos;
            let c = match self.peek() {
                // A concatenation is terminated by closing parens or vertical
                // bar (alternations).
                None | Some(')') | Some('|') => break,
                Some(c) => c,
            };
            match c {
                '^' => {
                    self.consume('^');
                    result.push(Pattern::Anchor(AnchorKind::StartOfInput));
                }

                '$' => {
                    self.consume('$');
                    result.push(Pattern::Anchor(AnchorKind::EndOfInput));
                }

                '\\' => {
                    self.consume('\\');
                    result.push(self.consume_atom_escape(atom_start)?);
                }

                '.' => {
                    self.consume('.');
                    result.push(Pattern::AnyChar);
                }

                '(' => {
                    self.consume('(');
                    if self.group_count >= MAX_CAPTURE_GROUPS {
                        return self.error(
                            ErrorKind::CaptureLimitExceeded,
                            atom_start,
                            "Capture group count limit exceeded",
                        );
                    }
                    if self.depth >= MAX_NESTING_DEPTH {
                        return self.error(
                            ErrorKind::NestingLimitExceeded,
                            atom_start,
                            "Group nesting limit exceeded",
                        );
                    }
                    self.group_count += 1;
                    let index = self.group_count;
                    self.depth += 1;
                    let contents = self.consume_disjunction()?;
                    self.depth -= 1;
                    if !self.try_consume(')') {
                        return self.error(
                            ErrorKind::UnterminatedGroup,
                            self.pos,
                            "Unterminated group: missing ')'",
                        );
                    }
                    result.push(Pattern::Group {
                        inner: Box::new(contents),
                        capturing: true,
                        index: Some(index),
                    });
                }

                '[' => {
                    result.push(self.consume_bracket()?);
                }

                '*' | '+' | '?' | '{' => {
                    return self.error(
                        ErrorKind::DanglingQuantifier,
                        atom_start,
                        format!("Nothing to repeat before '{}'", c),
                    );
                }

                c => {
                    self.consume(c);
                    result.push(Pattern::Literal(c.to_string()));
                }
            }

            // We just parsed an atom; try parsing a quantifier. It binds to
            // that atom only.
            if let Some(quant) = self.try_consume_quantifier()? {
                if self.loop_count >= MAX_LOOPS {
                    return self.error(
                        ErrorKind::LoopLimitExceeded,
                        atom_start,
                        "Loop count limit exceeded",
                    );
                }
                self.loop_count += 1;
                let quantifee = match result.pop() {
                    Some(atom) => atom,
                    None => {
                        return self.error(
                            ErrorKind::DanglingQuantifier,
                            atom_start,
                            "Nothing to repeat",
                        )
                    }
                };
                result.push(Pattern::Repeat {
                    inner: Box::new(quantifee),
                    min: quant.min,
                    max: quant.max,
                    greedy: quant.greedy,
                });
            }
        }
        Ok(result)
    }

    /// '[' '^'? class-member* ']'
    fn consume_bracket(&mut self) -> Result<Pattern, SyntaxError> {
        self.consume('[');
        let negate = self.try_consume('^');
        let mut ranges: Vec<CharRange> = Vec::new();

        loop {
            match self.peek() {
                None => {
                    return self.error(
                        ErrorKind::UnterminatedClass,
                        self.pos,
                        "Unterminated character class: missing ']'",
                    );
                }
                Some(']') => {
                    self.consume(']');
                    return Ok(Pattern::CharClass {
                        ranges: charclasses::normalize(ranges),
                        negate,
                    });
                }
                _ => {}
            }

            // Parse a code point or character class.
            let first_start = self.pos;
            let first = self.consume_bracket_class_atom()?;

            // Check for a dash; we may have a range. A dash with no operand
            // after it, as in [a-], is a literal member.
            if self.peek() != Some('-') || matches!(self.peek2(), None | Some(']')) {
                add_class_atom(&mut ranges, first);
                continue;
            }
            self.consume('-');
            let second = self.consume_bracket_class_atom()?;

            // Ranges can't contain character classes: [\d-z] is invalid.
            // Ranges must also be in order: z-a is invalid.
            match (first, second) {
                (ClassAtom::CodePoint(lo), ClassAtom::CodePoint(hi)) if lo <= hi => {
                    ranges.push((lo, hi))
                }
                (ClassAtom::CodePoint(lo), ClassAtom::CodePoint(hi)) => {
                    return self.error(
                        ErrorKind::InvalidRange,
                        first_start,
                        format!("Range out of order in character class: {}-{}", lo, hi),
                    );
                }
                _ => {
                    return self.error(
                        ErrorKind::InvalidRange,
                        first_start,
                        "Invalid character range",
                    );
                }
            }
        }
    }

    /// Parse one class member. The caller has checked that we are not at
    /// the end of the class.
    fn consume_bracket_class_atom(&mut self) -> Result<ClassAtom, SyntaxError> {
        let escape_start = self.pos;
        match self.next() {
            Some('\\') => match self.peek() {
                None => self.error(
                    ErrorKind::UnterminatedEscape,
                    escape_start,
                    "Unterminated escape",
                ),
                Some(ec) => match ClassEscape::from_letter(ec) {
                    Some((class, positive)) => {
                        self.consume(ec);
                        Ok(ClassAtom::CharacterClass(class.ranges_with_sense(positive)))
                    }
                    None => Ok(ClassAtom::CodePoint(
                        self.consume_character_escape(escape_start)?,
                    )),
                },
            },
            Some(c) => Ok(ClassAtom::CodePoint(c)),
            None => self.error(
                ErrorKind::UnterminatedClass,
                self.pos,
                "Unterminated character class: missing ']'",
            ),
        }
    }

    fn try_consume_quantifier(&mut self) -> Result<Option<Quantifier>, SyntaxError> {
        if let Some(mut quant) = self.try_consume_quantifier_prefix()? {
            quant.greedy = !self.try_consume('?');
            Ok(Some(quant))
        } else {
            Ok(None)
        }
    }

    fn try_consume_quantifier_prefix(&mut self) -> Result<Option<Quantifier>, SyntaxError> {
        let quant = |min, max| Quantifier {
            min,
            max,
            greedy: true,
        };
        match self.peek() {
            Some('+') => {
                self.consume('+');
                Ok(Some(quant(1, None)))
            }
            Some('*') => {
                self.consume('*');
                Ok(Some(quant(0, None)))
            }
            Some('?') => {
                self.consume('?');
                Ok(Some(quant(0, Some(1))))
            }
            Some('{') => {
                let brace = self.pos;
                self.consume('{');
                let min = match self.try_consume_decimal_integer_literal() {
                    Some(min) => min,
                    None => {
                        return self.error(
                            ErrorKind::InvalidRepeat,
                            self.pos,
                            "Invalid repetition: expected a number after '{'",
                        )
                    }
                };
                let max = if self.try_consume(',') {
                    // Like {3,4}, or {3,} if no digits follow.
                    self.try_consume_decimal_integer_literal()
                } else {
                    // Like {3}.
                    Some(min)
                };
                if !self.try_consume('}') {
                    return self.error(
                        ErrorKind::InvalidRepeat,
                        self.pos,
                        "Invalid repetition: expected '}'",
                    );
                }
                if let Some(max) = max {
                    if min > max {
                        return self.error(
                            ErrorKind::InvalidRepeat,
                            brace,
                            format!("Invalid repetition: min {} exceeds max {}", min, max),
                        );
                    }
                }
                Ok(Some(quant(min, max)))
            }
            _ => Ok(None),
        }
    }

    /// If the value would overflow, usize::MAX is returned.
    /// All decimal digits are consumed regardless.
    fn try_consume_decimal_integer_literal(&mut self) -> Option<usize> {
        let mut result: usize = 0;
        let mut char_count = 0;
        while let Some(c) = self.peek() {
            if let Some(digit) = c.to_digit(10) {
                self.consume(c);
                char_count += 1;
                result = result.saturating_mul(10);
                result = result.saturating_add(digit as usize);
            } else {
                break;
            }
        }
        if char_count > 0 {
            Some(result)
        } else {
            None
        }
    }

    /// Parse the character after a backslash, which must be present.
    /// \p escape_start is the offset of the backslash.
    fn consume_character_escape(&mut self, escape_start: usize) -> Result<char, SyntaxError> {
        let c = match self.next() {
            Some(c) => c,
            None => {
                return self.error(
                    ErrorKind::UnterminatedEscape,
                    escape_start,
                    "Unterminated escape",
                )
            }
        };
        match c {
            'f' => Ok('\u{000C}'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'v' => Ok('\u{000B}'),
            // \0 must not be followed by a digit.
            '0' => match self.peek() {
                Some(d) if d.is_ascii_digit() => self.error(
                    ErrorKind::UnknownEscape,
                    escape_start,
                    format!("Unknown escape: \\0{}", d),
                ),
                _ => Ok('\0'),
            },

            // Syntax characters escape to themselves.
            '^' | '$' | '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
            | '-' | '/' => Ok(c),

            _ => self.error(
                ErrorKind::UnknownEscape,
                escape_start,
                format!("Unknown escape: \\{}", c),
            ),
        }
    }

    /// \p escape_start is the offset of the backslash, which has been
    /// consumed.
    fn consume_atom_escape(&mut self, escape_start: usize) -> Result<Pattern, SyntaxError> {
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return self.error(
                    ErrorKind::UnterminatedEscape,
                    escape_start,
                    "Unterminated escape",
                )
            }
        };
        if let Some((class, positive)) = ClassEscape::from_letter(c) {
            self.consume(c);
            return Ok(Pattern::CharClass {
                ranges: class.ranges().to_vec(),
                negate: !positive,
            });
        }
        let lit = self.consume_character_escape(escape_start)?;
        Ok(Pattern::Literal(lit.to_string()))
    }
}

fn add_class_atom(ranges: &mut Vec<CharRange>, atom: ClassAtom) {
    match atom {
        ClassAtom::CodePoint(c) => ranges.push((c, c)),
        ClassAtom::CharacterClass(class_ranges) => ranges.extend(class_ranges),
    }
}

/// Try parsing a given pattern.
/// Return the resulting tree, or an error.
pub fn try_parse(pattern: &str, flags: api::Flags) -> Result<ParsedPattern, SyntaxError> {
    let mut p = Parser {
        pattern,
        pos: 0,
        flags,
        loop_count: 0,
        group_count: 0,
        depth: 0,
    };
    let parsed = p.try_parse()?;
    debug!(
        "parsed {:?}: {} groups, {} loops",
        pattern, parsed.groups, p.loop_count
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str) -> Pattern {
        match try_parse(pattern, api::Flags::default()) {
            Ok(parsed) => parsed.node,
            Err(err) => panic!("Failed to parse {}: {}", pattern, err),
        }
    }

    fn parse_err(pattern: &str) -> SyntaxError {
        match try_parse(pattern, api::Flags::default()) {
            Ok(_) => panic!("Pattern should not have parsed: {}", pattern),
            Err(err) => err,
        }
    }

    fn lit(s: &str) -> Pattern {
        Pattern::Literal(s.to_string())
    }

    #[test]
    fn quantifier_binds_tightest_atom() {
        assert_eq!(
            parse("ab*"),
            Pattern::Concat(vec![
                lit("a"),
                Pattern::Repeat {
                    inner: Box::new(lit("b")),
                    min: 0,
                    max: None,
                    greedy: true,
                }
            ])
        );
    }

    #[test]
    fn bounded_and_lazy_quantifiers() {
        let repeat = |min, max, greedy| Pattern::Repeat {
            inner: Box::new(lit("a")),
            min,
            max,
            greedy,
        };
        assert_eq!(parse("a{3}"), repeat(3, Some(3), true));
        assert_eq!(parse("a{2,}"), repeat(2, None, true));
        assert_eq!(parse("a{2,5}?"), repeat(2, Some(5), false));
        assert_eq!(parse("a??"), repeat(0, Some(1), false));
        assert_eq!(parse("a+?"), repeat(1, None, false));
    }

    #[test]
    fn groups_numbered_by_open_paren() {
        let p = parse("((a)(b))(c)");
        assert_eq!(p.capture_indexes(), vec![1, 2, 3, 4]);
        let parsed = try_parse("((a)(b))(c)", api::Flags::default()).unwrap();
        assert_eq!(parsed.groups, 4);
    }

    #[test]
    fn class_ranges_and_literal_dashes() {
        assert_eq!(
            parse("[a-c]"),
            Pattern::CharClass {
                ranges: vec![('a', 'c')],
                negate: false
            }
        );
        assert_eq!(
            parse("[^-a]"),
            Pattern::CharClass {
                ranges: vec![('-', '-'), ('a', 'a')],
                negate: true
            }
        );
        assert_eq!(
            parse("[a-]"),
            Pattern::CharClass {
                ranges: vec![('-', '-'), ('a', 'a')],
                negate: false
            }
        );
        assert_eq!(
            parse(r"[\d_]"),
            Pattern::CharClass {
                ranges: vec![('0', '9'), ('_', '_')],
                negate: false
            }
        );
    }

    #[test]
    fn escapes_produce_literals() {
        for c in ".*+?()[]|^$\\{}".chars() {
            let pattern = format!("\\{}", c);
            assert_eq!(parse(&pattern), lit(&c.to_string()));
        }
        assert_eq!(parse(r"\n"), lit("\n"));
        assert_eq!(
            parse(r"\W"),
            Pattern::CharClass {
                ranges: charclasses::WORD_CHARS.to_vec(),
                negate: true
            }
        );
    }

    #[test]
    fn empty_pattern_and_group() {
        assert_eq!(parse(""), Pattern::empty());
        assert_eq!(
            parse("()"),
            Pattern::Group {
                inner: Box::new(Pattern::empty()),
                capturing: true,
                index: Some(1)
            }
        );
    }

    #[test]
    fn error_positions() {
        let err = parse_err("a(");
        assert_eq!(err.kind, ErrorKind::UnterminatedGroup);
        assert_eq!(err.position, 2);

        let err = parse_err("ab[cd");
        assert_eq!(err.kind, ErrorKind::UnterminatedClass);
        assert_eq!(err.position, 5);

        let err = parse_err("ab|*");
        assert_eq!(err.kind, ErrorKind::DanglingQuantifier);
        assert_eq!(err.position, 3);

        let err = parse_err("x{2,1}");
        assert_eq!(err.kind, ErrorKind::InvalidRepeat);
        assert_eq!(err.position, 1);

        let err = parse_err(r"ab\q");
        assert_eq!(err.kind, ErrorKind::UnknownEscape);
        assert_eq!(err.position, 2);

        let err = parse_err("a||b");
        assert_eq!(err.kind, ErrorKind::EmptyAlternationBranch);
        assert_eq!(err.position, 2);

        let err = parse_err("[z-a]");
        assert_eq!(err.kind, ErrorKind::InvalidRange);
        assert_eq!(err.position, 1);
    }

    #[test]
    fn error_display_includes_offset() {
        let err = parse_err("abc)");
        assert_eq!(err.kind, ErrorKind::UnmatchedCloseParen);
        assert_eq!(err.to_string(), "Unmatched ')' at offset 3");
    }
}
