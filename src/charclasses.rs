use crate::types::CharRange;

// Character classes like \d or \S, and helpers for manipulating sorted range
// lists.

/// Construct a range from a single char.
const fn r1(c: char) -> CharRange {
    (c, c)
}

// Note all of these are sorted and disjoint.

/// Word characters: [0-9A-Za-z_].
pub const WORD_CHARS: [CharRange; 4] = [('0', '9'), ('A', 'Z'), r1('_'), ('a', 'z')];

/// ASCII decimal digits.
pub const DIGITS: [CharRange; 1] = [('0', '9')];

/// White space and line terminators.
pub const WHITESPACE: [CharRange; 10] = [
    // TAB, LF, VT, FF, CR
    ('\u{0009}', '\u{000D}'),
    r1('\u{0020}'),
    r1('\u{00A0}'),
    r1('\u{1680}'),
    ('\u{2000}', '\u{200A}'),
    ('\u{2028}', '\u{2029}'),
    r1('\u{202F}'),
    r1('\u{205F}'),
    r1('\u{3000}'),
    r1('\u{FEFF}'),
];

/// A predefined class escape such as \d.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassEscape {
    Digits,
    Spaces,
    Words,
}

impl ClassEscape {
    /// \return the class for an escape letter, and whether it is positive.
    pub fn from_letter(c: char) -> Option<(ClassEscape, bool)> {
        match c {
            'd' => Some((ClassEscape::Digits, true)),
            'D' => Some((ClassEscape::Digits, false)),
            's' => Some((ClassEscape::Spaces, true)),
            'S' => Some((ClassEscape::Spaces, false)),
            'w' => Some((ClassEscape::Words, true)),
            'W' => Some((ClassEscape::Words, false)),
            _ => None,
        }
    }

    /// \return the sorted ranges of the positive form of this class.
    pub fn ranges(self) -> &'static [CharRange] {
        match self {
            ClassEscape::Digits => &DIGITS,
            ClassEscape::Spaces => &WHITESPACE,
            ClassEscape::Words => &WORD_CHARS,
        }
    }

    /// \return the ranges of this class, inverted if not \p positive.
    pub fn ranges_with_sense(self, positive: bool) -> Vec<CharRange> {
        if positive {
            self.ranges().to_vec()
        } else {
            invert(self.ranges())
        }
    }
}

/// \return the char after \p c, skipping the surrogate gap.
fn char_after(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        _ => char::from_u32(c as u32 + 1),
    }
}

/// \return the char before \p c, skipping the surrogate gap.
fn char_before(c: char) -> Option<char> {
    match c {
        '\u{E000}' => Some('\u{D7FF}'),
        '\0' => None,
        _ => char::from_u32(c as u32 - 1),
    }
}

/// Sort \p ranges and merge any that overlap or abut.
pub fn normalize(mut ranges: Vec<CharRange>) -> Vec<CharRange> {
    ranges.sort_unstable();
    let mut result: Vec<CharRange> = Vec::with_capacity(ranges.len());
    for (lo, hi) in ranges {
        if let Some(last) = result.last_mut() {
            let adjacent = char_after(last.1).map_or(true, |next| lo <= next);
            if adjacent {
                last.1 = last.1.max(hi);
                continue;
            }
        }
        result.push((lo, hi));
    }
    result
}

/// \return the complement of \p ranges over the set of all chars.
pub fn invert(ranges: &[CharRange]) -> Vec<CharRange> {
    let mut result = Vec::new();
    let mut next = Some('\0');
    for &(lo, hi) in normalize(ranges.to_vec()).iter() {
        if let Some(start) = next {
            if start < lo {
                if let Some(end) = char_before(lo) {
                    result.push((start, end));
                }
            }
        }
        next = char_after(hi);
    }
    if let Some(start) = next {
        result.push((start, char::MAX));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted() {
        for table in [&DIGITS[..], &WORD_CHARS[..], &WHITESPACE[..]] {
            assert_eq!(normalize(table.to_vec()), table.to_vec());
        }
    }

    #[test]
    fn normalize_merges() {
        assert_eq!(
            normalize(vec![('d', 'f'), ('a', 'c'), ('x', 'z'), ('e', 'h')]),
            vec![('a', 'h'), ('x', 'z')]
        );
    }

    #[test]
    fn invert_round_trips() {
        let inv = invert(&DIGITS);
        assert_eq!(inv, vec![('\0', '/'), (':', char::MAX)]);
        assert_eq!(invert(&inv), DIGITS.to_vec());
        assert_eq!(invert(&[]), vec![('\0', char::MAX)]);
        assert_eq!(invert(&[('\0', char::MAX)]), vec![]);
    }

    #[test]
    fn invert_skips_surrogates() {
        let inv = invert(&[('\0', '\u{D7FF}')]);
        assert_eq!(inv, vec![('\u{E000}', char::MAX)]);
    }
}
