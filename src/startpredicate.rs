//! Support for quickly finding potential match locations.
use crate::ast::{AnchorKind, Pattern};
use crate::bytesearch::ByteBitmap;
use crate::charclasses;
use crate::insn::StartPredicate;
use crate::types::CharRange;
use crate::util::add_utf8_first_bytes_to_bitmap;
use memchr::memmem;

/// Check if a node is anchored to the start of the input.
/// Returns true if the node begins with a StartOfInput anchor.
fn is_start_anchored(n: &Pattern) -> bool {
    match n {
        Pattern::Anchor(AnchorKind::StartOfInput) => true,
        // For concatenation, check if the first node is start-anchored.
        Pattern::Concat(nodes) => nodes.first().is_some_and(is_start_anchored),
        Pattern::Group { inner, .. } => is_start_anchored(inner),
        Pattern::Alternation(nodes) => !nodes.is_empty() && nodes.iter().all(is_start_anchored),
        // Other nodes are not anchored.
        _ => false,
    }
}

/// Convert a list of char ranges to a first-byte bitmap.
/// That is, make a list of all of the possible first bytes of every contained
/// char, and store that in a bitmap.
fn ranges_to_first_byte_bitmap(ranges: &[CharRange]) -> ByteBitmap {
    let mut bitmap = ByteBitmap::default();
    for &range in ranges {
        add_utf8_first_bytes_to_bitmap(range, &mut bitmap);
    }
    bitmap
}

/// The "IR" for a start predicate.
enum AbstractStartPredicate {
    /// No predicate.
    Arbitrary,

    /// Sequence of non-empty bytes.
    Sequence(Vec<u8>),

    /// Set of bytes.
    Set(ByteBitmap),
}

impl AbstractStartPredicate {
    /// \return the disjunction of two predicates.
    /// That is, a predicate that matches x OR y.
    fn disjunction(x: Self, y: Self) -> Self {
        match (x, y) {
            (Self::Arbitrary, _) => Self::Arbitrary,
            (_, Self::Arbitrary) => Self::Arbitrary,

            (Self::Sequence(s1), Self::Sequence(s2)) => {
                // Compute the length of the shared prefix.
                let shared_len = s1.iter().zip(s2.iter()).take_while(|(a, b)| a == b).count();
                if shared_len > 0 {
                    // Use the shared prefix.
                    Self::Sequence(s1[..shared_len].to_vec())
                } else {
                    // Use a set of their first byte.
                    Self::Set(ByteBitmap::new(&[s1[0], s2[0]]))
                }
            }

            (Self::Set(mut s1), Self::Set(s2)) => {
                s1.bitor(&s2);
                Self::Set(s1)
            }

            (Self::Set(mut s1), Self::Sequence(s2)) | (Self::Sequence(s2), Self::Set(mut s1)) => {
                // Add first byte to set.
                s1.set(s2[0]);
                Self::Set(s1)
            }
        }
    }

    /// Resolve ourselves to a concrete start predicate.
    fn resolve_to_insn(self) -> StartPredicate {
        match self {
            Self::Arbitrary => StartPredicate::Arbitrary,
            Self::Sequence(vals) if vals.is_empty() => StartPredicate::Arbitrary,
            Self::Sequence(vals) => {
                StartPredicate::ByteSeq(Box::new(memmem::Finder::new(&vals).into_owned()))
            }
            Self::Set(bm) => match bm.to_vec()[..] {
                [] => StartPredicate::Arbitrary,
                [b] => StartPredicate::ByteSeq(Box::new(memmem::Finder::new(&[b]).into_owned())),
                [b0, b1] => StartPredicate::ByteSet2([b0, b1]),
                [b0, b1, b2] => StartPredicate::ByteSet3([b0, b1, b2]),
                _ => StartPredicate::ByteBracket(bm),
            },
        }
    }
}

/// Compute any start-predicate for a node.
/// If this returns None, then the node is conceptually zero-width (e.g. an
/// anchor) and does not contribute to the predicate.
/// If this returns AbstractStartPredicate::Arbitrary, then there is no
/// predicate.
fn compute_start_predicate(n: &Pattern) -> Option<AbstractStartPredicate> {
    let arbitrary = Some(AbstractStartPredicate::Arbitrary);
    match n {
        Pattern::Literal(text) if text.is_empty() => None,
        Pattern::Literal(text) => Some(AbstractStartPredicate::Sequence(text.as_bytes().to_vec())),

        // AnyChar (aka .) is too common to do a fast prefix search for.
        Pattern::AnyChar => arbitrary,

        // Cats return the first non-None value, if any.
        Pattern::Concat(nodes) => nodes.iter().find_map(compute_start_predicate),

        // Anchors impose no predicate.
        Pattern::Anchor(..) => None,

        // Groups delegate to their contents.
        Pattern::Group { inner, .. } => compute_start_predicate(inner),

        Pattern::Repeat { inner, min, .. } => {
            if *min > 0 {
                compute_start_predicate(inner)
            } else {
                arbitrary
            }
        }

        // This one is interesting - we compute the disjunction of the
        // predicates of our branches.
        Pattern::Alternation(nodes) => {
            let mut result: Option<AbstractStartPredicate> = None;
            for node in nodes {
                // A None branch could match the empty string.
                let pred = match compute_start_predicate(node) {
                    Some(pred) => pred,
                    None => return arbitrary,
                };
                result = Some(match result {
                    None => pred,
                    Some(prev) => AbstractStartPredicate::disjunction(prev, pred),
                });
            }
            result.or(arbitrary)
        }

        // Classes get a bitmap.
        // If the class is negated, construct the set of chars not contained.
        Pattern::CharClass { ranges, negate } => {
            let bitmap = if *negate {
                ranges_to_first_byte_bitmap(&charclasses::invert(ranges))
            } else {
                ranges_to_first_byte_bitmap(ranges)
            };
            Some(AbstractStartPredicate::Set(bitmap))
        }
    }
}

/// \return the start predicate for a pattern.
pub fn predicate_for_pattern(node: &Pattern) -> StartPredicate {
    // If the pattern is anchored to the start we can avoid string searching
    // entirely.
    if is_start_anchored(node) {
        return StartPredicate::StartAnchored;
    }

    compute_start_predicate(node)
        .unwrap_or(AbstractStartPredicate::Arbitrary)
        .resolve_to_insn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Flags;
    use crate::parse::try_parse;

    fn predicate(pattern: &str) -> StartPredicate {
        let parsed = try_parse(pattern, Flags::default()).expect("pattern should parse");
        predicate_for_pattern(&parsed.node)
    }

    #[test]
    fn literal_prefixes() {
        match predicate("ab+") {
            StartPredicate::ByteSeq(finder) => assert_eq!(finder.needle(), b"a"),
            pred => panic!("Unexpected predicate {:?}", pred),
        }
        match predicate("()x") {
            StartPredicate::ByteSeq(finder) => assert_eq!(finder.needle(), b"x"),
            pred => panic!("Unexpected predicate {:?}", pred),
        }
    }

    #[test]
    fn alternations_join() {
        assert!(matches!(predicate("a|b"), StartPredicate::ByteSet2([b'a', b'b'])));
        assert!(matches!(predicate("a|b|c"), StartPredicate::ByteSet3(..)));
        assert!(matches!(predicate("a|b*"), StartPredicate::Arbitrary));
        assert!(matches!(predicate("a|$"), StartPredicate::Arbitrary));
        assert!(matches!(predicate("(a|$)x"), StartPredicate::Arbitrary));
    }

    #[test]
    fn classes_use_first_bytes() {
        match predicate("[\u{e9}\u{20AC}-\u{20AF}z]") {
            StartPredicate::ByteSet3(bytes) => assert_eq!(bytes, [b'z', 0xC3, 0xE2]),
            pred => panic!("Unexpected predicate {:?}", pred),
        }
        assert!(matches!(predicate("[^a]"), StartPredicate::ByteBracket(..)));
        assert!(matches!(predicate("[]"), StartPredicate::Arbitrary));
    }

    #[test]
    fn anchored() {
        assert!(matches!(predicate("^abc"), StartPredicate::StartAnchored));
        assert!(matches!(predicate("(^a)b"), StartPredicate::StartAnchored));
        assert!(matches!(predicate("^a|^b"), StartPredicate::StartAnchored));
        assert!(!matches!(predicate("a^"), StartPredicate::StartAnchored));
        assert!(!matches!(predicate("^a|b"), StartPredicate::StartAnchored));
    }
}
