//! Optimizations on the pattern tree

use crate::ast::{walk_mut, ParsedPattern, Pattern, Walk};

/// When unrolling a loop, the largest minimum count we will unroll.
const LOOP_UNROLL_THRESHOLD: usize = 5;

/// Things that a Pass may do.
pub enum PassAction {
    // Do nothing to the given node.
    Keep,

    // Notes that we modified the node in-place.
    Modified,

    // Remove the given node outright, effectively replacing it with empty.
    Remove,

    /// Replace the given node with a new Pattern.
    Replace(Pattern),
}

#[derive(Debug)]
struct Pass<'a, F>
where
    F: FnMut(&mut Pattern, &Walk) -> PassAction,
{
    // The function.
    func: &'a mut F,

    // Whether this pass has changed anything.
    changed: bool,
}

impl<'a, F> Pass<'a, F>
where
    F: FnMut(&mut Pattern, &Walk) -> PassAction,
{
    fn new(func: &'a mut F) -> Self {
        Pass {
            func,
            changed: false,
        }
    }

    fn run_postorder(&mut self, start: &mut Pattern) {
        walk_mut(
            true,
            start,
            &mut |n: &mut Pattern, walk: &mut Walk| match (self.func)(n, walk) {
                PassAction::Keep => {}
                PassAction::Modified => {
                    self.changed = true;
                }
                PassAction::Remove => {
                    *n = Pattern::empty();
                    self.changed = true;
                }
                PassAction::Replace(newnode) => {
                    *n = newnode;
                    self.changed = true;
                }
            },
        )
    }

    fn run_to_fixpoint(&mut self, n: &mut Pattern) {
        debug_assert!(!self.changed, "Pass has already been run");
        loop {
            self.changed = false;
            self.run_postorder(n);
            if !self.changed {
                break;
            }
        }
    }
}

/// Run a "pass" on a pattern, which is a function that takes a node and maybe
/// returns a new node. \return true if something changed, false if nothing did.
fn run_pass<F>(r: &mut ParsedPattern, func: &mut F) -> bool
where
    F: FnMut(&mut Pattern, &Walk) -> PassAction,
{
    let mut p = Pass::new(func);
    p.run_to_fixpoint(&mut r.node);
    p.changed
}

/// \return whether a node contains any capturing group.
fn contains_capture_groups(node: &Pattern) -> bool {
    match node {
        Pattern::Group {
            capturing: true, ..
        } => true,
        Pattern::Group { inner, .. } | Pattern::Repeat { inner, .. } => {
            contains_capture_groups(inner)
        }
        Pattern::Concat(nodes) | Pattern::Alternation(nodes) => {
            nodes.iter().any(contains_capture_groups)
        }
        _ => false,
    }
}

/// \return whether a node can never match anything.
fn match_always_fails(node: &Pattern) -> bool {
    match node {
        Pattern::CharClass { ranges, negate } => !*negate && ranges.is_empty(),
        _ => false,
    }
}

/// \return a node which never matches.
fn make_always_fails() -> Pattern {
    Pattern::CharClass {
        ranges: Vec::new(),
        negate: false,
    }
}

// Remove empty nodes.
fn remove_empties(n: &mut Pattern, _w: &Walk) -> PassAction {
    match n {
        Pattern::Concat(nodes) => {
            let blen = nodes.len();
            nodes.retain(|nn| !nn.is_empty() && *nn != Pattern::Literal(String::new()));
            if nodes.len() == blen {
                PassAction::Keep
            } else {
                PassAction::Modified
            }
        }
        Pattern::Repeat { inner, max, .. } => {
            // A loop is empty if it has an empty body, or 0 max iters.
            // But do not remove contained capture groups.
            if inner.is_empty() || (*max == Some(0) && !contains_capture_groups(inner)) {
                PassAction::Remove
            } else {
                PassAction::Keep
            }
        }
        _ => PassAction::Keep,
    }
}

// Remove excess cats, and non-capturing groups.
fn decat(n: &mut Pattern, _w: &Walk) -> PassAction {
    match n {
        Pattern::Group {
            capturing: false,
            inner,
            ..
        } => PassAction::Replace(std::mem::replace(inner.as_mut(), Pattern::empty())),
        Pattern::Concat(nodes) if nodes.len() == 1 => match nodes.pop() {
            Some(node) => PassAction::Replace(node),
            None => PassAction::Keep,
        },
        Pattern::Concat(nodes) if nodes.iter().any(|nn| matches!(nn, Pattern::Concat(..))) => {
            // Flatmap child cats, switching them into an owned vec to avoid
            // copying.
            let catted = std::mem::take(nodes);
            let mut decatted = Vec::with_capacity(catted.len());
            for nn in catted {
                match nn {
                    Pattern::Concat(mut nnodes) => decatted.append(&mut nnodes),
                    _ => decatted.push(nn),
                }
            }
            PassAction::Replace(Pattern::Concat(decatted))
        }
        _ => PassAction::Keep,
    }
}

// Merge adjacent literals into one.
fn coalesce_literals(n: &mut Pattern, _w: &Walk) -> PassAction {
    match n {
        Pattern::Concat(nodes) => {
            let mut modified = false;
            let mut merged: Vec<Pattern> = Vec::with_capacity(nodes.len());
            for nn in std::mem::take(nodes) {
                match (merged.last_mut(), nn) {
                    (Some(Pattern::Literal(prev)), Pattern::Literal(curr)) => {
                        prev.push_str(&curr);
                        modified = true;
                    }
                    (_, nn) => merged.push(nn),
                }
            }
            *nodes = merged;
            if modified {
                PassAction::Modified
            } else {
                PassAction::Keep
            }
        }
        _ => PassAction::Keep,
    }
}

/// Optimize classes like `[a]` to a single char.
fn simplify_brackets(n: &mut Pattern, _w: &Walk) -> PassAction {
    match n {
        Pattern::CharClass {
            ranges,
            negate: false,
        } if ranges.len() == 1 && ranges[0].0 == ranges[0].1 => {
            PassAction::Replace(Pattern::Literal(ranges[0].0.to_string()))
        }
        _ => PassAction::Keep,
    }
}

// Perform simple unrolling of loops that have a minimum.
fn unroll_loops(n: &mut Pattern, _w: &Walk) -> PassAction {
    match n {
        Pattern::Repeat {
            inner, min, max, ..
        } => {
            // Do not unroll loops with enclosed groups, large loops, or loops
            // which may execute zero times.
            if contains_capture_groups(inner) || *min == 0 || *min > LOOP_UNROLL_THRESHOLD {
                return PassAction::Keep;
            }

            let mut unrolled: Vec<Pattern> = (0..*min).map(|_| inner.as_ref().clone()).collect();

            // We unrolled 'min' elements.
            // Maybe our loop is now empty.
            *max = max.map(|v| v - *min);
            *min = 0;
            if *max != Some(0) {
                // Move the loop to the end of unrolled.
                unrolled.push(std::mem::replace(n, Pattern::empty()));
            }
            PassAction::Replace(Pattern::Concat(unrolled))
        }
        _ => PassAction::Keep,
    }
}

// If a node can never match, replace it with an always fails node.
fn propagate_early_fails(n: &mut Pattern, _w: &Walk) -> PassAction {
    // Don't optimize nodes containing capture groups to preserve group numbers.
    if contains_capture_groups(n) {
        return PassAction::Keep;
    }

    match n {
        Pattern::Concat(nodes) if nodes.len() > 1 => {
            // If any child is an early fail, we are an early fail.
            if nodes.iter().any(match_always_fails) {
                PassAction::Replace(make_always_fails())
            } else {
                PassAction::Keep
            }
        }
        Pattern::Alternation(nodes) => {
            // Drop failing branches; the order of the survivors is unchanged.
            let blen = nodes.len();
            nodes.retain(|nn| !match_always_fails(nn));
            match nodes.len() {
                0 => PassAction::Replace(make_always_fails()),
                1 => match nodes.pop() {
                    Some(node) => PassAction::Replace(node),
                    None => PassAction::Keep,
                },
                len if len == blen => PassAction::Keep,
                _ => PassAction::Modified,
            }
        }
        Pattern::Repeat { inner, min, .. } if match_always_fails(inner) => {
            if *min > 0 {
                PassAction::Replace(make_always_fails())
            } else {
                // The loop can only be skipped.
                PassAction::Remove
            }
        }
        _ => PassAction::Keep,
    }
}

/// Simplify a parsed pattern in place. The result matches exactly the same
/// strings, with the same captures, as the original.
pub fn optimize(r: &mut ParsedPattern) {
    run_pass(r, &mut simplify_brackets);
    loop {
        let mut changed = false;
        changed |= run_pass(r, &mut decat);
        changed |= run_pass(r, &mut unroll_loops);
        changed |= run_pass(r, &mut coalesce_literals);
        changed |= run_pass(r, &mut remove_empties);
        changed |= run_pass(r, &mut propagate_early_fails);
        if !changed {
            break;
        }
    }
    trace!("optimized pattern:\n{}", r.node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Flags;
    use crate::parse::try_parse;

    fn optimized(pattern: &str) -> Pattern {
        let mut parsed = try_parse(pattern, Flags::default()).expect("pattern should parse");
        optimize(&mut parsed);
        parsed.node
    }

    fn lit(s: &str) -> Pattern {
        Pattern::Literal(s.to_string())
    }

    #[test]
    fn literals_coalesce() {
        assert_eq!(optimized("abc"), lit("abc"));
        assert_eq!(optimized("a[b]c"), lit("abc"));
        assert_eq!(
            optimized("ab.cd"),
            Pattern::Concat(vec![lit("ab"), Pattern::AnyChar, lit("cd")])
        );
    }

    #[test]
    fn loops_unroll() {
        assert_eq!(optimized("a{3}"), lit("aaa"));
        assert_eq!(
            optimized("xa{2,}"),
            Pattern::Concat(vec![
                lit("xaa"),
                Pattern::Repeat {
                    inner: Box::new(lit("a")),
                    min: 0,
                    max: None,
                    greedy: true
                }
            ])
        );
        // Loops containing groups are left alone.
        assert!(matches!(optimized("(a){2}"), Pattern::Repeat { min: 2, .. }));
    }

    #[test]
    fn empties_removed() {
        assert_eq!(optimized("ab{0}c"), lit("ac"));
        assert_eq!(optimized(""), Pattern::empty());
    }

    #[test]
    fn non_capturing_groups_unwrap() {
        let mut parsed = ParsedPattern {
            node: Pattern::Concat(vec![
                lit("a"),
                Pattern::Group {
                    inner: Box::new(lit("b")),
                    capturing: false,
                    index: None,
                },
            ]),
            groups: 0,
            flags: Flags::default(),
        };
        optimize(&mut parsed);
        assert_eq!(parsed.node, lit("ab"));
    }

    #[test]
    fn early_fails() {
        assert_eq!(optimized("a[]b"), make_always_fails());
        assert_eq!(optimized("a|[]"), lit("a"));
        assert_eq!(optimized("x[]*y"), lit("xy"));
        // Groups keep their numbering even if they cannot match.
        assert_eq!(optimized("([])").capture_indexes(), vec![1]);
    }

    #[test]
    fn alternation_order_preserved() {
        assert_eq!(
            optimized("ab|a"),
            Pattern::Alternation(vec![lit("ab"), lit("a")])
        );
    }
}
