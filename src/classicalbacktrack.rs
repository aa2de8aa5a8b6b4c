//! Classical backtracking execution engine

use crate::api::Match;
use crate::bytesearch;
use crate::exec;
use crate::indexing::Utf8Input;
use crate::insn::{CompiledRegex, Insn, LoopFields, StartPredicate};
use crate::scm;
use crate::scm::SingleCharMatcher;
use crate::types::{CaptureGroupID, GroupData, LoopData, LoopID, IP};
use core::ops::Range;

#[derive(Clone, Debug)]
enum BacktrackInsn {
    /// Nothing more to backtrack.
    /// This "backstops" our stack.
    Exhausted,

    /// Restore the IP and position.
    SetPosition { ip: IP, pos: usize },

    SetLoopData {
        id: LoopID,
        data: LoopData,
    },

    SetCaptureGroup {
        id: CaptureGroupID,
        data: GroupData,
    },

    EnterNonGreedyLoop {
        // The IP of the loop.
        // This is guaranteed to point to an EnterLoop insn.
        ip: IP,
        // The position at which the next iteration begins.
        pos: usize,
        data: LoopData,
    },

    GreedyLoop1Char {
        continuation: IP,
        min: usize,
        max: usize,
    },

    NonGreedyLoop1Char {
        continuation: IP,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Default)]
struct State {
    loops: Vec<LoopData>,
    groups: Vec<GroupData>,
}

#[derive(Debug)]
pub(crate) struct MatchAttempter<'a> {
    re: &'a CompiledRegex,
    bts: Vec<BacktrackInsn>,
    s: State,
}

impl<'a> MatchAttempter<'a> {
    pub(crate) fn new(re: &'a CompiledRegex) -> Self {
        Self {
            re,
            bts: vec![BacktrackInsn::Exhausted],
            s: State {
                loops: vec![LoopData::new(0); re.loops as usize],
                groups: vec![GroupData::new(); re.groups as usize],
            },
        }
    }

    #[inline(always)]
    fn push_backtrack(&mut self, bt: BacktrackInsn) {
        self.bts.push(bt)
    }

    #[inline(always)]
    fn pop_backtrack(&mut self) {
        // Note we never pop the last instruction so this will never be empty.
        debug_assert!(self.bts.len() > 1);
        self.bts.pop();
    }

    fn prepare_to_enter_loop(
        bts: &mut Vec<BacktrackInsn>,
        pos: usize,
        loop_fields: &LoopFields,
        loop_data: &mut LoopData,
    ) {
        bts.push(BacktrackInsn::SetLoopData {
            id: loop_fields.loop_id,
            data: *loop_data,
        });
        loop_data.iters += 1;
        loop_data.entry = pos;
    }

    fn run_loop(&mut self, loop_fields: &'a LoopFields, pos: usize, ip: IP) -> Option<IP> {
        let loop_data = &mut self.s.loops[loop_fields.loop_id as usize];
        let iteration = loop_data.iters;

        let do_taken = iteration < loop_fields.max_iters;
        let do_not_taken = iteration >= loop_fields.min_iters;

        let loop_taken_ip = ip + 1;
        let loop_not_taken_ip = loop_fields.exit as IP;

        // Once the minimum number of iterations has been satisfied, an
        // iteration which consumed nothing ends the loop: matching resumes
        // at the exit. This is what makes (a*)* terminate.
        if loop_data.entry == pos && iteration > loop_fields.min_iters {
            return Some(loop_not_taken_ip);
        }

        match (do_taken, do_not_taken) {
            (false, false) => {
                // No arms viable.
                None
            }
            (false, true) => {
                // Only skipping is viable.
                Some(loop_not_taken_ip)
            }
            (true, false) => {
                // Only entering is viable.
                MatchAttempter::prepare_to_enter_loop(&mut self.bts, pos, loop_fields, loop_data);
                Some(loop_taken_ip)
            }
            (true, true) if !loop_fields.greedy => {
                // Both arms are viable; backtrack into the loop.
                self.bts.push(BacktrackInsn::EnterNonGreedyLoop {
                    ip,
                    pos,
                    data: *loop_data,
                });
                Some(loop_not_taken_ip)
            }
            (true, true) => {
                debug_assert!(loop_fields.greedy, "Should be greedy");
                // Both arms are viable; backtrack out of the loop.
                self.bts.push(BacktrackInsn::SetPosition {
                    ip: loop_not_taken_ip,
                    pos,
                });
                MatchAttempter::prepare_to_enter_loop(&mut self.bts, pos, loop_fields, loop_data);
                Some(loop_taken_ip)
            }
        }
    }

    // Drive the loop up to \p max times.
    // \return the position (min, max), or None on failure.
    #[inline(always)]
    fn run_scm_loop_impl<Scm: SingleCharMatcher>(
        input: &Utf8Input,
        mut pos: usize,
        min: usize,
        max: usize,
        matcher: Scm,
    ) -> Option<(usize, usize)> {
        debug_assert!(min <= max, "min should be <= max");
        // Drive the iteration min times.
        // That tells us the min position.
        for _ in 0..min {
            if !matcher.matches(input, &mut pos) {
                return None;
            }
        }
        let min_pos = pos;

        // Drive it up to the max.
        for _ in 0..(max - min) {
            let saved = pos;
            if !matcher.matches(input, &mut pos) {
                pos = saved;
                break;
            }
        }
        let max_pos = pos;
        Some((min_pos, max_pos))
    }

    // Given that ip points at a loop whose body matches exactly one character,
    // run a "single character loop". We don't need to save our position
    // every iteration: we know that our loop body matches a single character
    // so we can backtrack by stepping back one character.
    // \return the next IP, or None if the loop failed.
    fn run_scm_loop(
        &mut self,
        input: &Utf8Input,
        pos: &mut usize,
        min: usize,
        max: usize,
        ip: IP,
        greedy: bool,
    ) -> Option<IP> {
        // A lazy loop only needs the minimum up front; it grows on backtrack.
        let (min_pos, max_pos) = match &self.re.insns[ip + 1] {
            &Insn::Char(c) => Self::run_scm_loop_impl(input, *pos, min, max, scm::Char { c }),
            &Insn::Bracket(idx) => {
                let bc = &self.re.brackets[idx];
                Self::run_scm_loop_impl(input, *pos, min, max, scm::Bracket { bc })
            }
            Insn::AsciiBracket(bitmap) => Self::run_scm_loop_impl(
                input,
                *pos,
                min,
                max,
                scm::MatchByteSet { bytes: bitmap },
            ),
            Insn::MatchAny => Self::run_scm_loop_impl(input, *pos, min, max, scm::MatchAny::new()),
            &Insn::ByteSet2(bytes) => Self::run_scm_loop_impl(
                input,
                *pos,
                min,
                max,
                scm::MatchByteArraySet { bytes },
            ),
            &Insn::ByteSet3(bytes) => Self::run_scm_loop_impl(
                input,
                *pos,
                min,
                max,
                scm::MatchByteArraySet { bytes },
            ),
            insn => {
                // There should be no other SCMs.
                unreachable!("Missing SCM: {:?}", insn);
            }
        }?;
        debug_assert!(min_pos <= max_pos, "min should be <= max");

        // The continuation is one past the loop body, which is one past the
        // loop.
        let continuation = ip + 2;
        if min_pos != max_pos {
            // Backtracking is possible.
            let bti = if greedy {
                BacktrackInsn::GreedyLoop1Char {
                    continuation,
                    min: min_pos,
                    max: max_pos,
                }
            } else {
                BacktrackInsn::NonGreedyLoop1Char {
                    continuation,
                    min: min_pos,
                    max: max_pos,
                }
            };
            self.push_backtrack(bti);
        }

        // Start at the max (min) if greedy (nongreedy).
        *pos = if greedy { max_pos } else { min_pos };
        Some(continuation)
    }

    /// Attempt to backtrack.
    /// \return true if we backtracked, false if we exhaust the backtrack stack.
    fn try_backtrack(&mut self, input: &Utf8Input, ip: &mut IP, pos: &mut usize) -> bool {
        let re = self.re;
        loop {
            // We always have a single Exhausted instruction backstopping our
            // stack, so we do not need to check for empty bts.
            let bt = match self.bts.last_mut() {
                Some(bt) => bt,
                None => return false,
            };
            match bt {
                BacktrackInsn::Exhausted => return false,

                BacktrackInsn::SetPosition {
                    ip: saved_ip,
                    pos: saved_pos,
                } => {
                    *ip = *saved_ip;
                    *pos = *saved_pos;
                    self.pop_backtrack();
                    return true;
                }
                BacktrackInsn::SetLoopData { id, data } => {
                    self.s.loops[*id as usize] = *data;
                    self.pop_backtrack();
                }
                BacktrackInsn::SetCaptureGroup { id, data } => {
                    self.s.groups[*id as usize] = *data;
                    self.pop_backtrack();
                }

                &mut BacktrackInsn::EnterNonGreedyLoop {
                    ip: loop_ip,
                    pos: saved_pos,
                    data,
                } => {
                    // Must pop before we enter the loop.
                    self.pop_backtrack();
                    *ip = loop_ip + 1;
                    *pos = saved_pos;
                    let loop_fields = match &re.insns[loop_ip] {
                        Insn::EnterLoop(loop_fields) => loop_fields,
                        _ => unreachable!("EnterNonGreedyLoop must point at a loop instruction"),
                    };
                    let loop_data = &mut self.s.loops[loop_fields.loop_id as usize];
                    *loop_data = data;
                    MatchAttempter::prepare_to_enter_loop(
                        &mut self.bts,
                        *pos,
                        loop_fields,
                        loop_data,
                    );
                    return true;
                }

                BacktrackInsn::GreedyLoop1Char {
                    continuation,
                    min,
                    max,
                } => {
                    // The match failed at the max location.
                    debug_assert!(*max >= *min, "max should be >= min");
                    // If min is equal to max, there is no more backtracking to
                    // be done; otherwise give back one char.
                    if *max == *min {
                        self.pop_backtrack();
                        continue;
                    }
                    match input.next_left_pos(*max) {
                        Some(newmax) => {
                            *pos = newmax;
                            *max = newmax;
                        }
                        None => unreachable!("Should always be able to retreat since min != max"),
                    }
                    *ip = *continuation;
                    return true;
                }

                BacktrackInsn::NonGreedyLoop1Char {
                    continuation,
                    min,
                    max,
                } => {
                    // The match failed at the min location.
                    debug_assert!(*max >= *min, "max should be >= min");
                    if *max == *min {
                        self.pop_backtrack();
                        continue;
                    }
                    // Take one more char.
                    match input.next_right_pos(*min) {
                        Some(newmin) => {
                            *pos = newmin;
                            *min = newmin;
                        }
                        None => unreachable!("Should always be able to advance since min != max"),
                    }
                    *ip = *continuation;
                    return true;
                }
            }
        }
    }

    /// Attempt to match at a given IP and position.
    /// \return the end position on success.
    fn try_at_pos(&mut self, input: &Utf8Input, mut ip: IP, mut pos: usize) -> Option<usize> {
        debug_assert!(
            self.bts.len() == 1,
            "Should be only initial exhausted backtrack insn"
        );
        let re = self.re;
        // These are not really loops, they are just labels that we
        // effectively 'goto' to.
        #[allow(clippy::never_loop)]
        'nextinsn: loop {
            'backtrack: loop {
                // Helper macro to either increment ip and go to the next insn,
                // or backtrack.
                macro_rules! next_or_bt {
                    ($e:expr) => {
                        if $e {
                            ip += 1;
                            continue 'nextinsn;
                        } else {
                            break 'backtrack;
                        }
                    };
                }

                match &re.insns[ip] {
                    &Insn::Char(c) => {
                        next_or_bt!(scm::Char { c }.matches(input, &mut pos))
                    }

                    Insn::ByteSeq(bytes) => {
                        next_or_bt!(input.match_bytes(&mut pos, bytes))
                    }

                    &Insn::ByteSet2(bytes) => {
                        next_or_bt!(scm::MatchByteArraySet { bytes }.matches(input, &mut pos))
                    }
                    &Insn::ByteSet3(bytes) => {
                        next_or_bt!(scm::MatchByteArraySet { bytes }.matches(input, &mut pos))
                    }

                    Insn::AsciiBracket(bitmap) => {
                        next_or_bt!(scm::MatchByteSet { bytes: bitmap }.matches(input, &mut pos))
                    }

                    &Insn::Bracket(idx) => {
                        next_or_bt!(scm::Bracket {
                            bc: &re.brackets[idx]
                        }
                        .matches(input, &mut pos))
                    }

                    Insn::MatchAny => {
                        next_or_bt!(scm::MatchAny::new().matches(input, &mut pos))
                    }

                    Insn::StartOfInput => next_or_bt!(pos == 0),

                    Insn::EndOfInput => next_or_bt!(pos == input.right_end()),

                    &Insn::Jump { target } => {
                        ip = target as IP;
                        continue 'nextinsn;
                    }

                    &Insn::BeginCaptureGroup(cg_idx) => {
                        let cg = &mut self.s.groups[cg_idx as usize];
                        self.bts.push(BacktrackInsn::SetCaptureGroup {
                            id: cg_idx,
                            data: *cg,
                        });
                        // Any span from an earlier iteration is replaced.
                        cg.start = Some(pos);
                        cg.end = None;
                        next_or_bt!(true)
                    }

                    &Insn::EndCaptureGroup(cg_idx) => {
                        let cg = &mut self.s.groups[cg_idx as usize];
                        debug_assert!(cg.start_matched(), "Capture group should have been entered");
                        cg.end = Some(pos);
                        next_or_bt!(true)
                    }

                    &Insn::Alt { secondary } => {
                        self.push_backtrack(BacktrackInsn::SetPosition {
                            ip: secondary as IP,
                            pos,
                        });
                        next_or_bt!(true);
                    }

                    Insn::EnterLoop(fields) => {
                        // Entering a loop, not re-entering it. An enclosing
                        // loop may backtrack into an earlier iteration which
                        // left this one mid-count, so log the old state.
                        let loop_data = &mut self.s.loops[fields.loop_id as usize];
                        self.bts.push(BacktrackInsn::SetLoopData {
                            id: fields.loop_id,
                            data: *loop_data,
                        });
                        loop_data.iters = 0;
                        match self.run_loop(fields, pos, ip) {
                            Some(next_ip) => {
                                ip = next_ip;
                                continue 'nextinsn;
                            }
                            None => {
                                break 'backtrack;
                            }
                        }
                    }

                    &Insn::LoopAgain { begin } => {
                        let act = match &re.insns[begin as IP] {
                            Insn::EnterLoop(fields) => self.run_loop(fields, pos, begin as IP),
                            _ => unreachable!("EnterLoop should always refer to loop field"),
                        };
                        match act {
                            Some(next_ip) => {
                                ip = next_ip;
                                continue 'nextinsn;
                            }
                            None => break 'backtrack,
                        }
                    }

                    &Insn::Loop1CharBody {
                        min_iters,
                        max_iters,
                        greedy,
                    } => {
                        if let Some(next_ip) =
                            self.run_scm_loop(input, &mut pos, min_iters, max_iters, ip, greedy)
                        {
                            ip = next_ip;
                            continue 'nextinsn;
                        } else {
                            break 'backtrack;
                        }
                    }

                    Insn::Goal => {
                        // Keep all but the initial give-up bts.
                        self.bts.truncate(1);
                        return Some(pos);
                    }

                    Insn::JustFail => {
                        break 'backtrack;
                    }
                }
            }

            // This after the backtrack loop.
            // A break 'backtrack will jump here.
            if self.try_backtrack(input, &mut ip, &mut pos) {
                continue 'nextinsn;
            } else {
                // We have exhausted the backtracking stack.
                debug_assert!(self.bts.len() == 1, "Should have exhausted backtrack stack");
                return None;
            }
        }
    }
}

#[derive(Debug)]
pub struct BacktrackExecutor<'r, 't> {
    input: Utf8Input<'t>,
    matcher: MatchAttempter<'r>,
}

impl<'r, 't> BacktrackExecutor<'r, 't> {
    pub(crate) fn new(re: &'r CompiledRegex, text: &'t str) -> Self {
        Self {
            input: Utf8Input::new(text),
            matcher: MatchAttempter::new(re),
        }
    }

    fn successful_match(&mut self, start: usize, end: usize) -> Match {
        // Map our groups to ranges, and clear the groups for the next attempt.
        let mut captures = Vec::with_capacity(self.matcher.s.groups.len());
        for gd in self.matcher.s.groups.iter_mut() {
            captures.push(gd.as_range());
            gd.reset();
        }
        Match {
            range: Range { start, end },
            captures,
        }
    }

    /// Attempt a match which must begin exactly at \p start.
    pub(crate) fn try_at(&mut self, start: usize) -> Option<Match> {
        if !self.input.is_valid_pos(start) {
            return None;
        }
        trace!("anchored attempt at {}", start);
        let input = self.input;
        let end = self.matcher.try_at_pos(&input, 0, start)?;
        Some(self.successful_match(start, end))
    }

    /// \return the next match, searching the remaining bytes using the given
    /// prefix searcher to quickly find the first potential match location.
    fn next_match_with_prefix_search<PrefixSearch: bytesearch::ByteSearcher + ?Sized>(
        &mut self,
        mut pos: usize,
        next_start: &mut Option<usize>,
        prefix_search: &PrefixSearch,
    ) -> Option<Match> {
        let inp = self.input;
        loop {
            // Find the next start location, or None if none.
            pos = inp.find_bytes(pos, prefix_search)?;
            trace!("attempt at {}", pos);
            if let Some(end) = self.matcher.try_at_pos(&inp, 0, pos) {
                // If we matched the empty string, we have to increment.
                if end != pos {
                    *next_start = Some(end)
                } else {
                    *next_start = inp.next_right_pos(end);
                }
                return Some(self.successful_match(pos, end));
            }
            // Didn't find it at this position, try the next one.
            pos = inp.next_right_pos(pos)?;
        }
    }
}

impl exec::MatchProducer for BacktrackExecutor<'_, '_> {
    fn next_match(&mut self, pos: usize, next_start: &mut Option<usize>) -> Option<Match> {
        if !self.input.is_valid_pos(pos) {
            *next_start = None;
            return None;
        }
        let re = self.matcher.re;
        match &re.start_pred {
            StartPredicate::Arbitrary => {
                self.next_match_with_prefix_search(pos, next_start, &bytesearch::EmptyString {})
            }
            StartPredicate::StartAnchored => {
                // Only offset 0 can match; there is never a next one.
                *next_start = None;
                if pos == 0 {
                    self.try_at(0)
                } else {
                    None
                }
            }
            StartPredicate::ByteSeq(finder) => {
                let needle = finder.needle();
                self.next_match_with_prefix_search(pos, next_start, needle)
            }
            &StartPredicate::ByteSet2(bytes) => self.next_match_with_prefix_search(
                pos,
                next_start,
                &bytesearch::ByteArraySet(bytes),
            ),
            &StartPredicate::ByteSet3(bytes) => self.next_match_with_prefix_search(
                pos,
                next_start,
                &bytesearch::ByteArraySet(bytes),
            ),
            StartPredicate::ByteBracket(bitmap) => {
                self.next_match_with_prefix_search(pos, next_start, bitmap)
            }
        }
    }
}
