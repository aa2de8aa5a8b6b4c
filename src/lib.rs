/*!

# retrack - a backtracking regular expression engine

This crate compiles a small regular expression language into a pattern tree
and matches it with classical backtracking: alternation is ordered (the first
branch that lets the rest of the pattern succeed wins), quantifiers are greedy
by default, and capture groups report byte ranges into the input.

# Example: test if a string contains a match

```rust
use retrack::Regex;
let re = Regex::new(r"\d{4}").unwrap();
let matched = re.search("2020-20-05").is_some();
assert!(matched);
```

# Example: anchored attempts

`find` only tries a single start offset, while `search` tries each offset in
turn:

```rust
let re = retrack::compile("b+").unwrap();
assert!(retrack::find(&re, "abb", 0).is_none());
assert_eq!(retrack::find(&re, "abb", 1).unwrap().range(), 1..3);
assert_eq!(retrack::search(&re, "abb").unwrap().start(), 1);
```

# Example: using capture groups

Capture groups are available in the `Match` object produced by a successful
match. A capture group is a range of byte indexes into the original string.

```rust
use retrack::Regex;
let re = Regex::new(r"(\d{4})-(\d\d)").unwrap();
let text = "Today is 2020-10-05";
let m = re.search(text).unwrap();
assert_eq!(&text[m.capture(1).unwrap()], "2020");
assert_eq!(&text[m.capture(2).unwrap()], "10");
```

A group inside a repetition reports the span of its last iteration, and a
group in a branch which did not participate reports None:

```rust
use retrack::Regex;
let re = Regex::new("(a)|(b)").unwrap();
let m = re.search("b").unwrap();
assert_eq!(m.capture(1), None);
assert_eq!(m.capture(2), Some(0..1));

let re = Regex::new("(a|b)+").unwrap();
assert_eq!(re.search("abb").unwrap().capture(1), Some(2..3));
```

# Errors

Compilation fails with a [`SyntaxError`] naming the problem and the byte
offset in the pattern where it was found:

```rust
let err = retrack::compile("ab(c").unwrap_err();
assert_eq!(err.kind, retrack::ErrorKind::UnterminatedGroup);
assert_eq!(err.position, 4);
```

# Supported Syntax

- Literals, `.` (any one character), `^` and `$` (start and end of input).
- Groups `( ... )`, all of which capture, numbered by their opening
  parenthesis.
- Alternation `a|b`.
- Quantifiers `*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}`, and their lazy forms
  `*?`, `+?`, `??`, `{n,m}?`.
- Classes `[abc]`, `[a-z]`, `[^a-z]`, and the predefined classes `\d \w \s`
  with their negations `\D \W \S`.
- Escapes `\n \t \r \f \v \0`, and a backslash before any syntax character.
  Any other escape is an error.

Patterns are matched against `&str`; one input unit is one `char`, and all
offsets are byte offsets.

# Hazards

Like every classical backtracking engine, matching time may be exponential for
some patterns on adversarial inputs. The engine does not limit itself; callers
that need a bound must impose one externally.

Groups may be nested at most 250 deep; deeper patterns fail to compile.

# Crate features

- **logging**. Emits compilation and matching diagnostics through the `log`
  crate.

*/

#![warn(clippy::all)]
#![allow(clippy::upper_case_acronyms, clippy::match_like_matches_macro)]
// Clippy's manual_range_contains suggestion produces worse codegen.
#![allow(clippy::manual_range_contains)]

pub use crate::api::*;

#[macro_use]
mod util;

mod api;
mod ast;
mod bytesearch;
mod charclasses;
mod classicalbacktrack;
mod emit;
mod exec;
mod indexing;
mod insn;
mod optimizer;
mod parse;
mod scm;
mod startpredicate;
mod types;
