#![allow(clippy::uninlined_format_args)]

/// Test that \p pattern fails to parse with default flags.
#[track_caller]
pub fn test_parse_fails(pattern: &str) {
    let res = retrack::Regex::new(pattern);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Format a Match by inserting commas between all capture groups.
fn format_match(r: &retrack::Match, input: &str) -> String {
    let mut result = input[r.range()].to_string();
    for cg in r.captures.iter() {
        result.push(',');
        if let Some(cg) = cg {
            result.push_str(&input[cg.clone()])
        }
    }
    result
}

pub trait StringTestHelpers {
    /// "Fluent" style helper for testing that a String is equal to a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    #[track_caller]
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// "Fluent" style helper for testing that a Vec<&str> is equal to a
    /// Vec<&str>.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<&str> {
    #[track_caller]
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

/// A compiled regex which remembers a TestConfig.
#[derive(Debug, Clone)]
pub struct TestCompiledRegex {
    re: retrack::Regex,
    tc: TestConfig,
}

impl TestCompiledRegex {
    /// The underlying regex.
    pub fn regex(&self) -> &retrack::Regex {
        &self.re
    }

    /// Search for self in \p input, returning a list of all matches.
    pub fn matches(&self, input: &str, start: usize) -> Vec<retrack::Match> {
        self.re.find_from(input, start).collect()
    }

    /// Search for self in \p input, returning the first Match, or None if
    /// none.
    pub fn find(&self, input: &str) -> Option<retrack::Match> {
        let found = self.re.search(input);
        // The free function must agree with the method.
        assert_eq!(
            found,
            retrack::search(&self.re, input),
            "search disagreed for {:?}",
            self.tc
        );
        found
    }

    /// Attempt a match anchored at \p start.
    pub fn find_at(&self, input: &str, start: usize) -> Option<retrack::Match> {
        retrack::find(&self.re, input, start)
    }

    /// Match against a string, returning the first formatted match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        match self.find(input) {
            Some(m) => format_match(&m, input),
            None => panic!("Failed to match {}", input),
        }
    }

    /// Match against a string, returning the match as a Vec containing None
    /// for unmatched groups, or the matched strings.
    #[track_caller]
    pub fn match1_vec<'b>(&self, input: &'b str) -> Vec<Option<&'b str>> {
        let m: retrack::Match = self.find(input).expect("Failed to match");
        m.groups().map(|cr| cr.map(|r| &input[r])).collect()
    }

    /// Test that matching against \p input fails.
    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        assert!(self.find(input).is_none(), "Should not have matched")
    }

    /// Test that matching against \p input succeeds.
    #[track_caller]
    pub fn test_succeeds(&self, input: &str) {
        assert!(self.find(input).is_some(), "Should have matched")
    }

    /// Return a list of all non-overlapping total match ranges from a given
    /// start.
    pub fn match_all_from(&self, input: &str, start: usize) -> Vec<retrack::Range> {
        self.matches(input, start)
            .into_iter()
            .map(move |m| m.range())
            .collect()
    }

    /// Return a list of all non-overlapping matches.
    pub fn match_all<'b>(&self, input: &'b str) -> Vec<&'b str> {
        self.matches(input, 0)
            .into_iter()
            .map(move |m| &input[m.range()])
            .collect()
    }

    /// Collect all matches into a String, separated by commas.
    pub fn run_global_match(&self, input: &str) -> String {
        self.matches(input, 0)
            .into_iter()
            .map(move |m| format_match(&m, input))
            .collect::<Vec<String>>()
            .join(",")
    }
}

/// Description of how to test a regex.
#[derive(Debug, Copy, Clone)]
pub struct TestConfig {
    // Whether to optimize.
    optimize: bool,
}

impl TestConfig {
    /// Compile a pattern to a regex.
    #[track_caller]
    pub fn compile(&self, pattern: &str) -> TestCompiledRegex {
        let flags = retrack::Flags {
            no_opt: !self.optimize,
        };
        let re = retrack::Regex::with_flags(pattern, flags);
        assert!(
            re.is_ok(),
            "Failed to parse! pattern: {}, error: {}",
            pattern,
            re.unwrap_err()
        );
        TestCompiledRegex {
            re: re.unwrap(),
            tc: *self,
        }
    }

    /// Test that \p pattern successfully parses, and matches \p input.
    #[track_caller]
    pub fn test_match_succeeds(&self, pattern: &str, input: &str) {
        self.compile(pattern).test_succeeds(input)
    }

    /// Test that \p pattern successfully parses, and does not match \p input.
    #[track_caller]
    pub fn test_match_fails(&self, pattern: &str, input: &str) {
        self.compile(pattern).test_fails(input)
    }
}

/// Invoke \p F with each test config, in turn.
pub fn test_with_configs<F>(func: F)
where
    F: Fn(TestConfig),
{
    // Note we wish to be able to determine the TestConfig from the line number.
    func(TestConfig { optimize: false });
    func(TestConfig { optimize: true });
}
