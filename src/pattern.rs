// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Glob-style branch patterns.
//!
//! A `*` matches any run of characters (including `/`), every other character
//! matches itself. Matching ignores ASCII and Unicode case, the same way the
//! hosted documentation tooling compares branch names. A leading `!` carries
//! no exclusion meaning here and is matched literally.

use regex::Regex;

use crate::error::Error;

/// A compiled branch pattern.
#[derive(Debug, Clone,)]
pub struct BranchPattern
{
    source: String,
    regex:  Regex,
}

impl BranchPattern
{
    /// Compiles a glob pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the compiled expression exceeds the
    /// regex engine limits.
    ///
    /// # Examples
    ///
    /// ```
    /// use playbook_loader::BranchPattern;
    ///
    /// let pattern = BranchPattern::new("release/*",)?;
    /// assert!(pattern.matches("release/5.6"));
    /// assert!(!pattern.matches("main"));
    /// # Ok::<(), playbook_loader::Error>(())
    /// ```
    pub fn new(pattern: &str,) -> Result<Self, Error,>
    {
        let body = pattern.split('*',).map(regex::escape,).collect::<Vec<_,>>().join(".*",);
        let regex = Regex::new(&format!("(?is)^{body}$"),).map_err(|error| {
            Error::validation(format!("invalid branch pattern '{pattern}': {error}"),)
        },)?;

        Ok(Self {
            source: pattern.to_owned(),
            regex,
        },)
    }

    /// Returns `true` when the branch name matches the whole pattern.
    pub fn matches(&self, branch: &str,) -> bool
    {
        self.regex.is_match(branch,)
    }

    /// Returns the pattern text as written.
    pub fn as_str(&self,) -> &str
    {
        &self.source
    }
}

/// Returns `true` when `branch` matches any of the given patterns.
///
/// # Errors
///
/// Propagates [`BranchPattern::new`] failures.
pub fn matches_any<'a, I,>(patterns: I, branch: &str,) -> Result<bool, Error,>
where
    I: IntoIterator<Item = &'a String,>,
{
    for pattern in patterns {
        if BranchPattern::new(pattern,)?.matches(branch,) {
            return Ok(true,);
        }
    }
    Ok(false,)
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::{BranchPattern, matches_any};

    #[test]
    fn literal_pattern_matches_exactly()
    {
        let pattern = BranchPattern::new("main",).expect("valid pattern",);
        assert!(pattern.matches("main"));
        assert!(!pattern.matches("main-backup"));
        assert!(!pattern.matches("xmain"));
        assert_eq!(pattern.as_str(), "main");
    }

    #[test]
    fn star_spans_path_separators()
    {
        let pattern = BranchPattern::new("v/*",).expect("valid pattern",);
        assert!(pattern.matches("v/5.6"));
        assert!(pattern.matches("v/5.6/hotfix"));
        assert!(pattern.matches("v/"));
        assert!(!pattern.matches("release/5.6"));
    }

    #[test]
    fn regex_metacharacters_are_literal()
    {
        let pattern = BranchPattern::new("v5.?+[x]",).expect("valid pattern",);
        assert!(pattern.matches("v5.?+[x]"));
        assert!(!pattern.matches("v55x"));
    }

    #[test]
    fn matching_ignores_case()
    {
        let pattern = BranchPattern::new("Release/*",).expect("valid pattern",);
        assert!(pattern.matches("release/5.6"));
    }

    #[test]
    fn exclusion_prefix_is_inert()
    {
        let pattern = BranchPattern::new("!main",).expect("valid pattern",);
        assert!(!pattern.matches("main"));
        assert!(!pattern.matches("develop"));
        assert!(pattern.matches("!main"));
    }

    #[test]
    fn matches_any_checks_every_pattern()
    {
        let patterns = vec!["main".to_owned(), "v/*".to_owned()];
        assert!(matches_any(&patterns, "v/5.5",).expect("valid patterns",));
        assert!(!matches_any(&patterns, "develop",).expect("valid patterns",));
        assert!(!matches_any(&Vec::<String,>::new(), "main",).expect("valid patterns",));
    }

    proptest! {
        #[test]
        fn literal_branch_always_matches_itself(branch in "[a-zA-Z0-9./_-]{1,24}") {
            let pattern = BranchPattern::new(&branch).expect("valid pattern");
            prop_assert!(pattern.matches(&branch));
        }

        #[test]
        fn prefix_star_matches_any_suffix(prefix in "[a-z/]{0,8}", suffix in "[a-z0-9./-]{0,12}") {
            let pattern = BranchPattern::new(&format!("{prefix}*")).expect("valid pattern");
            let branch = format!("{prefix}{suffix}");
            prop_assert!(pattern.matches(&branch));
        }
    }
}
