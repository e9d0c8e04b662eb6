//! Compiles `.gitignore` globs into path-matching predicates.

use regex::Regex;
use std::path::Path;

/// A single compiled `.gitignore` line.
#[derive(Debug)]
pub struct GitignorePattern {
    matcher: Regex,
    negated: bool,
    dir_only: bool,
}

/// The ignore predicate for one scan root.
///
/// Built once per scan from the root's `.gitignore` and read-only afterwards.
/// Patterns are evaluated in file order and the last matching pattern wins,
/// so a trailing `!pattern` line un-ignores paths matched earlier.
#[derive(Debug, Default)]
pub struct GitignoreMatcher {
    patterns: Vec<GitignorePattern>,
}

impl GitignoreMatcher {
    /// A matcher that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads `.gitignore` from `root`. A missing or unreadable file yields
    /// an empty matcher.
    pub fn load(root: &Path) -> Self {
        match std::fs::read_to_string(root.join(".gitignore")) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Compiles the given `.gitignore` content. Blank lines and comments are
    /// skipped; a line whose glob cannot be compiled is dropped with a
    /// warning and never aborts parsing.
    pub fn parse(content: &str) -> Self {
        let mut patterns = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (glob, negated) = match line.strip_prefix('!') {
                Some(rest) => (rest, true),
                None => (line, false),
            };
            let (glob, dir_only) = match glob.strip_suffix('/') {
                Some(rest) => (rest, true),
                None => (glob, false),
            };

            match compile_glob(glob) {
                Ok(matcher) => patterns.push(GitignorePattern {
                    matcher,
                    negated,
                    dir_only,
                }),
                Err(e) => {
                    tracing::warn!("Skipping unusable ignore pattern {:?}: {}", line, e);
                }
            }
        }

        Self { patterns }
    }

    /// Returns `true` if `relative_path` should be ignored.
    ///
    /// The path is matched against every pattern in file order; the verdict
    /// of the last matching pattern stands. Directory-only patterns are
    /// consulted only when `is_dir` is set.
    pub fn is_ignored(&self, relative_path: &str, is_dir: bool) -> bool {
        let mut ignored = false;
        for pattern in &self.patterns {
            if pattern.dir_only && !is_dir {
                continue;
            }
            if pattern.matcher.is_match(relative_path) {
                ignored = !pattern.negated;
            }
        }
        ignored
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translates one `.gitignore` glob into an anchored regular expression.
///
/// `**` matches across path separators and consumes an optional trailing
/// `/`; a single `*` stays within one segment; `?` is exactly one
/// non-separator character. Globs without a `/` apply to any path segment,
/// all others are anchored to the start of the relative path. The final
/// anchor requires the match to be followed by `/` or end-of-string, so
/// `target` also covers everything below `target/`.
fn compile_glob(glob: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push_str(if glob.contains('/') { "^" } else { "(^|/)" });

    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    pattern.push_str(".*");
                    if chars.peek() == Some(&'/') {
                        chars.next();
                    }
                } else {
                    pattern.push_str("[^/]*");
                }
            }
            '?' => pattern.push_str("[^/]"),
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }

    pattern.push_str("(/|$)");
    Regex::new(&pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_matcher_ignores_nothing() {
        let matcher = GitignoreMatcher::empty();
        assert!(matcher.is_empty());
        assert!(!matcher.is_ignored("src/main.rs", false));
    }

    #[test]
    fn missing_gitignore_yields_empty_matcher() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = GitignoreMatcher::load(dir.path());
        assert!(matcher.is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let matcher = GitignoreMatcher::parse("# build output\n\ntarget\n");
        assert!(matcher.is_ignored("target", true));
        assert!(!matcher.is_ignored("src", true));
    }

    #[test]
    fn basename_pattern_matches_any_segment() {
        let matcher = GitignoreMatcher::parse("notes.md\n");
        assert!(matcher.is_ignored("notes.md", false));
        assert!(matcher.is_ignored("docs/notes.md", false));
        assert!(!matcher.is_ignored("docs/old-notes.md", false));
    }

    #[test]
    fn pattern_with_slash_anchors_to_root() {
        let matcher = GitignoreMatcher::parse("docs/notes.md\n");
        assert!(matcher.is_ignored("docs/notes.md", false));
        assert!(!matcher.is_ignored("archive/docs/notes.md", false));
    }

    #[test]
    fn matched_directory_covers_its_contents() {
        let matcher = GitignoreMatcher::parse("vendor\n");
        assert!(matcher.is_ignored("vendor", true));
        assert!(matcher.is_ignored("vendor/lib.md", false));
        assert!(!matcher.is_ignored("vendored", true));
    }

    #[test]
    fn single_star_stays_within_a_segment() {
        let matcher = GitignoreMatcher::parse("*.log\n");
        assert!(matcher.is_ignored("build.log", false));
        assert!(matcher.is_ignored("logs/build.log", false));

        let matcher = GitignoreMatcher::parse("docs/*.md\n");
        assert!(matcher.is_ignored("docs/intro.md", false));
        assert!(!matcher.is_ignored("docs/guide/intro.md", false));
    }

    #[test]
    fn double_star_crosses_segments() {
        let matcher = GitignoreMatcher::parse("docs/**/draft.md\n");
        assert!(matcher.is_ignored("docs/draft.md", false));
        assert!(matcher.is_ignored("docs/2024/q1/draft.md", false));
        assert!(!matcher.is_ignored("notes/draft.md", false));
    }

    #[test]
    fn question_mark_is_one_character() {
        let matcher = GitignoreMatcher::parse("v?.md\n");
        assert!(matcher.is_ignored("v1.md", false));
        assert!(!matcher.is_ignored("v12.md", false));
        assert!(!matcher.is_ignored("v.md", false));
    }

    #[test]
    fn dot_is_literal() {
        let matcher = GitignoreMatcher::parse("a.md\n");
        assert!(!matcher.is_ignored("aXmd", false));
    }

    #[test]
    fn directory_only_pattern_skips_plain_files() {
        let matcher = GitignoreMatcher::parse("build/\n");
        assert!(matcher.is_ignored("build", true));
        assert!(!matcher.is_ignored("build", false));
    }

    #[test]
    fn negation_last_match_wins() {
        let matcher = GitignoreMatcher::parse("*.md\n!README.md\n");
        assert!(matcher.is_ignored("notes.md", false));
        assert!(!matcher.is_ignored("README.md", false));

        // Reversed order: the broad ignore comes last and wins again.
        let matcher = GitignoreMatcher::parse("!README.md\n*.md\n");
        assert!(matcher.is_ignored("README.md", false));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let matcher = GitignoreMatcher::parse("a+b(c).md\n");
        assert!(matcher.is_ignored("a+b(c).md", false));
        assert!(!matcher.is_ignored("aab(c).md", false));
    }

    proptest! {
        #[test]
        fn ignore_then_negate_never_ignores(name in "[a-z][a-z0-9]{0,11}") {
            let content = format!("{name}\n!{name}\n");
            let matcher = GitignoreMatcher::parse(&content);
            prop_assert!(!matcher.is_ignored(&name, false));
        }

        #[test]
        fn unmatched_paths_are_never_ignored(
            pattern in "[a-z]{1,8}",
            path in "[A-Z0-9]{1,8}",
        ) {
            let matcher = GitignoreMatcher::parse(&pattern);
            prop_assert!(!matcher.is_ignored(&path, false));
        }
    }
}
