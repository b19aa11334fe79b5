//! Include/exclude pattern evaluation for archive creation.
//!
//! Patterns are shell-style globs (`*`, `?`, `[...]`) matched against the
//! whole relative path string with `/` separators. A `*` also crosses `/`,
//! so `*.tmp` matches `a/b.tmp` and `build/*` matches `build/sub/out.bin`.

use glob::Pattern;

use crate::ArchiveError;
use crate::Result;

/// Compiled include and exclude pattern lists.
///
/// Exclusion wins over inclusion. A non-empty include list turns on
/// allow-list mode: a path must match at least one include pattern to be
/// kept.
///
/// # Examples
///
/// ```
/// use criage_archive::InclusionFilter;
///
/// let filter = InclusionFilter::new(&["*.go"], &["*_test.go"])?;
/// assert!(!filter.should_exclude("cmd/main.go"));
/// assert!(filter.should_exclude("cmd/main_test.go"));
/// assert!(filter.should_exclude("README.md"));
/// # Ok::<(), criage_archive::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InclusionFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl InclusionFilter {
    /// Compiles both pattern lists.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidPattern`] for the first pattern that
    /// does not parse.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Returns `true` if `relative_path` must be left out of the archive.
    #[must_use]
    pub fn should_exclude(&self, relative_path: &str) -> bool {
        if self.exclude.iter().any(|p| p.matches(relative_path)) {
            return true;
        }
        !self.include.is_empty() && !self.include.iter().any(|p| p.matches(relative_path))
    }
}

/// One-shot form of [`InclusionFilter::should_exclude`].
///
/// # Examples
///
/// ```
/// use criage_archive::creation::filters::should_exclude;
///
/// let none: &[&str] = &[];
/// assert!(should_exclude("a/b.tmp", none, &["*.tmp"])?);
/// assert!(!should_exclude("a/b.txt", none, &["*.tmp"])?);
/// # Ok::<(), criage_archive::ArchiveError>(())
/// ```
pub fn should_exclude<S: AsRef<str>>(
    relative_path: &str,
    include: &[S],
    exclude: &[S],
) -> Result<bool> {
    Ok(InclusionFilter::new(include, exclude)?.should_exclude(relative_path))
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(p).map_err(|e| ArchiveError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn test_exclude_only() {
        let filter = InclusionFilter::new(NONE, &["*.tmp"]).unwrap();
        assert!(filter.should_exclude("a/b.tmp"));
        assert!(filter.should_exclude("top.tmp"));
        assert!(!filter.should_exclude("a/b.txt"));
    }

    #[test]
    fn test_include_only() {
        let filter = InclusionFilter::new(&["*.go"], NONE).unwrap();
        assert!(filter.should_exclude("a/b.txt"));
        assert!(!filter.should_exclude("a/b.go"));
    }

    #[test]
    fn test_exclude_beats_include() {
        let filter = InclusionFilter::new(&["*.go"], &["vendor/*"]).unwrap();
        assert!(filter.should_exclude("vendor/lib.go"));
        assert!(!filter.should_exclude("lib.go"));
    }

    #[test]
    fn test_subtree_pattern() {
        let filter = InclusionFilter::new(NONE, &["build/*"]).unwrap();
        assert!(filter.should_exclude("build/out.bin"));
        assert!(filter.should_exclude("build/nested/deep.o"));
        // The directory itself does not match `build/*`.
        assert!(!filter.should_exclude("build"));
        assert!(!filter.should_exclude("src/build.rs"));
    }

    #[test]
    fn test_question_mark_and_brackets() {
        let filter = InclusionFilter::new(NONE, &["log?.txt", "[ab].bin"]).unwrap();
        assert!(filter.should_exclude("log1.txt"));
        assert!(!filter.should_exclude("log10.txt"));
        assert!(filter.should_exclude("a.bin"));
        assert!(!filter.should_exclude("c.bin"));
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = InclusionFilter::default();
        assert!(!filter.should_exclude("anything/at/all"));
        assert!(!filter.should_exclude(""));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = InclusionFilter::new(NONE, &["[unclosed"]).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"
        ));
    }

    #[test]
    fn test_one_shot_should_exclude() {
        assert!(should_exclude("a/b.txt", &["*.go"], NONE).unwrap());
        assert!(!should_exclude("a/b.go", &["*.go"], NONE).unwrap());
        assert!(should_exclude("x", NONE, &["["]).is_err());
    }
}
