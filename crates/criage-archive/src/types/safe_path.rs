//! Validated extraction target.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;
use crate::ArchiveError;
use crate::Result;

/// An absolute path proven to lie inside a [`DestDir`].
///
/// The only constructor is [`SafePath::resolve`], so holding a `SafePath`
/// means the containment check already ran for this entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath {
    resolved: PathBuf,
    relative: PathBuf,
}

impl SafePath {
    /// Resolves an archive entry name against `dest`.
    ///
    /// The raw name is normalized lexically: `.` segments are dropped and
    /// `..` pops the previous segment. A `..` with nothing left to pop,
    /// an absolute name, a drive prefix or an embedded NUL byte is rejected
    /// with [`ArchiveError::PathTraversal`]. A name that normalizes to
    /// nothing resolves to the root itself.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use criage_archive::DestDir;
    /// use criage_archive::SafePath;
    /// use std::path::Path;
    ///
    /// let dest = DestDir::create("/tmp/out")?;
    /// let safe = SafePath::resolve(Path::new("docs/./guide/../README.md"), &dest)?;
    /// assert_eq!(safe.relative(), Path::new("docs/README.md"));
    ///
    /// assert!(SafePath::resolve(Path::new("../../etc/passwd"), &dest).is_err());
    /// # Ok::<(), criage_archive::ArchiveError>(())
    /// ```
    pub fn resolve(raw: &Path, dest: &DestDir) -> Result<Self> {
        let traversal = || ArchiveError::PathTraversal {
            path: raw.to_path_buf(),
        };

        if raw.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(traversal());
        }

        let mut segments = Vec::new();
        for component in raw.components() {
            match component {
                Component::Normal(segment) => segments.push(segment),
                Component::CurDir => {}
                Component::ParentDir => {
                    if segments.pop().is_none() {
                        return Err(traversal());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(traversal()),
            }
        }

        let relative: PathBuf = segments.into_iter().collect();
        let resolved = dest.as_path().join(&relative);

        // Component-wise, so a sibling such as `/dest-evil` never passes
        // for `/dest`.
        if !resolved.starts_with(dest.as_path()) {
            return Err(traversal());
        }

        Ok(Self { resolved, relative })
    }

    /// Absolute target path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.resolved
    }

    /// Normalized path relative to the destination root.
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Returns `true` if the entry resolved to the destination root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.resolved
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dest() -> (TempDir, DestDir) {
        let temp = TempDir::new().unwrap();
        let dest = DestDir::create(temp.path().join("dest")).unwrap();
        (temp, dest)
    }

    #[test]
    fn test_resolve_plain_relative() {
        let (_temp, dest) = dest();
        let safe = SafePath::resolve(Path::new("a/b/c.txt"), &dest).unwrap();
        assert_eq!(safe.as_path(), dest.as_path().join("a/b/c.txt"));
        assert_eq!(safe.relative(), Path::new("a/b/c.txt"));
        assert!(!safe.is_root());
    }

    #[test]
    fn test_resolve_normalizes_inner_parent_dirs() {
        let (_temp, dest) = dest();
        let safe = SafePath::resolve(Path::new("a/../b/./c"), &dest).unwrap();
        assert_eq!(safe.relative(), Path::new("b/c"));
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let (_temp, dest) = dest();
        for raw in ["../x", "a/../../x", "../../../../etc/passwd", "./.."] {
            let err = SafePath::resolve(Path::new(raw), &dest).unwrap_err();
            assert!(
                matches!(err, ArchiveError::PathTraversal { ref path } if path == Path::new(raw)),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_absolute() {
        let (_temp, dest) = dest();
        let err = SafePath::resolve(Path::new("/etc/passwd"), &dest).unwrap_err();
        assert!(err.is_security_violation());

        // Absolute path that happens to point inside the root is still rejected.
        let inside = dest.as_path().join("file");
        assert!(SafePath::resolve(&inside, &dest).is_err());
    }

    #[test]
    fn test_resolve_rejects_sibling_with_shared_prefix() {
        let (_temp, dest) = dest();
        let err = SafePath::resolve(Path::new("../dest-evil/payload"), &dest).unwrap_err();
        assert!(matches!(err, ArchiveError::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_nul_byte() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_temp, dest) = dest();
        let raw = Path::new(OsStr::from_bytes(b"a\0b"));
        assert!(SafePath::resolve(raw, &dest).is_err());
    }

    #[test]
    fn test_resolve_exact_root_is_accepted() {
        let (_temp, dest) = dest();
        for raw in ["", ".", "./", "a/..", "a/b/../../."] {
            let safe = SafePath::resolve(Path::new(raw), &dest).unwrap();
            assert!(safe.is_root(), "{raw}");
            assert_eq!(safe.as_path(), dest.as_path());
        }
    }

    #[test]
    fn test_resolve_has_no_side_effects() {
        let (_temp, dest) = dest();
        SafePath::resolve(Path::new("new/dir/file.txt"), &dest).unwrap();
        assert!(!dest.as_path().join("new").exists());
    }
}
