//! Path normalization and segment resolution.
//!
//! Synchronous and non-blocking, per the concurrency model: only blob-store
//! I/O is allowed to suspend.

use smol_str::SmolStr;

use crate::TreeError;

/// Split `path` on `/`, stripping leading/trailing slashes and dropping
/// empty components. Rejects `.` and `..` segments with
/// [`TreeError::InvalidPath`].
pub fn normalize(path: &str) -> Result<Vec<SmolStr>, TreeError> {
    let mut segments = Vec::new();
    for part in path.split('/') {
        if part.is_empty() {
            continue;
        }
        if part == "." || part == ".." {
            return Err(TreeError::InvalidPath(format!(
                "path segment must not be '{part}'"
            )));
        }
        segments.push(SmolStr::new(part));
    }
    Ok(segments)
}

/// Resolve a single path segment against a directory's child list: try an
/// exact name match first, falling back to a non-negative integer index.
/// Name matches always win over numeric fallback.
pub fn resolve_segment(dict: &coppice_codec::DictNode, segment: &str) -> Option<coppice_codec::ContentKey> {
    if let Some(key) = dict.get(segment) {
        return Some(key);
    }
    let index: usize = segment.parse().ok()?;
    dict.get_index(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_and_trailing_slashes() {
        assert_eq!(normalize("/a/b/").unwrap(), normalize("a/b").unwrap());
    }

    #[test]
    fn collapses_duplicate_slashes() {
        assert_eq!(normalize("a//b").unwrap(), vec![SmolStr::new("a"), SmolStr::new("b")]);
    }

    #[test]
    fn empty_path_normalizes_to_no_segments() {
        assert!(normalize("").unwrap().is_empty());
        assert!(normalize("/").unwrap().is_empty());
    }

    #[test]
    fn rejects_dot_and_dotdot() {
        assert!(normalize("a/./b").is_err());
        assert!(normalize("a/../b").is_err());
        assert!(normalize(".").is_err());
        assert!(normalize("..").is_err());
    }

    #[test]
    fn is_idempotent() {
        let once = normalize("/a//b/").unwrap();
        let rejoined = once.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("/");
        let twice = normalize(&rejoined).unwrap();
        assert_eq!(once, twice);
    }
}
