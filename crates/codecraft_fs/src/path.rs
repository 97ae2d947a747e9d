//! Slash-delimited logical paths.
//!
//! Paths are the only stable identifier in a session. Every cache key goes
//! through [`normalize`] or [`join`], so two spellings of the same location
//! always land on the same key.

use crate::error::{FsError, FsResult};

/// The root of the namespace.
pub const ROOT: &str = "/";

/// Join a parent path and an entry name.
///
/// `"/"` + `"a"` gives `"/a"`, anything else gets a `/` in between; runs of
/// separators are then collapsed.
pub fn join(parent: &str, name: &str) -> String {
    let joined = if parent == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    };
    collapse_separators(&joined)
}

/// Canonical form of a path: leading `/`, no doubled or trailing separators.
///
/// An empty string is the root; a path without a leading slash is treated as
/// relative to the root.
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = segments(path).collect();
    if segments.is_empty() {
        return ROOT.to_string();
    }
    format!("/{}", segments.join("/"))
}

/// True if the path names the root.
pub fn is_root(path: &str) -> bool {
    segments(path).next().is_none()
}

/// Non-empty segments of a path, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Parent of a path, or `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    split(path).map(|(parent, _)| parent)
}

/// Final segment of a path, or `None` for the root.
pub fn file_name(path: &str) -> Option<&str> {
    segments(path).last()
}

/// Split a path into its normalized parent and final segment.
pub fn split(path: &str) -> Option<(String, String)> {
    let segments: Vec<&str> = segments(path).collect();
    let (name, rest) = segments.split_last()?;
    let parent = if rest.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", rest.join("/"))
    };
    Some((parent, (*name).to_string()))
}

/// True if `path` is `ancestor` itself or lies somewhere below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    let path = normalize(path);
    let ancestor = normalize(ancestor);
    if ancestor == ROOT || path == ancestor {
        return true;
    }
    path.strip_prefix(&ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Reject names that cannot be a single directory entry.
pub fn validate_name(name: &str) -> FsResult<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(FsError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_root_and_nested() {
        assert_eq!(join("/", "a.txt"), "/a.txt");
        assert_eq!(join("/src", "main.rs"), "/src/main.rs");
        assert_eq!(join("/src/", "main.rs"), "/src/main.rs");
        assert_eq!(join("", "a"), "/a");
        assert_eq!(join("//src", "lib.rs"), "/src/lib.rs");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("a//b/"), "/a/b");
        assert_eq!(normalize("old.js"), "/old.js");
        assert_eq!(normalize("/src/app/"), "/src/app");
    }

    #[test]
    fn test_split_and_parent() {
        assert_eq!(split("/"), None);
        assert_eq!(split("/a"), Some(("/".to_string(), "a".to_string())));
        assert_eq!(split("/a/b/c.txt"), Some(("/a/b".to_string(), "c.txt".to_string())));
        assert_eq!(parent("/a/b"), Some("/a".to_string()));
        assert_eq!(parent(""), None);
        assert_eq!(file_name("/a/b.rs"), Some("b.rs"));
    }

    #[test]
    fn test_is_within_is_segment_aware() {
        assert!(is_within("/a", "/a"));
        assert!(is_within("/a/b/c", "/a"));
        assert!(!is_within("/ab", "/a"));
        assert!(is_within("/anything", "/"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("main.rs").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
    }
}
