//! Lexical request-path handling. Nothing here touches the filesystem.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Percent-decode a request path. Invalid UTF-8 is replaced, never trusted.
pub fn decode(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Root-relative form of `path` with `.` and empty segments removed and
/// `..` applied lexically. A `..` that would climb above the start is kept,
/// so escapes stay visible to [`is_contained`].
pub fn clean(path: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            segment => segments.push(segment),
        }
    }
    segments.into_iter().collect()
}

/// Whether `relative` stays below the directory it is joined to.
pub fn is_contained(relative: &Path) -> bool {
    relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
