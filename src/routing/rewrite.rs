//! Convenience path rewriting.
//!
//! The proxy exposes two shorthand endpoints that the driver does not know.
//! Only the final path segment is compared, so an id such as `is123` or a
//! session literally named `script` is never touched.

use std::borrow::Cow;

/// Final segment → protocol-native replacement.
const REWRITES: [(&str, &str); 2] = [("is", "displayed"), ("script", "execute/sync")];

/// Rewrite the last segment of `path` if it is a known shorthand.
pub fn rewrite_path(path: &str) -> Cow<'_, str> {
    let Some((prefix, last)) = path.rsplit_once('/') else {
        return Cow::Borrowed(path);
    };

    match REWRITES.iter().find(|(from, _)| *from == last) {
        Some((_, to)) => Cow::Owned(format!("{}/{}", prefix, to)),
        None => Cow::Borrowed(path),
    }
}
