//! Pure string helpers shared by every handler.
//!
//! These operate on raw command text before any structure is imposed:
//! case-insensitive prefixes, whole-word containment, splitting on the last
//! occurrence of a delimiter, and delimiter counting.

/// Strip `prefix` from the start of `s`, ignoring ASCII case.
///
/// Returns the remainder after the prefix, or `None` if `s` does not start
/// with it.
pub fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Whether `haystack` contains `word` bounded by non-alphanumeric characters
/// (or the ends of the string) on both sides.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }

    for (begin, _) in haystack.match_indices(word) {
        let before = haystack[..begin].chars().next_back();
        let after = haystack[begin + word.len()..].chars().next();
        let is_boundary = |c: Option<char>| c.is_none_or(|c| !c.is_alphanumeric());
        if is_boundary(before) && is_boundary(after) {
            return true;
        }
    }
    false
}

/// Split `haystack` on the *last* occurrence of `delimiter`.
///
/// Returns `(before, after)` with the delimiter removed, or `None` if the
/// delimiter does not occur.
pub fn split_at_last<'a>(haystack: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let idx = haystack.rfind(delimiter)?;
    Some((&haystack[..idx], &haystack[idx + delimiter.len()..]))
}

/// Number of occurrences of `needle` in `s`.
pub fn count_char(s: &str, needle: char) -> usize {
    s.chars().filter(|&c| c == needle).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
