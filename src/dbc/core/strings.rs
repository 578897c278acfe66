//! Small tokenizing helpers shared by the line matchers.

/// Strips a leading keyword (case-insensitive) that must be followed by whitespace.
///
/// Returns the remainder with leading whitespace removed.
pub(crate) fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head: &str = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest: &str = &line[keyword.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

/// Splits off the first whitespace-delimited token.
pub(crate) fn take_token(s: &str) -> Option<(&str, &str)> {
    let s: &str = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], s[end..].trim_start())),
        None => Some((s, "")),
    }
}

/// Splits off a leading quoted string, returning its content and the remainder.
pub(crate) fn take_quoted(s: &str) -> Option<(&str, &str)> {
    let inner: &str = s.trim_start().strip_prefix('"')?;
    let end: usize = inner.find('"')?;
    Some((&inner[..end], inner[end + 1..].trim_start()))
}

/// Removes the mandatory statement terminator `;` (and whitespace before it).
pub(crate) fn strip_terminator(s: &str) -> Option<&str> {
    s.trim_end().strip_suffix(';').map(str::trim_end)
}

/// `\d+`
pub(crate) fn is_uint(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `\w+`
pub(crate) fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}
