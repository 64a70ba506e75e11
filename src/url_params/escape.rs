//! Delimiter escaping for multi-valued parameters.
//!
//! Lists are joined with `,` and pairs with `=`. Both characters, and the
//! backslash itself, are escaped with a backslash inside values so that any
//! atom survives a join/split round trip.

const ESCAPE: char = '\\';
const SPECIAL: [char; 3] = [ESCAPE, ',', '='];

/// Escape the delimiter characters in a single value.
#[must_use]
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if SPECIAL.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Join values with `delimiter`, escaping each one.
#[must_use]
pub fn join_escaped<S: AsRef<str>>(values: &[S], delimiter: char) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(&escape_value(value.as_ref()));
    }
    out
}

/// Split on unescaped `delimiter` and unescape each part.
///
/// An empty input yields no parts. A trailing lone backslash is kept
/// literally.
#[must_use]
pub fn split_escaped(input: &str, delimiter: char) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            match chars.next() {
                Some(next) => current.push(next),
                None => current.push(ESCAPE),
            }
        } else if c == delimiter {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// Split `key=value` on the first unescaped `=`, unescaping both halves.
#[must_use]
pub fn split_pair(input: &str) -> Option<(String, String)> {
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == ESCAPE {
            chars.next();
        } else if c == '=' {
            return Some((unescape(&input[..i]), unescape(&input[i + 1..])));
        }
    }
    None
}

/// Remove one level of escaping.
#[must_use]
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            out.push(chars.next().unwrap_or(ESCAPE));
        } else {
            out.push(c);
        }
    }
    out
}

/// Join `key` and `value` with an unescaped `=`.
#[must_use]
pub fn join_pair(key: &str, value: &str) -> String {
    format!("{}={}", escape_value(key), escape_value(value))
}
