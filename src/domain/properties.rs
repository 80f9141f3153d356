//! `.properties` text format
//!
//! Line oriented `key=value` text with the classic rules:
//! - blank lines and lines starting with `#` or `!` are ignored
//! - the key ends at the first unescaped `=`, `:` or whitespace
//! - a line ending in an odd number of backslashes continues on the next line;
//!   leading whitespace of the continuation is dropped
//! - escapes `\t`, `\n`, `\r`, `\f`, `\uXXXX`; any other escaped char is literal

use super::error::DomainError;

/// Parse properties text into `(key, value)` pairs in file order.
///
/// Duplicate keys are kept; callers inserting into a map get last-wins.
pub fn parse_properties(
    content: &str,
    source_name: &str,
) -> Result<Vec<(String, String)>, DomainError> {
    let mut pairs = Vec::new();
    let mut lines = content.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let first_line = idx + 1;
        let line = raw.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = String::from(line);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        let key = unescape(key).map_err(|message| malformed(source_name, first_line, message))?;
        let value =
            unescape(value).map_err(|message| malformed(source_name, first_line, message))?;
        pairs.push((key, value));
    }

    Ok(pairs)
}

fn malformed(source_name: &str, line: usize, message: String) -> DomainError {
    DomainError::MalformedProperties {
        source_name: source_name.to_string(),
        line,
        message,
    }
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start();
    // whitespace may be followed by one explicit separator
    let rest = match rest.chars().next() {
        Some('=') | Some(':') => rest[1..].trim_start(),
        _ => rest,
    };
    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let unit = code_unit(&mut chars)?;
                let mut units = vec![unit];
                // a high surrogate takes the following `\uXXXX` as its low half
                if (0xD800..0xDC00).contains(&unit) {
                    let mut ahead = chars.clone();
                    if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                        units.push(code_unit(&mut ahead)?);
                        chars = ahead;
                    }
                }
                for decoded in char::decode_utf16(units) {
                    let decoded = decoded.map_err(|e| {
                        format!(
                            "malformed \\uxxxx encoding: unpaired surrogate \\u{:04x}",
                            e.unpaired_surrogate()
                        )
                    })?;
                    out.push(decoded);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// The four hex digits of a `\uXXXX` escape, as one UTF-16 code unit.
fn code_unit(chars: &mut std::str::Chars<'_>) -> Result<u16, String> {
    let hex: String = chars.by_ref().take(4).collect();
    (hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| u16::from_str_radix(&hex, 16).ok())
        .flatten()
        .ok_or_else(|| format!("malformed \\uxxxx encoding: \\u{hex}"))
}
