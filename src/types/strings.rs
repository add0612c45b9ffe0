//! Quoting and escaping of string values.
//!
//! The same literal form is used by both grammars, and the source reader
//! ([`crate::parse`]) undoes it with [`unescape`].

use crate::error::{ConfigError, Result};
use std::fmt::Write as _;

/// Escape `value` and wrap it in quotes.
///
/// Single quotes are used unless the content contains one, in which case
/// the literal is double-quoted and embedded double quotes are escaped.
pub fn quote(value: &str) -> String {
    let escaped = escape(value);
    if escaped.contains('\'') {
        format!("\"{}\"", escaped.replace('"', "\\\""))
    } else {
        format!("'{escaped}'")
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        // A short octal escape followed by an octal digit would read back as one code.
        let octal_follows = matches!(chars.peek(), Some('0'..='7'));
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0'..='\x07' if !octal_follows => {
                out.push('\\');
                out.push(char::from(b'0' + c as u8));
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Decode the body of a quoted literal (quotes already stripped).
pub fn unescape(body: &str) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, next)) = chars.next() else {
            return Err(ConfigError::parse(pos, "dangling backslash in string"));
        };
        match next {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0'..='7' => {
                let mut code = next as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&(_, d @ '0'..='7')) => {
                            code = code * 8 + (d as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.push(decode_code(pos, code)?);
            }
            'x' => {
                let hex: String = (0..2).filter_map(|_| chars.next().map(|(_, d)| d)).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| ConfigError::parse(pos, format!("bad hex escape \\x{hex}")))?;
                out.push(decode_code(pos, code)?);
            }
            other => {
                return Err(ConfigError::parse(pos, format!("unknown escape \\{other}")));
            }
        }
    }
    Ok(out)
}

fn decode_code(pos: usize, code: u32) -> Result<char> {
    char::from_u32(code).ok_or_else(|| ConfigError::parse(pos, format!("bad character code {code}")))
}
