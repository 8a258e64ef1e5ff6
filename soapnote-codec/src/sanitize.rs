//! Surface-syntax normalization ahead of strict JSON decoding.
//!
//! The upstream system writes embedded data either as strict JSON or as a
//! quasi-Python literal (`'single quotes'`, `None`, `True`, `False`). Both go
//! through [`sanitize_literal`]; strict input comes out unchanged.

use serde_json::Value;

/// Remove every character below U+0020 (newlines and tabs included).
pub fn strip_control_chars(input: &str) -> String {
    input.chars().filter(|c| u32::from(*c) >= 0x20).collect()
}

/// Normalize a JSON-like fragment into strict JSON syntax.
///
/// Control characters are stripped first. Outside double-quoted strings,
/// single-quoted strings become double-quoted and the bare words `None`,
/// `True` and `False` become `null`, `true` and `false`. Content inside
/// double-quoted strings is copied verbatim.
pub fn sanitize_literal(input: &str) -> String {
    let cleaned = strip_control_chars(input);
    let mut out = String::with_capacity(cleaned.len());
    let mut chars = cleaned.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => copy_double_quoted(&mut chars, &mut out),
            '\'' => convert_single_quoted(&mut chars, &mut out),
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    other => other,
                });
            }
            other => out.push(other),
        }
    }

    out
}

/// Sanitize then strictly decode a fragment.
pub fn decode_literal(fragment: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&sanitize_literal(fragment))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn copy_double_quoted<I>(chars: &mut std::iter::Peekable<I>, out: &mut String)
where
    I: Iterator<Item = char>,
{
    out.push('"');
    while let Some(ch) = chars.next() {
        out.push(ch);
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' => return,
            _ => {}
        }
    }
}

fn convert_single_quoted<I>(chars: &mut std::iter::Peekable<I>, out: &mut String)
where
    I: Iterator<Item = char>,
{
    out.push('"');
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                // JSON has no \' escape.
                Some('\'') => out.push('\''),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '"' => out.push_str("\\\""),
            '\'' => {
                out.push('"');
                return;
            }
            other => out.push(other),
        }
    }
}
