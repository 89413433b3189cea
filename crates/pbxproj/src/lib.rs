//! Lossless reader and splice editor for Xcode `project.pbxproj` files.
//!
//! The file is an OpenStep-style property list. Instead of re-serializing a
//! model, edits replace byte ranges of the original text, so everything that
//! is not edited (comments, ordering, whitespace) is written back untouched.

mod document;
mod lexer;

pub use document::{unquote, Dict, Document, Entry, Node};
pub use lexer::{tokenize, Token, TokenKind};

/// Parse failure with a location in the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// Byte offset of the offending input.
    pub offset: usize,
    /// 1-based line number of `offset`.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let line = source.as_bytes()[..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
            + 1;
        Self {
            offset,
            line,
            message: message.into(),
        }
    }
}

/// Whether `text` can be written without quotes.
fn is_bare_safe(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'/'))
        && !text.contains("//")
        && !text.contains("/*")
}

/// Render a key or plain value, quoting it when it would not lex as one bare token.
pub fn format_string(text: &str) -> String {
    if is_bare_safe(text) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a parenthesised list the way Xcode lays one out.
///
/// `items` are raw tokens and are written verbatim. `indent` is the
/// indentation of the line holding the key; items go one tab deeper and the
/// closing parenthesis lines up with the key.
pub fn render_list<S: AsRef<str>>(items: &[S], indent: &str) -> String {
    let mut out = String::from("(\n");
    for item in items {
        out.push_str(indent);
        out.push('\t');
        out.push_str(item.as_ref());
        out.push_str(",\n");
    }
    out.push_str(indent);
    out.push(')');
    out
}
