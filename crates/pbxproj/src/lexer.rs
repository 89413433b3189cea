//! Tokenizer for the OpenStep property-list dialect used by project.pbxproj.
//!
//! Comments and whitespace are skipped; every emitted token carries the byte
//! range it occupies in the source so edits can be spliced in place.

use std::ops::Range;

use crate::ParseError;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Equals,
    Semicolon,
    Comma,
    /// Quoted or bare string. The span includes the quotes.
    String,
}

/// A token and its byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Characters that end a bare string.
fn is_delimiter(c: u8) -> bool {
    matches!(c, b'{' | b'}' | b'(' | b')' | b'=' | b';' | b',' | b'"') || c.is_ascii_whitespace()
}

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        // Comments, including the `// !$*UTF8*$!` header
        if c == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }
        if c == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            let start = pos;
            pos += 2;
            loop {
                if pos + 1 >= bytes.len() {
                    return Err(ParseError::at(source, start, "unterminated comment"));
                }
                if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
                    pos += 2;
                    break;
                }
                pos += 1;
            }
            continue;
        }

        let single = match c {
            b'{' => Some(TokenKind::OpenBrace),
            b'}' => Some(TokenKind::CloseBrace),
            b'(' => Some(TokenKind::OpenParen),
            b')' => Some(TokenKind::CloseParen),
            b'=' => Some(TokenKind::Equals),
            b';' => Some(TokenKind::Semicolon),
            b',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            tokens.push(Token {
                kind,
                span: pos..pos + 1,
            });
            pos += 1;
            continue;
        }

        if c == b'"' {
            let start = pos;
            pos += 1;
            loop {
                match bytes.get(pos) {
                    None => return Err(ParseError::at(source, start, "unterminated string")),
                    Some(b'\\') => pos += 2,
                    Some(b'"') => {
                        pos += 1;
                        break;
                    }
                    Some(_) => pos += 1,
                }
            }
            tokens.push(Token {
                kind: TokenKind::String,
                span: start..pos,
            });
            continue;
        }

        let start = pos;
        while pos < bytes.len() && !is_delimiter(bytes[pos]) {
            // A comment may follow a bare string with no whitespace between
            if bytes[pos] == b'/' && matches!(bytes.get(pos + 1), Some(b'*') | Some(b'/')) {
                break;
            }
            pos += 1;
        }
        tokens.push(Token {
            kind: TokenKind::String,
            span: start..pos,
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| source[t.span].to_string())
            .collect()
    }

    #[test]
    fn test_punctuation_and_strings() {
        assert_eq!(
            kinds("{ a = (b, \"c\"); }"),
            vec![
                TokenKind::OpenBrace,
                TokenKind::String,
                TokenKind::Equals,
                TokenKind::OpenParen,
                TokenKind::String,
                TokenKind::Comma,
                TokenKind::String,
                TokenKind::CloseParen,
                TokenKind::Semicolon,
                TokenKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_skips_header_and_comments() {
        let source = "// !$*UTF8*$!\n{ 13B07F86 /* Debug */ = x; }";
        assert_eq!(texts(source), vec!["{", "13B07F86", "=", "x", ";", "}"]);
    }

    #[test]
    fn test_quoted_string_keeps_quotes_and_escapes() {
        let source = r#"a = "echo \"hi\"";"#;
        assert_eq!(texts(source)[2], r#""echo \"hi\"""#);
    }

    #[test]
    fn test_bare_string_with_path() {
        let source = "path = Classes/AppDelegate.m; sourceTree = \"<group>\";";
        let t = texts(source);
        assert_eq!(t[2], "Classes/AppDelegate.m");
        assert_eq!(t[6], "\"<group>\"");
    }

    #[test]
    fn test_comment_directly_after_bare_string() {
        assert_eq!(texts("abc/* note */;"), vec!["abc", ";"]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("a = \"oops").unwrap_err();
        assert_eq!(err.offset, 4);
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_comment() {
        assert!(tokenize("{ /* never closed").is_err());
    }
}
