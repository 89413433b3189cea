//! Span-preserving document tree.

use std::borrow::Cow;
use std::ops::Range;

use crate::lexer::{tokenize, Token, TokenKind};
use crate::ParseError;

/// A parsed value. Every node remembers where it lives in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw token text, quotes included when the source quoted it.
    String { raw: String, span: Range<usize> },
    Array { items: Vec<Node>, span: Range<usize> },
    Dict(Dict),
}

/// A `{ key = value; ... }` dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dict {
    pub entries: Vec<Entry>,
    pub span: Range<usize>,
}

/// One `key = value;` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unquoted key text.
    pub key: String,
    pub value: Node,
    /// From the first byte of the key to the terminating `;`, inclusive.
    pub span: Range<usize>,
}

impl Node {
    pub fn span(&self) -> Range<usize> {
        match self {
            Node::String { span, .. } | Node::Array { span, .. } => span.clone(),
            Node::Dict(dict) => dict.span.clone(),
        }
    }

    /// Raw token text of a string node.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Node::String { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Unquoted text of a string node.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        self.as_raw().map(unquote)
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Node::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl Dict {
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entry(key).map(|e| &e.value)
    }

    /// Convenience for `get(key)` followed by `as_text`.
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).and_then(Node::as_text)
    }

    /// Byte offset just inside the opening brace.
    pub fn body_start(&self) -> usize {
        self.span.start + 1
    }

    /// Byte offset of the closing brace.
    pub fn body_end(&self) -> usize {
        self.span.end - 1
    }
}

/// Strip surrounding quotes and resolve backslash escapes.
///
/// Bare strings are returned borrowed and unchanged.
pub fn unquote(raw: &str) -> Cow<'_, str> {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return Cow::Borrowed(raw);
    };

    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// A parsed project.pbxproj that keeps its exact source text.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    root: Dict,
}

impl Document {
    /// Parse a document. The top level must be a single dictionary.
    pub fn parse(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let tokens = tokenize(&source)?;
        let mut parser = Parser {
            source: &source,
            tokens: &tokens,
            pos: 0,
        };

        let root = match parser.value()? {
            Node::Dict(dict) => dict,
            other => {
                return Err(ParseError::at(
                    &source,
                    other.span().start,
                    "top-level value must be a dictionary",
                ))
            }
        };
        if let Some(extra) = parser.peek() {
            return Err(ParseError::at(
                &source,
                extra.span.start,
                "unexpected content after top-level dictionary",
            ));
        }

        Ok(Self { source, root })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }

    pub fn root(&self) -> &Dict {
        &self.root
    }

    /// Replace `range` with `text` and re-parse the result.
    pub fn splice(&self, range: Range<usize>, text: &str) -> Result<Self, ParseError> {
        let mut source = String::with_capacity(self.source.len() + text.len());
        source.push_str(&self.source[..range.start]);
        source.push_str(text);
        source.push_str(&self.source[range.end..]);
        Self::parse(source)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn line_indent(&self, offset: usize) -> &str {
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line = &self.source[line_start..];
        let width = line
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        &line[..width]
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self, expecting: &str) -> Result<&'a Token, ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token)
            }
            None => Err(ParseError::at(
                self.source,
                self.source.len(),
                format!("unexpected end of input, expected {}", expecting),
            )),
        }
    }

    fn expect(&mut self, kind: TokenKind, expecting: &str) -> Result<&'a Token, ParseError> {
        let token = self.next(expecting)?;
        if token.kind != kind {
            return Err(ParseError::at(
                self.source,
                token.span.start,
                format!("expected {}", expecting),
            ));
        }
        Ok(token)
    }

    fn value(&mut self) -> Result<Node, ParseError> {
        let token = self.next("a value")?;
        match token.kind {
            TokenKind::String => Ok(Node::String {
                raw: self.source[token.span.clone()].to_string(),
                span: token.span.clone(),
            }),
            TokenKind::OpenBrace => self.dict(token.span.start).map(Node::Dict),
            TokenKind::OpenParen => self.array(token.span.start),
            _ => Err(ParseError::at(
                self.source,
                token.span.start,
                "expected a value",
            )),
        }
    }

    fn dict(&mut self, start: usize) -> Result<Dict, ParseError> {
        let mut entries = Vec::new();
        loop {
            let token = self.next("a key or '}'")?;
            match token.kind {
                TokenKind::CloseBrace => {
                    return Ok(Dict {
                        entries,
                        span: start..token.span.end,
                    })
                }
                TokenKind::String => {
                    let key = unquote(&self.source[token.span.clone()]).into_owned();
                    self.expect(TokenKind::Equals, "'='")?;
                    let value = self.value()?;
                    let end = self.expect(TokenKind::Semicolon, "';'")?.span.end;
                    entries.push(Entry {
                        key,
                        value,
                        span: token.span.start..end,
                    });
                }
                _ => {
                    return Err(ParseError::at(
                        self.source,
                        token.span.start,
                        "expected a key or '}'",
                    ))
                }
            }
        }
    }

    fn array(&mut self, start: usize) -> Result<Node, ParseError> {
        let mut items = Vec::new();
        loop {
            if let Some(token) = self.peek() {
                if token.kind == TokenKind::CloseParen {
                    self.pos += 1;
                    return Ok(Node::Array {
                        items,
                        span: start..token.span.end,
                    });
                }
            }

            items.push(self.value()?);

            let token = self.next("',' or ')'")?;
            match token.kind {
                TokenKind::Comma => {}
                TokenKind::CloseParen => {
                    return Ok(Node::Array {
                        items,
                        span: start..token.span.end,
                    })
                }
                _ => {
                    return Err(ParseError::at(
                        self.source,
                        token.span.start,
                        "expected ',' or ')'",
                    ))
                }
            }
        }
    }
}
