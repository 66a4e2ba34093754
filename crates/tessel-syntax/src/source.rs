//! Token stream and text queries over a parsed document.
//!
//! Tokens are collected from the leaves of the Tree-sitter tree. String,
//! regular expression and numeric literals are kept whole. Template
//! literals are split into the chunks between substitutions, so `` `a${b}c` ``
//! yields `` `a${ ``, `b` and `` }c` ``.

use std::ops::Range;

use crate::position::offset_to_one_based;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Operators and delimiters.
    Punctuator,
    /// Identifiers, including property names.
    Identifier,
    /// Reserved and contextual keywords.
    Keyword,
    /// Numeric and `BigInt` literals.
    Numeric,
    /// Quoted string literals.
    String,
    /// A chunk of a template literal.
    Template,
    /// Regular expression literals.
    RegularExpression,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
    /// Text between JSX tags.
    JsxText,
    /// A `//` comment or hashbang line.
    LineComment,
    /// A `/* */` comment.
    BlockComment,
}

impl TokenKind {
    /// Returns whether this token is a comment.
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }
}

/// A lexical token with its byte range and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lexical category.
    pub kind: TokenKind,
    /// Byte range in the source.
    pub range: Range<usize>,
    /// Source text of the token.
    pub text: String,
}

impl Token {
    /// Returns whether the token is the punctuator `value`.
    #[must_use]
    pub fn is_punctuator(&self, value: &str) -> bool {
        self.kind == TokenKind::Punctuator && self.text == value
    }

    /// Returns whether the token is an opening parenthesis.
    #[must_use]
    pub fn is_opening_paren(&self) -> bool {
        self.is_punctuator("(")
    }

    /// Returns whether the token is a closing parenthesis.
    #[must_use]
    pub fn is_closing_paren(&self) -> bool {
        self.is_punctuator(")")
    }

    /// Returns whether the token is a comma.
    #[must_use]
    pub fn is_comma(&self) -> bool {
        self.is_punctuator(",")
    }
}

/// Source text plus its token and comment streams.
#[derive(Debug, Clone)]
pub struct SourceCode {
    text: String,
    tokens: Vec<Token>,
    comments: Vec<Token>,
    all: Vec<Token>,
}

impl SourceCode {
    pub(crate) fn from_tree(text: &str, root: tree_sitter::Node<'_>) -> Self {
        let mut all = Vec::new();
        collect_tokens(root, text, &mut all);
        all.sort_by_key(|token| (token.range.start, token.range.end));
        let (comments, tokens): (Vec<Token>, Vec<Token>) =
            all.iter().cloned().partition(|token| token.kind.is_comment());
        Self {
            text: text.to_owned(),
            tokens,
            comments,
            all,
        }
    }

    /// Returns the full source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the text in `range`, or an empty string when out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.text.get(range).unwrap_or_default()
    }

    /// Returns every non-comment token in source order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns every comment in source order.
    #[must_use]
    pub fn comments(&self) -> &[Token] {
        &self.comments
    }

    /// Returns the last non-comment token ending at or before `offset`.
    #[must_use]
    pub fn token_before(&self, offset: usize) -> Option<&Token> {
        before(&self.tokens, offset)
    }

    /// Returns the last token or comment ending at or before `offset`.
    #[must_use]
    pub fn token_before_including_comments(&self, offset: usize) -> Option<&Token> {
        before(&self.all, offset)
    }

    /// Returns the first non-comment token starting at or after `offset`.
    #[must_use]
    pub fn token_after(&self, offset: usize) -> Option<&Token> {
        after(&self.tokens, offset)
    }

    /// Returns the first token or comment starting at or after `offset`.
    #[must_use]
    pub fn token_after_including_comments(&self, offset: usize) -> Option<&Token> {
        after(&self.all, offset)
    }

    /// Returns the non-comment token whose range contains `offset`.
    #[must_use]
    pub fn token_at(&self, offset: usize) -> Option<&Token> {
        let index = self.tokens.partition_point(|token| token.range.end <= offset);
        self.tokens
            .get(index)
            .filter(|token| token.range.start <= offset)
    }

    /// Returns the non-comment tokens fully inside `range`.
    #[must_use]
    pub fn tokens_in(&self, range: Range<usize>) -> &[Token] {
        within(&self.tokens, range)
    }

    /// Returns the comments fully inside `range`.
    #[must_use]
    pub fn comments_in(&self, range: Range<usize>) -> &[Token] {
        within(&self.comments, range)
    }

    /// Returns the first non-comment token inside `range`.
    #[must_use]
    pub fn first_token(&self, range: Range<usize>) -> Option<&Token> {
        self.tokens_in(range).first()
    }

    /// Returns the last non-comment token inside `range`.
    #[must_use]
    pub fn last_token(&self, range: Range<usize>) -> Option<&Token> {
        self.tokens_in(range).last()
    }

    /// Returns one-based `(line, column)` coordinates for `offset`.
    #[must_use]
    pub fn location(&self, offset: usize) -> (u32, u32) {
        offset_to_one_based(&self.text, offset)
    }
}

fn before(tokens: &[Token], offset: usize) -> Option<&Token> {
    let index = tokens.partition_point(|token| token.range.end <= offset);
    index.checked_sub(1).and_then(|last| tokens.get(last))
}

fn after(tokens: &[Token], offset: usize) -> Option<&Token> {
    let index = tokens.partition_point(|token| token.range.start < offset);
    tokens.get(index)
}

fn within(tokens: &[Token], range: Range<usize>) -> &[Token] {
    let start = tokens.partition_point(|token| token.range.start < range.start);
    let end = tokens.partition_point(|token| token.range.end <= range.end);
    tokens.get(start..end.max(start)).unwrap_or_default()
}

fn collect_tokens(node: tree_sitter::Node<'_>, text: &str, out: &mut Vec<Token>) {
    if node.is_missing() || node.start_byte() == node.end_byte() {
        return;
    }
    match node.kind() {
        "string" if node.is_named() => push(out, TokenKind::String, node.byte_range(), text),
        "regex" => push(out, TokenKind::RegularExpression, node.byte_range(), text),
        "number" if node.is_named() => push(out, TokenKind::Numeric, node.byte_range(), text),
        "template_string" => collect_template(node, text, out),
        _ if node.child_count() == 0 => {
            push(out, leaf_kind(node, text), node.byte_range(), text);
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_tokens(child, text, out);
            }
        }
    }
}

fn collect_template(node: tree_sitter::Node<'_>, text: &str, out: &mut Vec<Token>) {
    let mut chunk_start = node.start_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "template_substitution" {
            continue;
        }
        push(
            out,
            TokenKind::Template,
            chunk_start..child.start_byte().saturating_add(2),
            text,
        );
        let mut inner = child.walk();
        for expression in child.named_children(&mut inner) {
            collect_tokens(expression, text, out);
        }
        chunk_start = child.end_byte().saturating_sub(1);
    }
    push(out, TokenKind::Template, chunk_start..node.end_byte(), text);
}

fn push(out: &mut Vec<Token>, kind: TokenKind, range: Range<usize>, text: &str) {
    let token_text = text.get(range.clone()).unwrap_or_default().to_owned();
    out.push(Token {
        kind,
        range,
        text: token_text,
    });
}

fn leaf_kind(node: tree_sitter::Node<'_>, text: &str) -> TokenKind {
    match node.kind() {
        "comment" | "html_comment" => {
            let body = text.get(node.byte_range()).unwrap_or_default();
            if body.starts_with("/*") {
                TokenKind::BlockComment
            } else {
                TokenKind::LineComment
            }
        }
        "hash_bang_line" => TokenKind::LineComment,
        "identifier"
        | "property_identifier"
        | "shorthand_property_identifier"
        | "shorthand_property_identifier_pattern"
        | "statement_identifier"
        | "type_identifier"
        | "private_property_identifier"
        | "undefined" => TokenKind::Identifier,
        "true" | "false" => TokenKind::Boolean,
        "null" => TokenKind::Null,
        "jsx_text" => TokenKind::JsxText,
        kind if kind.starts_with(|first: char| first.is_ascii_alphabetic()) => TokenKind::Keyword,
        _ => TokenKind::Punctuator,
    }
}
