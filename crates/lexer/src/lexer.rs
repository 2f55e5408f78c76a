use crate::{Position, Span};
use std::str::Chars;
use unicode_xid::UnicodeXID;

/// The tokens that can emerge from the lexer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TokenKind {
    #[default]
    None,
    Unknown,
    Whitespace,
    SimpleComment,
    MultilineComment,
    Identifier,
    Keyword,
    String,
    Integer,
    FloatingPointNumber,
    SemiColon,
    Colon,
    Equals,
    ParenOpen,
    ParenClose,
    SquigglyOpen,
    SquigglyClose,
    BracketOpen,
    BracketClose,
    Comma,
    BinOp,
    Dot,
}

/// The keywords reserved by the language
///
/// Only `var`, `fun`, `ret`, `for`, `if`, and `else` currently have defined
/// semantics, the rest are reserved for future use.
pub const KEYWORDS: &[&str] = &[
    "var", "if", "else", "while", "for", "class", "fun", "ret", "int", "float", "string",
    "continue", "break", "require", "true", "false",
];

/// A token produced by the [Lexer], along with its span and content
///
/// The content is a copy of the matched source characters, except for string
/// tokens where it holds the unescaped string value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Token {
    /// The kind of the token
    pub kind: TokenKind,
    /// The token's location in the source
    pub span: Span,
    /// The token's content
    pub content: String,
}

impl Token {
    /// Makes a new token
    pub fn new(kind: TokenKind, span: Span, content: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            content: content.into(),
        }
    }

    /// Returns true if the token is the given keyword
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.content == keyword
    }

    /// Returns true if the token is a binary operator with the given content
    pub fn is_bin_op(&self, op: &str) -> bool {
        self.kind == TokenKind::BinOp && self.content == op
    }
}

/// Controls whether whitespace tokens are included in the lexer's output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum WhitespacePolicy {
    Keep,
    #[default]
    Ignore,
}

/// Controls whether comment tokens are included in the lexer's output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CommentPolicy {
    Keep,
    #[default]
    Ignore,
}

/// Returns true if the character can start an identifier
pub fn is_id_start(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_start(c)
}

/// Returns true if the character can continue an identifier
pub fn is_id_continue(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_continue(c)
}

/// Separates an input script into [Token]s
///
/// The lexer itself never fails, characters it doesn't recognize are emitted
/// as [TokenKind::Unknown] and left for the parser to complain about.
#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Chars<'a>,
    position: Position,
    whitespace_policy: WhitespacePolicy,
    comment_policy: CommentPolicy,
}

impl<'a> Lexer<'a> {
    /// Initializes a lexer with the given input script and trivia policies
    pub fn new(
        source: &'a str,
        whitespace_policy: WhitespacePolicy,
        comment_policy: CommentPolicy,
    ) -> Self {
        Self {
            chars: source.chars(),
            position: Position::default(),
            whitespace_policy,
            comment_policy,
        }
    }

    /// Lexes a script into a token sequence, skipping trivia
    pub fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source, WhitespacePolicy::Ignore, CommentPolicy::Ignore).collect()
    }

    /// Lexes a script into a token sequence using the given trivia policies
    pub fn lex_with_policies(
        source: &str,
        whitespace_policy: WhitespacePolicy,
        comment_policy: CommentPolicy,
    ) -> Vec<Token> {
        Lexer::new(source, whitespace_policy, comment_policy).collect()
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position = if c == '\n' {
            self.position.next_line()
        } else {
            self.position.next_column()
        };
        Some(c)
    }

    fn consume_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut content = String::new();
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            content.push(c);
            self.consume();
        }
        content
    }

    fn lex_whitespace(&mut self) -> Option<Token> {
        let start = self.position;
        let content = self.consume_while(|c| c.is_ascii_whitespace());
        let span = Span {
            start,
            end: self.position,
        };

        match self.whitespace_policy {
            WhitespacePolicy::Keep => Some(Token::new(TokenKind::Whitespace, span, content)),
            WhitespacePolicy::Ignore => None,
        }
    }

    fn lex_id_or_keyword(&mut self) -> Token {
        let start = self.position;
        let content = self.consume_while(is_id_continue);

        let kind = if KEYWORDS.contains(&content.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Token::new(
            kind,
            Span {
                start,
                end: self.position,
            },
            content,
        )
    }

    fn lex_number(&mut self) -> Token {
        let start = self.position;
        let mut content = String::new();
        let mut has_decimal_point = false;

        while let Some(c) = self.peek() {
            match c {
                // Stop before a `..` pair, it's the range operator
                '.' if self.peek_second() == Some('.') => break,
                '.' if !has_decimal_point => {
                    has_decimal_point = true;
                    content.push(c);
                    self.consume();
                }
                c if c.is_ascii_digit() => {
                    content.push(c);
                    self.consume();
                }
                _ => break,
            }
        }

        let kind = if has_decimal_point {
            TokenKind::FloatingPointNumber
        } else {
            TokenKind::Integer
        };

        Token::new(
            kind,
            Span {
                start,
                end: self.position,
            },
            content,
        )
    }

    fn lex_string(&mut self) -> Token {
        let start = self.position;
        let mut content = String::new();
        let delimiter = self.consume().unwrap_or_default();

        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.consume();
                    match self.peek() {
                        Some('\'') => content.push('\''),
                        Some('"') => content.push('"'),
                        Some('n') => content.push('\n'),
                        Some('t') => content.push('\t'),
                        Some('r') => content.push('\r'),
                        // Unrecognized escapes emit nothing
                        _ => {}
                    }
                    self.consume();
                }
                c if c == delimiter => {
                    self.consume();
                    break;
                }
                c => {
                    content.push(c);
                    self.consume();
                }
            }
        }

        Token::new(
            TokenKind::String,
            Span {
                start,
                end: self.position,
            },
            content,
        )
    }

    fn lex_simple_comment(&mut self) -> Option<Token> {
        let start = self.position;
        let content = self.consume_while(|c| c != '\n');
        let span = Span {
            start,
            end: self.position,
        };

        match self.comment_policy {
            CommentPolicy::Keep => Some(Token::new(TokenKind::SimpleComment, span, content)),
            CommentPolicy::Ignore => None,
        }
    }

    fn lex_multiline_comment(&mut self) -> Option<Token> {
        let start = self.position;
        let mut content = String::new();

        // Consume the `/*` introducer
        for _ in 0..2 {
            if let Some(c) = self.consume() {
                content.push(c);
            }
        }

        while let Some(c) = self.consume() {
            content.push(c);
            if c == '*' && self.peek() == Some('/') {
                content.push('/');
                self.consume();
                break;
            }
        }

        let span = Span {
            start,
            end: self.position,
        };

        match self.comment_policy {
            CommentPolicy::Keep => Some(Token::new(TokenKind::MultilineComment, span, content)),
            CommentPolicy::Ignore => None,
        }
    }

    fn single_char_token(&mut self, kind: TokenKind) -> Token {
        let start = self.position;
        let c = self.consume().unwrap_or_default();
        Token::new(
            kind,
            Span {
                start,
                end: self.position,
            },
            c.to_string(),
        )
    }

    fn lex_operator_or_symbol(&mut self) -> Token {
        use TokenKind::*;

        match self.peek().unwrap_or_default() {
            '+' | '-' | '*' | '/' | '%' | '>' | '<' => {
                if self.peek_second() == Some('=') {
                    let start = self.position;
                    let mut op = std::string::String::new();
                    op.push(self.consume().unwrap_or_default());
                    op.push(self.consume().unwrap_or_default());
                    Token::new(
                        BinOp,
                        Span {
                            start,
                            end: self.position,
                        },
                        op,
                    )
                } else {
                    self.single_char_token(BinOp)
                }
            }
            '=' => self.single_char_token(Equals),
            ':' => self.single_char_token(Colon),
            ';' => self.single_char_token(SemiColon),
            '.' => self.single_char_token(Dot),
            ',' => self.single_char_token(Comma),
            '(' => self.single_char_token(ParenOpen),
            ')' => self.single_char_token(ParenClose),
            '{' => self.single_char_token(SquigglyOpen),
            '}' => self.single_char_token(SquigglyClose),
            '[' => self.single_char_token(BracketOpen),
            ']' => self.single_char_token(BracketClose),
            _ => self.single_char_token(Unknown),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let c = self.peek()?;

            let token = if c.is_ascii_whitespace() {
                self.lex_whitespace()
            } else if is_id_start(c) {
                Some(self.lex_id_or_keyword())
            } else if c.is_ascii_digit() {
                Some(self.lex_number())
            } else if c == '\'' || c == '"' {
                Some(self.lex_string())
            } else if c == '/' && self.peek_second() == Some('/') {
                self.lex_simple_comment()
            } else if c == '/' && self.peek_second() == Some('*') {
                self.lex_multiline_comment()
            } else {
                Some(self.lex_operator_or_symbol())
            };

            if let Some(token) = token {
                return Some(token);
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenKind::*, *};

    fn check_lexer_output(source: &str, expected: &[(TokenKind, Option<&str>, u32)]) {
        let mut lexer = Lexer::new(source, WhitespacePolicy::Ignore, CommentPolicy::Ignore);

        for (i, (kind, maybe_content, line)) in expected.iter().enumerate() {
            let output = lexer.next().expect("Expected token");
            assert_eq!(*kind, output.kind, "Token mismatch at position {i}");
            if let Some(content) = maybe_content {
                assert_eq!(*content, output.content, "Content mismatch at position {i}");
            }
            assert_eq!(
                *line, output.span.start.line,
                "Line number mismatch at position {i}"
            );
        }

        assert!(lexer.next().is_none(), "Unexpected trailing tokens");
    }

    #[test]
    fn ids_and_keywords() {
        let input = "var x = foo; fun iff _bar";
        check_lexer_output(
            input,
            &[
                (Keyword, Some("var"), 0),
                (Identifier, Some("x"), 0),
                (Equals, Some("="), 0),
                (Identifier, Some("foo"), 0),
                (SemiColon, Some(";"), 0),
                (Keyword, Some("fun"), 0),
                (Identifier, Some("iff"), 0),
                (Identifier, Some("_bar"), 0),
            ],
        );
    }

    #[test]
    fn numbers() {
        let input = "1 23 4.5 0.125";
        check_lexer_output(
            input,
            &[
                (Integer, Some("1"), 0),
                (Integer, Some("23"), 0),
                (FloatingPointNumber, Some("4.5"), 0),
                (FloatingPointNumber, Some("0.125"), 0),
            ],
        );
    }

    #[test]
    fn numeric_range_stops_before_dots() {
        let input = "1..30";
        check_lexer_output(
            input,
            &[
                (Integer, Some("1"), 0),
                (Dot, Some("."), 0),
                (Dot, Some("."), 0),
                (Integer, Some("30"), 0),
            ],
        );
    }

    #[test]
    fn strings_and_escapes() {
        let input = r#"'hello' "wo\nrld" 'it\'s' "a\"b" '\q'"#;
        check_lexer_output(
            input,
            &[
                (String, Some("hello"), 0),
                (String, Some("wo\nrld"), 0),
                (String, Some("it's"), 0),
                (String, Some("a\"b"), 0),
                (String, Some(""), 0),
            ],
        );
    }

    #[test]
    fn multiline_string_positions() {
        let input = "'a\nb' x";
        let tokens = Lexer::lex(input);
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].content, "a\nb");
        assert_eq!(tokens[1].kind, Identifier);
        assert_eq!(tokens[1].span.start.line, 1);
        assert_eq!(tokens[1].span.start.column, 3);
    }

    #[test]
    fn operators() {
        let input = "a + b >= c <= d == e *= f";
        check_lexer_output(
            input,
            &[
                (Identifier, Some("a"), 0),
                (BinOp, Some("+"), 0),
                (Identifier, Some("b"), 0),
                (BinOp, Some(">="), 0),
                (Identifier, Some("c"), 0),
                (BinOp, Some("<="), 0),
                (Identifier, Some("d"), 0),
                (Equals, Some("="), 0),
                (Equals, Some("="), 0),
                (Identifier, Some("e"), 0),
                (BinOp, Some("*="), 0),
                (Identifier, Some("f"), 0),
            ],
        );
    }

    #[test]
    fn comments_ignored_by_default() {
        let input = "\
a // simple comment
/* multiline
   comment */ b";
        check_lexer_output(input, &[(Identifier, Some("a"), 0), (Identifier, Some("b"), 2)]);
    }

    #[test]
    fn comments_kept_on_request() {
        let input = "a // note\nb";
        let tokens =
            Lexer::lex_with_policies(input, WhitespacePolicy::Ignore, CommentPolicy::Keep);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, &[Identifier, SimpleComment, Identifier]);
        assert_eq!(tokens[1].content, "// note");
    }

    #[test]
    fn whitespace_kept_on_request() {
        let input = "a b";
        let tokens =
            Lexer::lex_with_policies(input, WhitespacePolicy::Keep, CommentPolicy::Ignore);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, &[Identifier, Whitespace, Identifier]);
    }

    #[test]
    fn unknown_characters() {
        let input = "a ? b";
        check_lexer_output(
            input,
            &[
                (Identifier, Some("a"), 0),
                (Unknown, Some("?"), 0),
                (Identifier, Some("b"), 0),
            ],
        );
    }

    #[test]
    fn spans_track_lines_and_columns() {
        let input = "ab\ncde";
        let tokens = Lexer::lex(input);
        assert_eq!(
            tokens[0].span,
            Span {
                start: Position { line: 0, column: 0 },
                end: Position { line: 0, column: 2 },
            }
        );
        assert_eq!(
            tokens[1].span,
            Span {
                start: Position { line: 1, column: 0 },
                end: Position { line: 1, column: 3 },
            }
        );
    }

    #[test]
    fn unterminated_string_ends_at_input_end() {
        let tokens = Lexer::lex("'abc");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].content, "abc");
    }
}
