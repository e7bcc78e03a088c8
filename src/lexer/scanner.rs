//! Lexer/Scanner for Runic source code.

use crate::lexer::token::{Token, TokenKind};

/// The lexer produces tokens on demand, one per call to [`Scanner::scan_token`].
///
/// Errors are reported in-band as [`TokenKind::Error`] tokens so the caller
/// decides how to surface them.
pub struct Scanner<'src> {
    source: &'src str,
    start: usize,
    current: usize,
    line: u32,
    finished: bool,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
            finished: false,
        }
    }

    /// Scan all tokens from the source, ending with [`TokenKind::Eof`].
    pub fn scan_tokens(self) -> Vec<Token<'src>> {
        self.collect()
    }

    /// Scan the next token. At end of input this keeps returning `Eof`.
    pub fn scan_token(&mut self) -> Token<'src> {
        self.skip_whitespace_and_comments();
        self.start = self.current;

        let Some(c) = self.advance() else {
            return Token::eof(self.line);
        };

        if is_alpha(c) {
            return self.scan_identifier();
        }
        if c.is_ascii_digit() {
            return self.scan_number();
        }

        match c {
            b'(' => self.make_token(TokenKind::LeftParen),
            b')' => self.make_token(TokenKind::RightParen),
            b'{' => self.make_token(TokenKind::LeftBrace),
            b'}' => self.make_token(TokenKind::RightBrace),
            b',' => self.make_token(TokenKind::Comma),
            b'.' => self.make_token(TokenKind::Dot),
            b'-' => self.make_token(TokenKind::Minus),
            b'+' => self.make_token(TokenKind::Plus),
            b';' => self.make_token(TokenKind::Semicolon),
            b'/' => self.make_token(TokenKind::Slash),
            b'*' => self.make_token(TokenKind::Star),

            // Two-character tokens
            b'!' => self.make_pair(b'=', TokenKind::BangEqual, TokenKind::Bang),
            b'=' => self.make_pair(b'=', TokenKind::EqualEqual, TokenKind::Equal),
            b'<' => self.make_pair(b'=', TokenKind::LessEqual, TokenKind::Less),
            b'>' => self.make_pair(b'=', TokenKind::GreaterEqual, TokenKind::Greater),

            b'"' => self.scan_string(),

            _ => {
                // Step over the rest of a multi-byte character so the cursor
                // stays on a char boundary.
                if !c.is_ascii() {
                    let width = self.source[self.start..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    self.current = self.start + width;
                }
                Token::error("Unexpected character.", self.line)
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.advance();
                }
                Some(b'\n') => {
                    self.line += 1;
                    self.advance();
                }
                Some(b'/') if self.peek_next() == Some(b'/') => {
                    while self.peek().is_some_and(|c| c != b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_string(&mut self) -> Token<'src> {
        while let Some(c) = self.peek() {
            if c == b'"' {
                break;
            }
            if c == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Token::error("Unterminated string.", self.line);
        }

        // The closing quote.
        self.advance();
        self.make_token(TokenKind::String)
    }

    fn scan_number(&mut self) -> Token<'src> {
        self.consume_digits();

        // A fractional part needs at least one digit after the dot.
        if self.peek() == Some(b'.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
        }

        self.make_token(TokenKind::Number)
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self) -> Token<'src> {
        while self.peek().is_some_and(|c| is_alpha(c) || c.is_ascii_digit()) {
            self.advance();
        }
        let kind = self.identifier_kind();
        self.make_token(kind)
    }

    /// Resolve the current lexeme against the keyword table, branching on the
    /// leading characters and then comparing the remaining suffix exactly.
    fn identifier_kind(&self) -> TokenKind {
        let lexeme = self.lexeme().as_bytes();
        match lexeme[0] {
            b'a' => self.check_keyword(1, "nd", TokenKind::And),
            b'c' => self.check_keyword(1, "ast", TokenKind::Return),
            b'e' => self.check_keyword(1, "lse", TokenKind::Else),
            b'f' if lexeme.len() > 1 => match lexeme[1] {
                b'a' => self.check_keyword(2, "lse", TokenKind::False),
                b'o' => self.check_keyword(2, "r", TokenKind::For),
                _ => TokenKind::Identifier,
            },
            b'g' => self.check_keyword(1, "rimoire", TokenKind::Class),
            b'i' => self.check_keyword(1, "f", TokenKind::If),
            b'm' => self.check_keyword(1, "atron", TokenKind::Super),
            b'n' => self.check_keyword(1, "ix", TokenKind::Nil),
            b'o' => self.check_keyword(1, "r", TokenKind::Or),
            b'r' => self.check_keyword(1, "une", TokenKind::Var),
            b's' if lexeme.len() > 1 => match lexeme[1] {
                b'p' => self.check_keyword(2, "ell", TokenKind::Fun),
                b'u' => self.check_keyword(2, "mmon", TokenKind::Print),
                _ => TokenKind::Identifier,
            },
            b't' if lexeme.len() > 1 => match lexeme[1] {
                b'h' => self.check_keyword(2, "is", TokenKind::This),
                b'r' => self.check_keyword(2, "ue", TokenKind::True),
                _ => TokenKind::Identifier,
            },
            b'w' => self.check_keyword(1, "hile", TokenKind::While),
            _ => TokenKind::Identifier,
        }
    }

    fn check_keyword(&self, offset: usize, rest: &str, kind: TokenKind) -> TokenKind {
        let lexeme = self.lexeme();
        if lexeme.len() == offset + rest.len() && &lexeme[offset..] == rest {
            kind
        } else {
            TokenKind::Identifier
        }
    }

    // ===== Cursor helpers =====

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.current += 1;
        Some(c)
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current + 1).copied()
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> &'src str {
        &self.source[self.start..self.current]
    }

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token::new(kind, self.lexeme(), self.line)
    }

    fn make_pair(&mut self, second: u8, matched: TokenKind, single: TokenKind) -> Token<'src> {
        let kind = if self.match_byte(second) { matched } else { single };
        self.make_token(kind)
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Token<'src>;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.scan_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        log::trace!("token {:?} '{}' line {}", token.kind, token.lexeme, token.line);
        Some(token)
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}
