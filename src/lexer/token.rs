//! Token definitions for the Runic lexer.

/// All token kinds in Runic.
///
/// The keyword kinds are reserved words only; the expression grammar has no
/// productions for them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // Special
    Error,
    Eof,
}

/// The closed set of reserved words.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("and", TokenKind::And),
    ("cast", TokenKind::Return),
    ("else", TokenKind::Else),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("grimoire", TokenKind::Class),
    ("if", TokenKind::If),
    ("matron", TokenKind::Super),
    ("nix", TokenKind::Nil),
    ("or", TokenKind::Or),
    ("rune", TokenKind::Var),
    ("spell", TokenKind::Fun),
    ("summon", TokenKind::Print),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("while", TokenKind::While),
];

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            TokenKind::Semicolon => ";",
            TokenKind::Slash => "/",
            TokenKind::Star => "*",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::And => "and",
            TokenKind::Class => "grimoire",
            TokenKind::Else => "else",
            TokenKind::False => "false",
            TokenKind::For => "for",
            TokenKind::Fun => "spell",
            TokenKind::If => "if",
            TokenKind::Nil => "nix",
            TokenKind::Or => "or",
            TokenKind::Print => "summon",
            TokenKind::Return => "cast",
            TokenKind::Super => "matron",
            TokenKind::This => "this",
            TokenKind::True => "true",
            TokenKind::Var => "rune",
            TokenKind::While => "while",
            TokenKind::Error => "error",
            TokenKind::Eof => "EOF",
        };
        f.write_str(text)
    }
}

/// A token with its kind, source text and line.
///
/// For [`TokenKind::Error`] tokens the lexeme holds the diagnostic message
/// instead of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub line: u32,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, lexeme: &'src str, line: u32) -> Self {
        Self { kind, lexeme, line }
    }

    pub fn eof(line: u32) -> Self {
        Self::new(TokenKind::Eof, "", line)
    }

    pub fn error(message: &'static str, line: u32) -> Self {
        Self::new(TokenKind::Error, message, line)
    }
}
