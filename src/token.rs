use std::fmt;

/// A lexical unit: its kind, the text it carries, and the 1-based line it
/// started on.
///
/// For identifiers and literals the lexeme is the decoded payload (escape
/// sequences already processed, quotes stripped); for punctuation and
/// keywords it is the canonical spelling.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Token {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({:?}, {:?}, line {})",
            self.kind, self.lexeme, self.line
        )
    }
}

// This is not the most compact way of representing a token kind, but it
// keeps the parser's dispatch tables readable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,

    Plus,
    Minus,
    Star,
    Slash,
    Ampersand,
    Pipe,

    Not,
    NotEq,
    Assign,
    EqEq,
    Less,
    LessEq,
    /// `<<`, the stream-write operator.
    Shl,
    Greater,
    GreaterEq,
    /// `>>`, the stream-read operator.
    Shr,
    AndAnd,
    OrOr,
    PlusPlus,
    MinusMinus,
    /// `->`
    Arrow,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,

    Identifier,
    StringLit,
    CharLit,
    IntLit,
    FloatLit,
    BoolLit,

    If,
    Else,
    While,
    For,
    Return,
    Int,
    Float,
    Char,
    Void,
    Bool,
    Using,
    Namespace,
    Std,
    Cout,
    Cin,
    Endl,
    True,
    False,

    /// A non-include preprocessor directive; the lexeme is the directive word.
    Hash,
    /// An include directive; the lexeme is the bare header name.
    Include,

    /// Pseudo-kind used by semantic analysis for pointer-typed values. The
    /// lexer never produces it.
    Pointer,
    Eof,
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "int" => TokenKind::Int,
    "float" => TokenKind::Float,
    "char" => TokenKind::Char,
    "void" => TokenKind::Void,
    "bool" => TokenKind::Bool,
    "string" => TokenKind::StringLit,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "return" => TokenKind::Return,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "cout" => TokenKind::Cout,
    "cin" => TokenKind::Cin,
    "endl" => TokenKind::Endl,
    "using" => TokenKind::Using,
    "namespace" => TokenKind::Namespace,
    "std" => TokenKind::Std,
    "include" => TokenKind::Include,
};

/// A diagnostic anchored to the source line it was raised on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub line: usize,
    pub inner: T,
}

impl<T> Located<T> {
    pub fn new(line: usize, inner: T) -> Located<T> {
        Located { line, inner }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Located<U> {
        Located {
            line: self.line,
            inner: f(self.inner),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Located<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.inner)
    }
}

impl<T: std::error::Error> std::error::Error for Located<T> {}
