use std::{iter::Peekable, str::Chars};

use crate::token::{Located, Token, TokenKind, KEYWORDS};

type Result<T, E = Located<Error>> = std::result::Result<T, E>;

/// The lexer.
///
/// ## Implementation Remarks
///
/// The scanner is a pure function of the source: it owns a character cursor
/// plus line/column bookkeeping and performs no I/O. Once the source is
/// exhausted, [`next_token`] keeps returning [`TokenKind::Eof`] tokens
/// indefinitely, so consumers never have to special-case the end of the
/// stream.
///
/// [`next_token`]: Lexer::next_token
pub struct Lexer<'src> {
    iter: Peekable<Chars<'src>>,
    position: usize,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &str) -> Lexer<'_> {
        Lexer {
            iter: src.chars().peekable(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        use TokenKind::*;

        self.skip_whitespace();
        let line = self.line;

        let token = match self.advance() {
            '\0' => Token::new(Eof, "", line),
            '/' => match self.peek() {
                '/' => {
                    self.skip_line_comment();
                    return self.next_token();
                }
                '*' => {
                    self.advance();
                    self.skip_block_comment();
                    return self.next_token();
                }
                '=' => self.advance_with(Token::new(SlashEq, "/=", line)),
                _ => Token::new(Slash, "/", line),
            },
            '#' => self.directive(line),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(c, line),
            c if c.is_ascii_digit() => self.number(c, line),
            '"' => self.string(line)?,
            '\'' => self.character(line)?,
            '+' => match self.peek() {
                '+' => self.advance_with(Token::new(PlusPlus, "++", line)),
                '=' => self.advance_with(Token::new(PlusEq, "+=", line)),
                _ => Token::new(Plus, "+", line),
            },
            '-' => match self.peek() {
                '-' => self.advance_with(Token::new(MinusMinus, "--", line)),
                '=' => self.advance_with(Token::new(MinusEq, "-=", line)),
                '>' => self.advance_with(Token::new(Arrow, "->", line)),
                _ => Token::new(Minus, "-", line),
            },
            '*' => match self.peek() {
                '=' => self.advance_with(Token::new(StarEq, "*=", line)),
                _ => Token::new(Star, "*", line),
            },
            '(' => Token::new(LParen, "(", line),
            ')' => Token::new(RParen, ")", line),
            '{' => Token::new(LBrace, "{", line),
            '}' => Token::new(RBrace, "}", line),
            '[' => Token::new(LBracket, "[", line),
            ']' => Token::new(RBracket, "]", line),
            ';' => Token::new(Semicolon, ";", line),
            ',' => Token::new(Comma, ",", line),
            '.' => Token::new(Dot, ".", line),
            '&' => match self.peek() {
                '&' => self.advance_with(Token::new(AndAnd, "&&", line)),
                _ => Token::new(Ampersand, "&", line),
            },
            '|' => match self.peek() {
                '|' => self.advance_with(Token::new(OrOr, "||", line)),
                _ => Token::new(Pipe, "|", line),
            },
            '<' => match self.peek() {
                '=' => self.advance_with(Token::new(LessEq, "<=", line)),
                '<' => self.advance_with(Token::new(Shl, "<<", line)),
                _ => Token::new(Less, "<", line),
            },
            '>' => match self.peek() {
                '=' => self.advance_with(Token::new(GreaterEq, ">=", line)),
                '>' => self.advance_with(Token::new(Shr, ">>", line)),
                _ => Token::new(Greater, ">", line),
            },
            '=' => match self.peek() {
                '=' => self.advance_with(Token::new(EqEq, "==", line)),
                _ => Token::new(Assign, "=", line),
            },
            '!' => match self.peek() {
                '=' => self.advance_with(Token::new(NotEq, "!=", line)),
                _ => Token::new(Not, "!", line),
            },
            c => return Err(Located::new(line, Error::UnexpectedChar(c))),
        };

        Ok(token)
    }

    fn identifier_or_keyword(&mut self, first: char, line: usize) -> Token {
        let mut lexeme = String::from(first);
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            lexeme.push(self.advance());
        }
        let kind = KEYWORDS
            .get(lexeme.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, line)
    }

    fn number(&mut self, first: char, line: usize) -> Token {
        let mut lexeme = String::from(first);
        let mut is_float = false;
        loop {
            match self.peek() {
                '.' => {
                    // A second dot ends the token before itself.
                    if is_float {
                        break;
                    }
                    is_float = true;
                    lexeme.push(self.advance());
                }
                c if c.is_ascii_digit() => lexeme.push(self.advance()),
                _ => break,
            }
        }
        let kind = if is_float {
            TokenKind::FloatLit
        } else {
            TokenKind::IntLit
        };
        Token::new(kind, lexeme, line)
    }

    fn string(&mut self, line: usize) -> Result<Token> {
        let mut value = String::new();
        loop {
            match self.peek() {
                '\0' => return Err(Located::new(line, Error::UnterminatedString)),
                '"' => {
                    self.advance();
                    return Ok(Token::new(TokenKind::StringLit, value, line));
                }
                '\\' => {
                    self.advance();
                    value.push(decode_escape(self.advance(), '"'));
                }
                _ => value.push(self.advance()),
            }
        }
    }

    fn character(&mut self, line: usize) -> Result<Token> {
        let mut value = String::new();
        match self.advance() {
            '\0' => return Err(Located::new(line, Error::UnterminatedChar)),
            '\\' => value.push(decode_escape(self.advance(), '\'')),
            // A multibyte source character is stored verbatim.
            c => value.push(c),
        }
        if self.peek() != '\'' {
            return Err(Located::new(line, Error::UnterminatedChar));
        }
        self.advance();
        Ok(Token::new(TokenKind::CharLit, value, line))
    }

    fn directive(&mut self, line: usize) -> Token {
        self.skip_whitespace();
        let mut word = String::new();
        while self.peek().is_ascii_alphabetic() {
            word.push(self.advance());
        }
        if word == "include" {
            self.skip_whitespace();
            if matches!(self.peek(), '<' | '"') {
                let terminator = if self.peek() == '<' { '>' } else { '"' };
                self.advance();
                let mut header = String::new();
                while self.peek() != terminator && self.peek() != '\0' {
                    header.push(self.advance());
                }
                if self.peek() == terminator {
                    self.advance();
                }
                return Token::new(TokenKind::Include, header, line);
            }
        }
        Token::new(TokenKind::Hash, word, line)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\r' | '\n') {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        while !matches!(self.peek(), '\n' | '\0') {
            self.advance();
        }
    }

    /// Consumes up to and including the closing `*/`. An unterminated
    /// comment runs to the end of the source silently.
    fn skip_block_comment(&mut self) {
        loop {
            match self.advance() {
                '\0' => break,
                '*' if self.peek() == '/' => {
                    self.advance();
                    break;
                }
                _ => {}
            }
        }
    }
}

impl Lexer<'_> {
    /// Returns the next character and advances the cursor.
    fn advance(&mut self) -> char {
        match self.iter.next() {
            Some(c) => {
                self.position += c.len_utf8();
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
                c
            }
            None => '\0',
        }
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing the cursor.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Current byte offset into the source.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current 1-based line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current 1-based column.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Decodes one escaped character. `quote` is the enclosing delimiter, which
/// may also be escaped; any unknown escape yields the character itself.
fn decode_escape(c: char, quote: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '\\' => '\\',
        c if c == quote => quote,
        c => c,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar(char),
    UnterminatedString,
    UnterminatedChar,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            Error::UnterminatedString => write!(f, "unterminated string literal"),
            Error::UnterminatedChar => write!(f, "unterminated character literal"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    #[test]
    fn tests_with_lines() {
        use TokenKind::*;
        let cases = cases!(match .. {
            "+ ++ += - -- -= ->" => [
                (Plus, "+", 1),
                (PlusPlus, "++", 1),
                (PlusEq, "+=", 1),
                (Minus, "-", 1),
                (MinusMinus, "--", 1),
                (MinusEq, "-=", 1),
                (Arrow, "->", 1),
                (Eof, "", 1),
            ],
            "* *= / /= ! != = ==" => [
                (Star, "*", 1),
                (StarEq, "*=", 1),
                (Slash, "/", 1),
                (SlashEq, "/=", 1),
                (Not, "!", 1),
                (NotEq, "!=", 1),
                (Assign, "=", 1),
                (EqEq, "==", 1),
                (Eof, "", 1),
            ],
            "< <= << > >= >> & && | ||" => [
                (Less, "<", 1),
                (LessEq, "<=", 1),
                (Shl, "<<", 1),
                (Greater, ">", 1),
                (GreaterEq, ">=", 1),
                (Shr, ">>", 1),
                (Ampersand, "&", 1),
                (AndAnd, "&&", 1),
                (Pipe, "|", 1),
                (OrOr, "||", 1),
                (Eof, "", 1),
            ],
            "(){}[];,." => [
                (LParen, "(", 1),
                (RParen, ")", 1),
                (LBrace, "{", 1),
                (RBrace, "}", 1),
                (LBracket, "[", 1),
                (RBracket, "]", 1),
                (Semicolon, ";", 1),
                (Comma, ",", 1),
                (Dot, ".", 1),
                (Eof, "", 1),
            ],
            "int float char void bool string if else while for return" => [
                (Int, "int", 1),
                (Float, "float", 1),
                (Char, "char", 1),
                (Void, "void", 1),
                (Bool, "bool", 1),
                (StringLit, "string", 1),
                (If, "if", 1),
                (Else, "else", 1),
                (While, "while", 1),
                (For, "for", 1),
                (Return, "return", 1),
                (Eof, "", 1),
            ],
            "using namespace std cout cin endl true false" => [
                (Using, "using", 1),
                (Namespace, "namespace", 1),
                (Std, "std", 1),
                (Cout, "cout", 1),
                (Cin, "cin", 1),
                (Endl, "endl", 1),
                (True, "true", 1),
                (False, "false", 1),
                (Eof, "", 1),
            ],
            "foo _bar x1 returns inty" => [
                (Identifier, "foo", 1),
                (Identifier, "_bar", 1),
                (Identifier, "x1", 1),
                (Identifier, "returns", 1),
                (Identifier, "inty", 1),
                (Eof, "", 1),
            ],
            "0 42 3.14 1. 1.2.3" => [
                (IntLit, "0", 1),
                (IntLit, "42", 1),
                (FloatLit, "3.14", 1),
                (FloatLit, "1.", 1),
                (FloatLit, "1.2", 1),
                (Dot, ".", 1),
                (IntLit, "3", 1),
                (Eof, "", 1),
            ],
            r#""hello" "a\nb\tc" "q\"q" "back\\slash" "\x""# => [
                (StringLit, "hello", 1),
                (StringLit, "a\nb\tc", 1),
                (StringLit, "q\"q", 1),
                (StringLit, "back\\slash", 1),
                (StringLit, "x", 1),
                (Eof, "", 1),
            ],
            r"'A' '\n' '\t' '\\' '\''" => [
                (CharLit, "A", 1),
                (CharLit, "\n", 1),
                (CharLit, "\t", 1),
                (CharLit, "\\", 1),
                (CharLit, "'", 1),
                (Eof, "", 1),
            ],
            "a // comment\nb /* multi\nline */ c" => [
                (Identifier, "a", 1),
                (Identifier, "b", 2),
                (Identifier, "c", 3),
                (Eof, "", 3),
            ],
            "a /* runs to the end" => [
                (Identifier, "a", 1),
                (Eof, "", 1),
            ],
            "#include <iostream>\n#include \"local.h\"\n#pragma once" => [
                (Include, "iostream", 1),
                (Include, "local.h", 2),
                (Hash, "pragma", 3),
                (Identifier, "once", 3),
                (Eof, "", 3),
            ],
            "#include" => [
                (Hash, "include", 1),
                (Eof, "", 1),
            ],
        });

        for (input, expected) in cases {
            assert_eq!(&lex(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn line_numbers_are_non_decreasing() {
        let tokens = lex("int a;\nint b;\n\nif (a < b) {\n  a = 1;\n}\n");
        for pair in tokens.windows(2) {
            assert!(pair[0].line <= pair[1].line, "{pair:?}");
        }
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
        for _ in 0..4 {
            assert!(lexer.next_token().unwrap().is_eof());
        }
    }

    #[test]
    fn every_input_reaches_eof() {
        // Errors consume the offending character, so the scan always makes
        // progress even on garbage input.
        let inputs = ["@@@", "a $ b", "\"unterminated", "'x", "'", "~`@$"];
        for input in inputs {
            let mut lexer = Lexer::new(input);
            let mut steps = 0;
            loop {
                match lexer.next_token() {
                    Ok(token) if token.is_eof() => break,
                    Ok(_) | Err(_) => {}
                }
                steps += 1;
                assert!(steps < 100, "lexer failed to terminate on {input:?}");
            }
        }
    }

    #[test]
    fn lexical_errors() {
        let mut lexer = Lexer::new("@");
        assert_eq!(
            lexer.next_token(),
            Err(Located::new(1, Error::UnexpectedChar('@')))
        );

        let mut lexer = Lexer::new("\"abc");
        assert_eq!(
            lexer.next_token(),
            Err(Located::new(1, Error::UnterminatedString))
        );

        let mut lexer = Lexer::new("'ab'");
        assert_eq!(
            lexer.next_token(),
            Err(Located::new(1, Error::UnterminatedChar))
        );
    }

    #[test]
    fn tracks_position_and_column() {
        let mut lexer = Lexer::new("ab\ncd");
        lexer.next_token().unwrap();
        assert_eq!((lexer.line(), lexer.column()), (1, 3));
        lexer.next_token().unwrap();
        assert_eq!((lexer.line(), lexer.column()), (2, 3));
        assert_eq!(lexer.position(), 5);
    }

    #[test]
    fn multibyte_char_literal() {
        let tokens = lex("'é'");
        assert_eq!(tokens[0], Token::new(TokenKind::CharLit, "é", 1));
    }

    macro_rules! cases {
        (match .. {
            $($src:expr => [$(($kind:expr, $lexeme:expr, $line:expr)),* $(,)?]),* $(,)?
        }) => {{
            &[$((
                $src,
                vec![$(Token::new($kind, $lexeme, $line)),*],
            )),*]
        }};
    }
    use cases;
}
