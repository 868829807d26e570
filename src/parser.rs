use crate::{
    ast::{Expression, Parameter, Statement},
    lexer::{self, Lexer},
    token::{Located, Token, TokenKind},
};

type Result<T, E = Located<Error>> = std::result::Result<T, E>;

/// Outcome of a whole parse: on failure the recovered statements are still
/// returned alongside the accumulated diagnostics.
pub type ParseResult<T> = std::result::Result<T, (T, Vec<Located<Error>>)>;

/// The parser.
///
/// A single-lookahead recursive descent over the token stream. The lexer is
/// pulled one token at a time; `current` always holds the lookahead.
///
/// Productions return `Result` and never recover on their own: the
/// top-level [`parse`] loop records one diagnostic per failed statement,
/// skips to the next statement start via [`synchronize`], and resumes, so a
/// program with K bad statements still yields every healthy one.
///
/// [`parse`]: Parser::parse
/// [`synchronize`]: Parser::synchronize
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
}

impl<'src> Parser<'src> {
    /// Creates a parser, pulling the first token.
    pub fn new(mut lexer: Lexer<'src>) -> Result<Parser<'src>> {
        let current = lexer.next_token().map_err(|e| e.map(Error::Lex))?;
        Ok(Parser { lexer, current })
    }

    pub fn parse(mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.check(TokenKind::Eof) {
            // Stray semicolons are skipped.
            if self.check(TokenKind::Semicolon) {
                if let Err(error) = self.advance() {
                    errors.push(error);
                    break;
                }
                continue;
            }
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    // A lexical error is fatal; everything else is recovered
                    // by skipping to the next statement start.
                    let fatal = matches!(error.inner, Error::Lex(_));
                    errors.push(error);
                    if fatal {
                        break;
                    }
                    if let Err(error) = self.synchronize() {
                        errors.push(error);
                        break;
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(statements)
        } else {
            Err((statements, errors))
        }
    }

    /// Discards tokens until a likely statement boundary: just past a `;`
    /// or `}`, or right before a statement-starting keyword.
    fn synchronize(&mut self) -> Result<()> {
        self.advance()?;
        while !self.check(TokenKind::Eof) {
            match self.current.kind {
                TokenKind::Semicolon | TokenKind::RBrace => {
                    self.advance()?;
                    return Ok(());
                }
                TokenKind::Int
                | TokenKind::Float
                | TokenKind::Char
                | TokenKind::Void
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return => return Ok(()),
                _ => {
                    self.advance()?;
                }
            }
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current.kind {
            TokenKind::Include | TokenKind::Hash => self.parse_preprocessor_directive(),
            TokenKind::Using => self.parse_using_directive(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Int
            | TokenKind::Float
            | TokenKind::Char
            | TokenKind::Void
            | TokenKind::Bool
            | TokenKind::StringLit => self.parse_declaration(),
            TokenKind::Identifier if self.current.lexeme == "string" => self.parse_declaration(),
            _ => {
                let expression = self.parse_expression()?;
                self.consume(TokenKind::Semicolon, "after expression")?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    /// Include directives become inert string-literal statements; any other
    /// directive is rejected.
    fn parse_preprocessor_directive(&mut self) -> Result<Statement> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Include => Ok(Statement::Expression(Expression::Literal {
                value: token.lexeme,
                literal_kind: TokenKind::StringLit,
            })),
            _ => Err(Located::new(token.line, Error::UnsupportedDirective)),
        }
    }

    /// Only `using namespace std;` is accepted, as an inert marker.
    fn parse_using_directive(&mut self) -> Result<Statement> {
        self.advance()?;
        if self.match_kind(TokenKind::Namespace)? && self.match_kind(TokenKind::Std)? {
            self.consume(TokenKind::Semicolon, "after namespace std")?;
            return Ok(Statement::Expression(Expression::Identifier {
                name: "using_namespace_std".to_string(),
            }));
        }
        Err(self.error(Error::UnsupportedUsing))
    }

    fn parse_return(&mut self) -> Result<Statement> {
        self.advance()?;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "after return value")?;
        Ok(Statement::Return { value })
    }

    fn parse_if(&mut self) -> Result<Statement> {
        self.advance()?;
        self.consume(TokenKind::LParen, "after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen, "after if condition")?;

        self.consume(TokenKind::LBrace, "before if body")?;
        let then_branch = self.parse_block()?;
        self.consume(TokenKind::RBrace, "after if body")?;

        let else_branch = if self.match_kind(TokenKind::Else)? {
            self.consume(TokenKind::LBrace, "before else body")?;
            let else_branch = self.parse_block()?;
            self.consume(TokenKind::RBrace, "after else body")?;
            Some(Box::new(else_branch))
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        self.advance()?;
        self.consume(TokenKind::LParen, "after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen, "after while condition")?;

        self.consume(TokenKind::LBrace, "before while body")?;
        let body = self.parse_block()?;
        self.consume(TokenKind::RBrace, "after while body")?;

        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }

    fn parse_for(&mut self) -> Result<Statement> {
        self.advance()?;
        self.consume(TokenKind::LParen, "after 'for'")?;

        let initializer = if self.match_kind(TokenKind::Semicolon)? {
            None
        } else {
            let is_declaration = matches!(
                self.current.kind,
                TokenKind::Int
                    | TokenKind::Float
                    | TokenKind::Char
                    | TokenKind::Bool
                    | TokenKind::StringLit
            ) || (self.check(TokenKind::Identifier) && self.current.lexeme == "string");
            let initializer = if is_declaration {
                self.parse_declaration()?
            } else {
                let expression = self.parse_expression()?;
                self.consume(TokenKind::Semicolon, "after for initializer")?;
                Statement::Expression(expression)
            };
            Some(Box::new(initializer))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "after for condition")?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RParen, "after for clauses")?;

        self.consume(TokenKind::LBrace, "before for body")?;
        let body = self.parse_block()?;
        self.consume(TokenKind::RBrace, "after for body")?;

        Ok(Statement::For {
            initializer,
            condition,
            increment,
            body: Box::new(body),
        })
    }

    /// Parses the statements of a brace-delimited block. The braces
    /// themselves are consumed by the caller.
    fn parse_block(&mut self) -> Result<Statement> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Statement::Block { statements })
    }

    /// Parses a function or variable declaration; the current token is the
    /// type starter.
    fn parse_declaration(&mut self) -> Result<Statement> {
        let type_token = self.advance()?;
        let declared_type = type_starter_kind(&type_token);

        let is_pointer = self.match_kind(TokenKind::Star)?;
        let name = self.consume(TokenKind::Identifier, "after type")?.lexeme;

        if self.match_kind(TokenKind::LParen)? {
            return self.parse_function(name, declared_type);
        }

        // One or more variables; `int a = 1, b = 2, c;` declares three.
        let mut declarations = Vec::new();
        let initializer = self.parse_initializer()?;
        declarations.push(Statement::VariableDeclaration {
            declared_type,
            is_pointer,
            name,
            initializer,
        });

        while self.match_kind(TokenKind::Comma)? {
            let name = self.consume(TokenKind::Identifier, "after ','")?.lexeme;
            let initializer = self.parse_initializer()?;
            declarations.push(Statement::VariableDeclaration {
                declared_type,
                is_pointer,
                name,
                initializer,
            });
        }

        self.consume(TokenKind::Semicolon, "after variable declaration")?;

        if declarations.len() == 1 {
            // A plain declaration needs no wrapper.
            return Ok(declarations.remove(0));
        }
        Ok(Statement::Block {
            statements: declarations,
        })
    }

    fn parse_initializer(&mut self) -> Result<Option<Expression>> {
        if self.match_kind(TokenKind::Assign)? {
            Ok(Some(self.parse_expression()?))
        } else {
            Ok(None)
        }
    }

    /// Parses the parameter list and body of a function declaration; the
    /// opening parenthesis is already consumed.
    fn parse_function(&mut self, name: String, return_type: TokenKind) -> Result<Statement> {
        let mut parameters: Vec<Parameter> = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let type_token = self.advance()?;
                let param_type = type_starter_kind(&type_token);
                let is_pointer = self.match_kind(TokenKind::Star)?;
                let param_name = self
                    .consume(TokenKind::Identifier, "as parameter name")?
                    .lexeme;
                let kind = if is_pointer {
                    TokenKind::Pointer
                } else {
                    param_type
                };
                parameters.push((param_name, kind));
                if !self.match_kind(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "after parameters")?;

        self.consume(TokenKind::LBrace, "before function body")?;
        let body = self.parse_block()?;
        self.consume(TokenKind::RBrace, "after function body")?;

        Ok(Statement::FunctionDeclaration {
            name,
            return_type,
            parameters,
            body: Box::new(body),
        })
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expression> {
        use TokenKind::*;

        let expression = self.parse_logical_or()?;

        if matches!(self.current.kind, Assign | PlusEq | MinusEq | StarEq | SlashEq) {
            let op = self.current.kind;
            self.advance()?;
            let Expression::Identifier { name } = expression else {
                return Err(self.error(Error::InvalidAssignmentTarget));
            };
            // Assignment is right-associative.
            let value = self.parse_assignment()?;
            if op == Assign {
                return Ok(Expression::Assign {
                    name,
                    op,
                    value: Box::new(value),
                });
            }
            // `x op= e` becomes `x = x op e`.
            let underlying = match op {
                PlusEq => Plus,
                MinusEq => Minus,
                StarEq => Star,
                _ => Slash,
            };
            let desugared = Expression::Binary {
                left: Box::new(Expression::Identifier { name: name.clone() }),
                op: underlying,
                right: Box::new(value),
            };
            return Ok(Expression::Assign {
                name,
                op: Assign,
                value: Box::new(desugared),
            });
        }

        // Postfix increment on anything that isn't a plain identifier (a
        // parenthesised one, say) lands here rather than in primary.
        if matches!(self.current.kind, PlusPlus | MinusMinus) {
            let op = self.current.kind;
            let Expression::Identifier { name } = expression else {
                return Err(self.error(Error::InvalidIncrementTarget));
            };
            self.advance()?;
            return Ok(Expression::Unary {
                op,
                operand: Box::new(Expression::Identifier { name }),
            });
        }

        Ok(expression)
    }

    fn parse_logical_or(&mut self) -> Result<Expression> {
        let mut expression = self.parse_logical_and()?;
        while self.check(TokenKind::OrOr) {
            let op = self.current.kind;
            self.advance()?;
            let right = self.parse_logical_and()?;
            expression = Expression::Logical {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn parse_logical_and(&mut self) -> Result<Expression> {
        let mut expression = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            let op = self.current.kind;
            self.advance()?;
            let right = self.parse_equality()?;
            expression = Expression::Logical {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        let mut expression = self.parse_comparison()?;
        while matches!(self.current.kind, TokenKind::EqEq | TokenKind::NotEq) {
            let op = self.current.kind;
            self.advance()?;
            let right = self.parse_comparison()?;
            expression = Expression::Binary {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        use TokenKind::*;
        let mut expression = self.parse_term()?;
        while matches!(self.current.kind, Less | LessEq | Greater | GreaterEq) {
            let op = self.current.kind;
            self.advance()?;
            let right = self.parse_term()?;
            expression = Expression::Binary {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn parse_term(&mut self) -> Result<Expression> {
        let mut expression = self.parse_factor()?;
        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.current.kind;
            self.advance()?;
            let right = self.parse_factor()?;
            expression = Expression::Binary {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        let mut expression = self.parse_primary()?;
        while matches!(self.current.kind, TokenKind::Star | TokenKind::Slash) {
            let op = self.current.kind;
            self.advance()?;
            let right = self.parse_primary()?;
            expression = Expression::Binary {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        use TokenKind::*;

        match self.current.kind {
            Not | Star | Ampersand | PlusPlus | MinusMinus | Plus | Minus => {
                let op = self.current.kind;
                self.advance()?;
                let operand = self.parse_primary()?;
                Ok(Expression::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            True | False => {
                let token = self.advance()?;
                Ok(Expression::Literal {
                    value: token.lexeme,
                    literal_kind: BoolLit,
                })
            }
            IntLit | FloatLit | CharLit | StringLit => {
                let token = self.advance()?;
                Ok(Expression::Literal {
                    value: token.lexeme,
                    literal_kind: token.kind,
                })
            }
            Identifier => {
                let name = self.advance()?.lexeme;

                if matches!(self.current.kind, PlusPlus | MinusMinus) {
                    let op = self.current.kind;
                    self.advance()?;
                    return Ok(Expression::Unary {
                        op,
                        operand: Box::new(Expression::Identifier { name }),
                    });
                }

                if self.match_kind(LParen)? {
                    let mut arguments = Vec::new();
                    if !self.check(RParen) {
                        loop {
                            arguments.push(self.parse_expression()?);
                            if !self.match_kind(Comma)? {
                                break;
                            }
                        }
                    }
                    self.consume(RParen, "after arguments")?;
                    return Ok(Expression::Call {
                        callee: name,
                        arguments,
                    });
                }

                if matches!(self.current.kind, Shl | Shr) {
                    return self.parse_stream_chain(name);
                }

                Ok(Expression::Identifier { name })
            }
            LParen => {
                self.advance()?;
                let expression = self.parse_expression()?;
                self.consume(RParen, "after expression")?;
                Ok(expression)
            }
            got => Err(self.error(Error::ExpectedExpression { got })),
        }
    }

    /// Greedily extends `name << a << b …` into a left-leaning [`Binary`]
    /// chain. `endl` is accepted as a right operand and becomes a plain
    /// identifier; it never enters the symbol table.
    ///
    /// [`Binary`]: Expression::Binary
    fn parse_stream_chain(&mut self, name: String) -> Result<Expression> {
        let mut left = Expression::Identifier { name };
        while matches!(self.current.kind, TokenKind::Shl | TokenKind::Shr) {
            let op = self.current.kind;
            self.advance()?;
            let right = if self.check(TokenKind::Endl) {
                self.advance()?;
                Expression::Identifier {
                    name: "endl".to_string(),
                }
            } else {
                self.parse_expression()?
            };
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }
}

impl Parser<'_> {
    /// Returns whether the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Returns the current token and pulls the next one.
    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token().map_err(|e| e.map(Error::Lex))?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Advances if the current token matches the given kind.
    fn match_kind(&mut self, kind: TokenKind) -> Result<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Advances if the current token matches the given kind; errors with
    /// the provided context otherwise.
    fn consume(&mut self, want: TokenKind, ctx: &'static str) -> Result<Token> {
        if self.check(want) {
            self.advance()
        } else {
            Err(self.error(Error::Expected {
                want,
                ctx,
                got: self.current.kind,
            }))
        }
    }

    /// Wraps an error with the current source line.
    fn error(&self, inner: Error) -> Located<Error> {
        Located::new(self.current.line, inner)
    }
}

/// Maps a type-starter token to the declared type kind. The `string`
/// keyword already lexes to the string-literal kind; an identifier spelled
/// "string" is accepted for symmetry.
fn type_starter_kind(token: &Token) -> TokenKind {
    if token.kind == TokenKind::Identifier && token.lexeme == "string" {
        TokenKind::StringLit
    } else {
        token.kind
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Expected {
        want: TokenKind,
        got: TokenKind,
        ctx: &'static str,
    },
    ExpectedExpression {
        got: TokenKind,
    },
    InvalidAssignmentTarget,
    InvalidIncrementTarget,
    UnsupportedDirective,
    UnsupportedUsing,
    /// A lexical error surfaced while pulling tokens; fatal.
    Lex(lexer::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Error::*;
        match self {
            Expected { want, got, ctx } => {
                write!(f, "expected {want:?} {ctx}, but got {got:?}")
            }
            ExpectedExpression { got } => write!(f, "expected expression, but got {got:?}"),
            InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            InvalidIncrementTarget => write!(f, "invalid increment/decrement target"),
            UnsupportedDirective => write!(f, "unsupported preprocessor directive"),
            UnsupportedUsing => write!(f, "unsupported using directive"),
            Lex(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for Error {}
