// statement  ::= ';'
//              | '#' directive
//              | 'using' 'namespace' 'std' ';'
//              | 'return' expr? ';'
//              | 'if' '(' expr ')' '{' block '}' ('else' '{' block '}')?
//              | 'while' '(' expr ')' '{' block '}'
//              | 'for' '(' init? ';' expr? ';' expr? ')' '{' block '}'
//              | type '*'? ID ('(' params? ')' '{' block '}' | var_tail ';')
//              | expr ';'
// var_tail   ::= ('=' expr)? (',' ID ('=' expr)?)*
//
// expr       ::= assignment
// assignment ::= logical_or (('=' | '+=' | '-=' | '*=' | '/=') assignment)?
//              | logical_or ('++' | '--')
// logical_or ::= logical_and ('||' logical_and)*
// logical_and::= equality ('&&' equality)*
// equality   ::= comparison (('==' | '!=') comparison)*
// comparison ::= term (('<' | '<=' | '>' | '>=') term)*
// term       ::= factor (('+' | '-') factor)*
// factor     ::= primary (('*' | '/') primary)*
// primary    ::= ('!' | '*' | '&' | '++' | '--' | '+' | '-') primary
//              | literal
//              | ID ('(' args? ')')?
//              | ID ('++' | '--')
//              | ID ('<<' | '>>') stream_chain
//              | '(' expr ')'

use crate::token::TokenKind;

/// A function parameter: its name and declared type kind.
pub type Parameter = (String, TokenKind);

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal with its decoded payload; `literal_kind` is one of the
    /// `*Lit` token kinds.
    Literal {
        value: String,
        literal_kind: TokenKind,
    },
    Identifier {
        name: String,
    },
    Unary {
        op: TokenKind,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: TokenKind,
        right: Box<Expression>,
    },
    /// Short-circuit operators `&&` and `||`, kept apart from [`Binary`]
    /// so the checker can enforce boolean operands.
    ///
    /// [`Binary`]: Expression::Binary
    Logical {
        left: Box<Expression>,
        op: TokenKind,
        right: Box<Expression>,
    },
    /// The parser rewrites `x op= e` into `Assign(x, =, Binary(x, op, e))`,
    /// so `op` is always `=` after parsing.
    Assign {
        name: String,
        op: TokenKind,
        value: Box<Expression>,
    },
    Call {
        callee: String,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Block {
        statements: Vec<Statement>,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    For {
        initializer: Option<Box<Statement>>,
        condition: Option<Expression>,
        increment: Option<Expression>,
        body: Box<Statement>,
    },
    Return {
        value: Option<Expression>,
    },
    VariableDeclaration {
        declared_type: TokenKind,
        is_pointer: bool,
        name: String,
        initializer: Option<Expression>,
    },
    FunctionDeclaration {
        name: String,
        return_type: TokenKind,
        parameters: Vec<Parameter>,
        body: Box<Statement>,
    },
}
