use crate::{
    ast::{Expression, Statement},
    symbol::{Symbol, SymbolKind, SymbolTable},
    token::TokenKind,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// The type checker.
///
/// Semantic analysis runs in two passes over the top-level statements.
/// Pass one hoists every function declaration into the global scope, so
/// calls may appear before the callee's definition. Pass two walks each
/// statement, computing result kinds for expressions and enforcing scope
/// and return discipline.
///
/// Errors are collected across the whole program rather than raised one
/// at a time: a statement's first error ends that statement's walk, but
/// its siblings — at the top level and inside every block — are still
/// checked, and the whole collection is handed back at the phase
/// boundary. Scopes pushed during the walk are popped on every path,
/// error paths included.
pub struct Checker {
    symbols: SymbolTable,
    current_function: String,
    current_return_type: TokenKind,
    in_function_body: bool,
    errors: Vec<Error>,
}

impl Checker {
    pub fn new() -> Checker {
        Checker {
            symbols: SymbolTable::new(),
            current_function: String::new(),
            current_return_type: TokenKind::Void,
            in_function_body: false,
            errors: Vec::new(),
        }
    }

    pub fn check(mut self, statements: &[Statement]) -> Result<(), Vec<Error>> {
        // Pass 1: hoist function declarations for forward references.
        for statement in statements {
            if let Statement::FunctionDeclaration {
                name,
                return_type,
                parameters,
                ..
            } = statement
            {
                let symbol = Symbol::function(name.clone(), *return_type, parameters.clone());
                if !self.symbols.define(symbol) {
                    self.errors.push(Error::FunctionAlreadyDefined {
                        name: name.clone(),
                    });
                }
            }
        }

        // Pass 2: check every statement, keeping going after failures.
        for statement in statements {
            if let Err(error) = self.check_statement(statement) {
                self.errors.push(error);
            }
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn check_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Expression(expression) => {
                // The parser lowers `using namespace std;` to this marker
                // identifier; it is not a name to resolve.
                if let Expression::Identifier { name } = expression {
                    if name == "using_namespace_std" {
                        return Ok(());
                    }
                }
                self.check_expression(expression)?;
                Ok(())
            }
            Statement::Block { statements } => {
                self.symbols.enter_scope();
                for statement in statements {
                    if let Err(error) = self.check_statement(statement) {
                        self.errors.push(error);
                    }
                }
                self.symbols.exit_scope();
                Ok(())
            }
            Statement::VariableDeclaration {
                declared_type,
                is_pointer,
                name,
                initializer,
            } => {
                // Shadowing is forbidden: the name must be free in every
                // visible scope, not just the innermost one.
                if self.symbols.resolve(name).is_some() {
                    return Err(Error::VariableAlreadyDefined { name: name.clone() });
                }
                let declared = if *is_pointer {
                    TokenKind::Pointer
                } else {
                    *declared_type
                };
                if let Some(initializer) = initializer {
                    let initializer_type = self.check_expression(initializer)?;
                    if !is_compatible(declared, initializer_type) {
                        return Err(Error::BadInitializer {
                            declared,
                            got: initializer_type,
                        });
                    }
                }
                self.symbols
                    .define(Symbol::variable(name.clone(), *declared_type, *is_pointer));
                Ok(())
            }
            Statement::FunctionDeclaration {
                name,
                return_type,
                parameters,
                body,
            } => {
                // Pass 1 must have put the symbol in place.
                match self.symbols.resolve(name) {
                    Some(symbol) if symbol.kind == SymbolKind::Function => {}
                    _ => return Err(Error::MissingFunctionSymbol { name: name.clone() }),
                }

                let previous_function =
                    std::mem::replace(&mut self.current_function, name.clone());
                let previous_return_type =
                    std::mem::replace(&mut self.current_return_type, *return_type);
                let previous_in_body = std::mem::replace(&mut self.in_function_body, true);

                self.symbols.enter_scope();
                for (parameter_name, parameter_type) in parameters {
                    self.symbols.define(Symbol::parameter(
                        parameter_name.clone(),
                        *parameter_type,
                        *parameter_type == TokenKind::Pointer,
                    ));
                }
                let result = self.check_statement(body);
                self.symbols.exit_scope();

                self.current_function = previous_function;
                self.current_return_type = previous_return_type;
                self.in_function_body = previous_in_body;
                result
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition_type = self.check_expression(condition)?;
                if !is_boolean(condition_type) {
                    return Err(Error::ConditionNotBool {
                        construct: "If",
                        got: condition_type,
                    });
                }
                self.check_statement(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_statement(else_branch)?;
                }
                Ok(())
            }
            Statement::While { condition, body } => {
                let condition_type = self.check_expression(condition)?;
                if !is_boolean(condition_type) {
                    return Err(Error::ConditionNotBool {
                        construct: "While",
                        got: condition_type,
                    });
                }
                self.check_statement(body)
            }
            Statement::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                // The whole loop head and body share one scope.
                self.symbols.enter_scope();
                let result = self.check_for(initializer, condition, increment, body);
                self.symbols.exit_scope();
                result
            }
            Statement::Return { value } => {
                if !self.in_function_body {
                    return Err(Error::ReturnOutsideFunction);
                }
                match value {
                    Some(value) => {
                        let value_type = self.check_expression(value)?;
                        if self.current_return_type == TokenKind::Void {
                            return Err(Error::ReturnValueFromVoid);
                        }
                        if !is_compatible(self.current_return_type, value_type) {
                            return Err(Error::ReturnTypeMismatch {
                                function: self.current_function.clone(),
                                expected: self.current_return_type,
                                got: value_type,
                            });
                        }
                    }
                    None => {
                        if self.current_return_type != TokenKind::Void {
                            return Err(Error::MissingReturnValue {
                                function: self.current_function.clone(),
                                expected: self.current_return_type,
                            });
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn check_for(
        &mut self,
        initializer: &Option<Box<Statement>>,
        condition: &Option<Expression>,
        increment: &Option<Expression>,
        body: &Statement,
    ) -> Result<()> {
        if let Some(initializer) = initializer {
            self.check_statement(initializer)?;
        }
        if let Some(condition) = condition {
            let condition_type = self.check_expression(condition)?;
            if !is_boolean(condition_type) {
                return Err(Error::ConditionNotBool {
                    construct: "For loop",
                    got: condition_type,
                });
            }
        }
        if let Some(increment) = increment {
            self.check_expression(increment)?;
        }
        self.check_statement(body)
    }

    /// Computes the result kind of an expression.
    fn check_expression(&mut self, expression: &Expression) -> Result<TokenKind> {
        use TokenKind::*;

        match expression {
            Expression::Literal { literal_kind, .. } => Ok(*literal_kind),
            Expression::Identifier { name } => {
                let Some(symbol) = self.symbols.resolve(name) else {
                    return Err(Error::UndefinedVariable { name: name.clone() });
                };
                if symbol.kind == SymbolKind::Function {
                    return Err(Error::FunctionAsVariable { name: name.clone() });
                }
                if symbol.is_pointer {
                    Ok(Pointer)
                } else {
                    Ok(symbol.declared_type)
                }
            }
            Expression::Unary { op, operand } => {
                let operand_type = self.check_expression(operand)?;
                match op {
                    Plus | Minus => {
                        if !is_numeric(operand_type) {
                            return Err(Error::UnaryNeedsNumeric);
                        }
                        Ok(operand_type)
                    }
                    Not => Ok(Bool),
                    PlusPlus | MinusMinus => {
                        if !is_numeric(operand_type) {
                            return Err(Error::IncrementNeedsNumeric);
                        }
                        Ok(operand_type)
                    }
                    Star => {
                        if operand_type != Pointer {
                            return Err(Error::DerefNonPointer);
                        }
                        // The pointee type is not tracked; dereferencing
                        // always yields int.
                        Ok(Int)
                    }
                    Ampersand => Ok(Pointer),
                    _ => Err(Error::UnsupportedOperator { op: *op }),
                }
            }
            Expression::Binary { left, op, right } => {
                // Stream operands are not constrained; `endl` in particular
                // never resolves, so the right side is left unexamined.
                if matches!(op, Shl | Shr) {
                    return self.check_expression(left);
                }

                let left_type = self.check_expression(left)?;
                let right_type = self.check_expression(right)?;
                match op {
                    Plus | Minus | Star | Slash => {
                        // String concatenation.
                        if *op == Plus && (left_type == StringLit || right_type == StringLit) {
                            return Ok(StringLit);
                        }
                        // Pointer arithmetic, pointer on either side.
                        if matches!(op, Plus | Minus)
                            && left_type == Pointer
                            && is_numeric(right_type)
                        {
                            return Ok(Pointer);
                        }
                        if *op == Plus && right_type == Pointer && is_numeric(left_type) {
                            return Ok(Pointer);
                        }
                        if !is_numeric(left_type) || !is_numeric(right_type) {
                            return Err(Error::NonNumericOperands {
                                op: *op,
                                left: left_type,
                                right: right_type,
                            });
                        }
                        if left_type == FloatLit || right_type == FloatLit {
                            Ok(FloatLit)
                        } else {
                            Ok(IntLit)
                        }
                    }
                    EqEq | NotEq | Less | LessEq | Greater | GreaterEq => {
                        if !is_compatible(left_type, right_type) {
                            return Err(Error::IncompatibleComparison {
                                left: left_type,
                                right: right_type,
                            });
                        }
                        Ok(Bool)
                    }
                    _ => Err(Error::UnsupportedOperator { op: *op }),
                }
            }
            Expression::Logical { left, right, .. } => {
                let left_type = self.check_expression(left)?;
                let right_type = self.check_expression(right)?;
                if !is_boolean(left_type) {
                    return Err(Error::LogicalOperandNotBool {
                        side: "Left",
                        got: left_type,
                    });
                }
                if !is_boolean(right_type) {
                    return Err(Error::LogicalOperandNotBool {
                        side: "Right",
                        got: right_type,
                    });
                }
                Ok(Bool)
            }
            Expression::Assign { name, value, .. } => {
                let Some(symbol) = self.symbols.resolve(name) else {
                    return Err(Error::AssignToUndeclared { name: name.clone() });
                };
                if symbol.kind == SymbolKind::Function {
                    return Err(Error::AssignToFunction { name: name.clone() });
                }
                let target = if symbol.is_pointer {
                    TokenKind::Pointer
                } else {
                    symbol.declared_type
                };
                let value_type = self.check_expression(value)?;
                if !is_compatible(target, value_type) {
                    return Err(Error::AssignTypeMismatch {
                        value: value_type,
                        target,
                    });
                }
                Ok(target)
            }
            Expression::Call { callee, arguments } => {
                let Some(symbol) = self.symbols.resolve(callee) else {
                    return Err(Error::UndefinedFunction {
                        name: callee.clone(),
                    });
                };
                if symbol.kind != SymbolKind::Function {
                    return Err(Error::NotAFunction {
                        name: callee.clone(),
                    });
                }
                let parameters = symbol.parameters.clone();
                let return_type = symbol.return_type;

                if parameters.len() != arguments.len() {
                    return Err(Error::ArityMismatch {
                        name: callee.clone(),
                        expected: parameters.len(),
                        got: arguments.len(),
                    });
                }
                for (index, (argument, (_, parameter_type))) in
                    arguments.iter().zip(&parameters).enumerate()
                {
                    let argument_type = self.check_expression(argument)?;
                    if !is_compatible(*parameter_type, argument_type) {
                        return Err(Error::ArgumentTypeMismatch {
                            index: index + 1,
                            name: callee.clone(),
                            expected: *parameter_type,
                            got: argument_type,
                        });
                    }
                }
                Ok(return_type)
            }
        }
    }
}

impl Default for Checker {
    fn default() -> Checker {
        Checker::new()
    }
}

fn is_numeric(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::IntLit | TokenKind::FloatLit | TokenKind::Int | TokenKind::Float
    )
}

fn is_boolean(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Bool | TokenKind::BoolLit | TokenKind::True | TokenKind::False
    )
}

/// Two kinds are compatible when they are identical, both numeric, both
/// boolean, or a pointer paired with an integer literal (null assignment).
fn is_compatible(left: TokenKind, right: TokenKind) -> bool {
    left == right
        || (is_numeric(left) && is_numeric(right))
        || (is_boolean(left) && is_boolean(right))
        || (left == TokenKind::Pointer && right == TokenKind::IntLit)
}

/// Human-readable spelling for a kind in diagnostics.
fn type_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Int | TokenKind::IntLit => "int",
        TokenKind::Float | TokenKind::FloatLit => "float",
        TokenKind::Char | TokenKind::CharLit => "char",
        TokenKind::Void => "void",
        TokenKind::Bool | TokenKind::BoolLit => "bool",
        TokenKind::StringLit => "string",
        TokenKind::Pointer => "pointer",
        _ => "unknown",
    }
}

fn operator_name(op: TokenKind) -> &'static str {
    match op {
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        _ => "?",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    FunctionAlreadyDefined { name: String },
    UndefinedVariable { name: String },
    FunctionAsVariable { name: String },
    AssignToUndeclared { name: String },
    AssignToFunction { name: String },
    AssignTypeMismatch { value: TokenKind, target: TokenKind },
    UndefinedFunction { name: String },
    NotAFunction { name: String },
    ArityMismatch { name: String, expected: usize, got: usize },
    ArgumentTypeMismatch { index: usize, name: String, expected: TokenKind, got: TokenKind },
    UnaryNeedsNumeric,
    IncrementNeedsNumeric,
    DerefNonPointer,
    UnsupportedOperator { op: TokenKind },
    NonNumericOperands { op: TokenKind, left: TokenKind, right: TokenKind },
    IncompatibleComparison { left: TokenKind, right: TokenKind },
    LogicalOperandNotBool { side: &'static str, got: TokenKind },
    VariableAlreadyDefined { name: String },
    BadInitializer { declared: TokenKind, got: TokenKind },
    ConditionNotBool { construct: &'static str, got: TokenKind },
    ReturnOutsideFunction,
    ReturnValueFromVoid,
    ReturnTypeMismatch { function: String, expected: TokenKind, got: TokenKind },
    MissingReturnValue { function: String, expected: TokenKind },
    MissingFunctionSymbol { name: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Error::*;
        match self {
            FunctionAlreadyDefined { name } => {
                write!(f, "Function '{name}' already defined")
            }
            UndefinedVariable { name } => write!(f, "Undefined variable '{name}'"),
            FunctionAsVariable { name } => {
                write!(f, "'{name}' is a function and cannot be used as a variable")
            }
            AssignToUndeclared { name } => {
                write!(f, "Cannot assign to undeclared variable '{name}'")
            }
            AssignToFunction { name } => write!(f, "Cannot assign to function '{name}'"),
            AssignTypeMismatch { value, target } => write!(
                f,
                "Cannot assign {} to variable of type {}",
                type_name(*value),
                type_name(*target)
            ),
            UndefinedFunction { name } => write!(f, "Undefined function '{name}'"),
            NotAFunction { name } => write!(f, "'{name}' is not a function"),
            ArityMismatch { name, expected, got } => write!(
                f,
                "Function '{name}' expects {expected} arguments, but got {got}"
            ),
            ArgumentTypeMismatch { index, name, expected, got } => write!(
                f,
                "Argument {index} to function '{name}' has incompatible type: expected {}, got {}",
                type_name(*expected),
                type_name(*got)
            ),
            UnaryNeedsNumeric => {
                write!(f, "Unary '+' and '-' operators require numeric operands")
            }
            IncrementNeedsNumeric => {
                write!(f, "Increment and decrement operators require numeric operands")
            }
            DerefNonPointer => write!(f, "Cannot dereference non-pointer type"),
            UnsupportedOperator { op } => write!(f, "Unsupported operator: {op:?}"),
            NonNumericOperands { op, left, right } => write!(
                f,
                "Binary operator '{}' requires numeric operands, got {} and {}",
                operator_name(*op),
                type_name(*left),
                type_name(*right)
            ),
            IncompatibleComparison { left, right } => write!(
                f,
                "Cannot compare incompatible types: {} and {}",
                type_name(*left),
                type_name(*right)
            ),
            LogicalOperandNotBool { side, got } => write!(
                f,
                "{side} operand of logical operator must be boolean, got {}",
                type_name(*got)
            ),
            VariableAlreadyDefined { name } => write!(f, "Variable '{name}' already defined"),
            BadInitializer { declared, got } => write!(
                f,
                "Cannot initialize variable of type {} with value of type {}",
                type_name(*declared),
                type_name(*got)
            ),
            ConditionNotBool { construct, got } => write!(
                f,
                "{construct} condition must be boolean, got {}",
                type_name(*got)
            ),
            ReturnOutsideFunction => write!(f, "Return statement outside of function body"),
            ReturnValueFromVoid => write!(f, "Cannot return a value from void function"),
            ReturnTypeMismatch { function, expected, got } => write!(
                f,
                "Function '{function}' returns {} but got {}",
                type_name(*expected),
                type_name(*got)
            ),
            MissingReturnValue { function, expected } => write!(
                f,
                "Function '{function}' must return a value of type {}",
                type_name(*expected)
            ),
            MissingFunctionSymbol { name } => {
                write!(f, "Internal error: function '{name}' not found in symbol table")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::Lexer, parser::Parser};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Vec<Statement> {
        Parser::new(Lexer::new(src))
            .expect("first token")
            .parse()
            .unwrap_or_else(|(_, errors)| panic!("parse errors: {errors:?}"))
    }

    fn check(src: &str) -> Result<(), Vec<Error>> {
        Checker::new().check(&parse(src))
    }

    fn check_messages(src: &str) -> Vec<String> {
        match check(src) {
            Ok(()) => vec![],
            Err(errors) => errors.iter().map(Error::to_string).collect(),
        }
    }

    #[test]
    fn undefined_variable_in_initializer() {
        assert_eq!(check_messages("int y = z;"), ["Undefined variable 'z'"]);
    }

    #[test]
    fn forward_calls_resolve_through_hoisting() {
        let src = "int f() { return 1; } int main() { return f(); }";
        assert_eq!(check(src), Ok(()));

        // The call site may even precede the callee's definition.
        let src = "int main() { return f(); } int f() { return 1; }";
        assert_eq!(check(src), Ok(()));
    }

    #[test]
    fn arity_mismatch() {
        let src = "int g(int a, int b) { return a; } int main() { g(1); return 0; }";
        assert_eq!(
            check_messages(src),
            ["Function 'g' expects 2 arguments, but got 1"]
        );
    }

    #[test]
    fn for_loop_variable_is_scoped_to_the_loop() {
        let src = indoc! {"
            int main() {
                int x = 0;
                for (int i = 0; i < 3; ++i) {
                    x = x + i;
                }
                i = 1;
                return 0;
            }
        "};
        assert_eq!(
            check_messages(src),
            ["Cannot assign to undeclared variable 'i'"]
        );
    }

    #[test]
    fn shadowing_is_forbidden() {
        let src = "int x = 1; int main() { int x = 2; return 0; }";
        assert_eq!(check_messages(src), ["Variable 'x' already defined"]);
    }

    #[test]
    fn block_scope_releases_names() {
        // The same name twice in sibling scopes is fine.
        let src = "int main() { if (true) { int t = 1; } else { int t = 2; } return 0; }";
        assert_eq!(check(src), Ok(()));
    }

    #[test]
    fn duplicate_functions() {
        let src = "int f() { return 1; } int f() { return 2; }";
        assert_eq!(check_messages(src), ["Function 'f' already defined"]);
    }

    #[test]
    fn function_used_as_variable() {
        let src = "int f() { return 1; } int main() { int y = f + 1; return 0; }";
        assert_eq!(
            check_messages(src),
            ["'f' is a function and cannot be used as a variable"]
        );
    }

    #[test]
    fn calling_a_variable() {
        let src = "int main() { int x = 1; x(); return 0; }";
        assert_eq!(check_messages(src), ["'x' is not a function"]);
    }

    #[test]
    fn return_outside_function() {
        assert_eq!(
            check_messages("return 1;"),
            ["Return statement outside of function body"]
        );
    }

    #[test]
    fn void_function_returning_a_value() {
        assert_eq!(
            check_messages("void f() { return 1; }"),
            ["Cannot return a value from void function"]
        );
    }

    #[test]
    fn missing_return_value() {
        assert_eq!(
            check_messages("int f() { return; }"),
            ["Function 'f' must return a value of type int"]
        );
    }

    #[test]
    fn non_boolean_condition() {
        let src = "int main() { if (1 + 2) { return 0; } return 0; }";
        assert_eq!(
            check_messages(src),
            ["If condition must be boolean, got int"]
        );

        let src = "int main() { while (1) { return 0; } return 0; }";
        assert_eq!(
            check_messages(src),
            ["While condition must be boolean, got int"]
        );
    }

    #[test]
    fn logical_operands_must_be_boolean() {
        let src = "int main() { bool ok = true && false; if (1 && true) { return 0; } return 0; }";
        assert_eq!(
            check_messages(src),
            ["Left operand of logical operator must be boolean, got int"]
        );
    }

    #[test]
    fn pointer_flow() {
        let src = "int main() { int x = 1; int* p = &x; int y = *p + 1; p = 0; return 0; }";
        assert_eq!(check(src), Ok(()));
    }

    #[test]
    fn deref_requires_pointer() {
        let src = "int main() { int x = 1; int y = *x; return 0; }";
        assert_eq!(check_messages(src), ["Cannot dereference non-pointer type"]);
    }

    #[test]
    fn string_concatenation() {
        let src = r#"int main() { string s = "a" + "b"; return 0; }"#;
        assert_eq!(check(src), Ok(()));
    }

    #[test]
    fn comparing_incompatible_kinds() {
        let src = r#"int main() { bool b = 1 < "x"; return 0; }"#;
        assert_eq!(
            check_messages(src),
            ["Cannot compare incompatible types: int and string"]
        );
    }

    #[test]
    fn float_accepts_integer_values() {
        let src = "int main() { float y = 1; y = 2; y = 3.5; return 0; }";
        assert_eq!(check(src), Ok(()));
    }

    #[test]
    fn assigning_a_string_to_an_int() {
        let src = r#"int main() { int x = 0; x = "nope"; return 0; }"#;
        assert_eq!(
            check_messages(src),
            ["Cannot assign string to variable of type int"]
        );
    }

    #[test]
    fn argument_type_mismatch() {
        let src = r#"int f(int a) { return a; } int main() { f("x"); return 0; }"#;
        assert_eq!(
            check_messages(src),
            ["Argument 1 to function 'f' has incompatible type: expected int, got string"]
        );
    }

    #[test]
    fn errors_accumulate_across_top_level_statements() {
        let src = "int y = z; int q = w;";
        assert_eq!(
            check_messages(src),
            ["Undefined variable 'z'", "Undefined variable 'w'"]
        );
    }

    #[test]
    fn errors_accumulate_within_a_function_body() {
        let src = "int main() { int y = z; int q = w; }";
        assert_eq!(
            check_messages(src),
            ["Undefined variable 'z'", "Undefined variable 'w'"]
        );
    }

    #[test]
    fn errors_accumulate_across_nested_blocks() {
        let src = indoc! {"
            int main() {
                if (true) {
                    int a = b;
                }
                int c = d;
                return 0;
            }
        "};
        assert_eq!(
            check_messages(src),
            ["Undefined variable 'b'", "Undefined variable 'd'"]
        );
    }

    #[test]
    fn checking_is_idempotent_on_success() {
        let src = "int f(int a) { return a; } int main() { return f(1); }";
        let statements = parse(src);
        assert_eq!(Checker::new().check(&statements), Ok(()));
        assert_eq!(Checker::new().check(&statements), Ok(()));
    }

    #[test]
    fn stream_right_operand_is_not_resolved() {
        let src = "int main() { int out = 0; out << 1 << endl; return 0; }";
        assert_eq!(check(src), Ok(()));
    }

    #[test]
    fn using_directive_marker_is_inert() {
        let src = "using namespace std; int main() { return 0; }";
        assert_eq!(check(src), Ok(()));
    }
}
