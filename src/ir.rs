use std::fmt;

use crate::{
    ast::{Expression, Statement},
    token::TokenKind,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    Load,
    Store,
    Add,
    Sub,
    Mul,
    Div,
    Cmp,
    Jmp,
    Je,
    Jne,
    Jg,
    Jl,
    Call,
    Ret,
    Push,
    Pop,
    Print,
    Label,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Cmp => "CMP",
            Opcode::Jmp => "JMP",
            Opcode::Je => "JE",
            Opcode::Jne => "JNE",
            Opcode::Jg => "JG",
            Opcode::Jl => "JL",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Print => "PRINT",
            Opcode::Label => "LABEL",
        };
        f.write_str(name)
    }
}

/// One three-address instruction. Unused operand slots hold empty strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub arg1: String,
    pub arg2: String,
    pub result: String,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Opcode::*;
        match self.opcode {
            Add | Sub | Mul | Div | Cmp => write!(
                f,
                "{} {}, {} -> {}",
                self.opcode, self.arg1, self.arg2, self.result
            ),
            Load | Store => write!(f, "{} {} -> {}", self.opcode, self.arg1, self.result),
            Jmp | Je | Jne | Jg | Jl | Call | Push | Print => {
                write!(f, "{} {}", self.opcode, self.arg1)
            }
            Ret | Pop => write!(f, "{}", self.opcode),
            Label => write!(f, "{}:", self.arg1),
        }
    }
}

/// Renders an instruction list in the dump format, one instruction per
/// line with two leading spaces.
pub fn dump(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        out.push_str("  ");
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}

/// The IR emitter.
///
/// Syntax-directed lowering of a checked AST into a linear instruction
/// list. Lowering an expression returns the name of the fresh temporary
/// holding its result; temporaries (`t1, t2, …`) and labels (`L1, L2, …`)
/// are drawn from monotonic counters, so within one emitter instance no
/// two names collide.
pub struct Emitter {
    instructions: Vec<Instruction>,
    temp_counter: usize,
    label_counter: usize,
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter {
            instructions: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
        }
    }

    pub fn emit(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.emit_statement(statement);
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Single peephole pass over adjacent instruction pairs: a LOAD
    /// directly followed by a STORE is deleted, and a STORE into a
    /// temporary that the next STORE immediately re-stores is forwarded
    /// into one instruction. One linear scan, no fixpoint iteration.
    pub fn optimize(&mut self) {
        let instructions = std::mem::take(&mut self.instructions);
        let mut optimized = Vec::with_capacity(instructions.len());
        let mut i = 0;
        while i < instructions.len() {
            let instruction = &instructions[i];
            match instructions.get(i + 1) {
                Some(next)
                    if instruction.opcode == Opcode::Load && next.opcode == Opcode::Store =>
                {
                    i += 2;
                }
                Some(next)
                    if instruction.opcode == Opcode::Store
                        && next.opcode == Opcode::Store
                        && next.arg1 == instruction.result =>
                {
                    optimized.push(Instruction {
                        opcode: Opcode::Store,
                        arg1: instruction.arg1.clone(),
                        arg2: String::new(),
                        result: next.result.clone(),
                    });
                    i += 2;
                }
                _ => {
                    optimized.push(instruction.clone());
                    i += 1;
                }
            }
        }
        self.instructions = optimized;
    }

    fn fresh_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    fn fresh_label(&mut self) -> String {
        self.label_counter += 1;
        format!("L{}", self.label_counter)
    }

    fn push(
        &mut self,
        opcode: Opcode,
        arg1: impl Into<String>,
        arg2: impl Into<String>,
        result: impl Into<String>,
    ) {
        self.instructions.push(Instruction {
            opcode,
            arg1: arg1.into(),
            arg2: arg2.into(),
            result: result.into(),
        });
    }

    fn emit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expression(expression) => {
                // The using-directive marker lowers to nothing.
                if matches!(expression, Expression::Identifier { name } if name == "using_namespace_std")
                {
                    return;
                }
                self.emit_expression(expression);
            }
            Statement::Block { statements } => {
                for statement in statements {
                    self.emit_statement(statement);
                }
            }
            Statement::VariableDeclaration {
                name, initializer, ..
            } => {
                if let Some(initializer) = initializer {
                    let temp = self.emit_expression(initializer);
                    self.push(Opcode::Store, temp, "", name.clone());
                }
            }
            Statement::FunctionDeclaration { name, body, .. } => {
                self.push(Opcode::Label, name.clone(), "", "");
                self.emit_statement(body);
                // Guarantee the function ends in a return.
                let ends_in_ret = matches!(
                    self.instructions.last(),
                    Some(Instruction {
                        opcode: Opcode::Ret,
                        ..
                    })
                );
                if !ends_in_ret {
                    self.push(Opcode::Ret, "", "", "");
                }
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let else_label = self.fresh_label();
                let end_label = self.fresh_label();

                self.emit_expression(condition);
                self.push(Opcode::Je, else_label.clone(), "", "");

                self.emit_statement(then_branch);
                self.push(Opcode::Jmp, end_label.clone(), "", "");

                self.push(Opcode::Label, else_label, "", "");
                if let Some(else_branch) = else_branch {
                    self.emit_statement(else_branch);
                }
                self.push(Opcode::Label, end_label, "", "");
            }
            Statement::While { condition, body } => {
                let start_label = self.fresh_label();
                let end_label = self.fresh_label();

                self.push(Opcode::Label, start_label.clone(), "", "");
                self.emit_expression(condition);
                self.push(Opcode::Je, end_label.clone(), "", "");

                self.emit_statement(body);
                self.push(Opcode::Jmp, start_label, "", "");
                self.push(Opcode::Label, end_label, "", "");
            }
            Statement::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                let start_label = self.fresh_label();
                let end_label = self.fresh_label();

                if let Some(initializer) = initializer {
                    self.emit_statement(initializer);
                }
                self.push(Opcode::Label, start_label.clone(), "", "");
                if let Some(condition) = condition {
                    self.emit_expression(condition);
                    self.push(Opcode::Je, end_label.clone(), "", "");
                }

                self.emit_statement(body);
                if let Some(increment) = increment {
                    self.emit_expression(increment);
                }
                self.push(Opcode::Jmp, start_label, "", "");
                self.push(Opcode::Label, end_label, "", "");
            }
            Statement::Return { value } => {
                if let Some(value) = value {
                    self.emit_expression(value);
                }
                self.push(Opcode::Ret, "", "", "");
            }
        }
    }

    /// Lowers an expression; the returned name is the temporary holding
    /// the result.
    fn emit_expression(&mut self, expression: &Expression) -> String {
        match expression {
            Expression::Literal { value, .. } => {
                let temp = self.fresh_temp();
                self.push(Opcode::Store, value.clone(), "", temp.clone());
                temp
            }
            Expression::Identifier { name } => {
                let temp = self.fresh_temp();
                self.push(Opcode::Load, name.clone(), "", temp.clone());
                temp
            }
            Expression::Binary { left, op, right } => match op {
                // Stream writes print each right-hand operand; reads have
                // no opcode to lower to.
                TokenKind::Shl => {
                    let left_temp = self.emit_expression(left);
                    let right_temp = self.emit_expression(right);
                    self.push(Opcode::Print, right_temp, "", "");
                    left_temp
                }
                TokenKind::Shr => {
                    let left_temp = self.emit_expression(left);
                    self.emit_expression(right);
                    left_temp
                }
                _ => {
                    let left_temp = self.emit_expression(left);
                    let right_temp = self.emit_expression(right);
                    let result = self.fresh_temp();
                    let opcode = match op {
                        TokenKind::Plus => Opcode::Add,
                        TokenKind::Minus => Opcode::Sub,
                        TokenKind::Star => Opcode::Mul,
                        TokenKind::Slash => Opcode::Div,
                        TokenKind::EqEq
                        | TokenKind::NotEq
                        | TokenKind::Less
                        | TokenKind::LessEq
                        | TokenKind::Greater
                        | TokenKind::GreaterEq => Opcode::Cmp,
                        _ => unreachable!("binary operator {op:?} survived checking"),
                    };
                    self.push(opcode, left_temp, right_temp, result.clone());
                    result
                }
            },
            Expression::Logical { left, op, right } => {
                // Arithmetic encoding over boolean temps; the linear IR has
                // no short-circuit form.
                let left_temp = self.emit_expression(left);
                let right_temp = self.emit_expression(right);
                let result = self.fresh_temp();
                let opcode = if *op == TokenKind::AndAnd {
                    Opcode::Mul
                } else {
                    Opcode::Add
                };
                self.push(opcode, left_temp, right_temp, result.clone());
                result
            }
            Expression::Unary { op, operand } => match op {
                TokenKind::Plus => self.emit_expression(operand),
                TokenKind::Minus => {
                    let temp = self.emit_expression(operand);
                    let result = self.fresh_temp();
                    self.push(Opcode::Sub, "0", temp, result.clone());
                    result
                }
                TokenKind::Not => {
                    let temp = self.emit_expression(operand);
                    let result = self.fresh_temp();
                    self.push(Opcode::Cmp, temp, "0", result.clone());
                    result
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let temp = self.emit_expression(operand);
                    let result = self.fresh_temp();
                    let opcode = if *op == TokenKind::PlusPlus {
                        Opcode::Add
                    } else {
                        Opcode::Sub
                    };
                    self.push(opcode, temp, "1", result.clone());
                    // Write the new value back through the identifier.
                    if let Expression::Identifier { name } = operand.as_ref() {
                        self.push(Opcode::Store, result.clone(), "", name.clone());
                    }
                    result
                }
                TokenKind::Star => {
                    let temp = self.emit_expression(operand);
                    let result = self.fresh_temp();
                    self.push(Opcode::Load, temp, "", result.clone());
                    result
                }
                // Address computation is deferred to a later stage; the
                // operand's value stands in for it.
                TokenKind::Ampersand => self.emit_expression(operand),
                _ => unreachable!("unary operator {op:?} survived checking"),
            },
            Expression::Assign { name, value, .. } => {
                let temp = self.emit_expression(value);
                self.push(Opcode::Store, temp.clone(), "", name.clone());
                temp
            }
            Expression::Call { callee, arguments } => {
                let argument_temps: Vec<String> = arguments
                    .iter()
                    .map(|argument| self.emit_expression(argument))
                    .collect();
                for temp in &argument_temps {
                    self.push(Opcode::Push, temp.clone(), "", "");
                }
                self.push(Opcode::Call, callee.clone(), "", "");
                for _ in &argument_temps {
                    self.push(Opcode::Pop, "", "", "");
                }
                let result = self.fresh_temp();
                self.push(Opcode::Store, "retval", "", result.clone());
                result
            }
        }
    }
}

impl Default for Emitter {
    fn default() -> Emitter {
        Emitter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::Lexer, parser::Parser};
    use pretty_assertions::assert_eq;

    fn emit(src: &str) -> Emitter {
        let statements = Parser::new(Lexer::new(src))
            .expect("first token")
            .parse()
            .unwrap_or_else(|(_, errors)| panic!("parse errors: {errors:?}"));
        let mut emitter = Emitter::new();
        emitter.emit(&statements);
        emitter
    }

    fn lines(emitter: &Emitter) -> Vec<String> {
        emitter
            .instructions()
            .iter()
            .map(Instruction::to_string)
            .collect()
    }

    #[test]
    fn declaration_with_literal_initializer() {
        let mut emitter = emit("int x = 5;");
        assert_eq!(lines(&emitter), ["STORE 5 -> t1", "STORE t1 -> x"]);

        emitter.optimize();
        assert_eq!(lines(&emitter), ["STORE 5 -> x"]);
    }

    #[test]
    fn assignment_lowering_and_load_store_elimination() {
        let mut emitter = emit("x = y;");
        assert_eq!(lines(&emitter), ["LOAD y -> t1", "STORE t1 -> x"]);

        // The peephole removes adjacent LOAD/STORE pairs outright.
        emitter.optimize();
        assert_eq!(lines(&emitter), Vec::<String>::new());
    }

    #[test]
    fn binary_expression() {
        let emitter = emit("int x = 1 + 2;");
        assert_eq!(
            lines(&emitter),
            [
                "STORE 1 -> t1",
                "STORE 2 -> t2",
                "ADD t1, t2 -> t3",
                "STORE t3 -> x",
            ]
        );
    }

    #[test]
    fn function_and_call() {
        let emitter = emit("int f() { return 1; } int main() { return f(); }");
        assert_eq!(
            lines(&emitter),
            [
                "f:",
                "STORE 1 -> t1",
                "RET",
                "main:",
                "CALL f",
                "STORE retval -> t2",
                "RET",
            ]
        );
    }

    #[test]
    fn call_pushes_and_pops_each_argument() {
        let emitter = emit("g(1, 2);");
        assert_eq!(
            lines(&emitter),
            [
                "STORE 1 -> t1",
                "STORE 2 -> t2",
                "PUSH t1",
                "PUSH t2",
                "CALL g",
                "POP",
                "POP",
                "STORE retval -> t3",
            ]
        );
    }

    #[test]
    fn if_else_shape() {
        let emitter = emit("if (1 < 2) { return 0; } else { return 1; }");
        assert_eq!(
            lines(&emitter),
            [
                "STORE 1 -> t1",
                "STORE 2 -> t2",
                "CMP t1, t2 -> t3",
                "JE L1",
                "STORE 0 -> t4",
                "RET",
                "JMP L2",
                "L1:",
                "STORE 1 -> t5",
                "RET",
                "L2:",
            ]
        );
    }

    #[test]
    fn while_shape() {
        let emitter = emit("while (a < b) { x = 1; }");
        assert_eq!(
            lines(&emitter),
            [
                "L1:",
                "LOAD a -> t1",
                "LOAD b -> t2",
                "CMP t1, t2 -> t3",
                "JE L2",
                "STORE 1 -> t4",
                "STORE t4 -> x",
                "JMP L1",
                "L2:",
            ]
        );
    }

    #[test]
    fn for_shape_runs_increment_before_the_back_edge() {
        let emitter = emit("for (int i = 0; i < 3; ++i) { x = i; }");
        assert_eq!(
            lines(&emitter),
            [
                "STORE 0 -> t1",
                "STORE t1 -> i",
                "L1:",
                "LOAD i -> t2",
                "STORE 3 -> t3",
                "CMP t2, t3 -> t4",
                "JE L2",
                "LOAD i -> t5",
                "STORE t5 -> x",
                "LOAD i -> t6",
                "ADD t6, 1 -> t7",
                "STORE t7 -> i",
                "JMP L1",
                "L2:",
            ]
        );
    }

    #[test]
    fn increment_writes_back() {
        let emitter = emit("x++;");
        assert_eq!(
            lines(&emitter),
            ["LOAD x -> t1", "ADD t1, 1 -> t2", "STORE t2 -> x"]
        );
    }

    #[test]
    fn unary_lowering() {
        let emitter = emit("int a = -x; bool b = !y;");
        assert_eq!(
            lines(&emitter),
            [
                "LOAD x -> t1",
                "SUB 0, t1 -> t2",
                "STORE t2 -> a",
                "LOAD y -> t3",
                "CMP t3, 0 -> t4",
                "STORE t4 -> b",
            ]
        );
    }

    #[test]
    fn stream_write_prints_each_operand() {
        let emitter = emit("out << x << endl;");
        assert_eq!(
            lines(&emitter),
            [
                "LOAD out -> t1",
                "LOAD x -> t2",
                "LOAD endl -> t3",
                "PRINT t3",
                "PRINT t2",
            ]
        );
    }

    #[test]
    fn temporaries_and_labels_are_fresh() {
        let emitter = emit(
            "int f(int a) { if (a < 1) { return 1; } return 2; } \
             int main() { while (1 < 2) { f(3); } for (;;) { f(4); } return 0; }",
        );

        let mut temps = Vec::new();
        let mut labels = Vec::new();
        for instruction in emitter.instructions() {
            if instruction.result.starts_with('t') {
                temps.push(instruction.result.clone());
            }
            if instruction.opcode == Opcode::Label && instruction.arg1.starts_with('L') {
                labels.push(instruction.arg1.clone());
            }
        }

        let mut unique_temps = temps.clone();
        unique_temps.sort();
        unique_temps.dedup();
        assert_eq!(temps.len(), unique_temps.len());

        let mut unique_labels = labels.clone();
        unique_labels.sort();
        unique_labels.dedup();
        assert_eq!(labels.len(), unique_labels.len());
    }

    #[test]
    fn optimize_is_identity_without_adjacent_pairs() {
        let mut emitter = emit("int main() { return 0; }");
        let before = lines(&emitter);
        emitter.optimize();
        assert_eq!(lines(&emitter), before);
    }

    #[test]
    fn optimize_runs_a_single_pass() {
        // Three chained stores: the first pair merges; the merged result is
        // not reconsidered against the third instruction.
        let mut emitter = Emitter::new();
        emitter.push(Opcode::Store, "5", "", "t1");
        emitter.push(Opcode::Store, "t1", "", "t2");
        emitter.push(Opcode::Store, "t2", "", "x");
        emitter.optimize();
        assert_eq!(lines(&emitter), ["STORE 5 -> t2", "STORE t2 -> x"]);
    }

    #[test]
    fn dump_format() {
        let emitter = emit("int x = 5;");
        assert_eq!(dump(emitter.instructions()), "  STORE 5 -> t1\n  STORE t1 -> x\n");
    }

    #[test]
    fn emission_is_deterministic() {
        let src = "int f(int n) { if (n <= 1) { return 1; } return n * f(n - 1); }";
        let first = lines(&emit(src));
        let second = lines(&emit(src));
        assert_eq!(first, second);
    }
}
