/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The type checker walks the AST over a scoped symbol table, collecting
/// semantic diagnostics.
pub mod type_checker;

/// The emitter lowers a checked AST into linear three-address code and
/// runs a peephole cleanup pass over it.
pub mod ir;

pub mod ast;
pub mod symbol;
pub mod token;

use std::fmt;

use log::debug;

use crate::{
    ir::Emitter, lexer::Lexer, parser::Parser, token::Located, type_checker::Checker,
};

/// Runs the whole pipeline over one source text, producing the rendered
/// IR dump.
///
/// Phases run in strict order and a failing phase stops the pipeline: any
/// parse diagnostic skips semantic analysis and emission, and any semantic
/// diagnostic skips emission.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let parser = Parser::new(Lexer::new(source)).map_err(|error| CompileError::Parse(vec![error]))?;
    let statements = match parser.parse() {
        Ok(statements) => statements,
        Err((_, errors)) => return Err(CompileError::Parse(errors)),
    };
    debug!("parsed {} top-level statements", statements.len());

    Checker::new()
        .check(&statements)
        .map_err(CompileError::Semantic)?;
    debug!("semantic analysis passed");

    let mut emitter = Emitter::new();
    emitter.emit(&statements);
    emitter.optimize();
    let instructions = emitter.into_instructions();
    debug!("emitted {} instructions", instructions.len());

    Ok(ir::dump(&instructions))
}

/// Diagnostics of the phase that stopped the pipeline.
#[derive(Debug)]
pub enum CompileError {
    Parse(Vec<Located<parser::Error>>),
    Semantic(Vec<type_checker::Error>),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(errors) => {
                write!(f, "Found {} syntax errors:", errors.len())?;
                for error in errors {
                    write!(f, "\n- {error}")?;
                }
                Ok(())
            }
            CompileError::Semantic(errors) => {
                write!(f, "Found {} semantic errors:", errors.len())?;
                for error in errors {
                    write!(f, "\n- {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}
