// File: src/repl.rs
//
// Interactive REPL for the Brio programming language.
// Successive inputs share one symbol table, constants pool, and globals
// array, so bindings persist across lines. A trailing backslash continues
// the input on the next line; `quit` exits.

use crate::compiler::Compiler;
use crate::lexer;
use crate::parser::Parser;
use crate::symbol_table::SymbolTable;
use crate::value::Value;
use crate::vm::{GLOBALS_SIZE, VM};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::mem;

const PROMPT: &str = ">> ";
const CONTINUATION_PROMPT: &str = "    ";

pub struct Repl {
    editor: DefaultEditor,
    symbol_table: SymbolTable,
    constants: Vec<Value>,
    globals: Vec<Value>,
}

impl Repl {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Repl {
            editor: DefaultEditor::new()?,
            symbol_table: Compiler::base_symbol_table(),
            constants: Vec::new(),
            globals: vec![Value::Null; GLOBALS_SIZE],
        })
    }

    fn show_banner(&self) {
        println!("{}", "Brio — an expression-oriented scripting language".bright_cyan());
        println!(
            "  {} end a line with {} to continue it; type {} to exit",
            "Tip:".bright_magenta(),
            "\\".bright_yellow(),
            "quit".bright_yellow()
        );
        println!();
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() { PROMPT } else { CONTINUATION_PROMPT };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    if buffer.is_empty() && line.trim() == "quit" {
                        break;
                    }
                    let _ = self.editor.add_history_entry(line.as_str());

                    // A trailing backslash requests continuation.
                    if let Some(stripped) = line.strip_suffix('\\') {
                        buffer.push_str(stripped);
                        buffer.push('\n');
                        continue;
                    }
                    buffer.push_str(&line);

                    let source = mem::take(&mut buffer);
                    if !source.trim().is_empty() {
                        self.eval_input(&source);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn eval_input(&mut self, source: &str) {
        let tokens = lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        let program = parser.parse_program();
        if !parser.errors.is_empty() {
            println!("{}", "parser errors:".bright_red());
            for error in &parser.errors {
                println!("\t{}", error);
            }
            return;
        }

        let mut compiler = Compiler::new_with_state(
            mem::take(&mut self.symbol_table),
            mem::take(&mut self.constants),
        );
        let compiled = compiler.compile(&program);
        let bytecode = compiler.bytecode();
        let (symbol_table, constants) = compiler.into_state();
        self.symbol_table = symbol_table;
        self.constants = constants;
        if let Err(error) = compiled {
            println!("{}", error);
            return;
        }

        let mut vm = VM::new_with_globals(bytecode, mem::take(&mut self.globals));
        let outcome = vm.run();
        match outcome {
            Ok(()) => println!("{}", vm.last_popped().inspect()),
            Err(error) => println!("{}", error),
        }
        self.globals = vm.into_globals();
    }
}
