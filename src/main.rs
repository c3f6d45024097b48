// File: src/main.rs
//
// Main entry point for the Brio interpreter.
// With no arguments, starts the interactive REPL; with a file path,
// compiles and runs the file and prints the resulting value.

mod ast;
mod builtins;
mod bytecode;
mod compiler;
mod errors;
mod lexer;
mod parser;
mod repl;
mod symbol_table;
mod value;
mod vm;

use clap::Parser as ClapParser;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(
    name = "brio",
    about = "Brio: a small, expression-oriented scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Path to a script file; omit to start the REPL
    file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match cli.file {
        Some(file) => run_file(&file),
        None => match repl::Repl::new() {
            Ok(mut repl) => {
                if let Err(e) = repl.run() {
                    eprintln!("REPL error: {}", e);
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Failed to start REPL: {}", e);
                process::exit(1);
            }
        },
    }
}

fn run_file(file: &PathBuf) {
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read {}: {}", file.display(), e);
            process::exit(1);
        }
    };

    let tokens = lexer::tokenize(&source);
    let mut parser = parser::Parser::new(tokens);
    let program = parser.parse_program();
    if !parser.errors.is_empty() {
        eprintln!("parser errors:");
        for error in &parser.errors {
            eprintln!("\t{}", error);
        }
        process::exit(1);
    }

    let mut compiler = compiler::Compiler::new();
    if let Err(e) = compiler.compile(&program) {
        eprintln!("{}", e);
        process::exit(1);
    }

    let mut vm = vm::VM::new(compiler.bytecode());
    if let Err(e) = vm.run() {
        eprintln!("{}", e);
        process::exit(1);
    }

    println!("{}", vm.last_popped().inspect());
}
