// File: src/compiler.rs
//
// Bytecode compiler for the Brio programming language.
// Single pass over the AST, emitting packed instructions into a stack of
// compilation scopes (one per function body under compilation) and
// resolving names through nested symbol tables.

use crate::ast::{BlockStatement, Expr, Program, Stmt};
use crate::builtins::BUILTINS;
use crate::bytecode::{self, Bytecode, Instructions, Opcode};
use crate::errors::CompileError;
use crate::symbol_table::{Symbol, SymbolScope, SymbolTable};
use crate::value::{CompiledFunction, Value};
use std::mem;
use std::rc::Rc;

/// Placeholder operand for jumps that are back-patched once the target
/// offset is known.
const PLACEHOLDER_JUMP: usize = 9999;

#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

/// One in-progress instruction buffer. The last two emitted instructions
/// are tracked for peephole rewrites (dropping or replacing a trailing POP).
#[derive(Debug, Default)]
struct CompilationScope {
    instructions: Instructions,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

pub struct Compiler {
    constants: Vec<Value>,
    symbol_table: SymbolTable,
    scopes: Vec<CompilationScope>,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            constants: Vec::new(),
            symbol_table: Self::base_symbol_table(),
            scopes: vec![CompilationScope::default()],
        }
    }

    /// Continues compilation against state accumulated by earlier inputs,
    /// so successive REPL lines share global bindings and constants.
    pub fn new_with_state(symbol_table: SymbolTable, constants: Vec<Value>) -> Self {
        Compiler {
            constants,
            symbol_table,
            scopes: vec![CompilationScope::default()],
        }
    }

    /// A fresh global symbol table with every builtin registered at its
    /// fixed index.
    pub fn base_symbol_table() -> SymbolTable {
        let mut table = SymbolTable::new();
        for (index, builtin) in BUILTINS.iter().enumerate() {
            table.define_builtin(index as u16, builtin.name);
        }
        table
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for stmt in &program.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.scopes[0].instructions.clone(),
            constants: self.constants.clone(),
        }
    }

    /// Hands back the symbol table and constants pool for the next
    /// `new_with_state` round. A compile error can abandon enclosed scopes;
    /// only the root table survives.
    pub fn into_state(self) -> (SymbolTable, Vec<Value>) {
        let mut table = self.symbol_table;
        while let Some(outer) = table.outer.take() {
            table = *outer;
        }
        (table, self.constants)
    }

    fn compile_statement(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Let { name, value } => {
                // Defined before the value compiles so a named function
                // literal can resolve its own binding.
                let symbol = self.symbol_table.define(name);
                self.compile_expression(value)?;
                match symbol.scope {
                    SymbolScope::Global => {
                        self.emit(Opcode::SetGlobal, &[symbol.index as usize]);
                    }
                    _ => {
                        self.emit(Opcode::SetLocal, &[symbol.index as usize]);
                    }
                }
                Ok(())
            }
            Stmt::Return(value) => {
                self.compile_expression(value)?;
                self.emit(Opcode::ReturnValue, &[]);
                Ok(())
            }
            Stmt::ExprStmt(expr) => {
                self.compile_expression(expr)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
        }
    }

    fn compile_block(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Int(value) => {
                let idx = self.add_constant(Value::Int(*value));
                self.emit(Opcode::Constant, &[idx]);
                Ok(())
            }
            Expr::Str(value) => {
                let idx = self.add_constant(Value::Str(Rc::from(value.as_str())));
                self.emit(Opcode::Constant, &[idx]);
                Ok(())
            }
            Expr::Bool(value) => {
                if *value {
                    self.emit(Opcode::True, &[]);
                } else {
                    self.emit(Opcode::False, &[]);
                }
                Ok(())
            }
            Expr::Ident(name) => {
                let symbol = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| CompileError::undefined_variable(name))?;
                self.load_symbol(&symbol);
                Ok(())
            }
            Expr::Prefix { op, right } => {
                self.compile_expression(right)?;
                match op.as_str() {
                    "-" => self.emit(Opcode::Minus, &[]),
                    "!" => self.emit(Opcode::Bang, &[]),
                    _ => return Err(CompileError::unknown_operator(op)),
                };
                Ok(())
            }
            Expr::Infix { left, op, right } => {
                // No LESS_THAN opcode exists: `a < b` compiles its operands
                // in reverse order and reuses GREATER_THAN.
                if op == "<" {
                    self.compile_expression(right)?;
                    self.compile_expression(left)?;
                    self.emit(Opcode::GreaterThan, &[]);
                    return Ok(());
                }
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                match op.as_str() {
                    "+" => self.emit(Opcode::Add, &[]),
                    "-" => self.emit(Opcode::Sub, &[]),
                    "*" => self.emit(Opcode::Mul, &[]),
                    "/" => self.emit(Opcode::Div, &[]),
                    ">" => self.emit(Opcode::GreaterThan, &[]),
                    "==" => self.emit(Opcode::Equal, &[]),
                    "!=" => self.emit(Opcode::NotEqual, &[]),
                    _ => return Err(CompileError::unknown_operator(op)),
                };
                Ok(())
            }
            Expr::If { condition, consequence, alternative } => {
                self.compile_expression(condition)?;
                let jump_not_truthy = self.emit(Opcode::JumpNotTruthy, &[PLACEHOLDER_JUMP]);
                self.compile_block(consequence)?;
                // An if is an expression; the branch value stays on the stack.
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_instruction();
                }
                let jump = self.emit(Opcode::Jump, &[PLACEHOLDER_JUMP]);
                let after_consequence = self.current_instructions().len();
                self.change_operand(jump_not_truthy, after_consequence);
                match alternative {
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                    Some(alt) => {
                        self.compile_block(alt)?;
                        if self.last_instruction_is(Opcode::Pop) {
                            self.remove_last_instruction();
                        }
                    }
                }
                let after_alternative = self.current_instructions().len();
                self.change_operand(jump, after_alternative);
                Ok(())
            }
            Expr::While { condition, body } => {
                let loop_start = self.current_instructions().len();
                self.compile_expression(condition)?;
                let jump_not_truthy = self.emit(Opcode::JumpNotTruthy, &[PLACEHOLDER_JUMP]);
                self.compile_block(body)?;
                self.emit(Opcode::Jump, &[loop_start]);
                let after_body = self.current_instructions().len();
                self.change_operand(jump_not_truthy, after_body);
                // The loop itself evaluates to null.
                self.emit(Opcode::Null, &[]);
                Ok(())
            }
            Expr::Array(elements) => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit(Opcode::Array, &[elements.len()]);
                Ok(())
            }
            Expr::HashLit(pairs) => {
                // Keys sort by their source rendering so the emitted
                // instruction sequence is deterministic.
                let mut sorted: Vec<&(Expr, Expr)> = pairs.iter().collect();
                sorted.sort_by_cached_key(|(key, _)| key.to_string());
                for (key, value) in sorted {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(Opcode::Hash, &[pairs.len() * 2]);
                Ok(())
            }
            Expr::Index { left, index } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(Opcode::Index, &[]);
                Ok(())
            }
            Expr::Function { name, parameters, body } => {
                self.enter_scope();
                if let Some(name) = name {
                    self.symbol_table.define_function(name);
                }
                for parameter in parameters {
                    self.symbol_table.define(parameter);
                }
                self.compile_block(body)?;
                // The body's final expression is its return value.
                if self.last_instruction_is(Opcode::Pop) {
                    self.replace_last_pop_with_return();
                }
                if !self.last_instruction_is(Opcode::ReturnValue) {
                    self.emit(Opcode::Return, &[]);
                }
                let free_symbols = self.symbol_table.free_symbols.clone();
                let num_locals = self.symbol_table.num_definitions as usize;
                let instructions = self.leave_scope();
                // Load captures in order; CLOSURE pops them into free slots.
                for symbol in &free_symbols {
                    self.load_symbol(symbol);
                }
                let func = CompiledFunction {
                    instructions,
                    num_locals,
                    num_args: parameters.len(),
                };
                let idx = self.add_constant(Value::Function(Rc::new(func)));
                self.emit(Opcode::Closure, &[idx, free_symbols.len()]);
                Ok(())
            }
            Expr::Call { function, arguments } => {
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                self.emit(Opcode::Call, &[arguments.len()]);
                Ok(())
            }
        }
    }

    fn load_symbol(&mut self, symbol: &Symbol) {
        let index = symbol.index as usize;
        match symbol.scope {
            SymbolScope::Global => self.emit(Opcode::GetGlobal, &[index]),
            SymbolScope::Local => self.emit(Opcode::GetLocal, &[index]),
            SymbolScope::Builtin => self.emit(Opcode::GetBuiltin, &[index]),
            SymbolScope::Free => self.emit(Opcode::GetFree, &[index]),
            SymbolScope::Function => self.emit(Opcode::CurrentClosure, &[]),
        };
    }

    /// Appends a value to the constants pool and returns its index.
    /// The pool is append-only; indices never shift.
    fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let instruction = bytecode::make(op, operands);
        let scope = self.current_scope_mut();
        let position = scope.instructions.len();
        scope.instructions.extend(instruction);
        scope.previous_instruction = scope.last_instruction;
        scope.last_instruction = Some(EmittedInstruction { opcode: op, position });
        position
    }

    fn current_scope_mut(&mut self) -> &mut CompilationScope {
        self.scopes.last_mut().expect("compiler always has an open scope")
    }

    fn current_scope(&self) -> &CompilationScope {
        self.scopes.last().expect("compiler always has an open scope")
    }

    fn current_instructions(&self) -> &Instructions {
        &self.current_scope().instructions
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        match self.current_scope().last_instruction {
            Some(last) => last.opcode == op,
            None => false,
        }
    }

    /// Rolls the buffer back to before the last emitted instruction.
    fn remove_last_instruction(&mut self) {
        let scope = self.current_scope_mut();
        if let Some(last) = scope.last_instruction {
            scope.instructions.truncate(last.position);
            scope.last_instruction = scope.previous_instruction.take();
        }
    }

    /// Overwrites bytes in place; the replacement must be the same width.
    fn replace_instruction(&mut self, position: usize, new_instruction: &[u8]) {
        let scope = self.current_scope_mut();
        scope.instructions[position..position + new_instruction.len()]
            .copy_from_slice(new_instruction);
    }

    /// Re-encodes the instruction at `position` with a new operand.
    fn change_operand(&mut self, position: usize, operand: usize) {
        let op = Opcode::from_u8(self.current_instructions()[position])
            .expect("change_operand on a known instruction");
        let new_instruction = bytecode::make(op, &[operand]);
        self.replace_instruction(position, &new_instruction);
    }

    /// Rewrites a trailing POP into RETURN_VALUE (same one-byte width).
    fn replace_last_pop_with_return(&mut self) {
        let position = self
            .current_scope()
            .last_instruction
            .expect("a trailing POP was just observed")
            .position;
        let new_instruction = bytecode::make(Opcode::ReturnValue, &[]);
        self.replace_instruction(position, &new_instruction);
        if let Some(last) = &mut self.current_scope_mut().last_instruction {
            last.opcode = Opcode::ReturnValue;
        }
    }

    /// Opens a fresh compilation scope with an enclosed symbol table.
    /// Every `enter_scope` is matched by exactly one `leave_scope`.
    pub fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::default());
        let outer = mem::take(&mut self.symbol_table);
        self.symbol_table = SymbolTable::new_enclosed(outer);
    }

    /// Pops the top compilation scope and restores the enclosing symbol
    /// table, yielding the closed scope's instructions.
    pub fn leave_scope(&mut self) -> Instructions {
        let scope = self.scopes.pop().expect("leave_scope matches an enter_scope");
        let inner = mem::take(&mut self.symbol_table);
        self.symbol_table = match inner.outer {
            Some(outer) => *outer,
            None => SymbolTable::new(),
        };
        scope.instructions
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
