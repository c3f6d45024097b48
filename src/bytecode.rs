// File: src/bytecode.rs
//
// Bytecode instruction definitions for the Brio VM.
// Instructions are a packed byte sequence: a one-byte opcode followed by
// 0-2 big-endian operands of fixed widths per opcode.

use crate::value::Value;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A packed instruction stream.
pub type Instructions = Vec<u8>;

/// Output of the compiler, consumed by the VM.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
}

/// Bytecode instruction opcodes for the Brio VM.
/// Numeric values are stable within one build; the disassembly uses the
/// mnemonic names.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// `CONSTANT [u16]` — push constants[idx]
    Constant = 1,
    /// Pop two, add (ints) or concatenate (strings), push result
    Add,
    Sub,
    Mul,
    Div,
    /// Discard the top of the stack
    Pop,
    True,
    False,
    Equal,
    NotEqual,
    GreaterThan,
    /// Integer negation
    Minus,
    /// Logical not
    Bang,
    /// `JUMP_NOT_TRUTHY [u16]` — pop; if not truthy set ip to the operand
    JumpNotTruthy,
    /// `JUMP [u16]` — set ip to the operand
    Jump,
    Null,
    /// `SET_GLOBAL [u16]` — pop into globals[idx]
    SetGlobal,
    /// `GET_GLOBAL [u16]` — push globals[idx]
    GetGlobal,
    /// `ARRAY [u16]` — pop n elements, push an array
    Array,
    /// `HASH [u16]` — pop n values as alternating key/value, push a hash
    Hash,
    /// Pop index and container, push container[index]
    Index,
    /// `CALL [u8]` — call the value sitting below the n arguments
    Call,
    /// Pop return value, pop frame, push return value
    ReturnValue,
    /// Pop frame, push null
    Return,
    /// `SET_LOCAL [u8]` — pop into stack[bp + idx]
    SetLocal,
    /// `GET_LOCAL [u8]` — push stack[bp + idx]
    GetLocal,
    /// `GET_BUILTIN [u8]` — push builtin #idx
    GetBuiltin,
    /// `CLOSURE [u16] [u8]` — pop n free variables, wrap constants[idx]
    Closure,
    /// `GET_FREE [u8]` — push the running closure's free[idx]
    GetFree,
    /// Push the running closure itself (self-reference for recursion)
    CurrentClosure,
}

impl Opcode {
    pub fn from_u8(byte: u8) -> Option<Opcode> {
        use Opcode::*;
        Some(match byte {
            1 => Constant,
            2 => Add,
            3 => Sub,
            4 => Mul,
            5 => Div,
            6 => Pop,
            7 => True,
            8 => False,
            9 => Equal,
            10 => NotEqual,
            11 => GreaterThan,
            12 => Minus,
            13 => Bang,
            14 => JumpNotTruthy,
            15 => Jump,
            16 => Null,
            17 => SetGlobal,
            18 => GetGlobal,
            19 => Array,
            20 => Hash,
            21 => Index,
            22 => Call,
            23 => ReturnValue,
            24 => Return,
            25 => SetLocal,
            26 => GetLocal,
            27 => GetBuiltin,
            28 => Closure,
            29 => GetFree,
            30 => CurrentClosure,
            _ => return None,
        })
    }

    /// Widths in bytes of each operand, in order.
    pub fn operand_widths(self) -> &'static [usize] {
        use Opcode::*;
        match self {
            Constant | JumpNotTruthy | Jump | SetGlobal | GetGlobal | Array | Hash => &[2],
            Call | SetLocal | GetLocal | GetBuiltin | GetFree => &[1],
            Closure => &[2, 1],
            _ => &[],
        }
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Constant => "CONSTANT",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Pop => "POP",
            True => "TRUE",
            False => "FALSE",
            Equal => "EQUAL",
            NotEqual => "NOT_EQUAL",
            GreaterThan => "GREATER_THAN",
            Minus => "MINUS",
            Bang => "BANG",
            JumpNotTruthy => "JUMP_NOT_TRUTHY",
            Jump => "JUMP",
            Null => "NULL",
            SetGlobal => "SET_GLOBAL",
            GetGlobal => "GET_GLOBAL",
            Array => "ARRAY",
            Hash => "HASH",
            Index => "INDEX",
            Call => "CALL",
            ReturnValue => "RETURN_VALUE",
            Return => "RETURN",
            SetLocal => "SET_LOCAL",
            GetLocal => "GET_LOCAL",
            GetBuiltin => "GET_BUILTIN",
            Closure => "CLOSURE",
            GetFree => "GET_FREE",
            CurrentClosure => "CURRENT_CLOSURE",
        }
    }

    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        MNEMONICS.get(name).copied()
    }
}

static MNEMONICS: Lazy<HashMap<&'static str, Opcode>> = Lazy::new(|| {
    (1..=30)
        .filter_map(Opcode::from_u8)
        .map(|op| (op.mnemonic(), op))
        .collect()
});

/// Encodes one instruction. Operand count and widths must match the opcode's
/// definition; the compiler is the only caller and always knows both.
pub fn make(op: Opcode, operands: &[usize]) -> Vec<u8> {
    let widths = op.operand_widths();
    assert_eq!(
        operands.len(),
        widths.len(),
        "wrong operand count for {}",
        op.mnemonic()
    );
    let mut out = Vec::with_capacity(1 + widths.iter().sum::<usize>());
    out.push(op as u8);
    for (operand, width) in operands.iter().zip(widths) {
        match width {
            2 => out.extend_from_slice(&(*operand as u16).to_be_bytes()),
            1 => out.push(*operand as u8),
            _ => unreachable!("unsupported operand width {}", width),
        }
    }
    out
}

/// Decodes the operands following an opcode byte. Returns the operands and
/// the number of bytes consumed.
pub fn read_operands(op: Opcode, ins: &[u8]) -> (Vec<usize>, usize) {
    let mut operands = Vec::with_capacity(op.operand_widths().len());
    let mut offset = 0;
    for width in op.operand_widths() {
        match width {
            2 => {
                operands.push(read_u16(ins, offset));
                offset += 2;
            }
            1 => {
                operands.push(ins[offset] as usize);
                offset += 1;
            }
            _ => unreachable!("unsupported operand width {}", width),
        }
    }
    (operands, offset)
}

pub fn read_u16(bytes: &[u8], offset: usize) -> usize {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]]) as usize
}

/// Renders an instruction stream one instruction per line, formatted
/// `NNNN MNEMONIC [op1 [op2]]` with a zero-padded four-digit byte offset.
pub fn fmt_instructions(ins: &[u8]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < ins.len() {
        let Some(op) = Opcode::from_u8(ins[i]) else {
            out.push_str(&format!("{:04} <invalid opcode {}>\n", i, ins[i]));
            i += 1;
            continue;
        };
        let (operands, read) = read_operands(op, &ins[i + 1..]);
        out.push_str(&format!("{:04} {}", i, op.mnemonic()));
        for operand in &operands {
            out.push_str(&format!(" {}", operand));
        }
        out.push('\n');
        i += 1 + read;
    }
    out
}

/// Re-assembles the output of `fmt_instructions` into bytes. Round-trips
/// byte-identically with the formatter; used by tooling and tests.
pub fn assemble(text: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let Some(_offset) = parts.next() else { continue };
        let mnemonic = parts
            .next()
            .ok_or_else(|| format!("missing mnemonic in line {:?}", line))?;
        let op = Opcode::from_mnemonic(mnemonic)
            .ok_or_else(|| format!("unknown mnemonic {:?}", mnemonic))?;
        let operands = parts
            .map(|p| p.parse::<usize>().map_err(|e| format!("bad operand {:?}: {}", p, e)))
            .collect::<Result<Vec<_>, _>>()?;
        if operands.len() != op.operand_widths().len() {
            return Err(format!("wrong operand count for {} in line {:?}", mnemonic, line));
        }
        out.extend(make(op, &operands));
    }
    Ok(out)
}
