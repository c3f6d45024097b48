// File: src/errors.rs
//
// Error types for the Brio compile and execution pipeline.
// Compile errors abort compilation; VM errors terminate the run loop and
// are returned to the driver. Script-visible errors are `Value::Error`
// instead and flow through the stack (see src/value.rs).

use colored::Colorize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    UnknownOperator,
    UndefinedVariable,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileErrorKind::UnknownOperator => write!(f, "Unknown Operator"),
            CompileErrorKind::UndefinedVariable => write!(f, "Undefined Variable"),
        }
    }
}

/// A compile-time error naming the offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub message: String,
}

impl CompileError {
    pub fn unknown_operator(op: &str) -> Self {
        CompileError {
            kind: CompileErrorKind::UnknownOperator,
            message: format!("unknown operator {}", op),
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        CompileError {
            kind: CompileErrorKind::UndefinedVariable,
            message: format!("undefined variable: {}", name),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.to_string().red().bold(), self.message)
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmErrorKind {
    UnsupportedOperand,
    UnsupportedOperator,
    NonFunction,
    WrongArgumentCount,
    StackOverflow,
}

impl fmt::Display for VmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmErrorKind::UnsupportedOperand => write!(f, "Unsupported Operand"),
            VmErrorKind::UnsupportedOperator => write!(f, "Unsupported Operator"),
            VmErrorKind::NonFunction => write!(f, "Not A Function"),
            VmErrorKind::WrongArgumentCount => write!(f, "Wrong Argument Count"),
            VmErrorKind::StackOverflow => write!(f, "Stack Overflow"),
        }
    }
}

/// A fatal VM error. These terminate `run()` immediately, unlike the
/// script-visible `Value::Error` kind.
#[derive(Debug, Clone, PartialEq)]
pub struct VmError {
    pub kind: VmErrorKind,
    pub message: String,
}

impl VmError {
    pub fn new(kind: VmErrorKind, message: impl Into<String>) -> Self {
        VmError { kind, message: message.into() }
    }

    pub fn stack_overflow() -> Self {
        VmError::new(VmErrorKind::StackOverflow, "stack overflow")
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.to_string().red().bold(), self.message)
    }
}

impl std::error::Error for VmError {}
