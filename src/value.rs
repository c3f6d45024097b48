// File: src/value.rs
//
// Runtime value model for the Brio VM.
// One sum type is shared by compile-time constants and runtime values.
// Scalars are held by value; composites share ownership through Rc.

use crate::bytecode::Instructions;
use ahash::AHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Signature of a native built-in function. Builtins receive their arguments
/// as a slice and always produce a value; misuse is reported through the
/// script-visible `Value::Error` kind rather than a VM abort.
pub type BuiltinFn = fn(&[Value]) -> Value;

/// A named built-in function. Equality is identity: two builtins are equal
/// when they point at the same native function.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize
    }
}

/// A function compiled to bytecode: its instruction stream plus the slot
/// counts the VM needs to set up a call frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub instructions: Instructions,
    pub num_locals: usize,
    pub num_args: usize,
}

/// A compiled function paired with a snapshot of its captured free
/// variables. Built at runtime by the `CLOSURE` opcode.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub func: Rc<CompiledFunction>,
    pub free: Vec<Value>,
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Null,
    Str(Rc<str>),
    Array(Rc<Vec<Value>>),
    Hash(Rc<AHashMap<HashKey, Value>>),
    Function(Rc<CompiledFunction>),
    Closure(Rc<Closure>),
    Builtin(Builtin),
    /// Transient wrapper used while a return value unwinds; never stored.
    ReturnValue(Box<Value>),
    /// A script-visible error. Flows through the stack like any other value.
    Error(Rc<str>),
}

impl Value {
    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(Rc::from(message.into()))
    }

    /// `null` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INTEGER",
            Value::Bool(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Str(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "COMPILED_FUNCTION",
            Value::Closure(_) => "CLOSURE",
            Value::Builtin(_) => "BUILTIN",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    /// Human-readable rendering, used by the REPL and by `puts`.
    /// Arrays render their elements in insertion order; hashes in their
    /// map's iteration order, which is stable within one VM run.
    pub fn inspect(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Str(s) => s.to_string(),
            Value::Array(elements) => {
                let parts: Vec<String> = elements.iter().map(Value::inspect).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Hash(pairs) => {
                let parts: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}: {}", k, v.inspect())).collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Function(func) => {
                format!("compiled function {:p}", Rc::as_ptr(func))
            }
            Value::Closure(closure) => format!("closure[{:p}]", Rc::as_ptr(closure)),
            Value::Builtin(_) => "builtin function".to_string(),
            Value::ReturnValue(inner) => inner.inspect(),
            Value::Error(message) => message.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Null, Value::Null) => true,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Array(l), Value::Array(r)) => l == r,
            (Value::Hash(l), Value::Hash(r)) => l == r,
            // Functions and closures compare by identity: byte-identical
            // code, and for closures pairwise-equal captures.
            (Value::Function(l), Value::Function(r)) => l == r,
            (Value::Closure(l), Value::Closure(r)) => l == r,
            (Value::Builtin(l), Value::Builtin(r)) => l == r,
            (Value::ReturnValue(l), Value::ReturnValue(r)) => l == r,
            (Value::Error(l), Value::Error(r)) => l == r,
            _ => false,
        }
    }
}

/// The hashable subset of `Value`, usable as a hash-literal key.
/// `Int`, `Bool`, and `Str` are hashable; everything else is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashKey {
    Int(i64),
    Bool(bool),
    Str(Rc<str>),
}

impl HashKey {
    /// Classifies a value as a hash key, or reports it unhashable.
    pub fn from_value(value: &Value) -> Option<HashKey> {
        match value {
            Value::Int(i) => Some(HashKey::Int(*i)),
            Value::Bool(b) => Some(HashKey::Bool(*b)),
            Value::Str(s) => Some(HashKey::Str(s.clone())),
            _ => None,
        }
    }

    /// Stable-within-a-run hash code: integers hash to themselves, booleans
    /// to two fixed values, strings through djb2.
    pub fn hash_code(&self) -> u64 {
        match self {
            HashKey::Int(i) => *i as u64,
            HashKey::Bool(false) => 1237,
            HashKey::Bool(true) => 1231,
            HashKey::Str(s) => djb2(s.as_bytes()),
        }
    }
}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKey::Int(i) => write!(f, "{}", i),
            HashKey::Bool(b) => write!(f, "{}", b),
            HashKey::Str(s) => write!(f, "{}", s),
        }
    }
}

fn djb2(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 5381;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b as u64);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_keys_with_equal_content_share_hash_codes() {
        let a = HashKey::Str(Rc::from("hello"));
        let b = HashKey::Str(Rc::from("hello"));
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());

        assert_ne!(HashKey::Bool(true).hash_code(), HashKey::Bool(false).hash_code());
    }

    #[test]
    fn composite_inspect_recurses() {
        let arr = Value::Array(Rc::new(vec![Value::Int(1), Value::Str(Rc::from("x"))]));
        assert_eq!(arr.inspect(), "[1, x]");
        assert_eq!(Value::Null.inspect(), "null");
    }
}
