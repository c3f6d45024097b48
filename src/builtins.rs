// File: src/builtins.rs
//
// Built-in native functions for Brio.
// The table order fixes the indices shared between the compiler
// (`define_builtin`) and the VM (`GET_BUILTIN` dispatch).
// Misuse is reported through script-visible `Value::Error` results.

use crate::value::{Builtin, Value};
use std::rc::Rc;

pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "len", func: len },
    Builtin { name: "first", func: first },
    Builtin { name: "last", func: last },
    Builtin { name: "rest", func: rest },
    Builtin { name: "push", func: push },
    Builtin { name: "puts", func: puts },
    Builtin { name: "type", func: type_of },
];

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!("wrong number of arguments. got={}, want=1", args.len()));
    }
    match &args[0] {
        Value::Str(s) => Value::Int(s.len() as i64),
        Value::Array(elements) => Value::Int(elements.len() as i64),
        Value::Hash(pairs) => Value::Int(pairs.len() as i64),
        other => {
            Value::error(format!("argument to `len` not supported, got {}", other.type_name()))
        }
    }
}

fn first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!("wrong number of arguments. got={}, want=1", args.len()));
    }
    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => {
            Value::error(format!("argument to `first` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!("wrong number of arguments. got={}, want=1", args.len()));
    }
    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => {
            Value::error(format!("argument to `last` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!("wrong number of arguments. got={}, want=1", args.len()));
    }
    match &args[0] {
        Value::Array(elements) => {
            if elements.is_empty() {
                Value::Null
            } else {
                Value::Array(Rc::new(elements[1..].to_vec()))
            }
        }
        other => {
            Value::error(format!("argument to `rest` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return Value::error(format!("wrong number of arguments. got={}, want=2", args.len()));
    }
    match &args[0] {
        Value::Array(elements) => {
            let mut extended = elements.as_ref().clone();
            extended.push(args[1].clone());
            Value::Array(Rc::new(extended))
        }
        other => {
            Value::error(format!("argument to `push` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{}", arg.inspect());
    }
    Value::Null
}

fn type_of(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!("wrong number of arguments. got={}, want=1", args.len()));
    }
    Value::Str(Rc::from(args[0].type_name()))
}
