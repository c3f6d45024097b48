// File: src/ast.rs
//
// AST node definitions for the Brio programming language.
// The Display impls pretty-print nodes back to source form; the compiler
// uses that rendering to sort hash-literal keys deterministically.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: String, value: Expr },
    Return(Expr),
    ExprStmt(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Int(i64),
    Str(String),
    Bool(bool),
    Prefix {
        op: String,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    While {
        condition: Box<Expr>,
        body: BlockStatement,
    },
    Function {
        /// Set by `let name = fn(...)` so the body can refer to itself.
        name: Option<String>,
        parameters: Vec<String>,
        body: BlockStatement,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Array(Vec<Expr>),
    HashLit(Vec<(Expr, Expr)>),
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name, value),
            Stmt::Return(value) => write!(f, "return {};", value),
            Stmt::ExprStmt(expr) => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Int(value) => write!(f, "{}", value),
            Expr::Str(value) => write!(f, "{}", value),
            Expr::Bool(value) => write!(f, "{}", value),
            Expr::Prefix { op, right } => write!(f, "({}{})", op, right),
            Expr::Infix { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::If { condition, consequence, alternative } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else {}", alt)?;
                }
                Ok(())
            }
            Expr::While { condition, body } => write!(f, "while{} {}", condition, body),
            Expr::Function { name, parameters, body } => {
                write!(f, "fn")?;
                if let Some(name) = name {
                    write!(f, "<{}>", name)?;
                }
                write!(f, "({}) {}", parameters.join(", "), body)
            }
            Expr::Call { function, arguments } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expr::Array(elements) => {
                let parts: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Expr::HashLit(pairs) => {
                let parts: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Expr::Index { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}
