// File: src/symbol_table.rs
//
// Compile-time name resolution for the Brio compiler.
// One table per function scope plus one global table; resolving a name
// through an enclosing function scope captures it as a free variable.

use ahash::AHashMap;

/// Classification of a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
    Local,
    Builtin,
    Free,
    /// The name a function literal is bound to inside its own body,
    /// before the enclosing `let` installs the real binding.
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: u16,
}

/// A nested scope of name bindings.
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub outer: Option<Box<SymbolTable>>,
    store: AHashMap<String, Symbol>,
    /// Originating symbols captured from enclosing scopes, in capture order.
    /// Index i corresponds to the `Free` symbol with index i in `store`.
    pub free_symbols: Vec<Symbol>,
    pub num_definitions: u16,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn new_enclosed(outer: SymbolTable) -> SymbolTable {
        SymbolTable {
            outer: Some(Box::new(outer)),
            ..SymbolTable::default()
        }
    }

    /// Defines a name in this table. Global scope iff the table has no
    /// outer; a redefinition replaces the previous binding.
    pub fn define(&mut self, name: &str) -> Symbol {
        let scope = if self.outer.is_none() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let symbol = Symbol {
            name: name.to_string(),
            scope,
            index: self.num_definitions,
        };
        self.num_definitions += 1;
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Registers a builtin at a fixed index. Does not consume a local slot.
    pub fn define_builtin(&mut self, index: u16, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Builtin,
            index,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Binds a function literal's own name inside its body so it can refer
    /// to itself. Does not consume a local slot.
    pub fn define_function(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Function,
            index: 0,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Resolves a name, walking outward. A hit in an enclosing function
    /// scope (anything but Global/Builtin) is captured here as Free.
    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.store.get(name) {
            return Some(symbol.clone());
        }
        let outer = self.outer.as_mut()?;
        let symbol = outer.resolve(name)?;
        if symbol.scope == SymbolScope::Global || symbol.scope == SymbolScope::Builtin {
            return Some(symbol);
        }
        Some(self.define_free(symbol))
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        let symbol = Symbol {
            name: original.name.clone(),
            scope: SymbolScope::Free,
            index: self.free_symbols.len() as u16,
        };
        self.free_symbols.push(original);
        self.store.insert(symbol.name.clone(), symbol.clone());
        symbol
    }
}
