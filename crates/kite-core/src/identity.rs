// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Identifier interning for Kite.
//!
//! Every name the checker touches — class names, method names, attribute and
//! variable names, the `SELF_TYPE` marker — is an interned [`Symbol`].
//! Symbols are cheap to copy and compare; the semantic analyser never
//! compares strings. The parser interns as it reads source text and hands
//! the resulting handles to this crate.

use rustc_hash::FxHashMap;

/// An interned identifier handle.
///
/// Equality is handle equality: two symbols compare equal iff they were
/// interned from the same string in the same [`Interner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl Symbol {
    fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Interns strings to unique [`Symbol`] handles.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    map: FxHashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning the existing handle if it was seen before.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }
        let sym = Symbol::new(u32::try_from(self.strings.len()).unwrap_or(u32::MAX));
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), sym);
        sym
    }

    /// Resolves a symbol back to its string.
    #[must_use]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index() as usize]
    }

    /// Looks up a string without interning it.
    #[must_use]
    pub fn lookup(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    /// Returns the number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Pre-interned symbols for the names the checker treats specially.
///
/// The built-in class names, the `SELF_TYPE` marker, the `self` identifier,
/// and the selector/argument names of the built-in class interfaces are
/// interned once up front so the checker can compare handles directly.
#[derive(Debug, Clone)]
pub struct WellKnown {
    pub object: Symbol,
    pub io: Symbol,
    pub int: Symbol,
    pub string: Symbol,
    pub bool_: Symbol,
    pub self_type: Symbol,
    pub self_: Symbol,
    pub main_class: Symbol,
    pub main_method: Symbol,
    // Built-in class interface names.
    pub abort: Symbol,
    pub type_name: Symbol,
    pub copy: Symbol,
    pub out_string: Symbol,
    pub out_int: Symbol,
    pub in_string: Symbol,
    pub in_int: Symbol,
    pub length: Symbol,
    pub concat: Symbol,
    pub substr: Symbol,
    pub arg: Symbol,
    pub arg2: Symbol,
}

impl WellKnown {
    /// Seeds an interner with the reserved names and returns their handles.
    pub fn seed(interner: &mut Interner) -> Self {
        Self {
            object: interner.intern("Object"),
            io: interner.intern("IO"),
            int: interner.intern("Int"),
            string: interner.intern("String"),
            bool_: interner.intern("Bool"),
            self_type: interner.intern("SELF_TYPE"),
            self_: interner.intern("self"),
            main_class: interner.intern("Main"),
            main_method: interner.intern("main"),
            abort: interner.intern("abort"),
            type_name: interner.intern("type_name"),
            copy: interner.intern("copy"),
            out_string: interner.intern("out_string"),
            out_int: interner.intern("out_int"),
            in_string: interner.intern("in_string"),
            in_int: interner.intern("in_int"),
            length: interner.intern("length"),
            concat: interner.intern("concat"),
            substr: interner.intern("substr"),
            arg: interner.intern("arg"),
            arg2: interner.intern("arg2"),
        }
    }

    /// Returns true if `name` is a class name users may not redefine.
    #[must_use]
    pub fn is_reserved_class(&self, name: Symbol) -> bool {
        name == self.object
            || name == self.io
            || name == self.int
            || name == self.string
            || name == self.bool_
            || name == self.self_type
    }

    /// Returns true if `name` may not appear as a parent in an
    /// `inherits` clause.
    #[must_use]
    pub fn is_uninheritable(&self, name: Symbol) -> bool {
        name == self.self_type || name == self.int || name == self.string || name == self.bool_
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_symbol_for_same_string() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        let c = interner.intern("world");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("Counter");
        assert_eq!(interner.resolve(sym), "Counter");
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut interner = Interner::new();
        assert!(interner.lookup("x").is_none());
        let sym = interner.intern("x");
        assert_eq!(interner.lookup("x"), Some(sym));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn well_known_reserved_classes() {
        let mut interner = Interner::new();
        let wk = WellKnown::seed(&mut interner);
        let user = interner.intern("Counter");

        assert!(wk.is_reserved_class(wk.object));
        assert!(wk.is_reserved_class(wk.self_type));
        assert!(!wk.is_reserved_class(user));
    }

    #[test]
    fn well_known_uninheritable_parents() {
        let mut interner = Interner::new();
        let wk = WellKnown::seed(&mut interner);

        assert!(wk.is_uninheritable(wk.int));
        assert!(wk.is_uninheritable(wk.self_type));
        assert!(!wk.is_uninheritable(wk.object));
        assert!(!wk.is_uninheritable(wk.io));
    }
}
