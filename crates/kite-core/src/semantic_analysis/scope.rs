// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scope tracking for type annotation.
//!
//! One [`TypeScope`] instance serves every kind of value binding the
//! checker introduces, organized as a stack of frames:
//! - Class (the `self` binding and all attributes, inherited ones included)
//! - Method (formal parameters)
//! - Let / case branch (one binding each, arbitrarily nested)
//!
//! Lookup searches innermost-to-outermost, so a nested binding shadows an
//! outer one without destroying it. `bind` never rejects a redeclaration —
//! duplicate policies (e.g. two attributes of the same name in one class)
//! are the checker's responsibility.

use std::collections::HashMap;

use crate::identity::Symbol;

/// The kind of binding in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// The `self` identifier, bound on class entry.
    SelfRef,
    /// A class attribute (own or inherited).
    Attribute,
    /// A method formal parameter.
    Formal,
    /// A let-bound identifier.
    Let,
    /// A case-branch identifier.
    CaseBranch,
}

/// A name-to-declared-type binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The bound name.
    pub name: Symbol,
    /// The declared type of the binding (possibly `SELF_TYPE`).
    pub declared_type: Symbol,
    /// Line of the introducing declaration.
    pub line: u32,
    /// What introduced the binding.
    pub kind: BindingKind,
}

#[derive(Debug, Clone, Default)]
struct ScopeLevel {
    bindings: HashMap<Symbol, Binding>,
}

/// Tracks value bindings across nested scopes.
#[derive(Debug, Clone)]
pub struct TypeScope {
    levels: Vec<ScopeLevel>,
}

impl TypeScope {
    /// Creates a scope tracker with a single outermost frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: vec![ScopeLevel::default()],
        }
    }

    /// Enters a new nested scope frame.
    pub fn push(&mut self) {
        self.levels.push(ScopeLevel::default());
    }

    /// Exits the current frame, destroying its bindings.
    ///
    /// Returns `true` if a frame was popped. Popping the outermost frame is
    /// a no-op returning `false`; this method never panics.
    pub fn pop(&mut self) -> bool {
        if self.levels.len() > 1 {
            self.levels.pop();
            true
        } else {
            false
        }
    }

    /// Binds a name in the innermost frame, overwriting any existing binding
    /// for the same name in that frame.
    pub fn bind(&mut self, name: Symbol, declared_type: Symbol, line: u32, kind: BindingKind) {
        let binding = Binding {
            name,
            declared_type,
            line,
            kind,
        };
        // INVARIANT: levels always contains at least the outermost frame.
        if let Some(level) = self.levels.last_mut() {
            level.bindings.insert(name, binding);
        }
    }

    /// Looks up a name, searching innermost-to-outermost.
    ///
    /// The first match wins — this is the shadowing rule.
    #[must_use]
    pub fn lookup(&self, name: Symbol) -> Option<&Binding> {
        self.levels
            .iter()
            .rev()
            .find_map(|level| level.bindings.get(&name))
    }

    /// Looks up a name in the innermost frame only.
    #[must_use]
    pub fn lookup_local(&self, name: Symbol) -> Option<&Binding> {
        self.levels.last().and_then(|level| level.bindings.get(&name))
    }

    /// The current nesting depth (0 = outermost frame).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}

impl Default for TypeScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Interner;

    fn symbols() -> (Symbol, Symbol, Symbol) {
        let mut interner = Interner::new();
        (
            interner.intern("x"),
            interner.intern("Int"),
            interner.intern("String"),
        )
    }

    #[test]
    fn bind_and_lookup_in_one_frame() {
        let (x, int, _) = symbols();
        let mut scope = TypeScope::new();
        scope.bind(x, int, 1, BindingKind::Let);

        let binding = scope.lookup(x).unwrap();
        assert_eq!(binding.declared_type, int);
        assert_eq!(binding.kind, BindingKind::Let);
    }

    #[test]
    fn inner_binding_shadows_then_exit_restores() {
        let (x, int, string) = symbols();
        let mut scope = TypeScope::new();
        scope.bind(x, int, 1, BindingKind::Attribute);

        scope.push();
        scope.bind(x, string, 5, BindingKind::Let);
        assert_eq!(scope.lookup(x).unwrap().declared_type, string);

        assert!(scope.pop());
        assert_eq!(scope.lookup(x).unwrap().declared_type, int);
    }

    #[test]
    fn binding_invisible_after_its_frame_exits() {
        let (x, int, _) = symbols();
        let mut scope = TypeScope::new();

        scope.push();
        scope.bind(x, int, 3, BindingKind::Let);
        assert!(scope.lookup(x).is_some());

        scope.pop();
        assert!(scope.lookup(x).is_none());
    }

    #[test]
    fn pop_at_outermost_frame_is_a_noop() {
        let mut scope = TypeScope::new();
        assert_eq!(scope.depth(), 0);
        assert!(!scope.pop());
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn lookup_local_ignores_outer_frames() {
        let (x, int, string) = symbols();
        let mut scope = TypeScope::new();
        scope.bind(x, int, 1, BindingKind::Attribute);

        scope.push();
        assert!(scope.lookup_local(x).is_none());
        assert!(scope.lookup(x).is_some());

        scope.bind(x, string, 2, BindingKind::Let);
        assert_eq!(scope.lookup_local(x).unwrap().declared_type, string);
    }

    #[test]
    fn rebinding_in_same_frame_overwrites() {
        let (x, int, string) = symbols();
        let mut scope = TypeScope::new();
        scope.bind(x, int, 1, BindingKind::Attribute);
        scope.bind(x, string, 4, BindingKind::Attribute);

        let binding = scope.lookup(x).unwrap();
        assert_eq!(binding.declared_type, string);
        assert_eq!(binding.line, 4);
    }
}
