// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Nominal subtyping and least-upper-bound computation.
//!
//! [`TypeLattice`] answers the two questions branch points ask:
//! whether one class conforms to another, and what the nearest common
//! ancestor (join) of two classes is. `SELF_TYPE` is resolved against the
//! class currently being checked before either question is answered, with
//! one precision-preserving exception: the join of `SELF_TYPE` with itself
//! stays `SELF_TYPE`.
//!
//! Both walks assume the class table's one-time cycle validation already
//! ran; chains are guaranteed to terminate at the root.

use std::collections::HashSet;

use crate::identity::{Symbol, WellKnown};
use crate::semantic_analysis::class_table::ClassTable;

/// A type name not known to the class table.
///
/// Recoverable: the caller reports a diagnostic and treats the subtype
/// answer as `false` so the walk continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownType(pub Symbol);

/// Subtype and join queries over a built class table.
#[derive(Debug, Clone, Copy)]
pub struct TypeLattice<'a> {
    table: &'a ClassTable,
    names: &'a WellKnown,
}

impl<'a> TypeLattice<'a> {
    /// Creates a lattice over a validated class table.
    #[must_use]
    pub fn new(table: &'a ClassTable, names: &'a WellKnown) -> Self {
        Self { table, names }
    }

    /// Resolves `SELF_TYPE` to the class currently being checked; any other
    /// name is returned verbatim.
    #[must_use]
    pub fn resolve_self_type(&self, current_class: Symbol, ty: Symbol) -> Symbol {
        if ty == self.names.self_type {
            current_class
        } else {
            ty
        }
    }

    /// Decides whether `child` conforms to `parent`.
    ///
    /// `SELF_TYPE` on either side resolves to `current_class` first. True
    /// iff the resolved names are equal, `parent` is the universal root, or
    /// walking `child`'s parent chain reaches `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownType`] when either side names a class the table does
    /// not know; the caller diagnoses and continues with `false`.
    pub fn is_subtype(
        &self,
        current_class: Symbol,
        child: Symbol,
        parent: Symbol,
    ) -> Result<bool, UnknownType> {
        let child = self.resolve_self_type(current_class, child);
        let parent = self.resolve_self_type(current_class, parent);

        if !self.table.contains(child) {
            return Err(UnknownType(child));
        }
        if !self.table.contains(parent) {
            return Err(UnknownType(parent));
        }

        if child == parent || parent == self.table.root() {
            return Ok(true);
        }
        Ok(self.table.ancestor_chain(child).contains(&parent))
    }

    /// Computes the least common ancestor of `a` and `b`.
    ///
    /// The join of `SELF_TYPE` with itself is `SELF_TYPE`; otherwise both
    /// sides resolve against `current_class` and the result is the first
    /// class on `a`'s ancestor path (the class itself first) that also lies
    /// on `b`'s. Invalid input joins to the universal root — the subtype
    /// validation path has already diagnosed it.
    #[must_use]
    pub fn join(&self, current_class: Symbol, a: Symbol, b: Symbol) -> Symbol {
        if a == self.names.self_type && b == self.names.self_type {
            return self.names.self_type;
        }

        let a = self.resolve_self_type(current_class, a);
        let b = self.resolve_self_type(current_class, b);
        if !self.table.contains(a) || !self.table.contains(b) {
            return self.table.root();
        }

        let b_path: HashSet<Symbol> = self.self_and_ancestors(b).into_iter().collect();
        self.self_and_ancestors(a)
            .into_iter()
            .find(|class| b_path.contains(class))
            .unwrap_or_else(|| self.table.root())
    }

    /// The full path from a class to the root, the class itself first.
    fn self_and_ancestors(&self, class: Symbol) -> Vec<Symbol> {
        let mut path = vec![class];
        path.extend(self.table.ancestor_chain(class));
        path
    }
}
