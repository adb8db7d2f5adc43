// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for Kite semantic analysis.
//!
//! These tests verify the algebraic laws the rest of the pass leans on:
//!
//! 1. **Acyclic hierarchies always build** — any parent assignment drawn
//!    from earlier classes (or a built-in) produces a valid table
//! 2. **Join is symmetric and idempotent** over arbitrary hierarchies
//! 3. **Join is an upper bound** — both inputs conform to the join
//! 4. **Everything conforms to the root**, and the root only to itself
//! 5. **Scope behaves like its reference model** under arbitrary
//!    push/pop/bind sequences

use proptest::prelude::*;
use std::collections::HashMap;

use crate::ast::ClassDecl;
use crate::identity::{Interner, Symbol, WellKnown};
use crate::semantic_analysis::ClassTable;
use crate::semantic_analysis::scope::{BindingKind, TypeScope};
use crate::semantic_analysis::subtype::TypeLattice;

// ============================================================================
// Generators
// ============================================================================

/// Builds an arbitrary acyclic hierarchy: class `Ci`'s parent is drawn from
/// the built-ins or any earlier `Cj`, so cycles cannot occur.
fn build_hierarchy(parent_picks: &[usize]) -> (Interner, WellKnown, ClassTable, Vec<Symbol>) {
    let mut interner = Interner::new();
    let names = WellKnown::seed(&mut interner);
    let classes: Vec<Symbol> = (0..parent_picks.len())
        .map(|i| interner.intern(&format!("C{i}")))
        .collect();

    let decls: Vec<ClassDecl> = parent_picks
        .iter()
        .enumerate()
        .map(|(i, &pick)| {
            let parent = match pick % (i + 2) {
                0 => names.object,
                1 => names.io,
                k => classes[k - 2],
            };
            ClassDecl::new(classes[i], Some(parent), "prop.kite", vec![], 1)
        })
        .collect();

    let table = ClassTable::build(&decls, &names, &interner)
        .expect("acyclic hierarchy with declared parents must build");
    (interner, names, table, classes)
}

/// One scope operation for the model-based scope test.
#[derive(Debug, Clone, Copy)]
enum ScopeOp {
    Push,
    Pop,
    Bind { name: usize, ty: usize },
}

fn scope_op() -> impl Strategy<Value = ScopeOp> {
    prop_oneof![
        Just(ScopeOp::Push),
        Just(ScopeOp::Pop),
        (0..5usize, 0..3usize).prop_map(|(name, ty)| ScopeOp::Bind { name, ty }),
    ]
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: any parent assignment drawn from earlier classes or a
    /// built-in yields a buildable, cycle-free table.
    #[test]
    fn acyclic_hierarchies_always_build(picks in prop::collection::vec(0..32usize, 0..8)) {
        let (_, names, table, classes) = build_hierarchy(&picks);
        for &class in &classes {
            // Every chain terminates at the root.
            let chain = table.ancestor_chain(class);
            prop_assert_eq!(chain.last().copied(), Some(names.object));
        }
    }

    /// Property 2: join is symmetric and idempotent.
    #[test]
    fn join_is_symmetric_and_idempotent(picks in prop::collection::vec(0..32usize, 1..8)) {
        let (_, names, table, classes) = build_hierarchy(&picks);
        let lattice = TypeLattice::new(&table, &names);
        let current = classes[0];

        let mut universe = classes.clone();
        universe.extend([names.object, names.io, names.int, names.string, names.bool_]);

        for &a in &universe {
            prop_assert_eq!(lattice.join(current, a, a), a);
            for &b in &universe {
                prop_assert_eq!(
                    lattice.join(current, a, b),
                    lattice.join(current, b, a),
                );
            }
        }
    }

    /// Property 3: the join of two classes is an upper bound of both.
    #[test]
    fn join_is_an_upper_bound(picks in prop::collection::vec(0..32usize, 1..8)) {
        let (_, names, table, classes) = build_hierarchy(&picks);
        let lattice = TypeLattice::new(&table, &names);
        let current = classes[0];

        let mut universe = classes.clone();
        universe.extend([names.object, names.int]);

        for &a in &universe {
            for &b in &universe {
                let join = lattice.join(current, a, b);
                prop_assert_eq!(lattice.is_subtype(current, a, join), Ok(true));
                prop_assert_eq!(lattice.is_subtype(current, b, join), Ok(true));
            }
        }
    }

    /// Property 4: everything conforms to the root; the root conforms only
    /// to itself.
    #[test]
    fn root_is_the_top_of_the_lattice(picks in prop::collection::vec(0..32usize, 1..8)) {
        let (_, names, table, classes) = build_hierarchy(&picks);
        let lattice = TypeLattice::new(&table, &names);
        let current = classes[0];

        for &class in &classes {
            prop_assert_eq!(lattice.is_subtype(current, class, names.object), Ok(true));
            prop_assert_eq!(
                lattice.is_subtype(current, names.object, class),
                Ok(class == names.object),
            );
        }
    }

    /// Property 5: the scope agrees with a naive stack-of-maps model under
    /// arbitrary push/pop/bind sequences, including pops past the outermost
    /// frame.
    #[test]
    fn scope_matches_reference_model(ops in prop::collection::vec(scope_op(), 0..40)) {
        let mut interner = Interner::new();
        let names: Vec<Symbol> = (0..5).map(|i| interner.intern(&format!("v{i}"))).collect();
        let types: Vec<Symbol> = (0..3).map(|i| interner.intern(&format!("T{i}"))).collect();

        let mut scope = TypeScope::new();
        let mut model: Vec<HashMap<usize, usize>> = vec![HashMap::new()];

        for op in ops {
            match op {
                ScopeOp::Push => {
                    scope.push();
                    model.push(HashMap::new());
                }
                ScopeOp::Pop => {
                    let popped = scope.pop();
                    if model.len() > 1 {
                        model.pop();
                        prop_assert!(popped);
                    } else {
                        prop_assert!(!popped);
                    }
                }
                ScopeOp::Bind { name, ty } => {
                    scope.bind(names[name], types[ty], 1, BindingKind::Let);
                    if let Some(frame) = model.last_mut() {
                        frame.insert(name, ty);
                    }
                }
            }

            // After every step, all lookups agree with the model.
            for (i, &name) in names.iter().enumerate() {
                let expected = model
                    .iter()
                    .rev()
                    .find_map(|frame| frame.get(&i))
                    .map(|&ty| types[ty]);
                let actual = scope.lookup(name).map(|b| b.declared_type);
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
