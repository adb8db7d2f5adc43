// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Static class table for compile-time inheritance and method resolution.
//!
//! The table is built once from the parsed class list — built-in classes
//! first, then user classes — and validated (reserved names, parent
//! resolution, cycle detection) before any typing work begins. After
//! [`ClassTable::build`] returns it is immutable and queried read-only by
//! the rest of the pass:
//! - the subtype/join engine walks ancestor chains,
//! - dispatch typing resolves methods along the chain,
//! - class entry collects the attributes in scope (inherited + own).
//!
//! Validation is strict about termination: every ancestor-dependent query
//! in this module and elsewhere assumes the one-time cycle check has
//! already rejected cyclic hierarchies.

use std::collections::{HashMap, HashSet};

use camino::Utf8PathBuf;
use tracing::debug;

use crate::ast::{ClassDecl, Feature};
use crate::identity::{Interner, Symbol, WellKnown};
use crate::semantic_analysis::error::StructuralFault;

mod builtins;

/// Signature of a formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalInfo {
    /// Parameter name.
    pub name: Symbol,
    /// Declared type.
    pub declared_type: Symbol,
}

/// Signature of a method, as stored in the table.
///
/// Bodies stay in the AST; the table keeps only what dispatch typing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// Method name.
    pub name: Symbol,
    /// Formal parameters, in order.
    pub formals: Vec<FormalInfo>,
    /// Declared return type (possibly `SELF_TYPE`).
    pub return_type: Symbol,
    /// Line of the declaration (0 for built-ins).
    pub line: u32,
}

/// Signature of an attribute, as stored in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    /// Attribute name.
    pub name: Symbol,
    /// Declared type.
    pub declared_type: Symbol,
    /// Line of the declaration (0 for built-ins).
    pub line: u32,
}

/// A class member signature, preserving declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureInfo {
    /// An attribute signature.
    Attribute(AttributeInfo),
    /// A method signature.
    Method(MethodInfo),
}

/// Information about a class in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Class name.
    pub name: Symbol,
    /// Parent class name. `None` only for the universal root.
    pub parent: Option<Symbol>,
    /// Source file of the declaration (`<builtin>` for built-ins).
    pub filename: Utf8PathBuf,
    /// Line of the class header (0 for built-ins).
    pub line: u32,
    /// Member signatures, in declaration order.
    pub features: Vec<FeatureInfo>,
}

impl ClassInfo {
    /// Iterates over the method signatures of this class.
    pub fn methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.features.iter().filter_map(|f| match f {
            FeatureInfo::Method(m) => Some(m),
            FeatureInfo::Attribute(_) => None,
        })
    }

    /// Iterates over the attribute signatures of this class.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeInfo> {
        self.features.iter().filter_map(|f| match f {
            FeatureInfo::Attribute(a) => Some(a),
            FeatureInfo::Method(_) => None,
        })
    }
}

/// The validated inheritance graph and per-class member signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTable {
    classes: HashMap<Symbol, ClassInfo>,
    root: Symbol,
}

impl ClassTable {
    /// Builds and validates the class table from the parsed class list.
    ///
    /// Built-in classes (`Object`, `IO`, `Int`, `String`, `Bool`) are
    /// installed first, then every user class is registered. The table is
    /// rejected as a whole on the first structural fault: a reserved name
    /// redefined, a duplicate class, a parent that is uninheritable or
    /// undeclared, or an inheritance cycle.
    ///
    /// # Errors
    ///
    /// Returns the [`StructuralFault`] that invalidates the hierarchy.
    pub fn build(
        classes: &[ClassDecl],
        names: &WellKnown,
        interner: &Interner,
    ) -> Result<Self, StructuralFault> {
        let mut table = Self {
            classes: builtins::install(names),
            root: names.object,
        };

        for class in classes {
            if names.is_reserved_class(class.name) {
                return Err(StructuralFault::ReservedClass {
                    class: interner.resolve(class.name).into(),
                });
            }
            if table.classes.contains_key(&class.name) {
                return Err(StructuralFault::DuplicateClass {
                    class: interner.resolve(class.name).into(),
                });
            }
            table
                .classes
                .insert(class.name, Self::extract_class_info(class));
        }

        table.validate_parents(classes, names, interner)?;
        table.validate_acyclic(interner)?;

        debug!(
            classes = table.classes.len(),
            user_classes = classes.len(),
            "class table built"
        );
        Ok(table)
    }

    /// Clones the signature metadata out of a class declaration.
    fn extract_class_info(class: &ClassDecl) -> ClassInfo {
        let features = class
            .features
            .iter()
            .map(|feature| match feature {
                Feature::Attribute(attr) => FeatureInfo::Attribute(AttributeInfo {
                    name: attr.name,
                    declared_type: attr.declared_type,
                    line: attr.line,
                }),
                Feature::Method(method) => FeatureInfo::Method(MethodInfo {
                    name: method.name,
                    formals: method
                        .formals
                        .iter()
                        .map(|f| FormalInfo {
                            name: f.name,
                            declared_type: f.declared_type,
                        })
                        .collect(),
                    return_type: method.return_type,
                    line: method.line,
                }),
            })
            .collect();

        ClassInfo {
            name: class.name,
            parent: class.parent,
            filename: class.filename.clone(),
            line: class.line,
            features,
        }
    }

    /// Checks that every user class names an inheritable, declared parent.
    fn validate_parents(
        &self,
        classes: &[ClassDecl],
        names: &WellKnown,
        interner: &Interner,
    ) -> Result<(), StructuralFault> {
        for class in classes {
            let Some(parent) = class.parent else {
                // Only the built-in root may omit a parent, and user classes
                // cannot redeclare it; the parser always fills one in.
                continue;
            };
            if names.is_uninheritable(parent) {
                return Err(StructuralFault::UninheritableParent {
                    class: interner.resolve(class.name).into(),
                    parent: interner.resolve(parent).into(),
                });
            }
            if !self.classes.contains_key(&parent) {
                return Err(StructuralFault::UnresolvedParent {
                    class: interner.resolve(class.name).into(),
                    parent: interner.resolve(parent).into(),
                });
            }
        }
        Ok(())
    }

    /// Walks every class's parent chain once, rejecting any chain that
    /// revisits a class. Runs strictly before any other ancestor-dependent
    /// logic; O(classes × depth).
    fn validate_acyclic(&self, interner: &Interner) -> Result<(), StructuralFault> {
        for &start in self.classes.keys() {
            let mut seen = HashSet::new();
            seen.insert(start);
            let mut current = self.parent_of(start);
            while let Some(parent) = current {
                if !seen.insert(parent) {
                    return Err(StructuralFault::InheritanceCycle {
                        class: interner.resolve(start).into(),
                    });
                }
                current = self.parent_of(parent);
            }
        }
        Ok(())
    }

    /// The universal root class (`Object`).
    #[must_use]
    pub fn root(&self) -> Symbol {
        self.root
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn resolve(&self, name: Symbol) -> Option<&ClassInfo> {
        self.classes.get(&name)
    }

    /// Returns true if the table knows a class by this name.
    #[must_use]
    pub fn contains(&self, name: Symbol) -> bool {
        self.classes.contains_key(&name)
    }

    /// The parent of a class. `None` only for the universal root (or an
    /// unknown name).
    #[must_use]
    pub fn parent_of(&self, name: Symbol) -> Option<Symbol> {
        self.classes.get(&name).and_then(|info| info.parent)
    }

    /// The member signatures of a class, in declaration order. Empty for an
    /// unknown name.
    #[must_use]
    pub fn features_of(&self, name: Symbol) -> &[FeatureInfo] {
        self.classes
            .get(&name)
            .map_or(&[], |info| info.features.as_slice())
    }

    /// The ordered ancestor chain of a class, excluding the class itself,
    /// root last. Example: `ancestor_chain(Counter)` → `[IO, Object]`.
    #[must_use]
    pub fn ancestor_chain(&self, name: Symbol) -> Vec<Symbol> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(name);
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.parent_of(ancestor);
        }
        chain
    }

    /// Resolves the nearest declaration of a method, starting at `start` and
    /// walking ancestors. Returns `None` if the chain reaches past the root
    /// without a match.
    #[must_use]
    pub fn resolve_method(&self, start: Symbol, method: Symbol) -> Option<&MethodInfo> {
        let mut current = Some(start);
        while let Some(class) = current {
            let info = self.classes.get(&class)?;
            if let Some(found) = info.methods().find(|m| m.name == method) {
                return Some(found);
            }
            current = info.parent;
        }
        None
    }

    /// All method names visible on a class's chain (own first, then
    /// inherited), deduplicated. Feeds did-you-mean hints.
    #[must_use]
    pub fn method_names_on_chain(&self, start: Symbol) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        let mut current = Some(start);
        while let Some(class) = current {
            let Some(info) = self.classes.get(&class) else {
                break;
            };
            for method in info.methods() {
                if seen.insert(method.name) {
                    methods.push(method.name);
                }
            }
            current = info.parent;
        }
        methods
    }

    /// The attributes in scope inside a class's bodies: inherited attributes
    /// first (root-most ancestor first), then the class's own. Binding them
    /// in this order makes nearer declarations shadow farther ones.
    #[must_use]
    pub fn attributes_in_scope(&self, class: Symbol) -> Vec<AttributeInfo> {
        let mut order = self.ancestor_chain(class);
        order.reverse();
        order.push(class);

        let mut attributes = Vec::new();
        for name in order {
            if let Some(info) = self.classes.get(&name) {
                attributes.extend(info.attributes().cloned());
            }
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AttributeDecl, Expression, MethodDecl};

    fn setup() -> (Interner, WellKnown) {
        let mut interner = Interner::new();
        let wk = WellKnown::seed(&mut interner);
        (interner, wk)
    }

    fn class(name: Symbol, parent: Symbol, features: Vec<Feature>) -> ClassDecl {
        ClassDecl::new(name, Some(parent), "test.kite", features, 1)
    }

    fn attribute(name: Symbol, declared_type: Symbol, line: u32) -> Feature {
        Feature::Attribute(AttributeDecl {
            name,
            declared_type,
            init: Expression::no_op(line),
            line,
        })
    }

    fn method(name: Symbol, return_type: Symbol, line: u32) -> Feature {
        Feature::Method(MethodDecl {
            name,
            formals: vec![],
            return_type,
            body: Expression::new(crate::ast::ExprKind::IntLiteral(0), line),
            line,
        })
    }

    #[test]
    fn builtins_are_installed() {
        let (interner, wk) = setup();
        let table = ClassTable::build(&[], &wk, &interner).unwrap();

        for name in [wk.object, wk.io, wk.int, wk.string, wk.bool_] {
            assert!(table.contains(name));
        }
        assert_eq!(table.parent_of(wk.object), None);
        assert_eq!(table.parent_of(wk.io), Some(wk.object));
        assert_eq!(table.root(), wk.object);
    }

    #[test]
    fn ancestor_chain_ends_at_root() {
        let (mut interner, wk) = setup();
        let a = interner.intern("A");
        let b = interner.intern("B");
        let classes = vec![class(a, wk.io, vec![]), class(b, a, vec![])];

        let table = ClassTable::build(&classes, &wk, &interner).unwrap();
        assert_eq!(table.ancestor_chain(b), vec![a, wk.io, wk.object]);
        assert!(table.ancestor_chain(wk.object).is_empty());
    }

    #[test]
    fn resolve_method_walks_ancestors() {
        let (mut interner, wk) = setup();
        let main = interner.intern("Main");
        let classes = vec![class(main, wk.io, vec![])];

        let table = ClassTable::build(&classes, &wk, &interner).unwrap();

        // out_string is declared on IO, inherited by Main.
        let m = table.resolve_method(main, wk.out_string).unwrap();
        assert_eq!(m.return_type, wk.self_type);
        assert_eq!(m.formals.len(), 1);

        // type_name comes from Object, two hops up.
        assert!(table.resolve_method(main, wk.type_name).is_some());

        // Unknown methods resolve to None past the root.
        let missing = interner.intern("missing");
        assert!(table.resolve_method(main, missing).is_none());
    }

    #[test]
    fn nearest_declaration_wins() {
        let (mut interner, wk) = setup();
        let base = interner.intern("Base");
        let derived = interner.intern("Derived");
        let f = interner.intern("f");
        let classes = vec![
            class(base, wk.object, vec![method(f, wk.int, 3)]),
            class(derived, base, vec![method(f, wk.bool_, 7)]),
        ];

        let table = ClassTable::build(&classes, &wk, &interner).unwrap();
        let m = table.resolve_method(derived, f).unwrap();
        assert_eq!(m.return_type, wk.bool_);
        assert_eq!(table.resolve_method(base, f).unwrap().return_type, wk.int);
    }

    #[test]
    fn attributes_in_scope_orders_inherited_first() {
        let (mut interner, wk) = setup();
        let base = interner.intern("Base");
        let derived = interner.intern("Derived");
        let x = interner.intern("x");
        let y = interner.intern("y");
        let classes = vec![
            class(base, wk.object, vec![attribute(x, wk.int, 2)]),
            class(derived, base, vec![attribute(y, wk.string, 2), attribute(x, wk.bool_, 3)]),
        ];

        let table = ClassTable::build(&classes, &wk, &interner).unwrap();
        let attrs = table.attributes_in_scope(derived);
        let order: Vec<(Symbol, Symbol)> =
            attrs.iter().map(|a| (a.name, a.declared_type)).collect();
        // Base's x first, then Derived's y and shadowing x.
        assert_eq!(order, vec![(x, wk.int), (y, wk.string), (x, wk.bool_)]);
    }

    #[test]
    fn redefining_a_builtin_is_a_fault() {
        let (interner, wk) = setup();
        let classes = vec![class(wk.int, wk.object, vec![])];
        let fault = ClassTable::build(&classes, &wk, &interner).unwrap_err();
        assert!(matches!(fault, StructuralFault::ReservedClass { .. }));
    }

    #[test]
    fn duplicate_class_is_a_fault() {
        let (mut interner, wk) = setup();
        let a = interner.intern("A");
        let classes = vec![class(a, wk.object, vec![]), class(a, wk.io, vec![])];
        let fault = ClassTable::build(&classes, &wk, &interner).unwrap_err();
        assert!(matches!(fault, StructuralFault::DuplicateClass { .. }));
    }

    #[test]
    fn undeclared_parent_is_a_fault() {
        let (mut interner, wk) = setup();
        let a = interner.intern("A");
        let ghost = interner.intern("Ghost");
        let classes = vec![class(a, ghost, vec![])];
        let fault = ClassTable::build(&classes, &wk, &interner).unwrap_err();
        assert_eq!(
            fault,
            StructuralFault::UnresolvedParent {
                class: "A".into(),
                parent: "Ghost".into(),
            }
        );
    }

    #[test]
    fn inheriting_self_type_is_a_fault() {
        let (mut interner, wk) = setup();
        let a = interner.intern("A");
        let classes = vec![class(a, wk.self_type, vec![])];
        let fault = ClassTable::build(&classes, &wk, &interner).unwrap_err();
        assert!(matches!(fault, StructuralFault::UninheritableParent { .. }));
    }

    #[test]
    fn inheriting_a_primitive_is_a_fault() {
        let (mut interner, wk) = setup();
        let a = interner.intern("A");
        let classes = vec![class(a, wk.string, vec![])];
        let fault = ClassTable::build(&classes, &wk, &interner).unwrap_err();
        assert!(matches!(fault, StructuralFault::UninheritableParent { .. }));
    }

    #[test]
    fn two_class_cycle_is_a_fault() {
        let (mut interner, wk) = setup();
        let a = interner.intern("A");
        let b = interner.intern("B");
        let classes = vec![class(a, b, vec![]), class(b, a, vec![])];
        let fault = ClassTable::build(&classes, &wk, &interner).unwrap_err();
        assert!(matches!(fault, StructuralFault::InheritanceCycle { .. }));
    }

    #[test]
    fn self_cycle_is_a_fault() {
        let (mut interner, wk) = setup();
        let a = interner.intern("A");
        let classes = vec![class(a, a, vec![])];
        let fault = ClassTable::build(&classes, &wk, &interner).unwrap_err();
        assert!(matches!(fault, StructuralFault::InheritanceCycle { .. }));
    }

    #[test]
    fn features_of_preserves_declaration_order() {
        let (mut interner, wk) = setup();
        let c = interner.intern("C");
        let x = interner.intern("x");
        let f = interner.intern("f");
        let classes = vec![class(
            c,
            wk.object,
            vec![attribute(x, wk.int, 2), method(f, wk.int, 3)],
        )];

        let table = ClassTable::build(&classes, &wk, &interner).unwrap();
        let features = table.features_of(c);
        assert_eq!(features.len(), 2);
        assert!(matches!(features[0], FeatureInfo::Attribute(_)));
        assert!(matches!(features[1], FeatureInfo::Method(_)));
        assert!(table.features_of(x).is_empty());
    }
}
