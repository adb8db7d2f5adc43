// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The type-annotation visitor.
//!
//! [`TypeChecker`] walks the AST class-by-class, method-by-method,
//! expression-by-expression, assigning every expression its static type and
//! recording a diagnostic at every point the program violates the typing
//! rules. The walk never stops at an error: the offending expression is
//! given a safe default type (usually the universal root, or the operator's
//! fixed result type) and the descent continues, so one mistake does not
//! hide unrelated ones.
//!
//! Scope discipline: entering a class pushes a frame and binds `self` plus
//! every attribute in scope — inherited ones included — before any feature
//! body is visited, so forward and inherited references resolve. Methods,
//! lets, and case branches each push their own frame; every frame is popped
//! on all paths via [`TypeChecker::with_scope`].

use std::collections::HashSet;

use camino::Utf8PathBuf;
use ecow::EcoString;
use tracing::debug;

use crate::ast::{
    AttributeDecl, ClassDecl, ExprKind, Expression, Feature, MethodDecl, Program,
};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::identity::{Interner, Symbol, WellKnown};
use crate::semantic_analysis::class_table::ClassTable;
use crate::semantic_analysis::scope::{BindingKind, TypeScope};
use crate::semantic_analysis::string_utils::edit_distance;
use crate::semantic_analysis::subtype::{TypeLattice, UnknownType};

/// Context for the class currently being checked: resolves `SELF_TYPE` and
/// locates diagnostics. Replaced wholesale on class entry.
#[derive(Debug, Clone)]
struct ClassContext {
    class: Symbol,
    filename: Utf8PathBuf,
}

/// The annotation visitor. One instance checks one program.
#[derive(Debug)]
pub struct TypeChecker<'a> {
    table: &'a ClassTable,
    lattice: TypeLattice<'a>,
    interner: &'a Interner,
    names: &'a WellKnown,
    scope: TypeScope,
    sink: DiagnosticSink,
    ctx: ClassContext,
}

impl<'a> TypeChecker<'a> {
    /// Creates a checker over a validated class table.
    #[must_use]
    pub fn new(table: &'a ClassTable, interner: &'a Interner, names: &'a WellKnown) -> Self {
        Self {
            table,
            lattice: TypeLattice::new(table, names),
            interner,
            names,
            scope: TypeScope::new(),
            sink: DiagnosticSink::new(),
            ctx: ClassContext {
                class: names.object,
                filename: Utf8PathBuf::new(),
            },
        }
    }

    /// Annotates every class in the program.
    pub fn check_program(&mut self, program: &mut Program) {
        for class in &mut program.classes {
            self.check_class(class);
        }
    }

    /// Consumes the checker, returning the accumulated diagnostics.
    #[must_use]
    pub fn into_sink(self) -> DiagnosticSink {
        self.sink
    }

    /// Runs `f` inside a fresh scope frame, popping it on every path.
    fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scope.push();
        let result = f(self);
        self.scope.pop();
        result
    }

    fn name_of(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    fn error(&mut self, line: u32, message: impl Into<EcoString>) {
        self.sink
            .push(Diagnostic::error(message, self.ctx.filename.clone(), line));
    }

    /// Subtype check that converts an unknown type name into a diagnostic
    /// and answers `false`, so the walk continues.
    fn conforms(&mut self, child: Symbol, parent: Symbol, line: u32) -> bool {
        match self.lattice.is_subtype(self.ctx.class, child, parent) {
            Ok(ok) => ok,
            Err(UnknownType(ty)) => {
                self.error(line, format!("type `{}` is not declared", self.name_of(ty)));
                false
            }
        }
    }

    /// Maps a declared type to itself when the table knows it (or it is
    /// `SELF_TYPE`), and to the universal root otherwise. Callers diagnose
    /// the unknown name at declaration-binding time, so this stays silent.
    fn known_or_root(&self, ty: Symbol) -> Symbol {
        if ty == self.names.self_type || self.table.contains(ty) {
            ty
        } else {
            self.table.root()
        }
    }

    fn check_class(&mut self, class: &mut ClassDecl) {
        self.ctx = ClassContext {
            class: class.name,
            filename: class.filename.clone(),
        };
        debug!(class = self.name_of(class.name), "checking class");

        self.with_scope(|checker| {
            // `self` resolves to the dynamic type of the current object.
            checker.scope.bind(
                checker.names.self_,
                checker.names.self_type,
                class.line,
                BindingKind::SelfRef,
            );

            // Inherited attributes first (root-most ancestor first), own
            // attributes after, so nearer declarations shadow farther ones.
            // All bindings land before any feature body is visited, because
            // initializers may reference sibling or inherited attributes.
            let table = checker.table;
            let mut ancestors = table.ancestor_chain(class.name);
            ancestors.reverse();
            for ancestor in ancestors {
                if let Some(info) = table.resolve(ancestor) {
                    for attr in info.attributes() {
                        checker.scope.bind(
                            attr.name,
                            attr.declared_type,
                            attr.line,
                            BindingKind::Attribute,
                        );
                    }
                }
            }
            checker.bind_own_attributes(class);

            for feature in &mut class.features {
                match feature {
                    Feature::Attribute(attr) => checker.check_attribute(attr),
                    Feature::Method(method) => checker.check_method(method),
                }
            }
        });
    }

    /// Binds the class's own attributes, diagnosing duplicates within the
    /// class (first declaration wins) and undeclared attribute types.
    /// Shadowing an attribute inherited from an ancestor is allowed.
    fn bind_own_attributes(&mut self, class: &ClassDecl) {
        let mut declared = HashSet::new();
        for attr in class.attributes() {
            if attr.name == self.names.self_ {
                self.error(attr.line, "`self` cannot be the name of an attribute");
                continue;
            }
            if !declared.insert(attr.name) {
                self.error(
                    attr.line,
                    format!(
                        "attribute `{}` is declared more than once in class `{}`",
                        self.name_of(attr.name),
                        self.name_of(class.name),
                    ),
                );
                continue;
            }
            let declared_type = attr.declared_type;
            if declared_type != self.names.self_type && !self.table.contains(declared_type) {
                self.error(
                    attr.line,
                    format!(
                        "attribute `{}` has undeclared type `{}`",
                        self.name_of(attr.name),
                        self.name_of(declared_type),
                    ),
                );
            }
            self.scope.bind(
                attr.name,
                self.known_or_root(declared_type),
                attr.line,
                BindingKind::Attribute,
            );
        }
    }

    /// Checks an attribute initializer against the declared type. An absent
    /// initializer (the no-op expression) is not a type error.
    fn check_attribute(&mut self, attr: &mut AttributeDecl) {
        let init_line = attr.init.line;
        if let Some(init_ty) = self.check_expr(&mut attr.init) {
            let declared = self.known_or_root(attr.declared_type);
            if !self.conforms(init_ty, declared, init_line) {
                self.error(
                    init_line,
                    format!(
                        "initializer of attribute `{}` has type `{}`, which does not conform to declared type `{}`",
                        self.name_of(attr.name),
                        self.name_of(init_ty),
                        self.name_of(attr.declared_type),
                    ),
                );
            }
        }
    }

    /// Checks a method: binds formals in a fresh frame, annotates the body,
    /// and requires the body's type to conform to the declared return type.
    fn check_method(&mut self, method: &mut MethodDecl) {
        self.with_scope(|checker| {
            let mut seen = HashSet::new();
            for formal in &method.formals {
                if formal.name == checker.names.self_ {
                    checker.error(
                        formal.line,
                        "`self` cannot be the name of a formal parameter",
                    );
                    continue;
                }
                if !seen.insert(formal.name) {
                    checker.error(
                        formal.line,
                        format!(
                            "formal parameter `{}` is declared more than once in method `{}`",
                            checker.name_of(formal.name),
                            checker.name_of(method.name),
                        ),
                    );
                    continue;
                }
                let declared = formal.declared_type;
                if declared == checker.names.self_type {
                    checker.error(
                        formal.line,
                        format!(
                            "formal parameter `{}` cannot have type `SELF_TYPE`",
                            checker.name_of(formal.name),
                        ),
                    );
                } else if !checker.table.contains(declared) {
                    checker.error(
                        formal.line,
                        format!(
                            "formal parameter `{}` has undeclared type `{}`",
                            checker.name_of(formal.name),
                            checker.name_of(declared),
                        ),
                    );
                }
                checker.scope.bind(
                    formal.name,
                    checker.known_or_root(declared),
                    formal.line,
                    BindingKind::Formal,
                );
            }

            let body_line = method.body.line;
            let body_ty = checker.check_expr(&mut method.body);

            let return_type = method.return_type;
            if return_type != checker.names.self_type && !checker.table.contains(return_type) {
                checker.error(
                    method.line,
                    format!(
                        "method `{}` has undeclared return type `{}`",
                        checker.name_of(method.name),
                        checker.name_of(return_type),
                    ),
                );
            } else if let Some(body_ty) = body_ty {
                if !checker.conforms(body_ty, return_type, body_line) {
                    checker.error(
                        body_line,
                        format!(
                            "body of method `{}` has type `{}`, which does not conform to declared return type `{}`",
                            checker.name_of(method.name),
                            checker.name_of(body_ty),
                            checker.name_of(return_type),
                        ),
                    );
                }
            }
        });
    }

    /// Shorthand for expression positions that need a type: the no-op
    /// expression defaults to the universal root.
    fn check_expr_or_root(&mut self, expr: &mut Expression) -> Symbol {
        self.check_expr(expr).unwrap_or_else(|| self.table.root())
    }

    /// Annotates an expression and returns its static type.
    ///
    /// Returns `None` only for the no-op expression, whose type slot stays
    /// absent; callers that need a type default it themselves.
    #[allow(clippy::too_many_lines)] // one arm per expression form
    fn check_expr(&mut self, expr: &mut Expression) -> Option<Symbol> {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::NoOp => return None,

            ExprKind::IntLiteral(_) => self.names.int,
            ExprKind::BoolLiteral(_) => self.names.bool_,
            ExprKind::StringLiteral(_) => self.names.string,

            ExprKind::Ident(name) => {
                let name = *name;
                let declared = self.scope.lookup(name).map(|b| b.declared_type);
                match declared {
                    Some(declared) => declared,
                    None => {
                        self.error(
                            line,
                            format!(
                                "identifier `{}` is not declared in this scope",
                                self.name_of(name),
                            ),
                        );
                        self.table.root()
                    }
                }
            }

            ExprKind::Assign { target, value } => {
                let target = *target;
                let value_ty = self.check_expr_or_root(value);
                if target == self.names.self_ {
                    self.error(line, "cannot assign to `self`");
                } else {
                    let declared = self.scope.lookup(target).map(|b| b.declared_type);
                    match declared {
                        Some(declared) => {
                            if !self.conforms(value_ty, declared, line) {
                                self.error(
                                    line,
                                    format!(
                                        "cannot assign value of type `{}` to `{}`, declared as `{}`",
                                        self.name_of(value_ty),
                                        self.name_of(target),
                                        self.name_of(declared),
                                    ),
                                );
                            }
                        }
                        None => {
                            self.error(
                                line,
                                format!(
                                    "assignment to undeclared identifier `{}`",
                                    self.name_of(target),
                                ),
                            );
                        }
                    }
                }
                value_ty
            }

            ExprKind::Dispatch {
                receiver,
                method,
                args,
            } => {
                let method = *method;
                self.check_dispatch(receiver, None, method, args, line)
            }

            ExprKind::StaticDispatch {
                receiver,
                class,
                method,
                args,
            } => {
                let (class, method) = (*class, *method);
                self.check_dispatch(receiver, Some(class), method, args, line)
            }

            ExprKind::If {
                pred,
                then_branch,
                else_branch,
            } => {
                let pred_line = pred.line;
                let pred_ty = self.check_expr_or_root(pred);
                if pred_ty != self.names.bool_ {
                    self.error(
                        pred_line,
                        format!(
                            "predicate of conditional has type `{}`, expected `Bool`",
                            self.name_of(pred_ty),
                        ),
                    );
                }
                let then_ty = self.check_expr_or_root(then_branch);
                let else_ty = self.check_expr_or_root(else_branch);
                self.lattice.join(self.ctx.class, then_ty, else_ty)
            }

            ExprKind::While { pred, body } => {
                let pred_line = pred.line;
                let pred_ty = self.check_expr_or_root(pred);
                if pred_ty != self.names.bool_ {
                    self.error(
                        pred_line,
                        format!(
                            "predicate of loop has type `{}`, expected `Bool`",
                            self.name_of(pred_ty),
                        ),
                    );
                }
                self.check_expr_or_root(body);
                // A loop may run zero times; its value is always the root.
                self.table.root()
            }

            ExprKind::Case {
                scrutinee,
                branches,
            } => {
                self.check_expr_or_root(scrutinee);
                let mut seen_types = HashSet::new();
                let mut joined: Option<Symbol> = None;
                for branch in branches.iter_mut() {
                    let declared = branch.declared_type;
                    if !seen_types.insert(declared) {
                        self.error(
                            branch.line,
                            format!(
                                "duplicate branch type `{}` in case",
                                self.name_of(declared),
                            ),
                        );
                    }
                    if branch.name == self.names.self_ {
                        self.error(
                            branch.line,
                            "`self` cannot be bound in a case branch",
                        );
                    }
                    if declared != self.names.self_type && !self.table.contains(declared) {
                        self.error(
                            branch.line,
                            format!(
                                "case branch declares unknown type `{}`",
                                self.name_of(declared),
                            ),
                        );
                    }
                    let bound = self.known_or_root(declared);
                    let (branch_name, branch_line) = (branch.name, branch.line);
                    let body = &mut branch.body;
                    let body_ty = self.with_scope(|checker| {
                        checker
                            .scope
                            .bind(branch_name, bound, branch_line, BindingKind::CaseBranch);
                        checker.check_expr_or_root(body)
                    });
                    joined = Some(match joined {
                        None => body_ty,
                        Some(acc) => self.lattice.join(self.ctx.class, acc, body_ty),
                    });
                }
                joined.unwrap_or_else(|| self.table.root())
            }

            ExprKind::Block { body } => {
                let mut last = None;
                for inner in body.iter_mut() {
                    last = self.check_expr(inner);
                }
                last.unwrap_or_else(|| self.table.root())
            }

            ExprKind::Let {
                name,
                declared_type,
                init,
                body,
            } => {
                let (name, declared_type) = (*name, *declared_type);
                if name == self.names.self_ {
                    self.error(line, "`self` cannot be bound in a let expression");
                }
                if declared_type != self.names.self_type && !self.table.contains(declared_type) {
                    self.error(
                        line,
                        format!(
                            "let identifier `{}` has undeclared type `{}`",
                            self.name_of(name),
                            self.name_of(declared_type),
                        ),
                    );
                }
                let bound = self.known_or_root(declared_type);
                self.with_scope(|checker| {
                    checker.scope.bind(name, bound, line, BindingKind::Let);
                    let init_line = init.line;
                    if let Some(init_ty) = checker.check_expr(init) {
                        if !checker.conforms(init_ty, bound, init_line) {
                            checker.error(
                                init_line,
                                format!(
                                    "initializer of `{}` has type `{}`, which does not conform to declared type `{}`",
                                    checker.name_of(name),
                                    checker.name_of(init_ty),
                                    checker.name_of(declared_type),
                                ),
                            );
                        }
                    }
                    checker.check_expr_or_root(body)
                })
            }

            ExprKind::Arith { op, lhs, rhs } => {
                let op = *op;
                let (lhs_line, rhs_line) = (lhs.line, rhs.line);
                let lhs_ty = self.check_expr_or_root(lhs);
                let rhs_ty = self.check_expr_or_root(rhs);
                if lhs_ty != self.names.int {
                    self.error(
                        lhs_line,
                        format!(
                            "left operand of `{}` has type `{}`, expected `Int`",
                            op.symbol(),
                            self.name_of(lhs_ty),
                        ),
                    );
                }
                if rhs_ty != self.names.int {
                    self.error(
                        rhs_line,
                        format!(
                            "right operand of `{}` has type `{}`, expected `Int`",
                            op.symbol(),
                            self.name_of(rhs_ty),
                        ),
                    );
                }
                // Downstream nodes still see `Int` even on operand errors.
                self.names.int
            }

            ExprKind::Compare { lhs, rhs, .. } => {
                self.check_expr_or_root(lhs);
                self.check_expr_or_root(rhs);
                self.names.bool_
            }

            ExprKind::Eq { lhs, rhs } => {
                self.check_expr_or_root(lhs);
                self.check_expr_or_root(rhs);
                self.names.bool_
            }

            ExprKind::Negate(operand) => {
                let operand_line = operand.line;
                let operand_ty = self.check_expr_or_root(operand);
                if operand_ty != self.names.int {
                    self.error(
                        operand_line,
                        format!(
                            "operand of `~` has type `{}`, expected `Int`",
                            self.name_of(operand_ty),
                        ),
                    );
                }
                self.names.int
            }

            ExprKind::Not(operand) => {
                let operand_line = operand.line;
                let operand_ty = self.check_expr_or_root(operand);
                if operand_ty != self.names.bool_ {
                    self.error(
                        operand_line,
                        format!(
                            "operand of `not` has type `{}`, expected `Bool`",
                            self.name_of(operand_ty),
                        ),
                    );
                }
                self.names.bool_
            }

            ExprKind::New { class } => {
                let class = *class;
                if class == self.names.self_type {
                    self.ctx.class
                } else if self.table.contains(class) {
                    class
                } else {
                    self.error(
                        line,
                        format!("`new` names undeclared class `{}`", self.name_of(class)),
                    );
                    self.table.root()
                }
            }

            ExprKind::IsVoid(operand) => {
                self.check_expr_or_root(operand);
                self.names.bool_
            }
        };

        expr.inferred_type = Some(ty);
        Some(ty)
    }

    /// Types a dispatch. `static_class` carries the explicitly named class
    /// of a static dispatch; dynamic dispatch resolves from the receiver's
    /// computed type (the current class when the receiver is `SELF_TYPE`).
    fn check_dispatch(
        &mut self,
        receiver: &mut Expression,
        static_class: Option<Symbol>,
        method: Symbol,
        args: &mut [Expression],
        line: u32,
    ) -> Symbol {
        let table = self.table;
        let receiver_ty = self.check_expr_or_root(receiver);
        let arg_types: Vec<Symbol> = args
            .iter_mut()
            .map(|arg| self.check_expr_or_root(arg))
            .collect();

        let start = match static_class {
            Some(class) => {
                if !table.contains(class) {
                    self.error(
                        line,
                        format!(
                            "static dispatch names undeclared class `{}`",
                            self.name_of(class),
                        ),
                    );
                    return table.root();
                }
                if !self.conforms(receiver_ty, class, line) {
                    self.error(
                        line,
                        format!(
                            "receiver of type `{}` does not conform to statically named class `{}`",
                            self.name_of(receiver_ty),
                            self.name_of(class),
                        ),
                    );
                }
                class
            }
            None => {
                if receiver_ty == self.names.self_type {
                    self.ctx.class
                } else {
                    receiver_ty
                }
            }
        };

        let Some(resolved) = table.resolve_method(start, method) else {
            let mut diagnostic = Diagnostic::error(
                format!(
                    "method `{}` is not declared on class `{}` or its ancestors",
                    self.name_of(method),
                    self.name_of(start),
                ),
                self.ctx.filename.clone(),
                line,
            );
            if let Some(suggestion) = self.nearest_method(start, method) {
                diagnostic = diagnostic.with_hint(format!("did you mean `{suggestion}`?"));
            }
            self.sink.push(diagnostic);
            return table.root();
        };

        if resolved.formals.len() != arg_types.len() {
            self.error(
                line,
                format!(
                    "method `{}` expects {} argument(s) but {} were supplied",
                    self.name_of(method),
                    resolved.formals.len(),
                    arg_types.len(),
                ),
            );
        }
        for (formal, &actual) in resolved.formals.iter().zip(&arg_types) {
            if !self.conforms(actual, formal.declared_type, line) {
                self.error(
                    line,
                    format!(
                        "argument `{}` of method `{}` has type `{}`, which does not conform to declared type `{}`",
                        self.name_of(formal.name),
                        self.name_of(method),
                        self.name_of(actual),
                        self.name_of(formal.declared_type),
                    ),
                );
            }
        }

        // A `SELF_TYPE` return preserves the receiver's type through the
        // dispatch chain instead of widening to the defining class.
        if resolved.return_type == self.names.self_type {
            receiver_ty
        } else {
            resolved.return_type
        }
    }

    /// Finds the closest method name on the chain for a did-you-mean hint.
    fn nearest_method(&self, start: Symbol, missing: Symbol) -> Option<EcoString> {
        let wanted = self.interner.resolve(missing);
        self.table
            .method_names_on_chain(start)
            .into_iter()
            .map(|candidate| self.interner.resolve(candidate))
            .map(|candidate| (edit_distance(wanted, candidate), candidate))
            .filter(|&(distance, _)| distance > 0 && distance <= 2)
            .min_by_key(|&(distance, _)| distance)
            .map(|(_, candidate)| candidate.into())
    }
}
