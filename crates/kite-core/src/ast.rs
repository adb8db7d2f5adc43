// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Kite.
//!
//! The AST represents a parsed Kite program: a sequence of class
//! declarations, each carrying attributes and methods, whose bodies are
//! expression trees. It is produced by an external parser and consumed by
//! [`semantic_analysis`](crate::semantic_analysis), which fills in every
//! expression's `inferred_type` slot.
//!
//! # Design notes
//!
//! - **All nodes carry a line number** — diagnostics cite `filename:line`.
//! - **Names are interned** — every identifier is a [`Symbol`]; the tree
//!   owns no name strings (see [`crate::identity`]).
//! - **Features are tagged** — a [`Feature`] is an `Attribute` or a `Method`
//!   by construction, so traversal dispatches on the tag rather than on a
//!   runtime test.
//! - **The type slot is written once** — `inferred_type` starts [`None`] and
//!   is assigned during annotation; re-running the pass writes the same
//!   value. Only [`ExprKind::NoOp`] is left unassigned.
//!
//! # Example
//!
//! ```
//! use kite_core::ast::{Expression, ExprKind, ArithOp};
//!
//! // 5 + 3, as a parser would build it
//! let sum = Expression::new(
//!     ExprKind::Arith {
//!         op: ArithOp::Add,
//!         lhs: Box::new(Expression::new(ExprKind::IntLiteral(5), 1)),
//!         rhs: Box::new(Expression::new(ExprKind::IntLiteral(3), 1)),
//!     },
//!     1,
//! );
//! assert!(sum.inferred_type.is_none());
//! ```

use camino::Utf8PathBuf;
use ecow::EcoString;

use crate::identity::Symbol;

/// A complete parsed program: the flat list of user class declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Class declarations, in source order.
    pub classes: Vec<ClassDecl>,
}

impl Program {
    /// Creates a program from its class declarations.
    #[must_use]
    pub fn new(classes: Vec<ClassDecl>) -> Self {
        Self { classes }
    }
}

/// A class declaration.
///
/// Every user-declared class names a parent; only the built-in root class
/// `Object` has none. The filename is carried for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// Class name.
    pub name: Symbol,
    /// Parent class name. `None` only for the universal root.
    pub parent: Option<Symbol>,
    /// Source file this class was declared in.
    pub filename: Utf8PathBuf,
    /// Attributes and methods, in declaration order.
    pub features: Vec<Feature>,
    /// Line of the class header.
    pub line: u32,
}

impl ClassDecl {
    /// Creates a class declaration.
    #[must_use]
    pub fn new(
        name: Symbol,
        parent: Option<Symbol>,
        filename: impl Into<Utf8PathBuf>,
        features: Vec<Feature>,
        line: u32,
    ) -> Self {
        Self {
            name,
            parent,
            filename: filename.into(),
            features,
            line,
        }
    }

    /// Iterates over the methods of this class, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.features.iter().filter_map(|f| match f {
            Feature::Method(m) => Some(m),
            Feature::Attribute(_) => None,
        })
    }

    /// Iterates over the attributes of this class, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.features.iter().filter_map(|f| match f {
            Feature::Attribute(a) => Some(a),
            Feature::Method(_) => None,
        })
    }
}

/// A class member: an attribute or a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    /// An instance attribute with an optional initializer.
    Attribute(AttributeDecl),
    /// A method with formal parameters and a body expression.
    Method(MethodDecl),
}

/// An attribute declaration: `name : Type <- init`.
///
/// An omitted initializer is represented as a [`ExprKind::NoOp`] expression,
/// which the checker leaves untyped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Attribute name.
    pub name: Symbol,
    /// Declared type.
    pub declared_type: Symbol,
    /// Initializer expression, or `NoOp` when omitted.
    pub init: Expression,
    /// Line of the declaration.
    pub line: u32,
}

/// A method declaration: `name(formals) : ReturnType { body }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub name: Symbol,
    /// Formal parameters, in declaration order.
    pub formals: Vec<Formal>,
    /// Declared return type (possibly `SELF_TYPE`).
    pub return_type: Symbol,
    /// Method body.
    pub body: Expression,
    /// Line of the declaration.
    pub line: u32,
}

/// A formal parameter: `name : Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formal {
    /// Parameter name.
    pub name: Symbol,
    /// Declared type.
    pub declared_type: Symbol,
    /// Line of the declaration.
    pub line: u32,
}

/// One branch of a case construct: `name : Type => body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseBranch {
    /// Identifier bound within the branch body.
    pub name: Symbol,
    /// Declared type of the branch.
    pub declared_type: Symbol,
    /// Branch body.
    pub body: Expression,
    /// Line of the branch.
    pub line: u32,
}

/// Arithmetic operators over `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    /// The operator's source spelling, for diagnostics.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// Ordering comparisons over `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
}

impl CompareOp {
    /// The operator's source spelling, for diagnostics.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// A Kite expression with its source line and inferred-type slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The expression form.
    pub kind: ExprKind,
    /// Source line of the expression.
    pub line: u32,
    /// Static type assigned by the annotation pass. `None` before the pass
    /// runs and, afterwards, only on [`ExprKind::NoOp`].
    pub inferred_type: Option<Symbol>,
}

impl Expression {
    /// Creates an expression with an empty type slot.
    #[must_use]
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Self {
            kind,
            line,
            inferred_type: None,
        }
    }

    /// Creates the no-op expression (absent initializer).
    #[must_use]
    pub fn no_op(line: u32) -> Self {
        Self::new(ExprKind::NoOp, line)
    }

    /// Returns true if this is the no-op expression.
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        matches!(self.kind, ExprKind::NoOp)
    }
}

/// The expression forms of Kite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// An integer literal.
    IntLiteral(i64),

    /// A boolean literal.
    BoolLiteral(bool),

    /// A string literal.
    StringLiteral(EcoString),

    /// An identifier reference (variable, formal, attribute, or `self`).
    Ident(Symbol),

    /// An assignment: `target <- value`.
    Assign {
        /// The identifier being assigned.
        target: Symbol,
        /// The value expression.
        value: Box<Expression>,
    },

    /// A dynamic dispatch: `receiver.method(args)`.
    Dispatch {
        /// The receiver expression.
        receiver: Box<Expression>,
        /// The method name.
        method: Symbol,
        /// Actual arguments, in order.
        args: Vec<Expression>,
    },

    /// A static dispatch: `receiver@Class.method(args)`.
    ///
    /// Resolution starts at `class` instead of the receiver's computed type.
    StaticDispatch {
        /// The receiver expression.
        receiver: Box<Expression>,
        /// The explicitly named class resolution starts from.
        class: Symbol,
        /// The method name.
        method: Symbol,
        /// Actual arguments, in order.
        args: Vec<Expression>,
    },

    /// A conditional: `if pred then t else e fi`.
    If {
        pred: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },

    /// A loop: `while pred loop body pool`.
    While {
        pred: Box<Expression>,
        body: Box<Expression>,
    },

    /// A case construct over the scrutinee's runtime class.
    Case {
        scrutinee: Box<Expression>,
        branches: Vec<CaseBranch>,
    },

    /// A sequential block; its value is the last expression's.
    Block { body: Vec<Expression> },

    /// A let binding: `let name : Type <- init in body`.
    ///
    /// An omitted initializer is the `NoOp` expression.
    Let {
        name: Symbol,
        declared_type: Symbol,
        init: Box<Expression>,
        body: Box<Expression>,
    },

    /// Integer arithmetic.
    Arith {
        op: ArithOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Integer ordering comparison.
    Compare {
        op: CompareOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Equality test.
    Eq {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Integer negation: `~expr`.
    Negate(Box<Expression>),

    /// Boolean complement: `not expr`.
    Not(Box<Expression>),

    /// Object allocation: `new Class`.
    New {
        /// The named class (possibly `SELF_TYPE`).
        class: Symbol,
    },

    /// Void test: `isvoid expr`.
    IsVoid(Box<Expression>),

    /// The absent expression (e.g. an omitted initializer). Never typed.
    NoOp,
}
