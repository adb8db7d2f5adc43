// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis for Kite.
//!
//! This module performs the type-checking phase on a parsed AST:
//! - Inheritance-graph validation (via the `class_table` module)
//! - Scoped name binding with shadowing (via the `scope` module)
//! - Nominal subtyping and least-upper-bound queries (via `subtype`)
//! - Per-expression type annotation with continue-on-error diagnostics
//!   (via `type_checker`)
//!
//! The pass consumes a [`Program`] plus the identifier-interning service
//! and produces a fully type-annotated tree and a diagnostic stream; it
//! emits no code.
//!
//! # Failure model
//!
//! Two tiers. A [`StructuralFault`] (reserved class redefined, unresolved
//! parent, inheritance cycle) invalidates ancestor walks, so [`check_program`]
//! aborts and returns it as an `Err` — no partially-annotated tree escapes.
//! Everything else is a recoverable [`Diagnostic`](crate::diagnostics::Diagnostic):
//! the offending expression is defaulted to a safe type and the walk
//! continues, so one error never hides another. The pass succeeds only if
//! no error-severity diagnostic was recorded.
//!
//! # Example
//!
//! ```
//! use kite_core::ast::{ClassDecl, Program};
//! use kite_core::identity::{Interner, WellKnown};
//! use kite_core::semantic_analysis::check_program;
//!
//! let mut interner = Interner::new();
//! let names = WellKnown::seed(&mut interner);
//! let main = interner.intern("Main");
//!
//! let mut program = Program::new(vec![ClassDecl::new(
//!     main,
//!     Some(names.io),
//!     "main.kite",
//!     vec![],
//!     1,
//! )]);
//!
//! let outcome = check_program(&mut program, &interner, &names).unwrap();
//! assert!(outcome.passed());
//! ```

use std::io;

use tracing::debug;

use crate::ast::Program;
use crate::diagnostics::DiagnosticSink;
use crate::identity::{Interner, WellKnown};

pub mod class_table;
pub mod error;
pub mod scope;
pub mod subtype;
pub mod type_checker;

mod string_utils;

#[cfg(test)]
mod property_tests;

pub use class_table::ClassTable;
pub use error::StructuralFault;
pub use type_checker::TypeChecker;

/// Result of a completed annotation pass.
///
/// The AST itself is annotated in place; this carries the diagnostic
/// stream and the overall success signal.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    /// Diagnostics in discovery order.
    pub diagnostics: DiagnosticSink,
}

impl CheckOutcome {
    /// Returns true if no error-severity diagnostic was recorded — the
    /// signal for the pipeline to proceed to later stages.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.diagnostics.is_clean()
    }

    /// Renders the diagnostic stream to an external sink (e.g. stderr).
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the writer.
    pub fn write_diagnostics(&self, out: &mut impl io::Write) -> io::Result<()> {
        self.diagnostics.write_to(out)
    }
}

/// Type-checks a program, annotating every expression in place.
///
/// Builds and validates the class table, then runs the annotation visitor
/// over every class. The returned [`CheckOutcome`] holds the recoverable
/// diagnostics; [`CheckOutcome::passed`] is the go/no-go signal.
///
/// # Errors
///
/// Returns a [`StructuralFault`] when the inheritance hierarchy itself is
/// invalid; no annotation is attempted in that case.
pub fn check_program(
    program: &mut Program,
    interner: &Interner,
    names: &WellKnown,
) -> Result<CheckOutcome, StructuralFault> {
    let table = ClassTable::build(&program.classes, names, interner)?;
    Ok(check_program_with_table(program, &table, interner, names))
}

/// Type-checks a program against a pre-built class table.
///
/// The table is queried read-only, so callers may share one table across
/// multiple annotation runs.
#[must_use]
pub fn check_program_with_table(
    program: &mut Program,
    table: &ClassTable,
    interner: &Interner,
    names: &WellKnown,
) -> CheckOutcome {
    let mut checker = TypeChecker::new(table, interner, names);
    checker.check_program(program);
    let diagnostics = checker.into_sink();
    debug!(errors = diagnostics.error_count(), "annotation pass finished");
    CheckOutcome { diagnostics }
}
