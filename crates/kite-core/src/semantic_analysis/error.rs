// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Structural faults raised while building the class table.
//!
//! Unlike the recoverable diagnostics in [`crate::diagnostics`], a
//! structural fault invalidates assumptions the rest of the pass depends on
//! (most importantly termination of ancestor-chain walks), so the whole pass
//! aborts rather than producing a partially-annotated, untrustworthy tree.
//! Faults integrate with [`miette`] for reporting.

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

/// An unrecoverable fault in the class structure of a program.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum StructuralFault {
    /// A class name was registered twice.
    #[error("class `{class}` is defined more than once")]
    DuplicateClass {
        /// The redeclared class name.
        class: EcoString,
    },

    /// A user class redefines a built-in class or the `SELF_TYPE` marker.
    #[error("redefinition of built-in class `{class}` is not allowed")]
    ReservedClass {
        /// The reserved name.
        class: EcoString,
    },

    /// A class inherits from a type that admits no subclasses.
    #[error("class `{class}` cannot inherit from `{parent}`")]
    #[diagnostic(help("`SELF_TYPE`, `Int`, `String`, and `Bool` cannot be inherited from"))]
    UninheritableParent {
        /// The offending class.
        class: EcoString,
        /// The forbidden parent.
        parent: EcoString,
    },

    /// A class names a parent that is not declared anywhere.
    #[error("class `{class}` inherits from undeclared class `{parent}`")]
    UnresolvedParent {
        /// The offending class.
        class: EcoString,
        /// The unresolved parent name.
        parent: EcoString,
    },

    /// The parent chain of a class revisits a class already on the chain.
    #[error("inheritance cycle involving class `{class}`")]
    InheritanceCycle {
        /// A class on the cycle.
        class: EcoString,
    },

    /// A query path was reached without a built class table.
    ///
    /// Unreachable by construction — [`ClassTable::build`] is the only way
    /// to obtain a table — but kept so the fault taxonomy covers the whole
    /// failure surface of the pass.
    ///
    /// [`ClassTable::build`]: crate::semantic_analysis::ClassTable::build
    #[error("class table has not been initialized")]
    TableNotBuilt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_messages_name_the_classes() {
        let fault = StructuralFault::UnresolvedParent {
            class: "Counter".into(),
            parent: "Actor".into(),
        };
        assert_eq!(
            fault.to_string(),
            "class `Counter` inherits from undeclared class `Actor`"
        );

        let fault = StructuralFault::InheritanceCycle {
            class: "A".into(),
        };
        assert_eq!(fault.to_string(), "inheritance cycle involving class `A`");
    }
}
