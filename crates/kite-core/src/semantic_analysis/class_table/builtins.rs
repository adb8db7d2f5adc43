// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Built-in class definitions for the class table.
//!
//! The built-in classes (`Object`, `IO`, `Int`, `String`, `Bool`) form the
//! foundation of the Kite class hierarchy and are registered before any
//! user-defined class. Only their signatures live here — their behavior is
//! supplied by the runtime, so the table carries no bodies for them.

use std::collections::HashMap;

use camino::Utf8PathBuf;

use super::{ClassInfo, FeatureInfo, FormalInfo, MethodInfo};
use crate::identity::{Symbol, WellKnown};

/// Filename recorded for built-in declarations in diagnostics.
const BUILTIN_FILE: &str = "<builtin>";

fn builtin_method(name: Symbol, formals: Vec<FormalInfo>, return_type: Symbol) -> FeatureInfo {
    FeatureInfo::Method(MethodInfo {
        name,
        formals,
        return_type,
        line: 0,
    })
}

fn builtin_class(name: Symbol, parent: Option<Symbol>, features: Vec<FeatureInfo>) -> ClassInfo {
    ClassInfo {
        name,
        parent,
        filename: Utf8PathBuf::from(BUILTIN_FILE),
        line: 0,
        features,
    }
}

/// Returns all built-in class definitions, keyed by name.
pub(super) fn install(names: &WellKnown) -> HashMap<Symbol, ClassInfo> {
    let mut classes = HashMap::new();

    // Object — the universal root.
    //   abort() : Object
    //   type_name() : String
    //   copy() : SELF_TYPE
    classes.insert(
        names.object,
        builtin_class(
            names.object,
            None,
            vec![
                builtin_method(names.abort, vec![], names.object),
                builtin_method(names.type_name, vec![], names.string),
                builtin_method(names.copy, vec![], names.self_type),
            ],
        ),
    );

    // IO — console input/output.
    //   out_string(String) : SELF_TYPE
    //   out_int(Int) : SELF_TYPE
    //   in_string() : String
    //   in_int() : Int
    classes.insert(
        names.io,
        builtin_class(
            names.io,
            Some(names.object),
            vec![
                builtin_method(
                    names.out_string,
                    vec![FormalInfo {
                        name: names.arg,
                        declared_type: names.string,
                    }],
                    names.self_type,
                ),
                builtin_method(
                    names.out_int,
                    vec![FormalInfo {
                        name: names.arg,
                        declared_type: names.int,
                    }],
                    names.self_type,
                ),
                builtin_method(names.in_string, vec![], names.string),
                builtin_method(names.in_int, vec![], names.int),
            ],
        ),
    );

    // Int — boxed machine integers. No methods of its own.
    classes.insert(
        names.int,
        builtin_class(names.int, Some(names.object), vec![]),
    );

    // String — immutable character strings.
    //   length() : Int
    //   concat(String) : String
    //   substr(Int, Int) : String
    classes.insert(
        names.string,
        builtin_class(
            names.string,
            Some(names.object),
            vec![
                builtin_method(names.length, vec![], names.int),
                builtin_method(
                    names.concat,
                    vec![FormalInfo {
                        name: names.arg,
                        declared_type: names.string,
                    }],
                    names.string,
                ),
                builtin_method(
                    names.substr,
                    vec![
                        FormalInfo {
                            name: names.arg,
                            declared_type: names.int,
                        },
                        FormalInfo {
                            name: names.arg2,
                            declared_type: names.int,
                        },
                    ],
                    names.string,
                ),
            ],
        ),
    );

    // Bool — truth values. No methods of its own.
    classes.insert(
        names.bool_,
        builtin_class(names.bool_, Some(names.object), vec![]),
    );

    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Interner;

    #[test]
    fn every_builtin_except_object_has_a_parent() {
        let mut interner = Interner::new();
        let names = WellKnown::seed(&mut interner);
        let classes = install(&names);

        assert_eq!(classes.len(), 5);
        assert!(classes[&names.object].parent.is_none());
        for name in [names.io, names.int, names.string, names.bool_] {
            assert_eq!(classes[&name].parent, Some(names.object));
        }
    }

    #[test]
    fn string_interface_signatures() {
        let mut interner = Interner::new();
        let names = WellKnown::seed(&mut interner);
        let classes = install(&names);

        let string = &classes[&names.string];
        let substr = string.methods().find(|m| m.name == names.substr).unwrap();
        assert_eq!(substr.formals.len(), 2);
        assert_eq!(substr.return_type, names.string);

        // Built-in declarations carry the sentinel filename.
        assert_eq!(string.filename.as_str(), BUILTIN_FILE);
    }

    #[test]
    fn primitive_classes_declare_no_members() {
        let mut interner = Interner::new();
        let names = WellKnown::seed(&mut interner);
        let classes = install(&names);

        assert!(classes[&names.int].features.is_empty());
        assert!(classes[&names.bool_].features.is_empty());
    }
}
