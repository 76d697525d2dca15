// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance activation over native constructor tables.

use crate::error::{Error, Result};
use crate::native::{NativeConstructor, NativeType};
use crate::value::Value;
use std::any::Any;

/// Activation strategy, bound once per type wrapper.
pub(crate) enum Activator {
    /// No constructors registered (interfaces, enums, synthesized
    /// closed generics).
    NotConstructible,
    /// Exactly one constructor, pre-bound.
    Single(NativeConstructor),
    /// Several constructors, resolved by argument shape at call time.
    ByShape(Vec<NativeConstructor>),
}

impl Activator {
    pub(crate) fn for_type(native: &NativeType) -> Self {
        match native.constructors.len() {
            0 => Self::NotConstructible,
            1 => Self::Single(native.constructors[0].clone()),
            _ => Self::ByShape(native.constructors.clone()),
        }
    }

    pub(crate) fn create(&self, type_name: &str, args: &[Value]) -> Result<Box<dyn Any>> {
        match self {
            Self::NotConstructible => Err(Error::NotConstructible {
                type_name: type_name.to_string(),
            }),
            Self::Single(ctor) => {
                if !ctor.accepts_count(args.len()) {
                    return Err(Error::ParameterCount {
                        member: format!("{}::new", type_name),
                        expected: ctor.params.len(),
                        got: args.len(),
                    });
                }
                construct(ctor, args)
            }
            Self::ByShape(ctors) => {
                let mut last_err = None;
                let mut any_count_match = false;
                // Declaration order; the first constructor accepting
                // the values wins.
                for ctor in ctors {
                    if !ctor.accepts_count(args.len()) {
                        continue;
                    }
                    any_count_match = true;
                    match construct(ctor, args) {
                        Ok(instance) => return Ok(instance),
                        Err(err) => last_err = Some(err),
                    }
                }
                if !any_count_match {
                    return Err(Error::ParameterCount {
                        member: format!("{}::new", type_name),
                        expected: ctors[0].params.len(),
                        got: args.len(),
                    });
                }
                Err(last_err.unwrap_or(Error::NotConstructible {
                    type_name: type_name.to_string(),
                }))
            }
        }
    }
}

/// Run one constructor, padding omitted optional arguments with their
/// declared defaults.
fn construct(ctor: &NativeConstructor, args: &[Value]) -> Result<Box<dyn Any>> {
    if args.len() == ctor.params.len() {
        return (ctor.construct)(args);
    }
    let mut padded = args.to_vec();
    for param in &ctor.params[args.len()..] {
        padded.push(param.default.clone().unwrap_or(Value::Null));
    }
    (ctor.construct)(&padded)
}
