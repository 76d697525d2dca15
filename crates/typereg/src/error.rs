// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for registry, member-access and activation failures.
//!
//! All failures are synchronous and local: the registry never retries,
//! never logs on the error path, and never degrades on the caller's
//! behalf. Whether a missing or ambiguous member is fatal is the
//! caller's decision.

/// Errors returned by typereg operations.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Member Resolution
    // ========================================================================
    /// A named field/property/method does not exist on the type.
    MemberNotFound { type_name: String, member: String },
    /// More than one candidate member satisfies a name (or a
    /// name + argument-count pair for overloaded methods).
    AmbiguousMatch {
        type_name: String,
        member: String,
        candidates: usize,
    },

    // ========================================================================
    // Activation
    // ========================================================================
    /// The type declares no constructors.
    NotConstructible { type_name: String },

    // ========================================================================
    // Container Links
    // ========================================================================
    /// A weakly-referenced declaring container (registry arena entry)
    /// was released before being dereferenced.
    StaleContainer { element: String },

    // ========================================================================
    // Accessor Direction
    // ========================================================================
    /// The property/field does not support reads.
    NotReadable { type_name: String, member: String },
    /// The property/field does not support writes.
    NotWritable { type_name: String, member: String },

    // ========================================================================
    // Values & Invocation
    // ========================================================================
    /// A dynamic value (or instance) had the wrong runtime type.
    TypeMismatch { expected: String, got: String },
    /// An invocation received the wrong number of arguments.
    ParameterCount {
        member: String,
        expected: usize,
        got: usize,
    },
    /// A host-supplied closure reported a failure.
    Invocation { member: String, message: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MemberNotFound { type_name, member } => {
                write!(f, "Member not found: {}.{}", type_name, member)
            }
            Error::AmbiguousMatch {
                type_name,
                member,
                candidates,
            } => write!(
                f,
                "Ambiguous match: {}.{} has {} candidates",
                type_name, member, candidates
            ),
            Error::NotConstructible { type_name } => {
                write!(f, "Type {} declares no constructors", type_name)
            }
            Error::StaleContainer { element } => {
                write!(f, "Declaring container of {} is no longer alive", element)
            }
            Error::NotReadable { type_name, member } => {
                write!(f, "{}.{} is not readable", type_name, member)
            }
            Error::NotWritable { type_name, member } => {
                write!(f, "{}.{} is not writable", type_name, member)
            }
            Error::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Error::ParameterCount {
                member,
                expected,
                got,
            } => write!(
                f,
                "{} expects {} argument(s), got {}",
                member, expected, got
            ),
            Error::Invocation { member, message } => {
                write!(f, "Invocation of {} failed: {}", member, message)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::MemberNotFound {
            type_name: "geom.Point".into(),
            member: "z".into(),
        };
        assert_eq!(err.to_string(), "Member not found: geom.Point.z");

        let err = Error::AmbiguousMatch {
            type_name: "demo.Calc".into(),
            member: "add".into(),
            candidates: 2,
        };
        assert!(err.to_string().contains("2 candidates"));

        let err = Error::ParameterCount {
            member: "demo.Calc.add".into(),
            expected: 2,
            got: 3,
        };
        assert_eq!(err.to_string(), "demo.Calc.add expects 2 argument(s), got 3");
    }
}
