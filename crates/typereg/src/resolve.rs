// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member resolution: the tagged member handle and count-based
//! overload disambiguation.

use crate::error::{Error, Result};
use crate::info::{Element, FieldInfo, MethodInfo, PropertyInfo};
use std::sync::Arc;

/// A resolved member of a type: field, property, or the full overload
/// set of a method name.
#[derive(Clone)]
pub enum Member {
    Field(Arc<FieldInfo>),
    Property(Arc<PropertyInfo>),
    Method(Vec<Arc<MethodInfo>>),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => field.name(),
            Self::Property(prop) => prop.name(),
            // Overload sets are never empty.
            Self::Method(overloads) => overloads[0].name(),
        }
    }

    pub fn as_field(&self) -> Option<&Arc<FieldInfo>> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&Arc<PropertyInfo>> {
        match self {
            Self::Property(prop) => Some(prop),
            _ => None,
        }
    }

    pub fn as_methods(&self) -> Option<&[Arc<MethodInfo>]> {
        match self {
            Self::Method(overloads) => Some(overloads),
            _ => None,
        }
    }

    /// The single method this member denotes, disambiguated by
    /// argument count when several overloads share the name.
    pub fn method_for_count(
        &self,
        argc: usize,
        type_name: &str,
    ) -> Result<Option<Arc<MethodInfo>>> {
        match self {
            Self::Method(overloads) => {
                Ok(pick_overload(overloads, argc, type_name, self.name())?.cloned())
            }
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(field) => write!(f, "Member::Field({})", field.full_name()),
            Self::Property(prop) => write!(f, "Member::Property({})", prop.full_name()),
            Self::Method(overloads) => {
                write!(f, "Member::Method({}, x{})", self.name(), overloads.len())
            }
        }
    }
}

/// Pick the overload for `argc` arguments.
///
/// A single candidate is returned unconditionally so its own arity
/// check can produce the precise error. Several count-compatible
/// candidates are ambiguous; none is `Ok(None)`.
pub(crate) fn pick_overload<'a>(
    candidates: &'a [Arc<MethodInfo>],
    argc: usize,
    type_name: &str,
    name: &str,
) -> Result<Option<&'a Arc<MethodInfo>>> {
    if candidates.len() == 1 {
        return Ok(Some(&candidates[0]));
    }
    let mut matching = candidates.iter().filter(|m| m.accepts_count(argc));
    let first = matching.next();
    if matching.next().is_some() {
        return Err(Error::AmbiguousMatch {
            type_name: type_name.to_string(),
            member: name.to_string(),
            candidates: candidates.iter().filter(|m| m.accepts_count(argc)).count(),
        });
    }
    Ok(first)
}
