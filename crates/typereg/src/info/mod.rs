// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Element wrappers - the metadata object model built on top of the
//! native descriptor tables.
//!
//! # Architecture
//!
//! ```text
//! TypeRegistry (arena: TypeIdent -> Arc<TypeInfo>)
//! +-- TypeInfo
//! |   +-- fields:     name -> Arc<FieldInfo>       (lazy, memoized)
//! |   +-- properties: name -> Arc<PropertyInfo>    (lazy, memoized)
//! |   +-- methods:    name -> Vec<Arc<MethodInfo>> (overload vectors)
//! |   +-- base_types / generic shape / activator   (lazy)
//! +-- AssemblyInfo
//!     +-- types: loader-enumerated, cached once
//! ```
//!
//! Children reference their declaring container through the registry
//! arena by key, never through an owning edge; dereferencing a key
//! whose registry (or entry) is gone yields the stale-container
//! failure.

mod assembly;
mod field;
mod method;
mod property;
mod type_info;

pub use assembly::AssemblyInfo;
pub use field::FieldInfo;
pub use method::{MethodInfo, ParameterInfo};
pub use property::PropertyInfo;
pub use type_info::TypeInfo;

use crate::error::Result;
use crate::loader::DisplayInfo;
use crate::native::Annotation;
use crate::registry::TypeRegistry;
use std::sync::{Arc, Weak};

/// Declaring container of an element.
#[derive(Clone)]
pub enum Container {
    Type(Arc<TypeInfo>),
    Assembly(Arc<AssemblyInfo>),
}

/// A specialized wrapper produced by the factory chain.
#[derive(Clone)]
pub enum ElementItem {
    Type(Arc<TypeInfo>),
    Assembly(Arc<AssemblyInfo>),
    Field(Arc<FieldInfo>),
    Property(Arc<PropertyInfo>),
    Method(Arc<MethodInfo>),
    Parameter(Arc<ParameterInfo>),
}

/// Common surface of every element wrapper.
pub trait Element {
    /// Short name.
    fn name(&self) -> &str;

    /// Fully qualified name.
    fn full_name(&self) -> &str;

    /// Annotations carried by the native descriptor.
    fn annotations(&self) -> &[Annotation];

    /// Declaring container, resolved through the registry arena.
    ///
    /// `Ok(None)` for top-level elements; `StaleContainer` when the
    /// link exists but the registry (or its entry) is gone.
    fn declaring_container(&self) -> Result<Option<Container>>;

    /// Owning registry handle (non-owning).
    fn registry(&self) -> Weak<TypeRegistry>;

    /// Human-readable metadata from the registry's display provider,
    /// falling back to the element's own name.
    fn display_info(&self) -> DisplayInfo {
        if let Some(registry) = self.registry().upgrade() {
            if let Some(info) = registry.display_provider().display_for(self.full_name()) {
                return info;
            }
        }
        DisplayInfo::from_name(self.name())
    }
}
