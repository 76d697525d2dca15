// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Assembly wrapper.

use crate::error::{Error, Result};
use crate::info::{Container, Element, TypeInfo};
use crate::native::{Annotation, NativeAssembly};
use crate::registry::TypeRegistry;
use std::sync::{Arc, OnceLock, Weak};

/// Wrapper around a native assembly descriptor.
///
/// The exported-type list is materialized once per assembly wrapper;
/// providers that fail to load are skipped by the registry's type
/// loader rather than failing the whole assembly.
pub struct AssemblyInfo {
    native: Arc<NativeAssembly>,
    registry: Weak<TypeRegistry>,
    exported: OnceLock<Vec<Arc<TypeInfo>>>,
}

impl AssemblyInfo {
    pub fn new(native: Arc<NativeAssembly>, registry: Weak<TypeRegistry>) -> Self {
        Self {
            native,
            registry,
            exported: OnceLock::new(),
        }
    }

    pub fn native(&self) -> &Arc<NativeAssembly> {
        &self.native
    }

    /// Type wrappers for every loadable exported type.
    pub fn exported_types(&self) -> Result<&[Arc<TypeInfo>]> {
        let registry = self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.native.full_name.to_string(),
        })?;
        Ok(self.exported.get_or_init(|| {
            registry
                .type_loader()
                .loadable_exported_types(&self.native)
                .into_iter()
                .map(|native| registry.type_info_from_native(native))
                .collect()
        }))
    }

    /// Find an exported type by simple name.
    pub fn exported_type(&self, name: &str) -> Result<Option<Arc<TypeInfo>>> {
        Ok(self
            .exported_types()?
            .iter()
            .find(|t| t.name() == name)
            .cloned())
    }
}

impl Element for AssemblyInfo {
    fn name(&self) -> &str {
        &self.native.name
    }

    fn full_name(&self) -> &str {
        &self.native.full_name
    }

    fn annotations(&self) -> &[Annotation] {
        &self.native.annotations
    }

    fn declaring_container(&self) -> Result<Option<Container>> {
        // Assemblies are roots of the containment graph.
        Ok(None)
    }

    fn registry(&self) -> Weak<TypeRegistry> {
        self.registry.clone()
    }
}

impl std::fmt::Debug for AssemblyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyInfo")
            .field("full_name", &self.native.full_name)
            .finish()
    }
}
