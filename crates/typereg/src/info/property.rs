// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property wrapper with compiled-accessor caching.
//!
//! Access attempts the compiled (direct delegate) path first when the
//! descriptor carries a compile hook and the registry enables fast
//! accessors. A failing hook caches the reflective route so the
//! failure is attempted only once per wrapper.

use crate::error::{Error, Result};
use crate::info::{Container, Element, TypeInfo};
use crate::native::{Annotation, CompiledAccessor, NativeProperty, NativeType};
use crate::registry::TypeRegistry;
use crate::value::Value;
use std::any::Any;
use std::sync::{Arc, OnceLock, Weak};

/// Resolved access route, decided once per wrapper.
enum AccessorPath {
    Compiled(CompiledAccessor),
    Reflective,
}

/// Wrapper around a native property descriptor.
pub struct PropertyInfo {
    declaring: Arc<NativeType>,
    index: usize,
    full_name: Arc<str>,
    registry: Weak<TypeRegistry>,
    accessor: OnceLock<AccessorPath>,
}

impl PropertyInfo {
    /// Wrap property `index` of `declaring`.
    pub fn new(declaring: Arc<NativeType>, index: usize, registry: Weak<TypeRegistry>) -> Self {
        let full_name = Arc::from(format!(
            "{}.{}",
            declaring.full_name, declaring.properties[index].name
        ));
        Self {
            declaring,
            index,
            full_name,
            registry,
            accessor: OnceLock::new(),
        }
    }

    fn native(&self) -> &NativeProperty {
        &self.declaring.properties[self.index]
    }

    pub fn can_read(&self) -> bool {
        self.native().get.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.native().set.is_some()
    }

    /// The property's value type, resolved through the registry.
    pub fn value_type(&self) -> Result<Arc<TypeInfo>> {
        let registry = self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.full_name.to_string(),
        })?;
        Ok(registry.resolve_ref(&self.native().value_type, &self.declaring))
    }

    fn accessor_path(&self) -> &AccessorPath {
        self.accessor.get_or_init(|| {
            let fast = self
                .registry
                .upgrade()
                .map(|r| r.config().fast_accessors)
                .unwrap_or(true);
            match (&self.native().compile, fast) {
                (Some(compile), true) => match compile() {
                    Ok(accessor) => AccessorPath::Compiled(accessor),
                    Err(err) => {
                        log::debug!(
                            "[PropertyInfo] Accessor compile failed for '{}', using reflective route: {}",
                            self.full_name,
                            err
                        );
                        AccessorPath::Reflective
                    }
                },
                _ => AccessorPath::Reflective,
            }
        })
    }

    /// Whether access goes through a compiled direct delegate.
    pub fn uses_compiled_accessor(&self) -> bool {
        matches!(self.accessor_path(), AccessorPath::Compiled(_))
    }

    /// Read the property from `instance`.
    pub fn get_value(&self, instance: &dyn Any) -> Result<Value> {
        if let AccessorPath::Compiled(accessor) = self.accessor_path() {
            if let Some(get) = &accessor.get {
                return get(instance);
            }
        }
        let get = self.native().get.as_ref().ok_or_else(|| Error::NotReadable {
            type_name: self.declaring.full_name.to_string(),
            member: self.native().name.to_string(),
        })?;
        get(instance)
    }

    /// Write the property on `instance`.
    pub fn set_value(&self, instance: &mut dyn Any, value: Value) -> Result<()> {
        if let AccessorPath::Compiled(accessor) = self.accessor_path() {
            if let Some(set) = &accessor.set {
                return set(instance, value);
            }
        }
        let set = self.native().set.as_ref().ok_or_else(|| Error::NotWritable {
            type_name: self.declaring.full_name.to_string(),
            member: self.native().name.to_string(),
        })?;
        set(instance, value)
    }
}

impl Element for PropertyInfo {
    fn name(&self) -> &str {
        &self.native().name
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn annotations(&self) -> &[Annotation] {
        &self.native().annotations
    }

    fn declaring_container(&self) -> Result<Option<Container>> {
        let registry = self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.full_name.to_string(),
        })?;
        let declaring =
            registry
                .cached_type(&self.declaring.ident)
                .ok_or_else(|| Error::StaleContainer {
                    element: self.full_name.to_string(),
                })?;
        Ok(Some(Container::Type(declaring)))
    }

    fn registry(&self) -> Weak<TypeRegistry> {
        self.registry.clone()
    }
}

impl std::fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("full_name", &self.full_name)
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .field("compiled", &self.accessor.get().map(|p| matches!(p, AccessorPath::Compiled(_))))
            .finish()
    }
}
