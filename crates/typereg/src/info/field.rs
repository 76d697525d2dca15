// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field wrapper.

use crate::error::{Error, Result};
use crate::info::{Container, Element, TypeInfo};
use crate::native::{Annotation, NativeField, NativeType};
use crate::registry::TypeRegistry;
use crate::value::Value;
use std::any::Any;
use std::sync::{Arc, Weak};

/// Wrapper around a native field descriptor.
pub struct FieldInfo {
    declaring: Arc<NativeType>,
    index: usize,
    full_name: Arc<str>,
    registry: Weak<TypeRegistry>,
}

impl FieldInfo {
    /// Wrap field `index` of `declaring`. The index must address an
    /// entry of the declaring descriptor's field table.
    pub fn new(declaring: Arc<NativeType>, index: usize, registry: Weak<TypeRegistry>) -> Self {
        let full_name = Arc::from(format!(
            "{}.{}",
            declaring.full_name, declaring.fields[index].name
        ));
        Self {
            declaring,
            index,
            full_name,
            registry,
        }
    }

    fn native(&self) -> &NativeField {
        &self.declaring.fields[self.index]
    }

    pub fn can_read(&self) -> bool {
        self.native().get.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.native().set.is_some()
    }

    /// The field's value type, resolved through the registry.
    pub fn value_type(&self) -> Result<Arc<TypeInfo>> {
        let registry = self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.full_name.to_string(),
        })?;
        Ok(registry.resolve_ref(&self.native().value_type, &self.declaring))
    }

    /// Read the field from `instance`.
    pub fn get_value(&self, instance: &dyn Any) -> Result<Value> {
        let get = self.native().get.as_ref().ok_or_else(|| Error::NotReadable {
            type_name: self.declaring.full_name.to_string(),
            member: self.native().name.to_string(),
        })?;
        get(instance)
    }

    /// Write the field on `instance`.
    pub fn set_value(&self, instance: &mut dyn Any, value: Value) -> Result<()> {
        let set = self.native().set.as_ref().ok_or_else(|| Error::NotWritable {
            type_name: self.declaring.full_name.to_string(),
            member: self.native().name.to_string(),
        })?;
        set(instance, value)
    }
}

impl Element for FieldInfo {
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

impl std::fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldInfo")
            .field("full_name", &self.full_name)
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .finish()
    }
}
