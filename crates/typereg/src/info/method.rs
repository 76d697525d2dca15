// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Method and parameter wrappers.

use crate::error::{Error, Result};
use crate::info::{Container, Element, ElementItem, TypeInfo};
use crate::native::{
    Annotation, NativeElement, NativeMethod, NativeType, TypeIdent, TypeRef,
};
use crate::registry::TypeRegistry;
use crate::value::Value;
use std::any::Any;
use std::sync::{Arc, OnceLock, Weak};

/// Wrapper around a native method descriptor.
pub struct MethodInfo {
    declaring: Arc<NativeType>,
    index: usize,
    full_name: Arc<str>,
    registry: Weak<TypeRegistry>,
    parameters: OnceLock<Vec<Arc<ParameterInfo>>>,
}

impl MethodInfo {
    /// Wrap method `index` of `declaring`.
    pub fn new(declaring: Arc<NativeType>, index: usize, registry: Weak<TypeRegistry>) -> Self {
        let full_name = Arc::from(format!(
            "{}.{}",
            declaring.full_name, declaring.methods[index].name
        ));
        Self {
            declaring,
            index,
            full_name,
            registry,
            parameters: OnceLock::new(),
        }
    }

    fn native(&self) -> &NativeMethod {
        &self.declaring.methods[self.index]
    }

    /// The method's return type, resolved through the registry.
    pub fn return_type(&self) -> Result<Arc<TypeInfo>> {
        let registry = self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.full_name.to_string(),
        })?;
        Ok(registry.resolve_ref(&self.native().return_type, &self.declaring))
    }

    /// Parameter wrappers, built once through the factory chain.
    pub fn parameters(&self) -> &[Arc<ParameterInfo>] {
        self.parameters.get_or_init(|| {
            let registry = self.registry.upgrade();
            (0..self.native().params.len())
                .map(|param_index| {
                    registry
                        .as_ref()
                        .and_then(|r| {
                            r.try_create_element_info(&NativeElement::Parameter {
                                declaring: self.declaring.clone(),
                                method: self.index,
                                index: param_index,
                            })
                        })
                        .and_then(|item| match item {
                            ElementItem::Parameter(param) => Some(param),
                            _ => None,
                        })
                        .unwrap_or_else(|| {
                            Arc::new(ParameterInfo::new(
                                &self.declaring,
                                self.index,
                                param_index,
                                self.registry.clone(),
                            ))
                        })
                })
                .collect()
        })
    }

    /// Whether `count` arguments satisfy this method's arity.
    pub fn accepts_count(&self, count: usize) -> bool {
        let native = self.native();
        count >= native.required_params() && count <= native.params.len()
    }

    /// Invoke on `instance`, checking declared arity first. Missing
    /// optional arguments are padded with parameter defaults.
    pub fn invoke(&self, instance: &mut dyn Any, args: &[Value]) -> Result<Value> {
        let native = self.native();
        if !self.accepts_count(args.len()) {
            return Err(Error::ParameterCount {
                member: self.full_name.to_string(),
                expected: native.params.len(),
                got: args.len(),
            });
        }
        if args.len() == native.params.len() {
            return (native.invoke)(instance, args);
        }
        let mut padded = args.to_vec();
        for param in &native.params[args.len()..] {
            padded.push(param.default.clone().unwrap_or(Value::Null));
        }
        (native.invoke)(instance, &padded)
    }

    /// Like [`invoke`](Self::invoke), but an arity mismatch is
    /// `Ok(None)` instead of an error.
    pub fn try_invoke(&self, instance: &mut dyn Any, args: &[Value]) -> Result<Option<Value>> {
        if !self.accepts_count(args.len()) {
            return Ok(None);
        }
        self.invoke(instance, args).map(Some)
    }
}

impl Element for MethodInfo {
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

impl std::fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodInfo")
            .field("full_name", &self.full_name)
            .field("params", &self.native().params.len())
            .finish()
    }
}

/// Wrapper around a native parameter descriptor.
///
/// Parameters reference their declaring container by registry key
/// only; a `ParameterInfo` never keeps its declaring method or type
/// wrapper alive.
pub struct ParameterInfo {
    name: Arc<str>,
    full_name: Arc<str>,
    position: usize,
    optional: bool,
    is_in: bool,
    is_out: bool,
    value_type: TypeRef,
    annotations: Vec<Annotation>,
    declaring_ident: TypeIdent,
    registry: Weak<TypeRegistry>,
}

impl ParameterInfo {
    /// Wrap parameter `param_index` of method `method_index`.
    ///
    /// Generic-parameter references are normalized to named
    /// placeholders at construction so later resolution needs no
    /// declaring context.
    pub fn new(
        declaring: &Arc<NativeType>,
        method_index: usize,
        param_index: usize,
        registry: Weak<TypeRegistry>,
    ) -> Self {
        let method = &declaring.methods[method_index];
        let param = &method.params[param_index];
        let value_type = match &param.value_type {
            TypeRef::GenericParam(i) => {
                let placeholder = declaring
                    .generic_params
                    .get(*i)
                    .cloned()
                    .unwrap_or_else(|| Arc::from("?"));
                TypeRef::Ident(TypeIdent::Named(placeholder))
            }
            concrete => concrete.clone(),
        };
        Self {
            name: param.name.clone(),
            full_name: Arc::from(format!(
                "{}.{}#{}",
                declaring.full_name, method.name, param.name
            )),
            position: param.position,
            optional: param.optional,
            is_in: param.is_in,
            is_out: param.is_out,
            value_type,
            annotations: Vec::new(),
            declaring_ident: declaring.ident.clone(),
            registry,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_in(&self) -> bool {
        self.is_in
    }

    pub fn is_out(&self) -> bool {
        self.is_out
    }

    /// The parameter's value type, resolved through the registry.
    pub fn value_type(&self) -> Result<Arc<TypeInfo>> {
        let registry = self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.full_name.to_string(),
        })?;
        match &self.value_type {
            TypeRef::Ident(ident) => Ok(registry.resolve_ident(ident)),
            // Normalized away in the constructor.
            TypeRef::GenericParam(_) => Ok(registry.resolve_ident(&TypeIdent::named("?"))),
        }
    }
}

impl Element for ParameterInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn declaring_container(&self) -> Result<Option<Container>> {
        let registry = self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.full_name.to_string(),
        })?;
        let declaring =
            registry
                .cached_type(&self.declaring_ident)
                .ok_or_else(|| Error::StaleContainer {
                    element: self.full_name.to_string(),
                })?;
        Ok(Some(Container::Type(declaring)))
    }

    fn registry(&self) -> Weak<TypeRegistry> {
        self.registry.clone()
    }
}

impl std::fmt::Debug for ParameterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterInfo")
            .field("full_name", &self.full_name)
            .field("position", &self.position)
            .field("optional", &self.optional)
            .finish()
    }
}
