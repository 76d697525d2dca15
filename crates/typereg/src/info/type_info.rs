// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type wrapper: lazy member maps, generic shape and activation.

use crate::activate::Activator;
use crate::error::{Error, Result};
use crate::info::{
    Container, Element, ElementItem, FieldInfo, MethodInfo, PropertyInfo,
};
use crate::native::{
    Annotation, NativeElement, NativeType, TypeIdent, TypeKind, TypeRef,
};
use crate::registry::TypeRegistry;
use crate::resolve::{pick_overload, Member};
use crate::value::Value;
use std::any::Any;
use std::sync::{Arc, OnceLock, Weak};

/// Wrapper around a native type descriptor.
///
/// Member lists, base types, generic links, the default value and the
/// activator are each computed once on first use. Member lists include
/// inherited members; duplicate names keep the first encountered
/// (derived shadows base).
pub struct TypeInfo {
    native: Arc<NativeType>,
    registry: Weak<TypeRegistry>,
    base_types: OnceLock<Vec<Arc<TypeInfo>>>,
    fields: OnceLock<Vec<Arc<FieldInfo>>>,
    properties: OnceLock<Vec<Arc<PropertyInfo>>>,
    methods: OnceLock<Vec<Arc<MethodInfo>>>,
    generic_args: OnceLock<Vec<Arc<TypeInfo>>>,
    default_value: OnceLock<Option<Value>>,
    activator: OnceLock<Activator>,
}

impl TypeInfo {
    pub fn new(native: Arc<NativeType>, registry: Weak<TypeRegistry>) -> Self {
        Self {
            native,
            registry,
            base_types: OnceLock::new(),
            fields: OnceLock::new(),
            properties: OnceLock::new(),
            methods: OnceLock::new(),
            generic_args: OnceLock::new(),
            default_value: OnceLock::new(),
            activator: OnceLock::new(),
        }
    }

    /// The underlying native descriptor.
    pub fn native(&self) -> &Arc<NativeType> {
        &self.native
    }

    /// Stable identity key within the registry arena.
    pub fn ident(&self) -> &TypeIdent {
        &self.native.ident
    }

    pub fn kind(&self) -> TypeKind {
        self.native.kind
    }

    fn upgrade(&self) -> Result<Arc<TypeRegistry>> {
        self.registry.upgrade().ok_or_else(|| Error::StaleContainer {
            element: self.native.full_name.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Base types
    // ------------------------------------------------------------------

    /// Base class (if any) followed by declared interfaces, each
    /// resolved through the registry so wrappers are shared.
    pub fn base_types(&self) -> &[Arc<TypeInfo>] {
        self.base_types.get_or_init(|| {
            let Some(registry) = self.registry.upgrade() else {
                return Vec::new();
            };
            let mut bases = Vec::new();
            if let Some(base) = &self.native.base {
                bases.push(registry.resolve_ref(base, &self.native));
            }
            for iface in &self.native.interfaces {
                bases.push(registry.resolve_ref(iface, &self.native));
            }
            bases
        })
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    /// All fields, own first, then inherited (first name wins).
    ///
    /// Only class ancestors contribute: interface bases declare
    /// contract shape without instance-bound access routes, so their
    /// members are never merged.
    pub fn fields(&self) -> &[Arc<FieldInfo>] {
        self.fields.get_or_init(|| {
            let registry = self.registry.upgrade();
            let mut out: Vec<Arc<FieldInfo>> = Vec::with_capacity(self.native.fields.len());
            for index in 0..self.native.fields.len() {
                let built = registry
                    .as_ref()
                    .and_then(|r| {
                        r.try_create_element_info(&NativeElement::Field {
                            declaring: self.native.clone(),
                            index,
                        })
                    })
                    .and_then(|item| match item {
                        ElementItem::Field(field) => Some(field),
                        _ => None,
                    })
                    .unwrap_or_else(|| {
                        Arc::new(FieldInfo::new(
                            self.native.clone(),
                            index,
                            self.registry.clone(),
                        ))
                    });
                out.push(built);
            }
            for base in self.base_types() {
                if base.kind() == TypeKind::Interface {
                    continue;
                }
                for inherited in base.fields() {
                    if !out.iter().any(|f| f.name() == inherited.name()) {
                        out.push(inherited.clone());
                    }
                }
            }
            out
        })
    }

    /// All properties, own first, then inherited (first name wins).
    /// Interface bases are excluded, as for [`fields`](Self::fields).
    pub fn properties(&self) -> &[Arc<PropertyInfo>] {
        self.properties.get_or_init(|| {
            let registry = self.registry.upgrade();
            let mut out: Vec<Arc<PropertyInfo>> =
                Vec::with_capacity(self.native.properties.len());
            for index in 0..self.native.properties.len() {
                let built = registry
                    .as_ref()
                    .and_then(|r| {
                        r.try_create_element_info(&NativeElement::Property {
                            declaring: self.native.clone(),
                            index,
                        })
                    })
                    .and_then(|item| match item {
                        ElementItem::Property(prop) => Some(prop),
                        _ => None,
                    })
                    .unwrap_or_else(|| {
                        Arc::new(PropertyInfo::new(
                            self.native.clone(),
                            index,
                            self.registry.clone(),
                        ))
                    });
                out.push(built);
            }
            for base in self.base_types() {
                if base.kind() == TypeKind::Interface {
                    continue;
                }
                for inherited in base.properties() {
                    if !out.iter().any(|p| p.name() == inherited.name()) {
                        out.push(inherited.clone());
                    }
                }
            }
            out
        })
    }

    /// All methods in declaration order, own first, then inherited.
    /// Overloads share a name; an inherited name already present on
    /// the derived type is shadowed entirely. Interface bases are
    /// excluded, as for [`fields`](Self::fields).
    pub fn methods(&self) -> &[Arc<MethodInfo>] {
        self.methods.get_or_init(|| {
            let registry = self.registry.upgrade();
            let mut out: Vec<Arc<MethodInfo>> = Vec::with_capacity(self.native.methods.len());
            for index in 0..self.native.methods.len() {
                let built = registry
                    .as_ref()
                    .and_then(|r| {
                        r.try_create_element_info(&NativeElement::Method {
                            declaring: self.native.clone(),
                            index,
                        })
                    })
                    .and_then(|item| match item {
                        ElementItem::Method(method) => Some(method),
                        _ => None,
                    })
                    .unwrap_or_else(|| {
                        Arc::new(MethodInfo::new(
                            self.native.clone(),
                            index,
                            self.registry.clone(),
                        ))
                    });
                out.push(built);
            }
            let own_names: Vec<&str> = self.native.methods.iter().map(|m| &*m.name).collect();
            for base in self.base_types() {
                if base.kind() == TypeKind::Interface {
                    continue;
                }
                for inherited in base.methods() {
                    let shadowed = own_names.contains(&inherited.name())
                        || out
                            .iter()
                            .skip(self.native.methods.len())
                            .any(|m| m.name() == inherited.name());
                    if !shadowed {
                        out.push(inherited.clone());
                    }
                }
            }
            out
        })
    }

    pub fn field(&self, name: &str) -> Option<&Arc<FieldInfo>> {
        self.fields().iter().find(|f| f.name() == name)
    }

    pub fn property(&self, name: &str) -> Option<&Arc<PropertyInfo>> {
        self.properties().iter().find(|p| p.name() == name)
    }

    /// Every overload carrying `name`.
    pub fn method_overloads(&self, name: &str) -> Vec<Arc<MethodInfo>> {
        self.methods()
            .iter()
            .filter(|m| m.name() == name)
            .cloned()
            .collect()
    }

    /// Resolve `name` to a member, field before property before method.
    pub fn get_member(&self, name: &str) -> Option<Member> {
        if let Some(field) = self.field(name) {
            return Some(Member::Field(field.clone()));
        }
        if let Some(prop) = self.property(name) {
            return Some(Member::Property(prop.clone()));
        }
        let overloads = self.method_overloads(name);
        if !overloads.is_empty() {
            return Some(Member::Method(overloads));
        }
        None
    }

    /// Like [`get_member`](Self::get_member) but a missing name is an
    /// error, and a name shared by several overloads has no unique
    /// pick, so it is ambiguous.
    pub fn get_member_required(&self, name: &str) -> Result<Member> {
        match self.get_member(name) {
            Some(Member::Method(overloads)) if overloads.len() > 1 => {
                Err(Error::AmbiguousMatch {
                    type_name: self.native.full_name.to_string(),
                    member: name.to_string(),
                    candidates: overloads.len(),
                })
            }
            Some(member) => Ok(member),
            None => Err(Error::MemberNotFound {
                type_name: self.native.full_name.to_string(),
                member: name.to_string(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Value access
    // ------------------------------------------------------------------

    /// Read the named member from `instance`, field before property
    /// (the same order [`get_member`](Self::get_member) uses).
    pub fn get_value(&self, instance: &dyn Any, name: &str) -> Result<Value> {
        match self.field(name) {
            Some(field) => field.get_value(instance),
            None => match self.property(name) {
                Some(prop) => prop.get_value(instance),
                None => Err(Error::MemberNotFound {
                    type_name: self.native.full_name.to_string(),
                    member: name.to_string(),
                }),
            },
        }
    }

    /// Read the named property, `Ok(None)` when the name is unknown.
    /// Access and type errors still surface.
    pub fn try_get_value(&self, instance: &dyn Any, name: &str) -> Result<Option<Value>> {
        match self.get_value(instance, name) {
            Ok(value) => Ok(Some(value)),
            Err(Error::MemberNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Write the named member on `instance`, field before property.
    pub fn set_value(&self, instance: &mut dyn Any, name: &str, value: Value) -> Result<()> {
        match self.field(name) {
            Some(field) => field.set_value(instance, value),
            None => match self.property(name) {
                Some(prop) => prop.set_value(instance, value),
                None => Err(Error::MemberNotFound {
                    type_name: self.native.full_name.to_string(),
                    member: name.to_string(),
                }),
            },
        }
    }

    /// Write the named property, `Ok(false)` when the name is unknown.
    pub fn try_set_value(&self, instance: &mut dyn Any, name: &str, value: Value) -> Result<bool> {
        match self.set_value(instance, name, value) {
            Ok(()) => Ok(true),
            Err(Error::MemberNotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    // ------------------------------------------------------------------
    // Invocation
    // ------------------------------------------------------------------

    /// Invoke the named method, disambiguating overloads strictly by
    /// argument count.
    pub fn invoke(&self, instance: &mut dyn Any, name: &str, args: &[Value]) -> Result<Value> {
        let overloads = self.method_overloads(name);
        if overloads.is_empty() {
            return Err(Error::MemberNotFound {
                type_name: self.native.full_name.to_string(),
                member: name.to_string(),
            });
        }
        let picked = pick_overload(&overloads, args.len(), &self.native.full_name, name)?;
        match picked {
            Some(method) => method.invoke(instance, args),
            None => Err(Error::MemberNotFound {
                type_name: self.native.full_name.to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Like [`invoke`](Self::invoke), but a missing method or a
    /// count-incompatible argument list is `Ok(None)`. Ambiguity is
    /// still an error.
    pub fn try_invoke(
        &self,
        instance: &mut dyn Any,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>> {
        let overloads = self.method_overloads(name);
        if overloads.is_empty() {
            return Ok(None);
        }
        match pick_overload(&overloads, args.len(), &self.native.full_name, name)? {
            // The single-candidate pick skips the count filter, so
            // the method's own try variant does the softening.
            Some(method) => method.try_invoke(instance, args),
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// Create an instance from `args` through the cached activator.
    ///
    /// Zero constructors yield `NotConstructible`; a single one is
    /// pre-bound; several are resolved by argument shape at call time.
    pub fn create_instance(&self, args: &[Value]) -> Result<Box<dyn Any>> {
        self.activator
            .get_or_init(|| Activator::for_type(&self.native))
            .create(&self.native.full_name, args)
    }

    /// Memoized default value from the descriptor's producer.
    pub fn default_value(&self) -> Option<Value> {
        self.default_value
            .get_or_init(|| self.native.default_value.as_ref().map(|f| f()))
            .clone()
    }

    // ------------------------------------------------------------------
    // Generic shape
    // ------------------------------------------------------------------

    /// Whether this is an open generic definition.
    pub fn is_open_generic(&self) -> bool {
        self.native.is_open_generic()
    }

    /// Generic parameter names; non-empty only on open forms.
    pub fn generic_parameters(&self) -> &[Arc<str>] {
        &self.native.generic_params
    }

    /// Generic argument types; non-empty only on closed forms.
    pub fn generic_arguments(&self) -> &[Arc<TypeInfo>] {
        self.generic_args.get_or_init(|| {
            let Some(registry) = self.registry.upgrade() else {
                return Vec::new();
            };
            self.native
                .generic_args
                .iter()
                .map(|arg| registry.resolve_ref(arg, &self.native))
                .collect()
        })
    }

    /// Open definition this closed form was produced from, when any.
    pub fn generic_definition(&self) -> Result<Option<Arc<TypeInfo>>> {
        match &self.native.generic_definition {
            Some(ident) => Ok(Some(self.upgrade()?.resolve_ident(ident))),
            None => Ok(None),
        }
    }

    /// Close this open definition with `args`.
    ///
    /// A registered closed instantiation with the matching full name
    /// wins; otherwise a metadata-only closed descriptor is
    /// synthesized (no activation) and cached canonically.
    pub fn make_generic_type(&self, args: &[Arc<TypeInfo>]) -> Result<Arc<TypeInfo>> {
        if !self.is_open_generic() {
            return Err(Error::TypeMismatch {
                expected: "open generic definition".into(),
                got: self.native.full_name.to_string(),
            });
        }
        let registry = self.upgrade()?;
        let arg_names: Vec<&str> = args.iter().map(|a| a.full_name()).collect();
        let closed_name = format!("{}<{}>", self.native.full_name, arg_names.join(", "));
        if let Some(existing) = registry.get_type_info_by_name(&closed_name) {
            return Ok(existing);
        }
        let idents: Vec<TypeIdent> = args.iter().map(|a| a.ident().clone()).collect();
        let closed = self.native.close_with(&idents, Arc::from(closed_name))?;
        Ok(registry.get_type_info(&Arc::new(closed)))
    }

    /// Resolve a reference appearing in this type's descriptor.
    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Arc<TypeInfo>> {
        Ok(self.upgrade()?.resolve_ref(type_ref, &self.native))
    }
}

impl Element for TypeInfo {
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
        let Some(assembly) = &self.native.assembly else {
            return Ok(None);
        };
        let registry = self.upgrade()?;
        let assembly =
            registry
                .cached_assembly(assembly)
                .ok_or_else(|| Error::StaleContainer {
                    element: self.native.full_name.to_string(),
                })?;
        Ok(Some(Container::Assembly(assembly)))
    }

    fn registry(&self) -> Weak<TypeRegistry> {
        self.registry.clone()
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("full_name", &self.native.full_name)
            .field("kind", &self.native.kind)
            .finish()
    }
}
