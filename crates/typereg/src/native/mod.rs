// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native type descriptors - the host-registered reflection substrate.
//!
//! Rust has no universal runtime reflection, so the "native type
//! descriptor" is an explicit per-type table the host registers at
//! startup. Member descriptors carry type-erased accessor/invoker
//! closures produced from typed closures by [`TypeBuilder`].
//!
//! # Architecture
//!
//! ```text
//! NativeAssembly
//! +-- providers: Vec<TypeProviderFn>   (lazy, individually fallible)
//!
//! NativeType (Arc-shared, immutable once built)
//! +-- ident: TypeIdent                 (host TypeId or interned name)
//! +-- fields / properties / methods / constructors
//! +-- base, interfaces, generic shape  (TypeRef, open or closed)
//! ```
//!
//! [`TypeBuilder`]: crate::native::TypeBuilder

mod builder;

pub use builder::{AssemblyBuilder, TypeBuilder};

use crate::error::{Error, Result};
use crate::value::Value;
use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Erased field/property read route.
pub type GetterFn = Arc<dyn Fn(&dyn Any) -> Result<Value> + Send + Sync>;

/// Erased field/property write route.
pub type SetterFn = Arc<dyn Fn(&mut dyn Any, Value) -> Result<()> + Send + Sync>;

/// Erased method invoker.
pub type InvokeFn = Arc<dyn Fn(&mut dyn Any, &[Value]) -> Result<Value> + Send + Sync>;

/// Erased constructor.
pub type ConstructFn = Arc<dyn Fn(&[Value]) -> Result<Box<dyn Any>> + Send + Sync>;

/// Producer for a type's default value.
pub type DefaultValueFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Lazy, fallible per-type provider inside an assembly.
pub type TypeProviderFn = Arc<dyn Fn() -> Result<Arc<NativeType>> + Send + Sync>;

/// Optional direct-accessor compiler hook for a property.
///
/// May fail; failure makes the wrapper fall back to the reflective
/// route, and the fallback is cached.
pub type AccessorCompileFn = Arc<dyn Fn() -> Result<CompiledAccessor> + Send + Sync>;

/// Result of a successful accessor compilation.
#[derive(Clone)]
pub struct CompiledAccessor {
    pub get: Option<GetterFn>,
    pub set: Option<SetterFn>,
}

/// Stable identity of a native type.
///
/// Real Rust types use the host `TypeId`; synthetic descriptors (open
/// generic templates, synthesized closed generics, foreign types) use
/// an interned full name.
#[derive(Clone)]
pub enum TypeIdent {
    Host { id: TypeId, name: &'static str },
    Named(Arc<str>),
}

impl TypeIdent {
    /// Identity of a concrete Rust type.
    pub fn of<T: 'static>() -> Self {
        Self::Host {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Identity of a synthetic (named) descriptor.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }

    /// Full name associated with the identity.
    pub fn name(&self) -> &str {
        match self {
            Self::Host { name, .. } => name,
            Self::Named(name) => name,
        }
    }
}

impl PartialEq for TypeIdent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Host { id: a, .. }, Self::Host { id: b, .. }) => a == b,
            (Self::Named(a), Self::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeIdent {}

impl Hash for TypeIdent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Host { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            Self::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl std::fmt::Debug for TypeIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host { name, .. } => write!(f, "TypeIdent({})", name),
            Self::Named(name) => write!(f, "TypeIdent(\"{}\")", name),
        }
    }
}

/// Reference to a type inside a descriptor: a concrete identity, or an
/// index into the declaring type's generic parameter list (so open
/// templates can be closed by substitution).
#[derive(Clone, Debug)]
pub enum TypeRef {
    Ident(TypeIdent),
    GenericParam(usize),
}

impl TypeRef {
    /// Reference to a concrete Rust type.
    pub fn of<T: 'static>() -> Self {
        Self::Ident(TypeIdent::of::<T>())
    }

    /// Reference to a synthetic (named) type.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Ident(TypeIdent::named(name))
    }

    fn substituted(&self, args: &[TypeIdent]) -> Self {
        match self {
            Self::GenericParam(i) => match args.get(*i) {
                Some(ident) => Self::Ident(ident.clone()),
                None => self.clone(),
            },
            Self::Ident(_) => self.clone(),
        }
    }
}

/// Kind tag for native elements, ordered into an assignability chain:
/// `Field/Property/Method/Parameter -> Member -> Element` and
/// `Type/Assembly -> Element`. Factory lists are keyed by these tags
/// and resolved by nearest-assignable-kind walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Element,
    Member,
    Type,
    Assembly,
    Field,
    Property,
    Method,
    Parameter,
}

impl ElementKind {
    /// Next kind up the assignability chain, `None` at the root.
    pub fn parent(self) -> Option<ElementKind> {
        match self {
            Self::Field | Self::Property | Self::Method | Self::Parameter => Some(Self::Member),
            Self::Type | Self::Assembly | Self::Member => Some(Self::Element),
            Self::Element => None,
        }
    }
}

/// Coarse classification of a native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Unknown,
}

/// Name/value annotation attached to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: Arc<str>,
    pub value: Option<Arc<str>>,
}

impl Annotation {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Field descriptor: name, value type and erased access routes.
#[derive(Clone)]
pub struct NativeField {
    pub name: Arc<str>,
    pub value_type: TypeRef,
    pub get: Option<GetterFn>,
    pub set: Option<SetterFn>,
    pub annotations: Vec<Annotation>,
}

/// Property descriptor.
///
/// The reflective `get`/`set` routes are the always-correct path; the
/// optional `compile` hook may produce a faster direct accessor and is
/// attempted once per wrapper.
#[derive(Clone)]
pub struct NativeProperty {
    pub name: Arc<str>,
    pub value_type: TypeRef,
    pub get: Option<GetterFn>,
    pub set: Option<SetterFn>,
    pub compile: Option<AccessorCompileFn>,
    pub annotations: Vec<Annotation>,
}

/// Parameter descriptor.
#[derive(Clone)]
pub struct NativeParameter {
    pub name: Arc<str>,
    pub position: usize,
    pub optional: bool,
    pub is_in: bool,
    pub is_out: bool,
    pub value_type: TypeRef,
    /// Substituted for omitted optional arguments (Null when absent).
    pub default: Option<Value>,
}

impl NativeParameter {
    pub fn new(name: impl Into<Arc<str>>, position: usize, value_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            position,
            optional: false,
            is_in: true,
            is_out: false,
            value_type,
            default: None,
        }
    }

    /// Mark as optional with a default argument value.
    pub fn optional(mut self, default: Value) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }

    /// Mark as an out parameter.
    pub fn out(mut self) -> Self {
        self.is_in = false;
        self.is_out = true;
        self
    }
}

/// Method descriptor with its erased invoker.
#[derive(Clone)]
pub struct NativeMethod {
    pub name: Arc<str>,
    pub return_type: TypeRef,
    pub params: Vec<NativeParameter>,
    pub invoke: InvokeFn,
    pub annotations: Vec<Annotation>,
}

impl NativeMethod {
    /// Argument count of mandatory parameters.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }
}

/// Constructor descriptor with its erased producer.
#[derive(Clone)]
pub struct NativeConstructor {
    pub params: Vec<NativeParameter>,
    pub construct: ConstructFn,
}

impl NativeConstructor {
    /// Argument count of mandatory parameters.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }

    /// Whether `count` arguments satisfy this constructor's arity.
    pub fn accepts_count(&self, count: usize) -> bool {
        count >= self.required_params() && count <= self.params.len()
    }
}

/// Per-type descriptor table, immutable once built and shared as
/// `Arc<NativeType>`.
pub struct NativeType {
    pub ident: TypeIdent,
    pub name: Arc<str>,
    pub full_name: Arc<str>,
    pub kind: TypeKind,
    pub assembly: Option<Arc<str>>,
    pub annotations: Vec<Annotation>,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// Generic parameter names; non-empty only on open forms.
    pub generic_params: Vec<Arc<str>>,
    /// Generic argument references; non-empty only on closed forms.
    pub generic_args: Vec<TypeRef>,
    /// Back-link to the open definition for closed forms.
    pub generic_definition: Option<TypeIdent>,
    pub fields: Vec<NativeField>,
    pub properties: Vec<NativeProperty>,
    pub methods: Vec<NativeMethod>,
    pub constructors: Vec<NativeConstructor>,
    pub default_value: Option<DefaultValueFn>,
}

impl NativeType {
    /// Minimal descriptor for a type the registry has no table for.
    pub fn unknown(ident: TypeIdent) -> Self {
        let full_name: Arc<str> = Arc::from(ident.name());
        Self {
            ident,
            name: short_name(&full_name),
            full_name,
            kind: TypeKind::Unknown,
            assembly: None,
            annotations: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            generic_args: Vec::new(),
            generic_definition: None,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            default_value: None,
        }
    }

    /// Whether this is an open generic definition.
    pub fn is_open_generic(&self) -> bool {
        !self.generic_params.is_empty() && self.generic_args.is_empty()
    }

    /// Synthesize a closed descriptor from this open definition.
    ///
    /// Generic-parameter references throughout the member, base and
    /// interface tables are substituted with `args`; constructors are
    /// dropped (a synthesized monomorphization is metadata-only).
    pub fn close_with(&self, args: &[TypeIdent], full_name: Arc<str>) -> Result<NativeType> {
        if args.len() != self.generic_params.len() {
            return Err(Error::ParameterCount {
                member: self.full_name.to_string(),
                expected: self.generic_params.len(),
                got: args.len(),
            });
        }

        let fields = self
            .fields
            .iter()
            .map(|field| NativeField {
                value_type: field.value_type.substituted(args),
                ..field.clone()
            })
            .collect();
        let properties = self
            .properties
            .iter()
            .map(|prop| NativeProperty {
                value_type: prop.value_type.substituted(args),
                ..prop.clone()
            })
            .collect();
        let methods = self
            .methods
            .iter()
            .map(|method| NativeMethod {
                return_type: method.return_type.substituted(args),
                params: method
                    .params
                    .iter()
                    .map(|p| NativeParameter {
                        value_type: p.value_type.substituted(args),
                        ..p.clone()
                    })
                    .collect(),
                ..method.clone()
            })
            .collect();

        Ok(NativeType {
            ident: TypeIdent::Named(full_name.clone()),
            name: short_name(&full_name),
            full_name,
            kind: self.kind,
            assembly: self.assembly.clone(),
            annotations: self.annotations.clone(),
            base: self.base.as_ref().map(|b| b.substituted(args)),
            interfaces: self.interfaces.iter().map(|i| i.substituted(args)).collect(),
            generic_params: Vec::new(),
            generic_args: args.iter().cloned().map(TypeRef::Ident).collect(),
            generic_definition: Some(self.ident.clone()),
            fields,
            properties,
            methods,
            constructors: Vec::new(),
            default_value: self.default_value.clone(),
        })
    }
}

impl std::fmt::Debug for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeType")
            .field("ident", &self.ident)
            .field("kind", &self.kind)
            .field("fields", &self.fields.len())
            .field("properties", &self.properties.len())
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Last path segment of a full name (`geom.Point` -> `Point`). Generic
/// argument suffixes are kept as-is.
pub(crate) fn short_name(full_name: &str) -> Arc<str> {
    let base_len = full_name.find('<').unwrap_or(full_name.len());
    let base = &full_name[..base_len];
    match base.rfind(|c| c == '.' || c == ':') {
        Some(sep) => Arc::from(&full_name[sep + 1..]),
        None => Arc::from(full_name),
    }
}

/// Named unit of types (crate/plugin analog) with lazy providers.
pub struct NativeAssembly {
    pub name: Arc<str>,
    pub full_name: Arc<str>,
    pub annotations: Vec<Annotation>,
    providers: Vec<TypeProviderFn>,
}

impl NativeAssembly {
    pub(crate) fn new(
        full_name: Arc<str>,
        annotations: Vec<Annotation>,
        providers: Vec<TypeProviderFn>,
    ) -> Self {
        Self {
            name: short_name(&full_name),
            full_name,
            annotations,
            providers,
        }
    }

    /// Lazy per-type providers; each may individually fail.
    pub fn providers(&self) -> &[TypeProviderFn] {
        &self.providers
    }
}

impl std::fmt::Debug for NativeAssembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeAssembly")
            .field("full_name", &self.full_name)
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// A native element handed to the factory chain.
#[derive(Clone)]
pub enum NativeElement {
    Type(Arc<NativeType>),
    Assembly(Arc<NativeAssembly>),
    Field { declaring: Arc<NativeType>, index: usize },
    Property { declaring: Arc<NativeType>, index: usize },
    Method { declaring: Arc<NativeType>, index: usize },
    Parameter {
        declaring: Arc<NativeType>,
        method: usize,
        index: usize,
    },
}

impl NativeElement {
    /// Runtime kind tag, used to select a factory list.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Type(_) => ElementKind::Type,
            Self::Assembly(_) => ElementKind::Assembly,
            Self::Field { .. } => ElementKind::Field,
            Self::Property { .. } => ElementKind::Property,
            Self::Method { .. } => ElementKind::Method,
            Self::Parameter { .. } => ElementKind::Parameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ident_identity() {
        let a = TypeIdent::of::<u32>();
        let b = TypeIdent::of::<u32>();
        let c = TypeIdent::of::<u64>();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.name(), "u32");

        let named = TypeIdent::named("demo.Widget");
        assert_ne!(named, a);
        assert_eq!(named, TypeIdent::named("demo.Widget"));
    }

    #[test]
    fn test_element_kind_chain() {
        assert_eq!(ElementKind::Field.parent(), Some(ElementKind::Member));
        assert_eq!(ElementKind::Parameter.parent(), Some(ElementKind::Member));
        assert_eq!(ElementKind::Member.parent(), Some(ElementKind::Element));
        assert_eq!(ElementKind::Type.parent(), Some(ElementKind::Element));
        assert_eq!(ElementKind::Assembly.parent(), Some(ElementKind::Element));
        assert_eq!(ElementKind::Element.parent(), None);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(&*short_name("geom.Point"), "Point");
        assert_eq!(&*short_name("Point"), "Point");
        assert_eq!(&*short_name("collections.List<geom.Point>"), "List<geom.Point>");
    }

    #[test]
    fn test_close_with_substitutes_members() {
        let open = TypeBuilder::named("demo.Slot")
            .kind(TypeKind::Class)
            .generic_param("T")
            .raw_field(NativeField {
                name: Arc::from("value"),
                value_type: TypeRef::GenericParam(0),
                get: None,
                set: None,
                annotations: Vec::new(),
            })
            .build();

        let closed = open
            .close_with(&[TypeIdent::of::<i32>()], Arc::from("demo.Slot<i32>"))
            .expect("close");

        assert!(closed.generic_params.is_empty());
        assert_eq!(closed.generic_args.len(), 1);
        assert_eq!(closed.generic_definition, Some(TypeIdent::named("demo.Slot")));
        match &closed.fields[0].value_type {
            TypeRef::Ident(ident) => assert_eq!(*ident, TypeIdent::of::<i32>()),
            other => panic!("expected substituted ident, got {other:?}"),
        }
        assert!(closed.constructors.is_empty());
    }

    #[test]
    fn test_close_with_wrong_arity() {
        let open = TypeBuilder::named("demo.Pair")
            .generic_param("A")
            .generic_param("B")
            .build();
        let err = open
            .close_with(&[TypeIdent::of::<i32>()], Arc::from("demo.Pair<i32>"))
            .expect_err("arity");
        assert!(matches!(err, Error::ParameterCount { expected: 2, got: 1, .. }));
    }
}
