// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builders that erase typed closures into native descriptor
//! tables. This is the registration surface hosts use at startup.

use crate::error::{Error, Result};
use crate::native::{
    AccessorCompileFn, Annotation, CompiledAccessor, ConstructFn, DefaultValueFn, GetterFn,
    InvokeFn, NativeAssembly, NativeConstructor, NativeField, NativeMethod, NativeParameter,
    NativeProperty, NativeType, SetterFn, TypeIdent, TypeKind, TypeProviderFn, TypeRef,
    short_name,
};
use crate::value::{FromValue, IntoValue, Value};
use std::any::Any;
use std::sync::Arc;

fn instance_ref<T: Any>(instance: &dyn Any) -> Result<&T> {
    instance.downcast_ref::<T>().ok_or_else(|| Error::TypeMismatch {
        expected: std::any::type_name::<T>().to_string(),
        got: "incompatible instance".to_string(),
    })
}

fn instance_mut<T: Any>(instance: &mut dyn Any) -> Result<&mut T> {
    instance.downcast_mut::<T>().ok_or_else(|| Error::TypeMismatch {
        expected: std::any::type_name::<T>().to_string(),
        got: "incompatible instance".to_string(),
    })
}

fn erase_getter<T, V, G>(get: G) -> GetterFn
where
    T: Any,
    V: IntoValue,
    G: Fn(&T) -> V + Send + Sync + 'static,
{
    Arc::new(move |instance| Ok(get(instance_ref::<T>(instance)?).into_value()))
}

fn erase_setter<T, V, S>(set: S) -> SetterFn
where
    T: Any,
    V: FromValue,
    S: Fn(&mut T, V) + Send + Sync + 'static,
{
    Arc::new(move |instance, value| {
        let typed = instance_mut::<T>(instance)?;
        set(typed, V::from_value(&value)?);
        Ok(())
    })
}

/// Builder for a [`NativeType`] descriptor table.
///
/// Typed field/property/method/constructor helpers perform the closure
/// erasure; `raw_*` escape hatches accept pre-built descriptors for
/// shapes the helpers do not cover (out parameters, synthetic members).
pub struct TypeBuilder {
    ident: TypeIdent,
    full_name: Arc<str>,
    kind: TypeKind,
    assembly: Option<Arc<str>>,
    annotations: Vec<Annotation>,
    base: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    generic_params: Vec<Arc<str>>,
    generic_args: Vec<TypeRef>,
    generic_definition: Option<TypeIdent>,
    fields: Vec<NativeField>,
    properties: Vec<NativeProperty>,
    methods: Vec<NativeMethod>,
    constructors: Vec<NativeConstructor>,
    default_value: Option<DefaultValueFn>,
}

impl TypeBuilder {
    /// Start a descriptor for a concrete Rust type.
    pub fn of<T: 'static>(full_name: impl Into<Arc<str>>) -> Self {
        Self::with_ident(TypeIdent::of::<T>(), full_name.into())
    }

    /// Start a synthetic (named) descriptor, e.g. an open generic
    /// template or a foreign type.
    pub fn named(full_name: impl Into<Arc<str>>) -> Self {
        let full_name = full_name.into();
        Self::with_ident(TypeIdent::Named(full_name.clone()), full_name)
    }

    fn with_ident(ident: TypeIdent, full_name: Arc<str>) -> Self {
        Self {
            ident,
            full_name,
            kind: TypeKind::Class,
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

    /// Set the type kind (defaults to `Class`).
    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Record the declaring assembly's full name.
    pub fn in_assembly(mut self, name: impl Into<Arc<str>>) -> Self {
        self.assembly = Some(name.into());
        self
    }

    /// Attach a marker annotation.
    pub fn annotation(mut self, name: impl Into<Arc<str>>) -> Self {
        self.annotations.push(Annotation::new(name));
        self
    }

    /// Attach a name/value annotation.
    pub fn annotation_value(
        mut self,
        name: impl Into<Arc<str>>,
        value: impl Into<Arc<str>>,
    ) -> Self {
        self.annotations.push(Annotation::with_value(name, value));
        self
    }

    /// Set the base class reference.
    pub fn base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Add a directly implemented interface.
    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Declare a generic parameter (open forms).
    pub fn generic_param(mut self, name: impl Into<Arc<str>>) -> Self {
        self.generic_params.push(name.into());
        self
    }

    /// Declare a generic argument (host-registered closed forms).
    pub fn generic_arg(mut self, arg: TypeRef) -> Self {
        self.generic_args.push(arg);
        self
    }

    /// Back-link a closed form to its open definition.
    pub fn generic_definition(mut self, definition: TypeIdent) -> Self {
        self.generic_definition = Some(definition);
        self
    }

    /// Install a default-value producer (value-like types).
    pub fn default_value_with<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default_value = Some(Arc::new(produce));
        self
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    /// Add a read/write field backed by typed closures.
    pub fn field<T, V, W, G, S>(
        mut self,
        name: impl Into<Arc<str>>,
        value_type: TypeRef,
        get: G,
        set: S,
    ) -> Self
    where
        T: Any,
        V: IntoValue,
        W: FromValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, W) + Send + Sync + 'static,
    {
        self.fields.push(NativeField {
            name: name.into(),
            value_type,
            get: Some(erase_getter(get)),
            set: Some(erase_setter(set)),
            annotations: Vec::new(),
        });
        self
    }

    /// Add a read-only field.
    pub fn read_field<T, V, G>(
        mut self,
        name: impl Into<Arc<str>>,
        value_type: TypeRef,
        get: G,
    ) -> Self
    where
        T: Any,
        V: IntoValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.fields.push(NativeField {
            name: name.into(),
            value_type,
            get: Some(erase_getter(get)),
            set: None,
            annotations: Vec::new(),
        });
        self
    }

    /// Add a pre-built field descriptor.
    pub fn raw_field(mut self, field: NativeField) -> Self {
        self.fields.push(field);
        self
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Add a read/write property (reflective route only).
    pub fn property<T, V, W, G, S>(
        mut self,
        name: impl Into<Arc<str>>,
        value_type: TypeRef,
        get: G,
        set: S,
    ) -> Self
    where
        T: Any,
        V: IntoValue,
        W: FromValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, W) + Send + Sync + 'static,
    {
        self.properties.push(NativeProperty {
            name: name.into(),
            value_type,
            get: Some(erase_getter(get)),
            set: Some(erase_setter(set)),
            compile: None,
            annotations: Vec::new(),
        });
        self
    }

    /// Add a read-only property.
    pub fn read_property<T, V, G>(
        mut self,
        name: impl Into<Arc<str>>,
        value_type: TypeRef,
        get: G,
    ) -> Self
    where
        T: Any,
        V: IntoValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.properties.push(NativeProperty {
            name: name.into(),
            value_type,
            get: Some(erase_getter(get)),
            set: None,
            compile: None,
            annotations: Vec::new(),
        });
        self
    }

    /// Add a write-only property.
    pub fn write_property<T, W, S>(
        mut self,
        name: impl Into<Arc<str>>,
        value_type: TypeRef,
        set: S,
    ) -> Self
    where
        T: Any,
        W: FromValue,
        S: Fn(&mut T, W) + Send + Sync + 'static,
    {
        self.properties.push(NativeProperty {
            name: name.into(),
            value_type,
            get: None,
            set: Some(erase_setter(set)),
            compile: None,
            annotations: Vec::new(),
        });
        self
    }

    /// Add a read/write property with a pre-compiled direct accessor.
    ///
    /// The direct closures bypass the reflective route entirely; the
    /// install is rendered as an infallible compile hook.
    pub fn property_compiled<T, V, W, G, S>(
        mut self,
        name: impl Into<Arc<str>>,
        value_type: TypeRef,
        get: G,
        set: S,
    ) -> Self
    where
        T: Any,
        V: IntoValue,
        W: FromValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, W) + Send + Sync + 'static,
    {
        let reflective_get = erase_getter(get);
        let reflective_set = erase_setter(set);
        let direct = CompiledAccessor {
            get: Some(reflective_get.clone()),
            set: Some(reflective_set.clone()),
        };
        let compile: AccessorCompileFn = Arc::new(move || Ok(direct.clone()));
        self.properties.push(NativeProperty {
            name: name.into(),
            value_type,
            get: Some(reflective_get),
            set: Some(reflective_set),
            compile: Some(compile),
            annotations: Vec::new(),
        });
        self
    }

    /// Add a read/write property with an explicit compile hook.
    ///
    /// A hook returning `Err` exercises the cached reflective fallback.
    pub fn property_with_compiler<T, V, W, G, S>(
        mut self,
        name: impl Into<Arc<str>>,
        value_type: TypeRef,
        get: G,
        set: S,
        compile: AccessorCompileFn,
    ) -> Self
    where
        T: Any,
        V: IntoValue,
        W: FromValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, W) + Send + Sync + 'static,
    {
        self.properties.push(NativeProperty {
            name: name.into(),
            value_type,
            get: Some(erase_getter(get)),
            set: Some(erase_setter(set)),
            compile: Some(compile),
            annotations: Vec::new(),
        });
        self
    }

    /// Add a pre-built property descriptor.
    pub fn raw_property(mut self, property: NativeProperty) -> Self {
        self.properties.push(property);
        self
    }

    // ------------------------------------------------------------------
    // Methods
    // ------------------------------------------------------------------

    /// Add a zero-argument method.
    pub fn method0<T, R, F>(
        mut self,
        name: impl Into<Arc<str>>,
        return_type: TypeRef,
        f: F,
    ) -> Self
    where
        T: Any,
        R: IntoValue,
        F: Fn(&mut T) -> R + Send + Sync + 'static,
    {
        let invoke: InvokeFn =
            Arc::new(move |instance, _args| Ok(f(instance_mut::<T>(instance)?).into_value()));
        self.methods.push(NativeMethod {
            name: name.into(),
            return_type,
            params: Vec::new(),
            invoke,
            annotations: Vec::new(),
        });
        self
    }

    /// Add a one-argument method.
    pub fn method1<T, A, R, F>(
        mut self,
        name: impl Into<Arc<str>>,
        param: (&str, TypeRef),
        return_type: TypeRef,
        f: F,
    ) -> Self
    where
        T: Any,
        A: FromValue,
        R: IntoValue,
        F: Fn(&mut T, A) -> R + Send + Sync + 'static,
    {
        let invoke: InvokeFn = Arc::new(move |instance, args| {
            let typed = instance_mut::<T>(instance)?;
            let a = A::from_value(args.first().unwrap_or(&Value::Null))?;
            Ok(f(typed, a).into_value())
        });
        let (p0_name, p0_type) = param;
        self.methods.push(NativeMethod {
            name: name.into(),
            return_type,
            params: vec![NativeParameter::new(p0_name, 0, p0_type)],
            invoke,
            annotations: Vec::new(),
        });
        self
    }

    /// Add a two-argument method.
    pub fn method2<T, A, B, R, F>(
        mut self,
        name: impl Into<Arc<str>>,
        params: [(&str, TypeRef); 2],
        return_type: TypeRef,
        f: F,
    ) -> Self
    where
        T: Any,
        A: FromValue,
        B: FromValue,
        R: IntoValue,
        F: Fn(&mut T, A, B) -> R + Send + Sync + 'static,
    {
        let invoke: InvokeFn = Arc::new(move |instance, args| {
            let typed = instance_mut::<T>(instance)?;
            let a = A::from_value(args.first().unwrap_or(&Value::Null))?;
            let b = B::from_value(args.get(1).unwrap_or(&Value::Null))?;
            Ok(f(typed, a, b).into_value())
        });
        let [(p0_name, p0_type), (p1_name, p1_type)] = params;
        self.methods.push(NativeMethod {
            name: name.into(),
            return_type,
            params: vec![
                NativeParameter::new(p0_name, 0, p0_type),
                NativeParameter::new(p1_name, 1, p1_type),
            ],
            invoke,
            annotations: Vec::new(),
        });
        self
    }

    /// Add a pre-built method descriptor (overloads, out/optional
    /// parameters, higher arities).
    pub fn raw_method(mut self, method: NativeMethod) -> Self {
        self.methods.push(method);
        self
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    /// Add a zero-argument constructor.
    pub fn constructor0<T, F>(mut self, f: F) -> Self
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let construct: ConstructFn = Arc::new(move |_args| Ok(Box::new(f()) as Box<dyn Any>));
        self.constructors.push(NativeConstructor {
            params: Vec::new(),
            construct,
        });
        self
    }

    /// Add a one-argument constructor.
    pub fn constructor1<T, A, F>(mut self, param: (&str, TypeRef), f: F) -> Self
    where
        T: Any,
        A: FromValue,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        let construct: ConstructFn = Arc::new(move |args| {
            let a = A::from_value(args.first().unwrap_or(&Value::Null))?;
            Ok(Box::new(f(a)) as Box<dyn Any>)
        });
        let (p0_name, p0_type) = param;
        self.constructors.push(NativeConstructor {
            params: vec![NativeParameter::new(p0_name, 0, p0_type)],
            construct,
        });
        self
    }

    /// Add a two-argument constructor.
    pub fn constructor2<T, A, B, F>(mut self, params: [(&str, TypeRef); 2], f: F) -> Self
    where
        T: Any,
        A: FromValue,
        B: FromValue,
        F: Fn(A, B) -> T + Send + Sync + 'static,
    {
        let construct: ConstructFn = Arc::new(move |args| {
            let a = A::from_value(args.first().unwrap_or(&Value::Null))?;
            let b = B::from_value(args.get(1).unwrap_or(&Value::Null))?;
            Ok(Box::new(f(a, b)) as Box<dyn Any>)
        });
        let [(p0_name, p0_type), (p1_name, p1_type)] = params;
        self.constructors.push(NativeConstructor {
            params: vec![
                NativeParameter::new(p0_name, 0, p0_type),
                NativeParameter::new(p1_name, 1, p1_type),
            ],
            construct,
        });
        self
    }

    /// Add a pre-built constructor descriptor.
    pub fn raw_constructor(mut self, constructor: NativeConstructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Build the immutable descriptor.
    pub fn build(self) -> Arc<NativeType> {
        Arc::new(NativeType {
            ident: self.ident,
            name: short_name(&self.full_name),
            full_name: self.full_name,
            kind: self.kind,
            assembly: self.assembly,
            annotations: self.annotations,
            base: self.base,
            interfaces: self.interfaces,
            generic_params: self.generic_params,
            generic_args: self.generic_args,
            generic_definition: self.generic_definition,
            fields: self.fields,
            properties: self.properties,
            methods: self.methods,
            constructors: self.constructors,
            default_value: self.default_value,
        })
    }
}

/// Builder for a [`NativeAssembly`].
pub struct AssemblyBuilder {
    full_name: Arc<str>,
    annotations: Vec<Annotation>,
    providers: Vec<TypeProviderFn>,
}

impl AssemblyBuilder {
    pub fn new(full_name: impl Into<Arc<str>>) -> Self {
        Self {
            full_name: full_name.into(),
            annotations: Vec::new(),
            providers: Vec::new(),
        }
    }

    /// Attach a marker annotation.
    pub fn annotation(mut self, name: impl Into<Arc<str>>) -> Self {
        self.annotations.push(Annotation::new(name));
        self
    }

    /// Add a lazy, fallible type provider.
    pub fn provide<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<Arc<NativeType>> + Send + Sync + 'static,
    {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Add an already-built descriptor as an infallible provider.
    pub fn provide_type(self, native: Arc<NativeType>) -> Self {
        self.provide(move || Ok(native.clone()))
    }

    pub fn build(self) -> Arc<NativeAssembly> {
        Arc::new(NativeAssembly::new(
            self.full_name,
            self.annotations,
            self.providers,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_erased_field_access() {
        let native = TypeBuilder::of::<Point>("geom.Point")
            .field(
                "x",
                TypeRef::of::<i32>(),
                |p: &Point| p.x,
                |p: &mut Point, v: i32| p.x = v,
            )
            .read_field("y", TypeRef::of::<i32>(), |p: &Point| p.y)
            .build();

        assert_eq!(&*native.name, "Point");
        assert_eq!(native.fields.len(), 2);

        let mut point = Point { x: 1, y: 2 };
        let field = &native.fields[0];
        let set = field.set.as_ref().expect("setter");
        set(&mut point as &mut dyn Any, Value::I32(9)).expect("set");
        let get = field.get.as_ref().expect("getter");
        assert_eq!(get(&point as &dyn Any).expect("get").as_i32(), Some(9));
        assert!(native.fields[1].set.is_none());
    }

    #[test]
    fn test_erased_getter_rejects_foreign_instance() {
        let native = TypeBuilder::of::<Point>("geom.Point")
            .read_field("x", TypeRef::of::<i32>(), |p: &Point| p.x)
            .build();

        let not_a_point = String::from("nope");
        let get = native.fields[0].get.as_ref().expect("getter");
        let err = get(&not_a_point as &dyn Any).expect_err("foreign instance");
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_method_and_constructor_erasure() {
        let native = TypeBuilder::of::<Point>("geom.Point")
            .constructor2(
                [("x", TypeRef::of::<i32>()), ("y", TypeRef::of::<i32>())],
                |x: i32, y: i32| Point { x, y },
            )
            .method1(
                "shift_x",
                ("dx", TypeRef::of::<i32>()),
                TypeRef::of::<i32>(),
                |p: &mut Point, dx: i32| {
                    p.x += dx;
                    p.x
                },
            )
            .build();

        let ctor = &native.constructors[0];
        assert!(ctor.accepts_count(2));
        assert!(!ctor.accepts_count(1));
        let boxed = (ctor.construct)(&[Value::I32(3), Value::I32(4)]).expect("construct");
        let mut point = *boxed.downcast::<Point>().map_err(|_| "downcast").expect("point");
        assert_eq!(point.x, 3);

        let shifted = (native.methods[0].invoke)(&mut point as &mut dyn Any, &[Value::I32(10)])
            .expect("invoke");
        assert_eq!(shifted.as_i32(), Some(13));
    }

    #[test]
    fn test_assembly_builder_providers() {
        let point = TypeBuilder::of::<Point>("geom.Point").build();
        let assembly = AssemblyBuilder::new("geom")
            .annotation("generated")
            .provide_type(point)
            .provide(|| {
                Err(Error::Invocation {
                    member: "geom.Broken".into(),
                    message: "load failure".into(),
                })
            })
            .build();

        assert_eq!(&*assembly.name, "geom");
        assert_eq!(assembly.providers().len(), 2);
        assert!(assembly.providers()[0]().is_ok());
        assert!(assembly.providers()[1]().is_err());
    }
}
