// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # typereg - Runtime type-metadata registry
//!
//! A process-wide, cached, extensible object model over host-registered
//! type descriptors: types, assemblies and their members (fields,
//! properties, methods, parameters), with optimized member access,
//! invocation and instance creation on top.
//!
//! ## Quick Start
//!
//! ```rust
//! use typereg::{TypeBuilder, TypeRef, TypeRegistry, Value};
//!
//! struct Point { x: f64, y: f64 }
//!
//! let native = TypeBuilder::of::<Point>("geom.Point")
//!     .property("x", TypeRef::of::<f64>(),
//!         |p: &Point| p.x, |p: &mut Point, v: f64| p.x = v)
//!     .property("y", TypeRef::of::<f64>(),
//!         |p: &Point| p.y, |p: &mut Point, v: f64| p.y = v)
//!     .constructor0(|| Point { x: 0.0, y: 0.0 })
//!     .build();
//!
//! let registry = TypeRegistry::new();
//! let info = registry.get_type_info(&native);
//!
//! let mut point = Point { x: 1.0, y: 2.0 };
//! info.set_value(&mut point, "x", Value::F64(3.5)).unwrap();
//! assert_eq!(point.x, 3.5);
//! assert_eq!(info.get_value(&point, "y").unwrap().as_f64(), Some(2.0));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        Wrapper Layer                         |
//! |  TypeInfo | AssemblyInfo | Field/Property/Method/Parameter   |
//! +--------------------------------------------------------------+
//! |                        Registry Layer                        |
//! |  canonical caches | factory chain | unknown-type synthesis   |
//! +--------------------------------------------------------------+
//! |                     Native Descriptor Layer                  |
//! |  NativeType tables | erased closures | fluent builders       |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeRegistry`] | Process-wide wrapper cache and factory chain |
//! | [`TypeInfo`] | Type wrapper: members, generics, activation |
//! | [`TypeBuilder`] | Fluent descriptor registration for a Rust type |
//! | [`ElementFactory`] | Pluggable wrapper producer, last registered first |
//! | [`Value`] | Dynamic argument/result representation |
//!
//! ## Guarantees
//!
//! - One canonical wrapper per type identity (`Arc::ptr_eq` stable)
//! - Lazy, memoized member graphs; safe under concurrent first use
//! - Overload resolution strictly by argument count
//! - Compiled property accessors with cached reflective fallback

pub mod config;
pub mod error;
pub mod info;
pub mod loader;
pub mod native;
pub mod registry;
pub mod resolve;
pub mod value;

mod activate;

pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use info::{
    AssemblyInfo, Container, Element, ElementItem, FieldInfo, MethodInfo, ParameterInfo,
    PropertyInfo, TypeInfo,
};
pub use loader::{
    DefaultTypeLoader, DisplayInfo, DisplayProvider, NullDisplayProvider, TypeLoader,
};
pub use native::{
    AccessorCompileFn, Annotation, AssemblyBuilder, CompiledAccessor, ConstructFn, ElementKind,
    GetterFn, InvokeFn, NativeAssembly, NativeConstructor, NativeElement, NativeField,
    NativeMethod, NativeParameter, NativeProperty, NativeType, SetterFn, TypeBuilder, TypeIdent,
    TypeKind, TypeRef,
};
pub use registry::{ElementFactory, TypeRegistry};
pub use resolve::Member;
pub use value::{FromValue, IntoValue, Value};
