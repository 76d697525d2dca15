// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry-level behavior: canonical caching, factory chain,
//! assemblies, generic shapes and concurrent resolution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use typereg::{
    Annotation, AssemblyBuilder, Container, DisplayInfo, DisplayProvider, Element,
    ElementFactory, ElementItem, ElementKind, Error, NativeElement, NativeType, TypeBuilder,
    TypeInfo, TypeKind, TypeRef, TypeRegistry, Value,
};

struct Point {
    x: f64,
    y: f64,
}

fn point_type() -> Arc<NativeType> {
    TypeBuilder::of::<Point>("geom.Point")
        .kind(TypeKind::Class)
        .in_assembly("geom")
        .property(
            "x",
            TypeRef::of::<f64>(),
            |p: &Point| p.x,
            |p: &mut Point, v: f64| p.x = v,
        )
        .property(
            "y",
            TypeRef::of::<f64>(),
            |p: &Point| p.y,
            |p: &mut Point, v: f64| p.y = v,
        )
        .constructor0(|| Point { x: 0.0, y: 0.0 })
        .build()
}

#[test]
fn cache_returns_canonical_wrapper() {
    let registry = TypeRegistry::new();
    let native = point_type();
    let a = registry.get_type_info(&native);
    let b = registry.get_type_info(&native);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.full_name(), "geom.Point");
    assert_eq!(a.name(), "Point");
    assert_eq!(a.kind(), TypeKind::Class);
}

#[test]
fn concurrent_resolution_observes_one_winner() {
    let registry = TypeRegistry::new();
    let native = point_type();
    let reference = registry.get_type_info(&native);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        let native = native.clone();
        handles.push(std::thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..200 {
                if fastrand::bool() {
                    std::thread::yield_now();
                }
                seen.push(registry.get_type_info(&native));
            }
            seen
        }));
    }
    for handle in handles {
        for info in handle.join().expect("thread") {
            assert!(Arc::ptr_eq(&reference, &info));
        }
    }
}

/// A type factory that stamps an annotation onto every wrapper it
/// builds, so post-registration resolutions are distinguishable.
struct TracingTypeFactory;

impl ElementFactory for TracingTypeFactory {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Type
    }

    fn try_create(
        &self,
        element: &NativeElement,
        registry: &Arc<TypeRegistry>,
    ) -> Option<ElementItem> {
        let NativeElement::Type(native) = element else {
            return None;
        };
        let mut traced = NativeType::unknown(native.ident.clone());
        traced.name = native.name.clone();
        traced.full_name = native.full_name.clone();
        traced.kind = native.kind;
        traced.annotations = native.annotations.clone();
        traced.annotations.push(Annotation::new("traced"));
        Some(ElementItem::Type(Arc::new(TypeInfo::new(
            Arc::new(traced),
            Arc::downgrade(registry),
        ))))
    }
}

#[test]
fn factory_override_affects_only_later_resolutions() {
    let registry = TypeRegistry::new();
    let before = registry.get_type_info(&point_type());
    assert!(!before.annotations().iter().any(|a| &*a.name == "traced"));

    registry.register_factory(Arc::new(TracingTypeFactory));

    // Cached wrapper is untouched.
    let cached = registry.get_type_info(&point_type());
    assert!(Arc::ptr_eq(&before, &cached));

    // A fresh type goes through the new factory first.
    struct Other;
    let other = registry.get_type_info(&TypeBuilder::of::<Other>("geom.Other").build());
    assert!(other.annotations().iter().any(|a| &*a.name == "traced"));
}

/// A member-level factory that counts the element kinds it sees and
/// always declines, proving Field and Method bind to the Member list.
struct CountingMemberFactory {
    seen: Arc<AtomicUsize>,
}

impl ElementFactory for CountingMemberFactory {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Member
    }

    fn try_create(
        &self,
        _element: &NativeElement,
        _registry: &Arc<TypeRegistry>,
    ) -> Option<ElementItem> {
        self.seen.fetch_add(1, Ordering::Relaxed);
        None
    }
}

#[test]
fn member_factory_fires_for_fields_and_methods() {
    let registry = TypeRegistry::new();
    let seen = Arc::new(AtomicUsize::new(0));
    registry.register_factory(Arc::new(CountingMemberFactory { seen: seen.clone() }));

    struct Gauge {
        level: i32,
    }
    let native = TypeBuilder::of::<Gauge>("metrics.Gauge")
        .read_field("level", TypeRef::of::<i32>(), |g: &Gauge| g.level)
        .method0("reset", TypeRef::of::<()>(), |g: &mut Gauge| g.level = 0)
        .build();

    let info = registry.get_type_info(&native);
    assert_eq!(info.fields().len(), 1);
    assert_eq!(info.methods().len(), 1);
    // One field element plus one method element passed through the
    // Member-bound list.
    assert!(seen.load(Ordering::Relaxed) >= 2);
}

#[test]
fn assembly_partial_load_skips_failing_providers() {
    let registry = TypeRegistry::new();
    let assembly = AssemblyBuilder::new("geom")
        .provide_type(point_type())
        .provide(|| {
            Err(Error::Invocation {
                member: "geom.Broken".into(),
                message: "symbol unavailable".into(),
            })
        })
        .build();

    let info = registry.get_assembly_info(&assembly);
    let again = registry.get_assembly_info(&assembly);
    assert!(Arc::ptr_eq(&info, &again));

    let types = info.exported_types().expect("types");
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].full_name(), "geom.Point");

    // The exported wrapper is the canonical one.
    let canonical = registry.get_type_info(&point_type());
    assert!(Arc::ptr_eq(&types[0], &canonical));

    // And the type's declaring container is the assembly wrapper.
    match canonical.declaring_container().expect("container") {
        Some(Container::Assembly(found)) => assert!(Arc::ptr_eq(&found, &info)),
        other => panic!("expected assembly container, got {:?}", other.is_some()),
    }

    assert_eq!(registry.assemblies().len(), 1);
}

#[test]
fn open_and_closed_generic_shapes() {
    let registry = TypeRegistry::new();
    let open_native = TypeBuilder::named("collections.List")
        .kind(TypeKind::Class)
        .generic_param("T")
        .raw_field(typereg::NativeField {
            name: "head".into(),
            value_type: TypeRef::GenericParam(0),
            get: None,
            set: None,
            annotations: Vec::new(),
        })
        .build();
    let open = registry.get_type_info(&open_native);
    assert!(open.is_open_generic());
    assert_eq!(open.generic_parameters().len(), 1);
    assert!(open.generic_arguments().is_empty());

    struct Marker;
    let arg = registry.get_type_info(&TypeBuilder::of::<Marker>("geom.Marker").build());

    let closed = open.make_generic_type(&[arg.clone()]).expect("close");
    assert!(!closed.is_open_generic());
    assert!(closed.generic_parameters().is_empty());
    assert_eq!(closed.generic_arguments().len(), 1);
    assert!(Arc::ptr_eq(&closed.generic_arguments()[0], &arg));
    assert_eq!(closed.full_name(), "collections.List<geom.Marker>");

    // Back-link resolves to the open definition's canonical wrapper.
    let definition = closed.generic_definition().expect("link").expect("some");
    assert!(Arc::ptr_eq(&definition, &open));

    // Closing again yields the same cached wrapper.
    let closed_again = open.make_generic_type(&[arg.clone()]).expect("close");
    assert!(Arc::ptr_eq(&closed, &closed_again));

    // The substituted field type resolves to the argument.
    let head = closed.field("head").expect("head");
    let head_type = head.value_type().expect("type");
    assert!(Arc::ptr_eq(&head_type, &arg));

    // Synthesized closed generics are metadata-only.
    assert!(matches!(
        closed.create_instance(&[]),
        Err(Error::NotConstructible { .. })
    ));
}

#[test]
fn registered_closed_instantiation_wins_over_synthesis() {
    let registry = TypeRegistry::new();
    let open = registry.get_type_info(
        &TypeBuilder::named("collections.List")
            .generic_param("T")
            .build(),
    );
    let arg = registry.get_type_info(&TypeBuilder::of::<i64>("i64").build());

    struct ListOfI64;
    let registered = registry.get_type_info(
        &TypeBuilder::of::<ListOfI64>("collections.List<i64>")
            .generic_arg(TypeRef::of::<i64>())
            .generic_definition(typereg::TypeIdent::named("collections.List"))
            .constructor0(|| ListOfI64)
            .build(),
    );

    let closed = open.make_generic_type(&[arg]).expect("close");
    assert!(Arc::ptr_eq(&closed, &registered));
    // The registered monomorphization is constructible.
    assert!(closed.create_instance(&[]).is_ok());
}

#[test]
fn make_generic_type_rejects_closed_receiver_and_bad_arity() {
    let registry = TypeRegistry::new();
    let open = registry.get_type_info(
        &TypeBuilder::named("collections.Map")
            .generic_param("K")
            .generic_param("V")
            .build(),
    );
    let arg = registry.get_type_info(&TypeBuilder::of::<u8>("u8").build());

    assert!(matches!(
        open.make_generic_type(&[arg.clone()]),
        Err(Error::ParameterCount { expected: 2, got: 1, .. })
    ));

    let closed = open.make_generic_type(&[arg.clone(), arg.clone()]).expect("close");
    assert!(matches!(
        closed.make_generic_type(&[arg]),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn lookups_by_name_and_type_id() {
    let registry = TypeRegistry::new();
    let info = registry.get_type_info(&point_type());
    assert!(Arc::ptr_eq(
        &info,
        &registry.get_type_info_of::<Point>().expect("by id")
    ));
    assert!(Arc::ptr_eq(
        &info,
        &registry.get_type_info_by_name("geom.Point").expect("by name")
    ));
    assert!(registry.get_type_info_by_name("geom.Nope").is_none());
    assert!(registry.get_type_info_of::<String>().is_none());
}

#[test]
fn global_registry_is_a_singleton() {
    assert!(Arc::ptr_eq(TypeRegistry::global(), TypeRegistry::global()));
}

struct StaticDisplay;

impl DisplayProvider for StaticDisplay {
    fn display_for(&self, full_name: &str) -> Option<DisplayInfo> {
        (full_name == "geom.Point").then(|| DisplayInfo {
            name: "Point".to_string(),
            description: Some("A 2D point".to_string()),
            prompt: None,
        })
    }
}

#[test]
fn display_provider_passthrough_with_fallback() {
    let registry = TypeRegistry::new();
    registry.set_display_provider(Box::new(StaticDisplay));

    let point = registry.get_type_info(&point_type());
    let display = point.display_info();
    assert_eq!(display.description.as_deref(), Some("A 2D point"));

    // Unknown to the provider: falls back to the element's own name.
    let x = point.property("x").expect("x").clone();
    assert_eq!(x.display_info(), DisplayInfo::from_name("x"));
}

#[test]
fn unknown_references_resolve_to_synthesized_descriptors() {
    let registry = TypeRegistry::new();
    struct Node {
        next: u32,
    }
    let native = TypeBuilder::of::<Node>("graph.Node")
        .read_field("next", TypeRef::named("graph.Edge"), |n: &Node| n.next)
        .build();
    let info = registry.get_type_info(&native);

    let edge = info.field("next").expect("next").value_type().expect("type");
    assert_eq!(edge.full_name(), "graph.Edge");
    assert_eq!(edge.kind(), TypeKind::Unknown);

    // Synthesized descriptors are canonical too.
    let again = info.field("next").expect("next").value_type().expect("type");
    assert!(Arc::ptr_eq(&edge, &again));

    // Value round-trip still works on the declared field.
    let node = Node { next: 9 };
    assert_eq!(
        info.get_value(&node, "next").expect("get"),
        Value::U32(9)
    );
}
