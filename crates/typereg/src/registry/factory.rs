// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable element-info factories and the kind-keyed factory chain.

use crate::info::{
    AssemblyInfo, ElementItem, FieldInfo, MethodInfo, ParameterInfo, PropertyInfo, TypeInfo,
};
use crate::native::{ElementKind, NativeElement};
use crate::registry::TypeRegistry;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Produces specialized wrappers for native elements of one kind.
///
/// Factories are tried most-recently-registered first; returning
/// `None` passes the element to the next factory in the chain.
/// Factories must be pure: two concurrent calls for the same element
/// may both run, and either result may become canonical.
pub trait ElementFactory: Send + Sync {
    /// The element kind this factory is registered under. Lists are
    /// bound by nearest-assignable-kind walk, so a `Member` factory
    /// serves fields, properties, methods and parameters.
    fn element_kind(&self) -> ElementKind;

    /// Try to build a wrapper for `element`.
    fn try_create(
        &self,
        element: &NativeElement,
        registry: &Arc<TypeRegistry>,
    ) -> Option<ElementItem>;
}

type FactoryList = Arc<ArcSwap<Vec<Arc<dyn ElementFactory>>>>;

/// Kind-keyed factory lists with memoized kind-to-list bindings.
///
/// Readers load a list snapshot without locking; registration
/// prepends under a mutex. A reader racing a registration observes
/// the list before or after the insert, never a torn state.
pub(crate) struct FactoryChain {
    lists: DashMap<ElementKind, FactoryList>,
    /// Element kind -> nearest list that had factories when first
    /// asked. Bindings hold the list handle, so later prepends to the
    /// bound list are visible; a later list at a MORE specific kind is
    /// not rebound (accepted staleness, matched by the memoization
    /// contract of resolved bindings).
    bindings: DashMap<ElementKind, FactoryList>,
    write_lock: Mutex<()>,
}

impl FactoryChain {
    pub(crate) fn new() -> Self {
        Self {
            lists: DashMap::new(),
            bindings: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Insert `factory` at the FRONT of its kind's list, so the most
    /// recently registered factory gets first chance.
    pub(crate) fn register(&self, factory: Arc<dyn ElementFactory>) {
        let kind = factory.element_kind();
        let _guard = self.write_lock.lock();
        let list = self
            .lists
            .entry(kind)
            .or_insert_with(|| Arc::new(ArcSwap::from_pointee(Vec::new())))
            .clone();
        let snapshot = list.load();
        let mut next = Vec::with_capacity(snapshot.len() + 1);
        next.push(factory);
        next.extend(snapshot.iter().cloned());
        list.store(Arc::new(next));
        log::info!(
            "[FactoryChain] Registered {:?} factory ({} in list)",
            kind,
            snapshot.len() + 1
        );
    }

    /// Resolve the factory list for `kind` by walking up the
    /// assignability chain, memoizing the binding on first success.
    fn list_for(&self, kind: ElementKind) -> Option<FactoryList> {
        if let Some(bound) = self.bindings.get(&kind) {
            return Some(bound.clone());
        }
        let mut probe = Some(kind);
        while let Some(current) = probe {
            if let Some(list) = self.lists.get(&current) {
                let list = list.clone();
                log::debug!("[FactoryChain] Bound {:?} to {:?} factory list", kind, current);
                return Some(self.bindings.entry(kind).or_insert(list).clone());
            }
            probe = current.parent();
        }
        None
    }

    /// Run the chain for `element`; `None` only when no factory list
    /// is reachable from the element's kind or every factory passed.
    pub(crate) fn try_create(
        &self,
        element: &NativeElement,
        registry: &Arc<TypeRegistry>,
    ) -> Option<ElementItem> {
        let list = self.list_for(element.kind())?;
        let snapshot = list.load();
        snapshot
            .iter()
            .find_map(|factory| factory.try_create(element, registry))
    }
}

// ----------------------------------------------------------------------
// Default factories (the guaranteed producers, registered first so
// every later registration outranks them)
// ----------------------------------------------------------------------

/// Fallback producer for type wrappers.
pub struct DefaultTypeFactory;

impl ElementFactory for DefaultTypeFactory {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Type
    }

    fn try_create(
        &self,
        element: &NativeElement,
        registry: &Arc<TypeRegistry>,
    ) -> Option<ElementItem> {
        match element {
            NativeElement::Type(native) => Some(ElementItem::Type(Arc::new(TypeInfo::new(
                native.clone(),
                Arc::downgrade(registry),
            )))),
            _ => None,
        }
    }
}

/// Fallback producer for assembly wrappers.
pub struct DefaultAssemblyFactory;

impl ElementFactory for DefaultAssemblyFactory {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Assembly
    }

    fn try_create(
        &self,
        element: &NativeElement,
        registry: &Arc<TypeRegistry>,
    ) -> Option<ElementItem> {
        match element {
            NativeElement::Assembly(native) => Some(ElementItem::Assembly(Arc::new(
                AssemblyInfo::new(native.clone(), Arc::downgrade(registry)),
            ))),
            _ => None,
        }
    }
}

/// Fallback producer for every member wrapper; registered at the
/// `Member` level so field/property/method/parameter kinds bind to it.
pub struct DefaultMemberFactory;

impl ElementFactory for DefaultMemberFactory {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Member
    }

    fn try_create(
        &self,
        element: &NativeElement,
        registry: &Arc<TypeRegistry>,
    ) -> Option<ElementItem> {
        let weak = Arc::downgrade(registry);
        match element {
            NativeElement::Field { declaring, index } => Some(ElementItem::Field(Arc::new(
                FieldInfo::new(declaring.clone(), *index, weak),
            ))),
            NativeElement::Property { declaring, index } => Some(ElementItem::Property(Arc::new(
                PropertyInfo::new(declaring.clone(), *index, weak),
            ))),
            NativeElement::Method { declaring, index } => Some(ElementItem::Method(Arc::new(
                MethodInfo::new(declaring.clone(), *index, weak),
            ))),
            NativeElement::Parameter {
                declaring,
                method,
                index,
            } => Some(ElementItem::Parameter(Arc::new(ParameterInfo::new(
                declaring, *method, *index, weak,
            )))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::TypeBuilder;
    use crate::registry::TypeRegistry;

    struct CountingFactory {
        kind: ElementKind,
    }

    impl ElementFactory for CountingFactory {
        fn element_kind(&self) -> ElementKind {
            self.kind
        }

        fn try_create(
            &self,
            _element: &NativeElement,
            _registry: &Arc<TypeRegistry>,
        ) -> Option<ElementItem> {
            None
        }
    }

    #[test]
    fn test_nearest_kind_binding() {
        let chain = FactoryChain::new();
        chain.register(Arc::new(CountingFactory {
            kind: ElementKind::Member,
        }));

        let registry = TypeRegistry::new();
        let native = TypeBuilder::named("pkg.T")
            .read_field("n", crate::native::TypeRef::of::<i32>(), |t: &Probe| t.n)
            .build();
        let element = NativeElement::Field {
            declaring: native,
            index: 0,
        };
        // Field has no list of its own; binds to Member and the
        // factory passes, so the chain yields None (list reached,
        // factory declined).
        assert!(chain.try_create(&element, &registry).is_none());
        assert!(chain.bindings.contains_key(&ElementKind::Field));
    }

    struct Probe {
        n: i32,
    }

    #[test]
    fn test_prepend_order() {
        let chain = FactoryChain::new();
        chain.register(Arc::new(CountingFactory {
            kind: ElementKind::Type,
        }));
        chain.register(Arc::new(CountingFactory {
            kind: ElementKind::Type,
        }));
        let list = chain.list_for(ElementKind::Type).expect("list");
        assert_eq!(list.load().len(), 2);
    }
}
