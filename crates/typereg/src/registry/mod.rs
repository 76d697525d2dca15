// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide type-metadata registry.
//!
//! The registry is the arena every wrapper lives in: one canonical
//! `Arc<TypeInfo>` per type identity, one `Arc<AssemblyInfo>` per
//! assembly name, both grow-only. Wrapper construction goes through
//! the pluggable factory chain; a pre-registered default factory per
//! element family guarantees a producer.

mod factory;

pub use factory::{
    DefaultAssemblyFactory, DefaultMemberFactory, DefaultTypeFactory, ElementFactory,
};

use crate::config::RegistryConfig;
use crate::info::{AssemblyInfo, ElementItem, TypeInfo};
use crate::loader::{DefaultTypeLoader, DisplayProvider, NullDisplayProvider, TypeLoader};
use crate::native::{
    NativeAssembly, NativeElement, NativeType, TypeIdent, TypeRef,
};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use factory::FactoryChain;
use std::sync::{Arc, OnceLock, Weak};

static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// Cached, extensible registry of type and assembly wrappers.
pub struct TypeRegistry {
    config: RegistryConfig,
    types: DashMap<TypeIdent, Arc<TypeInfo>>,
    /// Full name -> identity, for by-name lookup of cached wrappers.
    by_name: DashMap<Arc<str>, TypeIdent>,
    assemblies: DashMap<Arc<str>, Arc<AssemblyInfo>>,
    factories: FactoryChain,
    loader: ArcSwap<Box<dyn TypeLoader>>,
    display: ArcSwap<Box<dyn DisplayProvider>>,
    weak_self: Weak<TypeRegistry>,
}

impl TypeRegistry {
    /// New registry with default configuration and collaborators.
    pub fn new() -> Arc<Self> {
        Self::with_config(RegistryConfig::default())
    }

    /// New registry with explicit configuration.
    pub fn with_config(config: RegistryConfig) -> Arc<Self> {
        Self::with_collaborators(
            config,
            Box::new(DefaultTypeLoader),
            Box::new(NullDisplayProvider),
        )
    }

    /// New registry with explicit configuration and collaborators.
    pub fn with_collaborators(
        config: RegistryConfig,
        loader: Box<dyn TypeLoader>,
        display: Box<dyn DisplayProvider>,
    ) -> Arc<Self> {
        let registry = Arc::new_cyclic(|weak_self| Self {
            types: DashMap::with_capacity(config.type_cache_capacity),
            by_name: DashMap::with_capacity(config.type_cache_capacity),
            assemblies: DashMap::with_capacity(config.assembly_cache_capacity),
            factories: FactoryChain::new(),
            loader: ArcSwap::from_pointee(loader),
            display: ArcSwap::from_pointee(display),
            weak_self: weak_self.clone(),
            config,
        });
        // Guaranteed producers, registered first so every later
        // registration outranks them.
        registry.register_factory(Arc::new(DefaultTypeFactory));
        registry.register_factory(Arc::new(DefaultAssemblyFactory));
        registry.register_factory(Arc::new(DefaultMemberFactory));
        registry
    }

    /// Process-global registry, created on first use from
    /// [`RegistryConfig::from_env`].
    pub fn global() -> &'static Arc<TypeRegistry> {
        GLOBAL.get_or_init(|| {
            log::info!("[TypeRegistry] Creating global registry");
            Self::with_config(RegistryConfig::from_env())
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Current type loader collaborator.
    pub fn type_loader(&self) -> Arc<Box<dyn TypeLoader>> {
        self.loader.load_full()
    }

    /// Replace the type loader collaborator.
    pub fn set_type_loader(&self, loader: Box<dyn TypeLoader>) {
        self.loader.store(Arc::new(loader));
    }

    /// Current display provider collaborator.
    pub fn display_provider(&self) -> Arc<Box<dyn DisplayProvider>> {
        self.display.load_full()
    }

    /// Replace the display provider collaborator.
    pub fn set_display_provider(&self, display: Box<dyn DisplayProvider>) {
        self.display.store(Arc::new(display));
    }

    fn strong_self(&self) -> Option<Arc<TypeRegistry>> {
        self.weak_self.upgrade()
    }

    // ------------------------------------------------------------------
    // Type wrappers
    // ------------------------------------------------------------------

    /// Canonical wrapper for `native`, building and caching it on
    /// first sight. Never fails.
    ///
    /// Concurrent misses may both build; exactly one wrapper becomes
    /// canonical and losers are discarded.
    pub fn get_type_info(&self, native: &Arc<NativeType>) -> Arc<TypeInfo> {
        if let Some(existing) = self.types.get(&native.ident) {
            return existing.clone();
        }
        // Build outside any map lock; factories may re-enter the
        // registry.
        let built = self.create_type_info(native);
        log::debug!("[TypeRegistry] Caching type wrapper '{}'", native.full_name);
        let winner = self
            .types
            .entry(native.ident.clone())
            .or_insert(built)
            .clone();
        self.by_name
            .insert(winner.native().full_name.clone(), native.ident.clone());
        winner
    }

    fn create_type_info(&self, native: &Arc<NativeType>) -> Arc<TypeInfo> {
        if let Some(registry) = self.strong_self() {
            if let Some(ElementItem::Type(info)) = self
                .factories
                .try_create(&NativeElement::Type(native.clone()), &registry)
            {
                return info;
            }
        }
        Arc::new(TypeInfo::new(native.clone(), self.weak_self.clone()))
    }

    pub(crate) fn type_info_from_native(&self, native: Arc<NativeType>) -> Arc<TypeInfo> {
        self.get_type_info(&native)
    }

    /// Cached wrapper for the Rust type `T`, if one was registered.
    pub fn get_type_info_of<T: 'static>(&self) -> Option<Arc<TypeInfo>> {
        self.cached_type(&TypeIdent::of::<T>())
    }

    /// Cached wrapper by full name, if one was registered.
    pub fn get_type_info_by_name(&self, full_name: &str) -> Option<Arc<TypeInfo>> {
        let ident = self.by_name.get(full_name)?.clone();
        self.cached_type(&ident)
    }

    pub(crate) fn cached_type(&self, ident: &TypeIdent) -> Option<Arc<TypeInfo>> {
        self.types.get(ident).map(|entry| entry.clone())
    }

    /// Wrapper for `ident`, synthesizing and caching a minimal
    /// `Unknown` descriptor when no table was registered for it.
    pub(crate) fn resolve_ident(&self, ident: &TypeIdent) -> Arc<TypeInfo> {
        if let Some(existing) = self.cached_type(ident) {
            return existing;
        }
        log::debug!(
            "[TypeRegistry] Synthesizing unknown descriptor for '{}'",
            ident.name()
        );
        self.get_type_info(&Arc::new(NativeType::unknown(ident.clone())))
    }

    /// Resolve a descriptor-internal reference: a concrete identity,
    /// or a generic-parameter index of `declaring` rendered as a named
    /// placeholder.
    pub(crate) fn resolve_ref(
        &self,
        type_ref: &TypeRef,
        declaring: &Arc<NativeType>,
    ) -> Arc<TypeInfo> {
        match type_ref {
            TypeRef::Ident(ident) => self.resolve_ident(ident),
            TypeRef::GenericParam(index) => {
                let placeholder = declaring
                    .generic_params
                    .get(*index)
                    .cloned()
                    .unwrap_or_else(|| Arc::from("?"));
                self.resolve_ident(&TypeIdent::Named(placeholder))
            }
        }
    }

    // ------------------------------------------------------------------
    // Assembly wrappers
    // ------------------------------------------------------------------

    /// Canonical wrapper for `native`, building and caching it on
    /// first sight. Same optimistic publication as types.
    pub fn get_assembly_info(&self, native: &Arc<NativeAssembly>) -> Arc<AssemblyInfo> {
        if let Some(existing) = self.assemblies.get(&native.full_name) {
            return existing.clone();
        }
        let built = self.create_assembly_info(native);
        log::info!(
            "[TypeRegistry] Registered assembly '{}' ({} providers)",
            native.full_name,
            native.providers().len()
        );
        self.assemblies
            .entry(native.full_name.clone())
            .or_insert(built)
            .clone()
    }

    fn create_assembly_info(&self, native: &Arc<NativeAssembly>) -> Arc<AssemblyInfo> {
        if let Some(registry) = self.strong_self() {
            if let Some(ElementItem::Assembly(info)) = self
                .factories
                .try_create(&NativeElement::Assembly(native.clone()), &registry)
            {
                return info;
            }
        }
        Arc::new(AssemblyInfo::new(native.clone(), self.weak_self.clone()))
    }

    /// Register an assembly at startup. Same operation as
    /// [`get_assembly_info`](Self::get_assembly_info); the name reads
    /// better at registration call sites.
    pub fn register_assembly(&self, native: &Arc<NativeAssembly>) -> Arc<AssemblyInfo> {
        self.get_assembly_info(native)
    }

    pub(crate) fn cached_assembly(&self, full_name: &str) -> Option<Arc<AssemblyInfo>> {
        self.assemblies.get(full_name).map(|entry| entry.clone())
    }

    /// All registered assembly wrappers.
    pub fn assemblies(&self) -> Vec<Arc<AssemblyInfo>> {
        self.assemblies
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Factory chain
    // ------------------------------------------------------------------

    /// Register a wrapper factory at the FRONT of its kind's list:
    /// the most recently registered factory gets first chance.
    ///
    /// Already-cached wrappers are not rebuilt; the factory affects
    /// resolutions performed after registration.
    pub fn register_factory(&self, factory: Arc<dyn ElementFactory>) {
        self.factories.register(factory);
    }

    /// Run the factory chain for an arbitrary native element.
    ///
    /// `None` only when no factory list is reachable from the
    /// element's kind or every factory declined.
    pub fn try_create_element_info(&self, element: &NativeElement) -> Option<ElementItem> {
        let registry = self.strong_self()?;
        self.factories.try_create(element, &registry)
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("assemblies", &self.assemblies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::Element;
    use crate::native::{TypeBuilder, TypeKind};

    struct Point {
        x: f64,
    }

    fn point_type() -> Arc<NativeType> {
        TypeBuilder::of::<Point>("geom.Point")
            .kind(TypeKind::Class)
            .field(
                "x",
                TypeRef::of::<f64>(),
                |p: &Point| p.x,
                |p: &mut Point, v: f64| p.x = v,
            )
            .build()
    }

    #[test]
    fn test_cache_idempotence() {
        let registry = TypeRegistry::new();
        let native = point_type();
        let a = registry.get_type_info(&native);
        let b = registry.get_type_info(&native);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_lookup_by_name_and_type_id() {
        let registry = TypeRegistry::new();
        let info = registry.get_type_info(&point_type());
        let by_name = registry.get_type_info_by_name("geom.Point").expect("name");
        let by_id = registry.get_type_info_of::<Point>().expect("id");
        assert!(Arc::ptr_eq(&info, &by_name));
        assert!(Arc::ptr_eq(&info, &by_id));
        assert!(registry.get_type_info_by_name("geom.Missing").is_none());
    }

    #[test]
    fn test_unknown_synthesis_is_canonical() {
        let registry = TypeRegistry::new();
        let a = registry.resolve_ident(&TypeIdent::named("ext.Mystery"));
        let b = registry.resolve_ident(&TypeIdent::named("ext.Mystery"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.kind(), TypeKind::Unknown);
        assert_eq!(a.name(), "Mystery");
    }

    #[test]
    fn test_global_is_singleton() {
        let a = TypeRegistry::global();
        let b = TypeRegistry::global();
        assert!(Arc::ptr_eq(a, b));
    }
}
