// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Boundary collaborators: the type loader and the display provider.
//!
//! Both are consumed, not produced, by this crate. Hosts plug their
//! own implementations into [`TypeRegistry::with_collaborators`].
//!
//! [`TypeRegistry::with_collaborators`]: crate::registry::TypeRegistry::with_collaborators

use crate::native::{NativeAssembly, NativeType};
use std::sync::Arc;

/// Enumerates the loadable exported types of an assembly.
///
/// Implementations must be tolerant of partial load failures: a type
/// that fails to load is excluded, never surfaced as a whole-assembly
/// failure.
pub trait TypeLoader: Send + Sync {
    fn loadable_exported_types(&self, assembly: &NativeAssembly) -> Vec<Arc<NativeType>>;
}

/// Default loader: walks the assembly's lazy providers and skips the
/// ones that fail.
pub struct DefaultTypeLoader;

impl TypeLoader for DefaultTypeLoader {
    fn loadable_exported_types(&self, assembly: &NativeAssembly) -> Vec<Arc<NativeType>> {
        let mut types = Vec::with_capacity(assembly.providers().len());
        for provider in assembly.providers() {
            match provider() {
                Ok(native) => types.push(native),
                Err(err) => {
                    log::debug!(
                        "[TypeLoader] Skipping unloadable type in assembly '{}': {}",
                        assembly.full_name,
                        err
                    );
                }
            }
        }
        types
    }
}

/// Human-readable metadata for an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayInfo {
    pub name: String,
    pub description: Option<String>,
    pub prompt: Option<String>,
}

impl DisplayInfo {
    /// Fallback display built from the element's own name.
    pub fn from_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            prompt: None,
        }
    }
}

/// Optional localization/display source, keyed by element full name.
pub trait DisplayProvider: Send + Sync {
    fn display_for(&self, full_name: &str) -> Option<DisplayInfo>;
}

/// Provider that supplies nothing; wrappers fall back to their names.
pub struct NullDisplayProvider;

impl DisplayProvider for NullDisplayProvider {
    fn display_for(&self, _full_name: &str) -> Option<DisplayInfo> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::native::{AssemblyBuilder, TypeBuilder};

    #[test]
    fn test_default_loader_skips_failing_providers() {
        let good = TypeBuilder::named("pkg.Good").build();
        let assembly = AssemblyBuilder::new("pkg")
            .provide_type(good)
            .provide(|| {
                Err(Error::Invocation {
                    member: "pkg.Bad".into(),
                    message: "missing symbol".into(),
                })
            })
            .build();

        let loaded = DefaultTypeLoader.loadable_exported_types(&assembly);
        assert_eq!(loaded.len(), 1);
        assert_eq!(&*loaded[0].full_name, "pkg.Good");
    }

    #[test]
    fn test_null_display_provider() {
        assert!(NullDisplayProvider.display_for("pkg.Good").is_none());
        let info = DisplayInfo::from_name("Good");
        assert_eq!(info.name, "Good");
        assert!(info.description.is_none());
    }
}
