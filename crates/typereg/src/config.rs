// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration - constants and runtime knobs.
//!
//! - **Level 1 (Static)**: compile-time defaults below.
//! - **Level 2 (Dynamic)**: [`RegistryConfig`], overridable through
//!   `TYPEREG_*` environment variables. Invalid values are logged and
//!   ignored.

/// Initial capacity of the type wrapper cache.
///
/// The cache is grow-only; this only sizes the initial allocation.
pub const DEFAULT_TYPE_CACHE_CAPACITY: usize = 256;

/// Initial capacity of the assembly wrapper cache.
pub const DEFAULT_ASSEMBLY_CACHE_CAPACITY: usize = 8;

/// Runtime configuration for a [`TypeRegistry`].
///
/// [`TypeRegistry`]: crate::registry::TypeRegistry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Attempt property accessor compilation (direct delegates).
    /// When disabled every property uses the reflective route.
    pub fast_accessors: bool,
    /// Initial type cache capacity.
    pub type_cache_capacity: usize,
    /// Initial assembly cache capacity.
    pub assembly_cache_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fast_accessors: true,
            type_cache_capacity: DEFAULT_TYPE_CACHE_CAPACITY,
            assembly_cache_capacity: DEFAULT_ASSEMBLY_CACHE_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Build from defaults plus `TYPEREG_*` environment overrides.
    ///
    /// Recognized variables:
    /// - `TYPEREG_FAST_ACCESSORS` = `0`/`false` disables compilation
    /// - `TYPEREG_TYPE_CACHE_CAPACITY` = initial type cache size
    /// - `TYPEREG_ASSEMBLY_CACHE_CAPACITY` = initial assembly cache size
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("TYPEREG_FAST_ACCESSORS") {
            match raw.as_str() {
                "1" | "true" => config.fast_accessors = true,
                "0" | "false" => config.fast_accessors = false,
                other => {
                    log::warn!(
                        "[RegistryConfig] Ignoring invalid TYPEREG_FAST_ACCESSORS='{}'",
                        other
                    );
                }
            }
        }

        config.type_cache_capacity = env_capacity(
            "TYPEREG_TYPE_CACHE_CAPACITY",
            config.type_cache_capacity,
        );
        config.assembly_cache_capacity = env_capacity(
            "TYPEREG_ASSEMBLY_CACHE_CAPACITY",
            config.assembly_cache_capacity,
        );

        config
    }
}

fn env_capacity(var: &str, default: usize) -> usize {
    match std::env::var(var) {
        Ok(raw) => match raw.parse::<usize>() {
            Ok(value) if value > 0 => value,
            _ => {
                log::warn!("[RegistryConfig] Ignoring invalid {}='{}'", var, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert!(config.fast_accessors);
        assert_eq!(config.type_cache_capacity, DEFAULT_TYPE_CACHE_CAPACITY);
        assert_eq!(
            config.assembly_cache_capacity,
            DEFAULT_ASSEMBLY_CACHE_CAPACITY
        );
    }

    #[test]
    fn test_env_capacity_rejects_zero_and_garbage() {
        // Env mutation is process-global; exercise the parser directly.
        assert_eq!(env_capacity("TYPEREG_UNSET_VARIABLE", 64), 64);
    }
}
