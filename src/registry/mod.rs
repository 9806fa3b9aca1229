//! The root resolver.
//!
//! A [`Registry`] answers "how do I turn a value of type `S` into a `T`?".
//! It consults, in order:
//!
//! 1. identity, when `S` and `T` are the same type,
//! 2. converters registered explicitly for the exact pair,
//! 3. its cache of earlier answers, negative ones included,
//! 4. its providers, in registration order, each of which may recurse back
//!    into the registry for element types.
//!
//! The answer from step 4 is cached, so each pair is resolved at most once
//! for the lifetime of the registry (or until [`Registry::clear_cache`]).
//!
//! # Examples
//!
//! ```
//! use std::collections::VecDeque;
//!
//! use changetype::{PersistentList, Registry, RuntimeType};
//!
//! let registry = Registry::builder()
//!     .converter(|n: u8| f64::from(n) / 2.0)
//!     .build();
//!
//! let halves: PersistentList<f64> = registry.convert(VecDeque::from([1_u8, 4])).unwrap();
//! assert_eq!(halves.iter().copied().collect::<Vec<_>>(), [0.5, 2.0]);
//!
//! assert!(!registry.can_convert(RuntimeType::of::<Vec<u8>>(), RuntimeType::of::<Vec<bool>>()));
//! ```

mod global;
mod lock;

use alloc::{boxed::Box, vec::Vec};
use core::{any::TypeId, cell::RefCell, fmt};

use hashbrown::HashMap;
use indexmap::IndexMap;
use rootcause::Report;
use rustc_hash::FxBuildHasher;

pub use self::global::{GlobalRegistry, RegistryAlreadyInstalledError};
use self::lock::RegistryLock;
use crate::{
    converter::{Converter, ConverterResolver},
    error::{ConversionError, ConversionResult},
    providers::{ConverterProvider, PersistentListProvider, SequenceProvider},
    ty::{Reflect, RuntimeType, present_or_null},
    value::Value,
};

type PairMap<V> = HashMap<(TypeId, TypeId), V, FxBuildHasher>;

struct StoredProvider {
    name: &'static str,
    provider: Box<dyn ConverterProvider>,
}

/// Resolves and caches converters between runtime types.
///
/// Create one with [`Registry::new`] for the built-in providers, or with
/// [`Registry::builder`] to add converters and providers of your own.
pub struct Registry {
    converters: PairMap<Converter>,
    providers: IndexMap<TypeId, StoredProvider, FxBuildHasher>,
    cache: RegistryLock<PairMap<Option<Converter>>>,
}

impl Registry {
    /// Creates a registry with the built-in providers and no explicit
    /// converters.
    #[must_use]
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Starts configuring a registry with the built-in providers.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Finds a converter from `source` to `target`.
    ///
    /// Returns `None` if no registered converter or provider can handle the
    /// pair. A pair that is requested again while its own providers are still
    /// running declines, so types nested in themselves do not recurse
    /// forever.
    pub fn resolve(&self, source: RuntimeType, target: RuntimeType) -> Option<Converter> {
        Resolution::new(self).resolve(source, target)
    }

    fn lookup(&self, key: &(TypeId, TypeId)) -> Option<Option<Converter>> {
        if let Some(converter) = self.converters.get(key) {
            return Some(Some(converter.clone()));
        }
        self.cache.read().get(key).cloned()
    }

    fn create(
        &self,
        source: RuntimeType,
        target: RuntimeType,
        root: &dyn ConverterResolver,
    ) -> Option<Converter> {
        for stored in self.providers.values() {
            if let Some(converter) = stored.provider.try_create(source, target, root) {
                tracing::debug!(%source, %target, provider = stored.name, "created converter");
                return Some(converter);
            }
        }
        tracing::debug!(%source, %target, "no provider can convert");
        None
    }

    /// Returns `true` if a converter from `source` to `target` exists.
    #[must_use]
    pub fn can_convert(&self, source: RuntimeType, target: RuntimeType) -> bool {
        self.resolve(source, target).is_some()
    }

    /// Converts `value` into a `T`.
    ///
    /// Fails with [`ConversionError::NoConverter`] if the pair cannot be
    /// resolved, and with whatever the converter reports otherwise.
    pub fn convert<S: Reflect, T: Reflect>(&self, value: S) -> ConversionResult<T> {
        let source = RuntimeType::of::<S>();
        let target = RuntimeType::of::<T>();
        let converter = self
            .resolve(source, target)
            .ok_or_else(|| Report::new_sendsync(no_converter(source, target)))?;

        match converter.convert(Some(Value::new(value)))? {
            Some(output) => output.expect_type::<T>(),
            None => present_or_null(T::absent()),
        }
    }

    /// Converts an erased value into `target`.
    ///
    /// An absent value converts to an absent value for any target.
    pub fn convert_value(
        &self,
        value: Option<Value>,
        target: RuntimeType,
    ) -> ConversionResult<Option<Value>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let source = value.runtime_type();
        let converter = self
            .resolve(source, target)
            .ok_or_else(|| Report::new_sendsync(no_converter(source, target)))?;
        converter.convert(Some(value))
    }

    /// Number of type pairs whose resolution is cached.
    #[must_use]
    pub fn cached_pairs(&self) -> usize {
        self.cache.read().len()
    }

    /// Forgets every cached resolution.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}

fn no_converter(source: RuntimeType, target: RuntimeType) -> ConversionError {
    ConversionError::NoConverter {
        source: source.name(),
        target: target.name(),
    }
}

/// A single top-level resolution, with the pairs whose providers are
/// currently running.
struct Resolution<'a> {
    registry: &'a Registry,
    in_progress: RefCell<Vec<(TypeId, TypeId)>>,
}

impl<'a> Resolution<'a> {
    fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            in_progress: RefCell::new(Vec::new()),
        }
    }
}

impl ConverterResolver for Resolution<'_> {
    fn resolve(&self, source: RuntimeType, target: RuntimeType) -> Option<Converter> {
        if source == target {
            return Some(Converter::identity(source));
        }

        let key = (source.type_id(), target.type_id());
        if let Some(found) = self.registry.lookup(&key) {
            tracing::trace!(%source, %target, hit = found.is_some(), "converter cache hit");
            return found;
        }

        if self.in_progress.borrow().contains(&key) {
            tracing::trace!(%source, %target, "declined cyclic resolution");
            return None;
        }

        // Providers call back into `resolve`, so neither the cache lock nor
        // the in-progress borrow is held while they run.
        self.in_progress.borrow_mut().push(key);
        let resolved = self.registry.create(source, target, self);
        self.in_progress.borrow_mut().pop();

        self.registry
            .cache
            .write()
            .entry(key)
            .or_insert(resolved)
            .clone()
    }
}

impl ConverterResolver for Registry {
    fn resolve(&self, source: RuntimeType, target: RuntimeType) -> Option<Converter> {
        Registry::resolve(self, source, target)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("converters", &self.converters.values())
            .field(
                "providers",
                &self
                    .providers
                    .values()
                    .map(|stored| stored.name)
                    .collect::<Vec<_>>(),
            )
            .field("cached_pairs", &self.cached_pairs())
            .finish()
    }
}

/// Builder for a [`Registry`].
///
/// # Examples
///
/// ```
/// use changetype::{ConversionError, Registry, RegistryBuilder, SequenceProvider};
/// use rootcause::Report;
///
/// let registry = RegistryBuilder::empty()
///     .provider(SequenceProvider)
///     .try_converter(|n: i64| {
///         u8::try_from(n).map_err(|_| Report::new_sendsync(ConversionError::invalid_value("out of range")))
///     })
///     .build();
///
/// let bytes: Vec<u8> = registry.convert(vec![1_i64, 2]).unwrap();
/// assert_eq!(bytes, [1, 2]);
/// assert!(registry.convert::<_, Vec<u8>>(vec![256_i64]).is_err());
/// ```
pub struct RegistryBuilder {
    converters: PairMap<Converter>,
    providers: IndexMap<TypeId, StoredProvider, FxBuildHasher>,
}

impl RegistryBuilder {
    /// Creates a builder with the built-in providers.
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .provider(PersistentListProvider)
            .provider(SequenceProvider)
    }

    /// Creates a builder with no providers at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            converters: PairMap::default(),
            providers: IndexMap::default(),
        }
    }

    /// Registers an infallible converter from `A` to `B`.
    #[must_use]
    pub fn converter<A, B, F>(self, function: F) -> Self
    where
        A: Reflect,
        B: Reflect,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.register(Converter::from_fn(function))
    }

    /// Registers a fallible converter from `A` to `B`.
    #[must_use]
    pub fn try_converter<A, B, F>(self, function: F) -> Self
    where
        A: Reflect,
        B: Reflect,
        F: Fn(A) -> ConversionResult<B> + Send + Sync + 'static,
    {
        self.register(Converter::try_from_fn(function))
    }

    /// Registers a converter for its source and target pair.
    ///
    /// A later registration for the same pair replaces the earlier one.
    #[must_use]
    pub fn register(mut self, converter: Converter) -> Self {
        let key = (converter.source().type_id(), converter.target().type_id());
        self.converters.insert(key, converter);
        self
    }

    /// Appends a provider.
    ///
    /// Registering a second provider of the same type replaces the first in
    /// place, keeping its position in the order providers are asked.
    #[must_use]
    pub fn provider<P: ConverterProvider>(mut self, provider: P) -> Self {
        self.providers.insert(
            TypeId::of::<P>(),
            StoredProvider {
                name: core::any::type_name::<P>(),
                provider: Box::new(provider),
            },
        );
        self
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            converters: self.converters,
            providers: self.providers,
            cache: RegistryLock::new(PairMap::default()),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("converters", &self.converters.len())
            .field("providers", &self.providers.len())
            .finish()
    }
}
