// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry ("loader").
//!
//! A [`StructLoader`] maps canonical bare type names to [`Factory`]s and turns
//! type tag strings into concrete [`Reified`] descriptors:
//!
//! 1. parse the tag into a [`TagNode`] tree
//! 2. primitive names resolve directly; `vector<T>` resolves `T` and wraps it
//! 3. any other name must be registered ([`ReifyError::UnknownType`]) with
//!    the same number of arguments ([`ReifyError::ArityMismatch`])
//! 4. every argument resolves recursively, so phantom arguments must name
//!    registered types too; a phantom slot then keeps only the argument's tag
//!
//! Entries are append-only. Registering a name twice keeps the first entry.
//!
//! Successful resolutions are cached per canonical tag in an
//! [`lru::LruCache`] behind a [`parking_lot::RwLock`]. Spellings of one type
//! (`0x0002::coin::Coin< 0x2::sui::SUI >`, `0x2::coin::Coin<0x2::sui::SUI>`)
//! share one entry, and the least recently used entry is evicted once the
//! capacity ([`DEFAULT_CACHE_CAPACITY`] unless configured) is reached.
//!
//! # Process-wide loader
//!
//! ```
//! use move_reify::{init_loader_if_needed, Primitive, StructDef, StructLoader};
//!
//! fn my_package(loader: &mut StructLoader) {
//!     let def = StructDef::builder("0x42::pool::Pool")
//!         .field("reserve", Primitive::U64)
//!         .build()
//!         .unwrap();
//!     loader.register_struct(def);
//! }
//!
//! let loader = init_loader_if_needed(&[my_package]);
//! assert!(loader.resolve("0x42::pool::Pool").is_ok());
//! assert!(loader.resolve("0x2::coin::Coin<0x2::sui::SUI>").is_ok());
//! ```

use crate::error::{ReifyError, Result};
use crate::framework;
use crate::json::read_envelope;
use crate::manifest::{LoaderConfig, Manifest, ManifestError};
use crate::primitive::{Address, Primitive};
use crate::reified::{Factory, Reified, StructDef, StructReified, TypeArg};
use crate::source::ObjectSource;
use crate::type_tag::{canonical_struct_name, compose_type_name, TagNode, TypeTag, VECTOR};
use crate::value::{MoveStruct, MoveValue};
use log::{debug, trace};
use lru::LruCache;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, OnceLock};

/// Resolution cache capacity of a new loader.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// A package registration function.
pub type Package = fn(&mut StructLoader);

static GLOBAL_LOADER: OnceLock<StructLoader> = OnceLock::new();

/// Build the process-wide loader on first call.
///
/// The framework types and every package are registered exactly once; later
/// calls, including concurrent ones, return the same loader and ignore their
/// `packages` argument.
pub fn init_loader_if_needed(packages: &[Package]) -> &'static StructLoader {
    GLOBAL_LOADER.get_or_init(|| {
        let mut loader = StructLoader::with_framework();
        for package in packages {
            package(&mut loader);
        }
        debug!("type loader initialized with {} entries", loader.len());
        loader
    })
}

/// The process-wide loader, if [`init_loader_if_needed`] has run.
pub fn global_loader() -> Option<&'static StructLoader> {
    GLOBAL_LOADER.get()
}

/// Whether `tag` is an instantiation of the struct named `name`, whatever its
/// type arguments.
pub fn is_instance_of(tag: &str, name: &str) -> bool {
    match (tag.parse::<TypeTag>(), canonical_struct_name(name)) {
        (Ok(TypeTag::Struct(s)), Ok(name)) => s.name() == name,
        _ => false,
    }
}

/// Resolution cache counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

type ResolutionCache = RwLock<LruCache<String, Reified>>;

fn new_cache(capacity: usize) -> Option<ResolutionCache> {
    NonZeroUsize::new(capacity).map(|cap| RwLock::new(LruCache::new(cap)))
}

/// Registry of type factories.
pub struct StructLoader {
    entries: HashMap<String, Factory>,
    cache: Option<ResolutionCache>,
    stats: RwLock<CacheStats>,
}

impl StructLoader {
    /// Empty loader with a resolution cache of [`DEFAULT_CACHE_CAPACITY`].
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            cache: new_cache(DEFAULT_CACHE_CAPACITY),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Loader with the framework types registered.
    pub fn with_framework() -> Self {
        let mut loader = Self::new();
        framework::register(&mut loader);
        loader
    }

    /// Build a loader from configuration, registering each listed manifest.
    pub fn from_config(config: &LoaderConfig) -> std::result::Result<Self, ManifestError> {
        let mut loader = if config.include_framework {
            Self::with_framework()
        } else {
            Self::new()
        };
        loader.set_cache_capacity(if config.cache_resolutions {
            config.cache_capacity
        } else {
            0
        });
        for path in &config.manifests {
            let manifest = Manifest::from_file(path)?;
            let added = manifest.register_into(&mut loader)?;
            debug!("manifest {} registered {} structs", path.display(), added);
        }
        Ok(loader)
    }

    /// Turn resolution caching on or off; turning it off drops the cache.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        match (enabled, self.cache.is_some()) {
            (true, false) => self.cache = new_cache(DEFAULT_CACHE_CAPACITY),
            (false, true) => self.cache = None,
            _ => {}
        }
    }

    /// Bound the resolution cache to `capacity` entries. Shrinking evicts the
    /// least recently used entries; zero disables caching.
    pub fn set_cache_capacity(&mut self, capacity: usize) {
        let Some(cap) = NonZeroUsize::new(capacity) else {
            self.cache = None;
            return;
        };
        match &mut self.cache {
            Some(cache) => cache.get_mut().resize(cap),
            None => self.cache = new_cache(capacity),
        }
    }

    /// Current resolution cache capacity; zero when caching is off.
    pub fn cache_capacity(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.read().cap().get())
    }

    /// Register a closure factory whose parameters are all structural.
    ///
    /// Returns `Ok(false)` if `name` is already registered.
    pub fn register<F>(&mut self, name: &str, arity: usize, build: F) -> Result<bool>
    where
        F: Fn(&[Reified]) -> Reified + Send + Sync + 'static,
    {
        Ok(self.register_factory(Factory::custom(name, arity, build)?))
    }

    /// Register a declared struct. Returns `false` if its name is taken.
    pub fn register_struct(&mut self, def: Arc<StructDef>) -> bool {
        self.register_factory(Factory::Struct(def))
    }

    /// Register any factory. Returns `false` if its name is taken.
    pub fn register_factory(&mut self, factory: Factory) -> bool {
        let name = factory.name().to_string();
        if self.entries.contains_key(&name) {
            debug!("ignoring duplicate registration of {}", name);
            return false;
        }
        self.entries.insert(name, factory);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factory(name).is_some()
    }

    /// Registered factory for a bare name, in any address formatting.
    pub fn factory(&self, name: &str) -> Option<&Factory> {
        let name = canonical_struct_name(name).ok()?;
        self.entries.get(&name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a type tag string to a concrete descriptor.
    pub fn resolve(&self, tag: &str) -> Result<Reified> {
        let node = TagNode::parse(tag)?;
        let Some(cache) = &self.cache else {
            return self.resolve_node(&node);
        };
        // a tag that does not canonicalize cannot resolve either
        let Ok(canonical) = TypeTag::from_node(&node) else {
            return self.resolve_node(&node);
        };
        let key = canonical.to_string();

        let hit = cache.write().get(&key).cloned();
        if let Some(hit) = hit {
            self.record_hit();
            trace!("resolution cache hit for {}", key);
            return Ok(hit);
        }
        let resolved = self.resolve_node(&node)?;
        self.record_miss();
        trace!("resolution cache miss for {}", key);
        cache.write().put(key, resolved.clone());
        Ok(resolved)
    }

    fn record_hit(&self) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
    }

    /// Resolve a tag that must name a declared struct.
    pub fn resolve_struct(&self, tag: &str) -> Result<Arc<StructReified>> {
        match self.resolve(tag)? {
            Reified::Struct(s) => Ok(s),
            other => Err(ReifyError::mismatch("declared struct type", other.type_name())),
        }
    }

    fn resolve_node(&self, node: &TagNode) -> Result<Reified> {
        if let Some(p) = Primitive::from_name(&node.name) {
            if !node.args.is_empty() {
                return Err(ReifyError::ArityMismatch {
                    name: node.name.clone(),
                    expected: 0,
                    got: node.args.len(),
                });
            }
            return Ok(Reified::Primitive(p));
        }
        if node.name == VECTOR {
            if node.args.len() != 1 {
                return Err(ReifyError::ArityMismatch {
                    name: VECTOR.to_string(),
                    expected: 1,
                    got: node.args.len(),
                });
            }
            return Ok(Reified::vector(self.resolve_node(&node.args[0])?));
        }

        let name = canonical_struct_name(&node.name)
            .map_err(|_| ReifyError::UnknownType(node.name.clone()))?;
        let factory = self
            .entries
            .get(&name)
            .ok_or_else(|| ReifyError::UnknownType(name.clone()))?;
        if factory.arity() != node.args.len() {
            return Err(ReifyError::ArityMismatch {
                name,
                expected: factory.arity(),
                got: node.args.len(),
            });
        }

        let args = node
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let resolved = TypeArg::Reified(self.resolve_node(arg)?);
                Ok(if factory.is_phantom(i) {
                    resolved.into_phantom()
                } else {
                    resolved
                })
            })
            .collect::<Result<Vec<_>>>()?;
        factory.instantiate(args)
    }

    /// Resolve `tag` and decode `bytes` with it.
    pub fn from_bytes(&self, tag: &str, bytes: &[u8]) -> Result<MoveValue> {
        self.resolve(tag)?.from_bytes(bytes)
    }

    /// Decode a typed-fields struct node, resolving its declared type.
    pub fn from_typed_fields(&self, node: &Value) -> Result<MoveStruct> {
        let tag = node.get("type").and_then(Value::as_str).ok_or_else(|| {
            ReifyError::MalformedValue("typed-fields node without a string type".into())
        })?;
        self.resolve_struct(tag)?.from_typed_fields(node)
    }

    /// Decode a JSON envelope, resolving `$typeName<$typeArgs>`.
    pub fn from_json(&self, json: &Value) -> Result<MoveStruct> {
        let (name, args) = read_envelope(json)?;
        self.resolve_struct(&compose_type_name(&name, &args))?
            .from_json(json)
    }

    /// Fetch an object and decode it with the descriptor for its own tag.
    pub fn fetch_object(&self, source: &dyn ObjectSource, id: &Address) -> Result<MoveValue> {
        let raw = source.fetch_object(id)?;
        self.resolve(&raw.type_tag)?.from_bytes(&raw.bcs)
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        let mut stats = *self.stats.read();
        if let Some(cache) = &self.cache {
            let cache = cache.read();
            stats.entries = cache.len();
            stats.capacity = cache.cap().get();
        }
        stats
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }
}

impl Default for StructLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StructLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructLoader")
            .field("entries", &self.type_names())
            .field("cache", &self.cache_stats())
            .finish()
    }
}
