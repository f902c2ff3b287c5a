//! The container: lookup, caching, lifecycle policy, and injection wiring.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, trace};

use crate::class::{AnyShared, Class};
use crate::error::{ResolveError, ResolveResult};
use crate::factory::{Deps, Factory};
use crate::internal::StackGuard;
use crate::meta::{Meta, MetaMap};
use crate::options::{merge, EntryOptions, LifecycleFlag};
use crate::resolver::Resolver;
use crate::specifier::Specifier;

/// Meta key under which the container records a class's container-local
/// short name (the name portion of the first specifier it resolved for).
pub const LOCAL_NAME_KEY: &str = "local-name";

/// Meta key under which class-level injections are stored for singleton,
/// non-instantiated entries. See [`Container::class_injections`].
pub const CLASS_INJECTIONS_KEY: &str = "injections";

/// What `lookup` yields: a live instance or the bare class, depending on the
/// specifier's effective `instantiate` option.
#[derive(Clone)]
pub enum Resolved {
    /// A constructed instance, injections applied.
    Instance(AnyShared),
    /// The bare class (`instantiate: false`).
    Class(Class),
}

impl Resolved {
    /// The instance, if this is the instantiated variant.
    pub fn instance(&self) -> Option<&AnyShared> {
        match self {
            Resolved::Instance(value) => Some(value),
            Resolved::Class(_) => None,
        }
    }

    /// The class, if this is the bare-class variant.
    pub fn class(&self) -> Option<&Class> {
        match self {
            Resolved::Class(class) => Some(class),
            Resolved::Instance(_) => None,
        }
    }

    /// Downcasts to a concrete type: the instance itself, or the payload of
    /// a plain-value class.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> ResolveResult<Arc<T>> {
        match self {
            Resolved::Instance(value) => value
                .clone()
                .downcast::<T>()
                .map_err(|_| ResolveError::TypeMismatch(std::any::type_name::<T>())),
            Resolved::Class(class) => class
                .value_as::<T>()
                .ok_or(ResolveError::TypeMismatch(std::any::type_name::<T>())),
        }
    }

    /// Reference equality: same instance allocation, or same class.
    pub fn ptr_eq(&self, other: &Resolved) -> bool {
        match (self, other) {
            (Resolved::Instance(a), Resolved::Instance(b)) => Arc::ptr_eq(a, b),
            (Resolved::Class(a), Resolved::Class(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Instance(_) => f.write_str("Resolved::Instance"),
            Resolved::Class(class) => write!(f, "Resolved::Class({})", class.name()),
        }
    }
}

/// Private mutable state exclusively owned by one container.
///
/// Each table is locked independently, and no lock is ever held across a
/// constructor, hook, or resolver call.
pub(crate) struct ContainerState {
    /// Manual registrations, insertion-ordered, replace-in-place.
    registrations: Mutex<Vec<(Specifier, Class)>>,
    /// Resolver chain; insertion order is precedence order.
    resolvers: Mutex<Vec<Arc<dyn Resolver>>>,
    /// Lifecycle options keyed by full specifier or bare type.
    options: Mutex<HashMap<String, EntryOptions>>,
    class_cache: Mutex<HashMap<Specifier, Class>>,
    factory_cache: Mutex<HashMap<Specifier, Factory>>,
    instance_cache: Mutex<HashMap<Specifier, Resolved>>,
    meta: MetaMap,
}

/// Specifier-keyed dependency resolution container.
///
/// The single source of truth for "how do I get an instance of X": turns a
/// `"type:name"` specifier into a class or a constructed, injected instance,
/// with memoized resolution across manual registrations and a precedence-
/// ordered resolver chain, and per-specifier/per-type lifecycle options.
///
/// Cloning the handle is cheap; every clone shares the same state.
///
/// # Examples
///
/// ```rust
/// use lodestone::{Class, Container, CreateArgs, Deps, EntryOptions};
/// use std::sync::Arc;
///
/// struct Logger;
/// struct Mailer {
///     logger: Arc<Logger>,
/// }
///
/// let container = Container::new();
///
/// let logger = Class::builder("Logger")
///     .construct(|_deps: &Deps, _args: &CreateArgs| Ok(Logger))
///     .build()?;
/// let mailer = Class::builder("Mailer")
///     .inject("logger", "service:logger")
///     .construct(|deps: &Deps, _args: &CreateArgs| {
///         Ok(Mailer { logger: deps.instance::<Logger>("logger")? })
///     })
///     .build()?;
///
/// let live = EntryOptions::new().singleton(true).instantiate(true);
/// container.register_with("service:logger", logger, live)?;
/// container.register_with("service:mailer", mailer, live)?;
///
/// let first = container.lookup_as::<Mailer>("service:mailer")?;
/// let second = container.lookup_as::<Mailer>("service:mailer")?;
/// assert!(Arc::ptr_eq(&first, &second));
/// assert!(Arc::ptr_eq(&first.logger, &container.lookup_as::<Logger>("service:logger")?));
/// # Ok::<(), lodestone::ResolveError>(())
/// ```
#[derive(Clone, Default)]
pub struct Container {
    state: Arc<ContainerState>,
}

impl Default for ContainerState {
    fn default() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            resolvers: Mutex::new(Vec::new()),
            options: Mutex::new(HashMap::new()),
            class_cache: Mutex::new(HashMap::new()),
            factory_cache: Mutex::new(HashMap::new()),
            instance_cache: Mutex::new(HashMap::new()),
            meta: MetaMap::default(),
        }
    }
}

impl Container {
    /// An empty container: no registrations, no resolvers, default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: &Weak<ContainerState>) -> Option<Container> {
        state.upgrade().map(|state| Container { state })
    }

    /// Appends a resolver to the chain. Earlier resolvers win `retrieve`
    /// ties; `available_for_type` aggregates across all of them.
    pub fn add_resolver(&self, resolver: Arc<dyn Resolver>) {
        self.state.resolvers.lock().unwrap().push(resolver);
    }

    /// Registers `class` under `specifier`, overwriting any prior
    /// registration for that exact specifier.
    ///
    /// Registrations take precedence over the resolver chain. Already-derived
    /// caches are left alone; call [`clear_cache`](Container::clear_cache) to
    /// override an already-resolved specifier.
    pub fn register(&self, specifier: &str, class: Class) -> ResolveResult<()> {
        self.register_with(specifier, class, EntryOptions::default())
    }

    /// Registers `class` and applies each supplied lifecycle option for the
    /// exact specifier via [`set_option`](Container::set_option).
    pub fn register_with(
        &self,
        specifier: &str,
        class: Class,
        options: EntryOptions,
    ) -> ResolveResult<()> {
        let parsed: Specifier = specifier.parse()?;
        debug!(specifier = %parsed, class = class.name(), "registering entry");
        {
            let mut registrations = self.state.registrations.lock().unwrap();
            if let Some(slot) = registrations.iter_mut().find(|(s, _)| s == &parsed) {
                slot.1 = class;
            } else {
                registrations.push((parsed, class));
            }
        }
        if let Some(value) = options.singleton {
            self.set_option(specifier, LifecycleFlag::Singleton, value);
        }
        if let Some(value) = options.instantiate {
            self.set_option(specifier, LifecycleFlag::Instantiate, value);
        }
        Ok(())
    }

    /// Resolves `specifier` to an instance or a bare class, per its
    /// effective lifecycle options.
    ///
    /// Singleton specifiers return the same reference on every call for the
    /// life of the container. Fails with [`ResolveError::NotFound`] when
    /// neither a registration nor any resolver produces a class.
    pub fn lookup(&self, specifier: &str) -> ResolveResult<Resolved> {
        let parsed: Specifier = specifier.parse()?;
        self.lookup_parsed(&parsed, false)?
            .ok_or(ResolveError::NotFound(parsed))
    }

    /// Like [`lookup`](Container::lookup), but a missing specifier yields
    /// `Ok(None)` instead of an error. All other failures still propagate.
    pub fn lookup_loose(&self, specifier: &str) -> ResolveResult<Option<Resolved>> {
        let parsed: Specifier = specifier.parse()?;
        self.lookup_parsed(&parsed, true)
    }

    /// Strict lookup downcast to a concrete type.
    pub fn lookup_as<T: Send + Sync + 'static>(&self, specifier: &str) -> ResolveResult<Arc<T>> {
        self.lookup(specifier)?.downcast::<T>()
    }

    /// Eagerly resolves every entry available under `type_name`, keyed by
    /// the name portion of each specifier.
    ///
    /// Every entry is looked up strictly (and, per its options, possibly
    /// instantiated) on every call; only the per-specifier caches apply, the
    /// aggregate itself is never cached. Callers may rely on this eagerness
    /// to force on-load hooks across a whole type.
    pub fn lookup_all(&self, type_name: &str) -> ResolveResult<HashMap<String, Resolved>> {
        let names = self.available_for_type(type_name);
        let mut resolved = HashMap::with_capacity(names.len());
        for name in names {
            let specifier = Specifier::from_parts(type_name, &name)?;
            let value = self
                .lookup_parsed(&specifier, false)?
                .ok_or(ResolveError::NotFound(specifier))?;
            resolved.insert(name, value);
        }
        Ok(resolved)
    }

    /// Builds (or reuses) the [`Factory`] for `specifier`.
    ///
    /// Resolution order, first hit wins: factory cache, class cache, manual
    /// registration, then each resolver in chain order.
    pub fn factory_for(&self, specifier: &str) -> ResolveResult<Factory> {
        let parsed: Specifier = specifier.parse()?;
        self.factory_for_parsed(&parsed, false)?
            .ok_or(ResolveError::NotFound(parsed))
    }

    /// Like [`factory_for`](Container::factory_for), but a missing specifier
    /// yields `Ok(None)` instead of an error.
    pub fn factory_for_loose(&self, specifier: &str) -> ResolveResult<Option<Factory>> {
        let parsed: Specifier = specifier.parse()?;
        self.factory_for_parsed(&parsed, true)
    }

    /// Every name available under `type_name`: manual registrations first
    /// (insertion order), then each resolver's enumeration in chain order,
    /// deduplicated so the first occurrence survives.
    pub fn available_for_type(&self, type_name: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .state
            .registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s.type_name() == type_name)
            .map(|(s, _)| s.name().to_string())
            .collect();
        let resolvers = self.state.resolvers.lock().unwrap().clone();
        for resolver in &resolvers {
            names.extend(resolver.available_for_type(type_name));
        }
        let mut seen = HashSet::new();
        names.retain(|name| seen.insert(name.clone()));
        names
    }

    /// The effective value of `flag` for `target`, which may be a full
    /// specifier or a bare type.
    ///
    /// Merged first-defined-wins per key: the exact-specifier entry, then
    /// the type-level entry, then the global defaults
    /// (`singleton: true`, `instantiate: false`).
    pub fn get_option(&self, target: &str, flag: LifecycleFlag) -> bool {
        match target.parse::<Specifier>() {
            Ok(specifier) => self.option_for(&specifier, flag),
            Err(_) => {
                let options = self.state.options.lock().unwrap();
                merge(flag, None, options.get(target))
            }
        }
    }

    /// Pins `flag` to `value` for `target` (a full specifier or a bare
    /// type).
    ///
    /// The first write to an unconfigured target seeds *both* flags to
    /// `false` before applying the update, so the untouched flag no longer
    /// falls through to type-level or global defaults. Existing entries are
    /// updated per key and never removed.
    pub fn set_option(&self, target: &str, flag: LifecycleFlag, value: bool) {
        let mut options = self.state.options.lock().unwrap();
        options
            .entry(target.to_string())
            .or_insert_with(EntryOptions::seeded)
            .set(flag, value);
    }

    /// The mutable per-container metadata record for `class`, lazily created
    /// on first access and stable thereafter.
    pub fn meta_for(&self, class: &Class) -> Meta {
        self.state.meta.record_for(class.id())
    }

    /// Class-level injections resolved by the singleton, non-instantiated
    /// lookup path, if that path has run for `class` in this container.
    pub fn class_injections(&self, class: &Class) -> Option<Arc<Deps>> {
        self.meta_for(class).get_as::<Deps>(CLASS_INJECTIONS_KEY)
    }

    /// Evicts `specifier` from the class, factory, and instance caches.
    ///
    /// Registrations and options are untouched. The next resolution starts
    /// from scratch, re-running the first-resolution side effects
    /// (provenance metadata and the on-load hook).
    pub fn clear_cache(&self, specifier: &str) -> ResolveResult<()> {
        let parsed: Specifier = specifier.parse()?;
        debug!(specifier = %parsed, "clearing caches");
        self.state.class_cache.lock().unwrap().remove(&parsed);
        self.state.factory_cache.lock().unwrap().remove(&parsed);
        self.state.instance_cache.lock().unwrap().remove(&parsed);
        Ok(())
    }

    /// Resolves a class's declared injections through the normal strict
    /// lookup path. A missing dependency fails here, at the point the
    /// dependent object is built.
    pub(crate) fn resolve_injections(&self, class: &Class) -> ResolveResult<Deps> {
        let mut deps = Deps::default();
        for injection in class.injections() {
            let value = self
                .lookup_parsed(&injection.specifier, false)?
                .ok_or_else(|| ResolveError::NotFound(injection.specifier.clone()))?;
            deps.insert(injection.field.clone(), value);
        }
        Ok(deps)
    }

    fn lookup_parsed(&self, specifier: &Specifier, loose: bool) -> ResolveResult<Option<Resolved>> {
        let _guard = StackGuard::enter(specifier.as_str())?;

        let singleton = self.option_for(specifier, LifecycleFlag::Singleton);
        if singleton {
            if let Some(cached) = self.state.instance_cache.lock().unwrap().get(specifier) {
                trace!(specifier = %specifier, "instance cache hit");
                return Ok(Some(cached.clone()));
            }
        }

        let factory = match self.factory_for_parsed(specifier, loose)? {
            Some(factory) => factory,
            None => return Ok(None),
        };

        let instantiate = self.option_for(specifier, LifecycleFlag::Instantiate);
        let value = if instantiate {
            Resolved::Instance(factory.create()?)
        } else {
            let class = factory.class().clone();
            if singleton {
                // Class-level injection support: resolve the declarations
                // once and park them in the class's per-container meta
                // record, since nothing is constructed to hold them.
                let deps = self.resolve_injections(&class)?;
                if !deps.is_empty() {
                    self.meta_for(&class).set(CLASS_INJECTIONS_KEY, deps);
                }
            }
            Resolved::Class(class)
        };

        if singleton {
            // Double-checked insert: the value was created without the lock,
            // so a racing first lookup may have already filled the entry.
            // The first insert wins and every caller returns that value.
            let mut cache = self.state.instance_cache.lock().unwrap();
            if let Some(cached) = cache.get(specifier) {
                return Ok(Some(cached.clone()));
            }
            cache.insert(specifier.clone(), value.clone());
        }
        Ok(Some(value))
    }

    fn factory_for_parsed(
        &self,
        specifier: &Specifier,
        loose: bool,
    ) -> ResolveResult<Option<Factory>> {
        if let Some(factory) = self.state.factory_cache.lock().unwrap().get(specifier) {
            return Ok(Some(factory.clone()));
        }

        let class = match self.resolve_class(specifier) {
            Some(class) => class,
            None if loose => return Ok(None),
            None => return Err(ResolveError::NotFound(specifier.clone())),
        };

        let factory = Factory::new(
            specifier.clone(),
            class,
            Arc::downgrade(&self.state),
        );
        let mut cache = self.state.factory_cache.lock().unwrap();
        if let Some(cached) = cache.get(specifier) {
            return Ok(Some(cached.clone()));
        }
        cache.insert(specifier.clone(), factory.clone());
        Ok(Some(factory))
    }

    /// Resolves the class for a specifier, memoized in the class cache.
    ///
    /// The first resolution for a specifier records the container-local
    /// short name in the class's meta record and runs the class's on-load
    /// hook, before any instance of it exists.
    fn resolve_class(&self, specifier: &Specifier) -> Option<Class> {
        if let Some(class) = self.state.class_cache.lock().unwrap().get(specifier) {
            return Some(class.clone());
        }

        let class = self.registered_class(specifier).or_else(|| {
            let resolvers = self.state.resolvers.lock().unwrap().clone();
            resolvers.iter().find_map(|r| r.retrieve(specifier))
        })?;

        // Double-checked insert: resolution ran without the lock, so a
        // racing first resolution may have already filled the entry. Only
        // the winning insert runs the first-resolution side effects.
        {
            let mut cache = self.state.class_cache.lock().unwrap();
            if let Some(cached) = cache.get(specifier) {
                return Some(cached.clone());
            }
            cache.insert(specifier.clone(), class.clone());
        }

        debug!(specifier = %specifier, class = class.name(), "resolved class");
        let meta = self.meta_for(&class);
        meta.set(LOCAL_NAME_KEY, specifier.name().to_string());
        if let Some(hook) = class.on_load_fn() {
            debug!(specifier = %specifier, "running on-load hook");
            (hook)(&class, &meta);
        }
        Some(class)
    }

    fn registered_class(&self, specifier: &Specifier) -> Option<Class> {
        self.state
            .registrations
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == specifier)
            .map(|(_, class)| class.clone())
    }

    fn option_for(&self, specifier: &Specifier, flag: LifecycleFlag) -> bool {
        let options = self.state.options.lock().unwrap();
        merge(
            flag,
            options.get(specifier.as_str()),
            options.get(specifier.type_name()),
        )
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field(
                "registrations",
                &self.state.registrations.lock().unwrap().len(),
            )
            .field("resolvers", &self.state.resolvers.lock().unwrap().len())
            .field(
                "cached_classes",
                &self.state.class_cache.lock().unwrap().len(),
            )
            .field(
                "cached_instances",
                &self.state.instance_cache.lock().unwrap().len(),
            )
            .finish()
    }
}
