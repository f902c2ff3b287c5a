//! Factories and constructor inputs.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::class::{AnyShared, Class};
use crate::container::{Container, ContainerState, Resolved};
use crate::error::{ResolveError, ResolveResult};
use crate::specifier::Specifier;

/// Positional arguments forwarded to a constructor by
/// [`Factory::create_with`].
///
/// # Examples
///
/// ```rust
/// use lodestone::CreateArgs;
///
/// let args = CreateArgs::new().with(8080u16).with("payments".to_string());
/// assert_eq!(*args.get::<u16>(0).unwrap(), 8080);
/// assert_eq!(args.get::<String>(1).unwrap().as_str(), "payments");
/// assert!(args.get::<u16>(2).is_none());
/// ```
#[derive(Clone, Default)]
pub struct CreateArgs {
    values: Vec<AnyShared>,
}

impl CreateArgs {
    /// An empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    /// The argument at `index`, downcast to `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> Option<Arc<T>> {
        self.values.get(index)?.clone().downcast::<T>().ok()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolved injections, keyed by the field names declared on the class.
///
/// Handed to constructors by the factory; each value went through the owning
/// container's normal strict `lookup`, so singleton dependencies are the
/// same shared reference every consumer sees.
#[derive(Clone, Default)]
pub struct Deps {
    fields: HashMap<String, Resolved>,
}

impl Deps {
    pub(crate) fn insert(&mut self, field: String, value: Resolved) {
        self.fields.insert(field, value);
    }

    /// The raw resolved value for `field`, if declared.
    pub fn get(&self, field: &str) -> Option<&Resolved> {
        self.fields.get(field)
    }

    /// The dependency for `field` as a live instance of `T`.
    pub fn instance<T: Send + Sync + 'static>(&self, field: &str) -> ResolveResult<Arc<T>> {
        match self.fields.get(field) {
            Some(resolved) => resolved.downcast::<T>(),
            None => Err(ResolveError::MissingDependency(field.to_string())),
        }
    }

    /// The dependency for `field` as a bare class.
    pub fn class(&self, field: &str) -> ResolveResult<Class> {
        match self.fields.get(field) {
            Some(resolved) => resolved
                .class()
                .cloned()
                .ok_or(ResolveError::TypeMismatch("Class")),
            None => Err(ResolveError::MissingDependency(field.to_string())),
        }
    }

    /// Number of resolved dependencies.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the class declared no injections.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Container-built wrapper pairing a resolved class with a `create`
/// operation that applies injections.
///
/// Factories are memoized per specifier, so repeated
/// [`factory_for`](Container::factory_for) calls hand back the same
/// underlying class. A factory holds only a weak reference to its container;
/// using one after the container is gone fails with
/// [`ResolveError::ContainerDropped`].
#[derive(Clone)]
pub struct Factory {
    specifier: Specifier,
    class: Class,
    container: Weak<ContainerState>,
}

impl Factory {
    pub(crate) fn new(specifier: Specifier, class: Class, container: Weak<ContainerState>) -> Self {
        Self {
            specifier,
            class,
            container,
        }
    }

    /// The specifier this factory was built for.
    pub fn specifier(&self) -> &Specifier {
        &self.specifier
    }

    /// The resolved class.
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Constructs a new instance with no create arguments.
    pub fn create(&self) -> ResolveResult<AnyShared> {
        self.create_with(&CreateArgs::default())
    }

    /// Constructs a new instance: resolves the class's declared injections
    /// through the owning container, then invokes the constructor with them
    /// and `args`.
    pub fn create_with(&self, args: &CreateArgs) -> ResolveResult<AnyShared> {
        let container =
            Container::from_state(&self.container).ok_or(ResolveError::ContainerDropped)?;
        let ctor = self
            .class
            .construct_fn()
            .cloned()
            .ok_or_else(|| ResolveError::NotConstructible(self.specifier.clone()))?;
        let deps = container.resolve_injections(&self.class)?;
        ctor(&deps, args)
    }
}
