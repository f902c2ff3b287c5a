//! Shared class definitions registrable across containers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::ResolveResult;
use crate::factory::{CreateArgs, Deps};
use crate::meta::Meta;
use crate::specifier::Specifier;

/// Type-erased shared value, the currency of the container.
pub type AnyShared = Arc<dyn Any + Send + Sync>;

pub(crate) type ConstructFn =
    Arc<dyn Fn(&Deps, &CreateArgs) -> ResolveResult<AnyShared> + Send + Sync>;

pub(crate) type OnLoadFn = Arc<dyn Fn(&Class, &Meta) + Send + Sync>;

/// Declared injection point: a dependency field bound at class-definition
/// time to the specifier that fills it at construction time.
#[derive(Debug, Clone)]
pub struct Injection {
    /// Field name the constructor reads the dependency under.
    pub field: String,
    /// Specifier resolved (strictly) through the owning container.
    pub specifier: Specifier,
}

struct ClassDef {
    debug_name: String,
    value: Option<AnyShared>,
    construct: Option<ConstructFn>,
    injections: Vec<Injection>,
    on_load: Option<OnLoadFn>,
}

/// Identity of a class, derived from its shared allocation.
///
/// Stable for as long as the class is alive; used to key per-container
/// metadata without mutating the shared class value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

/// A registrable container entry: constructor, injection declarations, and
/// an optional on-load hook, behind a cheap-clone shared handle.
///
/// The same `Class` can be registered in any number of containers; nothing
/// container-specific is ever written into it. Per-container state lives in
/// each container's [`Meta`] record for the class.
///
/// # Examples
///
/// ```rust
/// use lodestone::{Class, CreateArgs, Deps};
///
/// struct Greeter {
///     salutation: String,
/// }
///
/// let class = Class::builder("Greeter")
///     .construct(|_deps: &Deps, _args: &CreateArgs| {
///         Ok(Greeter { salutation: "hello".to_string() })
///     })
///     .build()
///     .unwrap();
/// assert!(class.is_constructible());
/// ```
#[derive(Clone)]
pub struct Class {
    def: Arc<ClassDef>,
}

impl Class {
    /// Starts building a constructible class. `name` is for diagnostics only.
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            debug_name: name.into(),
            construct: None,
            injections: Vec::new(),
            on_load: None,
        }
    }

    /// Wraps a plain value as a non-constructible entry.
    ///
    /// Looking such an entry up with `instantiate: false` (the default)
    /// yields the class, whose payload is reachable through
    /// [`value_as`](Class::value_as); with `instantiate: true`, `create`
    /// fails with [`ResolveError::NotConstructible`](crate::ResolveError::NotConstructible).
    pub fn of_value<T: Send + Sync + 'static>(name: impl Into<String>, value: T) -> Class {
        Class {
            def: Arc::new(ClassDef {
                debug_name: name.into(),
                value: Some(Arc::new(value)),
                construct: None,
                injections: Vec::new(),
                on_load: None,
            }),
        }
    }

    /// Identity of this class, for metadata keying.
    pub fn id(&self) -> ClassId {
        ClassId(Arc::as_ptr(&self.def) as *const () as usize)
    }

    /// Diagnostic name given at definition time.
    pub fn name(&self) -> &str {
        &self.def.debug_name
    }

    /// Declared injection points, in declaration order.
    pub fn injections(&self) -> &[Injection] {
        &self.def.injections
    }

    /// Whether [`Factory::create`](crate::Factory::create) can construct this class.
    pub fn is_constructible(&self) -> bool {
        self.def.construct.is_some()
    }

    /// The plain-value payload, for entries built with [`Class::of_value`].
    pub fn value(&self) -> Option<&AnyShared> {
        self.def.value.as_ref()
    }

    /// The plain-value payload downcast to `T`.
    pub fn value_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.def.value.clone()?.downcast::<T>().ok()
    }

    /// Whether two handles refer to the same class.
    pub fn ptr_eq(&self, other: &Class) -> bool {
        Arc::ptr_eq(&self.def, &other.def)
    }

    pub(crate) fn construct_fn(&self) -> Option<&ConstructFn> {
        self.def.construct.as_ref()
    }

    pub(crate) fn on_load_fn(&self) -> Option<&OnLoadFn> {
        self.def.on_load.as_ref()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.def.debug_name)
            .field("constructible", &self.is_constructible())
            .field("injections", &self.def.injections.len())
            .finish()
    }
}

/// Builder for [`Class`] values.
pub struct ClassBuilder {
    debug_name: String,
    construct: Option<ConstructFn>,
    injections: Vec<(String, String)>,
    on_load: Option<OnLoadFn>,
}

impl ClassBuilder {
    /// Sets the constructor. It receives the resolved injections and any
    /// caller-supplied create arguments, and returns the new instance.
    pub fn construct<T, F>(mut self, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Deps, &CreateArgs) -> ResolveResult<T> + Send + Sync + 'static,
    {
        self.construct = Some(Arc::new(move |deps, args| {
            Ok(Arc::new(f(deps, args)?) as AnyShared)
        }));
        self
    }

    /// Declares an injection point: `field` will hold the value the owning
    /// container resolves for `specifier` at construction time.
    pub fn inject(mut self, field: impl Into<String>, specifier: impl Into<String>) -> Self {
        self.injections.push((field.into(), specifier.into()));
        self
    }

    /// Attaches an on-load hook, invoked once per container the first time
    /// the class is resolved there, before any instance exists. The hook
    /// receives the class and its per-container [`Meta`] record.
    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&Class, &Meta) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(f));
        self
    }

    /// Validates injection specifiers and produces the class.
    pub fn build(self) -> ResolveResult<Class> {
        let mut injections = Vec::with_capacity(self.injections.len());
        for (field, raw) in self.injections {
            let specifier: Specifier = raw.parse()?;
            injections.push(Injection { field, specifier });
        }
        Ok(Class {
            def: Arc::new(ClassDef {
                debug_name: self.debug_name,
                value: None,
                construct: self.construct,
                injections,
                on_load: self.on_load,
            }),
        })
    }
}
