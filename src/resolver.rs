//! Resolver chain interface and an in-memory implementation.

use std::sync::Mutex;

use crate::class::Class;
use crate::error::ResolveResult;
use crate::specifier::Specifier;

/// A source of classes consulted by the container after manual
/// registrations, typically backed by a namespace or directory convention.
///
/// Resolvers are tried in the order they were added; the first `Some` wins.
/// `retrieve` must be pure for an unchanged resolver: calling it twice with
/// the same specifier returns an equivalent class. The container memoizes
/// the result, so an impure resolver only surfaces new classes after
/// [`Container::clear_cache`](crate::Container::clear_cache).
pub trait Resolver: Send + Sync {
    /// Maps a specifier to a class, or `None` if this resolver has no entry.
    fn retrieve(&self, specifier: &Specifier) -> Option<Class>;

    /// Enumerates every name this resolver knows under `type_name`, without
    /// instantiating anything.
    fn available_for_type(&self, type_name: &str) -> Vec<String>;
}

/// Insertion-ordered in-memory [`Resolver`].
///
/// Useful for plugins that assemble their entries programmatically, and as
/// the test double for the resolver contract.
///
/// # Examples
///
/// ```rust
/// use lodestone::{Class, MapResolver, Resolver};
///
/// let resolver = MapResolver::new();
/// resolver.insert("config:app", Class::of_value("AppConfig", 8080u16)).unwrap();
///
/// let specifier = "config:app".parse().unwrap();
/// assert!(resolver.retrieve(&specifier).is_some());
/// assert_eq!(resolver.available_for_type("config"), vec!["app".to_string()]);
/// ```
#[derive(Default)]
pub struct MapResolver {
    entries: Mutex<Vec<(Specifier, Class)>>,
}

impl MapResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the class for `specifier`, keeping insertion order.
    pub fn insert(&self, specifier: &str, class: Class) -> ResolveResult<()> {
        let specifier: Specifier = specifier.parse()?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(slot) = entries.iter_mut().find(|(s, _)| s == &specifier) {
            slot.1 = class;
        } else {
            entries.push((specifier, class));
        }
        Ok(())
    }
}

impl Resolver for MapResolver {
    fn retrieve(&self, specifier: &Specifier) -> Option<Class> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == specifier)
            .map(|(_, class)| class.clone())
    }

    fn available_for_type(&self, type_name: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s.type_name() == type_name)
            .map(|(s, _)| s.name().to_string())
            .collect()
    }
}
