//! Lifecycle options and the per-key merge rules behind `get_option`.

/// The closed set of lifecycle switches the container understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleFlag {
    /// Cache and reuse the resolved value across lookups.
    Singleton,
    /// Construct an instance on lookup, versus returning the bare class.
    Instantiate,
}

pub(crate) const DEFAULT_SINGLETON: bool = true;
pub(crate) const DEFAULT_INSTANTIATE: bool = false;

/// Partial lifecycle option set attached to a specifier or a type.
///
/// Unset fields fall through: an exact-specifier entry wins per key, then
/// the type-level entry, then the global defaults
/// (`singleton: true`, `instantiate: false`).
///
/// # Examples
///
/// ```rust
/// use lodestone::EntryOptions;
///
/// let options = EntryOptions::new().singleton(true).instantiate(true);
/// assert_eq!(options.singleton, Some(true));
/// assert_eq!(options.instantiate, Some(true));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Whether the resolved value is cached and reused across lookups.
    pub singleton: Option<bool>,
    /// Whether lookup constructs an instance or returns the bare class.
    pub instantiate: Option<bool>,
}

impl EntryOptions {
    /// An option set with nothing pinned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the `singleton` flag.
    pub fn singleton(mut self, value: bool) -> Self {
        self.singleton = Some(value);
        self
    }

    /// Pins the `instantiate` flag.
    pub fn instantiate(mut self, value: bool) -> Self {
        self.instantiate = Some(value);
        self
    }

    pub(crate) fn get(&self, flag: LifecycleFlag) -> Option<bool> {
        match flag {
            LifecycleFlag::Singleton => self.singleton,
            LifecycleFlag::Instantiate => self.instantiate,
        }
    }

    pub(crate) fn set(&mut self, flag: LifecycleFlag, value: bool) {
        match flag {
            LifecycleFlag::Singleton => self.singleton = Some(value),
            LifecycleFlag::Instantiate => self.instantiate = Some(value),
        }
    }

    /// Seed applied the first time `set_option` touches an unconfigured
    /// target: both flags pinned to `false`, not to the global defaults.
    pub(crate) fn seeded() -> Self {
        Self {
            singleton: Some(false),
            instantiate: Some(false),
        }
    }
}

/// First-defined-wins merge per key: specifier entry, then type entry, then
/// the built-in default for the flag.
pub(crate) fn merge(
    flag: LifecycleFlag,
    specifier_entry: Option<&EntryOptions>,
    type_entry: Option<&EntryOptions>,
) -> bool {
    specifier_entry
        .and_then(|entry| entry.get(flag))
        .or_else(|| type_entry.and_then(|entry| entry.get(flag)))
        .unwrap_or(match flag {
            LifecycleFlag::Singleton => DEFAULT_SINGLETON,
            LifecycleFlag::Instantiate => DEFAULT_INSTANTIATE,
        })
}
