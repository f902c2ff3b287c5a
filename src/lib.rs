//! # lodestone
//!
//! Specifier-keyed dependency resolution: turn a `"type:name"` string into a
//! concrete, correctly-configured value.
//!
//! ## Features
//!
//! - **Specifier keys**: every entry is addressed as `"type:name"`, with
//!   lifecycle defaults configurable per type and overridable per specifier
//! - **Lifecycle options**: `singleton` (cache and reuse) and `instantiate`
//!   (construct an instance vs. hand back the bare class)
//! - **Resolver chain**: manual registrations win, then pluggable resolvers
//!   are consulted in insertion order
//! - **Constructor injection**: dependencies declared at class-definition
//!   time are resolved through the container and handed to the constructor
//! - **On-load hooks**: a class can run one-time setup per container, the
//!   first time it is resolved there
//! - **Per-container metadata**: identity-keyed side records let shared
//!   classes carry container-local state without being mutated
//!
//! ## Quick Start
//!
//! ```rust
//! use lodestone::{Class, Container, CreateArgs, Deps, EntryOptions};
//! use std::sync::Arc;
//!
//! struct Logger {
//!     prefix: String,
//! }
//!
//! struct Mailer {
//!     logger: Arc<Logger>,
//! }
//!
//! let container = Container::new();
//!
//! let logger = Class::builder("Logger")
//!     .construct(|_deps: &Deps, _args: &CreateArgs| {
//!         Ok(Logger { prefix: "mail".to_string() })
//!     })
//!     .build()?;
//!
//! let mailer = Class::builder("Mailer")
//!     .inject("logger", "service:logger")
//!     .construct(|deps: &Deps, _args: &CreateArgs| {
//!         Ok(Mailer { logger: deps.instance::<Logger>("logger")? })
//!     })
//!     .build()?;
//!
//! let live = EntryOptions::new().singleton(true).instantiate(true);
//! container.register_with("service:logger", logger, live)?;
//! container.register_with("service:mailer", mailer, live)?;
//!
//! let mailer = container.lookup_as::<Mailer>("service:mailer")?;
//! assert_eq!(mailer.logger.prefix, "mail");
//!
//! // Singletons are stable references for the life of the container.
//! let again = container.lookup_as::<Mailer>("service:mailer")?;
//! assert!(Arc::ptr_eq(&mailer, &again));
//! # Ok::<(), lodestone::ResolveError>(())
//! ```
//!
//! ## Bare classes
//!
//! With the default options (`singleton: true`, `instantiate: false`),
//! lookup yields the registered class itself rather than an instance:
//!
//! ```rust
//! use lodestone::{Class, Container, Resolved};
//!
//! let container = Container::new();
//! container.register("config:port", Class::of_value("Port", 8080u16))?;
//!
//! match container.lookup("config:port")? {
//!     Resolved::Class(class) => assert_eq!(*class.value_as::<u16>().unwrap(), 8080),
//!     Resolved::Instance(_) => unreachable!(),
//! }
//! # Ok::<(), lodestone::ResolveError>(())
//! ```
//!
//! ## Resolvers
//!
//! Resolvers supply classes the container was never explicitly handed, e.g.
//! everything an addon ships. Registrations beat resolvers; among resolvers,
//! the first added wins:
//!
//! ```rust
//! use lodestone::{Class, Container, MapResolver};
//! use std::sync::Arc;
//!
//! let addon = MapResolver::new();
//! addon.insert("serializer:error", Class::of_value("ErrorSerializer", "addon"))?;
//!
//! let container = Container::new();
//! container.add_resolver(Arc::new(addon));
//!
//! assert_eq!(*container.lookup_as::<&str>("serializer:error")?, "addon");
//! # Ok::<(), lodestone::ResolveError>(())
//! ```

// Module declarations
pub mod class;
pub mod container;
pub mod error;
pub mod factory;
pub mod meta;
pub mod options;
pub mod resolver;
pub mod specifier;

// Internal modules
mod internal;

// Re-export core types
pub use class::{AnyShared, Class, ClassBuilder, ClassId, Injection};
pub use container::{Container, Resolved, CLASS_INJECTIONS_KEY, LOCAL_NAME_KEY};
pub use error::{ResolveError, ResolveResult};
pub use factory::{CreateArgs, Deps, Factory};
pub use meta::Meta;
pub use options::{EntryOptions, LifecycleFlag};
pub use resolver::{MapResolver, Resolver};
pub use specifier::Specifier;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_singleton_instance_resolution() {
        struct Service;

        let container = Container::new();
        let class = Class::builder("Service")
            .construct(|_: &Deps, _: &CreateArgs| Ok(Service))
            .build()
            .unwrap();
        container
            .register_with(
                "service:main",
                class,
                EntryOptions::new().singleton(true).instantiate(true),
            )
            .unwrap();

        let a = container.lookup_as::<Service>("service:main").unwrap();
        let b = container.lookup_as::<Service>("service:main").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_bare_class_resolution() {
        let container = Container::new();
        container
            .register("config:app", Class::of_value("AppConfig", 42u32))
            .unwrap();

        let resolved = container.lookup("config:app").unwrap();
        assert!(resolved.class().is_some());
        assert_eq!(*resolved.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn test_default_options() {
        let container = Container::new();
        assert!(container.get_option("model:post", LifecycleFlag::Singleton));
        assert!(!container.get_option("model:post", LifecycleFlag::Instantiate));
    }

    #[test]
    fn test_loose_lookup_returns_none() {
        let container = Container::new();
        assert!(container.lookup("ghost:thing").is_err());
        assert!(container.lookup_loose("ghost:thing").unwrap().is_none());
    }
}
