//! Error types for specifier resolution.

use std::fmt;

use crate::specifier::Specifier;

/// Resolution errors
///
/// Represents the error conditions that can occur while registering,
/// resolving, or constructing container entries.
///
/// # Examples
///
/// ```rust
/// use lodestone::{Container, ResolveError};
///
/// let container = Container::new();
/// match container.lookup("missing:thing") {
///     Err(ResolveError::NotFound(specifier)) => {
///         assert_eq!(specifier.as_str(), "missing:thing");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// No registration and no resolver produced a class for the specifier
    NotFound(Specifier),
    /// `create()` was called for an entry with no constructor
    NotConstructible(Specifier),
    /// Specifier string is not of the form `"type:name"`
    InvalidSpecifier(String),
    /// A constructor asked for a dependency field that was never declared
    MissingDependency(String),
    /// Downcast to the requested concrete type failed
    TypeMismatch(&'static str),
    /// Injection declarations form a cycle (includes the specifier path)
    Circular(Vec<String>),
    /// A factory outlived the container that built it
    ContainerDropped,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound(specifier) => {
                write!(f, "No registration or resolver produced an entry for '{}'", specifier)
            }
            ResolveError::NotConstructible(specifier) => write!(
                f,
                "'{}' has no constructor; register it with instantiate: false or give its class a constructor",
                specifier
            ),
            ResolveError::InvalidSpecifier(raw) => {
                write!(f, "Invalid specifier '{}' (expected \"type:name\")", raw)
            }
            ResolveError::MissingDependency(field) => {
                write!(f, "No injection declared for field '{}'", field)
            }
            ResolveError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            ResolveError::Circular(path) => {
                write!(f, "Circular injection chain: {}", path.join(" -> "))
            }
            ResolveError::ContainerDropped => {
                write!(f, "Factory used after its container was dropped")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Result type for container operations
///
/// A convenience alias for `Result<T, ResolveError>` used throughout the
/// crate to reduce boilerplate in signatures.
pub type ResolveResult<T> = Result<T, ResolveError>;
