//! Specifier keys for container entries.

use std::fmt;
use std::str::FromStr;

use crate::error::ResolveError;

/// Key identifying one container entry, of the form `"type:name"`.
///
/// The string is split on the *first* colon: the type portion selects
/// type-level lifecycle defaults, the name portion identifies the entry
/// within its type. The name may itself contain colons.
///
/// # Examples
///
/// ```rust
/// use lodestone::Specifier;
///
/// let specifier: Specifier = "serializer:post".parse().unwrap();
/// assert_eq!(specifier.type_name(), "serializer");
/// assert_eq!(specifier.name(), "post");
///
/// let nested: Specifier = "route:admin:users".parse().unwrap();
/// assert_eq!(nested.type_name(), "route");
/// assert_eq!(nested.name(), "admin:users");
///
/// assert!("nocolon".parse::<Specifier>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specifier {
    full: String,
    colon: usize,
}

impl Specifier {
    /// Parses a `"type:name"` string.
    pub fn new(raw: &str) -> Result<Self, ResolveError> {
        raw.parse()
    }

    /// Builds a specifier from its two parts.
    pub fn from_parts(type_name: &str, name: &str) -> Result<Self, ResolveError> {
        format!("{}:{}", type_name, name).parse()
    }

    /// The full `"type:name"` string.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The portion before the first colon.
    pub fn type_name(&self) -> &str {
        &self.full[..self.colon]
    }

    /// The portion after the first colon.
    pub fn name(&self) -> &str {
        &self.full[self.colon + 1..]
    }
}

impl FromStr for Specifier {
    type Err = ResolveError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.find(':') {
            Some(colon) if colon > 0 && colon + 1 < raw.len() => Ok(Specifier {
                full: raw.to_string(),
                colon,
            }),
            _ => Err(ResolveError::InvalidSpecifier(raw.to_string())),
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
