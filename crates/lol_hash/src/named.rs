//! Identifiers that carry both their numeric hash and, once resolved, the original string

use std::fmt;

use crate::{hash::HashValue, table::HashTables};

/// A hash identifier with an optional resolved name
///
/// The numeric `hash` is always authoritative; `name` is display information only and is never
/// re-hashed once it has been resolved from a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Named<T> {
    pub hash: T,
    pub name: Option<String>,
}

/// 32-bit identifier for property names, types and entry keys
pub type BinHash = Named<u32>;

/// 64-bit identifier for file paths
pub type PathHash = Named<u64>;

impl<T: HashValue> Named<T> {
    /// An unresolved identifier
    pub fn new(hash: T) -> Self {
        Named { hash, name: None }
    }

    /// Hash a human readable string and keep it as the name
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Named {
            hash: T::hash_raw(&raw),
            name: Some(raw),
        }
    }

    /// Interpret a token as either a literal hex hash (optionally `0x` prefixed) or a raw string
    pub fn parse(token: &str) -> Self {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if T::is_hash(digits) {
            if let Some(hash) = T::from_hex(digits) {
                return Named::new(hash);
            }
        }
        Named::from_raw(token)
    }

    /// Whether this identifier is the all-zero hash
    pub fn is_null(&self) -> bool {
        self.hash == T::default()
    }

    /// Whether a human readable name is known
    pub fn is_resolved(&self) -> bool {
        self.name.is_some()
    }

    /// Canonical hex form, regardless of resolution
    pub fn hex(&self) -> String {
        self.hash.to_hex()
    }

    /// Resolve the name through `tables` if it is not already known
    pub fn un_hash(&mut self, tables: &HashTables) {
        if self.name.is_some() {
            return;
        }
        if let Some(name) = tables.resolve(self.hash) {
            self.name = Some(name.to_owned());
        }
    }
}

impl<T: HashValue> From<T> for Named<T> {
    fn from(hash: T) -> Self {
        Named::new(hash)
    }
}

impl<T: HashValue> fmt::Display for Named<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.hex()),
        }
    }
}

#[cfg(feature = "serde")]
impl<T: HashValue> serde::Serialize for Named<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
