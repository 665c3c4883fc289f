//! Newtype identifiers carried by git changes.
//!
//! A clone URL and a ref name are both strings on the wire, but they are never
//! interchangeable. Wrapping each in its own type keeps an adapter from handing
//! a branch to the field that expects a repository.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// An SSH-style clone URL (`git@host:owner/repo.git` or `ssh://…`).
    RepoUrl
}

string_id! {
    /// A git ref as forwarded downstream.
    ///
    /// Branch refs arrive here with `refs/heads/` already stripped. Tag refs
    /// keep their `refs/tags/` prefix.
    RefName
}

impl RefName {
    /// Builds a ref name from a fully qualified ref, dropping a leading
    /// `refs/heads/`. Any other prefix is kept as-is.
    ///
    /// Returns `None` if nothing is left after stripping.
    pub fn from_ref(full_ref: &str) -> Option<Self> {
        Self::new(full_ref.strip_prefix("refs/heads/").unwrap_or(full_ref))
    }
}
