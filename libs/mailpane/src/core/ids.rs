// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! String identifiers for definitions, dependencies, chains, instances and suggestions.
//!
//! Generated ids use cuid2 with a short type prefix so log lines stay readable
//! (`dep_k3x...`, `chn_p0q...`). Any string converts into an id, which keeps
//! callers that receive ids from the UI layer free of parsing.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

macro_rules! unique_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(format!(concat!($prefix, "_{}"), cuid2::create_id()))
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<&$name> for $name {
            fn from(id: &$name) -> Self {
                id.clone()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

unique_id!(
    /// Identifier of a capability [`Definition`](crate::core::Definition).
    DefinitionId,
    "def"
);
unique_id!(
    /// Identifier of a graph edge ([`Dependency`](crate::core::Dependency)).
    DependencyId,
    "dep"
);
unique_id!(
    /// Identifier of a [`Chain`](crate::core::Chain).
    ChainId,
    "chn"
);
unique_id!(
    /// Identifier of a runtime [`Instance`](crate::core::Instance).
    InstanceId,
    "ins"
);
unique_id!(
    /// Identifier of a [`Suggestion`](crate::core::Suggestion).
    SuggestionId,
    "sug"
);
