use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

            /// Fresh random identifier (used by the reference API when persisting).
            pub fn random() -> Self { Self(uuid::Uuid::new_v4().to_string()) }

            pub fn as_str(&self) -> &str { &self.0 }

            pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self { Self(value) }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self { Self(value.to_string()) }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str { &self.0 }
        }
    };
}

string_id!(
    /// Opaque server-assigned entity identifier.
    EntityId
);

string_id!(
    /// Identifier returned by `POST /files`, used as a foreign reference afterwards.
    FileId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = EntityId::new("c-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"c-1\"");
        let back: FileId = serde_json::from_str("\"f-9\"").unwrap();
        assert_eq!(back.as_str(), "f-9");
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(EntityId::random(), EntityId::random());
        assert!(EntityId::new("  ").is_blank());
    }
}
