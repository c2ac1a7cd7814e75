use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a string-backed identifier newtype.
///
/// All remote rows are keyed by opaque string ids (UUIDs in practice), so the
/// newtypes only exist to keep engineers, projects and tasks from being mixed up.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of an auth user (and of the matching `usuarios` profile row).
    UserId
);
string_id!(ClientId);
string_id!(EngineerId);
string_id!(ProjectId);
string_id!(AllocationId);
string_id!(TaskId);
string_id!(HourEntryId);
