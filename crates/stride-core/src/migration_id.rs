//! Strongly-typed migration identifier.
//!
//! Ids come from migration file stems (for example
//! `20240101_01_abcde-create-users`). The leading timestamp makes plain
//! lexicographic ordering the natural tie-break order, so the newtype derives
//! `Ord` on the inner string.

use serde::{Deserialize, Deserializer, Serialize};

/// A non-empty migration identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MigrationId(String);

impl MigrationId {
    /// Create a new id, panicking if it is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(id: impl Into<String>) -> Self {
        let s = id.into();
        assert!(!s.is_empty(), "MigrationId must not be empty");
        Self(s)
    }

    /// Try to create an id, returning `None` if it is empty.
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let s = id.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for MigrationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MigrationId::try_new(s)
            .ok_or_else(|| serde::de::Error::custom("MigrationId must not be empty"))
    }
}

impl std::fmt::Display for MigrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for MigrationId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for MigrationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MigrationId {
    type Error = &'static str;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() {
            Err("MigrationId must not be empty")
        } else {
            Ok(Self(s))
        }
    }
}

impl TryFrom<&str> for MigrationId {
    type Error = &'static str;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            Err("MigrationId must not be empty")
        } else {
            Ok(Self(s.to_string()))
        }
    }
}

impl PartialEq<str> for MigrationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for MigrationId {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}
