//! Canonical identifier types.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Returns true if `input` is in canonical UUID form.
///
/// This is a purely syntactic check:
/// - Exactly 32 bytes long
/// - Contains only lowercase hex characters (`0-9` and `a-f`)
pub fn is_canonical(input: &str) -> bool {
    input.len() == 32
        && input
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn parse_canonical(kind: &str, input: &str) -> UuidResult<Uuid> {
    if !is_canonical(input) {
        return Err(UuidError::InvalidInput(format!(
            "{kind} must be 32 lowercase hex characters without hyphens, got: '{input}'"
        )));
    }
    Uuid::parse_str(input).map_err(|e| UuidError::InvalidInput(format!("{kind}: {e}")))
}

macro_rules! canonical_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            ///
            /// Identifiers come from UUID v4, so two calls never collide in practice,
            /// including under rapid repeated generation.
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Validates and parses an identifier that must already be in canonical form.
            ///
            /// # Errors
            ///
            /// Returns [`UuidError::InvalidInput`] if `input` is not canonical.
            pub fn parse(input: &str) -> UuidResult<Self> {
                parse_canonical($kind, input).map(Self)
            }

            /// Returns the underlying `uuid::Uuid`.
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.simple())
            }
        }

        impl FromStr for $name {
            type Err = UuidError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

canonical_id!(
    /// Identifier of a scenario record in a portfolio.
    ///
    /// Assigned once when the record is appended and never reused.
    ScenarioId,
    "scenario id"
);

canonical_id!(
    /// Identifier of a user session and therefore of its portfolio store.
    SessionId,
    "session id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn display_is_canonical() {
        let id = ScenarioId::new();
        let s = id.to_string();
        assert!(is_canonical(&s), "not canonical: {s}");
        assert_eq!(ScenarioId::parse(&s).unwrap(), id);
    }

    #[test]
    fn rejects_hyphenated_and_uppercase() {
        assert!(ScenarioId::parse("550e8400-e29b-41d4-a716-446655440000").is_err());
        assert!(ScenarioId::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("zz0e8400e29b41d4a716446655440000").is_err());
    }

    #[test]
    fn rapid_generation_does_not_collide() {
        let ids: HashSet<ScenarioId> = (0..10_000).map(|_| ScenarioId::new()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn serde_uses_canonical_string() {
        let id = SessionId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400e29b41d4a716446655440000\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<SessionId>("\"not-an-id\"").is_err());
    }
}
