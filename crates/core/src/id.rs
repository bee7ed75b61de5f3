// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types: building ids and elevator ids.

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
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

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifies a building's gateway / elevator group (`id_edificio`).
    pub struct BuildingId;
}

define_id! {
    /// Identifies one elevator car, `{building}A{n}` with n >= 1 (`id_ascensor`).
    pub struct ElevatorId;
}

impl ElevatorId {
    /// Build a car id for car index `n` (1-based) in `building`.
    pub fn for_car(building: &BuildingId, n: u32) -> Self {
        Self::new(format!("{building}A{n}"))
    }

    /// The zero-based car index derived from the trailing integer in the id,
    /// per spec §4.4 step 5. Returns `None` if the id has no trailing digits.
    pub fn zero_based_index(&self) -> Option<u8> {
        let digits_start = self.0.rfind(|c: char| !c.is_ascii_digit())? + 1;
        let digits = &self.0[digits_start..];
        if digits.is_empty() {
            return None;
        }
        let n: u32 = digits.parse().ok()?;
        n.checked_sub(1).and_then(|idx| u8::try_from(idx).ok())
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
