// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        // The backend sends integer keys either as JSON numbers or as strings.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                crate::wire::int(deserializer).map(Self)
            }
        }
    };
}

entity_id!(CarId);
entity_id!(CommentId);
entity_id!(PictureId);
entity_id!(BrandId);

#[cfg(test)]
mod tests {
    use super::CarId;

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        let from_number: CarId = serde_json::from_str("5").expect("numeric id");
        let from_text: CarId = serde_json::from_str("\"7\"").expect("string id");
        assert_eq!(from_number, CarId::new(5));
        assert_eq!(from_text, CarId::new(7));
        assert_eq!(from_text.to_string(), "7");
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let encoded = serde_json::to_string(&CarId::new(12)).expect("encode id");
        assert_eq!(encoded, "12");
    }
}
