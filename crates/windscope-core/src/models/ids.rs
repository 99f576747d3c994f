//! Identifier newtypes
//!
//! Turbines are addressed by a display id (`T01`) in queries and by a device
//! code (`DB91012`) in archive names. Parameters are addressed by a code
//! (`634`) inside payloads and by a display name in queries.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// User-facing turbine identifier, e.g. `T01`
    TurbineId
);

string_id!(
    /// Identifier embedded in archive names, e.g. `DB91012`
    DeviceCode
);

string_id!(
    /// Key of a measured quantity inside time-series payloads (`VAR_PK`)
    ParameterCode
);
