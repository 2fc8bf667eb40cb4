//! Newtype wrappers for string identifiers
//!
//! Keeps resource names handed out by the document builder apart from the
//! anchor ids that links and outline entries point at.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(id: impl Into<Arc<str>>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// The name a page resource is registered under (`/Im1`, `/Pat3`, `/F1`).
    ResourceName
);

string_id!(
    /// An identifier for a document anchor (link and outline destinations)
    AnchorId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_content() {
        assert_eq!(ResourceName::from("Im1"), ResourceName::new("Im1"));
        assert_ne!(AnchorId::from("a"), AnchorId::from("b"));
        assert_eq!(AnchorId::from("intro".to_string()).as_str(), "intro");
    }

    #[test]
    fn display_is_raw_text() {
        assert_eq!(ResourceName::from("Pat2").to_string(), "Pat2");
    }
}
