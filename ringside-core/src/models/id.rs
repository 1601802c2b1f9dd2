use serde::{Deserialize, Serialize};

/// Declares a transparent wrapper around a database-assigned `BIGSERIAL` key.
///
/// Keys are ordered, and match ordering by key is the fixed running order
/// of the card.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Match key (roster order)
    MatchId
);
define_id!(
    /// Round key
    RoundId
);
define_id!(
    /// Judge key (internal; clients address judges by device token)
    JudgeId
);
define_id!(
    /// Match progress row key
    ProgressId
);

/// Client-held device token identifying a judge across reloads and reconnects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(pub String);

impl DeviceToken {
    /// Generate a fresh token for pre-provisioned judges (QR handout)
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub const fn from_string(token: String) -> Self {
        Self(token)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_value() {
        assert!(MatchId::new(3) < MatchId::new(10));
        assert_eq!("42".parse::<RoundId>().unwrap(), RoundId::new(42));
        assert!("x".parse::<JudgeId>().is_err());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&MatchId::new(7)).unwrap();
        assert_eq!(json, "7");

        let token: DeviceToken = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = DeviceToken::generate();
        let b = DeviceToken::generate();

        assert_ne!(a, b);
        assert!(!a.is_blank());
        assert!(DeviceToken::from("  ").is_blank());
    }
}
