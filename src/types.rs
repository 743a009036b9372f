//! Shared primitive IDs, flavor tags, and store selectors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sequential operation record identifier, assigned by the relational store.
pub type RecordId = i64;
/// Integer operand consumed by an arithmetic operation.
pub type Operand = i64;

/// Call path that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flavor {
    /// Stateless single-call evaluation.
    Independent,
    /// Evaluation over the shared operand stack.
    Stack,
}

impl Flavor {
    /// Wire and at-rest token for this flavor.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "INDEPENDENT",
            Self::Stack => "STACK",
        }
    }

    /// Parses an at-rest token. Matching is exact.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "INDEPENDENT" => Some(Self::Independent),
            "STACK" => Some(Self::Stack),
            _ => None,
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which store a history read is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreSelector {
    /// Authoritative relational store (`POSTGRES`).
    Relational,
    /// Mirror document store (`MONGO`).
    Document,
}

impl StoreSelector {
    /// Resolves a caller-supplied token. Unrecognized tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "POSTGRES" => Some(Self::Relational),
            "MONGO" => Some(Self::Document),
            _ => None,
        }
    }

    /// Caller-facing token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relational => "POSTGRES",
            Self::Document => "MONGO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_tokens_are_case_sensitive() {
        assert_eq!(StoreSelector::parse("POSTGRES"), Some(StoreSelector::Relational));
        assert_eq!(StoreSelector::parse("MONGO"), Some(StoreSelector::Document));
        assert_eq!(StoreSelector::parse("postgres"), None);
        assert_eq!(StoreSelector::parse(""), None);
    }

    #[test]
    fn flavor_serializes_as_upper_token() {
        let json = serde_json::to_string(&Flavor::Independent).expect("serialize");
        assert_eq!(json, "\"INDEPENDENT\"");
        assert_eq!(Flavor::parse(Flavor::Stack.as_str()), Some(Flavor::Stack));
    }
}
