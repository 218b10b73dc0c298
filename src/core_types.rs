//! Core types used throughout the system
//!
//! Identifiers shared by the rate table, the transaction store and the
//! identity collaborator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User ID - issued by the external identity service, immutable.
///
/// # Usage:
/// - Owner key of every transaction
/// - Lookup key for profile display metadata
pub type UserId = uuid::Uuid;

/// Transaction ID - ULID-based unique identifier
///
/// Using ULID provides:
/// - Monotonic, sortable IDs (creation order)
/// - No coordination needed between concurrent creators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(ulid::Ulid);

impl TransactionId {
    /// Generate a new unique TransactionId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Rate record ID - stable across replacements of the same country's entry.
pub type RateId = uuid::Uuid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_parse_display() {
        let id = TransactionId::new();
        let parsed: TransactionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_transaction_id_rejects_garbage() {
        assert!("not-a-ulid".parse::<TransactionId>().is_err());
    }

    #[test]
    fn test_transaction_ids_are_monotonic_within_process() {
        let a = TransactionId::new();
        let b = TransactionId::new();
        assert_ne!(a, b);
    }
}
