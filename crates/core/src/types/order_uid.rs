//! Order UID type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderUid`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderUidError {
    /// The input string is empty or contains only whitespace.
    #[error("order_uid cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("order_uid must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The unique identifier of an order.
///
/// An `OrderUid` is the sole key under which an order document is stored,
/// cached, and looked up. It is assigned by the upstream system producing
/// order messages and is immutable once assigned.
///
/// ## Constraints
///
/// - Must not be empty or all whitespace
/// - Length: 1-128 characters
///
/// ## Examples
///
/// ```
/// use orderdesk_core::OrderUid;
///
/// assert!(OrderUid::parse("b563feb7b2b84b6").is_ok());
/// assert!(OrderUid::parse("").is_err());
/// assert!(OrderUid::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderUid(String);

impl OrderUid {
    /// Maximum length of an order UID.
    pub const MAX_LENGTH: usize = 128;

    /// Parse an `OrderUid` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, all whitespace, or longer
    /// than 128 characters.
    pub fn parse(s: &str) -> Result<Self, OrderUidError> {
        if s.trim().is_empty() {
            return Err(OrderUidError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(OrderUidError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the UID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
