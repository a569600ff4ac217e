//! Strongly typed identifiers for lending records.
//!
//! Every identifier is a UUID wrapped in its own newtype so a borrow id can
//! never be passed where a book id is expected. Serde uses the hyphenated
//! string form.

use std::fmt;

use uuid::Uuid;

/// Validation errors raised when parsing an identifier from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// Input was empty.
    #[error("{kind} must not be empty")]
    Empty {
        /// Identifier kind, for example `book id`.
        kind: &'static str,
    },
    /// Input was not a canonical UUID.
    #[error("{kind} must be a valid UUID")]
    Invalid {
        /// Identifier kind, for example `book id`.
        kind: &'static str,
    },
}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from text.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { kind: $kind })
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_uuid_id!(
    /// Identifier of an authenticated library member.
    UserId => "user id"
);
define_uuid_id!(
    /// Identifier of a catalogue book (single copy).
    BookId => "book id"
);
define_uuid_id!(
    /// Identifier of a borrow record.
    BorrowId => "borrow id"
);
define_uuid_id!(
    /// Identifier of a reservation.
    ReservationId => "reservation id"
);
define_uuid_id!(
    /// Identifier of a notification.
    NotificationId => "notification id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", IdValidationError::Empty { kind: "book id" })]
    #[case("not-a-uuid", IdValidationError::Invalid { kind: "book id" })]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", IdValidationError::Invalid { kind: "book id" })]
    fn rejects_malformed_input(#[case] raw: &str, #[case] expected: IdValidationError) {
        assert_eq!(BookId::new(raw), Err(expected));
    }

    #[rstest]
    fn serde_uses_plain_strings() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id = BorrowId::new(raw).expect("valid id");

        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, format!("\"{raw}\""));

        let parsed: BorrowId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(parsed, id);
    }

    #[rstest]
    fn deserialising_reports_the_identifier_kind() {
        let err = serde_json::from_str::<ReservationId>("\"nope\"").expect_err("invalid id");
        assert!(err.to_string().contains("reservation id"));
    }
}
