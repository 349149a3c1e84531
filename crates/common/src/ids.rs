use serde::{Deserialize, Serialize};

/// Declares a storage-assigned integer identifier.
///
/// Values come from untrusted input (path segments, JSON bodies, token
/// claims), so construction never fails; callers check [`is_valid`] at the
/// point where a non-positive id must be rejected.
///
/// [`is_valid`]: UserId::is_valid
macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw integer id.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw integer value.
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Returns true if the id is a storage-assignable value (>= 1).
            pub const fn is_valid(&self) -> bool {
                self.0 >= 1
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

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

integer_id!(
    /// Identifier of an authenticated user.
    UserId
);

integer_id!(
    /// Identifier of a catalog product.
    ProductId
);

integer_id!(
    /// Identifier of a persisted cart line item.
    CartItemId
);
