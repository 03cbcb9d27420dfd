//! Text mapping for enums persisted as strings.

use thiserror::Error;

/// A stored string did not name a known variant.
#[derive(Debug, Clone, Error)]
#[error("Unknown {kind} value: {value}")]
pub struct ParseEnumError {
    /// Enum being parsed.
    pub kind: &'static str,
    /// Offending input.
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Returns the stored text form.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::macros::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::macros::ParseEnumError {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Converts component errors into the shared application taxonomy.
macro_rules! into_app_error {
    ($($name:ty),+ $(,)?) => {
        $(
            impl From<$name> for ledgerwise_shared::AppError {
                fn from(e: $name) -> Self {
                    ledgerwise_shared::AppError::from_status(e.http_status_code(), e.error_code(), e.to_string())
                }
            }
        )+
    };
}
