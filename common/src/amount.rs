//! [`Amount`]-related definitions.

use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
use rust_decimal::Decimal;

/// Exact decimal amount: a quantity, a unit price or a product of both.
///
/// Arithmetic is performed on [`Decimal`]s, so `25.5 × 10` is exactly `255`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero [`Amount`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Amount`] out of the provided [`Decimal`].
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying [`Decimal`] of this [`Amount`].
    #[must_use]
    pub const fn decimal(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Amount`] is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Multiplies this [`Amount`] by the `other` one.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        self.0.checked_mul(other.0).map(|v| Self(v.normalize()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Self)
            .map_err(|_| ParseError::Invalid)
    }
}

/// Error of parsing an [`Amount`] from a string.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// Provided string is empty.
    #[display("empty amount")]
    Empty,

    /// Provided string is not a decimal number.
    #[display("not a decimal number")]
    Invalid,
}

#[cfg(feature = "postgres")]
mod postgres {
    //! Module providing integration with [`postgres_types`] crate.

    use std::error::Error as StdError;

    use postgres_types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    };
    use rust_decimal::Decimal;

    use super::Amount;

    impl FromSql<'_> for Amount {
        accepts!(NUMERIC);

        fn from_sql(
            ty: &Type,
            raw: &[u8],
        ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
            Decimal::from_sql(ty, raw).map(Self)
        }
    }

    impl ToSql for Amount {
        accepts!(NUMERIC);
        to_sql_checked!();

        fn to_sql(
            &self,
            ty: &Type,
            w: &mut BytesMut,
        ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
            self.0.to_sql(ty, w)
        }
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.
    //!
    //! [`Amount`] is written as an exact JSON number (always carrying a
    //! fractional part, like `255.0`), but may be read either from a number
    //! or from a numeric string. Only [`serde_json`] is supported, as the
    //! number text is passed through a [`RawValue`].

    use std::str::FromStr as _;

    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::value::RawValue;

    use super::Amount;

    impl Serialize for Amount {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            let value = self.0.normalize();
            let repr = if value.scale() == 0 {
                format!("{value}.0")
            } else {
                value.to_string()
            };
            RawValue::from_string(repr)
                .map_err(ser::Error::custom)?
                .serialize(s)
        }
    }

    impl<'de> Deserialize<'de> for Amount {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let raw = Box::<RawValue>::deserialize(d)?;
            let text = raw.get();

            let number = if text.starts_with('"') {
                serde_json::from_str::<String>(text)
                    .map_err(de::Error::custom)?
            } else if text.starts_with(|c: char| c == '-' || c.is_ascii_digit())
            {
                text.to_owned()
            } else {
                return Err(de::Error::invalid_type(
                    de::Unexpected::Other(text),
                    &"a decimal number or a numeric string",
                ));
            };

            Amount::from_str(&number)
                .map_err(|e| de::Error::custom(format!("`{number}`: {e}")))
        }
    }
}
