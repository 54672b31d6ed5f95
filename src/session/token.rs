//! Defines the token stored in the session cookie and the [Session] value
//! object handed to route handlers.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::database_id::{AccountId, CustomerId};

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the token expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The state carried by the session cookie.
///
/// The selected account starts out as `None` after log-in and is filled in
/// once the customer picks an account on the accounts page.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    /// The ID of the logged-in customer.
    pub customer_id: CustomerId,

    /// The ID of the account the customer selected, if any.
    pub account_id: Option<AccountId>,

    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    /// When the session expires.
    pub expires_at: OffsetDateTime,
}

/// The authenticated session for one request.
///
/// Built by the session guard middleware from a valid [Token] and inserted
/// into the request extensions, so handlers receive identity explicitly
/// instead of reading ambient state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Session {
    /// The ID of the logged-in customer.
    pub customer_id: CustomerId,
    /// The ID of the account the customer selected, if any.
    pub account_id: Option<AccountId>,
}

impl From<&Token> for Session {
    fn from(token: &Token) -> Self {
        Self {
            customer_id: token.customer_id,
            account_id: token.account_id,
        }
    }
}
