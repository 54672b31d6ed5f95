//! Database ID type definitions.

/// The ID of a row in the customer table.
pub type CustomerId = i64;
/// The ID of a row in the account table.
pub type AccountId = i64;
/// The ID of a row in the transaction record table.
pub type TransactionRecordId = i64;
