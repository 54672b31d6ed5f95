//! Defines the ledger record model and its database queries.
//!
//! Records are append-only: one row per leg of a money movement, written by
//! the engine in [crate::transaction::engine] and never updated or deleted.

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    account::map_row_to_account,
    database_id::{AccountId, TransactionRecordId},
};

/// Whether a ledger record credits or debits its account.
///
/// The record's amount is always positive; the direction is carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Money flowed into the account.
    Credit,
    /// Money flowed out of the account.
    Debit,
}

impl TransactionKind {
    /// The single-character code stored in the database.
    pub fn as_code(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "C",
            TransactionKind::Debit => "D",
        }
    }

    /// The human-readable label written into the record.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "Deposit",
            TransactionKind::Debit => "Withdrawal",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "C" => Some(TransactionKind::Credit),
            "D" => Some(TransactionKind::Debit),
            _ => None,
        }
    }
}

/// One immutable entry in an account's ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// The ID of the record.
    pub id: TransactionRecordId,
    /// Whether the record credits or debits the account.
    pub kind: TransactionKind,
    /// A short label, e.g. "Deposit".
    pub text: String,
    /// The amount that was moved. Always positive.
    pub amount: Decimal,
    /// When the record was written.
    pub transaction_time: OffsetDateTime,
    /// The account the record belongs to.
    pub account_id: AccountId,
}

/// Create the transaction record table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_transaction_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transaction_record (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                text TEXT NOT NULL,
                amount TEXT NOT NULL,
                transaction_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                account_id INTEGER NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [TransactionRecord].
pub fn map_row_to_transaction_record(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    let kind_code: String = row.get(1)?;
    let kind = TransactionKind::from_code(&kind_code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown transaction kind {kind_code:?}").into(),
        )
    })?;

    Ok(TransactionRecord {
        id: row.get(0)?,
        kind,
        text: row.get(2)?,
        amount: crate::account::parse_decimal_column(row, 3)?,
        transaction_time: row.get(4)?,
        account_id: row.get(5)?,
    })
}

/// Insert one ledger record. The timestamp is assigned at write time.
///
/// Only the engine appends records; everything else reads them.
pub(super) fn insert_transaction_record(
    kind: TransactionKind,
    amount: Decimal,
    account_id: AccountId,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    let transaction_time = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO transaction_record (kind, text, amount, transaction_time, account_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            kind.as_code(),
            kind.label(),
            amount.to_string(),
            transaction_time,
            account_id,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(TransactionRecord {
        id,
        kind,
        text: kind.label().to_owned(),
        amount,
        transaction_time,
        account_id,
    })
}

/// Load an account inside the unit of work and overwrite its balance.
///
/// Exists so the engine is the only writer of `account.balance`.
pub(super) fn update_account_balance(
    account_id: AccountId,
    new_balance: Decimal,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE account SET balance = ?1 WHERE id = ?2",
        (new_balance.to_string(), account_id),
    )?;

    if rows_updated == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Re-read an account's balance. Used by the endpoints to attach the
/// current balance to error responses after an operation failed.
pub(crate) fn read_current_balance(
    account_id: AccountId,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let account = connection
        .prepare("SELECT id, iban, balance, overdraft, customer_id FROM account WHERE id = :id")?
        .query_one(&[(":id", &account_id)], map_row_to_account)?;

    Ok(account.balance)
}
