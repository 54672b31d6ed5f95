//! Defines the core data model and database queries for accounts.
//!
//! Accounts are provisioned outside the application; the only code that
//! mutates a balance lives in [crate::transaction].

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;

use crate::{
    Error,
    database_id::{AccountId, CustomerId},
    validation::normalize_iban,
};

/// A bank account belonging to a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The ID for the account.
    pub id: AccountId,
    /// The account's IBAN, stored without spaces.
    pub iban: String,
    /// The current balance. May be negative down to `-overdraft`.
    pub balance: Decimal,
    /// How far below zero the balance may go. Non-negative.
    pub overdraft: Decimal,
    /// The customer that owns the account.
    pub customer_id: CustomerId,
}

/// The data required to insert an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// The account's IBAN. Spaces are stripped before insertion.
    pub iban: String,
    /// The opening balance.
    pub balance: Decimal,
    /// How far below zero the balance may go. Non-negative.
    pub overdraft: Decimal,
    /// The customer that owns the account.
    pub customer_id: CustomerId,
}

/// Create the account table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY,
                iban TEXT NOT NULL UNIQUE,
                balance TEXT NOT NULL,
                overdraft TEXT NOT NULL,
                customer_id INTEGER NOT NULL,
                FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Account].
pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        iban: row.get(1)?,
        balance: parse_decimal_column(row, 2)?,
        overdraft: parse_decimal_column(row, 3)?,
        customer_id: row.get(4)?,
    })
}

/// Parse a TEXT column holding a decimal amount.
///
/// Balances are stored as decimal strings so they round-trip exactly.
pub(crate) fn parse_decimal_column(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Insert a new account into the database.
///
/// # Errors
/// Returns an [Error::SqlError] if an SQL related error occurred, e.g. the
/// IBAN already exists or the customer does not.
pub fn create_account(account: NewAccount, connection: &Connection) -> Result<Account, Error> {
    let iban = normalize_iban(&account.iban);

    connection.execute(
        "INSERT INTO account (iban, balance, overdraft, customer_id) VALUES (?1, ?2, ?3, ?4)",
        (
            &iban,
            account.balance.to_string(),
            account.overdraft.to_string(),
            account.customer_id,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Account {
        id,
        iban,
        balance: account.balance,
        overdraft: account.overdraft,
        customer_id: account.customer_id,
    })
}

/// Retrieve an account from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account_by_id(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    let account = connection
        .prepare("SELECT id, iban, balance, overdraft, customer_id FROM account WHERE id = :id")?
        .query_one(&[(":id", &id)], map_row_to_account)?;

    Ok(account)
}

/// Retrieve an account from the database by its IBAN.
///
/// The input is normalized by stripping spaces before comparison, so
/// "CH 9300 ..." and "CH9300..." find the same account.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no account has the given IBAN,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account_by_iban(iban: &str, connection: &Connection) -> Result<Account, Error> {
    let iban = normalize_iban(iban);

    let account = connection
        .prepare(
            "SELECT id, iban, balance, overdraft, customer_id FROM account WHERE iban = :iban",
        )?
        .query_one(&[(":iban", &iban)], map_row_to_account)?;

    Ok(account)
}

/// Retrieve all accounts owned by `customer_id`, ordered by IBAN.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_accounts_by_customer(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, iban, balance, overdraft, customer_id FROM account
             WHERE customer_id = :customer_id ORDER BY iban ASC",
        )?
        .query_map(&[(":customer_id", &customer_id)], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Check that `account_id` is owned by `customer_id`.
///
/// Used before allowing operations on a selected account.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn account_belongs_to_customer(
    account_id: AccountId,
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM account WHERE id = ?1 AND customer_id = ?2",
        (account_id, customer_id),
        |row| row.get(0),
    )?;

    Ok(count > 0)
}
