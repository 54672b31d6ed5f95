//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, account::create_account_table, customer::create_customer_table,
    transaction::create_transaction_record_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// The tables are created inside a single exclusive transaction so a
/// half-initialized database is never observable.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_customer_table(&transaction)?;
    create_account_table(&transaction)?;
    create_transaction_record_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let conn = Connection::open_in_memory().unwrap();

        assert_eq!(Ok(()), initialize(&conn));
    }

    #[test]
    fn is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        assert_eq!(Ok(()), initialize(&conn));
    }
}
