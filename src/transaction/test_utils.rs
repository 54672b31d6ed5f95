//! Shared helpers for the transaction flow tests.

use rusqlite::Connection;

use crate::database_id::AccountId;

use super::{TransactionRecord, map_row_to_transaction_record};

/// Read all ledger records for `account_id`, oldest first.
pub(crate) fn get_records_for_account(
    account_id: AccountId,
    connection: &Connection,
) -> Vec<TransactionRecord> {
    connection
        .prepare(
            "SELECT id, kind, text, amount, transaction_time, account_id
             FROM transaction_record WHERE account_id = :account_id ORDER BY id ASC",
        )
        .expect("could not prepare transaction record query")
        .query_map(&[(":account_id", &account_id)], map_row_to_transaction_record)
        .expect("could not query transaction records")
        .collect::<Result<Vec<_>, _>>()
        .expect("could not map transaction records")
}
