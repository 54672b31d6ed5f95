//! The transaction engine: the only code that mutates balances and appends
//! ledger records.
//!
//! Every mutating function takes a [rusqlite::Transaction], the scoped unit
//! of work opened by the caller. The caller commits after the engine call
//! returns; if anything fails before the commit, dropping the transaction
//! rolls back and no partial state survives.

use rusqlite::Transaction as SqlTransaction;
use rust_decimal::Decimal;

use crate::{Error, account::Account, transaction::core::TransactionKind};

use super::core::{insert_transaction_record, update_account_balance};

/// Check whether `account` can cover a withdrawal or outgoing transfer of
/// `amount`: true iff `balance - amount >= -overdraft`.
///
/// This is the single admission rule for money leaving an account. It is a
/// stateless comparison; serialization of concurrent operations is left to
/// the database transaction wrapping the mutation.
pub fn has_sufficient_funds(account: &Account, amount: Decimal) -> bool {
    account.balance - amount >= -account.overdraft
}

/// Deposit `amount` into `account`: append one credit record and increase
/// the balance. Returns the new balance.
///
/// # Errors
/// Returns an [Error::SqlError] if a write fails; the caller's transaction
/// then rolls back, leaving no trace of the attempt.
pub fn deposit(
    account: &Account,
    amount: Decimal,
    transaction: &SqlTransaction,
) -> Result<Decimal, Error> {
    insert_transaction_record(TransactionKind::Credit, amount, account.id, transaction)?;

    let new_balance = account.balance + amount;
    update_account_balance(account.id, new_balance, transaction)?;

    Ok(new_balance)
}

/// Withdraw `amount` from `account`: append one debit record and decrease
/// the balance. Returns the new balance.
///
/// The caller must have already checked [has_sufficient_funds]; this
/// function applies the mutation unconditionally.
///
/// # Errors
/// Returns an [Error::SqlError] if a write fails; the caller's transaction
/// then rolls back, leaving no trace of the attempt.
pub fn withdraw(
    account: &Account,
    amount: Decimal,
    transaction: &SqlTransaction,
) -> Result<Decimal, Error> {
    insert_transaction_record(TransactionKind::Debit, amount, account.id, transaction)?;

    let new_balance = account.balance - amount;
    update_account_balance(account.id, new_balance, transaction)?;

    Ok(new_balance)
}

/// Move `amount` from `sender` to `receiver`: append a debit record on the
/// sender and a credit record on the receiver, and update both balances.
/// Returns the sender's new balance.
///
/// The caller must have already checked [has_sufficient_funds] for the
/// sender. All four writes share the caller's transaction, so either both
/// legs become durable or neither does.
///
/// # Errors
/// Returns an [Error::SqlError] if a write fails; the caller's transaction
/// then rolls back, leaving no trace of the attempt.
pub fn transfer(
    sender: &Account,
    receiver: &Account,
    amount: Decimal,
    transaction: &SqlTransaction,
) -> Result<Decimal, Error> {
    insert_transaction_record(TransactionKind::Debit, amount, sender.id, transaction)?;
    insert_transaction_record(TransactionKind::Credit, amount, receiver.id, transaction)?;

    let new_sender_balance = sender.balance - amount;
    update_account_balance(sender.id, new_sender_balance, transaction)?;
    update_account_balance(receiver.id, receiver.balance + amount, transaction)?;

    Ok(new_sender_balance)
}

#[cfg(test)]
mod has_sufficient_funds_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::account::Account;

    use super::has_sufficient_funds;

    fn account(balance: Decimal, overdraft: Decimal) -> Account {
        Account {
            id: 1,
            iban: "CH930076201162385295A".to_owned(),
            balance,
            overdraft,
            customer_id: 1,
        }
    }

    #[test]
    fn allows_amounts_up_to_balance_plus_overdraft() {
        let account = account(dec!(1000), dec!(200));

        assert!(has_sufficient_funds(&account, dec!(1)));
        assert!(has_sufficient_funds(&account, dec!(1000)));
        assert!(has_sufficient_funds(&account, dec!(1199.99)));
        assert!(has_sufficient_funds(&account, dec!(1200)));
    }

    #[test]
    fn rejects_amounts_beyond_the_limit() {
        let account = account(dec!(1000), dec!(200));

        assert!(!has_sufficient_funds(&account, dec!(1200.01)));
        assert!(!has_sufficient_funds(&account, dec!(9999)));
    }

    #[test]
    fn negative_balance_counts_against_the_limit() {
        let account = account(dec!(-199), dec!(200));

        assert!(has_sufficient_funds(&account, dec!(1)));
        assert!(!has_sufficient_funds(&account, dec!(1.01)));
    }

    #[test]
    fn zero_overdraft_limits_to_the_balance() {
        let account = account(dec!(50), dec!(0));

        assert!(has_sufficient_funds(&account, dec!(50)));
        assert!(!has_sufficient_funds(&account, dec!(50.01)));
    }
}
