//! The transaction engine and the deposit, withdraw and transfer flows
//! built on top of it.

mod core;
mod deposit;
mod engine;
mod transfer;
mod withdraw;

#[cfg(test)]
pub(crate) mod test_utils;

pub use core::{
    TransactionKind, TransactionRecord, create_transaction_record_table,
    map_row_to_transaction_record,
};
pub use deposit::{deposit_endpoint, get_deposit_page};
pub use engine::{deposit, has_sufficient_funds, transfer, withdraw};
pub use transfer::{get_transfer_page, transfer_endpoint};
pub use withdraw::{get_withdraw_page, withdraw_endpoint};
