mod accounts_page;
mod core;
mod select_endpoint;

pub use accounts_page::get_accounts_page;
pub use core::{
    Account, NewAccount, account_belongs_to_customer, create_account, create_account_table,
    get_account_by_iban, get_account_by_id, get_accounts_by_customer, map_row_to_account,
};
pub(crate) use core::parse_decimal_column;
pub use select_endpoint::select_account_endpoint;
