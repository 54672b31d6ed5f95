//! The API endpoints URIs.

/// The root route which redirects to the accounts or log in page.
pub const ROOT: &str = "/";
/// The page for selecting one of the logged-in customer's accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for depositing money into the selected account.
pub const DEPOSIT_VIEW: &str = "/deposit";
/// The page for withdrawing money from the selected account.
pub const WITHDRAW_VIEW: &str = "/withdraw";
/// The page for transferring money to another account.
pub const TRANSFER_VIEW: &str = "/transfer";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a customer.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current customer.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for storing the selected account in the session.
pub const SELECT_ACCOUNT_API: &str = "/api/accounts/select";
/// The route for depositing money into the selected account.
pub const DEPOSIT_API: &str = "/api/deposit";
/// The route for withdrawing money from the selected account.
pub const WITHDRAW_API: &str = "/api/withdraw";
/// The route for transferring money to another account.
pub const TRANSFER_API: &str = "/api/transfer";
