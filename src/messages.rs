//! User-facing message constants shared by the deposit, withdraw and
//! transfer flows.
//!
//! The messages are plain sentences rendered inside alert fragments; they
//! deliberately carry no technical detail.

/// Shown when a submitted amount is zero or negative.
pub const AMOUNT_NOT_POSITIVE: &str = "The amount must be greater than zero.";

/// Shown when a submitted IBAN does not match the expected format.
pub const IBAN_INVALID: &str =
    "The IBAN you entered is invalid. The expected format is: CH 1234 5678 9123 4567 8T";

/// Shown when the account in the session no longer exists.
pub const ACCOUNT_NOT_FOUND: &str = "Account not found.";

/// Shown when no account matches the IBAN entered in the transfer form.
pub const NO_MATCHING_ACCOUNT: &str = "No account was found for the IBAN you entered.";

/// Shown when a withdrawal or transfer would push the balance below the
/// account's overdraft limit.
pub const AMOUNT_EXCEEDS_LIMIT: &str = "The amount you entered exceeds your limit.";

/// Shown after a successful deposit.
pub const DEPOSIT_SUCCESSFUL: &str = "The amount was successfully deposited into your account.";

/// Shown when a deposit fails for an unexpected reason.
pub const DEPOSIT_FAILED: &str =
    "The amount could not be deposited into your account. Please try again later.";

/// Shown after a successful withdrawal.
pub const WITHDRAW_SUCCESSFUL: &str = "The amount was successfully withdrawn from your account.";

/// Shown when a withdrawal fails for an unexpected reason.
pub const WITHDRAW_FAILED: &str =
    "The amount could not be withdrawn from your account. Please try again later.";

/// Shown after a successful transfer.
pub const TRANSFER_SUCCESSFUL: &str = "The transfer was carried out successfully.";

/// Shown when a transfer fails for an unexpected reason.
pub const TRANSFER_FAILED: &str =
    "The transfer could not be carried out due to an unknown error. Please try again later.";

/// Shown on the log-in form when no customer was selected.
pub const LOG_IN_CUSTOMER_NOT_SELECTED: &str = "Select a customer to log in.";

/// Shown on the accounts page when no account was selected.
pub const ACCOUNT_NOT_SELECTED: &str = "Select an account to continue.";
