//! The transfer flow: page and endpoint for moving money from the selected
//! account to another account identified by IBAN.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{account_belongs_to_customer, get_account_by_iban, get_account_by_id},
    alert::Alert,
    database_id::AccountId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        PANEL_STYLE, balance_display, base,
    },
    messages,
    navigation::NavBar,
    session::Session,
    transaction::core::read_current_balance,
    validation::{validate_amount, validate_iban},
};

use super::engine;

/// The state needed for the transfer page and endpoint.
#[derive(Debug, Clone)]
pub struct TransferState {
    /// The database connection for accounts and ledger records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferForm {
    /// The IBAN of the receiving account.
    pub iban: String,
    /// The amount to transfer.
    pub amount: Decimal,
}

/// The inputs echoed back into the transfer form when an attempt fails, so
/// the user can correct them instead of retyping.
#[derive(Debug, Default)]
struct TransferFormInputs<'a> {
    iban: &'a str,
    amount: Option<Decimal>,
}

/// The balance display plus the transfer form. The endpoint re-renders
/// this fragment with a success or error alert; error renders keep the
/// submitted IBAN and amount in the inputs.
fn transfer_panel(balance: Decimal, inputs: &TransferFormInputs, alert: Option<Alert>) -> Markup {
    let amount_value = inputs
        .amount
        .map(|amount| amount.to_string())
        .unwrap_or_default();

    html! {
        div id="transfer-panel" class=(PANEL_STYLE)
        {
            @if let Some(alert) = alert {
                (alert.into_html())
            }

            (balance_display(balance))

            form
                hx-post=(endpoints::TRANSFER_API)
                hx-target="#transfer-panel"
                hx-swap="outerHTML"
                class="space-y-4 md:space-y-6"
            {
                div
                {
                    label for="iban" class=(FORM_LABEL_STYLE) { "Recipient IBAN" }

                    input
                        type="text"
                        name="iban"
                        id="iban"
                        placeholder="CH 1234 5678 9123 4567 8T"
                        required
                        value=(inputs.iban)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        type="number"
                        name="amount"
                        id="amount"
                        step="0.01"
                        placeholder="0.00"
                        required
                        value=(amount_value)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Transfer" }
            }
        }
    }
}

fn transfer_view(balance: Decimal) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSFER_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Transfer" }

                (transfer_panel(balance, &TransferFormInputs::default(), None))
            }
        }
    };

    base("Transfer", &content)
}

/// Renders the transfer page for the selected account.
///
/// Requests without a selected account, or whose selected account does not
/// belong to the session customer, are redirected to the accounts page.
pub async fn get_transfer_page(
    State(state): State<TransferState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let Some(account_id) = session.account_id else {
        return Ok(Redirect::to(endpoints::ACCOUNTS_VIEW).into_response());
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    if !account_belongs_to_customer(account_id, session.customer_id, &connection)? {
        return Ok(Redirect::to(endpoints::ACCOUNTS_VIEW).into_response());
    }

    let account = match get_account_by_id(account_id, &connection) {
        Ok(account) => account,
        Err(Error::NotFound) => {
            return Ok(Redirect::to(endpoints::ACCOUNTS_VIEW).into_response());
        }
        Err(error) => return Err(error),
    };

    Ok(transfer_view(account.balance).into_response())
}

/// A route handler that transfers the submitted amount from the selected
/// account to the account matching the submitted IBAN, inside one database
/// transaction covering both legs.
pub async fn transfer_endpoint(
    State(state): State<TransferState>,
    Extension(session): Extension<Session>,
    Form(form): Form<TransferForm>,
) -> Response {
    let Some(account_id) = session.account_id else {
        return (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response();
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(message) = validate_amount(form.amount) {
        return render_transfer_error(account_id, &form, message, &connection);
    }

    if let Err(message) = validate_iban(&form.iban) {
        return render_transfer_error(account_id, &form, message, &connection);
    }

    match execute_transfer(account_id, &form.iban, form.amount, &mut connection) {
        Ok(new_balance) => transfer_panel(
            new_balance,
            &TransferFormInputs::default(),
            Some(Alert::success(messages::TRANSFER_SUCCESSFUL)),
        )
        .into_response(),
        Err(message) => render_transfer_error(account_id, &form, message, &connection),
    }
}

/// Perform the transfer inside a single database transaction.
///
/// Returns the user-facing message for the error paths; the transaction
/// rolls back on drop whenever this returns early, so a failed transfer
/// never leaves a single-legged movement behind.
fn execute_transfer(
    account_id: AccountId,
    iban: &str,
    amount: Decimal,
    connection: &mut Connection,
) -> Result<Decimal, &'static str> {
    let transaction = connection.transaction().map_err(|error| {
        tracing::error!("could not begin transaction: {error}");
        messages::TRANSFER_FAILED
    })?;

    let sender = match get_account_by_id(account_id, &transaction) {
        Ok(account) => account,
        Err(Error::NotFound) => return Err(messages::ACCOUNT_NOT_FOUND),
        Err(error) => {
            tracing::error!("could not load account {account_id}: {error}");
            return Err(messages::TRANSFER_FAILED);
        }
    };

    let receiver = match get_account_by_iban(iban, &transaction) {
        Ok(account) => account,
        Err(Error::NotFound) => return Err(messages::NO_MATCHING_ACCOUNT),
        Err(error) => {
            tracing::error!("could not load receiving account: {error}");
            return Err(messages::TRANSFER_FAILED);
        }
    };

    if !engine::has_sufficient_funds(&sender, amount) {
        return Err(messages::AMOUNT_EXCEEDS_LIMIT);
    }

    let new_balance = engine::transfer(&sender, &receiver, amount, &transaction).map_err(|error| {
        tracing::error!("could not execute transfer: {error}");
        messages::TRANSFER_FAILED
    })?;

    transaction.commit().map_err(|error| {
        tracing::error!("could not commit transfer: {error}");
        messages::TRANSFER_FAILED
    })?;

    Ok(new_balance)
}

/// Render the transfer panel with an error alert, the submitted inputs
/// echoed back, and the sender's current balance re-read after the failed
/// operation.
fn render_transfer_error(
    account_id: AccountId,
    form: &TransferForm,
    message: &str,
    connection: &Connection,
) -> Response {
    let balance = read_current_balance(account_id, connection).unwrap_or(Decimal::ZERO);
    let inputs = TransferFormInputs {
        iban: &form.iban,
        amount: Some(form.amount),
    };

    transfer_panel(balance, &inputs, Some(Alert::error(message))).into_response()
}
