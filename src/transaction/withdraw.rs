//! The withdraw flow: page and endpoint for taking money out of the
//! selected account, limited by its overdraft.

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
    account::{account_belongs_to_customer, get_account_by_id},
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
    validation::validate_amount,
};

use super::engine;

/// The state needed for the withdraw page and endpoint.
#[derive(Debug, Clone)]
pub struct WithdrawState {
    /// The database connection for accounts and ledger records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WithdrawState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a withdrawal.
#[derive(Debug, Deserialize)]
pub struct WithdrawForm {
    /// The amount to withdraw.
    pub amount: Decimal,
}

/// The balance display plus the withdraw form. The endpoint re-renders
/// this fragment with a success or error alert.
fn withdraw_panel(balance: Decimal, alert: Option<Alert>) -> Markup {
    html! {
        div id="withdraw-panel" class=(PANEL_STYLE)
        {
            @if let Some(alert) = alert {
                (alert.into_html())
            }

            (balance_display(balance))

            form
                hx-post=(endpoints::WITHDRAW_API)
                hx-target="#withdraw-panel"
                hx-swap="outerHTML"
                class="space-y-4 md:space-y-6"
            {
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
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Withdraw" }
            }
        }
    }
}

fn withdraw_view(balance: Decimal) -> Markup {
    let nav_bar = NavBar::new(endpoints::WITHDRAW_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Withdraw" }

                (withdraw_panel(balance, None))
            }
        }
    };

    base("Withdraw", &content)
}

/// Renders the withdraw page for the selected account.
///
/// Requests without a selected account, or whose selected account does not
/// belong to the session customer, are redirected to the accounts page.
pub async fn get_withdraw_page(
    State(state): State<WithdrawState>,
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

    Ok(withdraw_view(account.balance).into_response())
}

/// A route handler that withdraws the submitted amount from the selected
/// account inside one database transaction, after checking the overdraft
/// limit.
pub async fn withdraw_endpoint(
    State(state): State<WithdrawState>,
    Extension(session): Extension<Session>,
    Form(form): Form<WithdrawForm>,
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
        return render_withdraw_error(account_id, message, &connection);
    }

    match execute_withdraw(account_id, form.amount, &mut connection) {
        Ok(new_balance) => withdraw_panel(
            new_balance,
            Some(Alert::success(messages::WITHDRAW_SUCCESSFUL)),
        )
        .into_response(),
        Err(message) => render_withdraw_error(account_id, message, &connection),
    }
}

/// Perform the withdrawal inside a single database transaction.
///
/// The overdraft check runs between the account lookup and the mutation,
/// inside the same transaction. Returns the user-facing message for the
/// error paths; the transaction rolls back on drop whenever this returns
/// early.
fn execute_withdraw(
    account_id: AccountId,
    amount: Decimal,
    connection: &mut Connection,
) -> Result<Decimal, &'static str> {
    let transaction = connection.transaction().map_err(|error| {
        tracing::error!("could not begin transaction: {error}");
        messages::WITHDRAW_FAILED
    })?;

    let account = match get_account_by_id(account_id, &transaction) {
        Ok(account) => account,
        Err(Error::NotFound) => return Err(messages::ACCOUNT_NOT_FOUND),
        Err(error) => {
            tracing::error!("could not load account {account_id}: {error}");
            return Err(messages::WITHDRAW_FAILED);
        }
    };

    if !engine::has_sufficient_funds(&account, amount) {
        return Err(messages::AMOUNT_EXCEEDS_LIMIT);
    }

    let new_balance = engine::withdraw(&account, amount, &transaction).map_err(|error| {
        tracing::error!("could not execute withdrawal: {error}");
        messages::WITHDRAW_FAILED
    })?;

    transaction.commit().map_err(|error| {
        tracing::error!("could not commit withdrawal: {error}");
        messages::WITHDRAW_FAILED
    })?;

    Ok(new_balance)
}

/// Render the withdraw panel with an error alert and the account's current
/// balance, re-read after the failed operation.
fn render_withdraw_error(
    account_id: AccountId,
    message: &str,
    connection: &Connection,
) -> Response {
    let balance = read_current_balance(account_id, connection).unwrap_or(Decimal::ZERO);

    withdraw_panel(balance, Some(Alert::error(message))).into_response()
}
