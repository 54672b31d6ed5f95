//! The deposit flow: page and endpoint for paying money into the selected
//! account.

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

/// The state needed for the deposit page and endpoint.
#[derive(Debug, Clone)]
pub struct DepositState {
    /// The database connection for accounts and ledger records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DepositState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a deposit.
#[derive(Debug, Deserialize)]
pub struct DepositForm {
    /// The amount to deposit.
    pub amount: Decimal,
}

/// The balance display plus the deposit form. The endpoint re-renders this
/// fragment with a success or error alert.
fn deposit_panel(balance: Decimal, alert: Option<Alert>) -> Markup {
    html! {
        div id="deposit-panel" class=(PANEL_STYLE)
        {
            @if let Some(alert) = alert {
                (alert.into_html())
            }

            (balance_display(balance))

            form
                hx-post=(endpoints::DEPOSIT_API)
                hx-target="#deposit-panel"
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

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Deposit" }
            }
        }
    }
}

fn deposit_view(balance: Decimal) -> Markup {
    let nav_bar = NavBar::new(endpoints::DEPOSIT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Deposit" }

                (deposit_panel(balance, None))
            }
        }
    };

    base("Deposit", &content)
}

/// Renders the deposit page for the selected account.
///
/// Requests without a selected account, or whose selected account does not
/// belong to the session customer, are redirected to the accounts page.
pub async fn get_deposit_page(
    State(state): State<DepositState>,
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

    Ok(deposit_view(account.balance).into_response())
}

/// A route handler that deposits the submitted amount into the selected
/// account inside one database transaction.
pub async fn deposit_endpoint(
    State(state): State<DepositState>,
    Extension(session): Extension<Session>,
    Form(form): Form<DepositForm>,
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
        return render_deposit_error(account_id, message, &connection);
    }

    match execute_deposit(account_id, form.amount, &mut connection) {
        Ok(new_balance) => deposit_panel(
            new_balance,
            Some(Alert::success(messages::DEPOSIT_SUCCESSFUL)),
        )
        .into_response(),
        Err(message) => render_deposit_error(account_id, message, &connection),
    }
}

/// Perform the deposit inside a single database transaction.
///
/// Returns the user-facing message for the error paths; the transaction
/// rolls back on drop whenever this returns early.
fn execute_deposit(
    account_id: AccountId,
    amount: Decimal,
    connection: &mut Connection,
) -> Result<Decimal, &'static str> {
    let transaction = connection.transaction().map_err(|error| {
        tracing::error!("could not begin transaction: {error}");
        messages::DEPOSIT_FAILED
    })?;

    let account = match get_account_by_id(account_id, &transaction) {
        Ok(account) => account,
        Err(Error::NotFound) => return Err(messages::ACCOUNT_NOT_FOUND),
        Err(error) => {
            tracing::error!("could not load account {account_id}: {error}");
            return Err(messages::DEPOSIT_FAILED);
        }
    };

    let new_balance = engine::deposit(&account, amount, &transaction).map_err(|error| {
        tracing::error!("could not execute deposit: {error}");
        messages::DEPOSIT_FAILED
    })?;

    transaction.commit().map_err(|error| {
        tracing::error!("could not commit deposit: {error}");
        messages::DEPOSIT_FAILED
    })?;

    Ok(new_balance)
}

/// Render the deposit panel with an error alert and the account's current
/// balance, re-read after the failed operation.
fn render_deposit_error(
    account_id: AccountId,
    message: &str,
    connection: &Connection,
) -> Response {
    let balance = read_current_balance(account_id, connection).unwrap_or(Decimal::ZERO);

    deposit_panel(balance, Some(Alert::error(message))).into_response()
}

#[cfg(test)]
mod deposit_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        account::{Account, NewAccount, create_account, get_account_by_id},
        customer::{create_customer, test_customer},
        db::initialize,
        endpoints, messages,
        session::Session,
        test_utils::{assert_fragment_contains_alert, assert_hx_redirect, parse_html_document},
        transaction::test_utils::get_records_for_account,
    };

    use super::{DepositForm, DepositState, deposit_endpoint, get_deposit_page};

    fn get_test_state() -> DepositState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DepositState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn seed_account(state: &DepositState) -> (Session, Account) {
        let connection = state.db_connection.lock().unwrap();
        let customer = create_customer(test_customer("1000001"), &connection).unwrap();
        let account = create_account(
            NewAccount {
                iban: "CH930076201162385295A".to_owned(),
                balance: dec!(1000),
                overdraft: dec!(200),
                customer_id: customer.id,
            },
            &connection,
        )
        .unwrap();

        (
            Session {
                customer_id: customer.id,
                account_id: Some(account.id),
            },
            account,
        )
    }

    #[tokio::test]
    async fn page_shows_current_balance() {
        let state = get_test_state();
        let (session, _) = seed_account(&state);

        let response = get_deposit_page(State(state), Extension(session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("CHF 1000.00"),
            "want balance CHF 1000.00 on the page, got: {text}"
        );
    }

    #[tokio::test]
    async fn page_without_selected_account_redirects_to_accounts() {
        let state = get_test_state();
        let (mut session, _) = seed_account(&state);
        session.account_id = None;

        let response = get_deposit_page(State(state), Extension(session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::ACCOUNTS_VIEW
        );
    }

    #[tokio::test]
    async fn page_with_someone_elses_account_redirects_to_accounts() {
        let state = get_test_state();
        let (session, _) = seed_account(&state);
        let other_customer_id = {
            let connection = state.db_connection.lock().unwrap();
            create_customer(test_customer("1000002"), &connection)
                .unwrap()
                .id
        };
        let session = Session {
            customer_id: other_customer_id,
            account_id: session.account_id,
        };

        let response = get_deposit_page(State(state), Extension(session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::ACCOUNTS_VIEW
        );
    }

    #[tokio::test]
    async fn deposit_increases_balance_and_writes_record() {
        let state = get_test_state();
        let (session, account) = seed_account(&state);

        let response = deposit_endpoint(
            State(state.clone()),
            Extension(session),
            Form(DepositForm {
                amount: dec!(12.34),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_fragment_contains_alert(response, messages::DEPOSIT_SUCCESSFUL).await;

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            dec!(1012.34),
            get_account_by_id(account.id, &connection).unwrap().balance
        );
        assert_eq!(1, get_records_for_account(account.id, &connection).len());
    }

    #[tokio::test]
    async fn non_positive_amount_changes_nothing() {
        let state = get_test_state();
        let (session, account) = seed_account(&state);

        for amount in [dec!(0), dec!(-5)] {
            let response = deposit_endpoint(
                State(state.clone()),
                Extension(session),
                Form(DepositForm { amount }),
            )
            .await;

            assert_eq!(response.status(), StatusCode::OK);
            assert_fragment_contains_alert(response, messages::AMOUNT_NOT_POSITIVE).await;
        }

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            dec!(1000),
            get_account_by_id(account.id, &connection).unwrap().balance
        );
        assert!(get_records_for_account(account.id, &connection).is_empty());
    }

    #[tokio::test]
    async fn unknown_account_renders_not_found_message() {
        let state = get_test_state();
        let (session, _) = seed_account(&state);
        let session = Session {
            customer_id: session.customer_id,
            account_id: Some(1337),
        };

        let response = deposit_endpoint(
            State(state),
            Extension(session),
            Form(DepositForm { amount: dec!(10) }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_fragment_contains_alert(response, messages::ACCOUNT_NOT_FOUND).await;
    }

    #[tokio::test]
    async fn missing_account_selection_redirects_to_accounts() {
        let state = get_test_state();
        let (mut session, _) = seed_account(&state);
        session.account_id = None;

        let response = deposit_endpoint(
            State(state),
            Extension(session),
            Form(DepositForm { amount: dec!(10) }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
    }
}
