//! Displays the logged-in customer's accounts and lets them select one to
//! operate on.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, get_accounts_by_customer},
    alert::error_alert,
    customer::get_customer_by_id,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, PAGE_CONTAINER_STYLE, PANEL_STYLE, base},
    navigation::NavBar,
    session::Session,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    /// The database connection for reading customers and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The account selection panel: an optional error alert plus the selection
/// form. The select-account endpoint re-renders this fragment on error.
pub(super) fn accounts_panel(accounts: &[Account], error_message: Option<&str>) -> Markup {
    html! {
        div id="account-select-panel" class=(PANEL_STYLE)
        {
            @if let Some(error_message) = error_message {
                (error_alert(error_message, ""))
            }

            @if accounts.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You have no accounts yet. Ask your advisor to open one for you."
                }
            } @else {
                form
                    hx-post=(endpoints::SELECT_ACCOUNT_API)
                    hx-target="#account-select-panel"
                    hx-swap="outerHTML"
                    class="space-y-4 md:space-y-6"
                {
                    div
                    {
                        label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                        select
                            name="account_id"
                            id="account_id"
                            class=(FORM_SELECT_STYLE)
                        {
                            option value="" { "Select an account..." }

                            @for account in accounts {
                                option value=(account.id) { (account.iban) }
                            }
                        }
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Continue" }
                }
            }
        }
    }
}

fn accounts_view(first_name: &str, accounts: &[Account]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Welcome, " (first_name) }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Choose the account you want to work with."
                }

                (accounts_panel(accounts, None))
            }
        }
    };

    base("Accounts", &content)
}

/// Renders the accounts page for the logged-in customer.
///
/// A session whose customer no longer exists is treated as invalid and
/// redirected to the log-in page.
pub async fn get_accounts_page(
    State(state): State<AccountsPageState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customer = match get_customer_by_id(session.customer_id, &connection) {
        Ok(customer) => customer,
        Err(Error::NotFound) => {
            return Ok(Redirect::to(endpoints::LOG_IN_VIEW).into_response());
        }
        Err(error) => return Err(error),
    };

    let accounts = get_accounts_by_customer(customer.id, &connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    Ok(accounts_view(&customer.first_name, &accounts).into_response())
}

#[cfg(test)]
mod accounts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;

    use crate::{
        account::{NewAccount, create_account},
        customer::{create_customer, test_customer},
        db::initialize,
        endpoints,
        session::Session,
        test_utils::{assert_content_type, assert_valid_html, parse_html_document},
    };

    use super::{AccountsPageState, get_accounts_page};

    fn get_test_state() -> AccountsPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        AccountsPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn lists_the_customers_accounts() {
        let state = get_test_state();
        let (customer_id, iban) = {
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
            (customer.id, account.iban)
        };
        let session = Session {
            customer_id,
            account_id: None,
        };

        let response = get_accounts_page(State(state), Extension(session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let option_selector = Selector::parse("select[name='account_id'] option").unwrap();
        let option_labels: Vec<String> = html
            .select(&option_selector)
            .map(|option| option.text().collect::<String>().trim().to_owned())
            .collect();
        assert!(
            option_labels.contains(&iban),
            "want option {iban} in {option_labels:?}"
        );
    }

    #[tokio::test]
    async fn greets_the_customer_by_first_name() {
        let state = get_test_state();
        let customer_id = {
            let connection = state.db_connection.lock().unwrap();
            create_customer(test_customer("1000001"), &connection)
                .unwrap()
                .id
        };
        let session = Session {
            customer_id,
            account_id: None,
        };

        let response = get_accounts_page(State(state), Extension(session))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let heading_selector = Selector::parse("h1").unwrap();
        let heading: String = html
            .select(&heading_selector)
            .next()
            .expect("Could not find heading in HTML")
            .text()
            .collect();
        assert_eq!("Welcome, Max", heading.trim());
    }

    #[tokio::test]
    async fn unknown_customer_redirects_to_log_in() {
        let state = get_test_state();
        let session = Session {
            customer_id: 42,
            account_id: None,
        };

        let response = get_accounts_page(State(state), Extension(session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }
}
