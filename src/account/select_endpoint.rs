//! Defines the endpoint that stores the selected account in the session.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    account::{account_belongs_to_customer, accounts_page::accounts_panel, get_accounts_by_customer},
    database_id::AccountId,
    endpoints, messages,
    session::{Session, set_session_cookie},
};

/// The state needed to store the selected account in the session cookie.
#[derive(Clone)]
pub struct SelectAccountState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for reading accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SelectAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SelectAccountState> for Key {
    fn from_ref(state: &SelectAccountState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for selecting an account.
#[derive(Debug, Deserialize)]
pub struct SelectAccountForm {
    /// The ID of the account to operate on.
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

/// A route handler that verifies the selected account belongs to the
/// logged-in customer, stores it in the session cookie and redirects to the
/// deposit page.
pub async fn select_account_endpoint(
    State(state): State<SelectAccountState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
    Form(form): Form<SelectAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let render_error = |message: &str| match get_accounts_by_customer(session.customer_id, &connection)
    {
        Ok(accounts) => accounts_panel(&accounts, Some(message)).into_response(),
        Err(error) => error.into_alert_response(),
    };

    let account_id = match form.account_id {
        Some(account_id) if account_id > 0 => account_id,
        _ => return render_error(messages::ACCOUNT_NOT_SELECTED),
    };

    match account_belongs_to_customer(account_id, session.customer_id, &connection) {
        Ok(true) => {}
        Ok(false) => return render_error(messages::ACCOUNT_NOT_FOUND),
        Err(error) => {
            tracing::error!("could not check account ownership: {error}");
            return error.into_alert_response();
        }
    }

    match set_session_cookie(
        jar,
        session.customer_id,
        Some(account_id),
        state.cookie_duration,
    ) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DEPOSIT_VIEW.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not set session cookie: {error}");
            error.into_alert_response()
        }
    }
}
