//! This file defines the routes for displaying the log-in page and handling log-in requests.
//!
//! This is an educational app: logging in means choosing a customer from a
//! drop-down, exactly like picking a demo user. There are no passwords.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    alert::error_alert,
    customer::{Customer, get_all_customers, get_customer_by_id},
    database_id::CustomerId,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, base, log_in_card},
    messages,
    session::{invalidate_session_cookie, set_session_cookie},
};

fn log_in_form(customers: &[Customer], error_message: Option<&str>) -> Markup {
    html! {
        form
            id="log-in-form"
            hx-post=(endpoints::LOG_IN_API)
            hx-target="#log-in-form"
            hx-swap="outerHTML"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message {
                (error_alert(error_message, ""))
            }

            div
            {
                label for="customer_id" class=(FORM_LABEL_STYLE) { "Customer" }

                select
                    name="customer_id"
                    id="customer_id"
                    tabindex="0"
                    class=(FORM_SELECT_STYLE)
                {
                    option value="" { "Select a customer..." }

                    @for customer in customers {
                        option value=(customer.id)
                        {
                            (customer.first_name) " " (customer.last_name)
                        }
                    }
                }
            }

            button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE) { "Log in" }
        }
    }
}

/// The state needed to display the log-in page.
#[derive(Debug, Clone)]
pub struct LogInPageState {
    /// The database connection for reading customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(State(state): State<LogInPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customers = get_all_customers(&connection)
        .inspect_err(|error| tracing::error!("could not get customers: {error}"))?;

    let form = log_in_form(&customers, None);
    let content = log_in_card("Log in to your account", &form);

    Ok(base("Log In", &content).into_response())
}

/// The state needed to perform a login.
#[derive(Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for reading customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    /// The customer selected in the drop-down.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set (with no
/// account selected yet) and the client is redirected to the accounts page.
/// Otherwise, the form is returned with an error message explaining the
/// problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let render_error = |message: &str| match get_all_customers(&connection) {
        Ok(customers) => log_in_form(&customers, Some(message)).into_response(),
        Err(error) => error.into_alert_response(),
    };

    let customer_id = match form.customer_id {
        Some(customer_id) if customer_id > 0 => customer_id,
        _ => return render_error(messages::LOG_IN_CUSTOMER_NOT_SELECTED),
    };

    match get_customer_by_id(customer_id, &connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return render_error(messages::LOG_IN_CUSTOMER_NOT_SELECTED),
        Err(error) => {
            tracing::error!("could not verify customer: {error}");
            return error.into_alert_response();
        }
    }

    set_session_cookie(jar.clone(), customer_id, None, state.cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|error| {
            tracing::error!("could not set session cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_session_cookie(jar),
            )
        })
        .into_response()
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use crate::{
        customer::{create_customer, test_customer},
        database_id::CustomerId,
        db::initialize,
        endpoints,
        session::{COOKIE_SESSION, DEFAULT_COOKIE_DURATION},
        test_utils::{assert_fragment_contains_alert, assert_hx_redirect},
    };

    use super::{LogInForm, LoginState, post_log_in};

    fn get_test_state() -> LoginState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        LoginState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn seed_customer(state: &LoginState) -> CustomerId {
        let connection = state.db_connection.lock().unwrap();
        create_customer(test_customer("1000001"), &connection)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn log_in_sets_cookie_and_redirects_to_accounts() {
        let state = get_test_state();
        let customer_id = seed_customer(&state);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_log_in(
            State(state),
            jar,
            Form(LogInForm {
                customer_id: Some(customer_id),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);

        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("expected a set-cookie header")
            .to_str()
            .unwrap();
        assert!(
            set_cookie.starts_with(COOKIE_SESSION),
            "want session cookie, got {set_cookie:?}"
        );
    }

    #[tokio::test]
    async fn log_in_without_selection_renders_error() {
        let state = get_test_state();
        seed_customer(&state);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_log_in(State(state), jar, Form(LogInForm { customer_id: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_fragment_contains_alert(
            response,
            crate::messages::LOG_IN_CUSTOMER_NOT_SELECTED,
        )
        .await;
    }

    #[tokio::test]
    async fn log_in_with_unknown_customer_renders_error() {
        let state = get_test_state();
        seed_customer(&state);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_log_in(
            State(state),
            jar,
            Form(LogInForm {
                customer_id: Some(42),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_fragment_contains_alert(
            response,
            crate::messages::LOG_IN_CUSTOMER_NOT_SELECTED,
        )
        .await;
    }
}
