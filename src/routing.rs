//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{get_accounts_page, select_account_endpoint},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    session::{get_log_in_page, get_log_out, post_log_in, session_guard, session_guard_hx},
    transaction::{
        deposit_endpoint, get_deposit_page, get_transfer_page, get_withdraw_page,
        transfer_endpoint, withdraw_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::DEPOSIT_VIEW, get(get_deposit_page))
        .route(endpoints::WITHDRAW_VIEW, get(get_withdraw_page))
        .route(endpoints::TRANSFER_VIEW, get(get_transfer_page))
        .layer(middleware::from_fn_with_state(state.clone(), session_guard));

    // These POST routes need to use the HX-REDIRECT header for session redirects to work properly
    // for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::SELECT_ACCOUNT_API, post(select_account_endpoint))
            .route(endpoints::DEPOSIT_API, post(deposit_endpoint))
            .route(endpoints::WITHDRAW_API, post(withdraw_endpoint))
            .route(endpoints::TRANSFER_API, post(transfer_endpoint))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                session_guard_hx,
            )),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the accounts page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::ACCOUNTS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_accounts() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::ACCOUNTS_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, "foobar").unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn protected_page_redirects_to_log_in_without_session() {
        let server = get_test_server();

        let response = server.get(endpoints::DEPOSIT_VIEW).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
    }

    #[tokio::test]
    async fn log_in_page_is_reachable_without_session() {
        let server = get_test_server();

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found() {
        let server = get_test_server();

        let response = server.get("/no/such/page").await;

        response.assert_status_not_found();
    }
}
