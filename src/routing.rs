//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, create_user_endpoint, get_log_in_page, get_log_out,
        get_sign_up_page, post_log_in,
    },
    budget::{get_summary_page, set_budget_endpoint},
    dashboard::get_dashboard_page,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expenses_page, get_new_expense_page,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::SIGN_UP_VIEW, get(get_sign_up_page))
        .route(endpoints::USERS, post(create_user_endpoint))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::SUMMARY_VIEW, get(get_summary_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes are requested by HTMX, so auth redirects must use the HX-Redirect header.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
            .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint))
            .route(endpoints::BUDGET_API, post(set_budget_endpoint))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    let router = protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state);

    add_tracing_layer(router)
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they happen, so `TraceLayer` does not need to log 5xx responses.
        .on_failure(());

    router.layer(tracing_layer)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState, UserID,
        auth::{COOKIE_TOKEN, PasswordHash, Username, create_user},
        endpoints::{self, format_endpoint},
        expense::list_expenses,
    };

    use super::build_router;

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_server() -> (TestServer, AppState, UserID) {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "secret", "Etc/UTC")
            .unwrap();

        let user_id = create_user(
            Username::new("alice").unwrap(),
            PasswordHash::from_raw_password(PASSWORD, 4).unwrap(),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap()
        .id;

        let server =
            TestServer::new(build_router(state.clone())).expect("Could not create test server.");

        (server, state, user_id)
    }

    async fn log_in(server: &TestServer) -> axum_extra::extract::cookie::Cookie<'static> {
        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("username", "alice"), ("password", PASSWORD)])
            .await;

        response.assert_status_see_other();
        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_cookie() {
        let (server, _, _) = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::SUMMARY_VIEW,
        ] {
            let response = server.get(page).await;

            response.assert_status_see_other();
            assert!(
                response.header("location").to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW),
                "{page} did not redirect to the log in page"
            );
        }
    }

    #[tokio::test]
    async fn api_routes_use_hx_redirect_without_cookie() {
        let (server, _, _) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_API)
            .form(&[("amount", "1.00")])
            .await;

        assert!(
            response
                .header("hx-redirect")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn public_pages_are_reachable() {
        let (server, _, _) = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
        server.get(endpoints::SIGN_UP_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_gives_not_found() {
        let (server, _, _) = get_test_server();

        server.get("/no/such/page").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn logged_in_user_can_view_pages() {
        let (server, _, _) = get_test_server();
        let cookie = log_in(&server).await;

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::SUMMARY_VIEW,
        ] {
            server
                .get(page)
                .add_cookie(cookie.clone())
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn logged_in_user_can_add_and_delete_expense() {
        let (server, state, user_id) = get_test_server();
        let cookie = log_in(&server).await;

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(cookie.clone())
            .form(&[
                ("amount", "12.34"),
                ("category", "Groceries"),
                ("description", "Weekly shop"),
                ("date", "2026-10-16"),
            ])
            .await;
        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::NEW_EXPENSE_VIEW);

        let expense_id = {
            let connection = state.db_connection.lock().unwrap();
            let expenses = list_expenses(user_id, &connection).unwrap();
            assert_eq!(expenses.len(), 1);
            expenses[0].id
        };

        let response = server
            .delete(&format_endpoint(endpoints::DELETE_EXPENSE, expense_id))
            .add_cookie(cookie)
            .await;
        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::EXPENSES_VIEW);

        let connection = state.db_connection.lock().unwrap();
        assert!(
            list_expenses(user_id, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn log_out_redirects_to_log_in() {
        let (server, _, _) = get_test_server();
        let cookie = log_in(&server).await;

        let response = server.get(endpoints::LOG_OUT).add_cookie(cookie).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
    }
}
