//! Endpoints that report on the caller's own session.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    auth::{
        admin::Admin, cookie::get_session_token, middleware::AuthState, session::validate_session,
    },
    db::lock_connection,
};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    admin: Admin,
}

/// Get the admin that is logged in.
///
/// Only reachable through [crate::auth::auth_guard], which rejects requests
/// without a valid session.
pub async fn get_me(Extension(admin): Extension<Admin>) -> Json<MeResponse> {
    Json(MeResponse { admin })
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin: Option<Admin>,
}

/// Report whether the session cookie refers to a valid session.
///
/// Responds with 200 and `{valid: true, admin}` for a valid session, and 401
/// with `{valid: false}` otherwise.
pub async fn get_session_status(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Response {
    let admin = match get_session_token(&jar) {
        Some(token) => match lock_connection(&state.db_connection) {
            Ok(connection) => validate_session(&token, OffsetDateTime::now_utc(), &connection),
            Err(error) => return error.into_response(),
        },
        None => None,
    };

    match admin {
        Some(admin) => Json(SessionStatus {
            valid: true,
            admin: Some(admin),
        })
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(SessionStatus {
                valid: false,
                admin: None,
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod session_endpoint_tests {
    use axum::{
        Router,
        http::StatusCode,
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        AppState,
        auth::{auth_guard, log_in::post_log_in, log_out::post_log_out},
        endpoints,
        test_utils::{get_test_state, insert_test_admin, log_in},
    };

    use super::{get_me, get_session_status};

    const EMAIL: &str = "ada@bank.test";
    const PASSWORD: &str = "correct horse battery";

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::ME, get(get_me))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(endpoints::LOG_IN, post(post_log_in))
            .route(endpoints::LOG_OUT, post(post_log_out))
            .route(endpoints::SESSION, get(get_session_status))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn me_returns_logged_in_admin() {
        let state = get_test_state();
        let admin = insert_test_admin(&state, EMAIL, PASSWORD);
        let server = get_test_server(state);
        let cookie = log_in(&server, EMAIL, PASSWORD).await;

        let response = server.get(endpoints::ME).add_cookie(cookie).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["admin"]["id"], admin.id);
        assert_eq!(body["admin"]["firstName"], "Test");
        assert_eq!(body["admin"]["role"], "ADMIN");
    }

    #[tokio::test]
    async fn me_without_session_is_unauthorized() {
        let server = get_test_server(get_test_state());

        server
            .get(endpoints::ME)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_is_valid_after_log_in() {
        let state = get_test_state();
        insert_test_admin(&state, EMAIL, PASSWORD);
        let server = get_test_server(state);
        let cookie = log_in(&server, EMAIL, PASSWORD).await;

        let response = server.get(endpoints::SESSION).add_cookie(cookie).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["valid"], true);
        assert_eq!(body["admin"]["email"], EMAIL);
    }

    #[tokio::test]
    async fn session_is_invalid_after_log_out() {
        let state = get_test_state();
        insert_test_admin(&state, EMAIL, PASSWORD);
        let server = get_test_server(state);
        let cookie = log_in(&server, EMAIL, PASSWORD).await;
        server
            .post(endpoints::LOG_OUT)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        let response = server.get(endpoints::SESSION).add_cookie(cookie).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>(), json!({"valid": false}));
    }

    #[tokio::test]
    async fn session_without_cookie_is_invalid() {
        let server = get_test_server(get_test_state());

        let response = server.get(endpoints::SESSION).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>(), json!({"valid": false}));
    }
}
