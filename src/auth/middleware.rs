//! Authentication middleware that rejects requests without a valid auth cookie.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, Error, auth::cookie::get_token_from_cookies};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid authorization cookie.
///
/// The request is executed normally if the cookie holds an unexpired token,
/// otherwise a 401 response with the JSON body `{"message": "Unauthorized"}`
/// is returned and the route handler is never called.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Rejecting request.");
            return Error::Unauthorized.into_response();
        }
    };

    if let Err(error) = get_token_from_cookies(&jar) {
        tracing::debug!("Rejected request to {}: {error}", parts.uri.path());
        return error.into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Router,
        extract::State,
        http::StatusCode,
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use axum_test::TestServer;
    use serde_json::json;
    use sha2::Digest;
    use time::Duration;

    use crate::{
        Error,
        auth::{
            middleware::AuthState,
            cookie::{COOKIE_TOKEN, set_auth_cookie},
            middleware::auth_guard,
        },
    };

    async fn test_handler() -> &'static str {
        "Hello, World!"
    }

    async fn stub_log_in_route(
        State(_state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, Duration::minutes(5))
    }

    async fn stub_expired_log_in_route(
        State(_state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, Duration::seconds(-5))
    }

    const TEST_LOG_IN_ROUTE: &str = "/log_in";
    const TEST_EXPIRED_LOG_IN_ROUTE: &str = "/log_in_expired";
    const TEST_PROTECTED_ROUTE: &str = "/api/protected";

    fn get_test_server() -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let state = AuthState {
            cookie_key: Key::from(&hash),
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .route(TEST_EXPIRED_LOG_IN_ROUTE, post(stub_expired_log_in_route))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let server = get_test_server();
        let response = server.post(TEST_LOG_IN_ROUTE).await;

        response.assert_status_ok();
        let token_cookie = response.cookie(COOKIE_TOKEN);

        server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn get_protected_route_without_cookie_is_unauthorized() {
        let server = get_test_server();

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "message": "Unauthorized" }));
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_token_is_unauthorized() {
        let server = get_test_server();
        let token_cookie = server
            .post(TEST_EXPIRED_LOG_IN_ROUTE)
            .await
            .cookie(COOKIE_TOKEN);

        server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_forged_cookie_is_unauthorized() {
        let server = get_test_server();

        server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::new(
                COOKIE_TOKEN,
                r#"{"expires_at":"2999-01-01 00:00:00.0 +00:00:00"}"#,
            ))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
