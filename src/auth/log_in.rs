//! Passcode log-in handler that sets the auth cookie.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{AppState, Error, auth::cookie::set_auth_cookie};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The SHA-512 digest of the configured passcode.
    pub passcode_digest: Vec<u8>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            passcode_digest: state.passcode_digest.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The body of a log-in request.
#[derive(Deserialize)]
pub struct LogInData {
    pub passcode: String,
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and `{"message": "Logged in"}` is returned.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The request body is not a JSON object with a `passcode` string.
/// - The passcode is not correct.
/// - The auth cookie could not be created.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    data: Result<Json<LogInData>, JsonRejection>,
) -> Response {
    let Json(data) = match data {
        Ok(data) => data,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    if Sha512::digest(&data.passcode).as_slice() != state.passcode_digest.as_slice() {
        tracing::warn!("Log-in attempt with an incorrect passcode");
        return Error::IncorrectPasscode.into_response();
    }

    match set_auth_cookie(jar, state.cookie_duration) {
        Ok(jar) => (jar, Json(json!({ "message": "Logged in" }))).into_response(),
        Err(error) => error.into_response(),
    }
}

/// The SHA-512 digest of `passcode` as stored in the app state.
pub fn hash_passcode(passcode: &str) -> Vec<u8> {
    Sha512::digest(passcode).to_vec()
}
