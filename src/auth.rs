//! Wiring to the external auth framework. Tokens, hashing and sessions live
//! there; this side validates forms, forwards calls and maps the outcome
//! onto the storefront's pages.

use crate::error::ApiError;
use crate::settings::Settings;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub const MIN_PASSWORD_LEN: usize = 8;

pub const CHECK_EMAIL_PATH: &str = "/auth/check-email";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
pub const REQUEST_RESET_PATH: &str = "/auth/request-reset-password";

#[derive(Debug, Deserialize, Serialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyEmailRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

/// Terminal page state for a missing or rejected token: the user can only
/// go back and ask for a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidToken {
    pub status: &'static str,
    pub message: String,
    pub next: &'static str,
}

impl InvalidToken {
    fn new(message: impl Into<String>, next: &'static str) -> Self {
        InvalidToken {
            status: "invalid_token",
            message: message.into(),
            next,
        }
    }
}

fn present(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

pub fn verification_token(token: Option<&str>) -> Result<&str, InvalidToken> {
    present(token).ok_or_else(|| InvalidToken::new("Missing verification token", SIGNUP_PATH))
}

pub fn reset_token(token: Option<&str>) -> Result<&str, InvalidToken> {
    present(token).ok_or_else(|| {
        InvalidToken::new(
            "Invalid or missing reset token. Please request a new password reset.",
            REQUEST_RESET_PATH,
        )
    })
}

pub fn validate_signup(req: &SignupRequest) -> Result<(), ApiError> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("Please enter a valid email address".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ApiError> {
    if password.is_empty() || confirm.is_empty() {
        return Err(ApiError::Validation(
            "Please enter and confirm your new password".to_string(),
        ));
    }
    if password != confirm {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Absolute storefront URL for `path`, with optional query pairs.
pub fn app_link(app_url: &str, path: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
    let base = Url::parse(app_url).map_err(|e| ApiError::Url(e.to_string()))?;
    let mut url = base.join(path).map_err(|e| ApiError::Url(e.to_string()))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url.to_string())
}

/// Body and session cookies of a successful upstream call.
#[derive(Debug)]
pub struct AuthResponse {
    pub body: Value,
    pub set_cookies: Vec<String>,
}

/// Extracts the upstream's error wording: `{"error": {"message"}}` or `{"message"}`.
fn upstream_message(body: &Value) -> Option<String> {
    body.pointer("/error/message")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub struct AuthClient {
    http: Client,
    base_url: String,
    app_url: String,
}

impl AuthClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.auth.timeout_seconds))
            .build()?;
        Ok(AuthClient {
            http,
            base_url: settings.auth.base_url.trim_end_matches('/').to_string(),
            app_url: settings.app.url.clone(),
        })
    }

    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        cookie: Option<&str>,
        fallback: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self.http.request(method, &url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            log::error!("auth call {} failed: {}", endpoint, e);
            ApiError::AuthUnavailable(e)
        })?;

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let bytes = response.bytes().await?;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(body) => body,
                Err(e) => {
                    log::error!(
                        "auth call {} answered {} with a non-JSON body ({}): {}",
                        endpoint,
                        status,
                        e,
                        String::from_utf8_lossy(&bytes[..bytes.len().min(200)])
                    );
                    let status = if status.is_success() { 502 } else { status.as_u16() };
                    return Err(ApiError::Upstream {
                        status,
                        message: fallback.to_string(),
                    });
                }
            }
        };

        if !status.is_success() || body.get("error").map_or(false, |e| !e.is_null()) {
            let message = upstream_message(&body).unwrap_or_else(|| fallback.to_string());
            log::warn!("auth call {} rejected ({}): {}", endpoint, status, message);
            let status = if status.is_success() { 400 } else { status.as_u16() };
            return Err(ApiError::Upstream { status, message });
        }

        Ok(AuthResponse { body, set_cookies })
    }

    pub async fn sign_up(&self, req: &SignupRequest) -> Result<AuthResponse, ApiError> {
        let name = crate::emails::display_name(req.name.as_deref(), req.email.trim());
        let callback = app_link(&self.app_url, VERIFY_EMAIL_PATH, &[])?;
        let body = json!({
            "email": req.email.trim(),
            "password": req.password,
            "name": name,
            "callbackURL": callback,
        });
        self.call(Method::POST, "sign-up/email", Some(body), None, "An error occurred during sign up")
            .await
    }

    pub async fn sign_in(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let body = json!({"email": req.email.trim(), "password": req.password});
        self.call(Method::POST, "sign-in/email", Some(body), None, "Something went wrong")
            .await
    }

    pub async fn sign_out(&self, cookie: Option<&str>) -> Result<AuthResponse, ApiError> {
        self.call(Method::POST, "sign-out", Some(json!({})), cookie, "Failed to sign out")
            .await
    }

    pub async fn get_session(&self, cookie: Option<&str>) -> Result<AuthResponse, ApiError> {
        self.call(Method::GET, "get-session", None, cookie, "Failed to load session")
            .await
    }

    pub async fn verify_email(&self, token: &str) -> Result<AuthResponse, ApiError> {
        self.call(
            Method::POST,
            "verify-email",
            Some(json!({"token": token})),
            None,
            "Failed to verify email",
        )
        .await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<AuthResponse, ApiError> {
        let redirect_to = app_link(&self.app_url, RESET_PASSWORD_PATH, &[])?;
        self.call(
            Method::POST,
            "request-password-reset",
            Some(json!({"email": email, "redirectTo": redirect_to})),
            None,
            "Failed to send reset email",
        )
        .await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.call(
            Method::POST,
            "reset-password",
            Some(json!({"token": token, "newPassword": password})),
            None,
            "Failed to reset password",
        )
        .await
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }
}
