// src/services/account.rs
use std::rc::Rc;

use log::{info, warn};
use reqwest::Method;
use serde_json::json;

use crate::errors::{AccountError, SubmissionError};
use crate::models::*;
use crate::services::token_store::TokenStore;
use crate::services::transport::{
    ApiRequest, ApiResponse, RequestBody, Transport, interpret, interpret_empty,
};

const MIN_PASSWORD_LEN: usize = 6;

/// Sign-in state and the account endpoints that depend on it.
///
/// Any authorized call answered with 401 drops the stored token and reports
/// [`AccountError::LoginRequired`], which hosts turn into a redirect to the login flow.
pub struct AccountClient {
    transport: Rc<dyn Transport>,
    tokens: Rc<dyn TokenStore>,
}

impl AccountClient {
    pub fn new(transport: Rc<dyn Transport>, tokens: Rc<dyn TokenStore>) -> Self {
        Self { transport, tokens }
    }

    pub fn is_signed_in(&self) -> bool {
        self.tokens.load().is_some()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AccountError> {
        let request = ApiRequest::new(
            Method::POST,
            "/token",
            RequestBody::Form(vec![
                ("username".to_string(), username.to_string()),
                ("password".to_string(), password.to_string()),
            ]),
        );

        let response = self.send(request).await?;
        let token: TokenResponse =
            interpret(&response, "Login failed. Please check your credentials.")
                .map_err(rejected)?;

        self.tokens.save(&token.access_token)?;
        info!("Signed in as {}", username);
        Ok(token)
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<TokenResponse, AccountError> {
        if !form.accepted_terms {
            return Err(AccountError::InvalidInput(
                "Please agree to Terms of Service and Privacy Policy.".to_string(),
            ));
        }
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::InvalidInput(
                "Password must be at least 6 characters long.".to_string(),
            ));
        }

        let request = ApiRequest::new(
            Method::POST,
            "/register",
            RequestBody::Json(json!({
                "username": form.username,
                "password": form.password,
            })),
        );

        let response = self.send(request).await?;
        let token: TokenResponse =
            interpret(&response, "Registration failed. Please try again.").map_err(rejected)?;

        self.tokens.save(&token.access_token)?;
        info!("Registered {}", form.username);
        Ok(token)
    }

    pub async fn save_result(&self, result: &SaveResultRequest) -> Result<(), AccountError> {
        let body = serde_json::to_value(result)
            .map_err(|e| AccountError::InvalidInput(format!("Unserializable result: {}", e)))?;
        let request = ApiRequest::new(Method::POST, "/save-result", RequestBody::Json(body));

        let response = self.authorized(request).await?;
        interpret_empty(&response, "Failed to save result").map_err(rejected)
    }

    /// Any refusal here means the token is no longer good.
    pub async fn profile(&self) -> Result<UserProfile, AccountError> {
        let request = ApiRequest::new(Method::GET, "/users/me", RequestBody::Empty);
        let response = self.authorized(request).await?;

        if !response.is_success() {
            self.expire()?;
            return Err(AccountError::LoginRequired);
        }
        interpret(&response, "Failed to load user profile").map_err(rejected)
    }

    pub async fn saved_results(&self) -> Result<Vec<SavedResult>, AccountError> {
        let request = ApiRequest::new(Method::GET, "/saved-results", RequestBody::Empty);
        let response = self.authorized(request).await?;
        interpret(&response, "Failed to load saved results").map_err(rejected)
    }

    pub async fn delete_saved_result(&self, id: &str) -> Result<(), AccountError> {
        // The id becomes a path segment of an authorized request.
        let well_formed = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !well_formed {
            warn!("Refusing to delete saved result with id {:?}", id);
            return Err(AccountError::InvalidInput(format!("Invalid result id: {}", id)));
        }

        let request = ApiRequest::new(
            Method::DELETE,
            format!("/saved-results/{}", id),
            RequestBody::Empty,
        );
        let response = self.authorized(request).await?;
        interpret_empty(&response, "Failed to delete result").map_err(rejected)
    }

    pub async fn update_username(&self, username: &str) -> Result<(), AccountError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AccountError::InvalidInput(
                "Username cannot be empty".to_string(),
            ));
        }

        let request = ApiRequest::new(
            Method::PUT,
            "/users/update",
            RequestBody::Json(json!({ "username": username })),
        );
        let response = self.authorized(request).await?;
        interpret_empty(&response, "Failed to update username").map_err(rejected)
    }

    pub fn logout(&self) -> Result<(), AccountError> {
        info!("Signing out");
        self.tokens.clear()
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AccountError> {
        self.transport.send(request).await.map_err(rejected)
    }

    async fn authorized(&self, request: ApiRequest) -> Result<ApiResponse, AccountError> {
        let token = self.tokens.load().ok_or(AccountError::LoginRequired)?;
        let response = self.send(request.with_bearer(token)).await?;

        if response.status == 401 {
            self.expire()?;
            return Err(AccountError::LoginRequired);
        }
        Ok(response)
    }

    fn expire(&self) -> Result<(), AccountError> {
        warn!("Access token refused, signing out");
        self.tokens.clear()
    }
}

fn rejected(e: SubmissionError) -> AccountError {
    match e {
        SubmissionError::ServerRejected { message, .. } => AccountError::Rejected(message),
        SubmissionError::ConnectivityFailure { cause } => {
            warn!("Account request failed: {}", cause);
            AccountError::Connectivity
        }
    }
}
