// src/services/google.rs
//! Google OAuth sign-in: authorization URL construction and code exchange.
//!
//! The exchange yields a short-lived access token that is used once to fetch
//! the user's profile; no Google tokens are stored.

use reqwest::Client;
use serde::Deserialize;
use std::env;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::models::FederatedProfile;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    http: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl GoogleService {
    pub fn new(
        http: Client,
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: String,
    ) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    pub fn from_env(http: Client, default_redirect: &str) -> Self {
        let redirect_uri = env::var("GOOGLE_OAUTH_REDIRECT_URI")
            .unwrap_or_else(|_| default_redirect.to_string());
        Self::new(
            http,
            env::var("GOOGLE_CLIENT_ID").ok(),
            env::var("GOOGLE_CLIENT_SECRET").ok(),
            redirect_uri,
        )
    }

    fn credentials(&self) -> Result<(&str, &str), GoogleError> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(GoogleError::NotConfigured),
        }
    }

    /// Authorization URL for the browser redirect that starts the flow
    pub fn authorization_url(&self) -> Result<String, GoogleError> {
        let (client_id, _) = self.credentials()?;

        let scope = "openid email profile";
        let auth_url = format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=select_account",
            urlencoding::encode(client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(scope)
        );

        debug!("Generated Google OAuth authorization URL");
        Ok(auth_url)
    }

    /// Exchange the callback code for a profile suitable for sign-in
    pub async fn exchange_code(&self, code: &str) -> Result<FederatedProfile, GoogleError> {
        let (client_id, client_secret) = self.credentials()?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", &self.redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .http
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(http_status = %status, error = %error_text, "Token exchange failed");
            return Err(GoogleError::OAuthFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

        let user_info = self.fetch_user_info(&token.access_token).await?;

        info!(provider_id = %user_info.sub, "Google sign-in profile fetched");

        Ok(FederatedProfile {
            provider: "google",
            provider_id: user_info.sub,
            email: user_info.email,
            name: user_info.name,
            avatar: user_info.picture,
        })
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, GoogleError> {
        let response = self
            .http
            .get("https://www.googleapis.com/oauth2/v3/userinfo")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleError::RequestFailed(
                "Failed to get user info".to_string(),
            ));
        }

        response
            .json::<UserInfo>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))
    }
}
