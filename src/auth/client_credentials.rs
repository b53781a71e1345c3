//! Authorize using the client credentials flow.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;

use super::token::{self, Token};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("server: {0}")]
    Server(#[from] ServerError),
    #[error("form encoding: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

/// The token endpoint answered with a non-success status.
#[derive(Debug, thiserror::Error)]
#[error("{status_code} status code")]
pub struct ServerError {
    pub status_code: u16,
}

fn check_status(res: &reqwest::Response) -> Result<(), ServerError> {
    let status = res.status();
    if !status.is_success() {
        return Err(ServerError {
            status_code: status.as_u16(),
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct ClientCredentials {
    pub client: reqwest::Client,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    /// Perform the client credentials flow.
    pub async fn perform(&self) -> Result<AuthResponse, Error> {
        let params = &[
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let params = serde_urlencoded::to_string(params)?;

        let req = self
            .client
            .post(self.token_url.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(params)
            .build()?;

        let res = self.client.execute(req).await?;
        check_status(&res)?;
        let auth_response = res.json().await?;
        Ok(auth_response)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// The requested access token.
    pub access_token: String,
    /// How long the access token stays valid, in seconds.
    pub expires_in: u64,
}

impl AuthResponse {
    pub fn into_token(self, now: i64) -> Token {
        let AuthResponse {
            access_token,
            expires_in,
        } = self;
        Token::expires_in(access_token, Duration::from_secs(expires_in), now)
    }
}

impl From<AuthResponse> for Token {
    fn from(auth: AuthResponse) -> Self {
        auth.into_token(token::now())
    }
}

#[async_trait::async_trait]
impl super::TokenProvider for ClientCredentials {
    type Error = Error;

    async fn get_auth_token(&self) -> Result<Token, Self::Error> {
        let auth_response = self.perform().await?;
        debug!(
            message = "Token endpoint issued a token",
            expires_in = auth_response.expires_in,
        );
        Ok(auth_response.into())
    }
}
