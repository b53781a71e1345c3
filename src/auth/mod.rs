//! Authorization logic.

pub mod client_credentials;
pub mod fixed;
pub mod token;

use std::sync::Arc;

pub use self::token::{RawToken, Token};

/// Source of fresh access tokens, usually an OAuth2 token endpoint.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    type Error: Send + Sync;

    async fn get_auth_token(&self) -> Result<Token, Self::Error>;
}

#[async_trait::async_trait]
impl<Provider> TokenProvider for Arc<Provider>
where
    Provider: TokenProvider,
{
    type Error = Provider::Error;

    async fn get_auth_token(&self) -> Result<Token, Self::Error> {
        self.as_ref().get_auth_token().await
    }
}
