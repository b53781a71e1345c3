//! Provider handing out one preconfigured token.

use std::convert::Infallible;

use super::{Token, TokenProvider};

pub const PLACEHOLDER_ACCESS_TOKEN: &str = "fresh-token";
pub const PLACEHOLDER_EXPIRES_AT: i64 = 10_000_000_000;

/// Mints a copy of the same token on every refresh, standing in for a token
/// endpoint round trip that always succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTokenProvider {
    token: Token,
}

impl FixedTokenProvider {
    pub fn new(token: Token) -> Self {
        Self { token }
    }
}

impl Default for FixedTokenProvider {
    fn default() -> Self {
        Self::new(Token::new(PLACEHOLDER_ACCESS_TOKEN, PLACEHOLDER_EXPIRES_AT))
    }
}

#[async_trait::async_trait]
impl TokenProvider for FixedTokenProvider {
    type Error = Infallible;

    async fn get_auth_token(&self) -> Result<Token, Self::Error> {
        Ok(self.token.clone())
    }
}
