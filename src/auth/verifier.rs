use crate::auth::error::AuthError;
use async_trait::async_trait;
use std::sync::Arc;

/// Verifies bearer tokens against an identity provider
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    /// Return the subject identifier the token was issued to
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

#[async_trait]
impl<T: TokenVerifier + ?Sized> TokenVerifier for Arc<T> {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        (**self).verify(token).await
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
