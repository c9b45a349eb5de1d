use crate::auth::error::AuthError;
use crate::auth::verifier::TokenVerifier;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory verifier mapping known tokens to subjects
#[derive(Clone, Default)]
pub struct FakeVerifier {
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl FakeVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as issued to `subject`
    pub fn fake_add_token(&self, token: &str, subject: &str) {
        let mut tokens = self.tokens.write().unwrap();
        tokens.insert(token.to_string(), subject.to_string());
    }
}

#[async_trait]
impl TokenVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let tokens = self.tokens.read().unwrap();
        tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}
