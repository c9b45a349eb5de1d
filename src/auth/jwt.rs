use crate::auth::error::AuthError;
use crate::auth::verifier::TokenVerifier;
use crate::config::AuthConfig;
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies signed JWTs locally with a configured key
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(&config.algorithm).map_err(|_| {
            AuthError::ConfigurationError(format!("Unsupported algorithm {}", config.algorithm))
        })?;

        let key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = config.secret.as_ref().ok_or_else(|| {
                    AuthError::ConfigurationError(format!(
                        "auth.secret is required for {:?}",
                        algorithm
                    ))
                })?;
                DecodingKey::from_secret(secret.as_bytes())
            }
            _ => {
                let pem = config.public_key_pem.as_ref().ok_or_else(|| {
                    AuthError::ConfigurationError(format!(
                        "auth.public_key_pem is required for {:?}",
                        algorithm
                    ))
                })?;
                let key = match algorithm {
                    Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes()),
                    Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes()),
                    _ => DecodingKey::from_rsa_pem(pem.as_bytes()),
                };
                key.map_err(|e| AuthError::ConfigurationError(e.to_string()))?
            }
        };

        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        info!("Bearer token verification enabled ({:?})", algorithm);
        Ok(JwtVerifier { key, validation })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("token has no subject".to_string()));
        }
        debug!("Authenticated user {}", data.claims.sub);
        Ok(data.claims.sub)
    }
}
