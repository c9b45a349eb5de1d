use crate::auth::{bearer_token, AuthError, FakeVerifier, JwtVerifier, TokenVerifier};
use crate::config::AuthConfig;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<&'a str>,
}

fn hs256_config(secret: &str, issuer: Option<&str>) -> AuthConfig {
    AuthConfig {
        algorithm: "HS256".to_string(),
        secret: Some(secret.to_string()),
        public_key_pem: None,
        issuer: issuer.map(str::to_string),
        audience: None,
    }
}

fn sign(secret: &str, sub: &str, exp: u64, iss: Option<&str>) -> String {
    encode(
        &Header::default(),
        &TestClaims { sub, exp, iss },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn in_one_hour() -> u64 {
    (chrono::Utc::now().timestamp() + 3600) as u64
}

#[test]
fn bearer_token_requires_bearer_scheme() {
    assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
    assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
    assert!(matches!(
        bearer_token(Some("Basic abc")),
        Err(AuthError::MissingToken)
    ));
    assert!(matches!(
        bearer_token(Some("Bearer ")),
        Err(AuthError::MissingToken)
    ));
}

#[tokio::test]
async fn jwt_verifier_returns_subject_for_valid_token() {
    let verifier = JwtVerifier::new(&hs256_config("s3cr3t", None)).unwrap();
    let token = sign("s3cr3t", "user-42", in_one_hour(), None);
    assert_eq!(verifier.verify(&token).await.unwrap(), "user-42");
}

#[tokio::test]
async fn jwt_verifier_rejects_wrong_signature_and_expired_tokens() {
    let verifier = JwtVerifier::new(&hs256_config("s3cr3t", None)).unwrap();

    let forged = sign("other", "user-42", in_one_hour(), None);
    assert!(matches!(
        verifier.verify(&forged).await,
        Err(AuthError::InvalidToken(_))
    ));

    let expired = sign("s3cr3t", "user-42", 1_000, None);
    assert!(matches!(
        verifier.verify(&expired).await,
        Err(AuthError::InvalidToken(_))
    ));

    assert!(verifier.verify("not-a-jwt").await.is_err());
}

#[tokio::test]
async fn jwt_verifier_checks_issuer_when_configured() {
    let verifier =
        JwtVerifier::new(&hs256_config("s3cr3t", Some("https://issuer.example"))).unwrap();

    let good = sign("s3cr3t", "u", in_one_hour(), Some("https://issuer.example"));
    assert_eq!(verifier.verify(&good).await.unwrap(), "u");

    let bad = sign("s3cr3t", "u", in_one_hour(), Some("https://elsewhere"));
    assert!(verifier.verify(&bad).await.is_err());
}

#[test]
fn jwt_verifier_requires_key_material() {
    let mut config = hs256_config("s3cr3t", None);
    config.secret = None;
    assert!(matches!(
        JwtVerifier::new(&config),
        Err(AuthError::ConfigurationError(_))
    ));

    config.algorithm = "RS256".to_string();
    assert!(matches!(
        JwtVerifier::new(&config),
        Err(AuthError::ConfigurationError(_))
    ));

    config.algorithm = "ROT13".to_string();
    assert!(JwtVerifier::new(&config).is_err());
}

#[tokio::test]
async fn fake_verifier_accepts_only_known_tokens() {
    let verifier = FakeVerifier::new();
    verifier.fake_add_token("good", "user-1");
    assert_eq!(verifier.verify("good").await.unwrap(), "user-1");
    assert!(verifier.verify("bad").await.is_err());
}
