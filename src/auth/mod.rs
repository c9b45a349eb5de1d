pub mod error;
#[cfg(test)]
pub mod fake;
pub mod jwt;
pub mod verifier;

pub use error::AuthError;
#[cfg(test)]
pub use fake::FakeVerifier;
pub use jwt::JwtVerifier;
pub use verifier::{bearer_token, TokenVerifier};

#[cfg(test)]
mod tests;
