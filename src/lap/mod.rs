pub mod codec;
pub mod error;
pub mod fingerprint;

pub use codec::{decode, decompress, unwrap_body, BodyMode, LapRecord};
pub use error::{DecodeError, DecompressionError};
pub use fingerprint::{fingerprint, LapFingerprint};
