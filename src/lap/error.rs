use thiserror::Error;

/// Errors raised while turning a transport body into plain lap bytes
#[derive(Error, Debug)]
pub enum DecompressionError {
    #[error("Body is not valid gzip: {0}")]
    InvalidGzip(String),

    #[error("Decompressed body exceeds limit of {0} bytes")]
    TooLarge(u64),
}

/// Errors raised while decoding plain lap bytes into a `LapRecord`
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed lap record: {0}")]
    Malformed(#[from] prost::DecodeError),

    #[error("Lap record field '{0}' has unusable value {1:?}")]
    InvalidField(&'static str, String),
}
