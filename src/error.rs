use thiserror::Error;

/// Failure modes of the embed/extract pipeline.
///
/// None of the messages carry plaintext or key material.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Payload too large for carrier: need {required_bits} bits, have {available_bits}")]
    CapacityExceeded {
        required_bits: u64,
        available_bits: u64,
    },

    #[error("Image decode error: {0}")]
    ImageDecode(#[source] image::ImageError),

    #[error("Image encode error: {0}")]
    ImageEncode(#[source] image::ImageError),

    #[error("Invalid carrier: {0}")]
    InvalidCarrier(String),

    #[error("Authentication failed (wrong password or modified image)")]
    AuthenticationFailure,

    #[error("Malformed payload: {0}")]
    MalformedPayload(&'static str),

    #[error("Extracted message is not valid UTF-8")]
    InvalidUtf8,

    #[error("Crypto error: {0}")]
    Crypto(&'static str),
}

impl StegoError {
    /// True when the carrier simply does not yield a message under the given
    /// password: wrong password, tampering, or an image with no hidden payload.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            StegoError::AuthenticationFailure
                | StegoError::MalformedPayload(_)
                | StegoError::InvalidUtf8
        )
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;
