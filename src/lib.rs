//! # pixelveil
//!
//! Password-keyed LSB steganography for lossless images.
//!
//! A UTF-8 message is encrypted with AES-256-GCM under a PBKDF2-SHA256 key,
//! framed together with its nonce, salt and a SHA-256 integrity hash, and
//! written one bit per R/G/B channel into slots chosen by a password-seeded
//! generator. Nothing but the password is needed to find and open it again.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pixelveil::StegoEngine;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cover = std::fs::read("cover.png")?;
//! let engine = StegoEngine::new();
//!
//! let stego_png = engine.embed_image(&cover, "meet at noon", "Str0ngPass!")?;
//! std::fs::write("stego.png", &stego_png)?;
//!
//! let extracted = engine.extract_image(&stego_png, "Str0ngPass!")?;
//! assert_eq!(extracted.message, "meet at noon");
//! assert!(extracted.verified);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `crypto`: key derivation, AES-256-GCM and the integrity hash behind [`CryptoProvider`]
//! - `scheduler`: deterministic, collision-free slot order from the password
//! - `payload`: envelope framing and MSB-first bit conversion
//! - `carrier`: RGBA pixel buffer and PNG/image-file adapters
//! - `steganography`: the embed/extract engine

pub mod carrier;
pub mod config;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod scheduler;
pub mod steganography;

// Re-export main types for convenience
pub use carrier::PixelCarrier;
pub use config::StegoConfig;
pub use crypto::{CryptoProvider, NativeCrypto};
pub use error::{Result, StegoError};
pub use payload::Envelope;
pub use scheduler::{generate_positions, Position};
pub use steganography::{max_message_len, Extraction, StegoEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Calculate the largest message, in bytes, a carrier can hold
///
/// # Examples
///
/// ```
/// let carrier = pixelveil::PixelCarrier::new(64, 64, vec![0; 64 * 64 * 4]).unwrap();
/// assert_eq!(pixelveil::calculate_capacity(&carrier), 1416);
/// ```
pub fn calculate_capacity(carrier: &PixelCarrier) -> usize {
    StegoEngine::<NativeCrypto>::calculate_capacity(carrier)
}
