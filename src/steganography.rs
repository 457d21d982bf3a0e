/// Core steganography engine: password-keyed LSB embedding of an encrypted envelope
/// Header bits go first, then the framed payload, all through one slot schedule

use crate::carrier::PixelCarrier;
use crate::crypto::{CryptoProvider, NativeCrypto, HASH_HEX_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{Result, StegoError};
use crate::payload::{bits_to_bytes, bytes_to_bits, Envelope, FRAMING_LEN};
use crate::scheduler::{self, Position, HEADER_BITS};
use rayon::prelude::*;
use tracing::{debug, warn};

// Byte count passed to the scheduler when only the length header is needed
const HEADER_PLACEHOLDER_BYTES: usize = 4;

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The recovered message
    pub message: String,
    /// Whether the recomputed SHA-256 matched the hash carried in the payload
    pub verified: bool,
}

/// Main steganography engine
///
/// Stateless apart from its crypto backend, so one engine can serve
/// concurrent calls as long as each call owns its own carrier.
pub struct StegoEngine<C: CryptoProvider = NativeCrypto> {
    crypto: C,
}

impl StegoEngine<NativeCrypto> {
    /// Create an engine backed by the native RustCrypto primitives
    pub fn new() -> Self {
        Self {
            crypto: NativeCrypto,
        }
    }

    /// Largest message (in bytes) the carrier can hold
    pub fn calculate_capacity(carrier: &PixelCarrier) -> usize {
        max_message_len(carrier.width(), carrier.height())
    }
}

impl Default for StegoEngine<NativeCrypto> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CryptoProvider> StegoEngine<C> {
    /// Create an engine with a custom crypto backend
    pub fn with_crypto(crypto: C) -> Self {
        Self { crypto }
    }

    /// Hide `message` in `carrier` under `password` and return the modified carrier
    pub fn embed(&self, mut carrier: PixelCarrier, message: &str, password: &str) -> Result<PixelCarrier> {
        let (width, height) = (carrier.width(), carrier.height());

        let envelope = self.seal(message.as_bytes(), password)?;
        let payload = envelope.to_bytes()?;
        let payload_len = u32::try_from(payload.len()).map_err(|_| StegoError::CapacityExceeded {
            required_bits: HEADER_BITS as u64 + payload.len() as u64 * 8,
            available_bits: scheduler::capacity_bits(width, height),
        })?;

        // Fails before anything is written when the carrier is too small
        let positions = scheduler::generate_positions(width, height, payload.len(), password)?;

        let mut bits = bytes_to_bits(&payload_len.to_be_bytes());
        bits.extend(bytes_to_bits(&payload));
        debug!(
            width,
            height,
            payload_bytes = payload.len(),
            bits = bits.len(),
            capacity_bits = scheduler::capacity_bits(width, height),
            "embedding payload"
        );

        write_bits(carrier.as_rgba_mut(), &positions, &bits);
        Ok(carrier)
    }

    /// Recover the message hidden in `carrier` under `password`
    pub fn extract(&self, carrier: &PixelCarrier, password: &str) -> Result<Extraction> {
        let (width, height) = (carrier.width(), carrier.height());
        let available_bits = scheduler::capacity_bits(width, height);

        // Stage A: length header
        // A carrier too small for the placeholder schedule cannot hold any payload
        let header_positions =
            scheduler::generate_positions(width, height, HEADER_PLACEHOLDER_BYTES, password)
                .map_err(|_| StegoError::MalformedPayload("carrier too small to hold a payload"))?;
        let header_bits = read_bits(carrier.as_rgba(), &header_positions[..HEADER_BITS]);
        let header = bits_to_bytes(&header_bits);
        let payload_len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;

        if payload_len < FRAMING_LEN {
            return Err(StegoError::MalformedPayload("length header below minimum payload size"));
        }
        if HEADER_BITS as u64 + payload_len as u64 * 8 > available_bits {
            return Err(StegoError::MalformedPayload("length header exceeds carrier capacity"));
        }
        debug!(width, height, payload_bytes = payload_len, "length header recovered");

        // Stage B: same seed, larger count; the first 32 slots are the header again
        let positions = scheduler::generate_positions(width, height, payload_len, password)?;
        let payload_bits = read_bits(carrier.as_rgba(), &positions[HEADER_BITS..]);
        let payload = bits_to_bytes(&payload_bits);

        let envelope = Envelope::from_bytes(&payload)?;
        self.open(&envelope, password)
    }

    /// Decode an image file, embed, and encode the result as PNG
    pub fn embed_image(&self, cover: &[u8], message: &str, password: &str) -> Result<Vec<u8>> {
        let carrier = PixelCarrier::decode(cover)?;
        self.embed(carrier, message, password)?.encode_png()
    }

    /// Decode an image file and extract the hidden message
    pub fn extract_image(&self, stego: &[u8], password: &str) -> Result<Extraction> {
        let carrier = PixelCarrier::decode(stego)?;
        self.extract(&carrier, password)
    }

    fn seal(&self, plaintext: &[u8], password: &str) -> Result<Envelope> {
        let mut nonce = [0u8; NONCE_LEN];
        let mut salt = [0u8; SALT_LEN];
        self.crypto.fill_random(&mut nonce);
        self.crypto.fill_random(&mut salt);

        let key = self.crypto.derive_key(password, &salt)?;
        let ciphertext = self.crypto.encrypt(&key, &nonce, plaintext)?;
        let integrity_hash = self.crypto.sha256_hex(plaintext).into_bytes();

        Ok(Envelope {
            ciphertext,
            nonce,
            salt,
            integrity_hash,
        })
    }

    fn open(&self, envelope: &Envelope, password: &str) -> Result<Extraction> {
        let key = self.crypto.derive_key(password, &envelope.salt)?;
        let plaintext = self.crypto.decrypt(&key, &envelope.nonce, &envelope.ciphertext)?;

        let verified =
            self.crypto.sha256_hex(&plaintext).as_bytes() == envelope.integrity_hash.as_slice();
        if !verified {
            warn!("integrity hash mismatch after successful decryption");
        }

        let message = String::from_utf8(plaintext).map_err(|_| StegoError::InvalidUtf8)?;
        Ok(Extraction { message, verified })
    }
}

/// Largest message byte count whose full framing fits in a width x height carrier
pub fn max_message_len(width: u32, height: u32) -> usize {
    let overhead = (FRAMING_LEN + TAG_LEN + HASH_HEX_LEN) as u64;
    let bytes = scheduler::capacity_bits(width, height).saturating_sub(HEADER_BITS as u64) / 8;
    bytes.saturating_sub(overhead) as usize
}

// --- helpers ---

/// Set the LSB of each scheduled channel to the matching bit
/// Upper 7 bits are preserved; alpha is never addressed by a Position
fn write_bits(rgba: &mut [u8], positions: &[Position], bits: &[u8]) {
    let cover: &[u8] = rgba;
    let updates: Vec<(usize, u8)> = positions
        .par_iter()
        .zip(bits.par_iter())
        .map(|(pos, &bit)| {
            let offset = pos.rgba_offset();
            (offset, (cover[offset] & 0xFE) | (bit & 1))
        })
        .collect();

    for (offset, value) in updates {
        rgba[offset] = value;
    }
}

fn read_bits(rgba: &[u8], positions: &[Position]) -> Vec<u8> {
    positions
        .par_iter()
        .map(|pos| rgba[pos.rgba_offset()] & 1)
        .collect()
}
