//! Length-prefixed binary framing of an encryption envelope.
//!
//! ```text
//! [u32 BE C][C bytes ciphertext][12 bytes nonce][16 bytes salt][u32 BE H][H bytes hash]
//! ```
//!
//! Plus the MSB-first bit expansion used to write the framed bytes into pixels.

use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::{Result, StegoError};
use tracing::debug;

/// Bytes of framing around the two variable-length fields: two length
/// prefixes, the nonce and the salt.
pub const FRAMING_LEN: usize = 4 + NONCE_LEN + SALT_LEN + 4;

/// Everything needed to decrypt and verify a hidden message, given the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub salt: [u8; SALT_LEN],
    /// Hex SHA-256 of the plaintext, as carried (compared byte-for-byte, never parsed)
    pub integrity_hash: Vec<u8>,
}

impl Envelope {
    /// Serialized length in bytes
    pub fn encoded_len(&self) -> usize {
        FRAMING_LEN + self.ciphertext.len() + self.integrity_hash.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let ct_len = u32::try_from(self.ciphertext.len())
            .map_err(|_| StegoError::MalformedPayload("ciphertext length exceeds u32"))?;
        let hash_len = u32::try_from(self.integrity_hash.len())
            .map_err(|_| StegoError::MalformedPayload("hash length exceeds u32"))?;

        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&ct_len.to_be_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&hash_len.to_be_bytes());
        out.extend_from_slice(&self.integrity_hash);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let ct_len = reader.read_u32()? as usize;
        let ciphertext = reader.take(ct_len, "ciphertext length exceeds buffer")?.to_vec();

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(reader.take(NONCE_LEN, "truncated nonce")?);
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(reader.take(SALT_LEN, "truncated salt")?);

        let hash_len = reader.read_u32()? as usize;
        let integrity_hash = reader.take(hash_len, "hash length exceeds buffer")?.to_vec();

        // A shortened hash field leaves bytes behind; the hash then fails to
        // verify, which is reported downstream rather than rejected here
        if reader.remaining() > 0 {
            debug!(trailing = reader.remaining(), "bytes after integrity hash ignored");
        }

        Ok(Self {
            ciphertext,
            nonce,
            salt,
            integrity_hash,
        })
    }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(StegoError::MalformedPayload(what));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4, "truncated length field")?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.buf.len()
    }
}

/// Expand bytes into bits, MSB first
pub fn bytes_to_bits(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Collapse MSB-first bits into bytes; a partial final byte is zero-padded
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        out[i / 8] |= (bit & 1) << (7 - (i % 8));
    }
    out
}
