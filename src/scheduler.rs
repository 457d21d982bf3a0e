/// Password-seeded channel scheduler using a linear congruential generator
/// Produces a reproducible, collision-free order of (pixel, channel) slots

use crate::error::{Result, StegoError};

/// Bits in the length header that precedes every payload
pub const HEADER_BITS: usize = 32;
/// Color channels per pixel that may carry a bit (R, G, B; alpha is never used)
pub const CHANNELS_PER_PIXEL: usize = 3;

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

/// A single embedding slot: one color channel of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Pixel index in row-major order, `y * width + x`
    pub pixel: usize,
    /// 0 = R, 1 = G, 2 = B
    pub channel: usize,
}

impl Position {
    fn from_slot(slot: usize) -> Self {
        Self {
            pixel: slot / CHANNELS_PER_PIXEL,
            channel: slot % CHANNELS_PER_PIXEL,
        }
    }

    /// Byte offset of this slot inside an RGBA buffer
    pub fn rgba_offset(&self) -> usize {
        self.pixel * 4 + self.channel
    }
}

/// Linear congruential generator
/// state(n+1) = state(n) * 1664525 + 1013904223 (mod 2^32)
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Create a generator seeded from a password string
    pub fn new(seed: &str) -> Self {
        Self {
            state: seed_from_str(seed),
        }
    }

    /// Advance and return the raw 32-bit state
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Draw an integer in [0, max), i.e. floor(state / 2^32 * max) in exact integer math
    pub fn next_below(&mut self, max: u64) -> u64 {
        (u64::from(self.next_u32()) * max) >> 32
    }
}

/// Fold a string into a 32-bit seed: h = h * 31 + c over UTF-16 code units
pub fn seed_from_str(seed: &str) -> u32 {
    seed.encode_utf16()
        .fold(0u32, |h, c| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(u32::from(c)))
}

/// Total number of bit slots a carrier offers
pub fn capacity_bits(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height) * CHANNELS_PER_PIXEL as u64
}

/// Generate the slot order for a header plus `required_bytes` of payload
///
/// Returns `32 + required_bytes * 8` unique positions. The sequence for a
/// smaller byte count is always a prefix of the sequence for a larger one
/// under the same seed, so the header can be located before the payload size
/// is known.
pub fn generate_positions(
    width: u32,
    height: u32,
    required_bytes: usize,
    seed: &str,
) -> Result<Vec<Position>> {
    let required_bits = (required_bytes as u64)
        .checked_mul(8)
        .and_then(|bits| bits.checked_add(HEADER_BITS as u64))
        .ok_or(StegoError::CapacityExceeded {
            required_bits: u64::MAX,
            available_bits: capacity_bits(width, height),
        })?;
    generate_slots(width, height, required_bits, seed)
}

/// Number of addressable slots, if the whole carrier can be scheduled
///
/// Scaling a 32-bit draw only reaches every slot while slots <= 2^32, and the
/// `used` bitmap must be indexable on the target.
fn slot_count(available_bits: u64) -> Option<usize> {
    if available_bits > (1u64 << 32) {
        return None;
    }
    usize::try_from(available_bits).ok()
}

/// Generate exactly `required_bits` unique positions
pub fn generate_slots(
    width: u32,
    height: u32,
    required_bits: u64,
    seed: &str,
) -> Result<Vec<Position>> {
    let available_bits = capacity_bits(width, height);
    let slots = match slot_count(available_bits) {
        Some(slots) if required_bits <= available_bits => slots,
        _ => {
            return Err(StegoError::CapacityExceeded {
                required_bits,
                available_bits,
            })
        }
    };

    let count = required_bits as usize;
    let mut positions = Vec::with_capacity(count);
    let mut used = vec![false; slots];
    let mut rng = Lcg::new(seed);

    // The LCG has full period, so every slot is eventually drawn and this terminates
    while positions.len() < count {
        let slot = rng.next_below(available_bits) as usize;
        if !used[slot] {
            used[slot] = true;
            positions.push(Position::from_slot(slot));
        }
    }

    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lcg_sequence() {
        let mut rng = Lcg { state: 0 };
        assert_eq!(rng.next_u32(), 1_013_904_223);
        assert_eq!(rng.next_u32(), 1_196_435_762);
    }

    #[test]
    fn test_seed_from_str() {
        assert_eq!(seed_from_str(""), 0);
        assert_eq!(seed_from_str("a"), 97);
        assert_eq!(seed_from_str("ab"), 97 * 31 + 98);
        // Wraps at 32 bits instead of overflowing
        let long = "x".repeat(1000);
        let _ = seed_from_str(&long);
    }

    #[test]
    fn test_next_below_range() {
        let mut rng = Lcg::new("range");
        for _ in 0..10_000 {
            assert!(rng.next_below(7) < 7);
        }
        let mut rng = Lcg::new("range");
        for _ in 0..100 {
            assert_eq!(rng.next_below(1), 0);
        }
    }

    #[test]
    fn test_position_generation() {
        let positions = generate_positions(64, 64, 100, "Str0ngPass!").unwrap();
        assert_eq!(positions.len(), HEADER_BITS + 800);

        let unique: HashSet<_> = positions.iter().collect();
        assert_eq!(unique.len(), positions.len());
        for p in &positions {
            assert!(p.pixel < 64 * 64);
            assert!(p.channel < 3);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = generate_positions(32, 16, 20, "password1").unwrap();
        let b = generate_positions(32, 16, 20, "password1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_password_sensitivity() {
        let a = generate_positions(64, 64, 20, "password1").unwrap();
        let b = generate_positions(64, 64, 20, "password2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_prefix_stability() {
        let header = generate_positions(64, 64, 4, "Str0ngPass!").unwrap();
        let full = generate_positions(64, 64, 500, "Str0ngPass!").unwrap();
        assert_eq!(header.len(), HEADER_BITS + 32);
        assert_eq!(&full[..header.len()], &header[..]);
    }

    #[test]
    fn test_capacity_boundary() {
        // 8x4 carrier = 96 slots = 32 header bits + 8 bytes
        let exact = generate_positions(8, 4, 8, "pw").unwrap();
        assert_eq!(exact.len(), 96);
        let unique: HashSet<_> = exact.iter().collect();
        assert_eq!(unique.len(), 96);

        assert!(matches!(
            generate_positions(8, 4, 9, "pw"),
            Err(StegoError::CapacityExceeded { required_bits: 104, available_bits: 96 })
        ));

        assert_eq!(generate_slots(8, 4, 96, "pw").unwrap().len(), 96);
        assert!(matches!(
            generate_slots(8, 4, 97, "pw"),
            Err(StegoError::CapacityExceeded { required_bits: 97, available_bits: 96 })
        ));
    }

    #[test]
    fn test_zero_area_carrier() {
        assert!(matches!(
            generate_positions(0, 10, 0, "pw"),
            Err(StegoError::CapacityExceeded { available_bits: 0, .. })
        ));
        assert!(generate_slots(0, 10, 0, "pw").unwrap().is_empty());
    }

    #[test]
    fn test_slot_count_limits() {
        assert_eq!(slot_count(0), Some(0));
        assert_eq!(slot_count(96), Some(96));
        assert_eq!(slot_count((1u64 << 32) + 1), None);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(slot_count(1u64 << 32), None);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(slot_count(1u64 << 32), Some(1usize << 32));

        // 65536x65536 carrier = 3 * 2^32 slots, refused before any allocation
        assert!(matches!(
            generate_slots(65536, 65536, 32, "pw"),
            Err(StegoError::CapacityExceeded { required_bits: 32, available_bits }) if available_bits == 3 << 32
        ));
    }

    #[test]
    fn test_rgba_offset() {
        let p = Position { pixel: 10, channel: 2 };
        assert_eq!(p.rgba_offset(), 42);
        assert_eq!(Position::from_slot(31), Position { pixel: 10, channel: 1 });
    }
}
