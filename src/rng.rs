//! Tiny xorshift generator for gameplay randomness (not crypto secure).

/// Seed used when the platform cannot provide entropy.
const FALLBACK_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Debug)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn from_seed(seed: u64) -> Self {
        // xorshift gets stuck on zero
        let state = if seed == 0 { FALLBACK_SEED } else { seed };
        Self { state }
    }

    /// Seeds from `getrandom` (the browser's crypto API under wasm).
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => Self::from_seed(u64::from_le_bytes(buf)),
            Err(err) => {
                log::warn!("entropy unavailable ({err}), using fixed seed");
                Self::from_seed(FALLBACK_SEED)
            }
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Fair coin flip.
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }
}
