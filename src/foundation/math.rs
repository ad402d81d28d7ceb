#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Stable 64-bit hash of a string key (photo ids, region ids).
pub(crate) fn hash_str(s: &str) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(s.as_bytes());
    h.finish()
}

/// SplitMix64 generator. Seeded explicitly; nothing in the engine uses a global RNG.
#[derive(Clone, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        (self.next_f64_01() * len as f64) as usize % len.max(1)
    }

    /// Short lowercase base-36 token, used for random group ids.
    pub fn next_token(&mut self) -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut v = self.next_u64();
        let mut out = String::with_capacity(13);
        for _ in 0..13 {
            out.push(char::from(ALPHABET[(v % 36) as usize]));
            v /= 36;
        }
        out
    }
}

/// 32-bit linear congruential generator (Numerical Recipes constants).
///
/// Used for slot ordering, where the sequence must stay stable across reloads.
#[derive(Clone, Debug)]
pub(crate) struct Lcg32 {
    state: u32,
}

impl Lcg32 {
    pub(crate) fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        self.state
    }

    pub(crate) fn next_f64_01(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

/// Fisher-Yates shuffle driven by an [`Lcg32`] seeded from `key`.
pub(crate) fn seeded_shuffle<T>(items: &mut [T], key: &str) {
    let h = hash_str(key);
    let mut rng = Lcg32::new((h ^ (h >> 32)) as u32);
    for i in (1..items.len()).rev() {
        let j = (rng.next_f64_01() * (i + 1) as f64) as usize;
        items.swap(i, j.min(i));
    }
}
