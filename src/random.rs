//! Cryptographically secure randomness with a mixing entropy pool
//!
//! [`SecureRandom`] wraps a CSPRNG (ChaCha20 seeded from the operating system
//! by default) and XORs every output byte with a byte from an internal pool
//! that is re-mixed on each draw. Output stays uniform as long as the
//! underlying generator is; the pool hardens against a weak one.
//!
//! `secure_clear` zeroes the pool and cursor only. It cannot scrub the state
//! of the wrapped generator or of the operating system source.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use rand::Rng;
use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

use crate::config::{DEFAULT_POOL_SIZE, MAX_POOL_SIZE};
use crate::error::{Result, ShamirError};
use crate::finite_field::FiniteField;

static GLOBAL: Lazy<Result<Mutex<SecureRandom>>> =
    Lazy::new(|| SecureRandom::new().map(Mutex::new));

/// CSPRNG with an entropy pool that is consumed and refreshed on every draw
///
/// Not internally synchronized; share one instance across threads through
/// [`SecureRandom::global`] or your own lock.
///
/// # Example
/// ```
/// use shamir_gf256::SecureRandom;
///
/// let mut rng = SecureRandom::new().unwrap();
/// let die = rng.next_int(6).unwrap();
/// assert!(die < 6);
/// assert!(!rng.next_non_zero_gf256_element().is_zero());
/// ```
pub struct SecureRandom<R: RngCore + CryptoRng = ChaCha20Rng> {
    rng: R,
    pool: Zeroizing<Vec<u8>>,
    cursor: usize,
    initialized: bool,
}

impl SecureRandom<ChaCha20Rng> {
    /// Creates a generator seeded from the operating system
    pub fn new() -> Result<Self> {
        Self::with_pool_size(DEFAULT_POOL_SIZE)
    }

    /// Creates an OS-seeded generator with a custom entropy pool size
    pub fn with_pool_size(pool_size: usize) -> Result<Self> {
        let rng = ChaCha20Rng::try_from_rng(&mut OsRng)
            .map_err(|e| ShamirError::RandomSource(e.to_string()))?;
        Self::from_rng(rng, pool_size)
    }

    /// Creates a deterministic generator for reproducible tests
    ///
    /// Never use a fixed seed to produce real shares.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let mut random = Self {
            rng: ChaCha20Rng::from_seed(seed),
            pool: Zeroizing::new(vec![0u8; DEFAULT_POOL_SIZE]),
            cursor: 0,
            initialized: false,
        };
        random.reseed();
        random
    }

    /// Process-wide instance, created on first use
    ///
    /// # Example
    /// ```
    /// use shamir_gf256::SecureRandom;
    ///
    /// let byte = SecureRandom::with_global(|rng| Ok(rng.next_byte())).unwrap();
    /// # let _ = byte;
    /// ```
    pub fn global() -> Result<&'static Mutex<SecureRandom>> {
        match &*GLOBAL {
            Ok(global) => Ok(global),
            Err(e) => Err(e.clone()),
        }
    }

    /// Runs `f` with exclusive access to the process-wide instance
    pub fn with_global<T>(f: impl FnOnce(&mut SecureRandom) -> Result<T>) -> Result<T> {
        let mut guard: MutexGuard<'_, SecureRandom> =
            Self::global()?.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<R: RngCore + CryptoRng> SecureRandom<R> {
    /// Wraps an arbitrary CSPRNG
    pub fn from_rng(rng: R, pool_size: usize) -> Result<Self> {
        if pool_size == 0 || pool_size > MAX_POOL_SIZE {
            return Err(ShamirError::InvalidArgument(format!(
                "entropy pool size must be in 1..={MAX_POOL_SIZE}, got {pool_size}"
            )));
        }
        let mut random = Self {
            rng,
            pool: Zeroizing::new(vec![0u8; pool_size]),
            cursor: 0,
            initialized: false,
        };
        random.reseed();
        Ok(random)
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Refills the pool from fresh generator output and resets the cursor
    pub fn reseed(&mut self) {
        self.rng.fill_bytes(&mut self.pool);
        self.cursor = 0;
        self.initialized = true;
        debug!(pool_size = self.pool.len(), "entropy pool reseeded");
    }

    /// Zeroes the pool and cursor
    ///
    /// Best effort only: the wrapped generator keeps its own state. The pool
    /// is refilled lazily on the next draw.
    pub fn secure_clear(&mut self) {
        self.pool.as_mut_slice().zeroize();
        self.cursor = 0;
        self.initialized = false;
        debug!("entropy pool cleared");
    }

    fn fresh_byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        self.rng.fill_bytes(&mut byte);
        byte[0]
    }

    /// Rotates the pool, chains each byte with its neighbour and a running
    /// carry, then folds a fresh generator byte in at the cursor.
    fn mix_pool(&mut self) {
        if !self.initialized {
            self.reseed();
        }
        let fresh = self.fresh_byte();
        let len = self.pool.len();
        self.pool.rotate_left(1);
        let mut carry = 0u8;
        for i in 0..len {
            let neighbour = self.pool[(i + 1) % len];
            self.pool[i] ^= neighbour.rotate_left(3) ^ carry;
            carry = self.pool[i];
        }
        self.pool[self.cursor] ^= fresh;
        self.cursor = (self.cursor + 1) % len;
    }

    /// One uniformly distributed byte
    pub fn next_byte(&mut self) -> u8 {
        let output = self.fresh_byte();
        self.mix_pool();
        output ^ self.pool[self.cursor]
    }

    /// `n` random bytes; fails with [`ShamirError::InvalidArgument`] for `n == 0`
    pub fn next_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        if n == 0 {
            return Err(ShamirError::InvalidArgument(
                "byte count must be positive".into(),
            ));
        }
        Ok((0..n).map(|_| self.next_byte()).collect())
    }

    /// Uniform integer in `0..max`
    ///
    /// Bounds up to 256 use rejection sampling on single bytes so there is no
    /// modulo bias; larger bounds delegate to the generator after one pool mix.
    pub fn next_int(&mut self, max: u32) -> Result<u32> {
        if max == 0 {
            return Err(ShamirError::InvalidArgument(
                "upper bound must be positive".into(),
            ));
        }
        if max <= 256 {
            let limit = 256 - (256 % max);
            loop {
                let byte = u32::from(self.next_byte());
                if byte < limit {
                    return Ok(byte % max);
                }
            }
        }
        self.mix_pool();
        Ok(self.rng.random_range(0..max))
    }

    pub fn next_u32(&mut self) -> u32 {
        u32::from_be_bytes([
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
        ])
    }

    pub fn next_bool(&mut self) -> bool {
        self.next_byte() & 1 == 1
    }

    /// Uniform `f64` in `[0, 1)` built from 53 random bits
    pub fn next_f64(&mut self) -> Result<f64> {
        let bytes = self.next_big_integer(53)?;
        let bits = bytes
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        Ok(bits as f64 / (1u64 << 53) as f64)
    }

    /// Big-endian magnitude of a random integer with at most `bit_length` bits
    ///
    /// Draws ⌈bit_length / 8⌉ bytes and masks the excess high bits of the
    /// leading byte.
    pub fn next_big_integer(&mut self, bit_length: usize) -> Result<Vec<u8>> {
        if bit_length == 0 {
            return Err(ShamirError::InvalidArgument(
                "bit length must be positive".into(),
            ));
        }
        let mut bytes = self.next_bytes(bit_length.div_ceil(8))?;
        let excess = bytes.len() * 8 - bit_length;
        bytes[0] &= 0xFF >> excess;
        Ok(bytes)
    }

    pub fn next_gf256_element(&mut self) -> FiniteField {
        FiniteField::new(self.next_byte())
    }

    /// Resamples until the element is non-zero
    pub fn next_non_zero_gf256_element(&mut self) -> FiniteField {
        loop {
            let element = self.next_gf256_element();
            if !element.is_zero() {
                return element;
            }
        }
    }

    /// `count` distinct integers from `0..max`, sorted ascending
    pub fn unique_integers(&mut self, count: usize, max: u32) -> Result<Vec<u32>> {
        if count > max as usize {
            return Err(ShamirError::InvalidArgument(format!(
                "cannot draw {count} distinct values below {max}"
            )));
        }
        let mut values = BTreeSet::new();
        while values.len() < count {
            values.insert(self.next_int(max)?);
        }
        trace!(count, max, "drew unique integers");
        Ok(values.into_iter().collect())
    }

    /// In-place Fisher–Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) -> Result<()> {
        for i in (1..items.len()).rev() {
            let bound = u32::try_from(i + 1).map_err(|_| {
                ShamirError::InvalidArgument("slice too long to shuffle".into())
            })?;
            let j = self.next_int(bound)? as usize;
            items.swap(i, j);
        }
        Ok(())
    }
}

impl<R: RngCore + CryptoRng> fmt::Debug for SecureRandom<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureRandom")
            .field("pool_size", &self.pool.len())
            .field("cursor", &self.cursor)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
