//! Incremental reconstruction as shares trickle in
//!
//! Unlike the rest of the crate this holds mutable state between calls and
//! does no locking of its own; wrap it in a mutex to share across threads.

use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, ShamirError};
use crate::polynomial::MAX_EVALUATION_POINTS;
use crate::reconstruct::SecretReconstructor;
use crate::share::Share;

/// Accumulates shares until the threshold is met, then locks in the secret
///
/// # Example
/// ```
/// use shamir_gf256::{ProgressiveReconstructor, Share};
///
/// // Points on f(x) = 7 + x
/// let mut progressive = ProgressiveReconstructor::new(2).unwrap();
/// assert!(progressive.add_share(Share::new(1, 6)).unwrap());
/// assert!(!progressive.add_share(Share::new(1, 6)).unwrap());
/// assert_eq!(progressive.progress(), 0.5);
///
/// progressive.add_share(Share::new(2, 5)).unwrap();
/// assert!(progressive.is_complete());
/// assert_eq!(progressive.secret(), Some(7));
/// ```
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct ProgressiveReconstructor {
    threshold: usize,
    shares: Vec<Share>,
    secret: Option<u8>,
}

impl ProgressiveReconstructor {
    /// Fails with [`ShamirError::InvalidThreshold`] unless `2 <= threshold <= 255`
    pub fn new(threshold: usize) -> Result<Self> {
        if !(2..=MAX_EVALUATION_POINTS).contains(&threshold) {
            return Err(ShamirError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            shares: Vec::with_capacity(threshold),
            secret: None,
        })
    }

    /// Adds a share, reconstructing once `threshold` distinct shares are held
    ///
    /// Returns `Ok(false)` without changing anything if a share with the same
    /// x-coordinate is already held.
    pub fn add_share(&mut self, share: Share) -> Result<bool> {
        share.validate()?;
        if self.shares.iter().any(|held| held.x == share.x) {
            debug!(x = share.x, "ignoring repeated share");
            return Ok(false);
        }
        self.shares.push(share);

        if self.shares.len() >= self.threshold && self.secret.is_none() {
            match SecretReconstructor::reconstruct_secret(&self.shares[..self.threshold]) {
                Ok(secret) => {
                    self.secret = Some(secret);
                    debug!(threshold = self.threshold, "progressive reconstruction complete");
                }
                Err(e) => warn!(error = %e, "progressive reconstruction attempt failed"),
            }
        }
        Ok(true)
    }

    pub fn is_complete(&self) -> bool {
        self.secret.is_some()
    }

    /// The recovered byte once complete
    pub fn secret(&self) -> Option<u8> {
        self.secret
    }

    /// Fraction of the threshold collected, capped at 1.0
    pub fn progress(&self) -> f64 {
        (self.shares.len() as f64 / self.threshold as f64).min(1.0)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn accumulated(&self) -> usize {
        self.shares.len()
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// Drops all accumulated shares and any recovered secret
    pub fn reset(&mut self) {
        self.shares.zeroize();
        self.secret.zeroize();
    }
}
