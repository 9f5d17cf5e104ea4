use std::fmt;

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, ShamirError};
use crate::finite_field::FiniteField;
use crate::random::SecureRandom;

/// One point `(x, y)` on a secret byte's polynomial
///
/// `x = 0` is the secret's own point and never a valid share.
///
/// # Example
/// ```
/// use shamir_gf256::Share;
///
/// assert!(Share::new(3, 17).is_valid());
/// assert!(!Share::new(0, 17).is_valid());
/// assert!(Share::from_raw(1, 256).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Zeroize)]
pub struct Share {
    /// Evaluation point (x-coordinate)
    pub x: u8,
    /// Polynomial value at `x`
    pub y: u8,
}

impl Share {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Builds a share from untrusted integers
    ///
    /// Fails with [`ShamirError::InvalidShare`] if either coordinate is outside
    /// [0, 255] or `x` is zero.
    pub fn from_raw(x: i64, y: i64) -> Result<Self> {
        let (Ok(x), Ok(y)) = (u8::try_from(x), u8::try_from(y)) else {
            return Err(ShamirError::InvalidShare(format!(
                "coordinates ({x}, {y}) outside the field"
            )));
        };
        let share = Self { x, y };
        share.validate()?;
        Ok(share)
    }

    pub fn is_valid(&self) -> bool {
        self.x != 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ShamirError::InvalidShare(
                "x-coordinate 0 is reserved for the secret".into(),
            ))
        }
    }

    pub fn x_element(&self) -> FiniteField {
        FiniteField::new(self.x)
    }

    pub fn y_element(&self) -> FiniteField {
        FiniteField::new(self.y)
    }
}

/// Identifier shared by every [`ShareSet`] of one split
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Zeroize)]
pub struct ShareSetId(pub [u8; 16]);

impl ShareSetId {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut SecureRandom<R>) -> Result<Self> {
        let bytes = rng.next_bytes(16)?;
        let mut id = [0u8; 16];
        id.copy_from_slice(&bytes);
        Ok(Self(id))
    }
}

impl fmt::Display for ShareSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ShareSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShareSetId({self})")
    }
}

/// Metadata every share set of one split must agree on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSetMetadata {
    pub id: ShareSetId,
    pub threshold: u8,
    pub total_shares: u8,
    pub secret_length: usize,
}

/// One participant's shares of a multi-byte secret
///
/// Holds one [`Share`] per secret byte, all at the same x-coordinate, plus the
/// metadata needed to combine it with the other participants' sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ShareSet {
    /// Correlates share sets produced by the same split
    pub id: ShareSetId,
    /// 1-based participant index, if assigned
    pub index: Option<u8>,
    /// Minimum number of share sets required for reconstruction
    pub threshold: u8,
    /// Total number of share sets created
    pub total_shares: u8,
    /// Length of the secret in bytes
    pub secret_length: usize,
    /// Share for each byte position, in order
    pub shares: Vec<Share>,
}

impl ShareSet {
    /// x-coordinate shared by all shares in the set
    pub fn x(&self) -> Option<u8> {
        self.shares.first().map(|share| share.x)
    }

    pub fn metadata(&self) -> ShareSetMetadata {
        ShareSetMetadata {
            id: self.id,
            threshold: self.threshold,
            total_shares: self.total_shares,
            secret_length: self.secret_length,
        }
    }

    /// Checks the set is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.secret_length == 0 || self.shares.len() != self.secret_length {
            return Err(ShamirError::InvalidShare(format!(
                "share set holds {} shares for a secret of {} bytes",
                self.shares.len(),
                self.secret_length
            )));
        }
        if self.threshold < 2 || self.threshold > self.total_shares {
            return Err(ShamirError::InvalidShare(format!(
                "threshold {} invalid for {} total shares",
                self.threshold, self.total_shares
            )));
        }
        if let Some(index) = self.index {
            if index == 0 || index > self.total_shares {
                return Err(ShamirError::InvalidShare(format!(
                    "index {index} outside 1..={}",
                    self.total_shares
                )));
            }
        }
        let x = self.shares[0].x;
        for share in &self.shares {
            share.validate()?;
            if share.x != x {
                return Err(ShamirError::InvalidShare(
                    "shares within a set must use one x-coordinate".into(),
                ));
            }
        }
        Ok(())
    }
}
