//! Keyed-MAC authentication of individual shares
//!
//! A share tagged with HMAC-SHA256 over its coordinates and scheme parameters
//! cannot be altered without the key. This is the defence against a
//! deliberately bad share; redundancy checks only detect accidental ones.

use std::fmt;

use hmac::{Hmac, Mac};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, ShamirError};
use crate::random::SecureRandom;
use crate::share::Share;

type HmacSha256 = Hmac<Sha256>;

pub const MAC_SIZE: usize = 32;

const MAC_DOMAIN: &[u8] = b"shamir-gf256/share-mac/v1";

/// A share together with its scheme parameters and MAC tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedShare {
    pub share: Share,
    pub threshold: u8,
    pub total_shares: u8,
    pub mac: [u8; MAC_SIZE],
}

/// Signs and verifies shares with a 32-byte secret key
///
/// # Example
/// ```
/// use shamir_gf256::{SecureRandom, Share, ShareAuthenticator};
///
/// let mut rng = SecureRandom::new().unwrap();
/// let authenticator = ShareAuthenticator::generate(&mut rng).unwrap();
/// let mut tagged = authenticator.sign(Share::new(1, 42), 2, 3).unwrap();
/// assert!(authenticator.verify(&tagged).is_ok());
///
/// tagged.share.y ^= 1;
/// assert!(authenticator.verify(&tagged).is_err());
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ShareAuthenticator {
    key: [u8; 32],
}

impl ShareAuthenticator {
    pub fn from_key(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Draws a fresh key
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut SecureRandom<R>) -> Result<Self> {
        let mut bytes = rng.next_bytes(32)?;
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self { key })
    }

    fn mac(&self, share: &Share, threshold: u8, total_shares: u8) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| ShamirError::InvalidArgument(format!("HMAC init failed: {e}")))?;
        mac.update(MAC_DOMAIN);
        mac.update(&[share.x, share.y, threshold, total_shares]);
        Ok(mac)
    }

    pub fn sign(&self, share: Share, threshold: u8, total_shares: u8) -> Result<AuthenticatedShare> {
        share.validate()?;
        let tag = self.mac(&share, threshold, total_shares)?.finalize().into_bytes();
        let mut mac = [0u8; MAC_SIZE];
        mac.copy_from_slice(&tag);
        Ok(AuthenticatedShare {
            share,
            threshold,
            total_shares,
            mac,
        })
    }

    /// Constant-time tag check
    pub fn verify(&self, tagged: &AuthenticatedShare) -> Result<()> {
        self.mac(&tagged.share, tagged.threshold, tagged.total_shares)?
            .verify_slice(&tagged.mac)
            .map_err(|_| ShamirError::ShareAuthenticationFailed { x: tagged.share.x })
    }
}

impl fmt::Debug for ShareAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShareAuthenticator { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let authenticator = ShareAuthenticator::from_key([9u8; 32]);
        let tagged = authenticator.sign(Share::new(5, 77), 3, 5).unwrap();
        assert!(authenticator.verify(&tagged).is_ok());
    }

    #[test]
    fn test_tampering_detected() {
        let authenticator = ShareAuthenticator::from_key([9u8; 32]);
        let tagged = authenticator.sign(Share::new(5, 77), 3, 5).unwrap();

        let mut altered_y = tagged;
        altered_y.share.y = 78;
        assert_eq!(
            authenticator.verify(&altered_y),
            Err(ShamirError::ShareAuthenticationFailed { x: 5 })
        );

        let mut altered_threshold = tagged;
        altered_threshold.threshold = 2;
        assert!(authenticator.verify(&altered_threshold).is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let signer = ShareAuthenticator::from_key([1u8; 32]);
        let verifier = ShareAuthenticator::from_key([2u8; 32]);
        let tagged = signer.sign(Share::new(1, 1), 2, 2).unwrap();
        assert!(verifier.verify(&tagged).is_err());
    }

    #[test]
    fn test_invalid_share_not_signed() {
        let authenticator = ShareAuthenticator::from_key([1u8; 32]);
        assert!(authenticator.sign(Share::new(0, 1), 2, 2).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let authenticator = ShareAuthenticator::from_key([0x41; 32]);
        assert_eq!(format!("{authenticator:?}"), "ShareAuthenticator { .. }");
    }
}
