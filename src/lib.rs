//! Shamir's Secret Sharing over GF(256)
//!
//! Splits a secret byte sequence into N share sets such that any K of them
//! reconstruct it exactly while fewer than K reveal nothing. The field uses
//! the AES reducing polynomial x⁸ + x⁴ + x³ + x + 1; shares only interoperate
//! with implementations using the same polynomial.
//!
//! Beyond plain split/reconstruct the crate exposes the underlying
//! primitives: field arithmetic, the entropy-pool CSPRNG, polynomial
//! generation, MAC-authenticated shares, redundancy verification, progressive
//! collection and batch reconstruction.
//!
//! Persisting or transmitting shares is left to the caller; every share type
//! derives `serde` traits.
//!
//! # Quick Start
//!
//! ```
//! // 5 share sets, any 3 reconstruct
//! let share_sets = shamir_gf256::split(b"my secret data", 3, 5).unwrap();
//!
//! let reconstructed = shamir_gf256::reconstruct(&share_sets[1..4]).unwrap();
//! assert_eq!(reconstructed, b"my secret data");
//! ```

mod auth;
mod config;
mod error;
pub mod finite_field;
pub mod polynomial;
mod progressive;
mod random;
mod reconstruct;
mod shamir;
mod share;

pub use auth::{AuthenticatedShare, MAC_SIZE, ShareAuthenticator};
pub use config::{Config, DEFAULT_POOL_SIZE, EvaluationPoints, SplitMode};
pub use error::{Result, ShamirError};
pub use finite_field::{FIELD_SIZE, FiniteField, IRREDUCIBLE_POLYNOMIAL};
pub use polynomial::{Polynomial, PolynomialGenerator};
pub use progressive::ProgressiveReconstructor;
pub use random::SecureRandom;
pub use reconstruct::{SecretReconstructor, VerificationResult};
pub use shamir::{ShamirShare, ShamirShareBuilder};
pub use share::{Share, ShareSet, ShareSetId, ShareSetMetadata};

// Re-export common types for convenience
pub mod prelude {
    pub use super::{
        Config, EvaluationPoints, FiniteField, ProgressiveReconstructor, Result,
        SecretReconstructor, SecureRandom, ShamirError, ShamirShare, Share, ShareSet,
        SplitMode,
    };
}

/// Splits `secret` into `total_shares` share sets, any `threshold` of which
/// reconstruct it
pub fn split(secret: &[u8], threshold: u8, total_shares: u8) -> Result<Vec<ShareSet>> {
    ShamirShare::new(total_shares, threshold)?.split(secret)
}

/// Reconstructs a secret from share sets produced by one [`split`]
pub fn reconstruct(share_sets: &[ShareSet]) -> Result<Vec<u8>> {
    ShamirShare::reconstruct(share_sets)
}
