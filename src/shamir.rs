use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore};
use rayon::prelude::*;
use tracing::debug;

use crate::auth::{AuthenticatedShare, ShareAuthenticator};
use crate::config::{Config, EvaluationPoints, SplitMode};
use crate::error::{Result, ShamirError};
use crate::finite_field::FiniteField;
use crate::polynomial::{Polynomial, PolynomialGenerator, sequential_evaluation_points};
use crate::random::SecureRandom;
use crate::reconstruct::SecretReconstructor;
use crate::share::{Share, ShareSet, ShareSetId};

/// A (threshold, total_shares) Shamir scheme over GF(256)
///
/// Splitting composes the primitives of [`PolynomialGenerator`]: one
/// evaluation point per participant, one independent polynomial per secret
/// byte, every polynomial evaluated at every point, grouped into one
/// [`ShareSet`] per participant.
///
/// # Example
/// ```
/// use shamir_gf256::ShamirShare;
///
/// // Create a scheme with 5 total shares and threshold of 3
/// let mut scheme = ShamirShare::builder(5, 3).build().unwrap();
///
/// let secret = b"my secret data";
/// let share_sets = scheme.split(secret).unwrap();
///
/// // Any 3 share sets reconstruct the secret
/// let reconstructed = ShamirShare::reconstruct(&share_sets[2..5]).unwrap();
/// assert_eq!(reconstructed, secret);
/// ```
#[derive(Debug)]
pub struct ShamirShare<R: RngCore + CryptoRng = ChaCha20Rng> {
    /// Total number of share sets to generate
    total_shares: u8,
    /// Minimum number of share sets needed for reconstruction
    threshold: u8,
    config: Config,
    generator: PolynomialGenerator<R>,
}

/// Builder for [`ShamirShare`]
///
/// # Example
/// ```
/// use shamir_gf256::{Config, EvaluationPoints, ShamirShare, SplitMode};
///
/// let config = Config::new()
///     .with_mode(SplitMode::Parallel)
///     .with_evaluation_points(EvaluationPoints::Sequential);
///
/// let shamir = ShamirShare::builder(5, 3)
///     .with_config(config)
///     .build()
///     .unwrap();
/// assert_eq!(shamir.threshold(), 3);
/// ```
#[derive(Debug)]
pub struct ShamirShareBuilder {
    total_shares: u8,
    threshold: u8,
    config: Config,
}

impl ShamirShareBuilder {
    /// # Arguments
    /// * `total_shares` - Number of share sets to create (2-255)
    /// * `threshold` - Share sets required for reconstruction (2-total_shares)
    pub fn new(total_shares: u8, threshold: u8) -> Self {
        Self {
            total_shares,
            threshold,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Builds a scheme backed by an OS-seeded [`SecureRandom`]
    ///
    /// # Errors
    /// Returns `ShamirError` if:
    /// - `total_shares` is below 2
    /// - `threshold` is below 2
    /// - `threshold` > `total_shares`
    /// - Configuration validation fails
    pub fn build(self) -> Result<ShamirShare> {
        self.validate()?;
        let rng = SecureRandom::with_pool_size(self.config.pool_size)?;
        Ok(self.assemble(rng))
    }

    /// Builds a scheme around a caller-supplied generator, e.g. a seeded one in tests
    pub fn build_with_rng<R: RngCore + CryptoRng>(
        self,
        rng: SecureRandom<R>,
    ) -> Result<ShamirShare<R>> {
        self.validate()?;
        Ok(self.assemble(rng))
    }

    fn validate(&self) -> Result<()> {
        if self.total_shares < 2 {
            return Err(ShamirError::InvalidShareCount(self.total_shares.into()));
        }
        if self.threshold < 2 {
            return Err(ShamirError::InvalidThreshold(self.threshold.into()));
        }
        if self.threshold > self.total_shares {
            return Err(ShamirError::ThresholdTooLarge {
                threshold: self.threshold.into(),
                total_shares: self.total_shares.into(),
            });
        }
        self.config.validate()
    }

    fn assemble<R: RngCore + CryptoRng>(self, rng: SecureRandom<R>) -> ShamirShare<R> {
        ShamirShare {
            total_shares: self.total_shares,
            threshold: self.threshold,
            config: self.config,
            generator: PolynomialGenerator::with_rng(rng),
        }
    }
}

impl ShamirShare {
    /// Scheme with default configuration
    pub fn new(total_shares: u8, threshold: u8) -> Result<Self> {
        Self::builder(total_shares, threshold).build()
    }

    pub fn builder(total_shares: u8, threshold: u8) -> ShamirShareBuilder {
        ShamirShareBuilder::new(total_shares, threshold)
    }

    /// Reconstructs a secret from share sets with the default reconstructor
    pub fn reconstruct(share_sets: &[ShareSet]) -> Result<Vec<u8>> {
        SecretReconstructor::new().reconstruct_from_share_sets(share_sets)
    }
}

impl<R: RngCore + CryptoRng> ShamirShare<R> {
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn total_shares(&self) -> u8 {
        self.total_shares
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reconstructor matching this scheme's processing mode
    pub fn reconstructor(&self) -> SecretReconstructor {
        SecretReconstructor::with_config(&self.config)
    }

    fn evaluation_points(&mut self) -> Result<Vec<FiniteField>> {
        let n = self.total_shares as usize;
        match self.config.evaluation_points {
            EvaluationPoints::Random => self.generator.generate_evaluation_points(n),
            EvaluationPoints::Sequential => sequential_evaluation_points(n),
        }
    }

    /// Splits a secret into `total_shares` share sets
    ///
    /// Fails with [`ShamirError::InvalidArgument`] for an empty secret.
    pub fn split(&mut self, secret: &[u8]) -> Result<Vec<ShareSet>> {
        if secret.is_empty() {
            return Err(ShamirError::InvalidArgument("secret cannot be empty".into()));
        }

        let points = self.evaluation_points()?;
        let polynomials = self
            .generator
            .generate_for_bytes(secret, self.threshold as usize)?;
        let id = ShareSetId::random(self.generator.rng_mut())?;

        debug!(
            %id,
            threshold = self.threshold,
            total_shares = self.total_shares,
            secret_length = secret.len(),
            "splitting secret"
        );

        let (threshold, total_shares) = (self.threshold, self.total_shares);
        let build = |(i, &x): (usize, &FiniteField)| ShareSet {
            id,
            index: Some(i as u8 + 1),
            threshold,
            total_shares,
            secret_length: secret.len(),
            shares: evaluate_all(&polynomials, x),
        };

        let share_sets: Vec<ShareSet> = match self.config.mode {
            SplitMode::Sequential => points.iter().enumerate().map(build).collect(),
            SplitMode::Parallel => points.par_iter().enumerate().map(build).collect(),
        };
        Ok(share_sets)
    }

    /// Splits a single byte into `total_shares` shares
    pub fn split_byte(&mut self, secret: u8) -> Result<Vec<Share>> {
        let points = self.evaluation_points()?;
        let polynomial = self
            .generator
            .generate_polynomial(FiniteField::new(secret), self.threshold as usize)?;
        Ok(points
            .into_iter()
            .map(|x| Share::new(x.0, polynomial.evaluate(x).0))
            .collect())
    }

    /// Splits a single byte into MAC-tagged shares
    pub fn split_authenticated(
        &mut self,
        secret: u8,
        authenticator: &ShareAuthenticator,
    ) -> Result<Vec<AuthenticatedShare>> {
        self.split_byte(secret)?
            .into_iter()
            .map(|share| authenticator.sign(share, self.threshold, self.total_shares))
            .collect()
    }
}

/// The share of every byte position at one evaluation point
fn evaluate_all(polynomials: &[Polynomial], x: FiniteField) -> Vec<Share> {
    polynomials
        .iter()
        .map(|polynomial| Share::new(x.0, polynomial.evaluate(x).0))
        .collect()
}
