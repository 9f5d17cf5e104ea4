//! Random polynomial generation for share creation
//!
//! Every secret byte gets its own polynomial of degree `threshold - 1` whose
//! constant term is the byte. Coefficients come from [`SecureRandom`], the
//! leading one is forced non-zero so the degree is exact.

use std::fmt;

use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore};
use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, ShamirError};
use crate::finite_field::{self, FIELD_SIZE, FiniteField};
use crate::random::SecureRandom;

/// Largest number of evaluation points: every non-zero field element
pub const MAX_EVALUATION_POINTS: usize = FIELD_SIZE - 1;

/// A polynomial `c0 + c1·x + … + cd·x^d` over GF(256)
///
/// Coefficients are zeroized on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Polynomial {
    coefficients: Vec<FiniteField>,
}

impl Polynomial {
    /// Builds a polynomial from caller-chosen coefficients
    ///
    /// Fails if the list is empty or a non-constant polynomial has a zero
    /// leading coefficient.
    pub fn from_coefficients(coefficients: Vec<FiniteField>) -> Result<Self> {
        let polynomial = Self { coefficients };
        polynomial.validate()?;
        Ok(polynomial)
    }

    pub fn coefficients(&self) -> &[FiniteField] {
        &self.coefficients
    }

    /// The constant term
    pub fn secret(&self) -> FiniteField {
        self.coefficients[0]
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Number of points needed to recover the constant term
    pub fn threshold(&self) -> usize {
        self.coefficients.len()
    }

    pub fn evaluate(&self, x: FiniteField) -> FiniteField {
        finite_field::evaluate_polynomial(&self.coefficients, x)
    }

    fn validate(&self) -> Result<()> {
        match self.coefficients.last() {
            None => Err(ShamirError::InvalidArgument(
                "polynomial needs at least one coefficient".into(),
            )),
            Some(leading) if self.coefficients.len() > 1 && leading.is_zero() => Err(
                ShamirError::InvalidArgument("leading coefficient must be non-zero".into()),
            ),
            Some(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Polynomial")
            .field("degree", &self.degree())
            .finish_non_exhaustive()
    }
}

/// Generates the random polynomials and evaluation points of a split
///
/// # Example
/// ```
/// use shamir_gf256::{FiniteField, PolynomialGenerator};
///
/// let mut generator = PolynomialGenerator::new().unwrap();
/// let polynomial = generator.generate_polynomial(FiniteField::new(5), 4).unwrap();
/// assert_eq!(polynomial.coefficients().len(), 4);
/// assert_eq!(polynomial.secret(), FiniteField::new(5));
/// assert!(!polynomial.coefficients()[3].is_zero());
/// ```
#[derive(Debug)]
pub struct PolynomialGenerator<R: RngCore + CryptoRng = ChaCha20Rng> {
    rng: SecureRandom<R>,
}

impl PolynomialGenerator<ChaCha20Rng> {
    /// Creates a generator backed by an OS-seeded [`SecureRandom`]
    pub fn new() -> Result<Self> {
        Ok(Self::with_rng(SecureRandom::new()?))
    }
}

impl<R: RngCore + CryptoRng> PolynomialGenerator<R> {
    pub fn with_rng(rng: SecureRandom<R>) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut SecureRandom<R> {
        &mut self.rng
    }

    /// Random polynomial of degree `threshold - 1` with constant term `secret`
    pub fn generate_polynomial(
        &mut self,
        secret: FiniteField,
        threshold: usize,
    ) -> Result<Polynomial> {
        self.generate_polynomial_in_field(i64::from(secret.0), threshold, FIELD_SIZE)
    }

    /// Like [`generate_polynomial`](Self::generate_polynomial) for untrusted
    /// inputs and an explicit field-size bound
    ///
    /// # Errors
    /// - [`ShamirError::InvalidThreshold`] if `threshold < 2`
    /// - [`ShamirError::InvalidArgument`] if `field_size` is 0 or above 256
    /// - [`ShamirError::ThresholdExceedsField`] if `threshold > field_size`
    /// - [`ShamirError::InvalidSecret`] if `secret` is not a field element
    pub fn generate_polynomial_in_field(
        &mut self,
        secret: i64,
        threshold: usize,
        field_size: usize,
    ) -> Result<Polynomial> {
        if threshold < 2 {
            return Err(ShamirError::InvalidThreshold(threshold));
        }
        if field_size == 0 || field_size > FIELD_SIZE {
            return Err(ShamirError::InvalidArgument(format!(
                "field size must be in 1..={FIELD_SIZE}, got {field_size}"
            )));
        }
        if threshold > field_size {
            return Err(ShamirError::ThresholdExceedsField {
                threshold,
                field_size,
            });
        }
        if !(0..field_size as i64).contains(&secret) {
            return Err(ShamirError::InvalidSecret(secret));
        }

        let degree = threshold - 1;
        let mut coefficients = Vec::with_capacity(threshold);
        coefficients.push(FiniteField::new(secret as u8));
        for _ in 1..degree {
            coefficients.push(self.rng.next_gf256_element());
        }
        coefficients.push(self.rng.next_non_zero_gf256_element());

        Ok(Polynomial { coefficients })
    }

    /// One independent polynomial per secret element
    pub fn generate_multiple_polynomials(
        &mut self,
        secrets: &[FiniteField],
        threshold: usize,
    ) -> Result<Vec<Polynomial>> {
        let polynomials = secrets
            .iter()
            .map(|&secret| self.generate_polynomial(secret, threshold))
            .collect::<Result<Vec<_>>>()?;
        trace!(count = polynomials.len(), threshold, "generated polynomials");
        Ok(polynomials)
    }

    /// One independent polynomial per byte of `secret`
    pub fn generate_for_bytes(
        &mut self,
        secret: &[u8],
        threshold: usize,
    ) -> Result<Vec<Polynomial>> {
        let elements: Zeroizing<Vec<FiniteField>> =
            Zeroizing::new(secret.iter().copied().map(FiniteField::new).collect());
        self.generate_multiple_polynomials(&elements, threshold)
    }

    /// `n` distinct random non-zero x-coordinates, sorted ascending
    ///
    /// Fails with [`ShamirError::InvalidArgument`] unless `1 <= n <= 255`.
    pub fn generate_evaluation_points(&mut self, n: usize) -> Result<Vec<FiniteField>> {
        check_point_count(n)?;
        let points = self
            .rng
            .unique_integers(n, MAX_EVALUATION_POINTS as u32)?
            .into_iter()
            .map(|v| FiniteField::new(v as u8 + 1))
            .collect();
        Ok(points)
    }

    pub fn evaluate_polynomial(&self, polynomial: &Polynomial, x: FiniteField) -> FiniteField {
        polynomial.evaluate(x)
    }
}

/// The fixed x-coordinates 1, 2, ..., n
pub fn sequential_evaluation_points(n: usize) -> Result<Vec<FiniteField>> {
    check_point_count(n)?;
    Ok((1..=n as u8).map(FiniteField::new).collect())
}

fn check_point_count(n: usize) -> Result<()> {
    if n == 0 || n > MAX_EVALUATION_POINTS {
        return Err(ShamirError::InvalidArgument(format!(
            "evaluation point count must be in 1..={MAX_EVALUATION_POINTS}, got {n}"
        )));
    }
    Ok(())
}

/// Checks raw coefficients: all in range, non-zero leading term unless constant
pub fn validate_polynomial(coefficients: &[i64]) -> Result<()> {
    let elements = coefficients
        .iter()
        .map(|&c| FiniteField::try_from(c))
        .collect::<Result<Vec<_>>>()?;
    Polynomial { coefficients: elements }.validate()
}

/// Index of the highest non-zero coefficient; 0 for a constant or empty list
pub fn polynomial_degree(coefficients: &[FiniteField]) -> usize {
    coefficients
        .iter()
        .rposition(|c| !c.is_zero())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> PolynomialGenerator {
        PolynomialGenerator::with_rng(SecureRandom::from_seed([3u8; 32]))
    }

    #[test]
    fn test_degree_invariant() {
        let mut generator = generator();
        for _ in 0..1000 {
            let polynomial = generator
                .generate_polynomial(FiniteField::new(5), 4)
                .unwrap();
            let coefficients = polynomial.coefficients();
            assert_eq!(coefficients.len(), 4);
            assert_eq!(coefficients[0], FiniteField::new(5));
            assert!(!coefficients[3].is_zero());
            assert_eq!(polynomial_degree(coefficients), 3);
        }
    }

    #[test]
    fn test_threshold_two_has_single_random_coefficient() {
        let mut generator = generator();
        let polynomial = generator
            .generate_polynomial(FiniteField::new(200), 2)
            .unwrap();
        assert_eq!(polynomial.degree(), 1);
        assert!(!polynomial.coefficients()[1].is_zero());
        assert_eq!(polynomial.evaluate(FiniteField::ZERO), FiniteField::new(200));
    }

    #[test]
    fn test_generation_errors() {
        let mut generator = generator();
        assert_eq!(
            generator.generate_polynomial(FiniteField::new(1), 1),
            Err(ShamirError::InvalidThreshold(1))
        );
        assert_eq!(
            generator.generate_polynomial(FiniteField::new(1), 257),
            Err(ShamirError::ThresholdExceedsField {
                threshold: 257,
                field_size: 256
            })
        );
        assert_eq!(
            generator.generate_polynomial_in_field(256, 3, FIELD_SIZE),
            Err(ShamirError::InvalidSecret(256))
        );
        assert_eq!(
            generator.generate_polynomial_in_field(-1, 3, FIELD_SIZE),
            Err(ShamirError::InvalidSecret(-1))
        );
        assert!(generator.generate_polynomial_in_field(1, 3, 300).is_err());
    }

    #[test]
    fn test_polynomials_per_byte_are_independent() {
        let mut generator = generator();
        let polynomials = generator.generate_for_bytes(&[9, 9, 9], 4).unwrap();
        assert_eq!(polynomials.len(), 3);
        for polynomial in &polynomials {
            assert_eq!(polynomial.secret(), FiniteField::new(9));
        }
        assert_ne!(polynomials[0], polynomials[1]);
        assert_ne!(polynomials[1], polynomials[2]);
    }

    #[test]
    fn test_random_evaluation_points() {
        let mut generator = generator();
        let points = generator.generate_evaluation_points(10).unwrap();
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| !p.is_zero()));
        assert!(points.windows(2).all(|w| w[0] < w[1]));

        let all = generator.generate_evaluation_points(255).unwrap();
        assert_eq!(all, (1..=255u8).map(FiniteField::new).collect::<Vec<_>>());

        assert!(generator.generate_evaluation_points(0).is_err());
        assert!(generator.generate_evaluation_points(256).is_err());
    }

    #[test]
    fn test_sequential_evaluation_points() {
        let points = sequential_evaluation_points(3).unwrap();
        assert_eq!(
            points,
            vec![FiniteField::new(1), FiniteField::new(2), FiniteField::new(3)]
        );
        assert!(sequential_evaluation_points(0).is_err());
        assert!(sequential_evaluation_points(256).is_err());
    }

    #[test]
    fn test_validate_polynomial() {
        assert!(validate_polynomial(&[5]).is_ok());
        assert!(validate_polynomial(&[0]).is_ok());
        assert!(validate_polynomial(&[5, 3, 1]).is_ok());
        assert!(matches!(
            validate_polynomial(&[5, 3, 0]),
            Err(ShamirError::InvalidArgument(_))
        ));
        assert_eq!(
            validate_polynomial(&[5, 300]),
            Err(ShamirError::InvalidElement(300))
        );
        assert!(validate_polynomial(&[]).is_err());
        assert!(Polynomial::from_coefficients(vec![FiniteField::new(1), FiniteField::ZERO]).is_err());
    }

    #[test]
    fn test_polynomial_degree_ignores_trailing_zeros() {
        let coefficients = [FiniteField::new(4), FiniteField::new(2), FiniteField::ZERO];
        assert_eq!(polynomial_degree(&coefficients), 1);
        assert_eq!(polynomial_degree(&[]), 0);
        assert_eq!(polynomial_degree(&[FiniteField::ZERO]), 0);
    }

    #[test]
    fn test_debug_hides_coefficients() {
        let polynomial =
            Polynomial::from_coefficients(vec![FiniteField::new(0xAB), FiniteField::new(1)])
                .unwrap();
        let rendered = format!("{polynomial:?}");
        assert!(!rendered.contains("171"));
        assert!(rendered.contains("degree"));
    }
}
