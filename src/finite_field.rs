//! Arithmetic in GF(2^8)
//!
//! Elements are bytes; the field is constructed with the AES reducing
//! polynomial x⁸ + x⁴ + x³ + x + 1 ([`IRREDUCIBLE_POLYNOMIAL`]). The choice of
//! polynomial is a protocol constant: shares produced with a different one do
//! not interoperate.

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{Result, ShamirError};

/// Reducing polynomial x⁸ + x⁴ + x³ + x + 1
pub const IRREDUCIBLE_POLYNOMIAL: u16 = 0x11B;

/// Number of elements in the field
pub const FIELD_SIZE: usize = 256;

/// Low byte of [`IRREDUCIBLE_POLYNOMIAL`], folded in when a shift overflows
const REDUCTION: u8 = (IRREDUCIBLE_POLYNOMIAL & 0xFF) as u8;

/// Constant-time multiplication in GF(2^8)
///
/// Russian peasant multiplication: eight fixed iterations with no
/// data-dependent branches or table lookups.
#[inline]
fn gf256_multiply_const_time(a: u8, b: u8) -> u8 {
    let mut a = a;
    let mut b = b;
    let mut p: u8 = 0;
    for _ in 0..8 {
        p ^= a & (b & 1).wrapping_neg();
        let carry = (a >> 7).wrapping_neg();
        a = (a << 1) ^ (REDUCTION & carry);
        b >>= 1;
    }
    p
}

/// Constant-time inverse via Fermat's little theorem: a⁻¹ = a²⁵⁴
#[inline]
fn gf256_inverse_const_time(a: u8) -> u8 {
    let mut result = 1u8;
    let mut base = a;
    let mut exp = 254u32;
    while exp > 0 {
        if exp & 1 == 1 {
            result = gf256_multiply_const_time(result, base);
        }
        base = gf256_multiply_const_time(base, base);
        exp >>= 1;
    }
    result
}

/// An element of GF(256)
///
/// # Example
/// ```
/// use shamir_gf256::FiniteField;
///
/// let a = FiniteField::new(0x53);
/// let b = FiniteField::new(0xCA);
/// assert_eq!(a + b, FiniteField::new(0x99));
/// assert_eq!(a * b, FiniteField::ONE);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, Zeroize,
)]
#[serde(transparent)]
pub struct FiniteField(pub u8);

impl FiniteField {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw byte
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiplication in GF(256) using a constant-time algorithm
    #[inline]
    pub fn multiply(self, other: Self) -> Self {
        Self(gf256_multiply_const_time(self.0, other.0))
    }

    /// Exponentiation by square-and-multiply
    ///
    /// # Example
    /// ```
    /// use shamir_gf256::FiniteField;
    ///
    /// let base = FiniteField::new(0x03);
    /// assert_eq!(base.exp(3), base * base * base);
    /// ```
    #[inline]
    pub fn exp(self, mut exp: u32) -> Self {
        let mut result = Self::ONE;
        let mut base = self;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.multiply(base);
            }
            base = base.multiply(base);
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse
    ///
    /// Fails with [`ShamirError::DivisionByZero`] for zero, which has no inverse.
    #[inline]
    pub fn inverse(self) -> Result<Self> {
        if self.is_zero() {
            Err(ShamirError::DivisionByZero)
        } else {
            Ok(Self(gf256_inverse_const_time(self.0)))
        }
    }

    /// Division `self / divisor`
    #[inline]
    pub fn divide(self, divisor: Self) -> Result<Self> {
        Ok(self.multiply(divisor.inverse()?))
    }
}

impl From<u8> for FiniteField {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<FiniteField> for u8 {
    fn from(value: FiniteField) -> Self {
        value.0
    }
}

impl TryFrom<i64> for FiniteField {
    type Error = ShamirError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| ShamirError::InvalidElement(value))
    }
}

/// Addition is XOR in characteristic 2
impl Add for FiniteField {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        #[allow(clippy::suspicious_arithmetic_impl)]
        let result = self.0 ^ other.0;
        Self(result)
    }
}

impl AddAssign for FiniteField {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Subtraction coincides with addition
impl Sub for FiniteField {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        #[allow(clippy::suspicious_arithmetic_impl)]
        let result = self + other;
        result
    }
}

impl Mul for FiniteField {
    type Output = Self;
    #[inline]
    fn mul(self, other: Self) -> Self {
        self.multiply(other)
    }
}

impl MulAssign for FiniteField {
    #[inline]
    fn mul_assign(&mut self, other: Self) {
        *self = self.multiply(other);
    }
}

#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
pub fn multiply(a: u8, b: u8) -> u8 {
    gf256_multiply_const_time(a, b)
}

/// Inverse of a non-zero element
pub fn inverse(a: u8) -> Result<u8> {
    FiniteField(a).inverse().map(u8::from)
}

/// `a / b`, failing with [`ShamirError::DivisionByZero`] when `b == 0`
pub fn divide(a: u8, b: u8) -> Result<u8> {
    FiniteField(a).divide(FiniteField(b)).map(u8::from)
}

/// Whether `value` lies in [0, 255]
#[inline]
pub fn is_valid_element(value: i64) -> bool {
    (0..FIELD_SIZE as i64).contains(&value)
}

/// Evaluates `c0 + c1·x + … + cd·x^d` with Horner's method
///
/// An empty coefficient list is the zero polynomial.
pub fn evaluate_polynomial(coefficients: &[FiniteField], x: FiniteField) -> FiniteField {
    coefficients
        .iter()
        .rev()
        .fold(FiniteField::ZERO, |acc, &c| acc * x + c)
}

/// Returns f(0) for the unique polynomial of degree `len - 1` through the points
///
/// # Errors
/// - [`ShamirError::EmptyInput`] if the inputs are empty or differ in length
/// - [`ShamirError::DuplicateXCoordinate`] if two x-coordinates are equal
///
/// # Example
/// ```
/// use shamir_gf256::finite_field::{evaluate_polynomial, lagrange_interpolate};
/// use shamir_gf256::FiniteField;
///
/// let f = [FiniteField::new(42), FiniteField::new(7), FiniteField::new(3)];
/// let xs: Vec<FiniteField> = (1..=3).map(FiniteField::new).collect();
/// let ys: Vec<FiniteField> = xs.iter().map(|&x| evaluate_polynomial(&f, x)).collect();
/// assert_eq!(lagrange_interpolate(&xs, &ys).unwrap(), FiniteField::new(42));
/// ```
pub fn lagrange_interpolate(xs: &[FiniteField], ys: &[FiniteField]) -> Result<FiniteField> {
    lagrange_interpolate_at(xs, ys, FiniteField::ZERO)
}

/// Evaluates the interpolating polynomial through the points at `at`
pub fn lagrange_interpolate_at(
    xs: &[FiniteField],
    ys: &[FiniteField],
    at: FiniteField,
) -> Result<FiniteField> {
    if xs.is_empty() || xs.len() != ys.len() {
        return Err(ShamirError::EmptyInput);
    }
    check_distinct(xs)?;

    let mut result = FiniteField::ZERO;
    for (i, (&x_i, &y_i)) in xs.iter().zip(ys).enumerate() {
        let mut basis = FiniteField::ONE;
        for (j, &x_j) in xs.iter().enumerate() {
            if i != j {
                basis *= (at - x_j).divide(x_i - x_j)?;
            }
        }
        result += basis * y_i;
    }
    Ok(result)
}

/// Fails with [`ShamirError::DuplicateXCoordinate`] on the first repeated x
pub(crate) fn check_distinct(xs: &[FiniteField]) -> Result<()> {
    let mut seen = [false; FIELD_SIZE];
    for x in xs {
        let slot = &mut seen[x.0 as usize];
        if *slot {
            return Err(ShamirError::DuplicateXCoordinate(x.0));
        }
        *slot = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Log/antilog tables generated from 0x03, independent of the multiply routine
    fn reference_tables() -> ([u8; 256], [u8; 256]) {
        let mut exp = [0u8; 256];
        let mut log = [0u8; 256];
        let mut value = 1u8;
        for (i, slot) in exp.iter_mut().enumerate().take(255) {
            *slot = value;
            log[value as usize] = i as u8;
            // value * 3 = xtime(value) ^ value
            let xtime = if value & 0x80 != 0 {
                (value << 1) ^ 0x1B
            } else {
                value << 1
            };
            value = xtime ^ value;
        }
        exp[255] = exp[0];
        (exp, log)
    }

    #[test]
    fn test_addition() {
        let a = FiniteField::new(0x53);
        let b = FiniteField::new(0xCA);
        assert_eq!((a + b).0, 0x99);
        assert_eq!(add(0x53, 0xCA), 0x99);
        assert_eq!(sub(0x53, 0xCA), 0x99);
    }

    #[test]
    fn test_known_products() {
        // FIPS-197 section 4.2
        assert_eq!(multiply(0x57, 0x83), 0xC1);
        assert_eq!(multiply(0x57, 0x13), 0xFE);
        assert_eq!(multiply(0x53, 0xCA), 0x01);
    }

    #[test]
    fn test_multiplication_matches_reference_table() {
        let (exp, log) = reference_tables();
        for a in 1..=255u8 {
            for b in 1..=255u8 {
                let index = (log[a as usize] as usize + log[b as usize] as usize) % 255;
                assert_eq!(
                    multiply(a, b),
                    exp[index],
                    "product mismatch for 0x{a:02X} * 0x{b:02X}"
                );
            }
        }
    }

    #[test]
    fn test_field_closure_laws() {
        for a in 0..=255u8 {
            let fa = FiniteField::new(a);
            assert_eq!(fa + fa, FiniteField::ZERO);
            assert_eq!(fa * FiniteField::ZERO, FiniteField::ZERO);
            assert_eq!(fa * FiniteField::ONE, fa);
        }
    }

    #[test]
    fn test_all_inverses() {
        for i in 1..=255u8 {
            let a = FiniteField::new(i);
            let inv = a.inverse().unwrap();
            assert_eq!(a * inv, FiniteField::ONE);
        }
    }

    #[test]
    fn test_specific_inverses() {
        let test_values = [(0x53, 0xCA), (0x7B, 0x06), (0xA4, 0x8F), (0xE1, 0x0D)];

        for &(a, expected_inv) in &test_values {
            assert_eq!(inverse(a).unwrap(), expected_inv, "Inverse mismatch for 0x{a:02X}");
        }
    }

    #[test]
    fn test_zero_inverse() {
        assert_eq!(FiniteField::ZERO.inverse(), Err(ShamirError::DivisionByZero));
        assert_eq!(divide(7, 0), Err(ShamirError::DivisionByZero));
    }

    #[test]
    fn test_division() {
        for a in 0..=255u8 {
            for b in 1..=255u8 {
                let q = divide(a, b).unwrap();
                assert_eq!(multiply(q, b), a);
            }
        }
    }

    #[test]
    fn test_distributivity() {
        let a = FiniteField::new(0x12);
        let b = FiniteField::new(0x34);
        let c = FiniteField::new(0x56);
        assert_eq!(a * (b + c), (a * b) + (a * c));
        assert_eq!((a * b) * c, a * (b * c));
    }

    #[test]
    fn test_element_validity() {
        assert!(is_valid_element(0));
        assert!(is_valid_element(255));
        assert!(!is_valid_element(-1));
        assert!(!is_valid_element(256));
        assert_eq!(FiniteField::try_from(200i64).unwrap(), FiniteField::new(200));
        assert_eq!(
            FiniteField::try_from(300i64),
            Err(ShamirError::InvalidElement(300))
        );
    }

    #[test]
    fn test_horner_evaluation() {
        let f = [FiniteField::new(5), FiniteField::new(0), FiniteField::new(1)];
        // 5 + 2^2 = 5 ^ 4
        assert_eq!(evaluate_polynomial(&f, FiniteField::new(2)), FiniteField::new(1));
        assert_eq!(evaluate_polynomial(&f, FiniteField::ZERO), FiniteField::new(5));
        assert_eq!(evaluate_polynomial(&[], FiniteField::new(9)), FiniteField::ZERO);
    }

    #[test]
    fn test_lagrange_recovers_intercept() {
        let f = [FiniteField::new(200), FiniteField::new(17), FiniteField::new(99)];
        let xs: Vec<FiniteField> = [3u8, 81, 250].into_iter().map(FiniteField::new).collect();
        let ys: Vec<FiniteField> = xs.iter().map(|&x| evaluate_polynomial(&f, x)).collect();

        assert_eq!(lagrange_interpolate(&xs, &ys).unwrap(), FiniteField::new(200));

        let at = FiniteField::new(42);
        assert_eq!(
            lagrange_interpolate_at(&xs, &ys, at).unwrap(),
            evaluate_polynomial(&f, at)
        );
    }

    #[test]
    fn test_lagrange_input_errors() {
        let xs = [FiniteField::new(1), FiniteField::new(1)];
        let ys = [FiniteField::new(5), FiniteField::new(6)];
        assert_eq!(
            lagrange_interpolate(&xs, &ys),
            Err(ShamirError::DuplicateXCoordinate(1))
        );
        assert_eq!(lagrange_interpolate(&[], &[]), Err(ShamirError::EmptyInput));
        assert_eq!(
            lagrange_interpolate(&xs[..1], &ys),
            Err(ShamirError::EmptyInput)
        );
    }
}
