//! Secret recovery by Lagrange interpolation at x = 0
//!
//! Every entry point here is a pure function of its inputs. The only
//! accumulating reconstructor lives in [`crate::progressive`].

use rayon::prelude::*;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::auth::{AuthenticatedShare, ShareAuthenticator};
use crate::config::{Config, SplitMode};
use crate::error::{Result, ShamirError};
use crate::finite_field::{self, FiniteField};
use crate::share::{Share, ShareSet};

/// Outcome of [`SecretReconstructor::reconstruct_with_verification`]
///
/// Agreement between overlapping windows is a consistency signal only. A bad
/// share cannot be located or corrected, and corruption that happens to stay
/// consistent across every window goes unnoticed. Use
/// [`ShareAuthenticator`] where shares may be forged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Secret from the first `threshold` shares, present only on success
    pub secret: Option<u8>,
    /// Description of the disagreement, present only on failure
    pub error: Option<String>,
    /// Alternate windows reconstructed successfully
    pub windows_checked: usize,
    /// Alternate windows whose reconstruction failed and was ignored
    pub windows_skipped: usize,
    /// Start offsets of alternate windows that disagreed with the primary result
    pub disagreeing_windows: Vec<usize>,
}

impl VerificationResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Recovers secrets from shares
///
/// # Example
/// ```
/// use shamir_gf256::{SecretReconstructor, ShamirShare};
///
/// let mut scheme = ShamirShare::builder(5, 3).build().unwrap();
/// let share_sets = scheme.split(b"data").unwrap();
///
/// let reconstructor = SecretReconstructor::new();
/// let secret = reconstructor.reconstruct_from_share_sets(&share_sets[1..4]).unwrap();
/// assert_eq!(secret, b"data");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretReconstructor {
    mode: SplitMode,
}

impl SecretReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &Config) -> Self {
        Self { mode: config.mode }
    }

    pub fn with_mode(mode: SplitMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    /// Recovers one secret byte from two or more shares
    ///
    /// Order is irrelevant and any number of points on the same polynomial
    /// at or above its threshold yields the same byte.
    ///
    /// # Errors
    /// - [`ShamirError::EmptyShares`] for an empty slice
    /// - [`ShamirError::InvalidShare`] if a share has `x = 0`
    /// - [`ShamirError::DuplicateXCoordinate`] if two shares share an x
    pub fn reconstruct_secret(shares: &[Share]) -> Result<u8> {
        if shares.is_empty() {
            return Err(ShamirError::EmptyShares);
        }
        for share in shares {
            share.validate()?;
        }
        let xs: Vec<FiniteField> = shares.iter().map(Share::x_element).collect();
        let ys: Zeroizing<Vec<FiniteField>> =
            Zeroizing::new(shares.iter().map(Share::y_element).collect());
        finite_field::lagrange_interpolate(&xs, &ys).map(u8::from)
    }

    /// [`reconstruct_secret`](Self::reconstruct_secret) after checking that at
    /// least `threshold` shares were supplied
    pub fn reconstruct_with_threshold(shares: &[Share], threshold: usize) -> Result<u8> {
        if threshold < 2 {
            return Err(ShamirError::InvalidThreshold(threshold));
        }
        if shares.len() < threshold {
            return Err(ShamirError::InsufficientShares {
                needed: threshold,
                got: shares.len(),
            });
        }
        Self::reconstruct_secret(shares)
    }

    /// Recovers one byte from MAC-tagged shares
    ///
    /// Every share must carry the same `(threshold, total_shares)` and pass
    /// authentication; a failing share aborts the call rather than being
    /// dropped. The first `threshold` shares are used.
    pub fn reconstruct_from_secure_shares(
        shares: &[AuthenticatedShare],
        authenticator: &ShareAuthenticator,
    ) -> Result<u8> {
        let first = shares.first().ok_or(ShamirError::EmptyShares)?;
        let (threshold, total_shares) = (first.threshold, first.total_shares);
        if threshold < 2 || threshold > total_shares {
            return Err(ShamirError::InvalidShare(format!(
                "threshold {threshold} invalid for {total_shares} total shares"
            )));
        }

        for tagged in shares {
            if (tagged.threshold, tagged.total_shares) != (threshold, total_shares) {
                return Err(ShamirError::InconsistentMetadata(format!(
                    "share at x={} declares ({}, {}), expected ({threshold}, {total_shares})",
                    tagged.share.x, tagged.threshold, tagged.total_shares
                )));
            }
            authenticator.verify(tagged)?;
        }

        let threshold = threshold as usize;
        if shares.len() < threshold {
            return Err(ShamirError::InsufficientShares {
                needed: threshold,
                got: shares.len(),
            });
        }

        let selected: Vec<Share> = shares[..threshold].iter().map(|t| t.share).collect();
        debug!(threshold, supplied = shares.len(), "reconstructing from authenticated shares");
        Self::reconstruct_secret(&selected)
    }

    /// Recovers a multi-byte secret from participants' share sets
    ///
    /// All sets must carry identical metadata. The first `threshold` sets are
    /// used and each byte position is interpolated independently.
    ///
    /// # Errors
    /// - [`ShamirError::EmptyShares`] for an empty slice
    /// - [`ShamirError::InconsistentMetadata`] if sets come from different splits
    /// - [`ShamirError::InvalidShare`] if a set is malformed
    /// - [`ShamirError::InsufficientShareSets`] if fewer than `threshold` sets
    /// - [`ShamirError::DuplicateXCoordinate`] if two sets share an x
    pub fn reconstruct_from_share_sets(&self, share_sets: &[ShareSet]) -> Result<Vec<u8>> {
        let first = share_sets.first().ok_or(ShamirError::EmptyShares)?;
        let metadata = first.metadata();

        for set in share_sets {
            if set.metadata() != metadata {
                return Err(ShamirError::InconsistentMetadata(format!(
                    "share set {} does not match share set {}",
                    set.id, metadata.id
                )));
            }
            set.validate()?;
        }

        let threshold = metadata.threshold as usize;
        if share_sets.len() < threshold {
            return Err(ShamirError::InsufficientShareSets {
                needed: threshold,
                got: share_sets.len(),
            });
        }

        let selected = &share_sets[..threshold];
        let xs: Vec<FiniteField> = selected
            .iter()
            .map(|set| FiniteField::new(set.shares[0].x))
            .collect();
        let coefficients = lagrange_coefficients(&xs)?;

        debug!(
            id = %metadata.id,
            threshold,
            secret_length = metadata.secret_length,
            mode = ?self.mode,
            "reconstructing secret from share sets"
        );

        let interpolate = |position: usize| -> u8 {
            selected
                .iter()
                .zip(&coefficients)
                .fold(FiniteField::ZERO, |acc, (set, &coeff)| {
                    acc + coeff * set.shares[position].y_element()
                })
                .into()
        };

        let secret: Vec<u8> = match self.mode {
            SplitMode::Sequential => (0..metadata.secret_length).map(interpolate).collect(),
            SplitMode::Parallel => (0..metadata.secret_length)
                .into_par_iter()
                .map(interpolate)
                .collect(),
        };
        Ok(secret)
    }

    /// Cross-checks a reconstruction using redundant shares
    ///
    /// Reconstructs from the first `threshold` shares, then from every other
    /// contiguous window of `threshold` shares. Windows that fail to
    /// reconstruct are skipped but counted and logged. Any successful window
    /// that disagrees with the primary result makes the outcome a failure.
    ///
    /// A failing primary reconstruction is returned as an error.
    ///
    /// This detects inconsistency but cannot tell which share is bad, and a
    /// corruption that happens to stay consistent across windows goes
    /// unnoticed. Use [`Self::reconstruct_from_secure_shares`] when shares may
    /// be adversarial.
    pub fn reconstruct_with_verification(
        shares: &[Share],
        threshold: usize,
    ) -> Result<VerificationResult> {
        if threshold < 2 {
            return Err(ShamirError::InvalidThreshold(threshold));
        }
        if shares.len() < threshold {
            return Err(ShamirError::InsufficientShares {
                needed: threshold,
                got: shares.len(),
            });
        }
        let primary = Self::reconstruct_secret(&shares[..threshold])?;

        let mut windows_checked = 0;
        let mut windows_skipped = 0;
        let mut disagreeing_windows = Vec::new();

        for start in 1..=shares.len() - threshold {
            match Self::reconstruct_secret(&shares[start..start + threshold]) {
                Ok(value) if value == primary => windows_checked += 1,
                Ok(_) => {
                    windows_checked += 1;
                    disagreeing_windows.push(start);
                    warn!(
                        start,
                        threshold,
                        "verification window disagrees with primary reconstruction"
                    );
                }
                Err(e) => {
                    windows_skipped += 1;
                    warn!(start, threshold, error = %e, "skipping verification window");
                }
            }
        }

        debug!(windows_checked, windows_skipped, "verification scan finished");

        if disagreeing_windows.is_empty() {
            Ok(VerificationResult {
                secret: Some(primary),
                error: None,
                windows_checked,
                windows_skipped,
                disagreeing_windows,
            })
        } else {
            let error = format!(
                "{} of {} verification windows disagree (starting at {:?}); \
                 shares are corrupted or inconsistent",
                disagreeing_windows.len(),
                windows_checked,
                disagreeing_windows
            );
            Ok(VerificationResult {
                secret: None,
                error: Some(error),
                windows_checked,
                windows_skipped,
                disagreeing_windows,
            })
        }
    }

    /// Reconstructs several independent secret bytes, one per share group
    ///
    /// Fails with the error of the first failing group in input order, in
    /// either mode.
    pub fn reconstruct_multiple<S>(&self, groups: &[S], threshold: usize) -> Result<Vec<u8>>
    where
        S: AsRef<[Share]> + Sync,
    {
        debug!(groups = groups.len(), threshold, mode = ?self.mode, "batch reconstruction");
        match self.mode {
            SplitMode::Sequential => groups
                .iter()
                .map(|group| Self::reconstruct_with_threshold(group.as_ref(), threshold))
                .collect(),
            SplitMode::Parallel => groups
                .par_iter()
                .map(|group| Self::reconstruct_with_threshold(group.as_ref(), threshold))
                .collect::<Vec<_>>()
                .into_iter()
                .collect(),
        }
    }
}

/// Lagrange basis values at x = 0: λᵢ = Π_{j≠i} xⱼ / (xⱼ - xᵢ)
fn lagrange_coefficients(xs: &[FiniteField]) -> Result<Vec<FiniteField>> {
    finite_field::check_distinct(xs)?;
    xs.iter()
        .enumerate()
        .map(|(i, &x_i)| {
            xs.iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .try_fold(FiniteField::ONE, |acc, (_, &x_j)| {
                    x_j.divide(x_j - x_i).map(|quotient| acc * quotient)
                })
        })
        .collect()
}
