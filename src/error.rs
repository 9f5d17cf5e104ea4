use thiserror::Error;

/// Error type for Shamir's Secret Sharing operations
///
/// Every failure is surfaced to the caller; nothing in this crate retries or
/// substitutes a default value for a failed reconstruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShamirError {
    /// Out-of-range size, count or parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Value outside the field range [0, 255]
    #[error("Invalid field element {0}")]
    InvalidElement(i64),

    /// Secret is not a valid field element
    #[error("Invalid secret value {0}")]
    InvalidSecret(i64),

    /// Threshold below the minimum of 2
    #[error("Invalid threshold value {0}")]
    InvalidThreshold(usize),

    /// Threshold larger than the number of field elements
    #[error("Threshold {threshold} exceeds field size {field_size}")]
    ThresholdExceedsField { threshold: usize, field_size: usize },

    /// Threshold exceeds total shares
    #[error("Threshold {threshold} exceeds total shares {total_shares}")]
    ThresholdTooLarge { threshold: usize, total_shares: usize },

    /// Invalid total shares count (must be 2..=255)
    #[error("Invalid share count {0}")]
    InvalidShareCount(usize),

    /// Malformed share (x = 0, value out of range, inconsistent share set)
    #[error("Invalid share: {0}")]
    InvalidShare(String),

    /// Two shares with the same x-coordinate
    #[error("Duplicate x-coordinate {0}")]
    DuplicateXCoordinate(u8),

    /// No shares supplied
    #[error("No shares provided")]
    EmptyShares,

    /// Insufficient shares for reconstruction
    #[error("Need at least {needed} shares, got {got}")]
    InsufficientShares { needed: usize, got: usize },

    /// Insufficient share sets for multi-byte reconstruction
    #[error("Need at least {needed} share sets, got {got}")]
    InsufficientShareSets { needed: usize, got: usize },

    /// Shares from different split operations were mixed
    #[error("Inconsistent share metadata: {0}")]
    InconsistentMetadata(String),

    /// A share failed its keyed-MAC check
    #[error("Share authentication failed for x-coordinate {x}")]
    ShareAuthenticationFailed { x: u8 },

    /// Division by the zero element
    #[error("Division by zero in GF(256)")]
    DivisionByZero,

    /// Empty or mismatched interpolation input
    #[error("Empty or mismatched interpolation input")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The operating system randomness source failed
    #[error("Random source error: {0}")]
    RandomSource(String),
}

impl ShamirError {
    /// Whether supplying more shares could turn this failure into a success
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientShares { .. } | Self::InsufficientShareSets { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ShamirError>;
