use crate::error::{Result, ShamirError};

/// Default size of the [`SecureRandom`](crate::SecureRandom) entropy pool
pub const DEFAULT_POOL_SIZE: usize = 256;

/// Largest entropy pool accepted by [`Config::with_pool_size`]
pub const MAX_POOL_SIZE: usize = 4096;

/// Processing mode for share operations
///
/// Both modes produce identical results in identical order; `Parallel` only
/// changes how the independent per-byte and per-group work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Process data sequentially
    #[default]
    Sequential,
    /// Process independent byte positions and share groups with rayon
    Parallel,
}

/// How x-coordinates are chosen for the shares of one split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationPoints {
    /// Distinct random non-zero field elements, sorted ascending
    #[default]
    Random,
    /// Fixed x = 1, 2, ..., N
    Sequential,
}

/// Configuration options for splitting and reconstruction
#[derive(Debug, Clone)]
pub struct Config {
    /// Processing mode
    pub mode: SplitMode,
    /// Evaluation-point policy used when splitting
    pub evaluation_points: EvaluationPoints,
    /// Size of the entropy pool mixed into every random draw
    pub pool_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: SplitMode::default(),
            evaluation_points: EvaluationPoints::default(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the processing mode
    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the evaluation-point policy
    pub fn with_evaluation_points(mut self, policy: EvaluationPoints) -> Self {
        self.evaluation_points = policy;
        self
    }

    /// Sets the entropy pool size
    pub fn with_pool_size(mut self, size: usize) -> Result<Self> {
        check_pool_size(size)?;
        self.pool_size = size;
        Ok(self)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        check_pool_size(self.pool_size)
    }
}

fn check_pool_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(ShamirError::InvalidConfig(
            "Entropy pool size cannot be zero".into(),
        ));
    }
    if size > MAX_POOL_SIZE {
        return Err(ShamirError::InvalidConfig(format!(
            "Entropy pool size {size} exceeds maximum of {MAX_POOL_SIZE}"
        )));
    }
    Ok(())
}
