//! Adjustment options and engine location.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the engine chooses the orders of differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Differencing {
    /// Search up to `(regular, seasonal)` differences.
    MaxDiff(u8, u8),
    /// Use exactly `(regular, seasonal)` differences.
    Fixed(u8, u8),
}

impl Default for Differencing {
    fn default() -> Self {
        Self::MaxDiff(2, 1)
    }
}

/// Whether the series is log-transformed before modeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTransform {
    /// Let the engine decide.
    #[default]
    Auto,
    Log,
    None,
}

impl LogTransform {
    /// Value of the engine's `transform{function=...}` argument.
    pub fn function(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Log => "log",
            Self::None => "none",
        }
    }
}

/// User-defined regression variables.
///
/// `rows` holds one row per period starting at the series start, one value
/// per name. The engine needs rows for the forecast horizon as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regressors {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Options controlling one decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentOptions {
    /// Maximum `(regular, seasonal)` ARMA orders for automatic modeling.
    pub max_order: (u8, u8),
    pub differencing: Differencing,
    pub log: LogTransform,
    /// Detect and correct outliers.
    pub outlier: bool,
    /// Test for trading-day effects.
    pub trading_days: bool,
    pub regressors: Option<Regressors>,
    /// Number of forecast periods, if any.
    pub forecast_horizon: Option<u32>,
}

impl Default for AdjustmentOptions {
    fn default() -> Self {
        Self {
            max_order: (2, 1),
            differencing: Differencing::default(),
            log: LogTransform::default(),
            outlier: true,
            trading_days: false,
            regressors: None,
            forecast_horizon: None,
        }
    }
}

/// Where the engine lives and how long it may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub binary: PathBuf,
    /// Kill the engine after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Parent of the per-run work directories; the system temp dir if unset.
    pub work_dir: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
            work_dir: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }
}
