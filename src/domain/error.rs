//! Domain error types.
//!
//! Calculations never fail: degenerate inputs resolve to a neutral value.
//! Errors are reserved for configuration and for building the inputs
//! (series, records, curves) the calculations consume.

/// Top-level error type for perfcurve.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("autocorrelation must lie strictly between -1 and 1, got {value}")]
    InvalidAutocorrelation { value: f64 },

    #[error("number of trials must be 1 until a multiple-testing adjustment exists, got {trials}")]
    UnsupportedTrials { trials: u32 },

    #[error("position is not closed; provide a final index for open positions")]
    OpenPosition,

    #[error("bar series must contain at least one bar")]
    EmptySeries,

    #[error("bar {index} ends before the bar preceding it")]
    UnorderedBars { index: usize },

    #[error("index {index} is outside the series (end index {end_index})")]
    IndexOutOfRange { index: usize, end_index: usize },

    #[error("cannot enter at index {index}: a position is already open")]
    PositionAlreadyOpen { index: usize },

    #[error("cannot exit at index {index}: no position is open")]
    NoOpenPosition { index: usize },

    #[error("cannot exit at index {index}: position was entered at {entry_index}")]
    ExitBeforeEntry { index: usize, entry_index: usize },

    #[error("cannot enter at index {index}: the last position exited at {last_exit}")]
    EntryBeforeLastExit { index: usize, last_exit: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Whether the error stems from configuration rather than input data.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidAutocorrelation { .. }
                | AnalysisError::UnsupportedTrials { .. }
                | AnalysisError::ConfigParse { .. }
                | AnalysisError::ConfigMissing { .. }
                | AnalysisError::ConfigInvalid { .. }
        )
    }
}
