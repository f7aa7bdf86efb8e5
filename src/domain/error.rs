//! Domain error types.

/// Top-level error type for momrev.
#[derive(Debug, thiserror::Error)]
pub enum MomrevError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error("insufficient data for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientData {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

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

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MomrevError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        MomrevError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            MomrevError::Io(_) | MomrevError::Report { .. } => 1,
            MomrevError::ConfigParse { .. }
            | MomrevError::ConfigMissing { .. }
            | MomrevError::ConfigInvalid { .. } => 2,
            MomrevError::DataSource { .. } => 3,
            MomrevError::NoData { .. } | MomrevError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&MomrevError> for std::process::ExitCode {
    fn from(err: &MomrevError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
