use thiserror::Error;

#[derive(Error, Debug)]
pub enum PbhError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Corrupt physical constant {name} = {value}")]
    CorruptConstant { name: String, value: f64 },

    #[error("No convergence after {iterations} iterations: {message}")]
    NonConvergence { iterations: usize, message: String },

    #[error("Root not bracketed on [{lo}, {hi}]")]
    NotBracketed { lo: f64, hi: f64 },

    #[error("Outside validity domain: {0}")]
    OutsideDomain(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPY error: {0}")]
    Npy(String),
}

impl PbhError {
    /// Errors confined to a single (mass, channel) evaluation.
    ///
    /// Everything else aborts the computation it occurred in.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PbhError::NonConvergence { .. }
                | PbhError::NotBracketed { .. }
                | PbhError::OutsideDomain(_)
        )
    }

    /// Missing or corrupt physical inputs: no partial result is meaningful.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PbhError::CorruptConstant { .. })
    }
}

pub type PbhResult<T> = Result<T, PbhError>;
