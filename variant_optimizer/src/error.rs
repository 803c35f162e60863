//! Error kinds of the optimizer. Every one of them is fatal to the run.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    /// The covariance of a cluster degenerated. Try running with fewer clusters
    /// and then with better behaved annotation values.
    #[error("Numerical instability in cluster {cluster}: {message}")]
    NumericalInstability { cluster: usize, message: String },
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },
    #[error("Unable to open {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;

impl OptimizerError {
    pub fn instability(cluster: usize, message: impl Into<String>) -> Self {
        Self::NumericalInstability {
            cluster,
            message: message.into(),
        }
    }
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }
    pub fn resource<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }
    pub fn is_numerical_instability(&self) -> bool {
        matches!(self, Self::NumericalInstability { .. })
    }
}

impl From<OptimizerError> for std::io::Error {
    fn from(e: OptimizerError) -> Self {
        match e {
            OptimizerError::Io(e) => e,
            OptimizerError::Resource { ref source, .. } => {
                std::io::Error::new(source.kind(), e.to_string())
            }
            OptimizerError::MalformedInput { .. } => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
            }
            OptimizerError::NumericalInstability { .. } => {
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            }
        }
    }
}
