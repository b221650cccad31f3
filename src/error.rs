use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("line exceeds the maximum length of {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScanResult<T> = Result<T, ScanError>;
