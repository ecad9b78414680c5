// Error type for the bookkeeping library
// Storage failures and user-facing validation errors share one enum

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Business-rule violation on transaction entry, shown to the user as-is
    #[error("{0}")]
    Validation(String),

    #[error("Bulan tidak dikenal: {0}")]
    UnknownMonth(String),

    #[error("Tahun tidak valid: {0}")]
    InvalidYear(String),

    #[error("Baris jurnal {0} tidak ditemukan")]
    RowNotFound(usize),
}

impl BookError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookError::Validation(message.into())
    }

    /// True for errors caused by user input rather than storage
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BookError::Validation(_)
                | BookError::UnknownMonth(_)
                | BookError::InvalidYear(_)
                | BookError::RowNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BookError>;
