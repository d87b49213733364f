use thiserror::Error;

/// Errors that can occur while fetching, enriching or exporting stargazers.
#[derive(Debug, Error)]
pub enum StargazeError {
    /// Rejected before any network I/O (bad repository URL, missing token).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The API answered with a non-success status other than 403.
    #[error("GitHub API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Network or decoding failure that persisted through every attempt.
    #[error("Request failed after {attempts} attempts: {message}")]
    Transient { attempts: u32, message: String },

    /// Writing an export artifact failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Unexpected/internal error (e.g. a worker task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StargazeError {
    /// Create an invalid input error.
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check if this error was raised before any request was made.
    #[inline]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// The single message shown to the end user.
    ///
    /// Only two classes are distinguished: invalid input, and everything that
    /// went wrong while talking to GitHub or writing the results.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(message) => format!("Invalid input: {message}"),
            other => format!("Failed to fetch stargazers: {}", short_error_message(other)),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for StargazeError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<std::io::Error> for StargazeError {
    fn from(err: std::io::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps upstream error
/// bodies from flooding progress output.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for stargazer operations.
pub type Result<T> = std::result::Result<T, StargazeError>;
