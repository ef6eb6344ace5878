use thiserror::Error;

/// Core error types for the storefront
#[derive(Debug, Error)]
pub enum Error {
    /// Caller passed a value the operation cannot work with (zero slide size,
    /// descending tier ladder, empty wheel)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No entity matches the requested identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Percentage requested against a zero target
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Upstream fetch failed; the core never retries
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Input validation failed
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local store could not be written
    #[error("Storage error: {0}")]
    Store(#[from] crate::core::store::StoreError),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Represents a translated error with helpful context
#[derive(Debug, Clone)]
pub struct ErrorTranslation {
    pub user_message: String,
    pub suggestions: Vec<String>,
}

impl ErrorTranslation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Known fetch failure patterns and their translations
pub struct FetchErrorPattern;

impl FetchErrorPattern {
    /// Matches a raw fetch failure against known patterns and returns a
    /// message suitable for the error branch of a view.
    pub fn match_error(msg: &str) -> ErrorTranslation {
        let lower = msg.to_lowercase();

        // Missing or expired session
        if lower.contains("401")
            || lower.contains("unauthorized")
            || lower.contains("token is missing")
        {
            return ErrorTranslation::new("Your session has expired")
                .with_suggestion("Sign in again to see your offers")
                .with_suggestion("Check that cookies are enabled for the store");
        }

        if lower.contains("404") || lower.contains("not found") {
            return ErrorTranslation::new("The requested item is no longer available")
                .with_suggestion("Go back to the catalogue and pick another product");
        }

        // Transport-level failures
        if lower.contains("connection")
            || lower.contains("network")
            || lower.contains("dns")
            || lower.contains("refused")
        {
            return ErrorTranslation::new("Connection problem, please try again")
                .with_suggestion("Check your internet connection")
                .with_suggestion("Reload the page once you are back online");
        }

        if lower.contains("timeout") || lower.contains("timed out") {
            return ErrorTranslation::new("The store took too long to answer")
                .with_suggestion("Try again in a moment");
        }

        // Payload shape problems
        if lower.contains("invalid data format")
            || lower.contains("expected")
            || lower.contains("json")
        {
            return ErrorTranslation::new("Received data in an unexpected format")
                .with_suggestion("Reload the page")
                .with_suggestion("If the problem persists, contact support");
        }

        if lower.contains("500") || lower.contains("internal server error") {
            return ErrorTranslation::new("The store is temporarily unavailable")
                .with_suggestion("Try again in a few minutes");
        }

        // Generic fallback
        ErrorTranslation::new(format!("Something went wrong: {msg}"))
            .with_suggestion("Reload the page")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
