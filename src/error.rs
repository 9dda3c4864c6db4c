use thiserror::Error;

use crate::auth::AuthState;

/// Input rejected before a submission leaves the screen. The display text is
/// what the user sees inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid phone number")]
    PhoneTooShort,
    #[error("Please enter a valid 6-digit OTP")]
    OtpIncomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a submission is already in flight")]
    Busy,
    #[error("{action} is not available while {state:?}")]
    OutOfStep {
        action: &'static str,
        state: AuthState,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config dir")]
    NoConfigDir,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}
