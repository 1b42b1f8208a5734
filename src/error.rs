//! Unified error types for the CLI.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError — raw failure signal from one HTTP dispatch
// ---------------------------------------------------------------------------

/// Errors from the HTTP API layer, before classification.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error (no response reached us).
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status {
        code: u16,
        body: String,
        retry_after_secs: Option<u64>,
    },
}

impl ApiError {
    pub fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// Failure — classified failure of an API call
// ---------------------------------------------------------------------------

/// Classification bucket for a failed API call.
///
/// The bucket drives both retry eligibility and the process exit code. It is
/// a pure function of the raw error signal: the same `ApiError` always maps
/// to the same category, independent of attempt count or elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// 401 or 403: bad or under-privileged credentials.
    Auth,
    /// 404: the addressed resource does not exist.
    NotFound,
    /// 400 or 422: the request itself was malformed.
    Validation,
    /// 429: throttled by the API.
    RateLimited,
    /// 500-599: the API is unhealthy.
    ServerError,
    /// Connect/timeout failure with no HTTP status.
    Transport,
    /// Anything else.
    Unknown,
    /// The caller interrupted the call (never produced by classification).
    Cancelled,
}

impl FailureCategory {
    /// Map an HTTP status code to its category.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Whether the retry loop may schedule another attempt for this category.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError | Self::Transport)
    }

    /// Semantic process exit code for this category.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Auth => 2,
            Self::NotFound => 3,
            Self::Validation => 4,
            Self::RateLimited => 5,
            Self::ServerError => 6,
            Self::Transport | Self::Unknown => 1,
            Self::Cancelled => 130,
        }
    }

    /// Stable machine-readable label used in structured error output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Auth => "AUTH_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::ServerError => "SERVER_ERROR",
            Self::Transport => "TRANSPORT_ERROR",
            Self::Unknown => "UNEXPECTED_ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Classified failure of one API call, surfaced once retries are settled.
#[derive(Debug, Clone)]
pub struct Failure {
    pub category: FailureCategory,
    pub http_status: Option<u16>,
    pub message: String,
    pub retry_after_secs: Option<u64>,
}

impl Failure {
    pub fn cancelled() -> Self {
        Self {
            category: FailureCategory::Cancelled,
            http_status: None,
            message: "interrupted".to_string(),
            retry_after_secs: None,
        }
    }

    /// Operator-facing hint for recovering from this failure.
    pub fn hint(&self) -> Option<&'static str> {
        match self.category {
            FailureCategory::Auth => {
                Some("Check DD_API_KEY and DD_APP_KEY or run `dogctl config init`")
            }
            FailureCategory::NotFound => Some("Verify the resource ID"),
            FailureCategory::RateLimited => {
                Some("Try again later or reduce request frequency")
            }
            FailureCategory::ServerError => Some("Datadog service issue, try again later"),
            _ => None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(code) => write!(f, "{} ({code}): {}", self.category.label(), self.message),
            None => write!(f, "{}: {}", self.category.label(), self.message),
        }
    }
}

impl std::error::Error for Failure {}

impl From<ApiError> for Failure {
    /// Classify a raw dispatch error.
    ///
    /// Precedence: an explicit HTTP status wins over the transport signal,
    /// which wins over unclassified errors.
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status {
                code,
                body,
                retry_after_secs,
            } => Self {
                category: FailureCategory::from_status(code),
                http_status: Some(code),
                message: if body.trim().is_empty() {
                    format!("API returned status {code}")
                } else {
                    body
                },
                retry_after_secs,
            },
            ApiError::Http(e) => {
                if let Some(status) = e.status() {
                    return Self {
                        category: FailureCategory::from_status(status.as_u16()),
                        http_status: Some(status.as_u16()),
                        message: e.to_string(),
                        retry_after_secs: None,
                    };
                }
                let category = if e.is_timeout() || e.is_connect() {
                    FailureCategory::Transport
                } else {
                    FailureCategory::Unknown
                };
                Self {
                    category,
                    http_status: None,
                    message: e.to_string(),
                    retry_after_secs: None,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TimeRangeError
// ---------------------------------------------------------------------------

/// Errors from resolving user-supplied time expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRangeError {
    /// The expression matched none of the recognized forms.
    Parse(String),
    /// Both sides parsed, but the resolved window is inverted.
    Range { from: i64, to: i64 },
}

impl fmt::Display for TimeRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(expr) => write!(f, "invalid time format: {expr}"),
            Self::Range { from, to } => {
                write!(f, "time range start {from} is after end {to}")
            }
        }
    }
}

impl std::error::Error for TimeRangeError {}

// ---------------------------------------------------------------------------
// InputError
// ---------------------------------------------------------------------------

/// Errors from `-f/--file` JSON input.
#[derive(Debug)]
pub enum InputError {
    NotFound(String),
    Io(std::io::Error),
    Json { source_name: String, detail: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {path}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json {
                source_name,
                detail,
            } => write!(f, "invalid JSON in {source_name}: {detail}"),
        }
    }
}

impl std::error::Error for InputError {}

impl From<std::io::Error> for InputError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// CliError — top-level
// ---------------------------------------------------------------------------

/// Top-level error type for command execution.
#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Api(Failure),
    Time(TimeRangeError),
    Input(InputError),
    /// Flag combination or missing-field problems past clap's own checks.
    Usage(String),
    /// Anything without a more specific bucket.
    General(String),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Time, input, and usage errors take the validation code: they are
    /// deterministic rejections of the invocation itself. Config and general
    /// errors take the catch-all code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Api(failure) => failure.category.exit_code(),
            Self::Time(_) | Self::Input(_) | Self::Usage(_) => {
                FailureCategory::Validation.exit_code()
            }
            Self::Config(_) | Self::General(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Api(e) => write!(f, "{e}"),
            Self::Time(e) => write!(f, "{e}"),
            Self::Input(e) => write!(f, "{e}"),
            Self::Usage(msg) => write!(f, "{msg}"),
            Self::General(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<Failure> for CliError {
    fn from(e: Failure) -> Self {
        Self::Api(e)
    }
}

impl From<TimeRangeError> for CliError {
    fn from(e: TimeRangeError) -> Self {
        Self::Time(e)
    }
}

impl From<InputError> for CliError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_matches_exactly() {
        assert_eq!(FailureCategory::from_status(401), FailureCategory::Auth);
        assert_eq!(FailureCategory::from_status(403), FailureCategory::Auth);
        assert_eq!(FailureCategory::from_status(404), FailureCategory::NotFound);
        assert_eq!(
            FailureCategory::from_status(400),
            FailureCategory::Validation
        );
        assert_eq!(
            FailureCategory::from_status(422),
            FailureCategory::Validation
        );
        assert_eq!(
            FailureCategory::from_status(429),
            FailureCategory::RateLimited
        );
        for code in [500u16, 502, 503, 599] {
            assert_eq!(
                FailureCategory::from_status(code),
                FailureCategory::ServerError,
                "status {code}"
            );
        }
    }

    #[test]
    fn unlisted_statuses_are_unknown() {
        for code in [100u16, 200, 204, 301, 302, 402, 405, 410, 418, 499, 600] {
            assert_eq!(
                FailureCategory::from_status(code),
                FailureCategory::Unknown,
                "status {code}"
            );
        }
    }

    #[test]
    fn retryable_set_is_exact() {
        assert!(FailureCategory::RateLimited.is_retryable());
        assert!(FailureCategory::ServerError.is_retryable());
        assert!(FailureCategory::Transport.is_retryable());
        assert!(!FailureCategory::Auth.is_retryable());
        assert!(!FailureCategory::NotFound.is_retryable());
        assert!(!FailureCategory::Validation.is_retryable());
        assert!(!FailureCategory::Unknown.is_retryable());
        assert!(!FailureCategory::Cancelled.is_retryable());
    }

    #[test]
    fn exit_codes_follow_the_mapping_table() {
        assert_eq!(FailureCategory::Auth.exit_code(), 2);
        assert_eq!(FailureCategory::NotFound.exit_code(), 3);
        assert_eq!(FailureCategory::Validation.exit_code(), 4);
        assert_eq!(FailureCategory::RateLimited.exit_code(), 5);
        assert_eq!(FailureCategory::ServerError.exit_code(), 6);
        assert_eq!(FailureCategory::Transport.exit_code(), 1);
        assert_eq!(FailureCategory::Unknown.exit_code(), 1);
    }

    #[test]
    fn classification_carries_status_and_retry_hint() {
        let failure = Failure::from(ApiError::status(429, "slow down".to_string(), Some(7)));
        assert_eq!(failure.category, FailureCategory::RateLimited);
        assert_eq!(failure.http_status, Some(429));
        assert_eq!(failure.retry_after_secs, Some(7));
        assert_eq!(failure.message, "slow down");
    }

    #[test]
    fn empty_body_gets_a_stand_in_message() {
        let failure = Failure::from(ApiError::status(503, "  ".to_string(), None));
        assert_eq!(failure.message, "API returned status 503");
    }

    #[test]
    fn cli_error_exit_codes() {
        let validation = CliError::Time(TimeRangeError::Parse("1H".to_string()));
        assert_eq!(validation.exit_code(), 4);
        let config = CliError::Config(ConfigError::Invalid("missing api_key".to_string()));
        assert_eq!(config.exit_code(), 1);
        let api = CliError::Api(Failure::from(ApiError::status(403, "no".to_string(), None)));
        assert_eq!(api.exit_code(), 2);
    }

    #[test]
    fn time_range_error_display() {
        assert_eq!(
            TimeRangeError::Parse("nope".to_string()).to_string(),
            "invalid time format: nope"
        );
        assert!(TimeRangeError::Range { from: 10, to: 5 }
            .to_string()
            .contains("after"));
    }
}
