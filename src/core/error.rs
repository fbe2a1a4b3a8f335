use std::fmt;

/// Error types for routeprobe operations
#[derive(Debug)]
pub enum RouteProbeError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// HTTP client error
    Http(reqwest::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// JSON parsing error
    JsonParsing(serde_json::Error),

    /// Regex compilation error
    Regex(regex::Error),

    /// Requested route does not exist in the route source
    RouteNotFound(String),

    /// Cookie string could not be parsed
    InvalidCookie(String),

    /// Invalid argument error
    InvalidArgument(String),

    /// File not found error
    FileNotFound(String),
}

impl fmt::Display for RouteProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteProbeError::Io(err) => write!(f, "IO error: {err}"),
            RouteProbeError::Config(msg) => write!(f, "Configuration error: {msg}"),
            RouteProbeError::Http(err) => write!(f, "HTTP error: {err}"),
            RouteProbeError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            RouteProbeError::JsonParsing(err) => write!(f, "JSON parsing error: {err}"),
            RouteProbeError::Regex(err) => write!(f, "Regex error: {err}"),
            RouteProbeError::RouteNotFound(name) => {
                write!(f, "Route not found: Route \"{name}\" does not exist.")
            }
            RouteProbeError::InvalidCookie(msg) => write!(f, "Invalid cookie: {msg}"),
            RouteProbeError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            RouteProbeError::FileNotFound(path) => write!(f, "File not found: {path}"),
        }
    }
}

impl std::error::Error for RouteProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteProbeError::Io(err) => Some(err),
            RouteProbeError::Http(err) => Some(err),
            RouteProbeError::TomlParsing(err) => Some(err),
            RouteProbeError::JsonParsing(err) => Some(err),
            RouteProbeError::Regex(err) => Some(err),
            _ => None,
        }
    }
}

impl RouteProbeError {
    /// Errors raised before any probing starts and caused by bad input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RouteProbeError::Config(_)
                | RouteProbeError::InvalidCookie(_)
                | RouteProbeError::InvalidArgument(_)
                | RouteProbeError::TomlParsing(_)
                | RouteProbeError::JsonParsing(_)
        )
    }
}

impl From<std::io::Error> for RouteProbeError {
    fn from(err: std::io::Error) -> Self {
        RouteProbeError::Io(err)
    }
}

impl From<reqwest::Error> for RouteProbeError {
    fn from(err: reqwest::Error) -> Self {
        RouteProbeError::Http(err)
    }
}

impl From<toml::de::Error> for RouteProbeError {
    fn from(err: toml::de::Error) -> Self {
        RouteProbeError::TomlParsing(err)
    }
}

impl From<serde_json::Error> for RouteProbeError {
    fn from(err: serde_json::Error) -> Self {
        RouteProbeError::JsonParsing(err)
    }
}

impl From<regex::Error> for RouteProbeError {
    fn from(err: regex::Error) -> Self {
        RouteProbeError::Regex(err)
    }
}

/// Type alias for Results using RouteProbeError
pub type Result<T> = std::result::Result<T, RouteProbeError>;
