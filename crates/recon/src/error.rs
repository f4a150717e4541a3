use std::fmt;

/// Failure reported by a record store or file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Credentials rejected (401/403).
    Auth(String),
    /// Named sheet does not exist in the spreadsheet.
    SheetNotFound(String),
    /// Referenced file, folder or spreadsheet does not exist.
    NotFound(String),
    /// Non-success HTTP status with the upstream message.
    Http { status: u16, message: String },
    /// Transport failure (DNS, TLS, timeout, connection reset).
    Network(String),
    /// Response body could not be decoded.
    Parse(String),
    /// Listing returned the continuation token it was given.
    PaginationStuck { token: String },
    /// Anything else a store wants to surface.
    Other(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(msg) => write!(f, "auth failed: {msg}"),
            Self::SheetNotFound(name) => write!(f, "Sheet not found: {name}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::PaginationStuck { token } => {
                write!(f, "pagination stuck: page token '{token}' repeated")
            }
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Fatal run failure. Per-row failures never surface here.
#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (blank id, bad column, overlapping columns).
    ConfigValidation(String),
    /// The configured sheet does not exist.
    SheetNotFound(String),
    /// Reading rows failed.
    ReadRows(StoreError),
    /// Listing the staging folder failed.
    Inventory(StoreError),
}

impl ReconError {
    /// The underlying store error, when there is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::ReadRows(e) | Self::Inventory(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SheetNotFound(name) => write!(f, "Sheet not found: {name}"),
            Self::ReadRows(e) => write!(f, "reading sheet rows failed: {e}"),
            Self::Inventory(e) => write!(f, "indexing staging folder failed: {e}"),
        }
    }
}

impl std::error::Error for ReconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadRows(e) | Self::Inventory(e) => Some(e),
            _ => None,
        }
    }
}
