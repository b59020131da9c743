use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    InvalidUri(String),
    MissingHost,
    NotConfigured,
    InvalidPacUrl(String),
    FetchFailed(String),
    HttpStatus(u16),
    EmptyScript,
    ScriptLoad(String),
    ScriptEvaluation(String),
    Unparseable(String),
    Timeout,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::InvalidUri(msg) => write!(f, "Invalid URI: {}", msg),
            ResolveError::MissingHost => write!(f, "Missing host in target URL"),
            ResolveError::NotConfigured => write!(f, "No proxy auto-config location is configured"),
            ResolveError::InvalidPacUrl(msg) => write!(f, "Invalid PAC URL: {}", msg),
            ResolveError::FetchFailed(msg) => write!(f, "PAC download failed: {}", msg),
            ResolveError::HttpStatus(code) => write!(f, "PAC download returned HTTP {}", code),
            ResolveError::EmptyScript => write!(f, "PAC script is empty"),
            ResolveError::ScriptLoad(msg) => write!(f, "PAC script failed to load: {}", msg),
            ResolveError::ScriptEvaluation(msg) => write!(f, "PAC evaluation failed: {}", msg),
            ResolveError::Unparseable(msg) => write!(f, "Unparseable proxy directive: {}", msg),
            ResolveError::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for ResolveError {}

pub type Result<T> = std::result::Result<T, ResolveError>;
