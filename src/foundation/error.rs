/// Convenience result type used across retouch.
pub type RetouchResult<T> = Result<T, RetouchError>;

/// Failure categories reported by the remote generative edit service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteFailure {
    /// The service refused the request because of request quotas.
    RateLimited,
    /// The caller is not allowed to use the service (auth or credits).
    PermissionDenied,
    /// Anything else, including malformed responses.
    Unknown,
}

impl std::fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RateLimited => "rate limited",
            Self::PermissionDenied => "permission denied",
            Self::Unknown => "unknown failure",
        };
        f.write_str(s)
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum RetouchError {
    /// Malformed adjustment/mask/overlay records or invalid mutator calls.
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster allocation or decode failures. Recoverable by rebuilding from session state.
    #[error("resource error: {0}")]
    Resource(String),

    /// The remote edit service failed; local state is untouched.
    #[error("remote edit failed: {0}")]
    Remote(RemoteFailure),

    /// Flattening or encoding the export raster failed; the live composite is untouched.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RetouchError {
    /// Build a [`RetouchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RetouchError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`RetouchError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Return `true` for errors that a full rebuild from session state can recover from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Resource(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
