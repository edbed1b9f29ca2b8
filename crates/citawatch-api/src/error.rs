use thiserror::Error;

/// Errors returned by the booking API client and orchestrator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot be parsed.
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Login was rejected. Carries the status and response body for
    /// diagnosis; this failure aborts the whole pipeline run.
    #[error("login failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    /// The availability endpoint returned a non-200 status.
    #[error("availability check failed with status {status}")]
    UpstreamStatus { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A single availability job exceeded its own deadline.
    #[error("availability job timed out after {secs}s")]
    JobTimeout { secs: u64 },
}
