use reqwest::StatusCode;

/// Errors returned by the chat endpoint client.
///
/// Front ends show all of these the same way; the variants exist so the
/// cause ends up in the log.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Connection refused, DNS failure, reset, and so on.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}{}", detail_suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The body wasn't `{"response": string}`.
    #[error("malformed response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The task running the request panicked or was cancelled.
    #[error("request task ended unexpectedly: {0}")]
    Aborted(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Errors loading or saving the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}
