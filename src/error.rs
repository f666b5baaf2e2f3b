// src/error.rs
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Longest response-body snippet kept in an error message.
const MAX_BODY_SNIPPET: usize = 512;

/// Error body PowerDNS sends with most non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponseBody {
    pub error: String,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("rejected by server validation: {message}")]
    Validation { message: String },

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Transport {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            url: url.into(),
            source,
        }
    }

    /// Classify a non-2xx response by status code.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(body);
        match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized { message },
            StatusCode::NOT_FOUND => Error::NotFound { message },
            StatusCode::UNPROCESSABLE_ENTITY => Error::Validation { message },
            other => Error::Status {
                status: other.as_u16(),
                message,
            },
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::NotFound { .. } => Some(404),
            Error::Validation { .. } => Some(422),
            Error::Status { status, .. } => Some(*status),
            Error::Transport { .. } | Error::Decode { .. } => None,
        }
    }
}

/// Prefer the server's `error` field, fall back to a truncated raw body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponseBody>(body) {
        if parsed.errors.is_empty() {
            return parsed.error;
        }
        return format!("{} ({})", parsed.error, parsed.errors.join("; "));
    }
    truncate_body(body.trim())
}

pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_SNIPPET {
        return body.to_string();
    }
    let mut end = MAX_BODY_SNIPPET;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &body[..end], body.len())
}
