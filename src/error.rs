use crate::models::ServiceMessage;
use crate::params::MAX_LIMIT;

/// Errors produced by the client.
///
/// `InvalidParameter` and `MissingToken` are raised before any network I/O.
/// The client never retries on its own; callers decide whether an error is
/// worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied parameter violates a documented constraint.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No API token was found on the session, the client, or the call.
    #[error(
        "no API token available: set one on the client, on the session headers, \
         or pass one per call (request a token at https://www.ncdc.noaa.gov/cdo-web/token)"
    )]
    MissingToken,

    /// The service answered with a non-success HTTP status. Quota-exceeded
    /// responses arrive here as 429s.
    #[error("HTTP {status} for url ({url}): {message}")]
    Http {
        status: u16,
        url: String,
        /// Raw response body, kept for callers that want to inspect it.
        body: String,
        /// Human-readable summary, taken from the service's
        /// `{status, message}` error body when one was parseable.
        message: String,
    },

    /// Connection, DNS, or timeout failure from the transport.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response carried a body that did not decode as expected.
    #[error("failed to decode response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client construction from environment/rc file failed.
    #[error("configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn limit_too_large(limit: i64) -> Self {
        Error::InvalidParameter(format!(
            "'limit' must be less than or equal to {} (got {})",
            MAX_LIMIT, limit
        ))
    }

    /// Builds an [`Error::Http`] from a failed response, pulling the service's
    /// `{status, message}` payload out of the body when it is present.
    pub(crate) fn from_response(status: u16, url: &str, body: String) -> Self {
        let message = match serde_json::from_str::<ServiceMessage>(&body) {
            Ok(m) => m.message,
            Err(_) if body.is_empty() => format!("HTTP {}", status),
            Err(_) => body.clone(),
        };

        Error::Http {
            status,
            url: url.to_string(),
            body,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_extracts_service_message() {
        let body = r#"{"status":"429","message":"This token has reached its request limit"}"#;
        let err = Error::from_response(429, "https://example/api/v2/datasets", body.to_string());
        match err {
            Error::Http {
                status, message, ..
            } => {
                assert_eq!(status, 429);
                assert_eq!(message, "This token has reached its request limit");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = Error::from_response(502, "https://example/x", "bad gateway".to_string());
        match err {
            Error::Http { message, .. } => assert_eq!(message, "bad gateway"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
