//! Classification of fetch failures into a closed, caller-facing taxonomy.

use reqwest::StatusCode;

use crate::decode::DecodeError;
use crate::transport::TransportError;

/// Anything that can go wrong between issuing a request and holding a
/// decoded record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// The closed set of error kinds exposed to callers. The original failure
/// never travels past this boundary; callers get kind plus message, nothing
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkUnavailable,
    Timeout,
    HttpError(u16),
    DecodingFailed,
    Unknown,
}

impl ErrorKind {
    /// Total mapping: every possible fetch failure lands on exactly one kind.
    pub fn classify(err: &FetchError) -> Self {
        match err {
            FetchError::Transport(TransportError::Unreachable(_)) => ErrorKind::NetworkUnavailable,
            FetchError::Transport(TransportError::Timeout) => ErrorKind::Timeout,
            FetchError::Transport(TransportError::HttpStatus(code)) => ErrorKind::HttpError(*code),
            FetchError::Transport(TransportError::Unknown(_)) => ErrorKind::Unknown,
            FetchError::Decode(DecodeError::Malformed(_)) => ErrorKind::DecodingFailed,
        }
    }

    /// Fixed human-readable message for this kind.
    pub fn message(&self) -> String {
        match self {
            ErrorKind::NetworkUnavailable => "Error: no network connection".to_string(),
            ErrorKind::Timeout => "Error: request timed out".to_string(),
            ErrorKind::HttpError(code) => {
                let reason = StatusCode::from_u16(*code)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unexpected Status");
                format!("Error: {code} - {reason}")
            }
            ErrorKind::DecodingFailed => "Error: could not read weather data".to_string(),
            ErrorKind::Unknown => "Error: something went wrong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_classifies_as_timeout() {
        let err = FetchError::from(TransportError::Timeout);
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Timeout);
        assert_eq!(ErrorKind::Timeout.message(), "Error: request timed out");
    }

    #[test]
    fn http_404_carries_code_and_reason() {
        let err = FetchError::from(TransportError::HttpStatus(404));
        let kind = ErrorKind::classify(&err);

        assert_eq!(kind, ErrorKind::HttpError(404));
        assert_eq!(kind.message(), "Error: 404 - Not Found");
    }

    #[test]
    fn http_401_and_500_have_canonical_reasons() {
        assert_eq!(ErrorKind::HttpError(401).message(), "Error: 401 - Unauthorized");
        assert_eq!(
            ErrorKind::HttpError(500).message(),
            "Error: 500 - Internal Server Error"
        );
    }

    #[test]
    fn nonstandard_status_still_formats() {
        let msg = ErrorKind::HttpError(599).message();
        assert!(msg.contains("599"));
    }

    #[test]
    fn unreachable_classifies_as_network_unavailable() {
        let err = FetchError::from(TransportError::Unreachable("dns failure".into()));
        assert_eq!(ErrorKind::classify(&err), ErrorKind::NetworkUnavailable);
    }

    #[test]
    fn malformed_payload_classifies_as_decoding_failed() {
        let err = FetchError::from(DecodeError::Malformed("missing temp".into()));
        assert_eq!(ErrorKind::classify(&err), ErrorKind::DecodingFailed);
    }

    #[test]
    fn opaque_transport_failure_classifies_as_unknown() {
        let err = FetchError::from(TransportError::Unknown("tls handshake".into()));
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Unknown);
    }
}
