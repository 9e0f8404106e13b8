use thiserror::Error;

use crate::domain::message::UNREACHABLE_TEXT;

/// Failure of the single backend round trip behind one chat turn.
///
/// All variants collapse to the same user-facing text; the variant only
/// matters for logs and operator tooling.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("backend request failed: {0}")]
    Connect(String),
    #[error("backend did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Connect(_) => "transport_connect",
            Self::Timeout { .. } => "transport_timeout",
            Self::Status { .. } => "transport_status",
            Self::Decode(_) => "transport_decode",
        }
    }

    pub fn user_message(&self) -> &'static str {
        UNREACHABLE_TEXT
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::message::UNREACHABLE_TEXT;
    use crate::errors::TransportError;

    #[test]
    fn every_transport_failure_shares_user_message() {
        let failures = [
            TransportError::Connect("connection refused".to_owned()),
            TransportError::Timeout { timeout_secs: 30 },
            TransportError::Status { status: 502, body: "bad gateway".to_owned() },
            TransportError::Decode("expected value at line 1".to_owned()),
        ];

        for failure in failures {
            assert_eq!(failure.user_message(), UNREACHABLE_TEXT);
        }
    }

    #[test]
    fn status_error_reports_code_and_class() {
        let error = TransportError::Status { status: 503, body: "down".to_owned() };
        assert_eq!(error.to_string(), "backend returned status 503: down");
        assert_eq!(error.error_class(), "transport_status");
    }

    #[test]
    fn timeout_error_names_budget() {
        let error = TransportError::Timeout { timeout_secs: 12 };
        assert_eq!(error.to_string(), "backend did not answer within 12s");
        assert_eq!(error.error_class(), "transport_timeout");
    }
}
