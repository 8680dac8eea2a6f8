//! Dispatch error types

use core_types::ResultCode;
use thiserror::Error;

/// Errors returned by an endpoint's business handler
///
/// Both kinds are recoverable: they are resolved at the endpoint and
/// turned into a result code on a response event, never propagated as a
/// panic across the queue boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler could not complete the call
    #[error("request failed: {0}")]
    Failed(String),

    /// The requested value cannot currently be produced
    #[error("value unavailable: {0}")]
    ValueUnavailable(String),
}

impl HandlerError {
    /// Maps the failure to the result code sent back to callers
    pub fn result_code(&self) -> ResultCode {
        match self {
            HandlerError::Failed(_) => ResultCode::RequestError,
            HandlerError::ValueUnavailable(_) => ResultCode::DataInvalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_mapping() {
        let failed = HandlerError::Failed("boom".to_string());
        assert_eq!(failed.result_code(), ResultCode::RequestError);

        let unavailable = HandlerError::ValueUnavailable("not yet".to_string());
        assert_eq!(unavailable.result_code(), ResultCode::DataInvalid);
    }

    #[test]
    fn test_display() {
        let error = HandlerError::Failed("boom".to_string());
        assert_eq!(format!("{}", error), "request failed: boom");
    }
}
