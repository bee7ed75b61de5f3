// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher-facing error taxonomy (spec §7).

use thiserror::Error;

use crate::coap::StatusCode;
use crate::schema::ErrorResponse;

/// Abstract error kinds, mapped to concrete CoAP status codes at the
/// boundary (spec §7). `Transport` and the gateway-local half of
/// `Internal` never reach the dispatcher; they are absorbed at the
/// gateway and translated into an 0xFE field-bus frame instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("request arrived on a channel that is not yet established")]
    Unauthorized,
    #[error("unsupported content format")]
    UnsupportedMedia,
    #[error("no elevator available: {0}")]
    ServiceExhaustion(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) => StatusCode::BadRequest,
            DispatchError::Unauthorized => StatusCode::Unauthorized,
            DispatchError::UnsupportedMedia => StatusCode::UnsupportedContentFormat,
            DispatchError::ServiceExhaustion(_) => StatusCode::ServiceUnavailable,
            DispatchError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse::new(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_exhaustion_maps_to_5_03() {
        let err = DispatchError::ServiceExhaustion("no candidates".into());
        assert_eq!(err.status(), StatusCode::ServiceUnavailable);
    }

    #[test]
    fn validation_maps_to_4_00() {
        let err = DispatchError::Validation("missing field".into());
        assert_eq!(err.status(), StatusCode::BadRequest);
    }
}
