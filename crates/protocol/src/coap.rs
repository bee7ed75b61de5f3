// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CoAP resource routing conventions and status codes (spec §6, §7).

use coap_lite::ResponseType;

/// Dispatcher resource paths.
pub const PATH_FLOOR_CALL: &str = "/peticion_piso";
pub const PATH_CABIN_REQUEST: &str = "/peticion_cabina";
/// (SUPPLEMENT) spec §6 leaves the emergency path implementation-defined;
/// this fixes it following the same naming convention.
pub const PATH_EMERGENCY: &str = "/peticion_emergencia";

pub const CONTENT_FORMAT_JSON: u16 = 50; // application/json, RFC 7252 registry

/// Abstract status taxonomy (spec §6, §7), independent of the CoAP crate's
/// own response-code enum so callers outside the transport layer don't need
/// a `coap-lite` dependency just to reason about outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 2.05 success
    Success,
    /// 4.00 validation error
    BadRequest,
    /// 4.01 not on an established secured channel
    Unauthorized,
    /// 4.15 wrong content format
    UnsupportedContentFormat,
    /// 5.03 no available elevator
    ServiceUnavailable,
    /// 5.00 internal failure
    InternalServerError,
}

impl StatusCode {
    pub fn is_success(self) -> bool {
        matches!(self, StatusCode::Success)
    }

    pub fn to_coap(self) -> ResponseType {
        match self {
            StatusCode::Success => ResponseType::Content,
            StatusCode::BadRequest => ResponseType::BadRequest,
            StatusCode::Unauthorized => ResponseType::Unauthorized,
            StatusCode::UnsupportedContentFormat => ResponseType::UnsupportedContentFormat,
            StatusCode::ServiceUnavailable => ResponseType::ServiceUnavailable,
            StatusCode::InternalServerError => ResponseType::InternalServerError,
        }
    }

    pub fn from_coap(code: ResponseType) -> Option<Self> {
        match code {
            ResponseType::Content => Some(StatusCode::Success),
            ResponseType::BadRequest => Some(StatusCode::BadRequest),
            ResponseType::Unauthorized => Some(StatusCode::Unauthorized),
            ResponseType::UnsupportedContentFormat => Some(StatusCode::UnsupportedContentFormat),
            ResponseType::ServiceUnavailable => Some(StatusCode::ServiceUnavailable),
            ResponseType::InternalServerError => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }
}

/// Sanitize an inbound path string (spec §4.3 "Path hygiene"): strip CR, LF,
/// TAB and trailing spaces, and prefix with `/` if missing.
///
/// Rust's owned `String` carries its own length, so there is no C-style
/// null terminator to preserve under truncation; the length cap below is
/// the equivalent safety bound (see DESIGN.md).
pub fn sanitize_path(raw: &str) -> String {
    const MAX_PATH_LEN: usize = 64;

    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect();
    let trimmed = cleaned.trim_end_matches(' ');

    let mut truncated = String::new();
    for c in trimmed.chars() {
        if truncated.len() + c.len_utf8() > MAX_PATH_LEN {
            break;
        }
        truncated.push(c);
    }

    if truncated.starts_with('/') {
        truncated
    } else {
        format!("/{truncated}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        missing_slash = { "peticion_piso", "/peticion_piso" },
        has_slash = { "/peticion_piso", "/peticion_piso" },
        crlf_stripped = { "/peticion_piso\r\n", "/peticion_piso" },
        tab_stripped = { "/peticion\tpiso", "/peticionpiso" },
        trailing_spaces = { "/peticion_piso   ", "/peticion_piso" },
    )]
    fn sanitize(input: &str, expected: &str) {
        assert_eq!(sanitize_path(input), expected);
    }

    #[test]
    fn sanitize_truncates_long_paths() {
        let long = "a".repeat(200);
        let out = sanitize_path(&long);
        assert!(out.len() <= 65); // 64 + leading slash
    }

    #[test]
    fn status_code_round_trips_through_coap() {
        for code in [
            StatusCode::Success,
            StatusCode::BadRequest,
            StatusCode::Unauthorized,
            StatusCode::UnsupportedContentFormat,
            StatusCode::ServiceUnavailable,
            StatusCode::InternalServerError,
        ] {
            assert_eq!(StatusCode::from_coap(code.to_coap()), Some(code));
        }
    }
}
