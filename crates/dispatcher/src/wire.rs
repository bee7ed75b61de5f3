// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CoAP request decode / response encode for the dispatcher side, the
//! mirror image of `asc-gateway::wire`.

use asc_protocol::coap::sanitize_path;
use asc_protocol::{StatusCode, CONTENT_FORMAT_JSON};
use coap_lite::{CoapOption, MessageClass, Packet};

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("packet decode failed: {0}")]
    Decode(String),
    #[error("packet encode failed: {0}")]
    Encode(String),
    #[error("datagram did not carry a request")]
    NotARequest,
}

/// A decoded inbound request (spec §4.6): path (sanitized per §4.3's
/// hygiene rule), content format, token, message id, and raw JSON body.
pub struct DecodedRequest {
    pub path: String,
    pub content_format: Option<u16>,
    pub token: Vec<u8>,
    pub message_id: u16,
    pub body: Vec<u8>,
}

pub fn decode_request(bytes: &[u8]) -> Result<DecodedRequest, WireError> {
    let packet = Packet::from_bytes(bytes).map_err(|e| WireError::Decode(e.to_string()))?;
    if !matches!(packet.header.code, MessageClass::Request(_)) {
        return Err(WireError::NotARequest);
    }

    let raw_path = packet
        .get_option(CoapOption::UriPath)
        .map(|segments| {
            segments
                .iter()
                .map(|seg| String::from_utf8_lossy(seg))
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();

    let content_format = packet
        .get_option(CoapOption::ContentFormat)
        .and_then(|values| values.front())
        .map(|bytes| be_bytes_to_u16(bytes));

    Ok(DecodedRequest {
        path: sanitize_path(&raw_path),
        content_format,
        token: packet.get_token().clone(),
        message_id: packet.header.message_id,
        body: packet.payload.clone(),
    })
}

/// Encode a response datagram echoing the request's token/message id,
/// carrying the given status and JSON body (spec §4.6, §7).
pub fn encode_response(
    request: &DecodedRequest,
    status: StatusCode,
    body: Vec<u8>,
) -> Result<Vec<u8>, WireError> {
    let mut packet = Packet::new();
    packet.header.code = MessageClass::Response(status.to_coap());
    packet.header.message_id = request.message_id;
    packet.set_token(request.token.clone());
    packet.add_option(
        CoapOption::ContentFormat,
        CONTENT_FORMAT_JSON.to_be_bytes().to_vec(),
    );
    packet.payload = body;
    packet.to_bytes().map_err(|e| WireError::Encode(e.to_string()))
}

fn be_bytes_to_u16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |acc, &b| (acc << 8) | b as u16)
}
