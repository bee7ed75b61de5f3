// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CoAP message encode/decode (spec §4.3 steps 3-6, §4.4 step 1), built on
//! `coap-lite`. Kept separate from the request builder/response router so
//! their routing and classification logic can be unit tested against plain
//! Rust values without needing a real wire round-trip.

use asc_protocol::{StatusCode, CONTENT_FORMAT_JSON};
use coap_lite::{CoapOption, CoapRequest, MessageClass, MessageType, Packet, RequestType};
use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("packet encode failed: {0}")]
    Encode(String),
    #[error("packet decode failed: {0}")]
    Decode(String),
    #[error("response carried a non-response message class")]
    NotAResponse,
}

/// Build a confirmable POST with a JSON body (spec §4.3 steps 3-6).
pub fn encode_post(path: &str, token: Vec<u8>, message_id: u16, body: Vec<u8>) -> Result<Vec<u8>, WireError> {
    let mut request: CoapRequest<SocketAddr> = CoapRequest::new();
    request.set_method(RequestType::Post);
    request.set_path(path);
    request.message.header.set_type(MessageType::Confirmable);
    request.message.header.message_id = message_id;
    request.message.set_token(token);
    request
        .message
        .add_option(CoapOption::ContentFormat, CONTENT_FORMAT_JSON.to_be_bytes().to_vec());
    request.message.payload = body;
    request
        .message
        .to_bytes()
        .map_err(|e| WireError::Encode(e.to_string()))
}

/// A decoded dispatcher response (spec §4.4 step 1: "extract the response
/// token and result code").
pub struct DecodedResponse {
    pub token: Vec<u8>,
    pub status: Option<StatusCode>,
    pub content_format: Option<u16>,
    pub payload: Vec<u8>,
}

pub fn decode_response(bytes: &[u8]) -> Result<DecodedResponse, WireError> {
    let packet = Packet::from_bytes(bytes).map_err(|e| WireError::Decode(e.to_string()))?;
    let response_type = match packet.header.code {
        MessageClass::Response(rt) => rt,
        _ => return Err(WireError::NotAResponse),
    };
    let content_format = packet
        .get_option(CoapOption::ContentFormat)
        .and_then(|values| values.front())
        .map(|bytes| be_bytes_to_u16(bytes));

    Ok(DecodedResponse {
        token: packet.get_token().clone(),
        status: StatusCode::from_coap(response_type),
        content_format,
        payload: packet.payload.clone(),
    })
}

fn be_bytes_to_u16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |acc, &b| (acc << 8) | b as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_post_round_trips_through_decode_as_a_request() {
        // Sanity check on the encoder alone: Packet::from_bytes accepts
        // whatever to_bytes produced, regardless of message class.
        let bytes = encode_post("/peticion_piso", vec![1, 2, 3, 4], 7, br#"{"a":1}"#.to_vec())
            .unwrap();
        let packet = Packet::from_bytes(&bytes).unwrap();
        assert_eq!(packet.get_token(), &vec![1, 2, 3, 4]);
        assert_eq!(packet.payload, br#"{"a":1}"#.to_vec());
    }

    #[test]
    fn be_bytes_to_u16_decodes_single_byte_content_format() {
        assert_eq!(be_bytes_to_u16(&[50]), 50);
    }
}
