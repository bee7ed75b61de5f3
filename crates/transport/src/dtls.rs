// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete mutually-authenticated DTLS+PSK channel (spec §1, §6: "the
//! DTLS implementation \[is\] assumed provided"). Built on `openssl`'s
//! DTLS support over a connected, non-blocking UDP socket; CoAP framing
//! itself is built with `coap-lite` one layer up.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, UdpSocket};

use openssl::error::ErrorStack;
use openssl::ssl::{
    HandshakeError, MidHandshakeSslStream, Ssl, SslContext, SslMethod, SslStream, SslVerifyMode,
};

use crate::psk::DISPATCHER_HINT;
use crate::session::{Handshake, HandshakePoll, SecureChannel, SessionFactory};

/// PSK-only cipher suite both sides negotiate. No certificates are
/// exchanged; authentication comes entirely from the shared key.
const PSK_CIPHERS: &str = "PSK-AES128-CBC-SHA256";

/// A connected, non-blocking UDP socket implementing `Read`/`Write` so it
/// can sit underneath an `openssl::ssl::SslStream`.
struct UdpIo(UdpSocket);

impl Read for UdpIo {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.recv(buf)
    }
}

impl Write for UdpIo {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.send(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct DtlsChannel {
    stream: SslStream<UdpIo>,
}

impl SecureChannel for DtlsChannel {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

/// Drives one non-blocking DTLS handshake attempt. `openssl`'s
/// `HandshakeError::WouldBlock` carries a `MidHandshakeSslStream` that
/// can be retried — this maps directly onto the session manager's
/// 100ms-sliced bounded wait (spec §4.1, §5).
pub struct DtlsHandshake {
    state: HandshakeState,
}

enum HandshakeState {
    Mid(MidHandshakeSslStream<UdpIo>),
    Established(Box<DtlsChannel>),
    Failed,
}

impl Handshake for DtlsHandshake {
    fn poll(self: Box<Self>) -> HandshakePoll {
        match self.state {
            HandshakeState::Failed => HandshakePoll::Failed,
            HandshakeState::Established(channel) => HandshakePoll::Established(channel),
            HandshakeState::Mid(mid) => match mid.handshake() {
                Ok(stream) => HandshakePoll::Established(Box::new(DtlsChannel { stream })),
                Err(HandshakeError::WouldBlock(mid)) => {
                    HandshakePoll::Pending(Box::new(DtlsHandshake {
                        state: HandshakeState::Mid(mid),
                    }))
                }
                Err(_) => HandshakePoll::Failed,
            },
        }
    }
}

/// Opens DTLS+PSK connections to a fixed dispatcher address, from a fixed
/// local port (spec §6 CLI surface: `gateway [listen_port]`).
pub struct DtlsSessionFactory {
    dispatcher_addr: SocketAddr,
    local_port: u16,
}

impl DtlsSessionFactory {
    pub fn new(dispatcher_addr: SocketAddr, local_port: u16) -> Self {
        Self {
            dispatcher_addr,
            local_port,
        }
    }

    fn build_context(&self, psk: Vec<u8>) -> Result<SslContext, ErrorStack> {
        let mut builder = SslContext::builder(SslMethod::dtls())?;
        builder.set_cipher_list(PSK_CIPHERS)?;
        builder.set_verify(SslVerifyMode::NONE); // PSK authenticates; no cert chain to verify
        builder.set_psk_client_callback(move |_ssl, _hint, identity_out, psk_out| {
            write_psk_identity(identity_out, DISPATCHER_HINT);
            copy_psk(psk_out, &psk)
        });
        Ok(builder.build())
    }

    fn connect_socket(&self) -> io::Result<UdpIo> {
        let socket = UdpSocket::bind(("0.0.0.0", self.local_port))?;
        socket.connect(self.dispatcher_addr)?;
        socket.set_nonblocking(true)?;
        Ok(UdpIo(socket))
    }
}

impl SessionFactory for DtlsSessionFactory {
    fn begin_connect(&self, _identity: &str, psk: &[u8]) -> Box<dyn Handshake> {
        Box::new(DtlsHandshake {
            state: self.try_begin_connect(psk),
        })
    }
}

impl DtlsSessionFactory {
    fn try_begin_connect(&self, psk: &[u8]) -> HandshakeState {
        let ctx = match self.build_context(psk.to_vec()) {
            Ok(ctx) => ctx,
            Err(_) => return HandshakeState::Failed,
        };
        let ssl = match Ssl::new(&ctx) {
            Ok(ssl) => ssl,
            Err(_) => return HandshakeState::Failed,
        };
        let io = match self.connect_socket() {
            Ok(io) => io,
            Err(_) => return HandshakeState::Failed,
        };
        match ssl.connect(io) {
            Ok(stream) => HandshakeState::Established(Box::new(DtlsChannel { stream })),
            Err(HandshakeError::WouldBlock(mid)) => HandshakeState::Mid(mid),
            Err(_) => HandshakeState::Failed,
        }
    }
}

/// Accepts DTLS+PSK connections bound to a fixed local address (dispatcher side).
pub struct DtlsAcceptor {
    key_lookup: std::sync::Arc<dyn Fn(&str) -> Option<Vec<u8>> + Send + Sync>,
}

impl DtlsAcceptor {
    pub fn new(key_lookup: impl Fn(&str) -> Option<Vec<u8>> + Send + Sync + 'static) -> Self {
        Self {
            key_lookup: std::sync::Arc::new(key_lookup),
        }
    }

    pub fn accept(&self, socket: UdpSocket) -> Box<dyn Handshake> {
        Box::new(DtlsHandshake {
            state: self.try_accept(socket).unwrap_or(HandshakeState::Failed),
        })
    }

    fn try_accept(&self, socket: UdpSocket) -> Result<HandshakeState, ErrorStack> {
        let lookup = self.key_lookup.clone();

        let mut builder = SslContext::builder(SslMethod::dtls())?;
        builder.set_cipher_list(PSK_CIPHERS)?;
        builder.set_verify(SslVerifyMode::NONE);
        builder.set_psk_server_callback(move |_ssl, identity_hint, psk_out| {
            let identity = identity_hint
                .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string())
                .unwrap_or_default();
            match lookup(&identity) {
                Some(psk) => copy_psk(psk_out, &psk),
                None => Ok(0),
            }
        });
        let ctx = builder.build();
        let ssl = Ssl::new(&ctx)?;
        socket.set_nonblocking(true).ok();

        Ok(match ssl.accept(UdpIo(socket)) {
            Ok(stream) => HandshakeState::Established(Box::new(DtlsChannel { stream })),
            Err(HandshakeError::WouldBlock(mid)) => HandshakeState::Mid(mid),
            Err(_) => HandshakeState::Failed,
        })
    }
}

fn write_psk_identity(out: &mut [u8], identity: &str) {
    let bytes = identity.as_bytes();
    let n = bytes.len().min(out.len().saturating_sub(1));
    out[..n].copy_from_slice(&bytes[..n]);
    if n < out.len() {
        out[n] = 0;
    }
}

fn copy_psk(out: &mut [u8], psk: &[u8]) -> Result<usize, ErrorStack> {
    let n = psk.len().min(out.len());
    out[..n].copy_from_slice(&psk[..n]);
    Ok(n)
}
