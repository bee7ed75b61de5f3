// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The secure session manager (spec §4.1).
//!
//! Provides an ESTABLISHED mutually authenticated channel to the
//! dispatcher on demand, creating or repairing it as needed. Exclusively
//! owned by the gateway; every outbound request borrows it through
//! `get_or_create`.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::psk::{gateway_identity, KeyFile};

/// Bounded total wait for handshake establishment (spec §4.1, §5).
pub const ESTABLISH_TIMEOUT: Duration = Duration::from_secs(5);
/// Slice width the bounded wait is pumped in.
pub const ESTABLISH_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    None,
    Connecting,
    Established,
    FailedClosed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("secure session unavailable")]
    Unavailable,
    #[error("channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A channel that can send and receive CoAP datagrams once established.
pub trait SecureChannel: Send {
    fn send(&mut self, data: &[u8]) -> io::Result<()>;
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Result of one non-blocking handshake attempt.
pub enum HandshakePoll {
    Established(Box<dyn SecureChannel>),
    Pending(Box<dyn Handshake>),
    Failed,
}

/// Drives a (possibly multi-step) handshake. `poll` must perform at most
/// one non-blocking I/O attempt and return promptly — the session manager
/// supplies the 100ms pacing between slices (spec §4.1, §5).
pub trait Handshake: Send {
    fn poll(self: Box<Self>) -> HandshakePoll;
}

/// Opens new connection attempts to the dispatcher.
pub trait SessionFactory: Send + Sync {
    fn begin_connect(&self, identity: &str, psk: &[u8]) -> Box<dyn Handshake>;
}

enum Inner {
    None,
    Connecting(Box<dyn Handshake>),
    Established(Box<dyn SecureChannel>),
    FailedClosed,
}

impl Inner {
    fn state(&self) -> SessionState {
        match self {
            Inner::None => SessionState::None,
            Inner::Connecting(_) => SessionState::Connecting,
            Inner::Established(_) => SessionState::Established,
            Inner::FailedClosed => SessionState::FailedClosed,
        }
    }
}

/// Owns the single secure session to the dispatcher.
pub struct SecureSessionManager<F> {
    factory: F,
    key_file: KeyFile,
    inner: Mutex<Inner>,
    creating: tokio::sync::Mutex<()>,
    identity_counter: AtomicU64,
}

impl<F: SessionFactory> SecureSessionManager<F> {
    pub fn new(factory: F, key_file: KeyFile) -> Self {
        Self {
            factory,
            key_file,
            inner: Mutex::new(Inner::None),
            creating: tokio::sync::Mutex::new(()),
            identity_counter: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state()
    }

    /// Provide an ESTABLISHED session, creating or repairing it as needed
    /// (spec §4.1). A single `creating` guard serializes concurrent
    /// attempts; a caller that finds the guard held waits for it rather
    /// than starting a second handshake.
    pub async fn get_or_create(&self) -> Result<(), SessionError> {
        if self.state() == SessionState::Established {
            return Ok(());
        }

        let _guard = self.creating.lock().await;
        if self.state() == SessionState::Established {
            return Ok(());
        }

        let mut handshake = self.take_or_begin();
        let deadline = Instant::now() + ESTABLISH_TIMEOUT;

        loop {
            match handshake.poll() {
                HandshakePoll::Established(channel) => {
                    info!("secure session established");
                    *self.inner.lock() = Inner::Established(channel);
                    return Ok(());
                }
                HandshakePoll::Failed => {
                    warn!("secure session handshake failed");
                    *self.inner.lock() = Inner::FailedClosed;
                    return Err(SessionError::Unavailable);
                }
                HandshakePoll::Pending(next) => {
                    if Instant::now() >= deadline {
                        warn!("secure session handshake timed out");
                        *self.inner.lock() = Inner::FailedClosed;
                        return Err(SessionError::Unavailable);
                    }
                    handshake = next;
                    tokio::time::sleep(ESTABLISH_SLICE).await;
                }
            }
        }
    }

    fn take_or_begin(&self) -> Box<dyn Handshake> {
        let existing = {
            let mut guard = self.inner.lock();
            if matches!(*guard, Inner::Connecting(_)) {
                match std::mem::replace(&mut *guard, Inner::None) {
                    Inner::Connecting(h) => Some(h),
                    _ => unreachable!(),
                }
            } else {
                None
            }
        };
        if let Some(handshake) = existing {
            return handshake;
        }

        let identity = self.fresh_identity();
        let psk = self.key_file.key_for(&identity).to_vec();
        self.factory.begin_connect(&identity, &psk)
    }

    fn fresh_identity(&self) -> String {
        let unix_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
            + self.identity_counter.fetch_add(1, Ordering::SeqCst);
        gateway_identity(std::process::id(), unix_seconds)
    }

    pub fn send(&self, data: &[u8]) -> Result<(), SessionError> {
        match &mut *self.inner.lock() {
            Inner::Established(channel) => channel.send(data).map_err(SessionError::Io),
            _ => Err(SessionError::Unavailable),
        }
    }

    pub fn recv(&self, buf: &mut [u8]) -> Result<usize, SessionError> {
        match &mut *self.inner.lock() {
            Inner::Established(channel) => channel.recv(buf).map_err(SessionError::Io),
            _ => Err(SessionError::Unavailable),
        }
    }

    /// Release the current session (spec §4.1 `release()`, and shutdown §5).
    pub fn release(&self) {
        *self.inner.lock() = Inner::None;
    }

    /// CONNECTED transport event: logged, no state change beyond what the
    /// handshake loop already recorded (spec §4.1).
    pub fn on_connected(&self) {
        info!("transport reported CONNECTED");
    }

    /// CLOSED / ERROR / SESSION_FAILED transport events release the
    /// session (spec §4.1). The single-session design means any such
    /// event necessarily refers to the current handle.
    pub fn on_closed_or_failed(&self) {
        warn!("transport reported CLOSED/ERROR/SESSION_FAILED");
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct FakeChannel;
    impl SecureChannel for FakeChannel {
        fn send(&mut self, _data: &[u8]) -> io::Result<()> {
            Ok(())
        }
        fn recv(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    struct ImmediateSuccess;
    impl Handshake for ImmediateSuccess {
        fn poll(self: Box<Self>) -> HandshakePoll {
            HandshakePoll::Established(Box::new(FakeChannel))
        }
    }

    struct AlwaysFails;
    impl Handshake for AlwaysFails {
        fn poll(self: Box<Self>) -> HandshakePoll {
            HandshakePoll::Failed
        }
    }

    struct FakeFactory<H> {
        make: fn() -> H,
    }

    impl<H: Handshake + 'static> SessionFactory for FakeFactory<H> {
        fn begin_connect(&self, _identity: &str, _psk: &[u8]) -> Box<dyn Handshake> {
            Box::new((self.make)())
        }
    }

    fn fixed_key_file() -> KeyFile {
        KeyFile::parse("00112233\naabbccdd\n").unwrap()
    }

    #[tokio::test]
    async fn get_or_create_succeeds_immediately() {
        let manager = SecureSessionManager::new(
            FakeFactory { make: || ImmediateSuccess },
            fixed_key_file(),
        );
        assert_eq!(manager.state(), SessionState::None);
        manager.get_or_create().await.unwrap();
        assert_eq!(manager.state(), SessionState::Established);
    }

    #[tokio::test]
    async fn get_or_create_reports_unavailable_on_handshake_failure() {
        let manager =
            SecureSessionManager::new(FakeFactory { make: || AlwaysFails }, fixed_key_file());
        let err = manager.get_or_create().await.unwrap_err();
        assert!(matches!(err, SessionError::Unavailable));
        assert_eq!(manager.state(), SessionState::FailedClosed);
    }

    #[tokio::test]
    async fn send_fails_when_not_established() {
        let manager =
            SecureSessionManager::new(FakeFactory { make: || AlwaysFails }, fixed_key_file());
        assert!(manager.send(b"hello").is_err());
    }

    #[tokio::test]
    async fn session_recovery_after_transport_failure() {
        // Scenario S6: dispatcher killed mid-run, manager observes
        // FAILED/CLOSED, releases, and the next get_or_create opens a
        // brand new handshake (fresh identity, fresh key lookup) rather
        // than reusing the dead one.
        struct CountingFactory {
            connect_calls: Arc<AtomicUsize>,
        }
        impl SessionFactory for CountingFactory {
            fn begin_connect(&self, _identity: &str, _psk: &[u8]) -> Box<dyn Handshake> {
                self.connect_calls.fetch_add(1, Ordering::SeqCst);
                Box::new(ImmediateSuccess)
            }
        }

        let connect_calls = Arc::new(AtomicUsize::new(0));
        let manager = SecureSessionManager::new(
            CountingFactory {
                connect_calls: connect_calls.clone(),
            },
            fixed_key_file(),
        );

        manager.get_or_create().await.unwrap();
        assert_eq!(manager.state(), SessionState::Established);
        assert_eq!(connect_calls.load(Ordering::SeqCst), 1);

        manager.on_closed_or_failed();
        assert_eq!(manager.state(), SessionState::None);

        manager.get_or_create().await.unwrap();
        assert_eq!(manager.state(), SessionState::Established);
        assert_eq!(connect_calls.load(Ordering::SeqCst), 2);
    }
}
