// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Elevator dispatch fabric central dispatcher (asc-dispatcherd)
//!
//! A single, stateless request/response server (spec §4.6): accepts one
//! gateway's secured session at a time, validates its floor-call/cabin/
//! emergency requests against the snapshot it carries, and answers with
//! an assignment. Holds no state across requests beyond the PSK lookup
//! table and the task id minter (spec §9).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::time::Duration;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use asc_dispatcher::{Config, ResourceHandler};
use asc_transport::{
    is_accepted_identity, DtlsAcceptor, HandshakePoll, KeyFile, ESTABLISH_SLICE,
};

/// Bounded wait for a gateway to complete its handshake once it has
/// started one (spec §4.1 describes this pacing from the gateway's side;
/// the dispatcher applies the same slice width so an unresponsive peer
/// can't hang the accept loop indefinitely).
const ACCEPT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);
/// How often the accept loop polls the established channel for a new
/// request (spec §5: "~1-5s under low load").
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(name = "dispatcher", about = "Central elevator dispatcher")]
struct Cli {}

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let log_guard = match setup_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: failed to set up logging: {e}");
            std::process::exit(1);
        }
    };

    info!(port = config.listen_port, "starting dispatcher");

    let key_file = match KeyFile::load(&config.key_file) {
        Ok(kf) => kf,
        Err(e) => {
            error!(error = %e, "failed to load key file, fatal startup failure");
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let acceptor = DtlsAcceptor::new(move |identity: &str| {
        if is_accepted_identity(identity) {
            Some(key_file.key_for(identity).to_vec())
        } else {
            None
        }
    });
    let handler = ResourceHandler::new();

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            drop(log_guard);
            std::process::exit(1);
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGINT handler");
            drop(log_guard);
            std::process::exit(1);
        }
    };

    info!("dispatcher ready");
    println!("READY");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
            result = accept_one(&config, &acceptor, &handler) => {
                if let Err(err) = result {
                    warn!(%err, "a gateway session ended, returning to accept");
                }
            }
        }
    }

    info!("dispatcher stopped");
}

/// Bind a fresh socket, wait for one gateway to start talking to it,
/// connect the socket to that peer (spec §9 single-loop model: only one
/// secured session is serviced at a time), drive the handshake, then
/// service requests until the peer disconnects or errors out.
async fn accept_one(
    config: &Config,
    acceptor: &DtlsAcceptor,
    handler: &ResourceHandler,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::UdpSocket::bind((config.listen_addr, config.listen_port)).await?;

    let mut probe = [0u8; 1];
    let (_, peer) = listener.peek_from(&mut probe).await?;
    listener.connect(peer).await?;
    info!(%peer, "gateway connecting");

    let socket = listener.into_std()?;

    let channel = match drive_handshake(acceptor, socket).await {
        Some(channel) => channel,
        None => {
            warn!(%peer, "handshake failed or timed out");
            return Ok(());
        }
    };
    info!(%peer, "gateway session established");

    serve(channel, handler).await;
    info!(%peer, "gateway session ended");
    Ok(())
}

async fn drive_handshake(
    acceptor: &DtlsAcceptor,
    socket: std::net::UdpSocket,
) -> Option<Box<dyn asc_transport::SecureChannel>> {
    let mut handshake = acceptor.accept(socket);
    let deadline = tokio::time::Instant::now() + ACCEPT_HANDSHAKE_TIMEOUT;

    loop {
        match handshake.poll() {
            HandshakePoll::Established(channel) => return Some(channel),
            HandshakePoll::Failed => return None,
            HandshakePoll::Pending(next) => {
                if tokio::time::Instant::now() >= deadline {
                    return None;
                }
                handshake = next;
                tokio::time::sleep(ESTABLISH_SLICE).await;
            }
        }
    }
}

async fn serve(mut channel: Box<dyn asc_transport::SecureChannel>, handler: &ResourceHandler) {
    let mut buf = vec![0u8; 2048];
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        match channel.recv(&mut buf) {
            Ok(0) => continue,
            Ok(n) => {
                let response = handler.handle(&buf[..n]);
                if !response.is_empty() {
                    if let Err(err) = channel.send(&response) {
                        warn!(%err, "failed to send response, ending session");
                        return;
                    }
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => continue,
            Err(err) => {
                warn!(%err, "channel read failed, ending session");
                return;
            }
        }
    }
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config
            .log_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new(".")),
        config
            .log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("dispatcher.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
