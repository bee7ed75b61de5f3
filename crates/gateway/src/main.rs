// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Elevator dispatch fabric gateway (asc-gatewayd)
//!
//! Bridges one building's field bus to the central dispatcher: decodes
//! inbound frames, builds and tracks outbound dispatcher requests over a
//! secured DTLS+PSK channel, and applies responses back to the local
//! elevator group state.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info, warn};

use asc_core::BuildingId;
use asc_gateway::{
    config::Config,
    group_manager::GroupStateManager,
    request_builder::{OutboundRequest, OutboundRequestBuilder},
    response_router::ResponseRouter,
    FrameSink, FrameSource, LoopbackBus,
};
use asc_protocol::fieldbus::{self, Frame};
use asc_transport::{DtlsSessionFactory, KeyFile, SecureSessionManager};

const MIN_PORT: u16 = 1024;

#[derive(Parser, Debug)]
#[command(name = "gateway", about = "Elevator dispatch fabric gateway")]
struct Cli {
    /// Local UDP port the gateway binds for its session to the dispatcher.
    /// Defaults to the config-supplied port; must be in [1024, 65535].
    listen_port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let listen_port = cli.listen_port.unwrap_or(config.dispatcher_port);
    if listen_port < MIN_PORT {
        eprintln!("error: listen_port must be in [{MIN_PORT}, 65535], got {listen_port}");
        std::process::exit(1);
    }

    let log_guard = match setup_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: failed to set up logging: {e}");
            std::process::exit(1);
        }
    };

    info!(building = %config.building_id, cars = config.n_cars, floors = config.n_floors, "starting gateway");

    let key_file = match KeyFile::load(&config.key_file) {
        Ok(kf) => kf,
        Err(e) => {
            error!(error = %e, "failed to load key file, fatal startup failure");
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let dispatcher_addr = SocketAddr::new(config.dispatcher_addr, config.dispatcher_port);
    let factory = DtlsSessionFactory::new(dispatcher_addr, listen_port);
    let session = Arc::new(SecureSessionManager::new(factory, key_file));

    let building = BuildingId::new(config.building_id.clone());
    let mut group = GroupStateManager::init(building.clone(), config.n_cars, config.n_floors);
    let builder = OutboundRequestBuilder::new(building, session.clone(), asc_transport::MIN_CAPACITY);

    let mut bus = LoopbackBus::new();

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

    info!(port = listen_port, "gateway ready");
    println!("READY");

    let mut tick_interval = tokio::time::interval(std::time::Duration::from_secs(1));
    let mut recv_buf = vec![0u8; 2048];

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
            _ = tick_interval.tick() => {
                group.tick();

                if let Some(frame) = bus.recv() {
                    handle_field_bus_frame(frame, &builder, &group, &mut bus).await;
                }

                match session.recv(&mut recv_buf) {
                    Ok(n) if n > 0 => {
                        if let Some(reply) = ResponseRouter::route(&recv_buf[..n], builder.correlation(), &mut group) {
                            let _ = bus.send(reply);
                        }
                    }
                    Ok(_) => {}
                    Err(err) => debug!(%err, "no dispatcher response available this tick"),
                }
            }
        }
    }

    session.release();
    let orphaned = builder.correlation().lock().drain();
    if !orphaned.is_empty() {
        warn!(count = orphaned.len(), "drained in-flight trackers at shutdown");
    }

    info!("gateway stopped");
}

async fn handle_field_bus_frame<F: asc_transport::SessionFactory>(
    frame: Frame,
    builder: &OutboundRequestBuilder<F>,
    group: &GroupStateManager,
    bus: &mut LoopbackBus,
) {
    let outbound = match frame.id {
        fieldbus::FRAME_FLOOR_CALL => fieldbus::decode_floor_call(&frame)
            .ok()
            .map(|p| OutboundRequest::FloorCall {
                origin_floor: p.origin_floor as i32,
                direction: p.direction,
            }),
        fieldbus::FRAME_CABIN_REQUEST => fieldbus::decode_cabin_request(&frame).ok().and_then(|p| {
            group
                .group()
                .cars()
                .get(p.car_index_0based as usize)
                .map(|car| OutboundRequest::CabinRequest {
                    car_id: car.id.as_str().to_string(),
                    target_floor: p.target_floor as i32,
                })
        }),
        fieldbus::FRAME_EMERGENCY => fieldbus::decode_emergency(&frame).ok().and_then(|p| {
            group
                .group()
                .cars()
                .get(p.car_index_0based as usize)
                .map(|car| OutboundRequest::Emergency {
                    car_id: car.id.as_str().to_string(),
                    current_floor: p.current_floor as i32,
                    emergency_kind: p.emergency_kind,
                })
        }),
        _ => None,
    };

    let Some(outbound) = outbound else {
        let _ = bus.send(ResponseRouter::send_failure_frame(frame.id));
        return;
    };

    if let Err(err) = builder.send(frame.id, outbound, group.group()).await {
        warn!(%err, frame_id = frame.id, "outbound dispatch failed");
        let _ = bus.send(ResponseRouter::send_failure_frame(frame.id));
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
            .unwrap_or_else(|| std::ffi::OsStr::new("gateway.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
