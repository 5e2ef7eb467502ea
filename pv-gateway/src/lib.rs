/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! `pv-gateway` is the forwarding, caching and multiplexing core of a
//! process-variable (PV) protocol gateway.
//!
//! Downstream clients search for names and open channels on a [`GatewaySource`].
//! Every claimed name is backed by one cached [`UpstreamConnection`] shared by all
//! downstream channels bound to it. Operations are forwarded upstream through an
//! [`UpstreamClient`]; cached GETs share one type negotiation per name and cached
//! monitors share one upstream subscription whose accumulated snapshot is replayed
//! to late subscribers.
//!
//! What is allowed is decided by a [`GatewayPolicy`]. [`StaticPolicy`] provides a
//! rule table loaded from a JSON5 [`GatewayConfig`].
//!
//! Internal modules are organized by domain layer:
//!
//! - `control_plane`: ban registry and the upstream connection cache.
//! - `data_plane`: upstream connections, downstream channels and forwarding.
//! - `protocol`: seams to the underlying protocol engine.
//! - `runtime`: task ownership and the periodic sweep.
//! - `observability`: structured event names.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pv_gateway::{GatewayConfig, GatewaySource, Search, UpstreamClient};
//!
//! fn serve(client: Arc<dyn UpstreamClient>) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::load("GATEWAY_CONFIG.json5")?;
//!     let source = GatewaySource::from_config(&config, client, tokio::runtime::Handle::current())?;
//!     let _sweeper = source.spawn_sweeper(Duration::from_secs(config.sweep_interval_secs));
//!
//!     let mut search = Search::new("10.0.0.7", ["ACC:MAG1:CURRENT"]);
//!     source.on_search(&mut search);
//!     println!("claimed {:?}", search.claimed_names());
//!     Ok(())
//! }
//! ```

mod config;
mod control_plane;
mod data_plane;
mod error;
mod gateway_source;
pub mod observability;
mod policy;
mod protocol;
mod runtime;
mod stats;
pub mod value;

pub use config::{
    BanConfig, ConfigError, GatewayConfig, PermissionConfig, RuleConfig,
    DEFAULT_SWEEP_INTERVAL_SECS,
};
pub use data_plane::{ChannelPermissions, DownstreamChannel, UpstreamConnection};
pub use error::GatewayError;
pub use gateway_source::GatewaySource;
pub use policy::{GatewayPolicy, SearchDecision, StaticPolicy};
pub use protocol::{
    ChannelControl, CloseHook, ConnectOp, ExecHandler, ExecOp, MonitorControlOp,
    MonitorPopError, MonitorSetupOp, OpHandler, OperationKind, PutHandler, RpcHandler, Search,
    SearchItem, SubscribeHandler, UpstreamClient, UpstreamConnector, UpstreamError,
    UpstreamOperation, UpstreamSubscription,
};
pub use runtime::sweep_loop::SweepLoopHandle;
pub use stats::GatewayStats;
