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

//! Seams to the underlying PV protocol engine.
//!
//! The gateway core never encodes or decodes protocol frames. It drives an
//! [`UpstreamClient`] for everything facing the real data sources, and it is
//! driven by the server side of the engine through the downstream operation
//! traits ([`ChannelControl`], [`ConnectOp`], [`ExecOp`], [`MonitorSetupOp`]).
//!
//! Hooks handed to downstream operations (`on_close`, `on_cancel`) are owned by
//! the operation until it closes. Dropping a hook drops whatever it captured,
//! which is how in-flight upstream work is released.

mod downstream;
mod search;
mod upstream;

pub use downstream::{
    ChannelControl, CloseHook, ConnectOp, ExecHandler, ExecOp, MonitorControlOp,
    MonitorSetupOp, OpHandler, OperationKind, PutHandler, RpcHandler, SubscribeHandler,
};
pub use search::{Search, SearchItem};
pub use upstream::{
    MonitorPopError, UpstreamClient, UpstreamConnector, UpstreamError, UpstreamOperation,
    UpstreamSubscription,
};
