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

//! Downstream (server side) operation handles driven by the gateway.

use crate::value::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Hook stored by an operation until it closes or is cancelled.
pub type CloseHook = Box<dyn FnOnce() + Send + Sync>;

pub type RpcHandler = Box<dyn Fn(Arc<dyn ExecOp>, Value) + Send + Sync>;
pub type OpHandler = Box<dyn Fn(Arc<dyn ConnectOp>) + Send + Sync>;
pub type SubscribeHandler = Box<dyn Fn(Arc<dyn MonitorSetupOp>) + Send + Sync>;
pub type ExecHandler = Box<dyn Fn(Arc<dyn ExecOp>) + Send + Sync>;
pub type PutHandler = Box<dyn Fn(Arc<dyn ExecOp>, Value) + Send + Sync>;

/// Operation kinds a downstream client can request on a channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationKind {
    Info,
    Get,
    Put,
    Rpc,
    Monitor,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OperationKind::Info => "INFO",
            OperationKind::Get => "GET",
            OperationKind::Put => "PUT",
            OperationKind::Rpc => "RPC",
            OperationKind::Monitor => "MONITOR",
        };
        write!(f, "{label}")
    }
}

/// An accepted downstream channel.
pub trait ChannelControl: Send + Sync {
    fn name(&self) -> &str;

    /// Peer address, usually `host:port`.
    fn peer(&self) -> &str;

    fn account(&self) -> &str;

    /// Closes the channel. Registered handlers are released.
    fn close(&self);

    fn on_rpc(&self, handler: RpcHandler);

    fn on_op(&self, handler: OpHandler);

    fn on_subscribe(&self, handler: SubscribeHandler);
}

/// One execution (RPC call, GET or PUT) awaiting a reply.
pub trait ExecOp: Send + Sync {
    fn name(&self) -> &str;

    /// Completes the execution. PUT replies carry no value.
    fn reply(&self, value: Option<Value>);

    fn error(&self, message: &str);

    fn on_cancel(&self, hook: CloseHook);
}

/// A downstream INFO/GET/PUT operation being created.
pub trait ConnectOp: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> OperationKind;

    fn pv_request(&self) -> Value;

    /// Completes type negotiation. Executions may follow.
    fn connect(&self, prototype: &Value);

    fn error(&self, message: &str);

    fn on_get(&self, handler: ExecHandler);

    fn on_put(&self, handler: PutHandler);

    fn on_close(&self, hook: CloseHook);
}

/// A downstream monitor request awaiting its type.
pub trait MonitorSetupOp: Send + Sync {
    fn name(&self) -> &str;

    fn pv_request(&self) -> Value;

    fn connect(&self, prototype: &Value) -> Arc<dyn MonitorControlOp>;

    fn error(&self, message: &str);

    fn on_close(&self, hook: CloseHook);
}

/// A running downstream monitor.
pub trait MonitorControlOp: Send + Sync {
    fn post(&self, value: &Value);

    /// Ends the stream normally.
    fn finish(&self);

    fn is_open(&self) -> bool;
}
